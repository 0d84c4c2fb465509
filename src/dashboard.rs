//! This module provides the main entry point: the `Dashboard`, which loads observation
//! tables and boundaries (with caching) and runs the full render pipeline for a
//! selected parameter and date.

use crate::boundary::boundary_loader::BoundaryLoader;
use crate::cache::FrameCache;
use crate::cascade::aggregator::aggregate;
use crate::cascade::filter_cascade::{CascadeOutcome, FilterCascade, Selection};
use crate::error::DashboardError;
use crate::map_layer::{JoinReport, MapLayer};
use crate::observations::dataset_loader::DatasetLoader;
use crate::observations::error::ObservationError;
use crate::observations::observation_table::ObservationTable;
use crate::observations::partition::discover_partitions;
use crate::types::parameter::Parameter;
use bon::{bon, Builder};
use chrono::NaiveDate;
use geojson::FeatureCollection;
use log::{info, warn};
use polars::prelude::DataFrame;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_BOUNDARY_PATH: &str = "data/boundary/tehsils.topojson";

/// Where the data lives and how long loaded data may be served from memory.
///
/// # Examples
///
/// ```
/// use tehsil_weather::DashboardConfig;
/// use std::time::Duration;
///
/// let config = DashboardConfig::builder()
///     .data_dir("/srv/imd")
///     .boundary_path("/srv/imd/india_tehsil.topojson")
///     .boundary_object("tehsils")
///     .cache_ttl(Duration::from_secs(3600))
///     .build();
///
/// assert_eq!(config.data_dir.to_str(), Some("/srv/imd"));
/// ```
#[derive(Debug, Clone, Builder)]
pub struct DashboardConfig {
    /// Root folder holding one sub-folder of yearly partitions per parameter.
    #[builder(into, default = PathBuf::from(DEFAULT_DATA_DIR))]
    pub data_dir: PathBuf,
    /// TopoJSON (or GeoJSON) file with one feature per tehsil.
    #[builder(into, default = PathBuf::from(DEFAULT_BOUNDARY_PATH))]
    pub boundary_path: PathBuf,
    /// Topology object to convert; required when the topology has several objects.
    #[builder(into)]
    pub boundary_object: Option<String>,
    /// How long loaded tables and boundaries stay cached. `None` keeps them until
    /// invalidated.
    pub cache_ttl: Option<Duration>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// The output of one render: the detail table, the option lists for every selector,
/// and the map layer.
#[derive(Debug, Clone)]
pub struct Render {
    pub parameter: Parameter,
    /// Earliest and latest date of the loaded table, for bounding the date picker.
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,
    /// Number of observations on the selected date.
    pub records_for_date: usize,
    pub cascade: CascadeOutcome,
    pub map: MapLayer,
    pub join_report: JoinReport,
}

impl Render {
    /// First `n` rows of the selected date.
    pub fn preview(&self, n: usize) -> DataFrame {
        self.cascade.date_frame.head(Some(n))
    }

    /// Rows of the selected tehsil.
    pub fn detail(&self) -> &DataFrame {
        &self.cascade.detail
    }
}

/// Loads observation tables and tehsil boundaries and turns a selection into a [`Render`].
///
/// Tables are cached per partition folder (and year, when one is requested) and the
/// boundary per file, for the configured time-to-live.
///
/// # Examples
///
/// ```no_run
/// # use tehsil_weather::{Dashboard, DashboardConfig, DashboardError, Parameter};
/// # use chrono::NaiveDate;
/// # #[tokio::main]
/// # async fn main() -> Result<(), DashboardError> {
/// let dashboard = Dashboard::new(DashboardConfig::default());
///
/// let render = dashboard
///     .render()
///     .parameter(Parameter::Rainfall)
///     .date(NaiveDate::from_ymd_opt(2020, 7, 1).unwrap())
///     .state("Bihar")
///     .call()
///     .await?;
///
/// println!("{}", render.map.aggregated);
/// # Ok(())
/// # }
/// ```
pub struct Dashboard {
    config: DashboardConfig,
    loader: DatasetLoader,
    boundary_loader: BoundaryLoader,
    tables: FrameCache<(PathBuf, Option<i32>), ObservationTable>,
    boundaries: FrameCache<PathBuf, Arc<FeatureCollection>>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

#[bon]
impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            loader: DatasetLoader::new(&config.data_dir),
            boundary_loader: BoundaryLoader::new(
                &config.boundary_path,
                config.boundary_object.clone(),
            ),
            tables: FrameCache::new(config.cache_ttl),
            boundaries: FrameCache::new(config.cache_ttl),
            config,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Loads the tehsil boundary, served from the cache after the first call.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Boundary`] if the file is missing or malformed.
    pub async fn load_boundary(&self) -> Result<Arc<FeatureCollection>, DashboardError> {
        let loader = self.boundary_loader.clone();
        self.boundaries
            .get_or_load(loader.path().to_path_buf(), move || async move {
                loader.load_boundary().await.map(Arc::new)
            })
            .await
            .map_err(DashboardError::from)
    }

    /// Loads the unified observation table of a parameter, or of a single year when
    /// `year` is given.
    ///
    /// # Errors
    ///
    /// * [`ObservationError::MissingSource`] if the parameter folder does not exist.
    /// * [`ObservationError::NoData`] if the folder exists but holds no rows.
    /// * Schema errors from [`ObservationTable::try_new`].
    #[builder]
    pub async fn load_table(
        &self,
        parameter: Parameter,
        year: Option<i32>,
    ) -> Result<ObservationTable, DashboardError> {
        let folder = self.loader.parameter_folder(parameter);
        self.tables
            .get_or_load((folder.clone(), year), move || async move {
                let frame = match year {
                    Some(year) => DatasetLoader::load_year(&folder, year).await?,
                    None => DatasetLoader::load_all(&folder).await?,
                };
                if frame.height() == 0 {
                    return Err(ObservationError::NoData(folder));
                }
                ObservationTable::try_new(frame)
            })
            .await
            .map_err(DashboardError::from)
    }

    /// Years that have a partition for `parameter`, ascending.
    pub async fn available_years(&self, parameter: Parameter) -> Result<Vec<i32>, DashboardError> {
        let folder = self.loader.parameter_folder(parameter);
        let partitions = tokio::task::spawn_blocking(move || discover_partitions(&folder))
            .await
            .map_err(ObservationError::from)??;
        let mut years: Vec<i32> = partitions.iter().filter_map(|p| p.year).collect();
        years.sort_unstable();
        years.dedup();
        Ok(years)
    }

    /// Runs the full pipeline for one selection.
    ///
    /// Loads the boundary and the observation table, filters the table to `date`,
    /// narrows through state, district and tehsil (each defaulting to its first option
    /// when not given), and aggregates the date's rows to one mean per tehsil for the map.
    ///
    /// Join mismatches between the aggregate and the boundary are logged and reported in
    /// [`Render::join_report`]; they do not fail the render.
    ///
    /// # Errors
    ///
    /// Any loader error, plus [`crate::CascadeError`] variants for empty dates and
    /// selections outside the available options. Use [`DashboardError::severity`] to
    /// tell a warning from a fatal error.
    #[builder]
    pub async fn render(
        &self,
        parameter: Parameter,
        date: NaiveDate,
        year: Option<i32>,
        state: Option<&str>,
        district: Option<&str>,
        tehsil: Option<&str>,
    ) -> Result<Render, DashboardError> {
        let boundary = self.load_boundary().await?;
        let table = self
            .load_table()
            .parameter(parameter)
            .maybe_year(year)
            .call()
            .await?;
        let date_bounds = table.date_bounds()?;

        let cascade = FilterCascade::for_date(&table, date)?;
        let selection = Selection {
            state: state.map(str::to_string),
            district: district.map(str::to_string),
            tehsil: tehsil.map(str::to_string),
        };
        let outcome = cascade.run(&selection)?;

        let aggregated = aggregate(cascade.frame(), table.value_column())?;
        let map = MapLayer::new(aggregated, boundary, table.value_column());
        let join_report = map.join_report().map_err(DashboardError::Join)?;
        if !join_report.is_complete() {
            warn!(
                "{} of {} tehsils on {} have no boundary feature, {} features have no value, {} features lack a '{}' property",
                join_report.unmatched_rows.len(),
                join_report.unmatched_rows.len() + join_report.matched_rows,
                date,
                join_report.unmatched_features.len(),
                join_report.features_without_key,
                map.join_key()
            );
        }

        Ok(Render {
            parameter,
            date_bounds,
            records_for_date: cascade.frame().height(),
            cascade: outcome,
            map,
            join_report,
        })
    }

    /// Drops the cached tables of `parameter` (the whole folder and every year) so the
    /// next load re-reads them. Years whose partitions have since disappeared are dropped too.
    pub async fn invalidate(&self, parameter: Parameter) {
        let folders: Vec<PathBuf> = parameter
            .folder_candidates()
            .iter()
            .map(|name| self.config.data_dir.join(name))
            .collect();
        let dropped = self
            .tables
            .invalidate_where(|(cached, _)| folders.contains(cached))
            .await;
        info!("Invalidated {} cached tables for {}", dropped, parameter);
    }

    /// Drops every cached table and boundary.
    pub async fn clear_cache(&self) {
        self.tables.clear().await;
        self.boundaries.clear().await;
    }
}
