use crate::observations::error::ObservationError;
use crate::observations::partition::{discover_partitions, Partition};
use crate::types::join_key::canonical_column_names;
use crate::types::parameter::Parameter;
use log::{debug, info, warn};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tokio::task;

/// Reads the yearly parquet partitions of each parameter folder under a data directory.
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    data_dir: PathBuf,
}

impl DatasetLoader {
    pub fn new(data_dir: &Path) -> DatasetLoader {
        DatasetLoader {
            data_dir: data_dir.to_path_buf(),
        }
    }

    /// Resolves the folder holding the partitions of `parameter`.
    ///
    /// The first existing folder among the parameter's accepted names is used. When none
    /// exists, the canonical folder is returned so the subsequent load reports it as missing.
    pub fn parameter_folder(&self, parameter: Parameter) -> PathBuf {
        parameter
            .folder_candidates()
            .iter()
            .map(|name| self.data_dir.join(name))
            .find(|path| path.is_dir())
            .unwrap_or_else(|| self.data_dir.join(parameter.path_segment()))
    }

    /// Loads every partition in `folder` and concatenates them into one table with
    /// lowercase column names.
    ///
    /// The row count of the result is the sum of the partition row counts. A folder
    /// without partitions yields an empty `DataFrame`.
    pub async fn load_all(folder: &Path) -> Result<DataFrame, ObservationError> {
        let folder = folder.to_path_buf();
        task::spawn_blocking(move || {
            let partitions = discover_partitions(&folder)?;
            Self::merge_partitions(&folder, &partitions)
        })
        .await?
    }

    /// Loads only the partitions of `folder` whose file name starts with `year`.
    pub async fn load_year(folder: &Path, year: i32) -> Result<DataFrame, ObservationError> {
        let folder = folder.to_path_buf();
        task::spawn_blocking(move || {
            let partitions: Vec<Partition> = discover_partitions(&folder)?
                .into_iter()
                .filter(|partition| partition.year == Some(year))
                .collect();
            Self::merge_partitions(&folder, &partitions)
        })
        .await?
    }

    fn merge_partitions(
        folder: &Path,
        partitions: &[Partition],
    ) -> Result<DataFrame, ObservationError> {
        if partitions.is_empty() {
            warn!("No parquet partitions found in {:?}", folder);
            return Ok(DataFrame::empty());
        }

        let frames = partitions
            .iter()
            .map(|partition| Self::read_partition(&partition.path))
            .collect::<Result<Vec<_>, _>>()?;

        let merged = if frames.len() == 1 {
            frames.into_iter().next().unwrap_or_default()
        } else {
            let lazy_frames: Vec<LazyFrame> = frames.into_iter().map(IntoLazy::lazy).collect();
            concat(lazy_frames, UnionArgs::default())
                .and_then(LazyFrame::collect)
                .map_err(|e| ObservationError::PartitionMerge {
                    folder: folder.to_path_buf(),
                    source: e,
                })?
        };

        info!(
            "Loaded {} rows from {} partitions in {:?}",
            merged.height(),
            partitions.len(),
            folder
        );
        Ok(merged)
    }

    /// Reads one parquet partition and lowercases its column names.
    fn read_partition(path: &Path) -> Result<DataFrame, ObservationError> {
        let file =
            File::open(path).map_err(|e| ObservationError::PartitionOpen(path.to_path_buf(), e))?;
        let mut df = ParquetReader::new(file)
            .finish()
            .map_err(|e| ObservationError::ParquetRead(path.to_path_buf(), e))?;

        let names = canonical_column_names(df.get_column_names().into_iter().map(|s| s.as_str()))
            .map_err(|column| ObservationError::ColumnNameCollision {
                path: path.to_path_buf(),
                column,
            })?;
        df.set_column_names(names)?;

        debug!("Read {} rows from {:?}", df.height(), path);
        Ok(df)
    }
}
