//! The date → state → district → tehsil narrowing of an observation table.

use crate::cascade::error::CascadeError;
use crate::observations::observation_table::ObservationTable;
use crate::types::admin_level::AdminLevel;
use crate::types::join_key::COL_DATE;
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::BTreeSet;

/// Administrative choices made by the user. A level left as `None` defaults to the
/// first available option, the way a select box starts on its first entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub state: Option<String>,
    pub district: Option<String>,
    pub tehsil: Option<String>,
}

impl Selection {
    fn for_level(&self, level: AdminLevel) -> Option<&str> {
        match level {
            AdminLevel::State => self.state.as_deref(),
            AdminLevel::District => self.district.as_deref(),
            AdminLevel::Tehsil => self.tehsil.as_deref(),
        }
    }
}

/// One narrowing level: the rows still in play and the options for this level.
#[derive(Debug, Clone)]
pub struct CascadeStage {
    level: AdminLevel,
    frame: DataFrame,
    options: Vec<String>,
}

impl CascadeStage {
    /// Builds the stage for `level` over `frame`.
    ///
    /// Options are the distinct non-null values of the level's column in ascending
    /// lexicographic order. A level without options is [`CascadeError::NoCandidates`].
    pub fn new(level: AdminLevel, frame: DataFrame) -> Result<Self, CascadeError> {
        let options = distinct_options(&frame, level.column())?;
        if options.is_empty() {
            return Err(CascadeError::NoCandidates { level });
        }
        Ok(Self {
            level,
            frame,
            options,
        })
    }

    pub fn level(&self) -> AdminLevel {
        self.level
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Rows of this stage whose level column equals `value`.
    pub fn narrow(&self, value: &str) -> Result<DataFrame, CascadeError> {
        if !self.options.iter().any(|option| option == value) {
            return Err(CascadeError::UnknownSelection {
                level: self.level,
                value: value.to_string(),
                options: self.options.clone(),
            });
        }
        Ok(self
            .frame
            .clone()
            .lazy()
            .filter(col(self.level.column()).eq(lit(value)))
            .collect()?)
    }

    /// Narrows to `value` and builds the stage of the next finer level.
    pub fn descend(&self, value: &str) -> Result<CascadeStage, CascadeError> {
        let next = self
            .level
            .next()
            .ok_or(CascadeError::NoLowerLevel(self.level))?;
        CascadeStage::new(next, self.narrow(value)?)
    }

    fn choose(&self, selected: Option<&str>) -> Result<String, CascadeError> {
        match selected {
            Some(value) if self.options.iter().any(|option| option == value) => {
                Ok(value.to_string())
            }
            Some(value) => Err(CascadeError::UnknownSelection {
                level: self.level,
                value: value.to_string(),
                options: self.options.clone(),
            }),
            None => self
                .options
                .first()
                .cloned()
                .ok_or(CascadeError::NoCandidates { level: self.level }),
        }
    }
}

/// Everything produced by one full pass of the cascade.
#[derive(Debug, Clone)]
pub struct CascadeOutcome {
    pub date: NaiveDate,
    /// All rows of the selected date; this is what the map aggregates.
    pub date_frame: DataFrame,
    pub states: Vec<String>,
    pub state: String,
    pub districts: Vec<String>,
    pub district: String,
    pub tehsils: Vec<String>,
    pub tehsil: String,
    /// Rows of the single selected tehsil, for the tabular detail view.
    pub detail: DataFrame,
}

/// The date-level subset of an observation table, from which the administrative
/// stages are derived.
#[derive(Debug, Clone)]
pub struct FilterCascade {
    date: NaiveDate,
    frame: DataFrame,
}

impl FilterCascade {
    /// Keeps the rows observed on `date`.
    ///
    /// # Errors
    ///
    /// [`CascadeError::NoDataForDate`] when no row matches; the caller should stop
    /// this render without populating any administrative selector.
    pub fn for_date(table: &ObservationTable, date: NaiveDate) -> Result<Self, CascadeError> {
        let frame = table
            .frame
            .clone()
            .lazy()
            .filter(col(COL_DATE).eq(lit(date)))
            .collect()?;

        if frame.height() == 0 {
            return Err(CascadeError::NoDataForDate(date));
        }
        Ok(Self { date, frame })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// All rows of the selected date.
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// The first administrative stage, over every row of the date.
    pub fn states(&self) -> Result<CascadeStage, CascadeError> {
        CascadeStage::new(AdminLevel::State, self.frame.clone())
    }

    /// Runs state → district → tehsil with the given choices.
    pub fn run(&self, selection: &Selection) -> Result<CascadeOutcome, CascadeError> {
        let states = self.states()?;
        let state = states.choose(selection.for_level(AdminLevel::State))?;

        let districts = states.descend(&state)?;
        let district = districts.choose(selection.for_level(AdminLevel::District))?;

        let tehsils = districts.descend(&district)?;
        let tehsil = tehsils.choose(selection.for_level(AdminLevel::Tehsil))?;
        let detail = tehsils.narrow(&tehsil)?;

        Ok(CascadeOutcome {
            date: self.date,
            date_frame: self.frame.clone(),
            states: states.options,
            state,
            districts: districts.options,
            district,
            tehsils: tehsils.options,
            tehsil,
            detail,
        })
    }
}

fn distinct_options(frame: &DataFrame, column: &str) -> Result<Vec<String>, CascadeError> {
    let values = frame.column(column)?.cast(&DataType::String)?;
    let options: BTreeSet<String> = values
        .str()?
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();
    Ok(options.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn table() -> ObservationTable {
        let df = df!(
            "date" => ["2020-06-01", "2020-06-01", "2020-06-01", "2020-06-01", "2020-06-01", "2020-06-02"],
            "state" => [Some("Bihar"), Some("Bihar"), Some("Assam"), None, Some("Bihar"), Some("Goa")],
            "district" => ["Patna", "Patna", "Kamrup", "Nowhere", "Gaya", "North Goa"],
            "tehsil" => ["Danapur", "Patna Sadar", "Guwahati", "Ghost", "Bodh Gaya", "Bardez"],
            "tmax" => [34.0, 35.0, 30.0, 0.0, 36.0, 31.0],
        )
        .unwrap();
        ObservationTable::try_new(df).unwrap()
    }

    #[test]
    fn test_date_stage_filters_exact_date() -> Result<(), CascadeError> {
        let cascade = FilterCascade::for_date(&table(), date(2020, 6, 1))?;
        assert_eq!(cascade.frame().height(), 5);
        Ok(())
    }

    #[test]
    fn test_empty_date_halts_cascade() {
        let result = FilterCascade::for_date(&table(), date(1999, 1, 1));
        assert!(matches!(result, Err(CascadeError::NoDataForDate(d)) if d == date(1999, 1, 1)));
    }

    #[test]
    fn test_options_sorted_without_nulls() -> Result<(), CascadeError> {
        let cascade = FilterCascade::for_date(&table(), date(2020, 6, 1))?;
        let states = cascade.states()?;

        // Goa only has data on another day; the null state is not an option.
        assert_eq!(states.options(), ["Assam", "Bihar"]);

        let districts = states.descend("Bihar")?;
        assert_eq!(districts.level(), AdminLevel::District);
        assert_eq!(districts.options(), ["Gaya", "Patna"]);

        let tehsils = districts.descend("Patna")?;
        assert_eq!(tehsils.options(), ["Danapur", "Patna Sadar"]);
        Ok(())
    }

    #[test]
    fn test_narrowing_is_monotonic() -> Result<(), CascadeError> {
        let cascade = FilterCascade::for_date(&table(), date(2020, 6, 1))?;
        let states = cascade.states()?;
        let all_states: BTreeSet<&String> = states.options().iter().collect();

        for state in states.options() {
            let districts = states.descend(state)?;
            let narrowed = CascadeStage::new(AdminLevel::State, districts.frame().clone())?;
            assert!(narrowed
                .options()
                .iter()
                .all(|option| all_states.contains(option)));
            assert!(districts.frame().height() <= states.frame().height());
        }
        Ok(())
    }

    #[test]
    fn test_unknown_selection_is_rejected() -> Result<(), CascadeError> {
        let cascade = FilterCascade::for_date(&table(), date(2020, 6, 1))?;
        let states = cascade.states()?;

        assert!(matches!(
            states.narrow("Goa"),
            Err(CascadeError::UnknownSelection { level: AdminLevel::State, .. })
        ));
        Ok(())
    }

    #[test]
    fn test_tehsil_has_no_lower_level() -> Result<(), CascadeError> {
        let cascade = FilterCascade::for_date(&table(), date(2020, 6, 1))?;
        let tehsils = cascade.states()?.descend("Assam")?.descend("Kamrup")?;
        assert!(matches!(
            tehsils.descend("Guwahati"),
            Err(CascadeError::NoLowerLevel(AdminLevel::Tehsil))
        ));
        Ok(())
    }

    #[test]
    fn test_run_defaults_to_first_options() -> Result<(), CascadeError> {
        let cascade = FilterCascade::for_date(&table(), date(2020, 6, 1))?;
        let outcome = cascade.run(&Selection::default())?;

        assert_eq!(outcome.state, "Assam");
        assert_eq!(outcome.district, "Kamrup");
        assert_eq!(outcome.tehsil, "Guwahati");
        assert_eq!(outcome.detail.height(), 1);
        assert_eq!(outcome.date_frame.height(), 5);
        Ok(())
    }

    #[test]
    fn test_run_with_explicit_selection() -> Result<(), CascadeError> {
        let cascade = FilterCascade::for_date(&table(), date(2020, 6, 1))?;
        let selection = Selection {
            state: Some("Bihar".into()),
            district: Some("Patna".into()),
            tehsil: Some("Patna Sadar".into()),
        };
        let outcome = cascade.run(&selection)?;

        assert_eq!(outcome.states, ["Assam", "Bihar"]);
        assert_eq!(outcome.districts, ["Gaya", "Patna"]);
        assert_eq!(outcome.tehsils, ["Danapur", "Patna Sadar"]);

        let values = outcome.detail.column("tmax")?.f64()?;
        assert_eq!(values.get(0), Some(35.0));
        Ok(())
    }

    #[test]
    fn test_run_rejects_district_outside_state() -> Result<(), CascadeError> {
        let cascade = FilterCascade::for_date(&table(), date(2020, 6, 1))?;
        let selection = Selection {
            state: Some("Assam".into()),
            district: Some("Patna".into()),
            tehsil: None,
        };
        assert!(matches!(
            cascade.run(&selection),
            Err(CascadeError::UnknownSelection { level: AdminLevel::District, .. })
        ));
        Ok(())
    }
}
