use chrono::{Duration, NaiveDate};

/// Converts a polars `Date` physical value (days since the Unix epoch) to a `NaiveDate`.
pub(crate) fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(Duration::days(days as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_from_epoch_days() {
        assert_eq!(date_from_epoch_days(0), NaiveDate::from_ymd_opt(1970, 1, 1));
        assert_eq!(date_from_epoch_days(18262), NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(date_from_epoch_days(-1), NaiveDate::from_ymd_opt(1969, 12, 31));
    }
}
