use crate::observations::error::ObservationError;
use std::path::{Path, PathBuf};

const PARTITION_EXTENSION: &str = "parquet";

/// One yearly parquet file of a parameter folder, e.g. `data/tmax/2021_tmax.parquet`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Partition {
    pub path: PathBuf,
    /// Year parsed from the leading digits of the file name, if any.
    pub year: Option<i32>,
}

impl Partition {
    fn from_path(path: PathBuf) -> Self {
        let year = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(parse_leading_year);
        Self { path, year }
    }
}

fn parse_leading_year(stem: &str) -> Option<i32> {
    let digits: String = stem.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.len() == 4 {
        digits.parse().ok()
    } else {
        None
    }
}

fn is_partition_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(PARTITION_EXTENSION))
}

/// Lists the parquet partitions directly inside `folder`, sorted by path.
///
/// A folder without partitions yields an empty list; only a missing folder is an error.
pub fn discover_partitions(folder: &Path) -> Result<Vec<Partition>, ObservationError> {
    if !folder.is_dir() {
        return Err(ObservationError::MissingSource(folder.to_path_buf()));
    }

    let entries = std::fs::read_dir(folder)
        .map_err(|e| ObservationError::ReadDir(folder.to_path_buf(), e))?;

    let mut partitions = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| ObservationError::ReadDir(folder.to_path_buf(), e))?
            .path();
        if is_partition_file(&path) {
            partitions.push(Partition::from_path(path));
        }
    }
    partitions.sort();
    Ok(partitions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discover_only_parquet_files_sorted() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("2021_tmax.parquet"), b"")?;
        fs::write(dir.path().join("2020_tmax.PARQUET"), b"")?;
        fs::write(dir.path().join("notes.txt"), b"")?;
        fs::create_dir(dir.path().join("1999_tmax.parquet"))?;

        let partitions = discover_partitions(dir.path())?;
        let names: Vec<_> = partitions
            .iter()
            .map(|p| p.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, ["2020_tmax.PARQUET", "2021_tmax.parquet"]);
        assert_eq!(partitions[0].year, Some(2020));
        assert_eq!(partitions[1].year, Some(2021));
        Ok(())
    }

    #[test]
    fn test_empty_folder_is_not_an_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        assert!(discover_partitions(dir.path())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_missing_folder_is_missing_source() {
        let result = discover_partitions(Path::new("/definitely/not/here/tmax"));
        assert!(matches!(result, Err(ObservationError::MissingSource(_))));
    }

    #[test]
    fn test_year_parsing() {
        assert_eq!(parse_leading_year("1994_rain"), Some(1994));
        assert_eq!(parse_leading_year("rain_1994"), None);
        assert_eq!(parse_leading_year("20211_rain"), None);
    }
}
