use memmap2::Mmap;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{ProcessingError, Result};
use crate::models::{parse_timestamp, Observation};

/// Wire format of one CSV row. The timestamp stays a string here so
/// parse failures can be reported with their row number.
#[derive(Debug, Deserialize)]
struct RawObservation {
    date: String,
    co: Option<f64>,
    no: Option<f64>,
    no2: Option<f64>,
    o3: Option<f64>,
    so2: Option<f64>,
    pm2_5: Option<f64>,
    pm10: Option<f64>,
    nh3: Option<f64>,
}

/// Reads observation rows from a headed CSV file. Rows with a malformed
/// timestamp or an out-of-range concentration fail the whole read with a
/// row-level error; values are never fabricated for bad input.
pub struct ObservationReader {
    use_mmap: bool,
}

impl ObservationReader {
    pub fn new() -> Self {
        Self { use_mmap: false }
    }

    pub fn with_mmap(use_mmap: bool) -> Self {
        Self { use_mmap }
    }

    pub fn read_observations(&self, path: &Path) -> Result<Vec<Observation>> {
        if self.use_mmap {
            self.read_observations_mmap(path)
        } else {
            self.read_observations_buffered(path)
        }
    }

    fn read_observations_buffered(&self, path: &Path) -> Result<Vec<Observation>> {
        let file = File::open(path)?;
        self.read_from_reader(BufReader::new(file))
    }

    /// Memory-mapped read path for large input files
    fn read_observations_mmap(&self, path: &Path) -> Result<Vec<Observation>> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        self.read_from_reader(&mmap[..])
    }

    pub fn read_from_reader<R: Read>(&self, reader: R) -> Result<Vec<Observation>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut observations = Vec::new();
        for (index, row_result) in csv_reader.deserialize::<RawObservation>().enumerate() {
            let row_number = index + 1;
            let raw = row_result?;
            observations.push(self.convert_row(raw, row_number)?);
        }

        Ok(observations)
    }

    fn convert_row(&self, raw: RawObservation, row_number: usize) -> Result<Observation> {
        let date = parse_timestamp(&raw.date).map_err(|_| ProcessingError::InvalidTimestamp {
            row: row_number,
            value: raw.date.clone(),
        })?;

        let mut observation = Observation::new(date);
        observation.co = raw.co;
        observation.no = raw.no;
        observation.no2 = raw.no2;
        observation.o3 = raw.o3;
        observation.so2 = raw.so2;
        observation.pm2_5 = raw.pm2_5;
        observation.pm10 = raw.pm10;
        observation.nh3 = raw.nh3;

        observation
            .validate_concentrations()
            .map_err(|e| ProcessingError::ObservationValidation {
                message: format!("row {}: {}", row_number, e),
            })?;

        Ok(observation)
    }
}

impl Default for ObservationReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "date,co,no,no2,o3,so2,pm2_5,pm10,nh3";

    fn write_csv(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_read_complete_rows() {
        let file = write_csv(&[
            "2023-01-01 00:00:00,1655.58,1.66,39.41,5.90,17.88,169.29,194.64,5.83",
            "2023-01-01 01:00:00,1869.20,6.82,42.16,1.99,22.17,182.84,211.08,7.66",
        ]);

        let reader = ObservationReader::new();
        let observations = reader.read_observations(file.path()).unwrap();

        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].co, Some(1655.58));
        assert_eq!(observations[0].pm2_5, Some(169.29));
        assert_eq!(observations[1].hour(), 1);
        assert!(observations.iter().all(|o| o.aqi.is_none()));
    }

    #[test]
    fn test_empty_fields_are_absent_not_zero() {
        let file = write_csv(&["2023-01-01 00:00:00,5.0,,,,,,,"]);

        let reader = ObservationReader::new();
        let observations = reader.read_observations(file.path()).unwrap();

        assert_eq!(observations[0].co, Some(5.0));
        assert_eq!(observations[0].no, None);
        assert_eq!(observations[0].nh3, None);
    }

    #[test]
    fn test_malformed_timestamp_is_a_row_error() {
        let file = write_csv(&["01/01/2023 00:00,5.0,,,,,,,"]);

        let reader = ObservationReader::new();
        let error = reader.read_observations(file.path()).unwrap_err();
        match error {
            ProcessingError::InvalidTimestamp { row, value } => {
                assert_eq!(row, 1);
                assert_eq!(value, "01/01/2023 00:00");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_non_numeric_concentration_is_rejected() {
        let file = write_csv(&["2023-01-01 00:00:00,abc,,,,,,,"]);

        let reader = ObservationReader::new();
        assert!(reader.read_observations(file.path()).is_err());
    }

    #[test]
    fn test_negative_concentration_is_rejected() {
        let file = write_csv(&["2023-01-01 00:00:00,-5.0,,,,,,,"]);

        let reader = ObservationReader::new();
        let error = reader.read_observations(file.path()).unwrap_err();
        assert!(matches!(
            error,
            ProcessingError::ObservationValidation { .. }
        ));
    }

    #[test]
    fn test_mmap_read_matches_buffered() {
        let file = write_csv(&[
            "2023-01-01 00:00:00,10.0,1.0,2.0,3.0,4.0,5.0,6.0,7.0",
            "2023-01-01 01:00:00,20.0,,,,,,,",
        ]);

        let buffered = ObservationReader::new()
            .read_observations(file.path())
            .unwrap();
        let mapped = ObservationReader::with_mmap(true)
            .read_observations(file.path())
            .unwrap();

        assert_eq!(buffered, mapped);
    }
}
