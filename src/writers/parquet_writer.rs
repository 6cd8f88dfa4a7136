use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use crate::error::{ProcessingError, Result};
use crate::models::{Observation, Pollutant};
use crate::utils::constants::DEFAULT_ROW_GROUP_SIZE;

pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            "snappy" => Compression::SNAPPY,
            "gzip" => Compression::GZIP(GzipLevel::default()),
            "lz4" => Compression::LZ4,
            "zstd" => Compression::ZSTD(parquet::basic::ZstdLevel::default()),
            "none" => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Write enriched observations to a Parquet file
    pub fn write_observations(&self, observations: &[Observation], path: &Path) -> Result<()> {
        self.write_observations_batched(observations, path, observations.len().max(1))
    }

    /// Write observations in batches for memory efficiency
    pub fn write_observations_batched(
        &self,
        observations: &[Observation],
        path: &Path,
        batch_size: usize,
    ) -> Result<()> {
        if observations.is_empty() {
            return Ok(());
        }

        let schema = self.create_schema();
        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;
        for chunk in observations.chunks(batch_size.max(1)) {
            let batch = self.observations_to_batch(chunk, schema.clone())?;
            writer.write(&batch)?;
        }
        writer.close()?;

        Ok(())
    }

    /// Arrow schema: timestamp, eight nullable concentrations, nullable
    /// derived AQI and category
    fn create_schema(&self) -> Arc<Schema> {
        let mut fields = vec![Field::new(
            "date",
            DataType::Timestamp(TimeUnit::Microsecond, None),
            false,
        )];

        for pollutant in Pollutant::ALL {
            fields.push(Field::new(
                pollutant.column_name(),
                DataType::Float64,
                true,
            ));
        }

        fields.push(Field::new("aqi", DataType::UInt16, true));
        fields.push(Field::new("aqi_category", DataType::Utf8, true));

        Arc::new(Schema::new(fields))
    }

    fn observations_to_batch(
        &self,
        observations: &[Observation],
        schema: Arc<Schema>,
    ) -> Result<RecordBatch> {
        let timestamps: Vec<i64> = observations
            .iter()
            .map(|o| o.date.and_utc().timestamp_micros())
            .collect();

        let mut columns: Vec<ArrayRef> =
            vec![Arc::new(TimestampMicrosecondArray::from(timestamps))];

        for pollutant in Pollutant::ALL {
            let values: Vec<Option<f64>> = observations
                .iter()
                .map(|o| o.concentration(pollutant))
                .collect();
            columns.push(Arc::new(Float64Array::from(values)));
        }

        let aqis: Vec<Option<u16>> = observations.iter().map(|o| o.aqi).collect();
        columns.push(Arc::new(UInt16Array::from(aqis)));

        let categories: StringArray = observations
            .iter()
            .map(|o| o.aqi_category.as_deref())
            .collect();
        columns.push(Arc::new(categories));

        let batch = RecordBatch::try_new(schema, columns)?;
        Ok(batch)
    }

    /// Read back up to `limit` observations from a Parquet file
    pub fn read_sample_observations(&self, path: &Path, limit: usize) -> Result<Vec<Observation>> {
        use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

        let file = File::open(path)?;
        let parquet_reader = ParquetRecordBatchReaderBuilder::try_new(file)?
            .with_batch_size(limit.clamp(1, 8192))
            .build()?;

        let mut observations = Vec::new();

        for batch_result in parquet_reader {
            let batch = batch_result?;

            let dates = downcast::<TimestampMicrosecondArray>(&batch, 0, "date")?;
            let aqis = downcast::<UInt16Array>(&batch, 9, "aqi")?;
            let categories = downcast::<StringArray>(&batch, 10, "aqi_category")?;

            let mut pollutant_columns = Vec::with_capacity(Pollutant::ALL.len());
            for (offset, pollutant) in Pollutant::ALL.iter().enumerate() {
                pollutant_columns.push(downcast::<Float64Array>(
                    &batch,
                    offset + 1,
                    pollutant.column_name(),
                )?);
            }

            for row in 0..batch.num_rows() {
                let date = chrono::DateTime::from_timestamp_micros(dates.value(row))
                    .map(|dt| dt.naive_utc())
                    .ok_or_else(|| {
                        ProcessingError::InvalidFormat(
                            "Invalid timestamp in Parquet file".to_string(),
                        )
                    })?;

                let mut observation = Observation::new(date);
                for (offset, pollutant) in Pollutant::ALL.iter().enumerate() {
                    let column = pollutant_columns[offset];
                    if !column.is_null(row) {
                        observation.set_concentration(*pollutant, column.value(row));
                    }
                }
                if !aqis.is_null(row) {
                    observation.aqi = Some(aqis.value(row));
                }
                if !categories.is_null(row) {
                    observation.aqi_category = Some(categories.value(row).to_string());
                }

                observations.push(observation);
                if observations.len() >= limit {
                    return Ok(observations);
                }
            }
        }

        Ok(observations)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let file_metadata = metadata.file_metadata();
        let row_groups = metadata.num_row_groups();
        let total_rows = file_metadata.num_rows();
        let file_size = std::fs::metadata(path)?.len();

        let mut row_group_sizes = Vec::new();
        for i in 0..row_groups {
            row_group_sizes.push(metadata.row_group(i).num_rows());
        }

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size,
        })
    }
}

fn downcast<'a, T: 'static>(
    batch: &'a RecordBatch,
    column: usize,
    name: &str,
) -> Result<&'a T> {
    batch
        .column(column)
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| ProcessingError::Config(format!("Invalid {} column type", name)))
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Rows: {}\nRow Groups: {}\nFile Size: {:.1} KB",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1024.0
        )
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::AqiEngine;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample_observations() -> Vec<Observation> {
        let base = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        let mut first = Observation::new(base);
        first.co = Some(5.0);
        first.pm10 = Some(40.0);

        // No pollutant in range: derived fields stay undefined
        let mut second = Observation::new(base + chrono::Duration::hours(1));
        second.co = Some(900.0);

        let mut observations = vec![first, second];
        AqiEngine::new().enrich_all(&mut observations);
        observations
    }

    #[test]
    fn test_round_trip_preserves_nulls() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("observations.parquet");

        let observations = sample_observations();
        let writer = ParquetWriter::new();
        writer.write_observations(&observations, &path).unwrap();

        let restored = writer.read_sample_observations(&path, 10).unwrap();
        assert_eq!(restored, observations);
        assert_eq!(restored[0].aqi, Some(150));
        assert_eq!(restored[1].aqi, None);
        assert_eq!(restored[1].aqi_category, None);
        assert_eq!(restored[1].pm10, None);
    }

    #[test]
    fn test_file_info() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("observations.parquet");

        let writer = ParquetWriter::new();
        writer
            .write_observations(&sample_observations(), &path)
            .unwrap();

        let info = writer.get_file_info(&path).unwrap();
        assert_eq!(info.total_rows, 2);
        assert!(info.file_size > 0);
    }

    #[test]
    fn test_unsupported_compression_is_rejected() {
        assert!(ParquetWriter::new().with_compression("brotli9000").is_err());
    }

    #[test]
    fn test_empty_write_is_a_no_op() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.parquet");

        ParquetWriter::new().write_observations(&[], &path).unwrap();
        assert!(!path.exists());
    }
}
