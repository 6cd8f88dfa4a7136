/// Number of pollutant fields on an observation
pub const POLLUTANT_COUNT: usize = 8;

/// Highest concentration covered by the breakpoint table (ug/m^3)
pub const MAX_INDEXED_CONCENTRATION: f64 = 500.4;

/// Highest AQI value covered by the category table
pub const MAX_AQI: u16 = 500;

/// Accepted timestamp layouts for the observation CSV
pub const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Processing defaults
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
