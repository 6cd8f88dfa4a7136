use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "aqi-processor")]
#[command(about = "Air quality data processor deriving AQI values and categories")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Derive AQI values for a CSV of pollutant readings and write Parquet
    Process {
        #[arg(short, long, help = "Input observation CSV file")]
        input_file: PathBuf,

        #[arg(
            short,
            long,
            help = "Output Parquet file path [default: aqi-observations-{YYMMDD}.parquet]"
        )]
        output_file: Option<PathBuf>,

        #[arg(short, long, default_value = "snappy")]
        compression: String,

        #[arg(long, default_value = "false")]
        validate_only: bool,

        #[arg(long, default_value = "false", help = "Memory-map the input file")]
        mmap: bool,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,

        #[arg(long, default_value = "1000")]
        chunk_size: usize,
    },

    /// Validate observation data without writing output
    Validate {
        #[arg(short, long, help = "Input observation CSV file")]
        input_file: PathBuf,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,
    },

    /// Print hourly and weekday mean AQI for a CSV of pollutant readings
    Aggregate {
        #[arg(short, long, help = "Input observation CSV file")]
        input_file: PathBuf,

        #[arg(long, default_value = "false", help = "Emit aggregates as JSON")]
        json: bool,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,
    },

    /// Display information about a processed Parquet file
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "10")]
        sample: usize,

        #[arg(
            long,
            default_value = "0",
            help = "Maximum records to analyze (0 = all records)"
        )]
        analysis_limit: usize,
    },
}
