use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use crate::aggregators::{hourly_average, weekday_average, HourlyAverage, WeekdayAverage};
use crate::analyzers::PollutionAnalyzer;
use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::processors::{IntegrityChecker, ParallelProcessor};
use crate::utils::progress::ProgressReporter;
use crate::writers::ParquetWriter;

pub async fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Process {
            input_file,
            output_file,
            compression,
            validate_only,
            mmap,
            max_workers,
            chunk_size,
        } => {
            println!("Processing air quality observations...");
            println!("Input file: {}", input_file.display());
            println!("Workers: {}, Chunk size: {}", max_workers, chunk_size);

            let progress = ProgressReporter::new_spinner("Processing data...", false);

            let processor = ParallelProcessor::new(max_workers)
                .with_chunk_size(chunk_size)
                .with_mmap(mmap);

            let (observations, report) = processor.process_file(&input_file, Some(&progress)).await?;

            progress.finish_with_message(&format!("Processed {} observations", observations.len()));

            let checker = IntegrityChecker::new();
            println!("\n{}", checker.generate_summary(&report));

            print_hourly_table(&hourly_average(&observations));
            print_weekday_table(&weekday_average(&observations));

            if validate_only {
                println!("\nValidation complete - no output file written");
                return Ok(());
            }

            if observations.is_empty() {
                println!("\nNo observations to write");
                return Ok(());
            }

            let output_file = output_file.unwrap_or_else(default_output_file);
            println!(
                "\nWriting {} observations to Parquet file...",
                observations.len()
            );
            let writer = ParquetWriter::new().with_compression(&compression)?;

            if let Some(parent) = output_file.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }

            writer.write_observations_batched(&observations, &output_file, chunk_size)?;

            let file_info = writer.get_file_info(&output_file)?;
            println!("\n{}", file_info.summary());
            println!("\nProcessing complete!");
        }

        Commands::Validate {
            input_file,
            max_workers,
        } => {
            println!("Validating air quality observations...");
            println!("Input file: {}", input_file.display());

            let progress = ProgressReporter::new_spinner("Validating data...", false);

            let processor = ParallelProcessor::new(max_workers);
            let (_, report) = processor.process_file(&input_file, Some(&progress)).await?;

            progress.finish_with_message("Validation complete");

            let checker = IntegrityChecker::new();
            println!("\n{}", checker.generate_summary(&report));

            if report.unindexed_observations == 0 {
                println!("✅ All observations received an AQI");
            } else {
                println!(
                    "⚠️  {} observations have no derivable AQI",
                    report.unindexed_observations
                );
            }
        }

        Commands::Aggregate {
            input_file,
            json,
            max_workers,
        } => {
            let progress = ProgressReporter::new_spinner("Aggregating data...", json);

            let processor = ParallelProcessor::new(max_workers);
            let (observations, _) = processor.process_file(&input_file, Some(&progress)).await?;

            progress.finish_with_message(&format!("Aggregated {} observations", observations.len()));

            let hourly = hourly_average(&observations);
            let weekday = weekday_average(&observations);

            if json {
                let payload = serde_json::json!({
                    "hourly": hourly
                        .iter()
                        .map(|row| serde_json::json!({"hour": row.hour, "mean_aqi": row.mean_aqi}))
                        .collect::<Vec<_>>(),
                    "weekday": weekday
                        .iter()
                        .map(|row| serde_json::json!({
                            "weekday": row.weekday_name(),
                            "mean_aqi": row.mean_aqi,
                        }))
                        .collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                print_hourly_table(&hourly);
                print_weekday_table(&weekday);
            }
        }

        Commands::Info {
            file,
            sample,
            analysis_limit,
        } => {
            println!("Analyzing Parquet file: {}", file.display());

            let writer = ParquetWriter::new();
            let file_info = writer.get_file_info(&file)?;

            let records_to_read = if analysis_limit == 0 {
                file_info.total_rows as usize
            } else {
                analysis_limit.min(file_info.total_rows as usize)
            };
            let observations = writer.read_sample_observations(&file, records_to_read)?;

            let analyzer = PollutionAnalyzer::new();
            let statistics = analyzer.analyze(&observations)?;
            println!("\n{}", statistics.detailed_summary());

            println!("\nFile Details:");
            println!("{}", file_info.summary());

            if sample > 0 {
                println!("\nSample Observations (showing up to {}):", sample);
                for (i, observation) in observations.iter().take(sample).enumerate() {
                    let aqi = observation
                        .aqi
                        .map(|v| v.to_string())
                        .unwrap_or_else(|| "n/a".to_string());
                    let category = observation.aqi_category.as_deref().unwrap_or("n/a");
                    println!(
                        "{}. {}: AQI={} ({})",
                        i + 1,
                        observation.date,
                        aqi,
                        category
                    );
                }
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn default_output_file() -> PathBuf {
    PathBuf::from(format!(
        "aqi-observations-{}.parquet",
        chrono::Local::now().format("%y%m%d")
    ))
}

fn print_hourly_table(rows: &[HourlyAverage]) {
    println!("\nHourly Average AQI:");
    if rows.is_empty() {
        println!("- no AQI-bearing observations");
        return;
    }
    for row in rows {
        println!("- {:02}:00  {:.1}", row.hour, row.mean_aqi);
    }
}

fn print_weekday_table(rows: &[WeekdayAverage]) {
    println!("\nAverage AQI by Day of the Week:");
    for row in rows {
        match row.mean_aqi {
            Some(mean) => println!("- {:<9}  {:.1}", row.weekday_name(), mean),
            None => println!("- {:<9}  n/a", row.weekday_name()),
        }
    }
}
