use clap::Parser;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use cell_counter::batch::{BatchConfig, BatchError, load_detector_config, run_batch};
use cell_counter::detector::DetectorConfig;
use cell_counter::synthetic::write_sample_slide;

#[derive(Parser, Debug)]
#[command(
    name = "cell_counter",
    about = "Count cells in every image of a directory and write a CSV report",
    version
)]
struct Cli {
    /// Directory containing input images (.jpg, .jpeg, .png)
    #[arg(short = 'i', long = "input", default_value = "images")]
    input: PathBuf,

    /// Directory receiving the annotated `counted_*` images
    #[arg(short = 'o', long = "output", default_value = "output")]
    output: PathBuf,

    /// CSV report path
    #[arg(short = 'r', long = "report", default_value = "Cell_Counting_Report.csv")]
    report: PathBuf,

    /// JSON file with detector parameters
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Exclusive lower area bound, overrides the config file
    #[arg(long = "min-area")]
    min_area: Option<f64>,

    /// Exclusive upper area bound, overrides the config file
    #[arg(long = "max-area")]
    max_area: Option<f64>,

    /// Also write the report as JSON
    #[arg(long = "json")]
    json: Option<PathBuf>,

    /// Dump grayscale/smoothed/binary/cleaned masks for every image
    #[arg(long = "debug-dir")]
    debug_dir: Option<PathBuf>,

    /// Render a synthetic sample slide into the input directory first
    #[arg(long = "sample")]
    sample: bool,
}

/// Detector parameters from `--config`, with the area flags applied on top.
fn detector_config(cli: &Cli) -> Result<DetectorConfig, BatchError> {
    let mut detector = match &cli.config {
        Some(path) => load_detector_config(path)?,
        None => DetectorConfig::default(),
    };
    if let Some(min_area) = cli.min_area {
        detector.min_area = min_area;
    }
    if let Some(max_area) = cli.max_area {
        detector.max_area = max_area;
    }
    Ok(detector)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let detector = detector_config(&cli)?;

    if cli.sample {
        fs::create_dir_all(&cli.input)?;
        let sample_path = cli.input.join("sample_slide.png");
        let cells = write_sample_slide(&sample_path)?;
        log::info!("Wrote {} with {cells} cells", sample_path.display());
    }

    let config = BatchConfig {
        input_dir: cli.input,
        output_dir: cli.output,
        report_path: cli.report,
        json_report_path: cli.json,
        debug_dir: cli.debug_dir,
        detector,
    };

    log::info!("--- Starting cell counting ---");
    let summary = run_batch(&config)?;
    log::info!(
        "--- Processing done: {} images, {} failed, {} cells total ---",
        summary.report.len(),
        summary.failed,
        summary.report.total()
    );
    log::info!("Annotated images are in {}", config.output_dir.display());

    Ok(())
}
