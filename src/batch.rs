//! Directory processing around the detector: scanning, loading, saving the
//! annotated copies and collecting the report.

use image::{DynamicImage, GrayImage, RgbImage};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use crate::detector::{self, DetectionError, DetectionTrace, DetectorConfig, PipelineStages};
use crate::report::CountReport;

const INPUT_DIR: &str = "images";
const OUTPUT_DIR: &str = "output";
const REPORT_FILE: &str = "Cell_Counting_Report.csv";
const ANNOTATED_PREFIX: &str = "counted_";

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to save {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Detection(#[from] DetectionError),
}

/// Paths and parameters for one batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub report_path: PathBuf,
    pub json_report_path: Option<PathBuf>,
    /// When set, intermediate masks are written here.
    pub debug_dir: Option<PathBuf>,
    pub detector: DetectorConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(INPUT_DIR),
            output_dir: PathBuf::from(OUTPUT_DIR),
            report_path: PathBuf::from(REPORT_FILE),
            json_report_path: None,
            debug_dir: None,
            detector: DetectorConfig::default(),
        }
    }
}

/// What happened to a single image.
#[derive(Debug)]
pub struct ImageOutcome {
    pub path: PathBuf,
    pub image_name: String,
    pub result: Result<DetectionTrace, DetectionError>,
}

impl ImageOutcome {
    /// Count to report, zero when the image could not be processed.
    pub fn reported_count(&self) -> u32 {
        self.result.as_ref().map(|t| t.result.count).unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub report: CountReport,
    pub processed: usize,
    pub failed: usize,
}

pub fn is_image_file(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(OsStr::to_str) else {
        return false;
    };
    matches!(ext.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg")
}

/// Image files directly inside `dir`, sorted by path.
pub fn scan_image_dir(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    if !dir.is_dir() {
        return Err(BatchError::NotADirectory(dir.to_path_buf()));
    }

    let entries = fs::read_dir(dir).map_err(|source| BatchError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut images: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_image_file(p))
        .collect();
    images.sort();
    Ok(images)
}

pub fn load_image(path: &Path) -> Result<DynamicImage, DetectionError> {
    image::open(path)
        .map_err(|e| DetectionError::InvalidImage(format!("{}: {e}", path.display())))
}

pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, DetectionError> {
    if bytes.is_empty() {
        return Err(DetectionError::InvalidImage("empty input".to_string()));
    }
    image::load_from_memory(bytes).map_err(|e| DetectionError::InvalidImage(e.to_string()))
}

/// Loads and analyses each path lazily. A failing image yields an outcome
/// with an error and never stops the iteration.
pub fn outcomes<'a>(
    paths: &'a [PathBuf],
    config: &'a DetectorConfig,
) -> impl Iterator<Item = ImageOutcome> + 'a {
    paths.iter().map(move |path| {
        let result = load_image(path).and_then(|img| detector::trace(&img, config));
        ImageOutcome {
            path: path.clone(),
            image_name: image_name(path),
            result,
        }
    })
}

fn image_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn annotated_file_name(image_name: &str) -> String {
    format!("{ANNOTATED_PREFIX}{image_name}")
}

pub fn save_annotated(
    output_dir: &Path,
    image_name: &str,
    annotated: &RgbImage,
) -> Result<PathBuf, BatchError> {
    let path = output_dir.join(annotated_file_name(image_name));
    annotated.save(&path).map_err(|source| BatchError::Save {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Writes the grayscale, smoothed, binary and cleaned rasters as PNGs named
/// after the image stem.
pub fn save_stage_masks(
    debug_dir: &Path,
    image_name: &str,
    stages: &PipelineStages,
) -> Result<Vec<PathBuf>, BatchError> {
    fs::create_dir_all(debug_dir).map_err(|source| BatchError::Io {
        path: debug_dir.to_path_buf(),
        source,
    })?;
    let stem = Path::new(image_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| image_name.to_string());

    let layers: [(&str, &GrayImage); 4] = [
        ("gray", &stages.grayscale),
        ("smoothed", &stages.smoothed),
        ("binary", &stages.binary),
        ("cleaned", &stages.cleaned),
    ];
    let mut written = Vec::with_capacity(layers.len());
    for (suffix, layer) in layers {
        let path = debug_dir.join(format!("{stem}_{suffix}.png"));
        layer.save(&path).map_err(|source| BatchError::Save {
            path: path.clone(),
            source,
        })?;
        written.push(path);
    }
    Ok(written)
}

/// Reads a [`DetectorConfig`] from JSON; missing fields keep their defaults.
pub fn load_detector_config(path: &Path) -> Result<DetectorConfig, BatchError> {
    let text = fs::read_to_string(path).map_err(|source| BatchError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| BatchError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Counts every image in the input directory, saves the annotated copies and
/// writes the report.
pub fn run_batch(config: &BatchConfig) -> Result<BatchSummary, BatchError> {
    config.detector.validate()?;

    let images = scan_image_dir(&config.input_dir)?;
    fs::create_dir_all(&config.output_dir).map_err(|source| BatchError::Io {
        path: config.output_dir.clone(),
        source,
    })?;

    if images.is_empty() {
        log::warn!("No images found in {}", config.input_dir.display());
    } else {
        log::info!(
            "Counting cells in {} images from {}",
            images.len(),
            config.input_dir.display()
        );
    }

    let mut report = CountReport::new();
    let mut failed = 0usize;

    for outcome in outcomes(&images, &config.detector) {
        match &outcome.result {
            Ok(trace) => {
                log::info!("Image: {} -> Count: {}", outcome.image_name, trace.result.count);
                if let Err(e) =
                    save_annotated(&config.output_dir, &outcome.image_name, &trace.result.annotated)
                {
                    log::error!("{e}");
                }
                if let Some(debug_dir) = &config.debug_dir
                    && let Err(e) = save_stage_masks(debug_dir, &outcome.image_name, &trace.stages)
                {
                    log::error!("{e}");
                }
            }
            Err(e) => {
                failed += 1;
                log::warn!("Skipping {}: {e}", outcome.path.display());
            }
        }
        report.push(outcome.image_name.clone(), outcome.reported_count());
    }

    report
        .write_csv(&config.report_path)
        .map_err(|source| BatchError::Io {
            path: config.report_path.clone(),
            source,
        })?;
    log::info!("Report written to {}", config.report_path.display());

    if let Some(json_path) = &config.json_report_path {
        report.write_json(json_path).map_err(|source| BatchError::Io {
            path: json_path.clone(),
            source,
        })?;
        log::info!("JSON report written to {}", json_path.display());
    }

    let processed = report.len() - failed;
    Ok(BatchSummary {
        report,
        processed,
        failed,
    })
}
