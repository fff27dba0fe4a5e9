// Batch driver: feeds a directory of images through the cascade on a
// pool of worker threads and writes annotated copies plus a
// detections.json sidecar to the output directory.

use crate::pipeline::cascade::run_cascade;
use crate::pipeline::detector::YoloDetector;
use crate::pipeline::render::Renderer;
use crate::pipeline::types::{ppe_classes, ImageResult};
use anyhow::{Context, Result};
use crossbeam::channel;
use image::ImageFormat;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "webp", "tiff"];

/// Explicit configuration for one inference run (no ambient state).
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub person_model_path: String,
    pub ppe_model_path: String,
    pub min_confidence: f32,
    pub workers: usize,
    pub font_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
}

/// Run the cascade over every image in the input directory.
///
/// Model-load failures abort the run before any image is touched.
/// Per-image failures (unreadable file, encode error) are logged and
/// counted, never fatal.
pub fn run_batch(config: &BatchConfig) -> Result<BatchSummary> {
    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            config.output_dir.display()
        )
    })?;

    let images = list_images(&config.input_dir)?;
    if images.is_empty() {
        tracing::warn!("No images found in {}", config.input_dir.display());
        return Ok(BatchSummary {
            processed: 0,
            skipped: 0,
        });
    }

    let workers = config.workers.max(1);
    tracing::info!(
        "Processing {} images with {} worker(s)",
        images.len(),
        workers
    );

    let progress = ProgressBar::new(images.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let (job_tx, job_rx) = channel::bounded::<PathBuf>(workers * 2);
    let (result_tx, result_rx) = channel::unbounded::<ImageResult>();
    // Workers report model-load success before any job is dispatched.
    let (ready_tx, ready_rx) = channel::bounded::<Result<()>>(workers);

    let skipped = Arc::new(AtomicUsize::new(0));
    let mut handles = Vec::with_capacity(workers);

    for _ in 0..workers {
        let job_rx = job_rx.clone();
        let result_tx = result_tx.clone();
        let ready_tx = ready_tx.clone();
        let skipped = skipped.clone();
        let progress = progress.clone();
        let config = config.clone();

        handles.push(thread::spawn(move || {
            inference_worker(&config, job_rx, result_tx, ready_tx, skipped, progress)
        }));
    }
    drop(job_rx);
    drop(result_tx);
    drop(ready_tx);

    // Fail fast if any worker could not load its models.
    for _ in 0..workers {
        if let Ok(Err(e)) = ready_rx.recv() {
            drop(job_tx);
            for handle in handles {
                let _ = handle.join();
            }
            return Err(e.context("Failed to load detection models"));
        }
    }

    for path in &images {
        if job_tx.send(path.clone()).is_err() {
            break;
        }
    }
    drop(job_tx);

    let mut results: Vec<ImageResult> = result_rx.iter().collect();

    for handle in handles {
        if let Err(e) = handle.join() {
            tracing::error!("Inference worker panicked: {:?}", e);
        }
    }
    progress.finish_and_clear();

    // Workers race, so order the sidecar by filename for stable output.
    results.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    let sidecar_path = config.output_dir.join("detections.json");
    let json = serde_json::to_string_pretty(&results)?;
    fs::write(&sidecar_path, json)
        .with_context(|| format!("Failed to write {}", sidecar_path.display()))?;

    let summary = BatchSummary {
        processed: results.len(),
        skipped: skipped.load(Ordering::Relaxed),
    };
    tracing::info!(
        "Batch complete: {} processed, {} skipped",
        summary.processed,
        summary.skipped
    );

    Ok(summary)
}

/// Worker loop: owns its own detector pair (models are not shared
/// between threads) and processes images until the job channel closes.
fn inference_worker(
    config: &BatchConfig,
    job_rx: channel::Receiver<PathBuf>,
    result_tx: channel::Sender<ImageResult>,
    ready_tx: channel::Sender<Result<()>>,
    skipped: Arc<AtomicUsize>,
    progress: ProgressBar,
) {
    let detectors = (
        YoloDetector::new(
            &config.person_model_path,
            vec!["person"],
            config.min_confidence,
        ),
        YoloDetector::new(&config.ppe_model_path, ppe_classes(), config.min_confidence),
    );

    let (mut person_detector, mut ppe_detector) = match detectors {
        (Ok(p), Ok(q)) => {
            let _ = ready_tx.send(Ok(()));
            (p, q)
        }
        (Err(e), _) | (_, Err(e)) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    let renderer = Renderer::new(config.font_path.as_deref());

    for path in job_rx {
        match process_image(
            &path,
            &config.output_dir,
            &mut person_detector,
            &mut ppe_detector,
            &renderer,
        ) {
            Ok(result) => {
                if result_tx.send(result).is_err() {
                    break;
                }
            }
            Err(e) => {
                skipped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!("Skipping {}: {:#}", path.display(), e);
            }
        }
        progress.inc(1);
    }
}

/// Detect, render and write out one image. Output uses write-then-rename
/// so an interrupted run never leaves a partial file.
fn process_image(
    path: &Path,
    output_dir: &Path,
    person_detector: &mut YoloDetector,
    ppe_detector: &mut YoloDetector,
    renderer: &Renderer,
) -> Result<ImageResult> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .context("Non-UTF8 file name")?
        .to_string();

    let image = image::open(path).with_context(|| "Unreadable image")?;

    let detections = run_cascade(person_detector, ppe_detector, &image)?;

    let mut canvas = image.to_rgb8();
    renderer.annotate(&mut canvas, &detections);

    let out_path = output_dir.join(&file_name);
    let format = ImageFormat::from_path(&out_path)
        .with_context(|| format!("Unrecognized output format for {}", file_name))?;

    let tmp_path = output_dir.join(format!("{file_name}.tmp"));
    canvas
        .save_with_format(&tmp_path, format)
        .with_context(|| format!("Failed to encode {}", tmp_path.display()))?;
    fs::rename(&tmp_path, &out_path)
        .with_context(|| format!("Failed to move output into place for {}", file_name))?;

    Ok(ImageResult {
        file_name,
        detections: detections.detections,
    })
}

/// Enumerate decodable images directly under the input directory,
/// sorted by filename so runs are reproducible.
fn list_images(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut images: Vec<PathBuf> = walkdir::WalkDir::new(input_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();

    images.sort();
    Ok(images)
}
