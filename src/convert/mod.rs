// Annotation corpus converter: splits a PascalVOC dataset into a
// person-detection dataset and a PPE-detection dataset in YOLO layout.
//
// Input layout:  <input>/images/*.jpg, <input>/labels/*.xml
// Output layout: <output>/{person_detection,ppe_detection}/{images,labels}

pub mod voc;
pub mod yolo;

use crate::pipeline::types::{ppe_classes, CLASSES};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertSummary {
    pub converted: usize,
    pub skipped: usize,
    pub person_examples: usize,
    pub ppe_examples: usize,
}

/// Convert the whole corpus. A malformed annotation file is skipped
/// with a warning; only filesystem setup failures are fatal.
pub fn run_convert(config: &ConvertConfig) -> Result<ConvertSummary> {
    let person_dir = config.output_dir.join("person_detection");
    let ppe_dir = config.output_dir.join("ppe_detection");
    for dir in [&person_dir, &ppe_dir] {
        fs::create_dir_all(dir.join("images"))
            .with_context(|| format!("Failed to create {}", dir.join("images").display()))?;
        fs::create_dir_all(dir.join("labels"))
            .with_context(|| format!("Failed to create {}", dir.join("labels").display()))?;
    }

    // PPE classes reindexed from 0 with person removed.
    let ppe_index: HashMap<&str, usize> = ppe_classes()
        .into_iter()
        .enumerate()
        .map(|(i, name)| (name, i))
        .collect();
    let person_index = CLASSES
        .iter()
        .position(|c| *c == "person")
        .expect("vocabulary contains person");

    let labels_dir = config.input_dir.join("labels");
    let images_dir = config.input_dir.join("images");

    let mut xml_files: Vec<PathBuf> = fs::read_dir(&labels_dir)
        .with_context(|| format!("Failed to read {}", labels_dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("xml"))
        .collect();
    xml_files.sort();

    let mut summary = ConvertSummary::default();

    for xml_path in &xml_files {
        match convert_one(
            xml_path,
            &images_dir,
            &person_dir,
            &ppe_dir,
            person_index,
            &ppe_index,
        ) {
            Ok((has_person, has_ppe)) => {
                summary.converted += 1;
                summary.person_examples += has_person as usize;
                summary.ppe_examples += has_ppe as usize;
            }
            Err(e) => {
                summary.skipped += 1;
                tracing::warn!("Skipping {}: {:#}", xml_path.display(), e);
            }
        }
    }

    tracing::info!(
        "Converted {} annotations ({} person, {} ppe), skipped {}",
        summary.converted,
        summary.person_examples,
        summary.ppe_examples,
        summary.skipped
    );

    Ok(summary)
}

/// Convert one annotation file. Returns which of the two datasets the
/// example landed in.
fn convert_one(
    xml_path: &Path,
    images_dir: &Path,
    person_dir: &Path,
    ppe_dir: &Path,
    person_index: usize,
    ppe_index: &HashMap<&str, usize>,
) -> Result<(bool, bool)> {
    let xml = fs::read_to_string(xml_path).context("Unreadable annotation")?;
    let annotation = voc::parse_annotation(&xml)?;

    let mut person_labels = Vec::new();
    let mut ppe_labels = Vec::new();

    for object in &annotation.objects {
        let yolo_box = yolo::to_yolo(annotation.width, annotation.height, object);

        if object.class_name == "person" {
            person_labels.push(yolo::format_label(person_index, &yolo_box));
        } else if let Some(&index) = ppe_index.get(object.class_name.as_str()) {
            ppe_labels.push(yolo::format_label(index, &yolo_box));
        } else {
            tracing::debug!(
                "Unknown class '{}' in {}",
                object.class_name,
                xml_path.display()
            );
        }
    }

    let stem = xml_path
        .file_stem()
        .and_then(|s| s.to_str())
        .context("Non-UTF8 annotation file name")?;
    let image_name = format!("{stem}.jpg");
    let source_image = images_dir.join(&image_name);

    if !person_labels.is_empty() {
        write_example(person_dir, stem, &image_name, &source_image, &person_labels)?;
    }
    if !ppe_labels.is_empty() {
        write_example(ppe_dir, stem, &image_name, &source_image, &ppe_labels)?;
    }

    Ok((!person_labels.is_empty(), !ppe_labels.is_empty()))
}

fn write_example(
    dataset_dir: &Path,
    stem: &str,
    image_name: &str,
    source_image: &Path,
    labels: &[String],
) -> Result<()> {
    fs::copy(source_image, dataset_dir.join("images").join(image_name))
        .with_context(|| format!("Missing image {}", source_image.display()))?;

    let label_path = dataset_dir.join("labels").join(format!("{stem}.txt"));
    let mut content = labels.join("\n");
    content.push('\n');
    fs::write(&label_path, content)
        .with_context(|| format!("Failed to write {}", label_path.display()))?;

    Ok(())
}
