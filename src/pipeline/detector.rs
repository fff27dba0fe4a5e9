use crate::pipeline::types::{BBox, Detection};
use anyhow::Result;
use image::DynamicImage;
use usls::models::YOLO;
use usls::Config;

/// Detection capability: given a decoded image, return the object
/// instances found in it.
///
/// Both pipeline stages (person, PPE) are instances of this trait; they
/// differ only in the weights and class vocabulary they were built with.
/// Implementations must not be handed an empty image: callers skip
/// zero-area crops before invoking the detector.
pub trait Detector {
    fn detect(&mut self, image: &DynamicImage) -> Result<Vec<Detection>>;
}

/// A wrapper around the USLS YOLO runtime, parameterized by model file
/// and class vocabulary.
pub struct YoloDetector {
    model: YOLO,
    class_names: Vec<&'static str>,
    min_conf: f32,
}

impl YoloDetector {
    /// Load a model from disk. A missing or unloadable model file is a
    /// startup failure: the error propagates up and aborts the run.
    pub fn new(model_path: &str, class_names: Vec<&'static str>, min_conf: f32) -> Result<Self> {
        let config = Config::default()
            .with_model_file(model_path)
            .with_class_names(&class_names);

        #[cfg(target_os = "macos")]
        let config = config.with_model_device(usls::Device::CoreMl);

        let config = config.commit()?;
        let model = YOLO::new(config)?;

        Ok(Self {
            model,
            class_names,
            min_conf,
        })
    }
}

impl Detector for YoloDetector {
    fn detect(&mut self, image: &DynamicImage) -> Result<Vec<Detection>> {
        let input = usls::Image::from(image.clone());
        let results = self.model.forward(&[input])?;

        let mut detections = Vec::new();
        for y in results {
            for hbb in y.hbbs {
                let confidence = hbb.confidence().unwrap_or(0.0);
                if confidence < self.min_conf {
                    continue;
                }

                let class_name = match hbb.name() {
                    Some(name) => name.to_string(),
                    None => self
                        .class_names
                        .get(hbb.id().unwrap_or(0))
                        .copied()
                        .unwrap_or("unknown")
                        .to_string(),
                };

                let bbox = BBox::new(
                    hbb.xmin(),
                    hbb.ymin(),
                    hbb.xmin() + hbb.width(),
                    hbb.ymin() + hbb.height(),
                );
                detections.push(Detection::new(class_name, confidence, bbox));
            }
        }

        Ok(detections)
    }
}
