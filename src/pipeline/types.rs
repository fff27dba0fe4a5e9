// Core detection types shared across the pipeline stages.

use serde::{Deserialize, Serialize};

/// Full class vocabulary of the annotation corpus, person first.
pub const CLASSES: [&str; 10] = [
    "person",
    "hard-hat",
    "gloves",
    "mask",
    "glasses",
    "boots",
    "vest",
    "ppe-suit",
    "ear-protector",
    "safety-harness",
];

/// PPE detector vocabulary: [`CLASSES`] without `person`, reindexed from 0.
pub fn ppe_classes() -> Vec<&'static str> {
    CLASSES.iter().copied().filter(|c| *c != "person").collect()
}

/// Axis-aligned bounding box in pixel coordinates (xmin, ymin, xmax, ymax).
///
/// A box is always relative to some frame: either the full image or a
/// crop cut out of it. Boxes leaving the cascade are always full-frame.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
}

impl BBox {
    pub fn new(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    pub fn width(&self) -> f32 {
        (self.xmax - self.xmin).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.ymax - self.ymin).max(0.0)
    }
}

/// One predicted object instance.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Detection {
    pub class_name: String,
    pub confidence: f32,
    pub bbox: BBox,
}

impl Detection {
    pub fn new(class_name: impl Into<String>, confidence: f32, bbox: BBox) -> Self {
        Self {
            class_name: class_name.into(),
            confidence,
            bbox,
        }
    }

    /// Whether this detection belongs to the person category (as opposed
    /// to any of the PPE classes). Drives render color selection.
    pub fn is_person(&self) -> bool {
        self.class_name == "person"
    }
}

/// All detections found on one image, in discovery order: each person
/// followed by the PPE items found inside that person's crop.
#[derive(Serialize, Debug, Clone, Default)]
pub struct DetectionSet {
    pub detections: Vec<Detection>,
}

impl DetectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, detection: Detection) {
        self.detections.push(detection);
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Detection> {
        self.detections.iter()
    }
}

/// Per-image record persisted to the run's detections.json.
#[derive(Serialize, Debug, Clone)]
pub struct ImageResult {
    pub file_name: String,
    pub detections: Vec<Detection>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ppe_classes_reindexed_without_person() {
        let ppe = ppe_classes();
        assert_eq!(ppe.len(), 9);
        assert!(!ppe.contains(&"person"));
        assert_eq!(ppe[0], "hard-hat");
        assert_eq!(ppe[8], "safety-harness");
    }

    #[test]
    fn test_bbox_dimensions() {
        let b = BBox::new(10.0, 20.0, 50.0, 80.0);
        assert_eq!(b.width(), 40.0);
        assert_eq!(b.height(), 60.0);

        // Inverted boxes report zero size rather than negative
        let inv = BBox::new(50.0, 80.0, 10.0, 20.0);
        assert_eq!(inv.width(), 0.0);
        assert_eq!(inv.height(), 0.0);
    }

    #[test]
    fn test_detection_category() {
        let person = Detection::new("person", 0.9, BBox::new(0.0, 0.0, 1.0, 1.0));
        let vest = Detection::new("vest", 0.8, BBox::new(0.0, 0.0, 1.0, 1.0));
        assert!(person.is_person());
        assert!(!vest.is_person());
    }
}
