// Two-stage cascade: person detection on the full image, then PPE
// detection inside each person crop, remapped back to the full frame.

use crate::pipeline::detector::Detector;
use crate::pipeline::geometry::{crop_rect, to_full_frame};
use crate::pipeline::types::DetectionSet;
use anyhow::Result;
use image::DynamicImage;

/// Run the person → PPE cascade over one image.
///
/// Detections accumulate in discovery order: each person, then the PPE
/// items found in that person's crop (in detector order). Every box in
/// the returned set is in the full image's coordinate frame.
///
/// Overlapping person boxes are processed independently; PPE items seen
/// in two overlapping crops appear twice. That matches the upstream
/// behavior and is accepted, not deduplicated.
pub fn run_cascade(
    person_detector: &mut dyn Detector,
    ppe_detector: &mut dyn Detector,
    image: &DynamicImage,
) -> Result<DetectionSet> {
    let mut set = DetectionSet::new();

    let person_detections = person_detector.detect(image)?;

    for person in person_detections {
        let person_box = person.bbox;
        let rect = crop_rect(&person_box, image.width(), image.height());
        set.push(person);

        // Degenerate crop: keep the person, skip the PPE pass.
        let (x, y, w, h) = match rect {
            Some(r) => r,
            None => {
                tracing::debug!("Skipping PPE pass for degenerate person box {:?}", person_box);
                continue;
            }
        };

        let crop = image.crop_imm(x, y, w, h);
        let local_detections = ppe_detector.detect(&crop)?;

        // Remap by the clamped crop origin, not the raw person box:
        // the crop pixels start at the clamped offset.
        let (offset_x, offset_y) = (x as f32, y as f32);
        for mut ppe in local_detections {
            ppe.bbox = to_full_frame(&ppe.bbox, offset_x, offset_y);
            set.push(ppe);
        }
    }

    Ok(set)
}
