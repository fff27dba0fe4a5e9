// Draws detection boxes and confidence labels onto the original image.

use crate::pipeline::types::{Detection, DetectionSet};
use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::fs;
use std::path::Path;

const PERSON_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const PPE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

const LABEL_SCALE: f32 = 16.0;
const LABEL_GAP: i32 = 18;
const BOX_THICKNESS: i32 = 2;

/// Candidate font locations tried when no explicit path is given.
const FONT_CANDIDATES: [&str; 3] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/Library/Fonts/Arial.ttf",
];

pub struct Renderer {
    font: Option<FontArc>,
}

impl Renderer {
    /// Build a renderer, loading the label font from `font_path` or from a
    /// set of common system locations. Without a font the renderer still
    /// draws boxes and logs a warning once.
    pub fn new(font_path: Option<&Path>) -> Self {
        let font = load_font(font_path);
        if font.is_none() {
            tracing::warn!("No label font found; annotations will omit text labels");
        }
        Self { font }
    }

    /// Draw every detection in the set onto the image.
    pub fn annotate(&self, image: &mut RgbImage, detections: &DetectionSet) {
        for detection in detections.iter() {
            self.draw_detection(image, detection);
        }
    }

    fn draw_detection(&self, image: &mut RgbImage, detection: &Detection) {
        let color = if detection.is_person() {
            PERSON_COLOR
        } else {
            PPE_COLOR
        };

        let (img_w, img_h) = (image.width(), image.height());
        let rect = match clamped_rect(detection, img_w, img_h) {
            Some(r) => r,
            None => {
                tracing::debug!("Skipping draw of off-canvas box {:?}", detection.bbox);
                return;
            }
        };

        // Nested hollow rects approximate a thick stroke.
        for inset in 0..BOX_THICKNESS {
            let w = rect.width() as i32 - 2 * inset;
            let h = rect.height() as i32 - 2 * inset;
            if w <= 0 || h <= 0 {
                break;
            }
            let inner = Rect::at(rect.left() + inset, rect.top() + inset)
                .of_size(w as u32, h as u32);
            draw_hollow_rect_mut(image, inner, color);
        }

        if let Some(font) = &self.font {
            let label = format!("{}: {:.2}", detection.class_name, detection.confidence);
            let (x, y) = label_origin(rect, img_w, img_h);
            draw_text_mut(image, color, x, y, PxScale::from(LABEL_SCALE), font, &label);
        }
    }
}

/// Clamp a detection box to the canvas and convert it to a draw rect.
/// Returns `None` when nothing of the box is visible.
fn clamped_rect(detection: &Detection, img_w: u32, img_h: u32) -> Option<Rect> {
    let b = &detection.bbox;
    let x = (b.xmin.round() as i64).clamp(0, img_w as i64) as i32;
    let y = (b.ymin.round() as i64).clamp(0, img_h as i64) as i32;
    let x2 = (b.xmax.round() as i64).clamp(0, img_w as i64) as i32;
    let y2 = (b.ymax.round() as i64).clamp(0, img_h as i64) as i32;

    let w = x2 - x;
    let h = y2 - y;
    if w <= 0 || h <= 0 {
        return None;
    }

    Some(Rect::at(x, y).of_size(w as u32, h as u32))
}

/// Anchor for the label text: just above the box's top-left corner,
/// pushed back on-canvas when the box touches the image edge.
fn label_origin(rect: Rect, img_w: u32, img_h: u32) -> (i32, i32) {
    let x = rect.left().clamp(0, (img_w as i32 - 1).max(0));
    let y = (rect.top() - LABEL_GAP).clamp(0, (img_h as i32 - 1).max(0));
    (x, y)
}

fn load_font(font_path: Option<&Path>) -> Option<FontArc> {
    let mut candidates: Vec<&Path> = Vec::new();
    if let Some(path) = font_path {
        candidates.push(path);
    }
    candidates.extend(FONT_CANDIDATES.iter().map(Path::new));

    for path in candidates {
        match fs::read(path) {
            Ok(bytes) => match FontArc::try_from_vec(bytes) {
                Ok(font) => {
                    tracing::debug!("Loaded label font from {}", path.display());
                    return Some(font);
                }
                Err(e) => tracing::warn!("Unusable font file {}: {}", path.display(), e),
            },
            Err(_) => continue,
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::{BBox, Detection};

    fn det(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> Detection {
        Detection::new("person", 0.9, BBox::new(xmin, ymin, xmax, ymax))
    }

    #[test]
    fn test_clamped_rect_inside_canvas() {
        let r = clamped_rect(&det(10.0, 20.0, 50.0, 60.0), 100, 100).unwrap();
        assert_eq!((r.left(), r.top(), r.width(), r.height()), (10, 20, 40, 40));
    }

    #[test]
    fn test_clamped_rect_overhanging_edges() {
        let r = clamped_rect(&det(-20.0, -10.0, 150.0, 120.0), 100, 100).unwrap();
        assert_eq!((r.left(), r.top(), r.width(), r.height()), (0, 0, 100, 100));
    }

    #[test]
    fn test_clamped_rect_fully_off_canvas() {
        assert!(clamped_rect(&det(200.0, 200.0, 300.0, 300.0), 100, 100).is_none());
    }

    #[test]
    fn test_label_stays_on_canvas_near_top_edge() {
        let rect = Rect::at(5, 4).of_size(30, 30);
        let (x, y) = label_origin(rect, 100, 100);
        assert_eq!(x, 5);
        assert_eq!(y, 0);
    }

    #[test]
    fn test_label_below_normal_box() {
        let rect = Rect::at(10, 50).of_size(30, 30);
        assert_eq!(label_origin(rect, 100, 100), (10, 50 - LABEL_GAP));
    }

    #[test]
    fn test_empty_detection_set_leaves_image_untouched() {
        let renderer = Renderer { font: None };
        let mut image = RgbImage::from_pixel(32, 32, Rgb([7, 7, 7]));
        let before = image.clone();
        renderer.annotate(&mut image, &DetectionSet::new());
        assert_eq!(image, before);
    }

    #[test]
    fn test_annotate_draws_box_pixels() {
        let renderer = Renderer { font: None };
        let mut image = RgbImage::from_pixel(64, 64, Rgb([0, 0, 0]));
        let mut set = DetectionSet::new();
        set.push(det(10.0, 10.0, 30.0, 30.0));
        renderer.annotate(&mut image, &set);
        assert_eq!(*image.get_pixel(10, 10), PERSON_COLOR);
        // Interior stays untouched.
        assert_eq!(*image.get_pixel(20, 20), Rgb([0, 0, 0]));
    }
}
