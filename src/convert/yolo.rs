// PascalVOC pixel boxes to YOLO-normalized label lines.

use crate::convert::voc::VocObject;

/// A box in YOLO format: normalized center plus normalized size,
/// each in [0, 1] for in-bounds input boxes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YoloBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// Convert a pixel-space VOC box to YOLO center format.
///
/// The upstream converter subtracted 1 from the pixel center before
/// normalizing, which skews every box left and up by one pixel. That
/// was an off-by-one artifact, not an indexing convention, so the
/// center is computed without the shift here.
pub fn to_yolo(image_width: f32, image_height: f32, object: &VocObject) -> YoloBox {
    let dw = 1.0 / image_width;
    let dh = 1.0 / image_height;

    let x = (object.xmin + object.xmax) / 2.0;
    let y = (object.ymin + object.ymax) / 2.0;
    let w = object.xmax - object.xmin;
    let h = object.ymax - object.ymin;

    YoloBox {
        x: x * dw,
        y: y * dh,
        w: w * dw,
        h: h * dh,
    }
}

/// Render one label-file line: `<class index> <x> <y> <w> <h>`.
pub fn format_label(class_index: usize, yolo: &YoloBox) -> String {
    format!(
        "{} {:.6} {:.6} {:.6} {:.6}",
        class_index, yolo.x, yolo.y, yolo.w, yolo.h
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(xmin: f32, xmax: f32, ymin: f32, ymax: f32) -> VocObject {
        VocObject {
            class_name: "person".to_string(),
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }

    #[test]
    fn test_to_yolo_centered_box() {
        let y = to_yolo(100.0, 100.0, &obj(10.0, 50.0, 20.0, 80.0));
        assert_eq!(y, YoloBox {
            x: 0.3,
            y: 0.5,
            w: 0.4,
            h: 0.6,
        });
    }

    #[test]
    fn test_to_yolo_full_frame_box() {
        let y = to_yolo(200.0, 100.0, &obj(0.0, 200.0, 0.0, 100.0));
        assert_eq!(y, YoloBox {
            x: 0.5,
            y: 0.5,
            w: 1.0,
            h: 1.0,
        });
    }

    #[test]
    fn test_to_yolo_stays_normalized() {
        let y = to_yolo(640.0, 480.0, &obj(600.0, 640.0, 400.0, 480.0));
        for v in [y.x, y.y, y.w, y.h] {
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_format_label() {
        let y = YoloBox {
            x: 0.3,
            y: 0.5,
            w: 0.4,
            h: 0.6,
        };
        assert_eq!(format_label(3, &y), "3 0.300000 0.500000 0.400000 0.600000");
    }
}
