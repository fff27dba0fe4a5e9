use crate::pipeline::types::BBox;

/// Translate a crop-local box into the parent image's coordinate frame.
///
/// Pure offset addition, no clamping: the renderer clamps at draw time,
/// so a PPE box nudged past the image edge by the model is preserved.
pub fn to_full_frame(local: &BBox, offset_x: f32, offset_y: f32) -> BBox {
    BBox {
        xmin: local.xmin + offset_x,
        ymin: local.ymin + offset_y,
        xmax: local.xmax + offset_x,
        ymax: local.ymax + offset_y,
    }
}

/// Integer crop rectangle `(x, y, w, h)` for a box against an image of the
/// given size, clamped to the image bounds.
///
/// Person boxes can extend past the frame edge; slicing them unguarded
/// would read out of range, so the rect is clamped first. Returns `None`
/// when the clamped rect has zero area.
pub fn crop_rect(bbox: &BBox, img_w: u32, img_h: u32) -> Option<(u32, u32, u32, u32)> {
    let x = (bbox.xmin.round() as i64).clamp(0, img_w as i64);
    let y = (bbox.ymin.round() as i64).clamp(0, img_h as i64);
    let x2 = (bbox.xmax.round() as i64).clamp(0, img_w as i64);
    let y2 = (bbox.ymax.round() as i64).clamp(0, img_h as i64);

    let w = x2 - x;
    let h = y2 - y;

    if w <= 0 || h <= 0 {
        return None;
    }

    Some((x as u32, y as u32, w as u32, h as u32))
}
