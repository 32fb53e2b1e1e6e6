use crate::crop::CropRegion;
use crate::face_detector::FaceLandmarks;

/// Move source-image landmarks onto the padded output canvas of `region`.
pub fn remap(landmarks: &FaceLandmarks, region: &CropRegion) -> FaceLandmarks {
    let offset = region.canvas_offset();
    landmarks.map(|p| {
        let mut local = p;
        local.x += offset.x - region.origin_x;
        local.y += offset.y - region.origin_y;
        local
    })
}
