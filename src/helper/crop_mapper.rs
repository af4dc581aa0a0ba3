use anyhow::Error;
use ndarray::{Array2, Axis};
use crate::utils::coordinate::{CropRect, FaceLandmarks};
use crate::utils::matrix::{convert_landmarks_to_ndarray, convert_ndarray_to_landmarks};

/// map_full_to_cropped re-expresses a full-image normalized point in the cropped image.
///
/// The result is clamped to `[0, 1]` on both axes, so a landmark outside the
/// crop is pinned to the nearest edge of the visible image.
///
/// # Arguments
/// * `nx`, `ny` - normalized coordinates in the full image
/// * `crop` - the crop applied before display
///
/// # Returns
/// * `(f64, f64)` - normalized coordinates in the cropped image
pub fn map_full_to_cropped(nx: f64, ny: f64, crop: &CropRect) -> (f64, f64) {
    let x = (nx * crop.full_width - crop.sx) / crop.sw;
    let y = (ny * crop.full_height - crop.sy) / crop.sh;
    (clamp_unit(x), clamp_unit(y))
}

/// map_cropped_to_full is the inverse of `map_full_to_cropped`, without clamping.
pub fn map_cropped_to_full(x: f64, y: f64, crop: &CropRect) -> (f64, f64) {
    let nx = (x * crop.sw + crop.sx) / crop.full_width;
    let ny = (y * crop.sh + crop.sy) / crop.full_height;
    (nx, ny)
}

/// map_landmarks_to_cropped maps every landmark into the cropped image.
///
/// The points go through `map_points_to_cropped` as one `N x 2` matrix. Each
/// point keeps its own `z`; the bridge is remapped only when present.
///
/// # Arguments
/// * `landmarks` - full-image landmarks
/// * `crop` - the crop applied before display
///
/// # Returns
/// * `Result<FaceLandmarks, Error>`
pub fn map_landmarks_to_cropped(landmarks: &FaceLandmarks, crop: &CropRect) -> Result<FaceLandmarks, Error> {
    let points = convert_landmarks_to_ndarray(landmarks)?;
    let mapped = map_points_to_cropped(&points, crop);
    convert_ndarray_to_landmarks(&mapped, landmarks)
}

/// Landmarks in the space of the image that is actually displayed.
///
/// With no crop the landmarks are returned as they are.
pub fn landmarks_for_display(landmarks: &FaceLandmarks, crop: Option<&CropRect>) -> Result<FaceLandmarks, Error> {
    match crop {
        Some(crop) => map_landmarks_to_cropped(landmarks, crop),
        None => Ok(landmarks.clone()),
    }
}

/// map_points_to_cropped maps an `N x 2` matrix of full-image points row by row.
pub fn map_points_to_cropped(points: &Array2<f64>, crop: &CropRect) -> Array2<f64> {
    let mut mapped = points.to_owned();
    for mut row in mapped.axis_iter_mut(Axis(0)) {
        let (x, y) = map_full_to_cropped(row[0], row[1], crop);
        row[0] = x;
        row[1] = y;
    }
    mapped
}

fn clamp_unit(val: f64) -> f64 {
    if val < 0.0 {
        0.0
    } else if val > 1.0 {
        1.0
    } else {
        val
    }
}
