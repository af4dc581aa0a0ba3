use anyhow::Error;
use ndarray::Array2;
use crate::utils::coordinate::{FaceLandmarks, LandmarkPoint};

/// convert_landmarks_to_ndarray stacks the named landmarks into an `N x 2` matrix of `(x, y)`.
///
/// Rows follow `FaceLandmarks::named_points`; the bridge, when present, is appended as the last row.
///
/// # Arguments
/// * `landmarks` - &FaceLandmarks
///
/// # Returns
/// * `Result<Array2<f64>, Error>`
pub fn convert_landmarks_to_ndarray(landmarks: &FaceLandmarks) -> Result<Array2<f64>, Error> {
    let mut result: Vec<f64> = Vec::with_capacity((FaceLandmarks::NAMED_POINTS + 1) * 2);
    let mut nrows = 0;
    let ncols = 2;

    for point in landmarks.named_points().iter().chain(landmarks.bridge.iter()) {
        result.extend_from_slice(&[point.x, point.y]);
        nrows += 1;
    }

    let arr = Array2::from_shape_vec((nrows, ncols), result)?;
    Ok(arr)
}

/// convert_ndarray_to_landmarks writes an `N x 2` matrix back over the `(x, y)` of `template`.
///
/// `z` values come from `template`. The matrix must have 13 rows, or 14 when
/// the template carries a bridge.
///
/// # Arguments
/// * `arr` - &Array2<f64>
/// * `template` - &FaceLandmarks
///
/// # Returns
/// * `Result<FaceLandmarks, Error>`
pub fn convert_ndarray_to_landmarks(arr: &Array2<f64>, template: &FaceLandmarks) -> Result<FaceLandmarks, Error> {
    let expected = FaceLandmarks::NAMED_POINTS + usize::from(template.bridge.is_some());
    if arr.nrows() != expected || arr.ncols() != 2 {
        return Err(Error::msg(format!(
            "expected a {expected}x2 landmark matrix, got {}x{}",
            arr.nrows(),
            arr.ncols()
        )));
    }

    let row = |i: usize, z: f64| LandmarkPoint::new(arr[[i, 0]], arr[[i, 1]], z);
    Ok(FaceLandmarks {
        left_eye: row(0, template.left_eye.z),
        right_eye: row(1, template.right_eye.z),
        nose_tip: row(2, template.nose_tip.z),
        left_ear: row(3, template.left_ear.z),
        right_ear: row(4, template.right_ear.z),
        chin: row(5, template.chin.z),
        forehead: row(6, template.forehead.z),
        left_eye_upper: row(7, template.left_eye_upper.z),
        left_eye_lower: row(8, template.left_eye_lower.z),
        right_eye_upper: row(9, template.right_eye_upper.z),
        right_eye_lower: row(10, template.right_eye_lower.z),
        face_left: row(11, template.face_left.z),
        face_right: row(12, template.face_right.z),
        bridge: template.bridge.map(|b| row(FaceLandmarks::NAMED_POINTS, b.z)),
    })
}
