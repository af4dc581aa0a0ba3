use log::debug;
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use crate::utils::coordinate::{FaceLandmarks, LandmarkPoint, Size};

/// Native pixel width the frame overlay assets are authored at.
pub const REFERENCE_ASSET_WIDTH_PX: f64 = 400.0;

/// Eye-line tilts smaller than this, in degrees, are treated as level.
pub const SNAP_ANGLE_DEG: f64 = 3.0;

/// How the face image is fitted into its container.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FitMode {
    /// Fill the container, cropping overflow.
    Cover,
    /// Show the whole image, letterboxed.
    Contain,
}

/// Image-to-container mapping for one fit mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageFit {
    pub scale: f64,
    /// Top-left corner of the drawn image inside the container.
    pub offset: Vector2<f64>,
    natural: Size,
}

impl ImageFit {
    /// Returns `None` if either size is degenerate.
    pub fn new(container: Size, natural: Size, mode: FitMode) -> Option<Self> {
        if container.is_degenerate() || natural.is_degenerate() {
            return None
        }
        let ratio_w = container.width / natural.width;
        let ratio_h = container.height / natural.height;
        let scale = match mode {
            FitMode::Cover => ratio_w.max(ratio_h),
            FitMode::Contain => ratio_w.min(ratio_h),
        };
        let drawn_width = natural.width * scale;
        let drawn_height = natural.height * scale;
        let offset = Vector2::new(
            (container.width - drawn_width) / 2.0,
            (container.height - drawn_height) / 2.0,
        );
        Some(ImageFit { scale, offset, natural })
    }

    /// Normalized image point to container pixels.
    pub fn to_display(&self, p: &LandmarkPoint) -> Point2<f64> {
        let natural_px = Point2::new(p.x * self.natural.width, p.y * self.natural.height);
        natural_px * self.scale + self.offset
    }
}

/// Raw placement of the frame before user adjustments.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FrameTransformResult {
    /// Anchor for the frame center, container pixels.
    pub mid_x: f64,
    pub mid_y: f64,
    /// Multiplier against `REFERENCE_ASSET_WIDTH_PX`.
    pub scale_factor: f64,
    pub angle_rad: f64,
}

/// Everything the engine needs besides the landmarks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformInput {
    pub frame_width_mm: f64,
    pub face_width_mm: f64,
    pub container: Size,
    pub natural: Size,
    pub fit_mode: FitMode,
}

/// Geometry engine, parameterized by the two tunable constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTransformEngine {
    reference_asset_width_px: f64,
    snap_angle_deg: f64,
}

impl FrameTransformEngine {
    pub fn new(reference_asset_width_px: f64, snap_angle_deg: f64) -> Self {
        FrameTransformEngine {
            reference_asset_width_px,
            snap_angle_deg,
        }
    }

    /// compute places a frame of known physical width on the displayed face.
    ///
    /// `landmarks` must already be in the space of the displayed image
    /// (cropped and remapped if a crop is shown).
    ///
    /// Returns `None` for a zero-sized container or image, a non-positive
    /// face or frame width, or a face that spans zero pixels. Callers fall
    /// back to a neutral placement.
    ///
    /// # Arguments
    /// * `landmarks` - &FaceLandmarks
    /// * `input` - &TransformInput
    ///
    /// # Returns
    /// * `Option<FrameTransformResult>`
    pub fn compute(&self, landmarks: &FaceLandmarks, input: &TransformInput) -> Option<FrameTransformResult> {
        if !(input.face_width_mm > 0.0) || !input.face_width_mm.is_finite() {
            debug!("no frame transform: face width {} mm", input.face_width_mm);
            return None
        }
        if !(input.frame_width_mm > 0.0) || !input.frame_width_mm.is_finite() {
            debug!("no frame transform: frame width {} mm", input.frame_width_mm);
            return None
        }
        let Some(fit) = ImageFit::new(input.container, input.natural, input.fit_mode) else {
            debug!(
                "no frame transform: container {:?}, natural {:?}",
                input.container, input.natural
            );
            return None
        };

        let left_eye = fit.to_display(&landmarks.left_eye);
        let right_eye = fit.to_display(&landmarks.right_eye);
        let anchor = fit.to_display(&landmarks.anchor());
        let face_left = fit.to_display(&landmarks.face_left);
        let face_right = fit.to_display(&landmarks.face_right);

        let face_width_px = (face_right.x - face_left.x).abs();
        if !(face_width_px > 0.0) || !face_width_px.is_finite() {
            debug!("no frame transform: face spans {face_width_px} px");
            return None
        }

        let mm_per_pixel = input.face_width_mm / face_width_px;
        let desired_frame_width_px = input.frame_width_mm / mm_per_pixel;
        let scale_factor = desired_frame_width_px / self.reference_asset_width_px;

        let eye_line: Vector2<f64> = right_eye - left_eye;
        let mut angle_rad = eye_line.y.atan2(eye_line.x);
        if angle_rad.to_degrees().abs() < self.snap_angle_deg {
            angle_rad = 0.0;
        }

        Some(FrameTransformResult {
            mid_x: anchor.x,
            mid_y: (left_eye.y + right_eye.y) / 2.0,
            scale_factor,
            angle_rad,
        })
    }
}

impl Default for FrameTransformEngine {
    fn default() -> Self {
        FrameTransformEngine::new(REFERENCE_ASSET_WIDTH_PX, SNAP_ANGLE_DEG)
    }
}

/// compute_frame_transform runs the default engine.
pub fn compute_frame_transform(
    frame_width_mm: f64,
    landmarks: &FaceLandmarks,
    face_width_mm: f64,
    container: Size,
    natural: Size,
    fit_mode: FitMode,
) -> Option<FrameTransformResult> {
    FrameTransformEngine::default().compute(
        landmarks,
        &TransformInput {
            frame_width_mm,
            face_width_mm,
            container,
            natural,
            fit_mode,
        },
    )
}
