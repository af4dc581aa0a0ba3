use serde::{Deserialize, Serialize};

/// A single landmark in normalized image space.
///
/// `x` and `y` are fractions of the image width/height. `z` is the detector's
/// relative depth and is carried along untouched by the 2D math.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct LandmarkPoint {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl LandmarkPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        LandmarkPoint { x, y, z }
    }

    pub fn flat(x: f64, y: f64) -> Self {
        LandmarkPoint { x, y, z: 0.0 }
    }

    pub fn midpoint(&self, other: &LandmarkPoint) -> LandmarkPoint {
        LandmarkPoint {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
            z: (self.z + other.z) / 2.0,
        }
    }
}

/// Named landmarks produced once per capture.
///
/// `bridge` is optional; when it is missing the eye midpoint is used as the
/// horizontal anchor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FaceLandmarks {
    pub left_eye: LandmarkPoint,
    pub right_eye: LandmarkPoint,
    pub nose_tip: LandmarkPoint,
    pub left_ear: LandmarkPoint,
    pub right_ear: LandmarkPoint,
    pub chin: LandmarkPoint,
    pub forehead: LandmarkPoint,
    pub left_eye_upper: LandmarkPoint,
    pub left_eye_lower: LandmarkPoint,
    pub right_eye_upper: LandmarkPoint,
    pub right_eye_lower: LandmarkPoint,
    pub face_left: LandmarkPoint,
    pub face_right: LandmarkPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridge: Option<LandmarkPoint>,
}

impl FaceLandmarks {
    /// Number of always-present named points (the bridge is not counted).
    pub const NAMED_POINTS: usize = 13;

    /// Horizontal anchor for the frame: the bridge if detected, else the eye midpoint.
    pub fn anchor(&self) -> LandmarkPoint {
        self.bridge
            .unwrap_or_else(|| self.left_eye.midpoint(&self.right_eye))
    }

    /// Named points in a fixed order, bridge excluded.
    pub fn named_points(&self) -> [LandmarkPoint; FaceLandmarks::NAMED_POINTS] {
        [
            self.left_eye,
            self.right_eye,
            self.nose_tip,
            self.left_ear,
            self.right_ear,
            self.chin,
            self.forehead,
            self.left_eye_upper,
            self.left_eye_lower,
            self.right_eye_upper,
            self.right_eye_lower,
            self.face_left,
            self.face_right,
        ]
    }

    /// Applies `f` to every named point and to the bridge, keeping the shape.
    pub fn map_points<F>(&self, f: F) -> FaceLandmarks
    where
        F: Fn(&LandmarkPoint) -> LandmarkPoint,
    {
        FaceLandmarks {
            left_eye: f(&self.left_eye),
            right_eye: f(&self.right_eye),
            nose_tip: f(&self.nose_tip),
            left_ear: f(&self.left_ear),
            right_ear: f(&self.right_ear),
            chin: f(&self.chin),
            forehead: f(&self.forehead),
            left_eye_upper: f(&self.left_eye_upper),
            left_eye_lower: f(&self.left_eye_lower),
            right_eye_upper: f(&self.right_eye_upper),
            right_eye_lower: f(&self.right_eye_lower),
            face_left: f(&self.face_left),
            face_right: f(&self.face_right),
            bridge: self.bridge.as_ref().map(&f),
        }
    }
}

/// Physical measurements taken alongside the landmarks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Measurements {
    /// Face width in millimeters.
    pub face_width: f64,
}

/// Pixel size of an image or of the element it is drawn into.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Size { width, height }
    }

    /// True when either side is not a finite positive number.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite()) || self.width <= 0.0 || self.height <= 0.0
    }
}

/// Sub-rectangle `(sx, sy, sw, sh)` cut from a `full_width x full_height`
/// source image, all in pixels.
///
/// The caller guarantees `sw, sh > 0` and that the rectangle lies inside the
/// full image.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CropRect {
    pub full_width: f64,
    pub full_height: f64,
    pub sx: f64,
    pub sy: f64,
    pub sw: f64,
    pub sh: f64,
}
