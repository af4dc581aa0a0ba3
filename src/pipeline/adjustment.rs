use serde::{Deserialize, Serialize};
use crate::pipeline::transform::{FitMode, FrameTransformResult, ImageFit};
use crate::utils::coordinate::Size;

/// User fine-tuning applied on top of the computed transform.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentValues {
    /// Pixels.
    pub offset_x: f64,
    pub offset_y: f64,
    /// Multiplier.
    pub scale_adjust: f64,
    /// Degrees.
    pub rotation_adjust: f64,
}

impl AdjustmentValues {
    /// No-op adjustment.
    pub fn identity() -> Self {
        AdjustmentValues {
            offset_x: 0.0,
            offset_y: 0.0,
            scale_adjust: 1.0,
            rotation_adjust: 0.0,
        }
    }
}

/// Horizontal alignment of the face image inside its container.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImageAlignment {
    #[default]
    Center,
    Left,
}

/// Presentation-tier corrections for one rendering of the face image.
///
/// These are layout policy and are kept out of the geometry engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayCorrection {
    /// Scale multiplier for small containers.
    pub device_boost: f64,
    /// Pixels to add to the anchor x because the image is not drawn centered.
    pub alignment_shift_x: f64,
}

impl DisplayCorrection {
    pub fn none() -> Self {
        DisplayCorrection {
            device_boost: 1.0,
            alignment_shift_x: 0.0,
        }
    }

    /// Corrections for a container of the given size.
    ///
    /// The boost applies when `0 < container.width < breakpoint_px`. A
    /// left-aligned image loses the centering offset the engine assumed.
    pub fn for_layout(
        container: Size,
        natural: Size,
        fit_mode: FitMode,
        alignment: ImageAlignment,
        breakpoint_px: f64,
        boost: f64,
    ) -> Self {
        let is_small = container.width > 0.0 && container.width < breakpoint_px;
        let device_boost = if is_small { boost } else { 1.0 };

        let alignment_shift_x = match alignment {
            ImageAlignment::Center => 0.0,
            ImageAlignment::Left => ImageFit::new(container, natural, fit_mode)
                .map(|fit| -fit.offset.x)
                .unwrap_or(0.0),
        };

        DisplayCorrection {
            device_boost,
            alignment_shift_x,
        }
    }
}

/// Final placement handed to the renderer: container pixels and radians.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FramePlacement {
    /// Where the center of the frame asset goes.
    pub display_x: f64,
    pub display_y: f64,
    /// Multiplier against the reference asset width.
    pub scale: f64,
    pub rotation: f64,
}

/// Rectangle a frame asset occupies on a raster canvas, before rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRect {
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
}

impl FramePlacement {
    /// draw_rect sizes the frame asset for compositing onto a canvas.
    ///
    /// The canvas is `pixel_ratio` times the container; the asset keeps its
    /// own aspect ratio. Returns `None` for an asset with a zero side.
    ///
    /// # Arguments
    /// * `asset` - natural size of the frame image
    /// * `reference_width_px` - width the asset is authored at
    /// * `pixel_ratio` - canvas pixels per container pixel
    ///
    /// # Returns
    /// * `Option<DrawRect>`
    pub fn draw_rect(&self, asset: Size, reference_width_px: f64, pixel_ratio: f64) -> Option<DrawRect> {
        if asset.is_degenerate() {
            return None
        }
        let width = reference_width_px * self.scale * pixel_ratio;
        let height = width * (asset.height / asset.width);
        Some(DrawRect {
            center_x: self.display_x * pixel_ratio,
            center_y: self.display_y * pixel_ratio,
            width,
            height,
        })
    }
}

/// apply_adjustments turns a raw transform into a placement.
///
/// * `display = mid + offset + alignment shift`
/// * `scale = scale_factor * scale_adjust * device_boost`
/// * `rotation = angle_rad + rotation_adjust` (degrees converted)
pub fn apply_adjustments(
    transform: &FrameTransformResult,
    adjustments: &AdjustmentValues,
    correction: &DisplayCorrection,
) -> FramePlacement {
    FramePlacement {
        display_x: transform.mid_x + adjustments.offset_x + correction.alignment_shift_x,
        display_y: transform.mid_y + adjustments.offset_y,
        scale: transform.scale_factor * adjustments.scale_adjust * correction.device_boost,
        rotation: transform.angle_rad + adjustments.rotation_adjust.to_radians(),
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;
    use approx::assert_abs_diff_eq;
    use super::*;

    fn raw() -> FrameTransformResult {
        FrameTransformResult {
            mid_x: 320.0,
            mid_y: 240.0,
            scale_factor: 0.9,
            angle_rad: 0.1,
        }
    }

    #[test]
    fn test_apply_adjustments() {
        let adjustments = AdjustmentValues {
            offset_x: -16.0,
            offset_y: 2.0,
            scale_adjust: 1.21,
            rotation_adjust: 90.0,
        };
        let placement = apply_adjustments(&raw(), &adjustments, &DisplayCorrection::none());
        assert_eq!(placement.display_x, 304.0);
        assert_eq!(placement.display_y, 242.0);
        assert_abs_diff_eq!(placement.scale, 0.9 * 1.21, epsilon = 1e-12);
        assert_abs_diff_eq!(placement.rotation, 0.1 + PI / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_identity_adjustment_is_noop() {
        let placement = apply_adjustments(&raw(), &AdjustmentValues::identity(), &DisplayCorrection::none());
        assert_eq!(
            placement,
            FramePlacement {
                display_x: 320.0,
                display_y: 240.0,
                scale: 0.9,
                rotation: 0.1,
            }
        );
    }

    #[test]
    fn test_device_boost_below_breakpoint_only() {
        let natural = Size::new(640.0, 480.0);
        let small = DisplayCorrection::for_layout(
            Size::new(360.0, 480.0), natural, FitMode::Contain, ImageAlignment::Center, 400.0, 1.33,
        );
        assert_eq!(small.device_boost, 1.33);

        let at_breakpoint = DisplayCorrection::for_layout(
            Size::new(400.0, 480.0), natural, FitMode::Contain, ImageAlignment::Center, 400.0, 1.33,
        );
        assert_eq!(at_breakpoint.device_boost, 1.0);

        let unmeasured = DisplayCorrection::for_layout(
            Size::new(0.0, 0.0), natural, FitMode::Contain, ImageAlignment::Center, 400.0, 1.33,
        );
        assert_eq!(unmeasured.device_boost, 1.0);

        let placement = apply_adjustments(&raw(), &AdjustmentValues::identity(), &small);
        assert_abs_diff_eq!(placement.scale, 0.9 * 1.33, epsilon = 1e-12);
    }

    #[test]
    fn test_left_alignment_removes_centering_offset() {
        // contain: 640x480 in 1000x480 is drawn 640 wide, 180 px from the left
        let correction = DisplayCorrection::for_layout(
            Size::new(1000.0, 480.0), Size::new(640.0, 480.0), FitMode::Contain, ImageAlignment::Left, 400.0, 1.33,
        );
        assert_eq!(correction.alignment_shift_x, -180.0);
        assert_eq!(correction.device_boost, 1.0);

        let placement = apply_adjustments(&raw(), &AdjustmentValues::identity(), &correction);
        assert_eq!(placement.display_x, 140.0);

        let centered = DisplayCorrection::for_layout(
            Size::new(1000.0, 480.0), Size::new(640.0, 480.0), FitMode::Contain, ImageAlignment::Center, 400.0, 1.33,
        );
        assert_eq!(centered.alignment_shift_x, 0.0);
    }

    #[test]
    fn test_left_alignment_with_cover_overflow() {
        // cover: 640x480 in 600x600 is drawn 800 wide, overflowing 100 px on each side
        let correction = DisplayCorrection::for_layout(
            Size::new(600.0, 600.0), Size::new(640.0, 480.0), FitMode::Cover, ImageAlignment::Left, 400.0, 1.33,
        );
        assert_eq!(correction.alignment_shift_x, 100.0);
        assert_eq!(correction.device_boost, 1.0);

        let placement = apply_adjustments(&raw(), &AdjustmentValues::identity(), &correction);
        assert_eq!(placement.display_x, 420.0);

        // contain fills the width exactly, nothing to remove
        let contain = DisplayCorrection::for_layout(
            Size::new(600.0, 600.0), Size::new(640.0, 480.0), FitMode::Contain, ImageAlignment::Left, 400.0, 1.33,
        );
        assert_eq!(contain.alignment_shift_x, 0.0);
    }

    #[test]
    fn test_draw_rect_keeps_asset_aspect() {
        let placement = FramePlacement {
            display_x: 150.0,
            display_y: 100.0,
            scale: 0.5,
            rotation: 0.0,
        };
        let rect = placement.draw_rect(Size::new(800.0, 300.0), 400.0, 2.0).unwrap();
        assert_eq!(rect.width, 400.0);
        assert_eq!(rect.height, 150.0);
        assert_eq!((rect.center_x, rect.center_y), (300.0, 200.0));

        assert!(placement.draw_rect(Size::new(0.0, 300.0), 400.0, 2.0).is_none());
    }
}
