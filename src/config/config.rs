use anyhow::Error;
use serde::{Deserialize, Serialize};
use crate::pipeline::adjustment::AdjustmentValues;
use crate::utils::coordinate::Size;

/// Where the frame goes when no transform can be computed.
///
/// `x_fraction`/`y_fraction` are relative to the container size.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NeutralPlacementConfig {
    pub x_fraction: f64,
    pub y_fraction: f64,
    pub scale: f64,
}

impl NeutralPlacementConfig {
    pub(crate) fn new_live() -> Self {
        NeutralPlacementConfig {
            x_fraction: 0.5,
            y_fraction: 0.45,
            scale: 0.38,
        }
    }

    pub(crate) fn new_raster() -> Self {
        NeutralPlacementConfig {
            x_fraction: 0.5,
            y_fraction: 0.5,
            scale: 0.35,
        }
    }
}

/// Frame width window, in millimeters, relative to the face width.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FitRangeConfig {
    pub min_offset_mm: f64,
    pub max_offset_mm: f64,
    /// Window shown when no face width has been measured yet.
    pub default_min_mm: f64,
    pub default_max_mm: f64,
}

impl FitRangeConfig {
    pub(crate) fn new() -> Self {
        FitRangeConfig {
            min_offset_mm: -6.0,
            max_offset_mm: 15.0,
            default_min_mm: 130.0,
            default_max_mm: 145.0,
        }
    }
}

/// Tunable constants of the overlay.
///
/// `snap_angle_deg` and `mobile_scale_boost` were tuned by eye on real
/// captures; they are policy, not derived values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverlayConfig {
    /// Native pixel width of every frame overlay asset at 1x.
    pub reference_asset_width_px: f64,
    /// Eye-line tilts below this are snapped to level.
    pub snap_angle_deg: f64,
    /// Containers narrower than this get the mobile scale boost.
    pub mobile_breakpoint_px: f64,
    pub mobile_scale_boost: f64,
    /// Used when a product's dimension string carries no frame width.
    pub fallback_frame_width_mm: f64,
    /// Used while the face image has not reported its natural size.
    pub fallback_natural_size: Size,
    pub default_adjustments_mobile: AdjustmentValues,
    pub default_adjustments_desktop: AdjustmentValues,
    pub neutral_live: NeutralPlacementConfig,
    pub neutral_raster: NeutralPlacementConfig,
    pub fit_range: FitRangeConfig,
}

impl OverlayConfig {
    pub fn new() -> Self {
        OverlayConfig {
            reference_asset_width_px: 400.0,
            snap_angle_deg: 3.0,
            mobile_breakpoint_px: 400.0,
            mobile_scale_boost: 1.33,
            fallback_frame_width_mm: 135.0,
            fallback_natural_size: Size::new(640.0, 480.0),
            default_adjustments_mobile: AdjustmentValues {
                offset_x: -16.0,
                offset_y: 2.0,
                scale_adjust: 1.21,
                rotation_adjust: 0.0,
            },
            default_adjustments_desktop: AdjustmentValues {
                offset_x: -14.0,
                offset_y: -23.0,
                scale_adjust: 1.3,
                rotation_adjust: 0.0,
            },
            neutral_live: NeutralPlacementConfig::new_live(),
            neutral_raster: NeutralPlacementConfig::new_raster(),
            fit_range: FitRangeConfig::new(),
        }
    }

    /// from_json parses and validates a config document.
    ///
    /// # Arguments
    /// * `raw` - JSON text
    ///
    /// # Returns
    /// * `Result<OverlayConfig, Error>`
    pub fn from_json(raw: &str) -> Result<Self, Error> {
        let config: OverlayConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(self.reference_asset_width_px > 0.0) {
            return Err(Error::msg("reference_asset_width_px must be positive"))
        }
        if !(self.snap_angle_deg >= 0.0) {
            return Err(Error::msg("snap_angle_deg must not be negative"))
        }
        if !(self.mobile_scale_boost > 0.0) {
            return Err(Error::msg("mobile_scale_boost must be positive"))
        }
        if !(self.fallback_frame_width_mm > 0.0) {
            return Err(Error::msg("fallback_frame_width_mm must be positive"))
        }
        if self.fallback_natural_size.is_degenerate() {
            return Err(Error::msg("fallback_natural_size must be non-zero"))
        }
        if self.fit_range.min_offset_mm > self.fit_range.max_offset_mm
            || self.fit_range.default_min_mm > self.fit_range.default_max_mm
        {
            return Err(Error::msg("fit_range bounds are inverted"))
        }
        Ok(())
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        OverlayConfig::new()
    }
}
