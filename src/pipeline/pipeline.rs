use log::{debug, warn};
use crate::config::config::{NeutralPlacementConfig, OverlayConfig};
use crate::helper::crop_mapper::landmarks_for_display;
use crate::helper::dimensions::FrameDimensions;
use crate::pipeline::adjustment::{
    apply_adjustments, AdjustmentValues, DisplayCorrection, FramePlacement, ImageAlignment,
};
use crate::pipeline::transform::{FitMode, FrameTransformEngine, FrameTransformResult, TransformInput};
use crate::modules::session::CaptureSession;
use crate::utils::coordinate::Size;

/// Which default adjustments apply when the session has none saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    Mobile,
    Desktop,
}

/// Computes frame placements for products from a capture session.
#[derive(Debug, Clone)]
pub struct OverlayPipeline {
    config: OverlayConfig,
    engine: FrameTransformEngine,
    fit_mode: FitMode,
    layout: LayoutKind,
}

impl OverlayPipeline {

    /// new initializes a pipeline drawing the face image with `FitMode::Contain`.
    pub fn new(config: OverlayConfig, layout: LayoutKind) -> Self {
        let engine = FrameTransformEngine::new(config.reference_asset_width_px, config.snap_angle_deg);
        OverlayPipeline {
            config,
            engine,
            fit_mode: FitMode::Contain,
            layout,
        }
    }

    /// Same pipeline with a different image fit.
    pub fn with_fit_mode(mut self, fit_mode: FitMode) -> Self {
        self.fit_mode = fit_mode;
        self
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Adjustments used when the session has none saved.
    pub fn default_adjustments(&self) -> AdjustmentValues {
        match self.layout {
            LayoutKind::Mobile => self.config.default_adjustments_mobile,
            LayoutKind::Desktop => self.config.default_adjustments_desktop,
        }
    }

    /// Session adjustments with gaps filled from the layout default.
    pub fn adjustments_for(&self, session: &CaptureSession) -> AdjustmentValues {
        session.adjustments_or(&self.default_adjustments())
    }

    /// raw_transform runs the engine on the session's landmarks.
    ///
    /// Landmarks are remapped into the cropped image when the session has a
    /// crop. A product with no readable frame width uses the fallback width.
    ///
    /// # Arguments
    /// * `session` - &CaptureSession
    /// * `dimensions` - &FrameDimensions
    /// * `container` - size of the element the face image is drawn into
    /// * `natural` - intrinsic size of the face image
    ///
    /// # Returns
    /// * `Option<FrameTransformResult>`
    pub fn raw_transform(
        &self,
        session: &CaptureSession,
        dimensions: &FrameDimensions,
        container: Size,
        natural: Size,
    ) -> Option<FrameTransformResult> {
        let Some(landmarks) = session.landmarks.as_ref() else {
            debug!("no landmarks in capture session");
            return None
        };
        let landmarks = match landmarks_for_display(landmarks, session.crop_rect.as_ref()) {
            Ok(landmarks) => landmarks,
            Err(e) => {
                warn!("cannot map landmarks into the cropped image: {e}");
                return None
            }
        };

        if dimensions.width.is_none() {
            debug!(
                "no frame width in product dimensions, using {} mm",
                self.config.fallback_frame_width_mm
            );
        }
        let input = TransformInput {
            frame_width_mm: dimensions.width_or(self.config.fallback_frame_width_mm),
            face_width_mm: session.face_width_mm(),
            container,
            natural,
            fit_mode: self.fit_mode,
        };
        self.engine.compute(&landmarks, &input)
    }

    /// live_placement is the placement for the on-screen overlay.
    ///
    /// The natural size may still be unknown (zero) while the image loads; the
    /// fallback size is used then. Small containers get the device boost and a
    /// left-aligned image gets its centering offset removed. Whenever no
    /// transform can be computed, the neutral placement is returned.
    ///
    /// # Arguments
    /// * `session` - &CaptureSession
    /// * `dimensions` - &FrameDimensions
    /// * `container` - live-measured container size
    /// * `natural` - face image natural size, zero if not loaded yet
    /// * `alignment` - how the face image is aligned in the container
    ///
    /// # Returns
    /// * `FramePlacement`
    pub fn live_placement(
        &self,
        session: &CaptureSession,
        dimensions: &FrameDimensions,
        container: Size,
        natural: Size,
        alignment: ImageAlignment,
    ) -> FramePlacement {
        let natural = Size::new(
            if natural.width > 0.0 { natural.width } else { self.config.fallback_natural_size.width },
            if natural.height > 0.0 { natural.height } else { self.config.fallback_natural_size.height },
        );

        let Some(transform) = self.raw_transform(session, dimensions, container, natural) else {
            debug!("using neutral live placement");
            return neutral_placement(&self.config.neutral_live, container)
        };

        let correction = DisplayCorrection::for_layout(
            container,
            natural,
            self.fit_mode,
            alignment,
            self.config.mobile_breakpoint_px,
            self.config.mobile_scale_boost,
        );
        apply_adjustments(&transform, &self.adjustments_for(session), &correction)
    }

    /// capture_placement recomputes the placement against exact pixel sizes.
    ///
    /// Meant for compositing a still image, where live measurements may be
    /// stale. No natural-size fallback, device boost or alignment correction
    /// is applied.
    pub fn capture_placement(
        &self,
        session: &CaptureSession,
        dimensions: &FrameDimensions,
        container: Size,
        natural: Size,
    ) -> Option<FramePlacement> {
        let transform = self.raw_transform(session, dimensions, container, natural)?;
        Some(apply_adjustments(
            &transform,
            &self.adjustments_for(session),
            &DisplayCorrection::none(),
        ))
    }

    /// raster_placement is `capture_placement` with the neutral raster placement as fallback.
    pub fn raster_placement(
        &self,
        session: &CaptureSession,
        dimensions: &FrameDimensions,
        container: Size,
        natural: Size,
    ) -> FramePlacement {
        self.capture_placement(session, dimensions, container, natural)
            .unwrap_or_else(|| {
                debug!("using neutral raster placement");
                neutral_placement(&self.config.neutral_raster, container)
            })
    }
}

fn neutral_placement(neutral: &NeutralPlacementConfig, container: Size) -> FramePlacement {
    FramePlacement {
        display_x: container.width * neutral.x_fraction,
        display_y: container.height * neutral.y_fraction,
        scale: neutral.scale,
        rotation: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use crate::config::config::OverlayConfig;
    use crate::helper::dimensions::parse_dimensions;
    use crate::utils::coordinate::{CropRect, FaceLandmarks, LandmarkPoint, Measurements};
    use super::*;

    fn landmarks() -> FaceLandmarks {
        let p = LandmarkPoint::flat;
        FaceLandmarks {
            left_eye: p(0.4, 0.5),
            right_eye: p(0.6, 0.5),
            nose_tip: p(0.5, 0.6),
            left_ear: p(0.15, 0.5),
            right_ear: p(0.85, 0.5),
            chin: p(0.5, 0.9),
            forehead: p(0.5, 0.2),
            left_eye_upper: p(0.4, 0.48),
            left_eye_lower: p(0.4, 0.52),
            right_eye_upper: p(0.6, 0.48),
            right_eye_lower: p(0.6, 0.52),
            face_left: p(0.2, 0.5),
            face_right: p(0.8, 0.5),
            bridge: Some(p(0.5, 0.5)),
        }
    }

    fn session() -> CaptureSession {
        CaptureSession::new(landmarks(), Measurements { face_width: 140.0 })
    }

    fn pipeline(layout: LayoutKind) -> OverlayPipeline {
        OverlayPipeline::new(OverlayConfig::new(), layout)
    }

    #[test]
    fn test_live_placement_applies_layout_defaults() {
        let size = Size::new(640.0, 480.0);
        let dims = parse_dimensions(Some("Frame Width: 130mm"));
        let placement = pipeline(LayoutKind::Desktop)
            .live_placement(&session(), &dims, size, size, ImageAlignment::Center);

        let raw_scale = 130.0 / (140.0 / 384.0) / 400.0;
        assert_abs_diff_eq!(placement.display_x, 320.0 - 14.0, epsilon = 1e-9);
        assert_abs_diff_eq!(placement.display_y, 240.0 - 23.0, epsilon = 1e-9);
        assert_abs_diff_eq!(placement.scale, raw_scale * 1.3, epsilon = 1e-12);
        assert_eq!(placement.rotation, 0.0);
    }

    #[test]
    fn test_live_placement_mobile_boost_and_saved_adjustments() {
        let container = Size::new(360.0, 270.0);
        let natural = Size::new(640.0, 480.0);
        let saved = AdjustmentValues {
            offset_x: 0.0,
            offset_y: 0.0,
            scale_adjust: 1.0,
            rotation_adjust: 0.0,
        };
        let session = session().with_adjustments(saved);
        let dims = parse_dimensions(Some("Frame Width: 130mm"));
        let placement = pipeline(LayoutKind::Mobile)
            .live_placement(&session, &dims, container, natural, ImageAlignment::Center);

        // contain scale 0.5625: face spans 216 px
        let raw_scale = 130.0 / (140.0 / 216.0) / 400.0;
        assert_abs_diff_eq!(placement.scale, raw_scale * 1.33, epsilon = 1e-12);
        assert_abs_diff_eq!(placement.display_x, 180.0, epsilon = 1e-9);
    }

    #[test]
    fn test_live_placement_falls_back_to_neutral() {
        let container = Size::new(500.0, 400.0);
        let dims = FrameDimensions::default();
        let pipeline = pipeline(LayoutKind::Desktop);

        let mut unmeasured = session();
        unmeasured.measurements = None;
        let placement = pipeline.live_placement(&unmeasured, &dims, container, Size::default(), ImageAlignment::Center);
        assert_eq!(
            placement,
            FramePlacement { display_x: 250.0, display_y: 180.0, scale: 0.38, rotation: 0.0 }
        );

        let placement = pipeline.live_placement(&CaptureSession::default(), &dims, container, Size::default(), ImageAlignment::Left);
        assert_eq!(placement.scale, 0.38);
    }

    #[test]
    fn test_live_placement_uses_fallback_natural_size_and_width() {
        let container = Size::new(640.0, 480.0);
        let pipeline = pipeline(LayoutKind::Desktop);
        let unknown = pipeline.live_placement(
            &session(), &FrameDimensions::default(), container, Size::new(0.0, 0.0), ImageAlignment::Center,
        );
        let explicit = pipeline.live_placement(
            &session(), &parse_dimensions(Some("width 135")), container, Size::new(640.0, 480.0), ImageAlignment::Center,
        );
        assert_eq!(unknown, explicit);
    }

    #[test]
    fn test_cropped_session_uses_cropped_landmarks() {
        // face image is the centre half of a 1280x480 capture
        let mut session = session();
        session.landmarks = Some(landmarks().map_points(|p| LandmarkPoint::new(0.25 + p.x / 2.0, p.y, p.z)));
        session.crop_rect = Some(CropRect {
            full_width: 1280.0,
            full_height: 480.0,
            sx: 320.0,
            sy: 0.0,
            sw: 640.0,
            sh: 480.0,
        });
        let size = Size::new(640.0, 480.0);
        let dims = parse_dimensions(Some("Frame Width: 130mm"));
        let pipeline = pipeline(LayoutKind::Desktop);

        let cropped = pipeline.raw_transform(&session, &dims, size, size).unwrap();
        let direct = pipeline.raw_transform(&self::session(), &dims, size, size).unwrap();
        assert_abs_diff_eq!(cropped.mid_x, direct.mid_x, epsilon = 1e-9);
        assert_abs_diff_eq!(cropped.scale_factor, direct.scale_factor, epsilon = 1e-9);
    }

    #[test]
    fn test_capture_placement_skips_presentation_corrections() {
        let container = Size::new(360.0, 270.0);
        let natural = Size::new(640.0, 480.0);
        let dims = parse_dimensions(Some("Frame Width: 130mm"));
        let pipeline = pipeline(LayoutKind::Mobile);

        let live = pipeline.live_placement(&session(), &dims, container, natural, ImageAlignment::Center);
        let capture = pipeline.capture_placement(&session(), &dims, container, natural).unwrap();
        assert_abs_diff_eq!(live.scale, capture.scale * 1.33, epsilon = 1e-12);
        assert_eq!(live.display_x, capture.display_x);

        assert!(pipeline.capture_placement(&session(), &dims, container, Size::default()).is_none());
        let raster = pipeline.raster_placement(&session(), &dims, container, Size::default());
        assert_eq!(
            raster,
            FramePlacement { display_x: 180.0, display_y: 135.0, scale: 0.35, rotation: 0.0 }
        );
    }

    #[test]
    fn test_capture_placement_rejects_negative_container() {
        let natural = Size::new(640.0, 480.0);
        let dims = parse_dimensions(Some("Frame Width: 130mm"));
        let pipeline = pipeline(LayoutKind::Desktop);

        assert!(pipeline.capture_placement(&session(), &dims, Size::new(-100.0, 200.0), natural).is_none());
        assert!(pipeline.capture_placement(&session(), &dims, Size::new(300.0, -1.0), natural).is_none());

        let raster = pipeline.raster_placement(&session(), &dims, Size::new(-100.0, 200.0), natural);
        assert_eq!(raster.scale, 0.35);
        assert_eq!(raster.rotation, 0.0);
    }
}
