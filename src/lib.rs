pub mod utils;
pub mod pipeline;
pub mod config;
pub mod helper;
pub mod modules;

pub use config::config::OverlayConfig;
pub use helper::crop_mapper::{map_cropped_to_full, map_full_to_cropped, map_landmarks_to_cropped};
pub use helper::dimensions::{parse_dimensions, FrameDimensions};
pub use modules::session::{persist_adjustments, CaptureSession, InMemorySessionStore, SessionStore};
pub use pipeline::adjustment::{apply_adjustments, AdjustmentValues, FramePlacement, ImageAlignment};
pub use pipeline::pipeline::{LayoutKind, OverlayPipeline};
pub use pipeline::transform::{compute_frame_transform, FitMode, FrameTransformResult};
pub use utils::coordinate::{CropRect, FaceLandmarks, LandmarkPoint, Measurements, Size};
