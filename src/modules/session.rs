use std::sync::RwLock;
use anyhow::Error;
use log::warn;
use serde::{Deserialize, Serialize};
use crate::pipeline::adjustment::AdjustmentValues;
use crate::utils::coordinate::{CropRect, FaceLandmarks, Measurements};

/// Adjustment values as stored; older sessions may lack some fields.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StoredAdjustments {
    #[serde(default)]
    pub offset_x: Option<f64>,
    #[serde(default)]
    pub offset_y: Option<f64>,
    #[serde(default)]
    pub scale_adjust: Option<f64>,
    #[serde(default)]
    pub rotation_adjust: Option<f64>,
}

impl StoredAdjustments {
    /// Fills missing fields from `fallback`, field by field.
    pub fn resolve(&self, fallback: &AdjustmentValues) -> AdjustmentValues {
        AdjustmentValues {
            offset_x: self.offset_x.unwrap_or(fallback.offset_x),
            offset_y: self.offset_y.unwrap_or(fallback.offset_y),
            scale_adjust: self.scale_adjust.unwrap_or(fallback.scale_adjust),
            rotation_adjust: self.rotation_adjust.unwrap_or(fallback.rotation_adjust),
        }
    }
}

impl From<AdjustmentValues> for StoredAdjustments {
    fn from(values: AdjustmentValues) -> Self {
        StoredAdjustments {
            offset_x: Some(values.offset_x),
            offset_y: Some(values.offset_y),
            scale_adjust: Some(values.scale_adjust),
            rotation_adjust: Some(values.rotation_adjust),
        }
    }
}

/// Everything captured for one try-on session.
///
/// Snapshots are plain values; consumers read a snapshot and hand an
/// updated one back to the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CaptureSession {
    #[serde(default)]
    pub landmarks: Option<FaceLandmarks>,
    #[serde(default)]
    pub measurements: Option<Measurements>,
    #[serde(default)]
    pub crop_rect: Option<CropRect>,
    #[serde(default)]
    pub frame_adjustments: Option<StoredAdjustments>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_shape: Option<String>,
    /// Reference to the displayed face image (data URL or path).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_image: Option<String>,
}

impl CaptureSession {
    pub fn new(landmarks: FaceLandmarks, measurements: Measurements) -> Self {
        CaptureSession {
            landmarks: Some(landmarks),
            measurements: Some(measurements),
            ..Default::default()
        }
    }

    /// Face width in mm, or 0 when not measured.
    pub fn face_width_mm(&self) -> f64 {
        self.measurements.map(|m| m.face_width).unwrap_or(0.0)
    }

    /// Saved adjustments, with gaps filled from `fallback`.
    pub fn adjustments_or(&self, fallback: &AdjustmentValues) -> AdjustmentValues {
        match &self.frame_adjustments {
            Some(stored) => stored.resolve(fallback),
            None => *fallback,
        }
    }

    /// Copy of this snapshot carrying `values`.
    pub fn with_adjustments(&self, values: AdjustmentValues) -> CaptureSession {
        CaptureSession {
            frame_adjustments: Some(values.into()),
            ..self.clone()
        }
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Holder of the current capture session.
pub trait SessionStore: Send + Sync {
    /// Current snapshot, if any.
    fn load(&self) -> Result<Option<CaptureSession>, Error>;
    /// Replaces the current snapshot; last write wins.
    fn save(&self, session: &CaptureSession) -> Result<(), Error>;
    fn clear(&self) -> Result<(), Error>;
}

/// Session store keeping the serialized record in memory.
///
/// A record that no longer decodes is reported as no session.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    record: RwLock<Option<String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        InMemorySessionStore::default()
    }

    /// Store seeded with a raw record, as read back from browser storage.
    pub fn from_record(raw: impl Into<String>) -> Self {
        InMemorySessionStore {
            record: RwLock::new(Some(raw.into())),
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self) -> Result<Option<CaptureSession>, Error> {
        let guard = self
            .record
            .read()
            .map_err(|_| Error::msg("session store lock poisoned"))?;
        let Some(raw) = guard.as_deref() else {
            return Ok(None)
        };
        match CaptureSession::from_json(raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!("discarding unreadable capture session: {e}");
                Ok(None)
            }
        }
    }

    fn save(&self, session: &CaptureSession) -> Result<(), Error> {
        let raw = session.to_json()?;
        let mut guard = self
            .record
            .write()
            .map_err(|_| Error::msg("session store lock poisoned"))?;
        *guard = Some(raw);
        Ok(())
    }

    fn clear(&self) -> Result<(), Error> {
        let mut guard = self
            .record
            .write()
            .map_err(|_| Error::msg("session store lock poisoned"))?;
        *guard = None;
        Ok(())
    }
}

/// persist_adjustments writes interactively changed adjustments back to the store.
///
/// # Arguments
/// * `store` - the session store
/// * `session` - the snapshot the values were tuned on
/// * `values` - new adjustment values
///
/// # Returns
/// * `Result<CaptureSession, Error>` - the updated snapshot that was saved
pub fn persist_adjustments(
    store: &dyn SessionStore,
    session: &CaptureSession,
    values: AdjustmentValues,
) -> Result<CaptureSession, Error> {
    let updated = session.with_adjustments(values);
    store.save(&updated)?;
    Ok(updated)
}
