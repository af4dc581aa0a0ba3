use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use crate::config::config::FitRangeConfig;
use crate::helper::dimensions::parse_dimensions;

/// Frame widths, in millimeters, that suit a face.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FitRange {
    pub min_mm: f64,
    pub max_mm: f64,
}

impl FitRange {
    /// `[face + min_offset, face + max_offset]`.
    pub fn around(face_width_mm: f64, config: &FitRangeConfig) -> Self {
        FitRange {
            min_mm: face_width_mm + config.min_offset_mm,
            max_mm: face_width_mm + config.max_offset_mm,
        }
    }

    /// `around` rounded to whole millimeters, or the default window when the face is unmeasured.
    pub fn for_face(face_width_mm: Option<f64>, config: &FitRangeConfig) -> Self {
        match face_width_mm {
            Some(face) if face > 0.0 => {
                let range = FitRange::around(face, config);
                FitRange {
                    min_mm: range.min_mm.round(),
                    max_mm: range.max_mm.round(),
                }
            }
            _ => FitRange {
                min_mm: config.default_min_mm,
                max_mm: config.default_max_mm,
            },
        }
    }

    pub fn contains(&self, width_mm: f64) -> bool {
        width_mm >= self.min_mm && width_mm <= self.max_mm
    }
}

/// A catalog entry as far as fitting is concerned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogFrame {
    pub skuid: String,
    pub name: String,
    #[serde(default)]
    pub dimensions: Option<String>,
}

/// A product whose frame width is known.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameMatch<'a> {
    pub frame: &'a CatalogFrame,
    pub width_mm: f64,
}

/// One line of the width report.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FrameWidthEntry {
    pub skuid: String,
    pub name: String,
    pub frame_width_mm: Option<f64>,
    /// Signed `frame - face`, one decimal, e.g. `+3.0mm`.
    pub diff_from_face: Option<String>,
    pub in_range: bool,
}

/// Resolves frame widths: curated per-SKU widths first, then the parsed dimension string.
#[derive(Debug, Clone, Default)]
pub struct FrameWidthTable {
    widths: HashMap<String, f64>,
}

impl FrameWidthTable {
    pub fn new(widths: HashMap<String, f64>) -> Self {
        FrameWidthTable { widths }
    }

    pub fn frame_width(&self, frame: &CatalogFrame) -> Option<f64> {
        self.widths
            .get(&frame.skuid)
            .copied()
            .or_else(|| parse_dimensions(frame.dimensions.as_deref()).width)
    }

    /// top_matches returns the frames whose width suits the face, closest first.
    ///
    /// Frames without a known width are skipped.
    ///
    /// # Arguments
    /// * `face_width_mm` - measured face width
    /// * `frames` - catalog entries
    /// * `config` - fit window offsets
    ///
    /// # Returns
    /// * `Vec<FrameMatch>`
    pub fn top_matches<'a>(
        &self,
        face_width_mm: f64,
        frames: &'a [CatalogFrame],
        config: &FitRangeConfig,
    ) -> Vec<FrameMatch<'a>> {
        if !(face_width_mm > 0.0) {
            return vec![]
        }
        let range = FitRange::around(face_width_mm, config);
        let mut matches: Vec<FrameMatch<'a>> = frames
            .iter()
            .filter_map(|frame| {
                self.frame_width(frame)
                    .filter(|w| range.contains(*w))
                    .map(|width_mm| FrameMatch { frame, width_mm })
            })
            .collect();
        matches.sort_by(|a, b| {
            let da = (a.width_mm - face_width_mm).abs();
            let db = (b.width_mm - face_width_mm).abs();
            da.total_cmp(&db)
        });
        matches
    }

    /// width_report lists every frame against the face width.
    ///
    /// Frames with a known width come first, closest to the face first.
    pub fn width_report(
        &self,
        face_width_mm: f64,
        frames: &[CatalogFrame],
        config: &FitRangeConfig,
    ) -> Vec<FrameWidthEntry> {
        let range = FitRange::around(face_width_mm, config);
        let mut entries: Vec<FrameWidthEntry> = frames
            .iter()
            .map(|frame| {
                let width = self.frame_width(frame);
                FrameWidthEntry {
                    skuid: frame.skuid.clone(),
                    name: frame.name.clone(),
                    frame_width_mm: width,
                    diff_from_face: width.map(|w| format!("{:+.1}mm", w - face_width_mm)),
                    in_range: width.map_or(false, |w| range.contains(w)),
                }
            })
            .collect();
        entries.sort_by(|a, b| match (a.frame_width_mm, b.frame_width_mm) {
            (Some(wa), Some(wb)) => (wa - face_width_mm).abs().total_cmp(&(wb - face_width_mm).abs()),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        entries
    }
}
