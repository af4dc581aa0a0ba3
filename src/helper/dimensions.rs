use serde::{Deserialize, Serialize};

/// Physical size of a frame, in millimeters. Either side may be unknown.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FrameDimensions {
    pub width: Option<f64>,
    pub lens_height: Option<f64>,
}

impl FrameDimensions {
    pub fn is_empty(&self) -> bool {
        self.width.is_none() && self.lens_height.is_none()
    }

    /// Frame width, or `fallback_mm` when the product did not state one.
    pub fn width_or(&self, fallback_mm: f64) -> f64 {
        self.width.unwrap_or(fallback_mm)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Width,
    LensHeight,
}

/// What a `width`/`height` keyword names.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Label {
    Field(Field),
    /// Lens width, bridge width, frame height and the like.
    Ignored,
}

#[derive(Debug, Clone, Copy)]
struct NumberToken {
    start: usize,
    end: usize,
    value: f64,
}

/// Text following a number, up to the next separator or number.
struct Trailing<'a> {
    label: &'a str,
    end: usize,
    /// Ended by a separator or the end of the text rather than by another number.
    closed: bool,
}

/// parse_dimensions pulls the frame width and lens height out of a product dimension string.
///
/// Catalog data is inconsistent, so this never fails: anything it cannot
/// read is left as `None`. Understood forms:
/// * labelled values, label first: `Frame Width: 138mm`, `Lens Height 42 mm`,
///   `width 140`; `lens width`, `bridge width`, `temple width` and `frame height`
///   are not read
/// * labelled values, value first: `138mm frame width, 42mm lens height`
/// * a bare `138 x 42` pair, used only when no label matched
///
/// A label in front of a number wins over one behind it. A label behind a
/// number is taken when a separator (`,` `;` `|` newline) or the end of the
/// text closes it, or when the whole string is written value first.
///
/// Values followed by `cm` are converted to millimeters. Only finite,
/// positive numbers are kept, and the first value found for a field wins.
///
/// # Arguments
/// * `raw` - Option<&str>
///
/// # Returns
/// * `FrameDimensions`
pub fn parse_dimensions(raw: Option<&str>) -> FrameDimensions {
    let mut dims = FrameDimensions::default();
    let text = match raw {
        Some(raw) if !raw.trim().is_empty() => raw.to_lowercase(),
        _ => return dims,
    };

    let tokens = scan_numbers(&text);
    if tokens.is_empty() {
        return dims
    }

    let limit = |i: usize| tokens.get(i + 1).map_or(text.len(), |next| next.start);
    let value_first = tokens
        .last()
        .map_or(false, |last| classify(trailing_label(&text, last, text.len()).label).is_some());

    let mut prev_end = 0;
    for (i, token) in tokens.iter().enumerate() {
        let leading = &text[prev_end..token.start];
        prev_end = token.end;

        let label = match classify(leading) {
            Some(label) => Some(label),
            None => {
                let trailing = trailing_label(&text, token, limit(i));
                match classify(trailing.label) {
                    Some(label) if trailing.closed || value_first => {
                        prev_end = trailing.end;
                        Some(label)
                    }
                    _ => None,
                }
            }
        };

        let Some(value) = to_millimeters(token.value, &text[token.end..]) else { continue };
        match label {
            Some(Label::Field(Field::Width)) if dims.width.is_none() => dims.width = Some(value),
            Some(Label::Field(Field::LensHeight)) if dims.lens_height.is_none() => dims.lens_height = Some(value),
            _ => {}
        }
    }

    if dims.is_empty() {
        dims = parse_pair(&text, &tokens);
    }
    dims
}

/// Pairs written as `W x H` with nothing but a separator between the numbers.
fn parse_pair(text: &str, tokens: &[NumberToken]) -> FrameDimensions {
    for pair in tokens.windows(2) {
        let between = text[pair[0].end..pair[1].start].trim();
        let between = between
            .strip_prefix("mm")
            .or_else(|| between.strip_prefix("cm"))
            .unwrap_or(between)
            .trim();
        if matches!(between, "x" | "×" | "*") {
            let width = to_millimeters(pair[0].value, &text[pair[0].end..]);
            let height = to_millimeters(pair[1].value, &text[pair[1].end..]);
            if let (Some(width), Some(height)) = (width, height) {
                return FrameDimensions {
                    width: Some(width),
                    lens_height: Some(height),
                }
            }
        }
    }
    FrameDimensions::default()
}

fn is_separator(c: char) -> bool {
    matches!(c, ',' | ';' | '|' | '\n')
}

fn trailing_label<'a>(text: &'a str, token: &NumberToken, limit: usize) -> Trailing<'a> {
    let rest = &text[token.end..limit];
    match rest.find(is_separator) {
        Some(at) => Trailing {
            label: &rest[..at],
            end: token.end + at,
            closed: true,
        },
        None => Trailing {
            label: rest,
            end: limit,
            closed: limit == text.len(),
        },
    }
}

/// Looks at the last `width`/`height` keyword and the word in front of it.
///
/// `None` when there is no keyword at all.
fn classify(label: &str) -> Option<Label> {
    let width_at = label.rfind("width");
    let height_at = label.rfind("height");

    let (field, at) = match (width_at, height_at) {
        (Some(w), Some(h)) if h > w => (Field::LensHeight, h),
        (Some(w), _) => (Field::Width, w),
        (None, Some(h)) => (Field::LensHeight, h),
        (None, None) => return None,
    };

    let qualifier = label[..at]
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .last()
        .unwrap_or("");

    let label = match field {
        Field::Width => match qualifier {
            "lens" | "bridge" | "temple" | "nose" => Label::Ignored,
            _ => Label::Field(Field::Width),
        },
        Field::LensHeight => match qualifier {
            "frame" | "bridge" | "temple" | "nose" => Label::Ignored,
            _ => Label::Field(Field::LensHeight),
        },
    };
    Some(label)
}

fn to_millimeters(value: f64, rest: &str) -> Option<f64> {
    let mm = if rest.trim_start().starts_with("cm") {
        value * 10.0
    } else {
        value
    };
    if mm.is_finite() && mm > 0.0 {
        Some(mm)
    } else {
        None
    }
}

fn scan_numbers(text: &str) -> Vec<NumberToken> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
        }
        if let Ok(value) = text[start..i].parse::<f64>() {
            tokens.push(NumberToken { start, end: i, value });
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use super::*;

    #[test]
    fn test_parse_dimensions_empty_inputs() {
        for raw in [None, Some(""), Some("   "), Some("no digits here"), Some("Frame width: n/a")] {
            let dims = parse_dimensions(raw);
            assert!(dims.is_empty(), "{raw:?} gave {dims:?}");
        }
    }

    #[test]
    fn test_parse_dimensions_labelled() {
        let dims = parse_dimensions(Some("Frame Width: 138mm, Lens Height: 42mm"));
        assert_eq!(dims.width, Some(138.0));
        assert_eq!(dims.lens_height, Some(42.0));

        let dims = parse_dimensions(Some("Lens height 40.5 mm | Frame width 135 mm"));
        assert_eq!(dims.width, Some(135.0));
        assert_eq!(dims.lens_height, Some(40.5));
    }

    #[test]
    fn test_parse_dimensions_skips_lens_and_bridge_width() {
        let dims = parse_dimensions(Some(
            "Lens Width: 52mm, Bridge Width: 18mm, Temple Length: 140mm, Frame Width: 136mm, Lens Height: 41mm",
        ));
        assert_eq!(dims.width, Some(136.0));
        assert_eq!(dims.lens_height, Some(41.0));
    }

    #[test]
    fn test_parse_dimensions_keeps_partial() {
        let dims = parse_dimensions(Some("Width: 140 mm"));
        assert_eq!(dims.width, Some(140.0));
        assert_eq!(dims.lens_height, None);

        let dims = parse_dimensions(Some("lens height - 44"));
        assert_eq!(dims.width, None);
        assert_eq!(dims.lens_height, Some(44.0));
    }

    #[test]
    fn test_parse_dimensions_value_then_label() {
        let dims = parse_dimensions(Some("138mm frame width, 42mm lens height"));
        assert_eq!(dims.width, Some(138.0));
        assert_eq!(dims.lens_height, Some(42.0));

        let dims = parse_dimensions(Some("138 mm frame width 42 mm lens height"));
        assert_eq!(dims.width, Some(138.0));
        assert_eq!(dims.lens_height, Some(42.0));

        let dims = parse_dimensions(Some("52mm lens width; 140mm width"));
        assert_eq!(dims.width, Some(140.0));
        assert_eq!(dims.lens_height, None);

        // mixed: value first, then label first
        let dims = parse_dimensions(Some("13.6cm frame width, Lens Height: 41mm"));
        assert_abs_diff_eq!(dims.width.unwrap(), 136.0, epsilon = 1e-9);
        assert_eq!(dims.lens_height, Some(41.0));
    }

    #[test]
    fn test_parse_dimensions_label_first_is_not_shifted() {
        // the label between the numbers belongs to the second one
        let dims = parse_dimensions(Some("Size 138 Lens Height 42"));
        assert_eq!(dims.width, None);
        assert_eq!(dims.lens_height, Some(42.0));
    }

    #[test]
    fn test_parse_dimensions_ignores_frame_height() {
        let dims = parse_dimensions(Some("Frame Height: 45mm"));
        assert!(dims.is_empty());

        let dims = parse_dimensions(Some("Frame Width: 140mm, Frame Height: 45mm, Lens Height: 39mm"));
        assert_eq!(dims.width, Some(140.0));
        assert_eq!(dims.lens_height, Some(39.0));
    }

    #[test]
    fn test_parse_dimensions_pair_and_units() {
        let dims = parse_dimensions(Some("138 x 42 mm"));
        assert_eq!(dims.width, Some(138.0));
        assert_eq!(dims.lens_height, Some(42.0));

        let dims = parse_dimensions(Some("13.8cm × 4.2cm"));
        assert_abs_diff_eq!(dims.width.unwrap(), 138.0, epsilon = 1e-9);
        assert_abs_diff_eq!(dims.lens_height.unwrap(), 42.0, epsilon = 1e-9);

        // lens-bridge-temple notation does not state a frame width
        assert!(parse_dimensions(Some("52-18-140")).is_empty());
    }

    #[test]
    fn test_parse_dimensions_garbage_does_not_panic() {
        for raw in ["....", "width:", "9".repeat(400).as_str(), "ü×ö 1.2.3 width 0", "height -0 width 0.0"] {
            let dims = parse_dimensions(Some(raw));
            assert!(dims.width.map_or(true, |w| w > 0.0));
            assert!(dims.lens_height.map_or(true, |h| h > 0.0));
        }
    }

    #[test]
    fn test_width_or() {
        assert_eq!(FrameDimensions::default().width_or(135.0), 135.0);
        assert_eq!(parse_dimensions(Some("width 128")).width_or(135.0), 128.0);
    }
}
