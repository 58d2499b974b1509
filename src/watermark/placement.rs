use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Distance from the canvas edge for every placement except `Center`.
pub const DEFAULT_MARGIN: u32 = 50;

/// Where the watermark's top-left corner is anchored on the canvas.
///
/// Parsing from a label never fails: anything outside the five known labels
/// is treated as `BottomRight`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Position {
    BottomLeft,
    #[default]
    BottomRight,
    TopRight,
    TopLeft,
    Center,
}

impl Position {
    pub const ALL: [Position; 5] = [
        Position::BottomLeft,
        Position::BottomRight,
        Position::TopRight,
        Position::TopLeft,
        Position::Center,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Position::BottomLeft => "Bottom-Left",
            Position::BottomRight => "Bottom-Right",
            Position::TopRight => "Top-Right",
            Position::TopLeft => "Top-Left",
            Position::Center => "Center",
        }
    }

    /// Case-sensitive lookup by label, falling back to `BottomRight`.
    pub fn parse(label: &str) -> Self {
        match Self::ALL.iter().find(|p| p.label() == label) {
            Some(position) => *position,
            None => {
                warn!(
                    "Unrecognized watermark position '{}', using {}",
                    label,
                    Position::BottomRight
                );
                Position::BottomRight
            }
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<&str> for Position {
    fn from(label: &str) -> Self {
        Position::parse(label)
    }
}

impl From<String> for Position {
    fn from(label: String) -> Self {
        Position::parse(&label)
    }
}

impl From<Position> for String {
    fn from(position: Position) -> Self {
        position.label().to_string()
    }
}

/// Top-left coordinate for a watermark of the given size on the canvas.
///
/// Both coordinates are clamped at zero. A watermark bigger than the canvas
/// is allowed to spill past the far edge instead.
pub fn compute_position(
    canvas_width: u32,
    canvas_height: u32,
    watermark_width: u32,
    watermark_height: u32,
    position: Position,
    margin: u32,
) -> (u32, u32) {
    let canvas_width = i64::from(canvas_width);
    let canvas_height = i64::from(canvas_height);
    let watermark_width = i64::from(watermark_width);
    let watermark_height = i64::from(watermark_height);
    let margin = i64::from(margin);

    let x = match position {
        Position::BottomRight | Position::TopRight => canvas_width - watermark_width - margin,
        Position::BottomLeft | Position::TopLeft => margin,
        Position::Center => (canvas_width - watermark_width) / 2,
    };

    let y = match position {
        Position::TopRight | Position::TopLeft => margin,
        Position::BottomRight | Position::BottomLeft => canvas_height - watermark_height - margin,
        Position::Center => (canvas_height - watermark_height) / 2,
    };

    (non_negative(x), non_negative(y))
}

fn non_negative(coordinate: i64) -> u32 {
    // Inputs are u32, so anything at or above zero fits back into one.
    u32::try_from(coordinate.max(0)).unwrap_or(u32::MAX)
}
