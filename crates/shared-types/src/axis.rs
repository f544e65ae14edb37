//! Axis definitions and the shared widen rule

use serde::{Deserialize, Serialize};

/// Default amount to scale past the min/max so the newest point
/// does not sit on the axis boundary
pub const DEFAULT_RANGE_PADDING: f64 = 0.05;

/// Padding kept above/below the first/last category on a category axis
pub const CATEGORY_AXIS_PADDING: f64 = 0.1;

/// Axis scale, only carried through for the rendering layer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Scale {
    #[default]
    Linear,
    Logarithmic,
}

/// Policy governing whether an axis range is fixed or grows
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum BoundMode {
    #[default]
    Fixed,
    #[serde(alias = "highestValue")]
    TrackHighest,
}

/// Closed `[min, max]` interval of an axis
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Widen the range so it covers `value`, padded by `padding` of the value.
    ///
    /// Only one side moves per observation. Returns `true` when the range
    /// changed.
    pub fn widen(&mut self, value: f64, padding: f64) -> bool {
        if value > self.max {
            self.max = value + value * padding;
            true
        } else if value < self.min {
            self.min = value - value * padding;
            true
        } else {
            false
        }
    }
}

impl Default for AxisRange {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

/// A numeric axis as declared by the trace
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ValueAxis {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub scale: Scale,
    #[serde(default)]
    pub bound_mode: BoundMode,
    #[serde(flatten)]
    pub range: AxisRange,
}

impl ValueAxis {
    pub fn tracks_highest(&self) -> bool {
        self.bound_mode == BoundMode::TrackHighest
    }
}

/// One named entry on a category axis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: u32,
    pub name: String,
}

/// A fixed, finite set of named categories. Never auto-ranged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CategoryAxis {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub values: Vec<Category>,
}

impl CategoryAxis {
    pub fn contains(&self, category: u32) -> bool {
        self.values.iter().any(|c| c.id == category)
    }

    pub fn name_of(&self, category: u32) -> Option<&str> {
        self.values
            .iter()
            .find(|c| c.id == category)
            .map(|c| c.name.as_str())
    }

    /// Display range: slight padding before the first and after the last id
    pub fn range(&self) -> AxisRange {
        match (self.values.first(), self.values.last()) {
            (Some(first), Some(last)) => AxisRange::new(
                f64::from(first.id) - CATEGORY_AXIS_PADDING,
                f64::from(last.id) + CATEGORY_AXIS_PADDING,
            ),
            _ => AxisRange::default(),
        }
    }
}
