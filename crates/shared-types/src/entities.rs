//! Entity definitions as supplied by the trace loader
//!
//! Definitions are static for the lifetime of a loaded trace. The replay
//! engine wraps each one with the mutable state it maintains while the
//! cursor moves.

use crate::axis::{CategoryAxis, ValueAxis};
use crate::{Color, EntityId, Nanoseconds};
use serde::{Deserialize, Serialize};

fn default_visible() -> bool {
    true
}

/// The closed set of entity kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Collection,
    PointSeries,
    CategorySeries,
    LogStream,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Collection => write!(f, "collection"),
            EntityKind::PointSeries => write!(f, "point series"),
            EntityKind::CategorySeries => write!(f, "category series"),
            EntityKind::LogStream => write!(f, "log stream"),
        }
    }
}

/// Ordered (x, y) samples with two numeric axes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PointSeriesDef {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub legend: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub color: Option<Color>,
    pub x_axis: ValueAxis,
    pub y_axis: ValueAxis,
}

/// Ordered (x, category) samples over a fixed category axis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategorySeriesDef {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub legend: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub color: Option<Color>,
    pub x_axis: ValueAxis,
    pub y_axis: CategoryAxis,
    /// Keep the series moving along x while no event arrives
    #[serde(default)]
    pub auto_advance: bool,
    #[serde(default)]
    pub advance_interval: Nanoseconds,
    #[serde(default)]
    pub advance_increment: f64,
}

/// A virtual entity whose ranges are the union of its members' values
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDef {
    pub id: EntityId,
    pub name: String,
    /// Member ids; each must resolve to a point series
    pub members: Vec<EntityId>,
    pub x_axis: ValueAxis,
    pub y_axis: ValueAxis,
}

/// A named text log written to by the scenario
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogStreamDef {
    pub id: EntityId,
    pub name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub color: Option<Color>,
}
