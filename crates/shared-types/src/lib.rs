//! Shared types for the NetSim trace replay workspace
//!
//! This crate holds the trace data model consumed by the replay engine:
//! entity definitions, axis definitions, the closed set of trace events and
//! the error taxonomy. Everything here is plain data that a trace loader can
//! deserialize and the engine can validate before replay starts.

use serde::{Deserialize, Serialize};

pub mod axis;
pub mod entities;
pub mod errors;
pub mod events;
pub mod trace;

pub use axis::{AxisRange, BoundMode, Category, CategoryAxis, Scale, ValueAxis};
pub use entities::{CategorySeriesDef, CollectionDef, EntityKind, LogStreamDef, PointSeriesDef};
pub use errors::{ReplayError, ReplayResult};
pub use events::{
    AppendCategoryValue, AppendLog, AppendPoint, AppendPoints, ClearSeries, TraceEvent,
};
pub use trace::Trace;

/// Simulation timestamp, nanosecond granularity
pub type Nanoseconds = i64;

/// Numeric id shared by every entity in a trace
pub type EntityId = u32;

/// A single (x, y) sample
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// RGB color carried through to the rendering layer untouched
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}
