//! Trace events
//!
//! Every event targets one entity at one simulation time. The set of
//! variants is closed: the engine dispatches on it with an exhaustive match,
//! so adding a variant is a compile-checked change.

use crate::entities::EntityKind;
use crate::{EntityId, Nanoseconds, Point};
use serde::{Deserialize, Serialize};

/// Append one sample to a point series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppendPoint {
    pub entity_id: EntityId,
    pub time: Nanoseconds,
    pub point: Point,
}

/// Append a batch of samples to a point series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppendPoints {
    pub entity_id: EntityId,
    pub time: Nanoseconds,
    pub points: Vec<Point>,
}

/// Remove every sample from a point series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClearSeries {
    pub entity_id: EntityId,
    pub time: Nanoseconds,
}

/// Append one (value, category) sample to a category series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppendCategoryValue {
    pub entity_id: EntityId,
    pub time: Nanoseconds,
    pub value: f64,
    pub category: u32,
}

/// Append a text entry to a log stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppendLog {
    pub entity_id: EntityId,
    pub time: Nanoseconds,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TraceEvent {
    AppendPoint(AppendPoint),
    AppendPoints(AppendPoints),
    ClearSeries(ClearSeries),
    AppendCategoryValue(AppendCategoryValue),
    AppendLog(AppendLog),
}

impl TraceEvent {
    pub fn time(&self) -> Nanoseconds {
        match self {
            TraceEvent::AppendPoint(e) => e.time,
            TraceEvent::AppendPoints(e) => e.time,
            TraceEvent::ClearSeries(e) => e.time,
            TraceEvent::AppendCategoryValue(e) => e.time,
            TraceEvent::AppendLog(e) => e.time,
        }
    }

    pub fn entity_id(&self) -> EntityId {
        match self {
            TraceEvent::AppendPoint(e) => e.entity_id,
            TraceEvent::AppendPoints(e) => e.entity_id,
            TraceEvent::ClearSeries(e) => e.entity_id,
            TraceEvent::AppendCategoryValue(e) => e.entity_id,
            TraceEvent::AppendLog(e) => e.entity_id,
        }
    }

    /// Kind of entity this event may target
    pub fn target_kind(&self) -> EntityKind {
        match self {
            TraceEvent::AppendPoint(_)
            | TraceEvent::AppendPoints(_)
            | TraceEvent::ClearSeries(_) => EntityKind::PointSeries,
            TraceEvent::AppendCategoryValue(_) => EntityKind::CategorySeries,
            TraceEvent::AppendLog(_) => EntityKind::LogStream,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TraceEvent::AppendPoint(_) => "AppendPoint",
            TraceEvent::AppendPoints(_) => "AppendPoints",
            TraceEvent::ClearSeries(_) => "ClearSeries",
            TraceEvent::AppendCategoryValue(_) => "AppendCategoryValue",
            TraceEvent::AppendLog(_) => "AppendLog",
        }
    }
}

impl From<AppendPoint> for TraceEvent {
    fn from(event: AppendPoint) -> Self {
        TraceEvent::AppendPoint(event)
    }
}

impl From<AppendPoints> for TraceEvent {
    fn from(event: AppendPoints) -> Self {
        TraceEvent::AppendPoints(event)
    }
}

impl From<ClearSeries> for TraceEvent {
    fn from(event: ClearSeries) -> Self {
        TraceEvent::ClearSeries(event)
    }
}

impl From<AppendCategoryValue> for TraceEvent {
    fn from(event: AppendCategoryValue) -> Self {
        TraceEvent::AppendCategoryValue(event)
    }
}

impl From<AppendLog> for TraceEvent {
    fn from(event: AppendLog) -> Self {
        TraceEvent::AppendLog(event)
    }
}
