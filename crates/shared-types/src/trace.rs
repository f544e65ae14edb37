//! A loaded trace: static entity definitions plus the recorded event log

use crate::entities::{CategorySeriesDef, CollectionDef, LogStreamDef, PointSeriesDef};
use crate::errors::ReplayResult;
use crate::events::TraceEvent;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Trace {
    pub point_series: Vec<PointSeriesDef>,
    pub category_series: Vec<CategorySeriesDef>,
    pub collections: Vec<CollectionDef>,
    pub log_streams: Vec<LogStreamDef>,
    pub events: Vec<TraceEvent>,
}

impl Trace {
    pub fn from_json_str(content: &str) -> ReplayResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> ReplayResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn entity_count(&self) -> usize {
        self.point_series.len()
            + self.category_series.len()
            + self.collections.len()
            + self.log_streams.len()
    }

    /// Whether the event log is already in non-decreasing time order
    pub fn is_time_sorted(&self) -> bool {
        self.events.windows(2).all(|w| w[0].time() <= w[1].time())
    }
}
