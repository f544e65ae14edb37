//! Serializable read-only view of the replay state for the rendering layer

use crate::registry::{CategorySample, Entity, EntityRegistry};
use netsim_replay_shared::{AxisRange, EntityId, Nanoseconds, Point};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EntitySnapshot {
    #[serde(rename_all = "camelCase")]
    PointSeries {
        id: EntityId,
        name: String,
        samples: Vec<Point>,
        x_range: AxisRange,
        y_range: AxisRange,
    },
    #[serde(rename_all = "camelCase")]
    CategorySeries {
        id: EntityId,
        name: String,
        samples: Vec<CategorySample>,
        x_range: AxisRange,
        y_range: AxisRange,
        current_category: Option<String>,
        last_updated: Nanoseconds,
    },
    #[serde(rename_all = "camelCase")]
    Collection {
        id: EntityId,
        name: String,
        members: Vec<EntityId>,
        x_range: AxisRange,
        y_range: AxisRange,
    },
    #[serde(rename_all = "camelCase")]
    LogStream {
        id: EntityId,
        name: String,
        text: String,
    },
}

impl EntitySnapshot {
    pub fn of(entity: &Entity) -> Self {
        match entity {
            Entity::PointSeries(s) => EntitySnapshot::PointSeries {
                id: s.id(),
                name: s.def().name.clone(),
                samples: s.samples().to_vec(),
                x_range: s.x_range(),
                y_range: s.y_range(),
            },
            Entity::CategorySeries(s) => EntitySnapshot::CategorySeries {
                id: s.id(),
                name: s.def().name.clone(),
                samples: s.samples().to_vec(),
                x_range: s.x_range(),
                y_range: s.y_range(),
                current_category: s.current_category_name().map(str::to_string),
                last_updated: s.last_updated(),
            },
            Entity::Collection(c) => EntitySnapshot::Collection {
                id: c.id(),
                name: c.def().name.clone(),
                members: c.members().to_vec(),
                x_range: c.x_range(),
                y_range: c.y_range(),
            },
            Entity::LogStream(l) => EntitySnapshot::LogStream {
                id: l.id(),
                name: l.name().to_string(),
                text: l.text(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReplaySnapshot {
    pub time: Nanoseconds,
    pub pending_events: usize,
    pub applied_events: usize,
    pub synthetic_events: usize,
    pub entities: Vec<EntitySnapshot>,
    pub unified_log: String,
}

impl ReplaySnapshot {
    pub(crate) fn capture(
        registry: &EntityRegistry,
        time: Nanoseconds,
        pending_events: usize,
        applied_events: usize,
        synthetic_events: usize,
    ) -> Self {
        Self {
            time,
            pending_events,
            applied_events,
            synthetic_events,
            entities: registry.iter().map(EntitySnapshot::of).collect(),
            unified_log: registry.render_unified_log(),
        }
    }

    pub fn entity(&self, id: EntityId) -> Option<&EntitySnapshot> {
        self.entities.iter().find(|e| match e {
            EntitySnapshot::PointSeries { id: entity_id, .. }
            | EntitySnapshot::CategorySeries { id: entity_id, .. }
            | EntitySnapshot::Collection { id: entity_id, .. }
            | EntitySnapshot::LogStream { id: entity_id, .. } => *entity_id == id,
        })
    }
}
