//! Selectable series list offered to the rendering layer

use crate::registry::{Entity, EntityRegistry};
use netsim_replay_config::SortOrder;
use netsim_replay_shared::{EntityId, EntityKind};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesListing {
    pub id: EntityId,
    pub name: String,
    pub kind: EntityKind,
}

impl SeriesListing {
    fn of(entity: &Entity) -> Self {
        Self {
            id: entity.id(),
            name: entity.name().to_string(),
            kind: entity.kind(),
        }
    }
}

/// List every selectable entity in `order`.
///
/// Collections are always listed, point and category series only while
/// visible. Log streams are not chartable and never listed. The base
/// ordering is collections, then point series, then category series, each
/// group in registration order; `order` is applied on top with a stable
/// sort.
pub fn catalog(registry: &EntityRegistry, order: SortOrder) -> Vec<SeriesListing> {
    let mut listings: Vec<SeriesListing> = registry
        .iter_registered()
        .filter(|entity| entity.kind() != EntityKind::LogStream && entity.is_visible())
        .map(SeriesListing::of)
        .collect();
    listings.sort_by_key(|l| l.kind);

    match order {
        SortOrder::Alphabetical => listings.sort_by_cached_key(|l| l.name.to_lowercase()),
        SortOrder::Id => listings.sort_by_key(|l| l.id),
        SortOrder::Type | SortOrder::None => {}
    }

    listings
}
