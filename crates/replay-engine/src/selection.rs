//! Which entity each rendering view currently displays
//!
//! An entity is never shown in two views at once. Selecting a collection
//! claims its member series as well, and selecting a point series claims
//! every collection containing it, so any other view already showing one of
//! those is cleared.

use crate::registry::{Entity, EntityRegistry};
use netsim_replay_shared::{EntityId, ReplayError, ReplayResult};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ViewId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSlot {
    pub id: ViewId,
    pub selected: Option<EntityId>,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionBoard {
    views: Vec<ViewSlot>,
    next_view: u32,
}

impl SelectionBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_view(&mut self) -> ViewId {
        let id = ViewId(self.next_view);
        self.next_view += 1;
        self.views.push(ViewSlot { id, selected: None });
        id
    }

    pub fn remove_view(&mut self, view: ViewId) -> ReplayResult<Option<EntityId>> {
        let index = self.index_of(view)?;
        Ok(self.views.remove(index).selected)
    }

    pub fn views(&self) -> &[ViewSlot] {
        &self.views
    }

    pub fn selected(&self, view: ViewId) -> ReplayResult<Option<EntityId>> {
        Ok(self.views[self.index_of(view)?].selected)
    }

    /// View currently showing `id`, if any
    pub fn view_showing(&self, id: EntityId) -> Option<ViewId> {
        self.views
            .iter()
            .find(|slot| slot.selected == Some(id))
            .map(|slot| slot.id)
    }

    /// Show `id` in `view`. Returns the other views that were cleared because
    /// they displayed `id` or an entity related to it.
    ///
    /// A missing view or entity is reported without touching any selection.
    pub fn select(
        &mut self,
        registry: &EntityRegistry,
        view: ViewId,
        id: EntityId,
    ) -> ReplayResult<Vec<ViewId>> {
        let index = self.index_of(view)?;
        let entity = registry.get(id)?;
        let related = related_entities(registry, entity);

        let mut cleared = Vec::new();
        for slot in self.views.iter_mut().filter(|slot| slot.id != view) {
            if let Some(shown) = slot.selected {
                if related.contains(&shown) {
                    slot.selected = None;
                    cleared.push(slot.id);
                }
            }
        }

        self.views[index].selected = Some(id);
        if !cleared.is_empty() {
            log::debug!(
                "[SelectionBoard] Selecting {} in view {:?} cleared {:?}",
                id,
                view,
                cleared
            );
        }
        Ok(cleared)
    }

    pub fn clear(&mut self, view: ViewId) -> ReplayResult<Option<EntityId>> {
        let index = self.index_of(view)?;
        Ok(self.views[index].selected.take())
    }

    /// Drop every selection, keeping the views. Used when a new trace loads.
    pub fn reset(&mut self) {
        for slot in &mut self.views {
            slot.selected = None;
        }
    }

    fn index_of(&self, view: ViewId) -> ReplayResult<usize> {
        self.views
            .iter()
            .position(|slot| slot.id == view)
            .ok_or(ReplayError::ViewNotFound { view: view.0 })
    }
}

/// The entity itself plus whatever selecting it implicitly claims
fn related_entities(registry: &EntityRegistry, entity: &Entity) -> Vec<EntityId> {
    let mut related = vec![entity.id()];
    match entity {
        Entity::Collection(collection) => related.extend_from_slice(collection.members()),
        Entity::PointSeries(series) => {
            related.extend_from_slice(registry.collections_containing(series.id()))
        }
        Entity::CategorySeries(_) | Entity::LogStream(_) => {}
    }
    related
}
