//! Entity registry
//!
//! Maps entity ids to the typed records the engine mutates while replaying.
//! Definitions are fixed once registered; only the replay engine changes
//! samples and ranges, through the crate-private mutation methods below.

use crate::logs::{LogStream, UnifiedLog};
use netsim_replay_shared::{
    AxisRange, CategorySeriesDef, CollectionDef, EntityId, EntityKind, LogStreamDef,
    Nanoseconds, Point, PointSeriesDef, ReplayError, ReplayResult, Trace, TraceEvent,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone)]
pub struct PointSeries {
    def: PointSeriesDef,
    samples: Vec<Point>,
    x_range: AxisRange,
    y_range: AxisRange,
}

impl PointSeries {
    pub fn new(def: PointSeriesDef) -> Self {
        let x_range = def.x_axis.range;
        let y_range = def.y_axis.range;
        Self {
            def,
            samples: Vec::new(),
            x_range,
            y_range,
        }
    }

    pub fn id(&self) -> EntityId {
        self.def.id
    }

    pub fn def(&self) -> &PointSeriesDef {
        &self.def
    }

    pub fn samples(&self) -> &[Point] {
        &self.samples
    }

    pub fn x_range(&self) -> AxisRange {
        self.x_range
    }

    pub fn y_range(&self) -> AxisRange {
        self.y_range
    }

    /// Push a sample, widening whichever axes track the highest value
    pub(crate) fn append(&mut self, point: Point, padding: f64) {
        if self.def.x_axis.tracks_highest() {
            self.x_range.widen(point.x, padding);
        }
        if self.def.y_axis.tracks_highest() {
            self.y_range.widen(point.y, padding);
        }
        self.samples.push(point);
    }

    /// Drop the `count` most recent samples
    pub(crate) fn truncate_by(&mut self, count: usize) {
        let len = self.samples.len().saturating_sub(count);
        self.samples.truncate(len);
    }

    pub(crate) fn take_samples(&mut self) -> Vec<Point> {
        std::mem::take(&mut self.samples)
    }

    pub(crate) fn restore_samples(&mut self, samples: Vec<Point>) {
        self.samples = samples;
    }

    pub(crate) fn set_ranges(&mut self, x_range: AxisRange, y_range: AxisRange) {
        self.x_range = x_range;
        self.y_range = y_range;
    }
}

/// One (x, category) sample
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CategorySample {
    pub x: f64,
    pub category: u32,
}

#[derive(Debug, Clone)]
pub struct CategorySeries {
    def: CategorySeriesDef,
    samples: Vec<CategorySample>,
    x_range: AxisRange,
    last_updated: Nanoseconds,
}

impl CategorySeries {
    pub fn new(def: CategorySeriesDef) -> Self {
        let x_range = def.x_axis.range;
        Self {
            def,
            samples: Vec::new(),
            x_range,
            last_updated: 0,
        }
    }

    pub fn id(&self) -> EntityId {
        self.def.id
    }

    pub fn def(&self) -> &CategorySeriesDef {
        &self.def
    }

    pub fn samples(&self) -> &[CategorySample] {
        &self.samples
    }

    pub fn x_range(&self) -> AxisRange {
        self.x_range
    }

    /// Category axes are never auto-ranged
    pub fn y_range(&self) -> AxisRange {
        self.def.y_axis.range()
    }

    pub fn last_updated(&self) -> Nanoseconds {
        self.last_updated
    }

    pub fn auto_advances(&self) -> bool {
        self.def.auto_advance
    }

    /// Category of the most recent sample
    pub fn current_category(&self) -> Option<u32> {
        self.samples.last().map(|s| s.category)
    }

    pub fn current_category_name(&self) -> Option<&str> {
        self.current_category()
            .and_then(|category| self.def.y_axis.name_of(category))
    }

    /// Returns the previous `last_updated` so the append can be undone
    pub(crate) fn append(
        &mut self,
        sample: CategorySample,
        time: Nanoseconds,
        padding: f64,
    ) -> Nanoseconds {
        if self.def.x_axis.tracks_highest() {
            self.x_range.widen(sample.x, padding);
        }
        self.samples.push(sample);
        std::mem::replace(&mut self.last_updated, time)
    }

    pub(crate) fn remove_last(&mut self, previous_update: Nanoseconds) {
        self.samples.pop();
        self.last_updated = previous_update;
    }

    pub(crate) fn set_x_range(&mut self, x_range: AxisRange) {
        self.x_range = x_range;
    }
}

#[derive(Debug, Clone)]
pub struct Collection {
    def: CollectionDef,
    x_range: AxisRange,
    y_range: AxisRange,
}

impl Collection {
    pub fn new(def: CollectionDef) -> Self {
        let x_range = def.x_axis.range;
        let y_range = def.y_axis.range;
        Self {
            def,
            x_range,
            y_range,
        }
    }

    pub fn id(&self) -> EntityId {
        self.def.id
    }

    pub fn def(&self) -> &CollectionDef {
        &self.def
    }

    pub fn members(&self) -> &[EntityId] {
        &self.def.members
    }

    pub fn x_range(&self) -> AxisRange {
        self.x_range
    }

    pub fn y_range(&self) -> AxisRange {
        self.y_range
    }

    /// Widen the collection's own tracking axes for a member's value.
    /// Returns `true` when either range changed.
    pub(crate) fn observe(&mut self, point: Point, padding: f64) -> bool {
        let mut changed = false;
        if self.def.x_axis.tracks_highest() {
            changed |= self.x_range.widen(point.x, padding);
        }
        if self.def.y_axis.tracks_highest() {
            changed |= self.y_range.widen(point.y, padding);
        }
        changed
    }

    pub(crate) fn set_ranges(&mut self, x_range: AxisRange, y_range: AxisRange) {
        self.x_range = x_range;
        self.y_range = y_range;
    }
}

#[derive(Debug, Clone)]
pub enum Entity {
    PointSeries(PointSeries),
    CategorySeries(CategorySeries),
    Collection(Collection),
    LogStream(LogStream),
}

impl Entity {
    pub fn id(&self) -> EntityId {
        match self {
            Entity::PointSeries(s) => s.id(),
            Entity::CategorySeries(s) => s.id(),
            Entity::Collection(c) => c.id(),
            Entity::LogStream(l) => l.id(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Entity::PointSeries(s) => &s.def.name,
            Entity::CategorySeries(s) => &s.def.name,
            Entity::Collection(c) => &c.def.name,
            Entity::LogStream(l) => l.name(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::PointSeries(_) => EntityKind::PointSeries,
            Entity::CategorySeries(_) => EntityKind::CategorySeries,
            Entity::Collection(_) => EntityKind::Collection,
            Entity::LogStream(_) => EntityKind::LogStream,
        }
    }

    /// Collections are always listed; everything else honors its flag
    pub fn is_visible(&self) -> bool {
        match self {
            Entity::PointSeries(s) => s.def.visible,
            Entity::CategorySeries(s) => s.def.visible,
            Entity::Collection(_) => true,
            Entity::LogStream(l) => l.def().visible,
        }
    }

    /// Current (x, y) ranges, `None` for entities without axes
    pub fn ranges(&self) -> Option<(AxisRange, AxisRange)> {
        match self {
            Entity::PointSeries(s) => Some((s.x_range, s.y_range)),
            Entity::CategorySeries(s) => Some((s.x_range, s.y_range())),
            Entity::Collection(c) => Some((c.x_range, c.y_range)),
            Entity::LogStream(_) => None,
        }
    }

    pub(crate) fn set_ranges(&mut self, x_range: AxisRange, y_range: AxisRange) {
        match self {
            Entity::PointSeries(s) => s.set_ranges(x_range, y_range),
            Entity::CategorySeries(s) => s.set_x_range(x_range),
            Entity::Collection(c) => c.set_ranges(x_range, y_range),
            Entity::LogStream(_) => {}
        }
    }
}

/// Storage and lookup for every entity of one loaded trace
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: BTreeMap<EntityId, Entity>,
    registration_order: Vec<EntityId>,
    /// member id -> ids of the collections containing it
    membership: HashMap<EntityId, Vec<EntityId>>,
    auto_advancing: Vec<EntityId>,
    unified_log: UnifiedLog,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a trace's definitions.
    ///
    /// Collections are registered last so every member can be resolved.
    pub fn from_trace(trace: &Trace) -> ReplayResult<Self> {
        let mut registry = Self::new();

        for def in &trace.point_series {
            registry.register_point_series(def.clone())?;
        }
        for def in &trace.category_series {
            registry.register_category_series(def.clone())?;
        }
        for def in &trace.log_streams {
            registry.register_log_stream(def.clone())?;
        }
        for def in &trace.collections {
            registry.register_collection(def.clone())?;
        }

        log::debug!(
            "[EntityRegistry] Registered {} entities ({} collections, {} auto-advancing)",
            registry.len(),
            trace.collections.len(),
            registry.auto_advancing.len()
        );
        Ok(registry)
    }

    pub fn register_point_series(&mut self, def: PointSeriesDef) -> ReplayResult<EntityId> {
        self.insert(Entity::PointSeries(PointSeries::new(def)))
    }

    pub fn register_category_series(&mut self, def: CategorySeriesDef) -> ReplayResult<EntityId> {
        if def.auto_advance && def.advance_interval <= 0 {
            return Err(ReplayError::InvalidAdvanceInterval {
                id: def.id,
                interval: def.advance_interval,
            });
        }
        let auto_advance = def.auto_advance;
        let id = self.insert(Entity::CategorySeries(CategorySeries::new(def)))?;
        if auto_advance {
            self.auto_advancing.push(id);
        }
        Ok(id)
    }

    pub fn register_log_stream(&mut self, def: LogStreamDef) -> ReplayResult<EntityId> {
        self.insert(Entity::LogStream(LogStream::new(def)))
    }

    /// Members must already be registered point series
    pub fn register_collection(&mut self, def: CollectionDef) -> ReplayResult<EntityId> {
        for &member in &def.members {
            match self.entities.get(&member) {
                None => {
                    return Err(ReplayError::UnknownMember {
                        collection: def.id,
                        member,
                    })
                }
                Some(Entity::PointSeries(_)) => {}
                Some(other) => {
                    return Err(ReplayError::MemberNotPointSeries {
                        collection: def.id,
                        member,
                        actual: other.kind(),
                    })
                }
            }
        }

        let collection_id = def.id;
        let members = def.members.clone();
        self.insert(Entity::Collection(Collection::new(def)))?;

        for member in members {
            let containing = self.membership.entry(member).or_default();
            if !containing.contains(&collection_id) {
                containing.push(collection_id);
            }
        }
        Ok(collection_id)
    }

    fn insert(&mut self, entity: Entity) -> ReplayResult<EntityId> {
        let id = entity.id();
        if self.entities.contains_key(&id) {
            return Err(ReplayError::DuplicateEntity { id });
        }
        self.entities.insert(id, entity);
        self.registration_order.push(id);
        Ok(id)
    }

    pub fn get(&self, id: EntityId) -> ReplayResult<&Entity> {
        self.entities.get(&id).ok_or(ReplayError::NotFound { id })
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Entities in the order they were registered
    pub fn iter_registered(&self) -> impl Iterator<Item = &Entity> {
        self.registration_order
            .iter()
            .filter_map(|id| self.entities.get(id))
    }

    pub fn point_series(&self, id: EntityId) -> Option<&PointSeries> {
        match self.entities.get(&id) {
            Some(Entity::PointSeries(s)) => Some(s),
            _ => None,
        }
    }

    pub fn category_series(&self, id: EntityId) -> Option<&CategorySeries> {
        match self.entities.get(&id) {
            Some(Entity::CategorySeries(s)) => Some(s),
            _ => None,
        }
    }

    pub fn collection(&self, id: EntityId) -> Option<&Collection> {
        match self.entities.get(&id) {
            Some(Entity::Collection(c)) => Some(c),
            _ => None,
        }
    }

    pub fn log_stream(&self, id: EntityId) -> Option<&LogStream> {
        match self.entities.get(&id) {
            Some(Entity::LogStream(l)) => Some(l),
            _ => None,
        }
    }

    /// Ids of the collections containing `id`
    pub fn collections_containing(&self, id: EntityId) -> &[EntityId] {
        self.membership.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn auto_advancing(&self) -> &[EntityId] {
        &self.auto_advancing
    }

    pub fn unified_log(&self) -> &UnifiedLog {
        &self.unified_log
    }

    /// Unified log text with `[stream name]: ` prompts
    pub fn render_unified_log(&self) -> String {
        self.unified_log
            .render(|id| self.log_stream(id).map(LogStream::name))
    }

    /// Check an event against the registry: the target must exist, be of
    /// the kind the event expects, and category values must be defined.
    pub fn validate_event(&self, event: &TraceEvent) -> ReplayResult<()> {
        let id = event.entity_id();
        let entity = self.entities.get(&id).ok_or(ReplayError::UnknownEntity {
            id,
            time: event.time(),
        })?;

        let expected = event.target_kind();
        if entity.kind() != expected {
            return Err(ReplayError::EventKindMismatch {
                id,
                event: event.name().to_string(),
                expected,
                actual: entity.kind(),
            });
        }

        if let (TraceEvent::AppendCategoryValue(e), Entity::CategorySeries(series)) =
            (event, entity)
        {
            if !series.def.y_axis.contains(e.category) {
                return Err(ReplayError::UnknownCategory {
                    id,
                    category: e.category,
                });
            }
        }

        Ok(())
    }

    pub(crate) fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub(crate) fn point_series_mut(&mut self, id: EntityId) -> Option<&mut PointSeries> {
        match self.entities.get_mut(&id) {
            Some(Entity::PointSeries(s)) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn category_series_mut(&mut self, id: EntityId) -> Option<&mut CategorySeries> {
        match self.entities.get_mut(&id) {
            Some(Entity::CategorySeries(s)) => Some(s),
            _ => None,
        }
    }

    /// Run `f` on every collection containing `member`
    pub(crate) fn for_each_collection_containing(
        &mut self,
        member: EntityId,
        mut f: impl FnMut(&mut Collection),
    ) {
        let Some(collection_ids) = self.membership.get(&member) else {
            return;
        };
        for collection_id in collection_ids {
            if let Some(Entity::Collection(collection)) = self.entities.get_mut(collection_id) {
                f(collection);
            }
        }
    }

    /// Returns `false` when `id` is not a log stream
    pub(crate) fn append_log(&mut self, id: EntityId, text: &str) -> bool {
        match self.entities.get_mut(&id) {
            Some(Entity::LogStream(stream)) => {
                stream.push(text.to_string());
                self.unified_log.push(id, text.to_string());
                true
            }
            _ => false,
        }
    }

    /// Returns `false` when `id` is not a log stream
    pub(crate) fn pop_log(&mut self, id: EntityId) -> bool {
        match self.entities.get_mut(&id) {
            Some(Entity::LogStream(stream)) => {
                stream.pop();
                self.unified_log.pop(id);
                true
            }
            _ => false,
        }
    }
}
