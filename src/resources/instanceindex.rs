//! Instance id to table row mapping.
//!
//! The index is the only way to address a row of the
//! [`AnimationTable`](crate::resources::animationtable::AnimationTable) from
//! outside the scheduler. Rows move when another row is swap-removed, so raw
//! row numbers are never handed out.

use std::fmt;

use bevy_ecs::prelude::Entity;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Opaque, caller-assigned key identifying one animation binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

impl From<Entity> for InstanceId {
    fn from(entity: Entity) -> Self {
        InstanceId(entity.to_bits())
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One-to-one map from [`InstanceId`] to row number.
#[derive(Debug, Default)]
pub struct InstanceIndex {
    rows: FxHashMap<InstanceId, usize>,
}

impl InstanceIndex {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    pub fn get(&self, id: InstanceId) -> Option<usize> {
        self.rows.get(&id).copied()
    }

    pub fn contains(&self, id: InstanceId) -> bool {
        self.rows.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Map a new id. Returns false and leaves the map untouched if `id` is
    /// already present.
    pub(crate) fn insert(&mut self, id: InstanceId, row: usize) -> bool {
        if self.rows.contains_key(&id) {
            return false;
        }
        self.rows.insert(id, row);
        true
    }

    /// Point an existing id at a new row after a swap-remove.
    pub(crate) fn relocate(&mut self, id: InstanceId, row: usize) {
        if let Some(slot) = self.rows.get_mut(&id) {
            *slot = row;
        }
    }

    pub(crate) fn remove(&mut self, id: InstanceId) -> Option<usize> {
        self.rows.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (InstanceId, usize)> + '_ {
        self.rows.iter().map(|(id, row)| (*id, *row))
    }
}
