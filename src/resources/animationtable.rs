//! Dense structure-of-arrays storage for active animation instances.
//!
//! Every attribute of an instance lives in its own column; row `i` of every
//! column belongs to the same instance. Rows are appended at the tail and
//! removed by swapping the last row into the hole, so row order is not stable.
//!
//! Capacity is managed in whole chunks:
//! - growing adds exactly one chunk when an append finds the table full;
//! - shrinking drops exactly one chunk when a removal leaves one full chunk
//!   of headroom (and the table is not empty).
//!
//! The table never touches the [`InstanceIndex`](super::instanceindex::InstanceIndex);
//! [`FrameAnimations`](super::frameanimations::FrameAnimations) pairs every
//! structural change here with the matching index update.

use serde::{Deserialize, Serialize};

use crate::resources::clipstore::ClipList;
use crate::resources::instanceindex::InstanceId;

/// Rows reserved up front and added or removed per capacity change.
pub const DEFAULT_CHUNK_SIZE: usize = 64;

/// Playback state of one instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnimationState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Whether an instance keeps animating while its render target is hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CullingType {
    #[default]
    AlwaysAnimate,
    BasedOnRenderers,
}

/// Values for a freshly appended row.
#[derive(Debug, Clone)]
pub struct AnimationRow<R> {
    pub id: InstanceId,
    pub state: AnimationState,
    pub culling_type: CullingType,
    pub ignore_scaled_time: bool,
    pub backward: bool,
    pub frame_index: usize,
    pub clip_index: usize,
    pub elapsed_time: f32,
    pub renderer: R,
    pub clips: Option<ClipList>,
}

impl<R> AnimationRow<R> {
    /// A stopped row at the start of its first clip.
    pub fn new(
        id: InstanceId,
        culling_type: CullingType,
        ignore_scaled_time: bool,
        renderer: R,
        clips: Option<ClipList>,
    ) -> Self {
        Self {
            id,
            state: AnimationState::Stopped,
            culling_type,
            ignore_scaled_time,
            backward: false,
            frame_index: 0,
            clip_index: 0,
            elapsed_time: 0.0,
            renderer,
            clips,
        }
    }
}

#[derive(Debug)]
pub struct AnimationTable<R> {
    chunk_size: usize,
    capacity: usize,
    pub(crate) ids: Vec<InstanceId>,
    pub(crate) states: Vec<AnimationState>,
    pub(crate) culling_types: Vec<CullingType>,
    pub(crate) ignore_scaled_times: Vec<bool>,
    pub(crate) backwards: Vec<bool>,
    pub(crate) frame_indices: Vec<usize>,
    pub(crate) clip_indices: Vec<usize>,
    pub(crate) elapsed_times: Vec<f32>,
    pub(crate) renderers: Vec<R>,
    pub(crate) clips: Vec<Option<ClipList>>,
}

impl<R> Default for AnimationTable<R> {
    fn default() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }
}

impl<R> AnimationTable<R> {
    /// Create an empty table with one chunk reserved. A zero chunk size is
    /// treated as one.
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            capacity: chunk_size,
            ids: Vec::with_capacity(chunk_size),
            states: Vec::with_capacity(chunk_size),
            culling_types: Vec::with_capacity(chunk_size),
            ignore_scaled_times: Vec::with_capacity(chunk_size),
            backwards: Vec::with_capacity(chunk_size),
            frame_indices: Vec::with_capacity(chunk_size),
            clip_indices: Vec::with_capacity(chunk_size),
            elapsed_times: Vec::with_capacity(chunk_size),
            renderers: Vec::with_capacity(chunk_size),
            clips: Vec::with_capacity(chunk_size),
        }
    }

    /// Number of occupied rows.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Rows reserved in every column. Always a whole number of chunks.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Ids in row order. Row order changes on removal.
    pub fn ids(&self) -> &[InstanceId] {
        &self.ids
    }

    /// Append a row at the tail, growing by one chunk first if full.
    /// Returns the new row number.
    pub(crate) fn push(&mut self, row: AnimationRow<R>) -> usize {
        if self.len() == self.capacity {
            self.resize_columns(self.capacity + self.chunk_size);
        }
        self.ids.push(row.id);
        self.states.push(row.state);
        self.culling_types.push(row.culling_type);
        self.ignore_scaled_times.push(row.ignore_scaled_time);
        self.backwards.push(row.backward);
        self.frame_indices.push(row.frame_index);
        self.clip_indices.push(row.clip_index);
        self.elapsed_times.push(row.elapsed_time);
        self.renderers.push(row.renderer);
        self.clips.push(row.clips);
        self.len() - 1
    }

    /// Remove `row` by moving the last row into its place.
    ///
    /// Returns the id of the row that moved into `row`, or `None` when the
    /// removed row was the last one. The caller must repoint that id.
    pub(crate) fn swap_remove(&mut self, row: usize) -> Option<InstanceId> {
        let last = self.len() - 1;
        self.ids.swap_remove(row);
        self.states.swap_remove(row);
        self.culling_types.swap_remove(row);
        self.ignore_scaled_times.swap_remove(row);
        self.backwards.swap_remove(row);
        self.frame_indices.swap_remove(row);
        self.clip_indices.swap_remove(row);
        self.elapsed_times.swap_remove(row);
        self.renderers.swap_remove(row);
        self.clips.swap_remove(row);

        let size = self.len();
        if size > 0 && size + self.chunk_size == self.capacity {
            self.resize_columns(size);
        }

        (row != last).then(|| self.ids[row])
    }

    fn resize_columns(&mut self, capacity: usize) {
        fn fit<T>(column: &mut Vec<T>, capacity: usize) {
            if capacity > column.capacity() {
                column.reserve_exact(capacity - column.len());
            } else {
                column.shrink_to(capacity);
            }
        }
        fit(&mut self.ids, capacity);
        fit(&mut self.states, capacity);
        fit(&mut self.culling_types, capacity);
        fit(&mut self.ignore_scaled_times, capacity);
        fit(&mut self.backwards, capacity);
        fit(&mut self.frame_indices, capacity);
        fit(&mut self.clip_indices, capacity);
        fit(&mut self.elapsed_times, capacity);
        fit(&mut self.renderers, capacity);
        fit(&mut self.clips, capacity);
        self.capacity = capacity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: u64) -> AnimationRow<()> {
        AnimationRow::new(InstanceId(id), CullingType::AlwaysAnimate, false, (), None)
    }

    #[test]
    fn test_new_table_reserves_one_chunk() {
        let table: AnimationTable<()> = AnimationTable::default();
        assert_eq!(table.capacity(), DEFAULT_CHUNK_SIZE);
        assert!(table.is_empty());
        assert!(table.ids.capacity() >= DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_grows_by_one_chunk_when_full() {
        let mut table = AnimationTable::with_chunk_size(4);
        for id in 0..4 {
            table.push(row(id));
        }
        assert_eq!(table.capacity(), 4);
        table.push(row(4));
        assert_eq!(table.capacity(), 8);
        assert!(table.elapsed_times.capacity() >= 8);
        for id in 5..9 {
            table.push(row(id));
        }
        assert_eq!(table.capacity(), 12);
    }

    #[test]
    fn test_swap_remove_moves_last_row() {
        let mut table = AnimationTable::with_chunk_size(8);
        for id in 0..4 {
            table.push(row(id));
        }
        table.frame_indices[3] = 9;
        let moved = table.swap_remove(1);
        assert_eq!(moved, Some(InstanceId(3)));
        assert_eq!(table.ids(), &[InstanceId(0), InstanceId(3), InstanceId(2)]);
        assert_eq!(table.frame_indices[1], 9);
        assert_eq!(table.swap_remove(2), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_shrinks_only_with_a_full_chunk_of_headroom() {
        let mut table = AnimationTable::with_chunk_size(4);
        for id in 0..6 {
            table.push(row(id));
        }
        assert_eq!(table.capacity(), 8);
        table.swap_remove(5);
        assert_eq!(table.capacity(), 8);
        table.swap_remove(4);
        assert_eq!(table.capacity(), 4);
        // Only a full chunk of headroom shrinks; size 3 with capacity 4 stays.
        table.swap_remove(0);
        assert_eq!(table.capacity(), 4);
    }

    #[test]
    fn test_never_shrinks_when_emptied() {
        let mut table = AnimationTable::with_chunk_size(2);
        table.push(row(0));
        table.push(row(1));
        table.push(row(2));
        assert_eq!(table.capacity(), 4);
        table.swap_remove(0);
        assert_eq!(table.capacity(), 2);
        table.swap_remove(0);
        table.swap_remove(0);
        assert!(table.is_empty());
        assert_eq!(table.capacity(), 2);
    }

    #[test]
    fn test_zero_chunk_size_is_clamped() {
        let mut table = AnimationTable::with_chunk_size(0);
        assert_eq!(table.chunk_size(), 1);
        table.push(row(0));
        table.push(row(1));
        assert_eq!(table.capacity(), 2);
    }
}
