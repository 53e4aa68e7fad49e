//! Per-frame draw builder
//!
//! Collection happens in two steps. During the unsorted step owners push
//! opaque commands and register one [`SortedEntry`] each for their
//! translucent work. The caller then asks for the sorted order and lets each
//! owner emit its sorted commands in that order. Nothing reaches a renderer
//! until [`RenderManager::flush`], which always yields the Unsorted bucket
//! before the Sorted bucket.

use std::cmp::Ordering;

use log::trace;

use crate::command::{DrawCommand, RenderBucket};
use crate::sort::{SortFlags, SortLayer};
use crate::viewport::Viewport;

/// Translucent work registered for sorting
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SortedEntry<K> {
    pub owner: K,
    pub layer: SortLayer,
    /// Distance along the view direction; larger draws first
    pub depth: f32,
    pub flags: SortFlags,
    seq: usize,
}

/// Counters for one collected frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub frame: u64,
    pub viewports: usize,
    pub unsorted: usize,
    pub sort_entries: usize,
    pub sorted: usize,
}

/// Collects draw commands into buckets for one frame
pub struct RenderManager<K> {
    viewports: Vec<Viewport>,
    current: usize,
    frame: u64,
    unsorted: Vec<DrawCommand<K>>,
    sorted: Vec<DrawCommand<K>>,
    entries: Vec<SortedEntry<K>>,
}

impl<K> Default for RenderManager<K> {
    fn default() -> Self {
        Self {
            viewports: Vec::new(),
            current: 0,
            frame: 0,
            unsorted: Vec::new(),
            sorted: Vec::new(),
            entries: Vec::new(),
        }
    }
}

impl<K: Copy + Ord> RenderManager<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_viewport(&mut self, viewport: Viewport) -> usize {
        let index = self.viewports.len();
        self.viewports.push(Viewport { index, ..viewport });
        index
    }

    pub fn viewports(&self) -> &[Viewport] {
        &self.viewports
    }

    pub fn viewport_mut(&mut self, index: usize) -> Option<&mut Viewport> {
        self.viewports.get_mut(index)
    }

    /// Make `index` the viewport that subsequent hooks render into
    pub fn set_current_viewport(&mut self, index: usize) -> bool {
        if index < self.viewports.len() {
            self.current = index;
            true
        } else {
            false
        }
    }

    pub fn current_viewport(&self) -> Option<&Viewport> {
        self.viewports.get(self.current)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Clear all buckets and start a new frame
    pub fn begin_frame(&mut self) {
        self.frame += 1;
        self.current = 0;
        self.unsorted.clear();
        self.sorted.clear();
        self.entries.clear();
        trace!("render frame {} begins with {} viewports", self.frame, self.viewports.len());
    }

    /// Opaque work; draw order inside the bucket is irrelevant
    pub fn add_unsorted(&mut self, command: DrawCommand<K>) {
        self.unsorted.push(command);
    }

    /// Register translucent work to be emitted later in sorted order
    pub fn add_sorted(&mut self, owner: K, layer: SortLayer, depth: f32) {
        self.add_to_special_sort(owner, layer, depth, SortFlags::NONE);
    }

    /// Register translucent work with special-sort options
    pub fn add_to_special_sort(&mut self, owner: K, layer: SortLayer, depth: f32, flags: SortFlags) {
        let seq = self.entries.len();
        self.entries.push(SortedEntry {
            owner,
            layer,
            depth,
            flags,
            seq,
        });
    }

    pub fn sort_entries(&self) -> &[SortedEntry<K>] {
        &self.entries
    }

    /// Order the registered entries
    ///
    /// Entries sort by layer, then `ALWAYS_ON_TOP` last, then by
    /// `tie_break`, then back to front, then registration order.
    /// `tie_break` is only consulted for entries on the same layer and is
    /// always called with the lower owner key first; it returns how that
    /// first owner orders against the second, or `None` to fall back to
    /// depth. Insertion sorting keeps the result well defined even if the
    /// owners' answers are not transitive.
    pub fn sorted_order<F>(&self, mut tie_break: F) -> Vec<SortedEntry<K>>
    where
        F: FnMut(&SortedEntry<K>, &SortedEntry<K>) -> Option<Ordering>,
    {
        let mut ordered: Vec<SortedEntry<K>> = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let pos = ordered
                .iter()
                .position(|placed| compare_entries(entry, placed, &mut tie_break) == Ordering::Less)
                .unwrap_or(ordered.len());
            ordered.insert(pos, *entry);
        }
        ordered
    }

    /// Sorted work emitted by an owner while its turn in the sorted order runs
    pub fn emit_sorted(&mut self, command: DrawCommand<K>) {
        self.sorted.push(command);
    }

    pub fn bucket(&self, bucket: RenderBucket) -> &[DrawCommand<K>] {
        match bucket {
            RenderBucket::Unsorted => &self.unsorted,
            RenderBucket::Sorted => &self.sorted,
        }
    }

    pub fn stats(&self) -> RenderStats {
        RenderStats {
            frame: self.frame,
            viewports: self.viewports.len(),
            unsorted: self.unsorted.len(),
            sort_entries: self.entries.len(),
            sorted: self.sorted.len(),
        }
    }

    /// Hand the frame's commands over in bucket order, leaving the buckets empty
    pub fn flush(&mut self) -> Vec<DrawCommand<K>> {
        let mut out = Vec::with_capacity(self.unsorted.len() + self.sorted.len());
        for bucket in RenderBucket::FLUSH_ORDER {
            match bucket {
                RenderBucket::Unsorted => out.append(&mut self.unsorted),
                RenderBucket::Sorted => out.append(&mut self.sorted),
            }
        }
        self.entries.clear();
        out
    }
}

fn compare_entries<K, F>(a: &SortedEntry<K>, b: &SortedEntry<K>, tie_break: &mut F) -> Ordering
where
    K: Copy + Ord,
    F: FnMut(&SortedEntry<K>, &SortedEntry<K>) -> Option<Ordering>,
{
    let on_top = |e: &SortedEntry<K>| e.flags.contains(SortFlags::ALWAYS_ON_TOP);

    a.layer
        .cmp(&b.layer)
        .then_with(|| on_top(a).cmp(&on_top(b)))
        .then_with(|| {
            if a.owner == b.owner {
                return Ordering::Equal;
            }
            if a.owner < b.owner {
                tie_break(a, b).unwrap_or(Ordering::Equal)
            } else {
                tie_break(b, a).map(Ordering::reverse).unwrap_or(Ordering::Equal)
            }
        })
        .then_with(|| {
            let keep_order = a.flags.contains(SortFlags::NO_DEPTH_SORT) || b.flags.contains(SortFlags::NO_DEPTH_SORT);
            if keep_order {
                Ordering::Equal
            } else {
                b.depth.total_cmp(&a.depth)
            }
        })
        .then_with(|| a.seq.cmp(&b.seq))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::command::{DrawKind, ModelId};

    fn manager() -> RenderManager<u32> {
        let mut rm = RenderManager::new();
        rm.add_viewport(Viewport::new(0, Camera::new(), 800, 600));
        rm.begin_frame();
        rm
    }

    fn owners(entries: &[SortedEntry<u32>]) -> Vec<u32> {
        entries.iter().map(|e| e.owner).collect()
    }

    #[test]
    fn test_layers_then_back_to_front() {
        let mut rm = manager();
        rm.add_sorted(1, SortLayer::Effects, 2.0);
        rm.add_sorted(2, SortLayer::World, 5.0);
        rm.add_sorted(3, SortLayer::World, 9.0);
        rm.add_sorted(4, SortLayer::Background, 1.0);

        let order = rm.sorted_order(|_, _| None);
        assert_eq!(owners(&order), vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_always_on_top_within_layer() {
        let mut rm = manager();
        rm.add_to_special_sort(1, SortLayer::Character, 1.0, SortFlags::ALWAYS_ON_TOP);
        rm.add_sorted(2, SortLayer::Character, 0.5);
        rm.add_sorted(3, SortLayer::Overlay, 0.0);
        let order = rm.sorted_order(|_, _| None);
        assert_eq!(owners(&order), vec![2, 1, 3]);
    }

    #[test]
    fn test_tie_break_sees_lower_key_first() {
        let mut rm = manager();
        rm.add_sorted(9, SortLayer::Imposter, 10.0);
        rm.add_sorted(3, SortLayer::Imposter, 1.0);

        let mut calls = Vec::new();
        let order = rm.sorted_order(|first, second| {
            calls.push((first.owner, second.owner));
            // The lower key always wants to draw first
            Some(Ordering::Less)
        });
        assert_eq!(owners(&order), vec![3, 9]);
        assert!(calls.iter().all(|(a, b)| a < b));
    }

    #[test]
    fn test_flush_order_and_reset() {
        let mut rm = manager();
        rm.emit_sorted(DrawCommand::new(1, DrawKind::Model(ModelId(1)), 0));
        rm.add_unsorted(DrawCommand::new(2, DrawKind::Model(ModelId(2)), 0));
        rm.add_sorted(1, SortLayer::World, 1.0);

        let stats = rm.stats();
        assert_eq!(stats.unsorted, 1);
        assert_eq!(stats.sorted, 1);
        assert_eq!(stats.sort_entries, 1);

        let flushed = rm.flush();
        assert_eq!(flushed.iter().map(|c| c.owner).collect::<Vec<_>>(), vec![2, 1]);
        assert!(rm.bucket(RenderBucket::Unsorted).is_empty());
        assert!(rm.sort_entries().is_empty());
    }

    #[test]
    fn test_viewport_selection() {
        let mut rm = manager();
        let second = rm.add_viewport(Viewport::new(7, Camera::new(), 100, 100));
        assert_eq!(second, 1);
        assert_eq!(rm.viewports()[1].index, 1);
        assert!(rm.set_current_viewport(1));
        assert!(!rm.set_current_viewport(5));
        assert_eq!(rm.current_index(), 1);
        rm.begin_frame();
        assert_eq!(rm.current_index(), 0);
        assert_eq!(rm.frame(), 2);
    }
}
