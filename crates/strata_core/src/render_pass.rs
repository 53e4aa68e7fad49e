//! Collect one frame of draw work from every visible render actor
//!
//! Order within a frame:
//!
//! 1. `pre_render_in_viewport` for each viewport an actor is visible in
//! 2. `pre_render_for_whole_scene` for every actor seen at least once
//! 3. `render_unsorted_and_add_sorted`, recorded in the primary viewport
//! 4. sorting of the registered entries
//! 5. particles first, `render_sorted`, particles last, per entry in order
//!
//! The caller flushes the render manager afterwards.

use std::cmp::Ordering;

use log::trace;
use strata_render::{RenderManager, RenderStats, SortedEntry};

use crate::id::UniqueId;
use crate::object::Object;
use crate::state_manager::StateManager;

pub fn run_render_pass(mgr: &mut StateManager, rm: &mut RenderManager<UniqueId>) -> RenderStats {
    rm.begin_frame();

    let renderables: Vec<UniqueId> = mgr
        .active_ids()
        .into_iter()
        .filter(|id| mgr.object(*id).and_then(Object::renderable).is_some())
        .collect();

    let mut seen = Vec::new();
    for index in 0..rm.viewports().len() {
        rm.set_current_viewport(index);
        let Some(frustum) = rm.current_viewport().map(|viewport| viewport.frustum()) else {
            continue;
        };
        for &id in &renderables {
            let _ = mgr.with_object(id, |object, _| {
                let Some(actor) = object.renderable_mut() else {
                    return;
                };
                let visible = actor
                    .touch_bounds()
                    .is_some_and(|bounds| frustum.classify_aabb(&bounds).is_visible());
                if visible {
                    actor.pre_render_in_viewport(rm);
                    if !seen.contains(&id) {
                        seen.push(id);
                    }
                }
            });
        }
    }

    for &id in &seen {
        let _ = mgr.with_object(id, |object, _| {
            if let Some(actor) = object.renderable_mut() {
                actor.pre_render_for_whole_scene(rm);
            }
        });
    }

    rm.set_current_viewport(0);
    for &id in &seen {
        let _ = mgr.with_object(id, |object, mgr| {
            if let Some(actor) = object.renderable_mut() {
                actor.render_unsorted_and_add_sorted(mgr, rm);
            }
        });
    }

    let order = rm.sorted_order(|a, b| sort_tie_break(mgr, a, b));
    for entry in &order {
        let _ = mgr.with_object(entry.owner, |object, mgr| {
            if let Some(actor) = object.renderable_mut() {
                actor.render_particles_sorted_with_actor_first(rm);
                actor.render_sorted(mgr, rm);
                actor.render_particles_sorted_with_actor_last(rm);
            }
        });
    }

    let stats = rm.stats();
    trace!(
        "render frame {}: {} seen, {} unsorted, {} sorted",
        stats.frame,
        seen.len(),
        stats.unsorted,
        stats.sorted
    );
    stats
}

/// Ask the lower id first; if it declines, ask the other side
///
/// `a` is always the entry with the lower owner id, so every pair gets the
/// same answer however the sort meets it.
pub fn sort_tie_break(mgr: &StateManager, a: &SortedEntry<UniqueId>, b: &SortedEntry<UniqueId>) -> Option<Ordering> {
    let first = mgr.object(a.owner).and_then(Object::renderable)?;
    let second = mgr.object(b.owner).and_then(Object::renderable)?;
    if first.can_render_sort_with(mgr, second, a.layer, b.layer) {
        Some(Ordering::Less)
    } else if second.can_render_sort_with(mgr, first, b.layer, a.layer) {
        Some(Ordering::Greater)
    } else {
        None
    }
}
