//! Collision and touch passes
//!
//! The collision pass snapshots every active collidable with a primitive,
//! lets the solver find contacts, applies separations and velocity
//! responses, and then tells each participant what it hit. Objects without
//! a primitive never reach the solver and are never told about collisions.

use log::trace;
use strata_math::Vec3;
use strata_physics::{CollisionInfo, CollisionInfoList, CollisionResponse, Partner, SolverBody};

use crate::id::UniqueId;
use crate::object::Object;
use crate::state_manager::StateManager;

/// Counts from one collision pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollisionReport {
    pub bodies: usize,
    pub contacts: usize,
    pub notifications: usize,
}

/// Per-body state accumulated over the pass
struct BodyOutcome {
    id: UniqueId,
    correction: Vec3,
    velocity: Vec3,
    movable: bool,
}

/// Contacts one receiver saw with one partner
struct Notification {
    receiver: UniqueId,
    partner: UniqueId,
    contacts: CollisionInfoList,
}

fn notify(notifications: &mut Vec<Notification>, receiver: UniqueId, partner: UniqueId, info: CollisionInfo) {
    match notifications
        .iter_mut()
        .find(|n| n.receiver == receiver && n.partner == partner)
    {
        Some(existing) => existing.contacts.push(info),
        None => notifications.push(Notification {
            receiver,
            partner,
            contacts: std::iter::once(info).collect(),
        }),
    }
}

pub fn run_collision_pass(mgr: &mut StateManager) -> CollisionReport {
    let mut bodies = Vec::new();
    let mut outcomes = Vec::new();
    for id in mgr.active_ids() {
        let Some(body) = mgr.object(id).and_then(Object::collidable) else {
            continue;
        };
        let Some(primitive) = body.collision_primitive() else {
            continue;
        };
        let movable = body.will_move(mgr);
        bodies.push(SolverBody {
            key: id,
            collider: primitive.world_collider(body.transform().position),
            filter: primitive.filter,
            material: primitive.material,
            movable,
            mass: body.physics().mass,
        });
        outcomes.push(BodyOutcome {
            id,
            correction: Vec3::ZERO,
            velocity: body.physics().velocity,
            movable,
        });
    }

    let pairs = mgr.solver().detect(&bodies);
    let index_of = |id: UniqueId| bodies.iter().position(|b| b.key == id);
    let mut notifications = Vec::new();

    for pair in &pairs {
        let Some(bi) = index_of(pair.body) else {
            continue;
        };
        let partner_id = match pair.partner {
            Partner::Body(other) => other,
            Partner::World(_) => UniqueId::default(),
        };
        let body_response = response_of(mgr, pair.body, partner_id);
        let partner_index = match pair.partner {
            Partner::Body(other) => index_of(other),
            Partner::World(_) => None,
        };
        let partner_side = match partner_index {
            Some(pi) => (response_of(mgr, partner_id, pair.body), bodies[pi].movable, bodies[pi].mass),
            None => (CollisionResponse::Stop, false, 0.0),
        };

        let separation = mgr.solver().resolve(
            &pair.contact,
            (body_response, bodies[bi].movable, bodies[bi].mass),
            partner_side,
        );

        if body_response.separates() && partner_side.0.separates() {
            let body = &mut outcomes[bi];
            body.correction += separation.body;
            body.velocity = body_response.apply_to_velocity(body.velocity, pair.contact.normal, &pair.material);
            if let Some(pi) = partner_index {
                let material = bodies[pi].material.combine(&bodies[bi].material);
                let partner = &mut outcomes[pi];
                partner.correction += separation.partner;
                partner.velocity = partner_side.0.apply_to_velocity(partner.velocity, -pair.contact.normal, &material);
            }
        }

        let info = CollisionInfo::from_contact(&pair.contact, pair.material);
        notify(&mut notifications, pair.body, partner_id, info);
        if let Some(pi) = partner_index {
            let material = bodies[pi].material.combine(&bodies[bi].material);
            let flipped = CollisionInfo {
                material,
                ..info.flipped()
            };
            notify(&mut notifications, partner_id, pair.body, flipped);
        }
    }

    for outcome in outcomes.iter().filter(|o| o.movable) {
        let _ = mgr.with_object(outcome.id, |object, _| {
            if let Some(body) = object.collidable_mut() {
                if outcome.correction.length_squared() > 0.0 {
                    body.translate(outcome.correction);
                }
                body.physics_mut().velocity = outcome.velocity;
            }
        });
    }

    let mut delivered = 0;
    for notification in &notifications {
        let result = mgr.with_object(notification.receiver, |object, mgr| match object.collidable_mut() {
            Some(body) if body.is_active() => {
                body.collided_with(mgr, notification.partner, &notification.contacts);
                true
            }
            _ => false,
        });
        if result == Ok(true) {
            delivered += 1;
        }
    }

    if !pairs.is_empty() {
        trace!("collision pass: {} bodies, {} contacts, {} notified", bodies.len(), pairs.len(), delivered);
    }
    CollisionReport {
        bodies: bodies.len(),
        contacts: pairs.len(),
        notifications: delivered,
    }
}

fn response_of(mgr: &StateManager, id: UniqueId, other: UniqueId) -> CollisionResponse {
    mgr.object(id)
        .and_then(Object::collidable)
        .map_or(CollisionResponse::Ignore, |body| body.collision_resolution_response(mgr, other))
}

/// Call `touch` on both sides of every touching pair; returns the pair count
pub fn run_touch_pass(mgr: &mut StateManager) -> usize {
    let ids: Vec<UniqueId> = mgr
        .active_ids()
        .into_iter()
        .filter(|id| mgr.object(*id).and_then(Object::spatial).is_some())
        .collect();

    let mut touching = Vec::new();
    for (i, &a) in ids.iter().enumerate() {
        for &b in &ids[i + 1..] {
            let (Some(first), Some(second)) = (
                mgr.object(a).and_then(Object::spatial),
                mgr.object(b).and_then(Object::spatial),
            ) else {
                continue;
            };
            if first.touches(second) {
                touching.push((a, b));
            }
        }
    }

    for &(a, b) in &touching {
        for (receiver, other) in [(a, b), (b, a)] {
            let _ = mgr.with_object(receiver, |object, mgr| {
                if let Some(actor) = object.spatial_mut() {
                    if actor.is_active() {
                        actor.touch(mgr, other);
                    }
                }
            });
        }
    }
    touching.len()
}
