//! Placement legality checks.
//!
//! Everything here is advisory: functions return a boolean or a
//! [`PlacementValidation`] and leave rejection to the caller.

use crate::config::CollisionConfig;
use crate::entities::{Entity, PlacedItem, Wall};
use crate::geometry::{distance_to_segment, segments_cross};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Outcome of a placement validation; `reason` is set only when invalid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementValidation {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl PlacementValidation {
    pub fn ok() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }
}

fn is_candidate_peer(other: &Entity, candidate_id: &str, exclude_ids: &[&str]) -> bool {
    let id = other.id();
    id != candidate_id && !exclude_ids.contains(&id)
}

/// Inset-bound overlap between two items
fn items_overlap(a: &PlacedItem, b: &PlacedItem, config: &CollisionConfig) -> bool {
    a.bounds()
        .inset(config.tolerance)
        .overlaps(&b.bounds().inset(config.tolerance))
}

/// First entity the candidate item collides with
fn find_item_collision<'a>(
    candidate: &PlacedItem,
    existing: &'a [Entity],
    exclude_ids: &[&str],
    config: &CollisionConfig,
) -> Option<&'a Entity> {
    let candidate_bounds = candidate.bounds().inset(config.tolerance);

    existing
        .iter()
        .filter(|other| is_candidate_peer(other, &candidate.id, exclude_ids))
        .find(|other| match other {
            // Doors and windows are meant to sit inside walls
            Entity::Wall(_) if candidate.is_wall_attached() => false,
            Entity::Wall(wall) => wall
                .bounds()
                .inset(config.tolerance)
                .overlaps(&candidate_bounds),
            Entity::Item(item) => item
                .bounds()
                .inset(config.tolerance)
                .overlaps(&candidate_bounds),
        })
}

/// Does `candidate` overlap any entity of `existing` not listed in `exclude_ids`?
///
/// Walls are compared by their axis-aligned box, grown by half the thickness.
/// A diagonal wall cuts its box corner to corner, so furniture in the far
/// corners of that box is reported as colliding even when well clear of the wall.
pub fn check_item_collision(
    candidate: &PlacedItem,
    existing: &[Entity],
    exclude_ids: &[&str],
    config: &CollisionConfig,
) -> bool {
    match find_item_collision(candidate, existing, exclude_ids, config) {
        Some(other) => {
            debug!("Item {} collides with {}", candidate.id, other.id());
            true
        }
        None => false,
    }
}

/// First colliding pair in a batch, checked against `existing` and within the batch
fn find_batch_collision(
    items: &[PlacedItem],
    existing: &[Entity],
    config: &CollisionConfig,
) -> Option<(String, String)> {
    let batch_ids: Vec<&str> = items.iter().map(|item| item.id.as_str()).collect();

    for item in items {
        if let Some(other) = find_item_collision(item, existing, &batch_ids, config) {
            return Some((item.id.clone(), other.id().to_string()));
        }
    }

    // Batches are selection-sized, so the quadratic pass is fine
    for (i, a) in items.iter().enumerate() {
        for b in &items[i + 1..] {
            if items_overlap(a, b, config) {
                return Some((a.id.clone(), b.id.clone()));
            }
        }
    }

    None
}

/// Check a batch of items (e.g. a moved selection) as one placement
pub fn check_multiple_item_collisions(
    items: &[PlacedItem],
    existing: &[Entity],
    config: &CollisionConfig,
) -> bool {
    match find_batch_collision(items, existing, config) {
        Some((a, b)) => {
            debug!("Batch item {} collides with {}", a, b);
            true
        }
        None => false,
    }
}

fn wall_hits_entity(wall: &Wall, other: &Entity, config: &CollisionConfig) -> bool {
    match other {
        // Walls may meet at corners and T-junctions but never cross
        Entity::Wall(existing) => {
            segments_cross(&wall.start, &wall.end, &existing.start, &existing.end)
        }
        Entity::Item(item) if item.is_wall_attached() => false,
        Entity::Item(item) => {
            let core = wall.thickness / 2.0 - config.tolerance;
            item.corners()
                .iter()
                .any(|corner| distance_to_segment(corner, &wall.start, &wall.end) < core)
        }
    }
}

/// Does `wall` cross another wall or cut into an item's footprint?
pub fn check_wall_collision(
    wall: &Wall,
    existing: &[Entity],
    exclude_ids: &[&str],
    config: &CollisionConfig,
) -> bool {
    let hit = existing
        .iter()
        .filter(|other| is_candidate_peer(other, &wall.id, exclude_ids))
        .find(|other| wall_hits_entity(wall, other, config));

    match hit {
        Some(other) => {
            debug!("Wall {} collides with {}", wall.id, other.id());
            true
        }
        None => false,
    }
}

pub fn validate_item_placement(
    candidate: &PlacedItem,
    existing: &[Entity],
    exclude_ids: &[&str],
    config: &CollisionConfig,
) -> PlacementValidation {
    match find_item_collision(candidate, existing, exclude_ids, config) {
        Some(other) => PlacementValidation::rejected(format!(
            "Item {} overlaps {}",
            candidate.id,
            other.id()
        )),
        None => PlacementValidation::ok(),
    }
}

pub fn validate_multiple_item_placement(
    items: &[PlacedItem],
    existing: &[Entity],
    config: &CollisionConfig,
) -> PlacementValidation {
    match find_batch_collision(items, existing, config) {
        Some((a, b)) => PlacementValidation::rejected(format!("Item {} overlaps {}", a, b)),
        None => PlacementValidation::ok(),
    }
}
