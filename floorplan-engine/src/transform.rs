//! Group transforms over a mixed selection of walls and items.
//!
//! Every pivot-relative transform recomputes the selection center from the
//! snapshot it is given, so repeated incremental calls never accumulate pivot
//! drift. Inputs are never mutated; each call returns new snapshots.

use crate::entities::{normalize_rotation, Entity};
use crate::error::EngineError;
use crate::geometry::Point;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlipAxis {
    /// Mirror x offsets from the center
    Horizontal,
    /// Mirror y offsets from the center
    Vertical,
}

/// Mean of each entity's anchor; the origin for an empty selection
pub fn get_selection_center(entities: &[Entity]) -> Point {
    if entities.is_empty() {
        return Point::ORIGIN;
    }

    let (sum_x, sum_y) = entities.iter().fold((0.0, 0.0), |(sx, sy), entity| {
        let anchor = entity.anchor();
        (sx + anchor.x, sy + anchor.y)
    });
    let count = entities.len() as f64;
    Point::new(sum_x / count, sum_y / count)
}

/// Apply `f` to every coordinate an entity owns: wall endpoints or item center
fn map_positions(entity: &Entity, f: impl Fn(&Point) -> Point) -> Entity {
    match entity {
        Entity::Wall(wall) => {
            let mut wall = wall.clone();
            wall.start = f(&wall.start);
            wall.end = f(&wall.end);
            Entity::Wall(wall)
        }
        Entity::Item(item) => {
            let mut item = item.clone();
            let center = f(&item.center());
            item.x = center.x;
            item.y = center.y;
            Entity::Item(item)
        }
    }
}

fn require_selection(entities: &[Entity]) -> Result<Point, EngineError> {
    if entities.is_empty() {
        return Err(EngineError::EmptySelection);
    }
    Ok(get_selection_center(entities))
}

/// Translate everything by the same delta. Collision checks are the caller's job.
pub fn move_selected_entities(entities: &[Entity], dx: f64, dy: f64) -> Vec<Entity> {
    entities
        .iter()
        .map(|entity| map_positions(entity, |p| p.translated(dx, dy)))
        .collect()
}

/// Rotate around the selection center; items also turn in place
pub fn rotate_selected_entities(
    entities: &[Entity],
    delta_degrees: f64,
) -> Result<Vec<Entity>, EngineError> {
    let pivot = require_selection(entities)?;
    debug!(
        "Rotating {} entities by {:.2} degrees around ({:.2}, {:.2})",
        entities.len(),
        delta_degrees,
        pivot.x,
        pivot.y
    );

    Ok(entities
        .iter()
        .map(|entity| {
            let mut rotated = map_positions(entity, |p| p.rotated_about(&pivot, delta_degrees));
            if let Entity::Item(item) = &mut rotated {
                item.rotation = normalize_rotation(item.rotation + delta_degrees);
            }
            rotated
        })
        .collect())
}

/// Scale positions away from the selection center. Items scale their footprint,
/// walls their thickness. Range clamping is left to the caller.
pub fn scale_selected_entities(
    entities: &[Entity],
    factor: f64,
) -> Result<Vec<Entity>, EngineError> {
    if !(factor.is_finite() && factor > 0.0) {
        return Err(EngineError::InvalidScaleFactor(factor));
    }
    let pivot = require_selection(entities)?;

    Ok(entities
        .iter()
        .map(|entity| {
            let mut scaled = map_positions(entity, |p| p.scaled_about(&pivot, factor));
            match &mut scaled {
                Entity::Item(item) => item.scale *= factor,
                Entity::Wall(wall) => wall.thickness *= factor,
            }
            scaled
        })
        .collect())
}

/// Mirror positions across the selection center; items toggle `inverted`
pub fn flip_selected_entities(
    entities: &[Entity],
    axis: FlipAxis,
) -> Result<Vec<Entity>, EngineError> {
    let pivot = require_selection(entities)?;

    let mirror = |p: &Point| match axis {
        FlipAxis::Horizontal => Point::new(2.0 * pivot.x - p.x, p.y),
        FlipAxis::Vertical => Point::new(p.x, 2.0 * pivot.y - p.y),
    };

    Ok(entities
        .iter()
        .map(|entity| {
            let mut flipped = map_positions(entity, &mirror);
            if let Entity::Item(item) = &mut flipped {
                item.inverted = !item.inverted;
            }
            flipped
        })
        .collect())
}
