//! Pointer gesture handling.
//!
//! [`InteractionMachine`] owns the only state the engine keeps between calls:
//! the active drag's last recorded point and whether it has moved. Hit-testing
//! ([`find_clicked_entity`]) is stateless and usable from any state.

use crate::config::InteractionConfig;
use crate::entities::{Entity, Selection};
use crate::error::EngineError;
use crate::geometry::{distance_to_segment, Point};
use crate::layers::{ItemLayer, LayerPolicy};
use crate::transform::move_selected_entities;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    DraggingSelection {
        start: Point,
        /// Point the last committed delta was measured to
        last: Point,
    },
}

/// Pointer sample in model coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PointerEvent {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up { x: f64, y: f64 },
}

/// What a pointer event resolved to
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionCommand {
    Nothing,
    DragStarted,
    /// The selection moved by an incremental delta; `entities` are the new snapshots
    Translate {
        dx: f64,
        dy: f64,
        entities: Vec<Entity>,
    },
    DragEnded,
    /// A click with no drag, resolved to the entity under the cursor
    Clicked(Option<String>),
}

#[derive(Debug, Clone, Default)]
pub struct InteractionMachine {
    state: InteractionState,
    moved: bool,
    config: InteractionConfig,
}

impl InteractionMachine {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            state: InteractionState::Idle,
            moved: false,
            config,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, InteractionState::DraggingSelection { .. })
    }

    /// Whether the current or last drag travelled past the dead zone
    pub fn has_moved(&self) -> bool {
        self.moved
    }

    /// Called by the owner once the moved flag has been consulted
    pub fn clear_moved(&mut self) {
        self.moved = false;
    }

    /// Drop all gesture state, e.g. on focus loss or escape
    pub fn reset_all(&mut self) {
        if self.is_dragging() {
            debug!("Aborting drag gesture");
        }
        self.state = InteractionState::Idle;
        self.moved = false;
    }

    pub fn start_drag_selection(&mut self, x: f64, y: f64) {
        let start = Point::new(x, y);
        debug!("Drag started at ({:.2}, {:.2})", x, y);
        self.state = InteractionState::DraggingSelection { start, last: start };
        self.moved = false;
    }

    /// Move `selection` by the delta since the last committed point.
    ///
    /// Returns `Ok(None)` while the motion stays inside the dead zone. `scale`
    /// is the view zoom, used to measure the dead zone in screen units.
    pub fn update_drag_selection(
        &mut self,
        x: f64,
        y: f64,
        selection: &[Entity],
        scale: f64,
    ) -> Result<Option<Vec<Entity>>, EngineError> {
        Ok(self
            .advance_drag(x, y, scale)?
            .map(|(dx, dy)| move_selected_entities(selection, dx, dy)))
    }

    fn advance_drag(
        &mut self,
        x: f64,
        y: f64,
        scale: f64,
    ) -> Result<Option<(f64, f64)>, EngineError> {
        let InteractionState::DraggingSelection { start, last } = self.state else {
            warn!("Drag update at ({:.2}, {:.2}) with no drag in progress", x, y);
            return Err(EngineError::NotDragging);
        };
        if !(scale.is_finite() && scale > 0.0) {
            warn!("Drag update with invalid view scale {}", scale);
            return Err(EngineError::InvalidViewScale(scale));
        }

        let dx = x - last.x;
        let dy = y - last.y;
        let dead_zone = self.config.drag_dead_zone;
        if (dx * scale).abs() <= dead_zone && (dy * scale).abs() <= dead_zone {
            return Ok(None);
        }

        self.moved = true;
        self.state = InteractionState::DraggingSelection {
            start,
            last: Point::new(x, y),
        };
        Ok(Some((dx, dy)))
    }

    /// Back to idle. The moved flag survives so the following click
    /// resolution can tell a drag from a click.
    pub fn end_drag_selection(&mut self) {
        if let InteractionState::DraggingSelection { start, last } = self.state {
            debug!(
                "Drag ended, travelled ({:.2}, {:.2}), moved: {}",
                last.x - start.x,
                last.y - start.y,
                self.moved
            );
        }
        self.state = InteractionState::Idle;
    }

    /// Resolve one pointer event against the current entities and selection.
    ///
    /// Pressing on a selected entity starts a drag; moves during a drag
    /// translate the selection; releasing ends the drag, or resolves a click
    /// when nothing moved.
    pub fn handle_pointer(
        &mut self,
        event: PointerEvent,
        entities: &[Entity],
        selection: &Selection,
        scale: f64,
        policy: &dyn LayerPolicy,
    ) -> Result<InteractionCommand, EngineError> {
        match event {
            PointerEvent::Down { x, y } => {
                if self.is_dragging() {
                    // A release was lost; never carry the old gesture forward
                    self.reset_all();
                }
                let grabbed = find_clicked_entity(x, y, entities, policy, &self.config)
                    .is_some_and(|entity| selection.contains(entity.id()));
                if grabbed {
                    self.start_drag_selection(x, y);
                    Ok(InteractionCommand::DragStarted)
                } else {
                    Ok(InteractionCommand::Nothing)
                }
            }
            PointerEvent::Move { x, y } => {
                if !self.is_dragging() {
                    return Ok(InteractionCommand::Nothing);
                }
                match self.advance_drag(x, y, scale)? {
                    Some((dx, dy)) => Ok(InteractionCommand::Translate {
                        dx,
                        dy,
                        entities: move_selected_entities(&selection.resolve(entities), dx, dy),
                    }),
                    None => Ok(InteractionCommand::Nothing),
                }
            }
            PointerEvent::Up { x, y } => {
                let was_dragging = self.is_dragging();
                self.end_drag_selection();

                let command = if was_dragging && self.moved {
                    InteractionCommand::DragEnded
                } else {
                    let hit = find_clicked_entity(x, y, entities, policy, &self.config);
                    InteractionCommand::Clicked(hit.map(|entity| entity.id().to_string()))
                };
                self.clear_moved();
                Ok(command)
            }
        }
    }
}

/// Entity under `(x, y)`, by layer rather than list order.
///
/// Items are tested first against their rotated footprint; the highest layer
/// hit wins and, within a layer, the later entity (drawn on top). Walls are
/// only considered when no item is hit, nearest centerline first.
pub fn find_clicked_entity<'a>(
    x: f64,
    y: f64,
    entities: &'a [Entity],
    policy: &dyn LayerPolicy,
    config: &InteractionConfig,
) -> Option<&'a Entity> {
    let point = Point::new(x, y);

    let mut best_item: Option<(ItemLayer, &Entity)> = None;
    for entity in entities {
        let Entity::Item(item) = entity else {
            continue;
        };
        if !item.contains_point(&point) {
            continue;
        }
        let layer = policy.layer_of(item);
        if best_item.map_or(true, |(best_layer, _)| layer >= best_layer) {
            best_item = Some((layer, entity));
        }
    }
    if let Some((_, entity)) = best_item {
        return Some(entity);
    }

    entities
        .iter()
        .filter_map(|entity| {
            let wall = entity.as_wall()?;
            let distance = distance_to_segment(&point, &wall.start, &wall.end);
            let reach = wall.thickness / 2.0 + config.wall_hit_tolerance;
            (distance <= reach).then_some((distance, entity))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, entity)| entity)
}
