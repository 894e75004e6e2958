//! Geometric core of the floor-plan editor.
//!
//! The engine answers four questions for the surrounding application:
//! whether a placement is legal ([`collision`]), how a mixed selection moves
//! as one body ([`transform`]), what a stream of pointer events means
//! ([`interaction`]), and which rooms a set of walls encloses
//! ([`room_detector`]). Every function works on borrowed entity snapshots and
//! returns new values; nothing is retained between calls except the gesture
//! state held by [`interaction::InteractionMachine`].

pub mod collision;
pub mod config;
pub mod entities;
pub mod error;
pub mod geometry;
pub mod graph_builder;
pub mod interaction;
pub mod layers;
pub mod room_detector;
pub mod transform;

pub use collision::{
    check_item_collision, check_multiple_item_collisions, check_wall_collision,
    validate_item_placement, validate_multiple_item_placement, PlacementValidation,
};
pub use config::{CollisionConfig, EngineConfig, InteractionConfig, LayerConfig, RoomConfig};
pub use entities::{Entity, ItemSubtype, PlacedItem, Selection, Wall};
pub use error::EngineError;
pub use geometry::{Bounds, Point};
pub use interaction::{
    find_clicked_entity, InteractionCommand, InteractionMachine, InteractionState, PointerEvent,
};
pub use layers::{FootprintLayerPolicy, ItemLayer, LayerPolicy};
pub use room_detector::{extract_rooms, BoundarySegment, RoomPolygon};
pub use transform::{
    flip_selected_entities, get_selection_center, move_selected_entities,
    rotate_selected_entities, scale_selected_entities, FlipAxis,
};
