use crate::error::EngineError;
use crate::geometry::{Bounds, Point};
use crate::layers::ItemLayer;
use serde::{Deserialize, Serialize};

/// Items with a subtype attach to a host wall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemSubtype {
    Door,
    Window,
}

/// A furniture or fixture instance placed on the plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedItem {
    pub id: String,
    /// Footprint before scaling
    pub width: f64,
    pub height: f64,
    /// Center of the footprint
    pub x: f64,
    pub y: f64,
    /// Degrees, kept in `[0, 360)`
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Mirrored footprint
    #[serde(default)]
    pub inverted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<ItemSubtype>,
    /// Explicit hit-test layer, overriding the footprint classification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<ItemLayer>,
}

fn default_scale() -> f64 {
    1.0
}

/// Map any angle in degrees into `[0, 360)`
pub fn normalize_rotation(degrees: f64) -> f64 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

impl PlacedItem {
    pub fn new(id: impl Into<String>, width: f64, height: f64, center: Point) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            x: center.x,
            y: center.y,
            rotation: 0.0,
            scale: 1.0,
            inverted: false,
            room_id: None,
            subtype: None,
            layer: None,
        }
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = normalize_rotation(degrees);
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_subtype(mut self, subtype: ItemSubtype) -> Self {
        self.subtype = Some(subtype);
        self
    }

    pub fn with_layer(mut self, layer: ItemLayer) -> Self {
        self.layer = Some(layer);
        self
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Footprint after scaling, as (width, height)
    pub fn scaled_size(&self) -> (f64, f64) {
        (self.width * self.scale, self.height * self.scale)
    }

    pub fn footprint_area(&self) -> f64 {
        let (w, h) = self.scaled_size();
        w * h
    }

    /// Doors and windows sit inside their host wall
    pub fn is_wall_attached(&self) -> bool {
        self.subtype.is_some()
    }

    /// Corners of the scaled footprint after rotation about the center
    pub fn corners(&self) -> [Point; 4] {
        let (w, h) = self.scaled_size();
        let center = self.center();
        let (hw, hh) = (w / 2.0, h / 2.0);
        [
            Point::new(self.x - hw, self.y - hh),
            Point::new(self.x + hw, self.y - hh),
            Point::new(self.x + hw, self.y + hh),
            Point::new(self.x - hw, self.y + hh),
        ]
        .map(|corner| corner.rotated_about(&center, self.rotation))
    }

    /// Axis-aligned box around the rotated footprint
    pub fn bounds(&self) -> Bounds {
        let corners = self.corners();
        let mut bounds = Bounds {
            min_x: corners[0].x,
            min_y: corners[0].y,
            max_x: corners[0].x,
            max_y: corners[0].y,
        };
        for corner in &corners[1..] {
            bounds.min_x = bounds.min_x.min(corner.x);
            bounds.min_y = bounds.min_y.min(corner.y);
            bounds.max_x = bounds.max_x.max(corner.x);
            bounds.max_y = bounds.max_y.max(corner.y);
        }
        bounds
    }

    /// Point-in-footprint test in the item's own rotated frame
    pub fn contains_point(&self, point: &Point) -> bool {
        let local = point.rotated_about(&self.center(), -self.rotation);
        let (w, h) = self.scaled_size();
        (local.x - self.x).abs() <= w / 2.0 && (local.y - self.y).abs() <= h / 2.0
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let reason = if !(self.scale.is_finite() && self.scale > 0.0) {
            Some(format!("scale must be positive, got {}", self.scale))
        } else if !(self.width >= 0.0 && self.height >= 0.0) {
            Some(format!(
                "footprint must be non-negative, got {}x{}",
                self.width, self.height
            ))
        } else if !(self.x.is_finite() && self.y.is_finite() && self.rotation.is_finite()) {
            Some("placement must be finite".to_string())
        } else {
            None
        };

        match reason {
            Some(reason) => Err(EngineError::InvalidItem {
                id: self.id.clone(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

/// A structural wall segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub id: String,
    pub start: Point,
    pub end: Point,
    pub thickness: f64,
    /// Rooms this wall bounds; shared walls list both
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub room_ids: Vec<String>,
}

impl Wall {
    pub fn new(id: impl Into<String>, start: Point, end: Point, thickness: f64) -> Self {
        Self {
            id: id.into(),
            start,
            end,
            thickness,
            room_ids: Vec::new(),
        }
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    pub fn midpoint(&self) -> Point {
        self.start.midpoint(&self.end)
    }

    /// Box around the centerline grown by half the thickness
    pub fn bounds(&self) -> Bounds {
        Bounds {
            min_x: self.start.x.min(self.end.x),
            min_y: self.start.y.min(self.end.y),
            max_x: self.start.x.max(self.end.x),
            max_y: self.start.y.max(self.end.y),
        }
        .expanded(self.thickness / 2.0)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let reason = if self.start == self.end {
            Some("start and end coincide".to_string())
        } else if !(self.thickness.is_finite() && self.thickness > 0.0) {
            Some(format!("thickness must be positive, got {}", self.thickness))
        } else {
            None
        };

        match reason {
            Some(reason) => Err(EngineError::InvalidWall {
                id: self.id.clone(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

/// Anything the editor can place: a wall or an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Entity {
    Item(PlacedItem),
    Wall(Wall),
}

impl Entity {
    pub fn id(&self) -> &str {
        match self {
            Entity::Item(item) => &item.id,
            Entity::Wall(wall) => &wall.id,
        }
    }

    /// Representative point: item center or wall midpoint
    pub fn anchor(&self) -> Point {
        match self {
            Entity::Item(item) => item.center(),
            Entity::Wall(wall) => wall.midpoint(),
        }
    }

    pub fn bounds(&self) -> Bounds {
        match self {
            Entity::Item(item) => item.bounds(),
            Entity::Wall(wall) => wall.bounds(),
        }
    }

    pub fn as_item(&self) -> Option<&PlacedItem> {
        match self {
            Entity::Item(item) => Some(item),
            Entity::Wall(_) => None,
        }
    }

    pub fn as_wall(&self) -> Option<&Wall> {
        match self {
            Entity::Wall(wall) => Some(wall),
            Entity::Item(_) => None,
        }
    }
}

impl From<PlacedItem> for Entity {
    fn from(item: PlacedItem) -> Self {
        Entity::Item(item)
    }
}

impl From<Wall> for Entity {
    fn from(wall: Wall) -> Self {
        Entity::Wall(wall)
    }
}

/// Ordered, duplicate-free set of entity ids transformed as one body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    ids: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the id was already selected
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|selected| selected != id);
        self.ids.len() != before
    }

    /// Add the id if absent, otherwise drop it; returns whether it is now selected
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.remove(id) {
            false
        } else {
            self.ids.push(id.to_string());
            true
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|selected| selected == id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Selected snapshots in selection order; ids missing from `entities` are skipped
    pub fn resolve(&self, entities: &[Entity]) -> Vec<Entity> {
        self.ids
            .iter()
            .filter_map(|id| entities.iter().find(|entity| entity.id() == id))
            .cloned()
            .collect()
    }
}

impl<S: Into<String>> FromIterator<S> for Selection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut selection = Selection::new();
        for id in iter {
            selection.insert(id);
        }
        selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_normalization() {
        assert_eq!(normalize_rotation(370.0), 10.0);
        assert_eq!(normalize_rotation(-90.0), 270.0);
        assert_eq!(normalize_rotation(360.0), 0.0);
        assert!(normalize_rotation(-1e-20) < 360.0);
    }

    #[test]
    fn test_rotated_item_bounds() {
        let item = PlacedItem::new("sofa", 100.0, 40.0, Point::new(0.0, 0.0)).with_rotation(90.0);
        let bounds = item.bounds();
        assert!((bounds.width() - 40.0).abs() < 1e-9);
        assert!((bounds.height() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_scaled_item_bounds() {
        let item = PlacedItem::new("table", 10.0, 20.0, Point::new(5.0, 5.0)).with_scale(2.0);
        assert_eq!(item.bounds().to_array(), [-5.0, -15.0, 15.0, 25.0]);
        assert_eq!(item.footprint_area(), 800.0);
    }

    #[test]
    fn test_contains_point_respects_rotation() {
        let item = PlacedItem::new("bed", 100.0, 20.0, Point::new(0.0, 0.0)).with_rotation(45.0);
        // Inside the axis-aligned box but outside the rotated rectangle
        assert!(item.bounds().contains(&Point::new(30.0, -30.0)));
        assert!(!item.contains_point(&Point::new(30.0, -30.0)));
        assert!(item.contains_point(&Point::new(30.0, 30.0)));
    }

    #[test]
    fn test_wall_bounds_include_thickness() {
        let wall = Wall::new("w", Point::new(0.0, 0.0), Point::new(100.0, 0.0), 8.0);
        assert_eq!(wall.bounds().to_array(), [-4.0, -4.0, 104.0, 4.0]);
        assert_eq!(wall.midpoint(), Point::new(50.0, 0.0));
    }

    #[test]
    fn test_wall_validation() {
        let point = Point::new(3.0, 3.0);
        assert!(Wall::new("w", point, point, 8.0).validate().is_err());
        assert!(Wall::new("w", point, Point::new(4.0, 3.0), 0.0).validate().is_err());
        assert!(Wall::new("w", point, Point::new(4.0, 3.0), 8.0).validate().is_ok());
    }

    #[test]
    fn test_item_validation() {
        let item = PlacedItem::new("chair", 10.0, 10.0, Point::ORIGIN);
        assert!(item.validate().is_ok());
        assert!(matches!(
            item.clone().with_scale(0.0).validate(),
            Err(EngineError::InvalidItem { .. })
        ));
        assert!(item.with_scale(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_entity_serde_tagging() {
        let entity = Entity::from(
            PlacedItem::new("d1", 90.0, 10.0, Point::new(1.0, 2.0)).with_subtype(ItemSubtype::Door),
        );
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["type"], "item");
        assert_eq!(json["subtype"], "door");

        let wall: Entity = serde_json::from_str(
            r#"{"type":"wall","id":"w1","start":{"x":0,"y":0},"end":{"x":5,"y":0},"thickness":8}"#,
        )
        .unwrap();
        assert_eq!(wall.id(), "w1");
        assert_eq!(wall.anchor(), Point::new(2.5, 0.0));
    }

    #[test]
    fn test_selection_has_no_duplicates() {
        let mut selection = Selection::new();
        assert!(selection.insert("a"));
        assert!(selection.insert("b"));
        assert!(!selection.insert("a"));
        assert_eq!(selection.ids(), ["a".to_string(), "b".to_string()]);

        assert!(!selection.toggle("a"));
        assert!(selection.toggle("c"));
        assert_eq!(selection.ids(), ["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_selection_resolve_keeps_order() {
        let entities = vec![
            Entity::from(PlacedItem::new("a", 1.0, 1.0, Point::ORIGIN)),
            Entity::from(PlacedItem::new("b", 1.0, 1.0, Point::ORIGIN)),
        ];
        let selection: Selection = ["b", "missing", "a"].into_iter().collect();
        let resolved = selection.resolve(&entities);
        let ids: Vec<&str> = resolved.iter().map(Entity::id).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }
}
