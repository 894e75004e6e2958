use crate::config::LayerConfig;
use crate::entities::PlacedItem;
use serde::{Deserialize, Serialize};

/// Hit-test layers, lowest first. A click resolves to the highest layer hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemLayer {
    Floor,
    LargeFurniture,
    MediumFurniture,
    SmallItem,
    /// Doors and windows
    Opening,
}

/// Decides which layer an item is hit-tested on
pub trait LayerPolicy {
    fn layer_of(&self, item: &PlacedItem) -> ItemLayer;
}

/// Openings on top, then explicit overrides, then classification by scaled
/// footprint area. `Floor` is only reachable through an override.
#[derive(Debug, Clone, Default)]
pub struct FootprintLayerPolicy {
    config: LayerConfig,
}

impl FootprintLayerPolicy {
    pub fn new(config: LayerConfig) -> Self {
        Self { config }
    }
}

impl LayerPolicy for FootprintLayerPolicy {
    fn layer_of(&self, item: &PlacedItem) -> ItemLayer {
        if item.is_wall_attached() {
            return ItemLayer::Opening;
        }
        if let Some(layer) = item.layer {
            return layer;
        }

        let area = item.footprint_area();
        if area >= self.config.large_furniture_min_area {
            ItemLayer::LargeFurniture
        } else if area >= self.config.medium_furniture_min_area {
            ItemLayer::MediumFurniture
        } else {
            ItemLayer::SmallItem
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ItemSubtype;
    use crate::geometry::Point;

    #[test]
    fn test_layer_ordering() {
        assert!(ItemLayer::Floor < ItemLayer::LargeFurniture);
        assert!(ItemLayer::LargeFurniture < ItemLayer::MediumFurniture);
        assert!(ItemLayer::MediumFurniture < ItemLayer::SmallItem);
        assert!(ItemLayer::SmallItem < ItemLayer::Opening);
    }

    #[test]
    fn test_footprint_classification() {
        let policy = FootprintLayerPolicy::default();
        let bed = PlacedItem::new("bed", 200.0, 160.0, Point::ORIGIN);
        let chair = PlacedItem::new("chair", 60.0, 60.0, Point::ORIGIN);
        let lamp = PlacedItem::new("lamp", 30.0, 30.0, Point::ORIGIN);

        assert_eq!(policy.layer_of(&bed), ItemLayer::LargeFurniture);
        assert_eq!(policy.layer_of(&chair), ItemLayer::MediumFurniture);
        assert_eq!(policy.layer_of(&lamp), ItemLayer::SmallItem);
        // Scaling moves an item between classes
        assert_eq!(policy.layer_of(&lamp.with_scale(3.0)), ItemLayer::MediumFurniture);
    }

    #[test]
    fn test_override_and_openings() {
        let policy = FootprintLayerPolicy::default();
        let rug = PlacedItem::new("rug", 300.0, 200.0, Point::ORIGIN).with_layer(ItemLayer::Floor);
        let door = PlacedItem::new("door", 90.0, 10.0, Point::ORIGIN)
            .with_layer(ItemLayer::Floor)
            .with_subtype(ItemSubtype::Door);

        assert_eq!(policy.layer_of(&rug), ItemLayer::Floor);
        assert_eq!(policy.layer_of(&door), ItemLayer::Opening);
    }
}
