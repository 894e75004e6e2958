// Canned floor plans run end to end through the engine
use anyhow::{Context, Result};
use floorplan_engine::{
    extract_rooms, validate_item_placement, EngineConfig, Entity, ItemSubtype, PlacedItem, Point,
    PlacementValidation, RoomConfig, RoomPolygon, Wall,
};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

const WALL_THICKNESS: f64 = 10.0;

struct Scenario {
    name: &'static str,
    walls: Vec<Wall>,
    items: Vec<PlacedItem>,
    /// Gap closed between dangling wall ends, if this layout has openings
    opening_bridge_distance: Option<f64>,
}

#[derive(Serialize)]
struct Placement {
    item: String,
    #[serde(flatten)]
    validation: PlacementValidation,
}

#[derive(Serialize)]
struct ScenarioReport<'a> {
    scenario: &'a str,
    rooms_config: &'a RoomConfig,
    walls: &'a [Wall],
    rooms: Vec<RoomPolygon>,
    placements: Vec<Placement>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(Path::new(&path))?,
        None => EngineConfig::default(),
    }
    .with_env_overrides();

    fs::create_dir_all("data").context("Failed to create data directory")?;

    let scenarios = [
        apartment_with_doors(),
        open_floor_plan(),
        closed_rooms(),
        courtyard(),
    ];
    for scenario in &scenarios {
        run_scenario(scenario, &config)?;
    }

    info!("All {} scenarios written to data/", scenarios.len());
    Ok(())
}

fn wall(id: &str, x1: f64, y1: f64, x2: f64, y2: f64) -> Wall {
    Wall::new(id, Point::new(x1, y1), Point::new(x2, y2), WALL_THICKNESS)
}

fn item(id: &str, width: f64, height: f64, x: f64, y: f64) -> PlacedItem {
    PlacedItem::new(id, width, height, Point::new(x, y))
}

/// Living room, bedroom and bathroom, each entered through a gap in a wall
fn apartment_with_doors() -> Scenario {
    Scenario {
        name: "apartment_with_doors",
        walls: vec![
            // Living room (0,0 to 300,200), door gap on the right wall between y=80 and y=120
            wall("living_south", 0.0, 0.0, 300.0, 0.0),
            wall("living_east_low", 300.0, 0.0, 300.0, 80.0),
            wall("living_east_high", 300.0, 120.0, 300.0, 200.0),
            wall("living_north", 300.0, 200.0, 0.0, 200.0),
            wall("living_west", 0.0, 200.0, 0.0, 0.0),
            // Bedroom (300,0 to 500,200) behind the living room gap
            wall("bedroom_south", 300.0, 0.0, 500.0, 0.0),
            wall("bedroom_east", 500.0, 0.0, 500.0, 200.0),
            wall("bedroom_north", 500.0, 200.0, 300.0, 200.0),
            // Bathroom (0,200 to 150,350), door gap on its right wall between y=260 and y=300
            wall("bath_west", 0.0, 200.0, 0.0, 350.0),
            wall("bath_north", 0.0, 350.0, 150.0, 350.0),
            wall("bath_east_high", 150.0, 350.0, 150.0, 300.0),
            wall("bath_east_low", 150.0, 260.0, 150.0, 200.0),
        ],
        items: vec![
            item("front_door", 40.0, 10.0, 100.0, 0.0).with_subtype(ItemSubtype::Door),
            item("bedroom_window", 80.0, 10.0, 400.0, 200.0).with_subtype(ItemSubtype::Window),
            item("sofa", 200.0, 90.0, 150.0, 100.0),
            item("coffee_table", 100.0, 60.0, 150.0, 110.0),
            item("bed", 160.0, 200.0, 400.0, 100.0).with_rotation(90.0),
        ],
        opening_bridge_distance: Some(50.0),
    }
}

/// One perimeter split by a partial wall, with a kitchen island in the open part
fn open_floor_plan() -> Scenario {
    Scenario {
        name: "open_floor_plan",
        walls: vec![
            // Main perimeter
            wall("south", 0.0, 0.0, 600.0, 0.0),
            wall("east", 600.0, 0.0, 600.0, 400.0),
            wall("north", 600.0, 400.0, 0.0, 400.0),
            wall("west", 0.0, 400.0, 0.0, 0.0),
            // Partial wall creating a semi-open kitchen (100 unit gap)
            wall("kitchen_low", 200.0, 0.0, 200.0, 150.0),
            wall("kitchen_high", 200.0, 250.0, 200.0, 400.0),
            // Island counter, not connected to any wall
            wall("island_south", 250.0, 200.0, 350.0, 200.0),
            wall("island_east", 350.0, 200.0, 350.0, 250.0),
            wall("island_north", 350.0, 250.0, 250.0, 250.0),
            wall("island_west", 250.0, 250.0, 250.0, 200.0),
        ],
        items: vec![
            item("dining_table", 180.0, 100.0, 450.0, 100.0),
            item("stool", 30.0, 30.0, 300.0, 280.0),
        ],
        opening_bridge_distance: Some(150.0),
    }
}

/// Two rooms sharing a wall, no openings
fn closed_rooms() -> Scenario {
    Scenario {
        name: "closed_rooms",
        walls: vec![
            // Room 1: 0,0 to 200,200
            wall("r1_south", 0.0, 0.0, 200.0, 0.0),
            wall("shared", 200.0, 0.0, 200.0, 200.0),
            wall("r1_north", 200.0, 200.0, 0.0, 200.0),
            wall("r1_west", 0.0, 200.0, 0.0, 0.0),
            // Room 2: 200,0 to 400,200
            wall("r2_south", 200.0, 0.0, 400.0, 0.0),
            wall("r2_east", 400.0, 0.0, 400.0, 200.0),
            wall("r2_north", 400.0, 200.0, 200.0, 200.0),
        ],
        items: vec![
            item("desk", 140.0, 70.0, 100.0, 100.0),
            item("wardrobe", 100.0, 60.0, 300.0, 100.0).with_rotation(45.0),
        ],
        opening_bridge_distance: None,
    }
}

/// A closed yard in the middle of a single room
fn courtyard() -> Scenario {
    Scenario {
        name: "courtyard",
        walls: vec![
            wall("outer_south", 0.0, 0.0, 400.0, 0.0),
            wall("outer_east", 400.0, 0.0, 400.0, 400.0),
            wall("outer_north", 400.0, 400.0, 0.0, 400.0),
            wall("outer_west", 0.0, 400.0, 0.0, 0.0),
            // Listed clockwise, opposite to the outer ring
            wall("yard_west", 150.0, 150.0, 150.0, 250.0),
            wall("yard_north", 150.0, 250.0, 250.0, 250.0),
            wall("yard_east", 250.0, 250.0, 250.0, 150.0),
            wall("yard_south", 250.0, 150.0, 150.0, 150.0),
        ],
        items: vec![item("planter", 60.0, 60.0, 75.0, 75.0)],
        opening_bridge_distance: None,
    }
}

fn run_scenario(scenario: &Scenario, config: &EngineConfig) -> Result<()> {
    info!(
        "Scenario {}: {} walls, {} items",
        scenario.name,
        scenario.walls.len(),
        scenario.items.len()
    );

    let mut rooms_config = config.rooms.clone();
    if let Some(distance) = scenario.opening_bridge_distance {
        rooms_config.opening_bridge_distance = distance;
    }

    let rooms = extract_rooms(&scenario.walls, &rooms_config);
    for room in &rooms {
        info!(
            "  room {}: area {:.1}, {} sides, {} hole(s){}",
            room.id,
            room.area,
            room.segments.len(),
            room.holes.len(),
            if room.has_openings() { ", has openings" } else { "" }
        );
    }

    let entities: Vec<Entity> = scenario
        .walls
        .iter()
        .cloned()
        .map(Entity::from)
        .chain(scenario.items.iter().cloned().map(Entity::from))
        .collect();

    let placements: Vec<Placement> = scenario
        .items
        .iter()
        .map(|candidate| {
            let validation = validate_item_placement(candidate, &entities, &[], &config.collision);
            match &validation.reason {
                Some(reason) => info!("  {} rejected: {}", candidate.id, reason),
                None => info!("  {} placed", candidate.id),
            }
            Placement {
                item: candidate.id.clone(),
                validation,
            }
        })
        .collect();

    let report = ScenarioReport {
        scenario: scenario.name,
        rooms_config: &rooms_config,
        walls: &scenario.walls,
        rooms,
        placements,
    };

    let filename = format!("data/{}_rooms.json", scenario.name);
    fs::write(&filename, serde_json::to_string_pretty(&report)?)
        .with_context(|| format!("Failed to write {}", filename))?;
    info!("  saved {}", filename);

    Ok(())
}
