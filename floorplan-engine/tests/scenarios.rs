use floorplan_engine::{
    check_item_collision, check_wall_collision, extract_rooms, find_clicked_entity,
    flip_selected_entities, rotate_selected_entities, scale_selected_entities,
    validate_multiple_item_placement, EngineConfig, Entity, FlipAxis, FootprintLayerPolicy,
    InteractionCommand, InteractionMachine, ItemLayer, ItemSubtype, PlacedItem, Point,
    PointerEvent, Selection, Wall,
};

const EPS: f64 = 1e-9;

fn square_walls(size: f64, thickness: f64) -> Vec<Wall> {
    vec![
        Wall::new("south", Point::new(0.0, 0.0), Point::new(size, 0.0), thickness),
        Wall::new("east", Point::new(size, 0.0), Point::new(size, size), thickness),
        Wall::new("north", Point::new(size, size), Point::new(0.0, size), thickness),
        Wall::new("west", Point::new(0.0, size), Point::new(0.0, 0.0), thickness),
    ]
}

fn entities_of(walls: &[Wall], items: &[PlacedItem]) -> Vec<Entity> {
    walls
        .iter()
        .cloned()
        .map(Entity::from)
        .chain(items.iter().cloned().map(Entity::from))
        .collect()
}

#[test]
fn test_square_room_with_door_end_to_end() {
    let config = EngineConfig::default();
    let walls = square_walls(10.0, 8.0);
    let door =
        PlacedItem::new("door", 4.0, 2.0, Point::new(5.0, 0.0)).with_subtype(ItemSubtype::Door);
    let entities = entities_of(&walls, &[door.clone()]);

    let rooms = extract_rooms(&walls, &config.rooms);
    assert_eq!(rooms.len(), 1);
    assert!((rooms[0].area - 100.0).abs() < 1e-6);
    let centroid = rooms[0].centroid.expect("square has a centroid");
    assert!(centroid.approx_eq(&Point::new(5.0, 5.0), 1e-9));

    // The door sits inside the south wall without colliding either way
    assert!(!check_item_collision(&door, &entities, &[], &config.collision));
    assert!(!check_wall_collision(&walls[0], &entities, &[], &config.collision));
}

#[test]
fn test_window_is_exempt_from_walls_but_not_furniture() {
    let config = EngineConfig::default();
    let walls = square_walls(400.0, 10.0);
    let window = PlacedItem::new("window", 120.0, 20.0, Point::new(200.0, 0.0))
        .with_subtype(ItemSubtype::Window);
    let dresser = PlacedItem::new("dresser", 120.0, 80.0, Point::new(200.0, 10.0));
    let entities = entities_of(&walls, &[dresser]);

    assert!(!check_item_collision(
        &window,
        &entities,
        &["dresser"],
        &config.collision
    ));
    assert!(check_item_collision(&window, &entities, &[], &config.collision));
}

#[test]
fn test_item_collision_is_symmetric() {
    let config = EngineConfig::default();
    let sofa = PlacedItem::new("sofa", 200.0, 90.0, Point::new(150.0, 150.0));
    let table = PlacedItem::new("table", 120.0, 80.0, Point::new(330.0, 150.0));
    let crowding = PlacedItem::new("crowding", 120.0, 80.0, Point::new(250.0, 150.0));

    // Apart
    assert!(!check_item_collision(
        &sofa,
        &[Entity::from(table.clone())],
        &[],
        &config.collision
    ));
    assert!(!check_item_collision(
        &table,
        &[Entity::from(sofa.clone())],
        &[],
        &config.collision
    ));

    // Overlapping
    assert!(check_item_collision(
        &sofa,
        &[Entity::from(crowding.clone())],
        &[],
        &config.collision
    ));
    assert!(check_item_collision(
        &crowding,
        &[Entity::from(sofa)],
        &[],
        &config.collision
    ));
}

#[test]
fn test_moved_batch_validation_reports_the_pair() {
    let config = EngineConfig::default();
    let bed = PlacedItem::new("bed", 200.0, 160.0, Point::new(200.0, 200.0));
    let nightstand = PlacedItem::new("nightstand", 50.0, 50.0, Point::new(200.0, 200.0));

    let result = validate_multiple_item_placement(&[bed, nightstand], &[], &config.collision);

    assert!(!result.valid);
    assert_eq!(result.reason.as_deref(), Some("Item bed overlaps nightstand"));
}

#[test]
fn test_click_prefers_furniture_over_floor_and_falls_back_to_walls() {
    let config = EngineConfig::default();
    let policy = FootprintLayerPolicy::new(config.layers.clone());
    let walls = square_walls(500.0, 10.0);
    let rug =
        PlacedItem::new("rug", 300.0, 200.0, Point::new(250.0, 250.0)).with_layer(ItemLayer::Floor);
    let bed = PlacedItem::new("bed", 200.0, 160.0, Point::new(250.0, 250.0));
    let entities = entities_of(&walls, &[bed, rug]);

    let hit = find_clicked_entity(250.0, 250.0, &entities, &policy, &config.interaction);
    assert_eq!(hit.map(Entity::id), Some("bed"));

    let hit = find_clicked_entity(120.0, 250.0, &entities, &policy, &config.interaction);
    assert_eq!(hit.map(Entity::id), Some("rug"));

    let hit = find_clicked_entity(250.0, 3.0, &entities, &policy, &config.interaction);
    assert_eq!(hit.map(Entity::id), Some("south"));

    let hit = find_clicked_entity(40.0, 40.0, &entities, &policy, &config.interaction);
    assert!(hit.is_none());
}

#[test]
fn test_transform_laws_on_mixed_selection() {
    let walls = square_walls(300.0, 12.0);
    let items = [
        PlacedItem::new("desk", 140.0, 70.0, Point::new(90.0, 60.0)).with_rotation(15.0),
        PlacedItem::new("chair", 50.0, 50.0, Point::new(90.0, 120.0)).with_scale(0.8),
    ];
    let selection = entities_of(&walls[..2], &items);

    let rotated = rotate_selected_entities(&selection, 73.0).unwrap();
    let restored = rotate_selected_entities(&rotated, -73.0).unwrap();
    let scaled = scale_selected_entities(&selection, 3.0).unwrap();
    let unscaled = scale_selected_entities(&scaled, 1.0 / 3.0).unwrap();
    let flipped = flip_selected_entities(&selection, FlipAxis::Vertical).unwrap();
    let unflipped = flip_selected_entities(&flipped, FlipAxis::Vertical).unwrap();

    for result in [&restored, &unscaled, &unflipped] {
        for (before, after) in selection.iter().zip(result.iter()) {
            assert_eq!(before.id(), after.id());
            assert!(before.anchor().approx_eq(&after.anchor(), EPS));
            assert!((before.bounds().width() - after.bounds().width()).abs() < 1e-6);
        }
    }
}

#[test]
fn test_pointer_gesture_moves_selection_then_rooms_follow() {
    let config = EngineConfig::default();
    let policy = FootprintLayerPolicy::new(config.layers.clone());
    let walls = square_walls(200.0, 10.0);
    let entities = entities_of(&walls, &[]);
    let selection: Selection = walls.iter().map(|wall| wall.id.clone()).collect();
    let mut machine = InteractionMachine::new(config.interaction.clone());

    let started = machine
        .handle_pointer(
            PointerEvent::Down { x: 100.0, y: 1.0 },
            &entities,
            &selection,
            1.0,
            &policy,
        )
        .unwrap();
    assert_eq!(started, InteractionCommand::DragStarted);

    let command = machine
        .handle_pointer(
            PointerEvent::Move { x: 150.0, y: 31.0 },
            &entities,
            &selection,
            1.0,
            &policy,
        )
        .unwrap();
    let InteractionCommand::Translate { dx, dy, entities: moved } = command else {
        panic!("expected a translation");
    };
    assert_eq!((dx, dy), (50.0, 30.0));

    let ended = machine
        .handle_pointer(PointerEvent::Up { x: 150.0, y: 31.0 }, &entities, &selection, 1.0, &policy)
        .unwrap();
    assert_eq!(ended, InteractionCommand::DragEnded);
    assert!(!machine.is_dragging());

    let moved_walls: Vec<Wall> = moved.iter().filter_map(Entity::as_wall).cloned().collect();
    let rooms = extract_rooms(&moved_walls, &config.rooms);
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].bounding_box, [50.0, 30.0, 250.0, 230.0]);
}

#[test]
fn test_config_file_drives_room_bridging() {
    let config =
        EngineConfig::from_json_str(r#"{"rooms": {"opening_bridge_distance": 50.0}}"#).unwrap();
    let walls = vec![
        Wall::new("south", Point::new(0.0, 0.0), Point::new(300.0, 0.0), 10.0),
        Wall::new("east_low", Point::new(300.0, 0.0), Point::new(300.0, 80.0), 10.0),
        Wall::new("east_high", Point::new(300.0, 120.0), Point::new(300.0, 200.0), 10.0),
        Wall::new("north", Point::new(300.0, 200.0), Point::new(0.0, 200.0), 10.0),
        Wall::new("west", Point::new(0.0, 200.0), Point::new(0.0, 0.0), 10.0),
    ];

    assert!(extract_rooms(&walls, &EngineConfig::default().rooms).is_empty());

    let rooms = extract_rooms(&walls, &config.rooms);
    assert_eq!(rooms.len(), 1);
    assert!(rooms[0].has_openings());
    assert!((rooms[0].area - 60000.0).abs() < 1e-6);
}
