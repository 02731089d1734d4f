use delvemap_core::{
    CancelReason, CardKind, ConnectionKind, Delve, Domain, DragError, DragPayload, DragState,
    HexGeometry, HexPosition, Landmark,
    MapConfig, MapContext, MapError, MapSnapshot, Monster, PixelPoint, PlacedCard,
    PlacementError, StoreError, StressDie,
};

fn context() -> MapContext {
    MapContext::new("Ironlands", MapConfig::default()).unwrap()
}

fn landmark(name: &str) -> Landmark {
    Landmark::new(name, [Domain::Haven, Domain::Wild], StressDie::D8)
}

fn delve(name: &str) -> Delve {
    Delve::new(name, 12, [Domain::Cursed])
}

#[test]
fn deleting_a_placed_entity_cascades_placement_and_connections() {
    let mut map = context();
    let a = map.create_landmark(landmark("Watchtower")).unwrap();
    let b = map.create_delve(delve("Barrow")).unwrap();
    map.place_card(a, HexPosition::new(0, 0)).unwrap();
    map.place_card(b, HexPosition::new(1, 0)).unwrap();
    map.connect(a, b, ConnectionKind::LandmarkToDelve).unwrap();

    let deleted = map.delete_landmark(a).unwrap();
    assert_eq!(deleted.id, a);
    assert!(map.entities().landmark(a).is_none());
    assert_eq!(map.occupant_at(HexPosition::new(0, 0)), None);
    assert!(map.graph().connections().is_empty());
    assert_eq!(map.graph().check_invariants(), Ok(()));

    assert!(matches!(
        map.delete_landmark(a),
        Err(MapError::Store(StoreError::NotFound(id))) if id == a
    ));
}

#[test]
fn deleting_an_unplaced_delve_only_removes_the_body() {
    let mut map = context();
    let id = map.create_delve(delve("Hollow")).unwrap();
    map.delete_delve(id).unwrap();
    assert!(map.entities().delve(id).is_none());
    assert!(map.graph().is_empty());
}

#[test]
fn library_copies_get_distinct_ids_and_identical_content() {
    let mut map = context();
    let mut template = landmark("Shrine of Ash");
    template.haunts.push("Whispering smoke".to_string());
    let template_id = map.add_landmark_template(template.clone()).unwrap();

    let first = map.copy_landmark_from_library(template_id).unwrap();
    let second = map.copy_landmark_from_library(template_id).unwrap();

    assert_ne!(first.id, second.id);
    assert_ne!(first.id, template_id);
    assert_ne!(second.id, template_id);
    for copy in [&first, &second] {
        let stored = map.entities().landmark(copy.id).unwrap();
        assert_eq!(stored.name, template.name);
        assert_eq!(stored.domains, template.domains);
        assert_eq!(stored.default_stress, template.default_stress);
        assert_eq!(stored.haunts, template.haunts);
    }
    assert!(!map.graph().is_placed(first.id));
    assert_eq!(map.library().landmarks.len(), 1);
}

#[test]
fn delve_copy_refreshes_nested_monster_ids() {
    let mut map = context();
    let mut template = delve("Drowned Vault");
    template.monsters.push(Monster::new("Eel Horror", 8, 4));
    let template_monster_id = template.monsters[0].id;
    let template_id = map.add_delve_template(template).unwrap();

    let copy = map.copy_delve_from_library(template_id).unwrap();
    assert_eq!(copy.monsters.len(), 1);
    assert_ne!(copy.monsters[0].id, template_monster_id);
    assert_eq!(copy.monsters[0].name, "Eel Horror");
}

#[test]
fn invalid_entities_are_rejected_with_messages() {
    let mut map = context();
    let err = map
        .create_landmark(Landmark::new("  ", Vec::<Domain>::new(), StressDie::D4))
        .unwrap_err();
    match err {
        MapError::Validation(messages) => {
            assert_eq!(
                messages,
                vec![
                    "name is required".to_string(),
                    "at least one domain is required".to_string()
                ]
            );
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(map.entities().landmarks().is_empty());

    let err = map.create_delve(Delve::new("Pit", 99, [Domain::Warren])).unwrap_err();
    assert!(matches!(err, MapError::Validation(_)));
}

#[test]
fn monsters_live_inside_their_delve() {
    let mut map = context();
    let delve_id = map.create_delve(delve("Warrens")).unwrap();
    let monster_id = map
        .add_monster(delve_id, Monster::new("Rat King", 10, 3))
        .unwrap();
    assert!(map.entities().delve(delve_id).unwrap().monster(monster_id).is_some());

    let mut updated = Monster::new("Rat Queen", 12, 4);
    updated.id = monster_id;
    map.update_monster(delve_id, updated).unwrap();
    assert_eq!(
        map.entities()
            .delve(delve_id)
            .unwrap()
            .monster(monster_id)
            .unwrap()
            .name,
        "Rat Queen"
    );

    assert!(matches!(
        map.add_monster(delve_id, Monster::new("Ghost", 0, 3)),
        Err(MapError::Validation(_))
    ));

    let removed = map.remove_monster(delve_id, monster_id).unwrap();
    assert_eq!(removed.id, monster_id);
    assert!(matches!(
        map.remove_monster(delve_id, monster_id),
        Err(MapError::Store(StoreError::MonsterNotFound { .. }))
    ));
}

#[test]
fn monster_template_copies_into_a_delve() {
    let mut map = context();
    let delve_id = map.create_delve(delve("Mine")).unwrap();
    let template_id = map
        .add_monster_template(Monster::new("Gloom Crawler", 6, 2))
        .unwrap();
    let copy = map.copy_monster_from_library(template_id, delve_id).unwrap();
    assert_ne!(copy.id, template_id);
    assert!(map.entities().delve(delve_id).unwrap().monster(copy.id).is_some());
}

#[test]
fn progress_is_clamped_to_resistance() {
    let mut map = context();
    let id = map.create_delve(delve("Tower")).unwrap();
    assert_eq!(map.mark_delve_progress(id, 5).unwrap(), 5);
    assert_eq!(map.mark_delve_progress(id, 40).unwrap(), 12);
    assert_eq!(map.mark_delve_progress(id, -100).unwrap(), 0);
}

#[test]
fn place_card_near_falls_back_to_closest_free_cell() {
    let mut map = context();
    let a = map.create_landmark(landmark("Gate")).unwrap();
    let b = map.create_landmark(landmark("Bridge")).unwrap();
    map.place_card(a, HexPosition::ORIGIN).unwrap();

    let placed = map.place_card_near(b, HexPosition::ORIGIN, 2).unwrap();
    assert_eq!(HexGeometry::distance(HexPosition::ORIGIN, placed.position), 1);
    assert!(matches!(
        map.place_card_near(b, HexPosition::ORIGIN, 2),
        Err(MapError::Placement(PlacementError::AlreadyPlaced(id))) if id == b
    ));

    let c = map.create_delve(delve("Cellar")).unwrap();
    assert!(matches!(
        map.place_card_near(c, HexPosition::ORIGIN, 0),
        Err(MapError::Placement(PlacementError::CellOccupied { occupant, .. })) if occupant == a
    ));
}

#[test]
fn placement_errors_are_forwarded_unchanged() {
    let mut map = context();
    let a = map.create_landmark(landmark("Ford")).unwrap();
    map.place_card(a, HexPosition::ORIGIN).unwrap();

    assert!(matches!(
        map.connect(a, a, ConnectionKind::LandmarkToLandmark),
        Err(MapError::Placement(PlacementError::SelfConnection(id))) if id == a
    ));
    let ghost = uuid::Uuid::new_v4();
    assert!(matches!(
        map.place_card(ghost, HexPosition::new(1, 1)),
        Err(MapError::Placement(PlacementError::EntityNotFound(id))) if id == ghost
    ));
}

#[test]
fn drag_from_palette_through_context() {
    let mut map = context();
    let id = map.create_delve(delve("Sinkhole")).unwrap();
    let payload = DragPayload::new(CardKind::Delve, id, PixelPoint::default());

    map.begin_drag(payload, true).unwrap();
    let target_cell = HexPosition::new(-1, 2);
    let pointer = map.cell_center(target_cell);
    let target = map.update_drag(pointer).unwrap().unwrap();
    assert_eq!(target.cell, target_cell);

    let placed = map.end_drag(pointer).unwrap();
    assert_eq!(placed.position, target_cell);
    assert_eq!(map.drag_state(), &DragState::Committed(placed));
    assert_eq!(map.cell_at_pixel(pointer), target_cell);
}

#[test]
fn snapshot_round_trips_through_from_snapshot() {
    let mut map = context();
    let a = map.create_landmark(landmark("Beacon")).unwrap();
    let b = map.create_delve(delve("Ossuary")).unwrap();
    map.add_monster(b, Monster::new("Bone Hound", 5, 2)).unwrap();
    map.place_card(a, HexPosition::new(0, 0)).unwrap();
    map.place_card(b, HexPosition::new(0, 1)).unwrap();
    map.connect(b, a, ConnectionKind::LandmarkToDelve).unwrap();
    map.add_landmark_template(landmark("Template")).unwrap();

    let snapshot = map.snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    let decoded: MapSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, snapshot);

    let (restored, report) = MapContext::from_snapshot(decoded, MapConfig::default()).unwrap();
    assert!(report.is_clean());
    assert_eq!(restored.map_id(), map.map_id());
    assert_eq!(restored.name(), "Ironlands");
    assert_eq!(restored.graph(), map.graph());
    assert_eq!(restored.entities(), map.entities());
    assert_eq!(restored.library(), map.library());
    assert_eq!(restored.snapshot(), snapshot);
}

#[test]
fn from_snapshot_repairs_broken_records() {
    let map = context();
    let mut snapshot = map.snapshot();
    let kept = landmark("Kept");
    let mut duplicate = landmark("Duplicate");
    duplicate.id = kept.id;
    snapshot.landmarks = vec![kept.clone(), duplicate];
    snapshot.placed_cards = vec![
        PlacedCard {
            id: kept.id,
            kind: CardKind::Landmark,
            position: HexPosition::ORIGIN,
        },
        PlacedCard {
            id: uuid::Uuid::new_v4(),
            kind: CardKind::Delve,
            position: HexPosition::new(1, 0),
        },
    ];

    let (restored, report) = MapContext::from_snapshot(snapshot, MapConfig::default()).unwrap();
    assert_eq!(report.duplicate_entities, vec![kept.id]);
    assert_eq!(report.dropped_cards.len(), 1);
    assert_eq!(restored.entities().landmark(kept.id).unwrap().name, "Kept");
    assert_eq!(restored.graph().len(), 1);
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let mut config = MapConfig::default();
    config.grid.hex_size = -4.0;
    assert!(matches!(
        MapContext::new("Broken", config),
        Err(MapError::Config(_))
    ));
}

#[test]
fn repeated_monster_ids_inside_one_delve_are_rejected() {
    let mut map = context();
    let monster = Monster::new("Twin Shade", 4, 2);
    let mut twins = delve("Mirror Hall");
    twins.monsters = vec![monster.clone(), monster.clone()];

    assert!(matches!(
        map.create_delve(twins.clone()),
        Err(MapError::Store(StoreError::DuplicateId(id))) if id == monster.id
    ));
    assert!(map.entities().delve(twins.id).is_none());

    twins.monsters.pop();
    map.create_delve(twins.clone()).unwrap();
    twins.monsters.push(monster.clone());
    assert!(matches!(
        map.update_delve(twins.clone()),
        Err(MapError::Store(StoreError::DuplicateId(id))) if id == monster.id
    ));
    assert_eq!(map.entities().delve(twins.id).unwrap().monsters.len(), 1);
}

#[test]
fn from_snapshot_drops_repeated_monster_ids() {
    let map = context();
    let monster = Monster::new("Echo", 3, 1);
    let mut twins = delve("Echo Chamber");
    twins.monsters = vec![monster.clone(), monster.clone()];
    let mut snapshot = map.snapshot();
    snapshot.delves = vec![twins.clone()];

    let (restored, report) = MapContext::from_snapshot(snapshot, MapConfig::default()).unwrap();
    assert_eq!(report.duplicate_entities, vec![monster.id]);
    let kept = restored.entities().delve(twins.id).unwrap();
    assert_eq!(kept.monsters.len(), 1);
    assert_eq!(kept.monsters[0].id, monster.id);
}

#[test]
fn deleting_the_dragged_card_cancels_the_gesture() {
    let mut map = context();
    let id = map.create_delve(delve("Quarry")).unwrap();
    map.place_card(id, HexPosition::new(2, 0)).unwrap();
    map.begin_drag(DragPayload::new(CardKind::Delve, id, PixelPoint::default()), false)
        .unwrap();

    map.delete_delve(id).unwrap();
    assert_eq!(
        map.drag_state(),
        &DragState::Cancelled(CancelReason::Aborted)
    );
    let pointer = map.cell_center(HexPosition::new(4, 4));
    assert!(matches!(
        map.end_drag(pointer),
        Err(MapError::Drag(DragError::NotDragging))
    ));
    assert!(map.graph().is_empty());
}

#[test]
fn deleting_another_card_keeps_the_gesture_alive() {
    let mut map = context();
    let dragged = map.create_landmark(landmark("Signal Fire")).unwrap();
    let other = map.create_landmark(landmark("Ruin")).unwrap();
    map.begin_drag(
        DragPayload::new(CardKind::Landmark, dragged, PixelPoint::default()),
        true,
    )
    .unwrap();

    map.delete_landmark(other).unwrap();
    let placed = map.end_drag(map.cell_center(HexPosition::ORIGIN)).unwrap();
    assert_eq!(placed.id, dragged);
}
