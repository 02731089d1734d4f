use delvemap_core::{
    open_db, open_db_in_memory, ConnectionKind, Delve, Domain, HexPosition, Landmark, MapConfig,
    MapContext, MapSnapshot, RepoError, SnapshotRepository, SqliteSnapshotRepository, StressDie,
    SNAPSHOT_FORMAT_VERSION,
};
use rusqlite::Connection;

fn populated_map(name: &str) -> MapContext {
    let mut map = MapContext::new(name, MapConfig::default()).unwrap();
    let a = map
        .create_landmark(Landmark::new("Lighthouse", [Domain::Haven], StressDie::D10))
        .unwrap();
    let b = map
        .create_delve(Delve::new("Tide Caves", 20, [Domain::Wild, Domain::Warren]))
        .unwrap();
    map.place_card(a, HexPosition::new(0, 0)).unwrap();
    map.place_card(b, HexPosition::new(0, -1)).unwrap();
    map.connect(a, b, ConnectionKind::LandmarkToDelve).unwrap();
    map
}

#[test]
fn save_then_load_returns_identical_snapshot() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSnapshotRepository::try_new(&conn).unwrap();
    let map = populated_map("Coast");
    let snapshot = map.snapshot();

    repo.save_snapshot(&snapshot).unwrap();
    let loaded = repo.load_snapshot(map.map_id()).unwrap().unwrap();
    assert_eq!(loaded, snapshot);

    let (restored, report) = MapContext::from_snapshot(loaded, MapConfig::default()).unwrap();
    assert!(report.is_clean());
    assert_eq!(restored.graph().check_invariants(), Ok(()));
    assert_eq!(restored.graph().connections().len(), 1);
}

#[test]
fn load_of_unknown_map_is_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSnapshotRepository::try_new(&conn).unwrap();
    assert!(repo.load_snapshot(uuid::Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn save_is_an_upsert_keyed_by_map_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSnapshotRepository::try_new(&conn).unwrap();
    let mut map = populated_map("Draft");
    repo.save_snapshot(&map.snapshot()).unwrap();

    map.rename("Final");
    let extra = map
        .create_landmark(Landmark::new("Cairn", [Domain::Desolate], StressDie::D4))
        .unwrap();
    map.place_card(extra, HexPosition::new(2, 2)).unwrap();
    repo.save_snapshot(&map.snapshot()).unwrap();

    let maps = repo.list_maps().unwrap();
    assert_eq!(maps.len(), 1);
    assert_eq!(maps[0].map_id, map.map_id());
    assert_eq!(maps[0].name, "Final");
    assert_eq!(maps[0].card_count, 3);
    assert_eq!(maps[0].connection_count, 1);
}

#[test]
fn delete_removes_the_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSnapshotRepository::try_new(&conn).unwrap();
    let map = populated_map("Doomed");
    repo.save_snapshot(&map.snapshot()).unwrap();

    repo.delete_snapshot(map.map_id()).unwrap();
    assert!(repo.load_snapshot(map.map_id()).unwrap().is_none());
    assert!(matches!(
        repo.delete_snapshot(map.map_id()),
        Err(RepoError::NotFound(id)) if id == map.map_id()
    ));
}

#[test]
fn mismatched_payload_id_is_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSnapshotRepository::try_new(&conn).unwrap();
    let snapshot = MapSnapshot::empty(uuid::Uuid::new_v4(), "Orphan");
    let row_key = uuid::Uuid::new_v4();
    conn.execute(
        "INSERT INTO map_snapshots (map_id, name, format_version, payload)
         VALUES (?1, ?2, ?3, ?4);",
        rusqlite::params![
            row_key.to_string(),
            "Orphan",
            SNAPSHOT_FORMAT_VERSION,
            serde_json::to_string(&snapshot).unwrap(),
        ],
    )
    .unwrap();

    assert!(matches!(
        repo.load_snapshot(row_key),
        Err(RepoError::InvalidData(_))
    ));
}

#[test]
fn newer_payload_format_is_unsupported() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSnapshotRepository::try_new(&conn).unwrap();
    let map_id = uuid::Uuid::new_v4();
    let mut payload = serde_json::to_value(MapSnapshot::empty(map_id, "Future")).unwrap();
    payload["format_version"] = serde_json::json!(SNAPSHOT_FORMAT_VERSION + 1);
    conn.execute(
        "INSERT INTO map_snapshots (map_id, name, format_version, payload)
         VALUES (?1, ?2, ?3, ?4);",
        rusqlite::params![
            map_id.to_string(),
            "Future",
            SNAPSHOT_FORMAT_VERSION + 1,
            payload.to_string(),
        ],
    )
    .unwrap();

    match repo.load_snapshot(map_id) {
        Err(RepoError::UnsupportedFormat { found, supported }) => {
            assert_eq!(found, SNAPSHOT_FORMAT_VERSION + 1);
            assert_eq!(supported, SNAPSHOT_FORMAT_VERSION);
        }
        other => panic!("unexpected result: {other:?}"),
    }

    let mut snapshot = MapSnapshot::empty(map_id, "Future");
    snapshot.format_version = 0;
    assert!(matches!(
        repo.save_snapshot(&snapshot),
        Err(RepoError::UnsupportedFormat { found: 0, .. })
    ));
}

#[test]
fn repository_requires_a_migrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    match SqliteSnapshotRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            actual_version, ..
        }) => assert_eq!(actual_version, 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("unmigrated connection was accepted"),
    }
}

#[test]
fn snapshots_persist_across_file_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("maps.db");
    let map = populated_map("Persistent");

    {
        let conn = open_db(&path).unwrap();
        let repo = SqliteSnapshotRepository::try_new(&conn).unwrap();
        repo.save_snapshot(&map.snapshot()).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let repo = SqliteSnapshotRepository::try_new(&conn).unwrap();
    let loaded = repo.load_snapshot(map.map_id()).unwrap().unwrap();
    assert_eq!(loaded, map.snapshot());
}
