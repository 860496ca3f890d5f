//! Roster import/export against an on-disk database.

use cli::roster_io::{export_roster, import_roster, ImportMode};
use db::LeagueRepo;
use serde_json::json;

fn roster_file(dir: &tempfile::TempDir, name: &str, rows: serde_json::Value) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, rows.to_string()).unwrap();
    path
}

#[tokio::test]
async fn test_import_validate_export_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("league.db");
    let repo = LeagueRepo::open(&db_path).await.unwrap();
    repo.init_db().await.unwrap();

    let input = roster_file(
        &dir,
        "roster.json",
        json!([
            {
                "player_id": "P000001",
                "team_id": "ATL",
                "name": "First Player",
                "pos": "PG",
                "age": 24,
                "HT": "6' 2\"",
                "WT": "195 lbs",
                "Salary": "$15,161,800",
                "ovr": 88,
                "3PT": 91
            },
            {
                "player_id": "P000002",
                "team_id": "BOS",
                "name": "Second Player",
                "pos": "C",
                "age": 30,
                "height_in": 84,
                "weight_lb": 250,
                "salary_amount": 21000000.4,
                "ovr": 85
            }
        ]),
    );

    let count = import_roster(&repo, &input, ImportMode::Replace, true)
        .await
        .unwrap();
    assert_eq!(count, 2);
    repo.validate_integrity(true).await.unwrap();

    let output = dir.path().join("export.json");
    let exported = export_roster(&repo, &output).await.unwrap();
    assert_eq!(exported, 2);

    let rows: Vec<serde_json::Value> =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let first = rows
        .iter()
        .find(|r| r["player_id"] == "P000001")
        .unwrap();
    assert_eq!(first["team_id"], "ATL");
    assert_eq!(first["height_in"], 74);
    assert_eq!(first["weight_lb"], 195);
    assert_eq!(first["salary_amount"], 15_161_800);
    assert_eq!(first["3PT"], 91);
    let second = rows
        .iter()
        .find(|r| r["player_id"] == "P000002")
        .unwrap();
    // Float salaries are rounded to integer dollars at import.
    assert_eq!(second["salary_amount"], 21_000_000);
}

#[tokio::test]
async fn test_duplicate_player_ids_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let repo = LeagueRepo::open(dir.path().join("league.db")).await.unwrap();
    repo.init_db().await.unwrap();

    let input = roster_file(
        &dir,
        "dupes.json",
        json!([
            {"player_id": "P000001", "team_id": "ATL"},
            {"player_id": "P000001", "team_id": "BOS"}
        ]),
    );
    let err = import_roster(&repo, &input, ImportMode::Replace, true)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("P000001"));
}

#[tokio::test]
async fn test_legacy_ids_only_with_flag() {
    let dir = tempfile::tempdir().unwrap();
    let repo = LeagueRepo::open(dir.path().join("league.db")).await.unwrap();
    repo.init_db().await.unwrap();

    let input = roster_file(
        &dir,
        "legacy.json",
        json!([{"player_id": "17", "team_id": "ATL", "salary_amount": 1000000}]),
    );

    assert!(import_roster(&repo, &input, ImportMode::Replace, true)
        .await
        .is_err());
    let count = import_roster(&repo, &input, ImportMode::Replace, false)
        .await
        .unwrap();
    assert_eq!(count, 1);

    let output = dir.path().join("export.json");
    export_roster(&repo, &output).await.unwrap();
    let rows: Vec<serde_json::Value> =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(rows[0]["player_id"], "P000017");
}

#[tokio::test]
async fn test_upsert_mode_keeps_existing_rows() {
    let dir = tempfile::tempdir().unwrap();
    let repo = LeagueRepo::open(dir.path().join("league.db")).await.unwrap();
    repo.init_db().await.unwrap();

    let base = roster_file(
        &dir,
        "base.json",
        json!([
            {"player_id": "P000001", "team_id": "ATL", "salary_amount": 1000000},
            {"player_id": "P000002", "team_id": "BOS", "salary_amount": 2000000}
        ]),
    );
    import_roster(&repo, &base, ImportMode::Replace, true)
        .await
        .unwrap();

    let update = roster_file(
        &dir,
        "update.json",
        json!([{"player_id": "P000001", "team_id": "NYK", "salary_amount": 3000000}]),
    );
    import_roster(&repo, &update, ImportMode::Upsert, true)
        .await
        .unwrap();

    let output = dir.path().join("export.json");
    let count = export_roster(&repo, &output).await.unwrap();
    assert_eq!(count, 2);
    let rows: Vec<serde_json::Value> =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let moved = rows.iter().find(|r| r["player_id"] == "P000001").unwrap();
    assert_eq!(moved["team_id"], "NYK");
    assert_eq!(moved["salary_amount"], 3_000_000);
}
