//! Integration tests for the record loaders.
//!
//! Tests verify:
//! 1. State snapshots load one per line, in file order, keeping extra fields
//! 2. Action batches are flattened in encounter order
//! 3. A malformed line, blank ones included, aborts the load and reports its line number
//! 4. Screenshot scans only pick up `state_<tick>.<ext>` files, extension case included
//! 5. Tick collisions resolve deterministically or are rejected

use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tickgrid_core::{
    loader::{load_actions, load_screenshots, load_state_changes, ScreenshotPattern},
    CollisionPolicy, PipelineError,
};

fn write(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).expect("write fixture");
}

fn touch(dir: &Path, name: &str) {
    fs::write(dir.join(name), b"").expect("touch fixture");
}

// ─────────────────────────────────────────────────────────────────────────────
// State log
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn state_lines_load_in_file_order() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "states.json",
        concat!(
            r#"{"tick":120,"player":{"position":{"x":0.5,"y":1.5}},"visible_entities":[]}"#, "\n",
            r#"{"tick":60,"player":{"position":{"x":2.0,"y":3.0}},"visible_entities":[{"name":"tree"}]}"#, "\n",
        ),
    );

    let states = load_state_changes(dir.path().join("states.json")).unwrap();

    assert_eq!(states.iter().map(|s| s.tick).collect::<Vec<_>>(), vec![120, 60]);
    assert_eq!(states[1].player_position(), Some((2.0, 3.0)));
    assert_eq!(states[1].visible_entity_count(), Some(1));
}

#[test]
fn trailing_newline_is_not_a_record() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "states.json", "{\"tick\":1}\n{\"tick\":2}\n");
    write(dir.path(), "actions.json", "[{\"tick\":1}]\n[{\"tick\":2}]\n");

    let states = load_state_changes(dir.path().join("states.json")).unwrap();
    let actions = load_actions(dir.path().join("actions.json")).unwrap();
    assert_eq!(states.len(), 2);
    assert_eq!(actions.len(), 2);
}

#[test]
fn blank_interior_line_is_malformed() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "states.json", "{\"tick\":1}\n   \n{\"tick\":2}\n");
    write(dir.path(), "actions.json", "[{\"tick\":1}]\n\n[{\"tick\":2}]\n");

    let err = load_state_changes(dir.path().join("states.json")).unwrap_err();
    assert!(matches!(err, PipelineError::MalformedRecord { line: 2, .. }), "{err:?}");

    let err = load_actions(dir.path().join("actions.json")).unwrap_err();
    assert!(matches!(err, PipelineError::MalformedRecord { line: 2, .. }), "{err:?}");
}

#[test]
fn negative_ticks_load() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "states.json", "{\"tick\":-30}\n{\"tick\":0}\n");
    write(dir.path(), "actions.json", "[{\"tick\":-12,\"action\":\"walk\"}]\n");

    let states = load_state_changes(dir.path().join("states.json")).unwrap();
    let actions = load_actions(dir.path().join("actions.json")).unwrap();
    assert_eq!(states.iter().map(|s| s.tick).collect::<Vec<_>>(), vec![-30, 0]);
    assert_eq!(actions[0].tick, -12);
}

#[test]
fn malformed_state_line_reports_line_number() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "states.json", "{\"tick\":1}\n{\"tick\":2}\n{\"tick\":3,\n");

    let err = load_state_changes(dir.path().join("states.json")).unwrap_err();
    match err {
        PipelineError::MalformedRecord { line, .. } => assert_eq!(line, 3),
        other => panic!("expected MalformedRecord, got {other:?}"),
    }
}

#[test]
fn state_without_tick_is_malformed() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "states.json", "{\"player\":{}}\n");

    let err = load_state_changes(dir.path().join("states.json")).unwrap_err();
    assert!(matches!(err, PipelineError::MalformedRecord { line: 1, .. }));
}

#[test]
fn missing_state_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = load_state_changes(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, PipelineError::Io { .. }));
}

// ─────────────────────────────────────────────────────────────────────────────
// Action log
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn action_batches_flatten_in_encounter_order() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "actions.json",
        concat!(
            r#"[{"tick":10,"action":"mine"},{"tick":5,"action":"craft"}]"#, "\n",
            r#"[]"#, "\n",
            r#"[{"tick":7,"action":"build","entity":"stone-furnace"}]"#, "\n",
        ),
    );

    let actions = load_actions(dir.path().join("actions.json")).unwrap();

    let seen: Vec<(i64, &str)> = actions
        .iter()
        .map(|a| (a.tick, a.get("action").and_then(|v| v.as_str()).unwrap()))
        .collect();
    assert_eq!(seen, vec![(10, "mine"), (5, "craft"), (7, "build")]);
    assert_eq!(actions[2].get("entity").unwrap(), "stone-furnace");
}

#[test]
fn action_line_that_is_not_an_array_is_malformed() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "actions.json", "[{\"tick\":1}]\n{\"tick\":2}\n");

    let err = load_actions(dir.path().join("actions.json")).unwrap_err();
    assert!(matches!(err, PipelineError::MalformedRecord { line: 2, .. }));
}

// ─────────────────────────────────────────────────────────────────────────────
// Screenshot directory
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn screenshot_scan_maps_ticks_to_paths() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "state_0.jpg");
    touch(dir.path(), "state_100.jpg");
    touch(dir.path(), "state_100.png");
    touch(dir.path(), "state_7.JPG");
    touch(dir.path(), "state_-60.jpg");
    touch(dir.path(), "notes.txt");
    touch(dir.path(), "factorio_state_changes.json");
    fs::create_dir(dir.path().join("state_5.jpg")).unwrap();

    let shots = load_screenshots(
        dir.path(),
        &ScreenshotPattern::default(),
        CollisionPolicy::Reject,
    )
    .unwrap();

    assert_eq!(shots.keys().copied().collect::<Vec<_>>(), vec![-60, 0, 100]);
    assert_eq!(shots[&100], dir.path().join("state_100.jpg"));
}

#[test]
fn colliding_ticks_keep_greatest_path() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "state_042.jpg");
    touch(dir.path(), "state_42.jpg");

    let shots = load_screenshots(
        dir.path(),
        &ScreenshotPattern::default(),
        CollisionPolicy::GreatestPath,
    )
    .unwrap();

    assert_eq!(shots.len(), 1);
    assert_eq!(shots[&42], dir.path().join("state_42.jpg"));
}

#[test]
fn colliding_ticks_rejected_when_configured() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "state_042.jpg");
    touch(dir.path(), "state_42.jpg");

    let err = load_screenshots(
        dir.path(),
        &ScreenshotPattern::default(),
        CollisionPolicy::Reject,
    )
    .unwrap_err();

    match err {
        PipelineError::ScreenshotCollision { tick, first, second } => {
            assert_eq!(tick, 42);
            assert_eq!(first, dir.path().join("state_042.jpg"));
            assert_eq!(second, dir.path().join("state_42.jpg"));
        }
        other => panic!("expected ScreenshotCollision, got {other:?}"),
    }
}
