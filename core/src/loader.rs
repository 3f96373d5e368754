//! Record loaders — the three on-disk logs to in-memory collections.
//!
//! RULE: loaders never recover from a bad line. The first malformed
//! record aborts the load with its 1-based line number.

use crate::{
    config::CollisionPolicy,
    error::{PipelineError, PipelineResult},
    record::{ActionEvent, ScreenshotRef, StateSnapshot},
    types::Tick,
};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Tick → screenshot path, after collision resolution.
pub type ScreenshotIndex = BTreeMap<Tick, PathBuf>;

/// Filename pattern for screenshots: `<prefix><tick>.<ext>`.
#[derive(Debug, Clone)]
pub struct ScreenshotPattern {
    pub prefix:     String,
    pub extensions: Vec<String>,
}

impl ScreenshotPattern {
    pub fn new(prefix: &str, extensions: &[String]) -> Self {
        Self {
            prefix:     prefix.to_string(),
            extensions: extensions.to_vec(),
        }
    }

    /// Extract the tick from a file name, or `None` if it doesn't match.
    pub fn parse_tick(&self, file_name: &str) -> Option<Tick> {
        let rest = file_name.strip_prefix(&self.prefix)?;
        let (digits, ext) = rest.rsplit_once('.')?;
        if !self.extensions.iter().any(|e| e == ext) {
            return None;
        }
        let magnitude = digits.strip_prefix('-').unwrap_or(digits);
        if magnitude.is_empty() || !magnitude.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

impl Default for ScreenshotPattern {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_SCREENSHOT_PREFIX, &["jpg".to_string()])
    }
}

/// One `StateSnapshot` per line, in file order.
pub fn load_state_changes(path: impl AsRef<Path>) -> PipelineResult<Vec<StateSnapshot>> {
    let path = path.as_ref();
    let mut states = Vec::new();
    for_each_record::<StateSnapshot>(path, |snap| states.push(snap))?;
    log::info!("Loaded {} state snapshots from {}", states.len(), path.display());
    Ok(states)
}

/// Each line is a JSON array of actions; batches are flattened in
/// encounter order.
pub fn load_actions(path: impl AsRef<Path>) -> PipelineResult<Vec<ActionEvent>> {
    let path = path.as_ref();
    let mut actions = Vec::new();
    for_each_record::<Vec<ActionEvent>>(path, |batch| actions.extend(batch))?;
    log::info!("Loaded {} player actions from {}", actions.len(), path.display());
    Ok(actions)
}

/// Scan `dir` (non-recursive) for screenshots matching `pattern`.
///
/// Entries are visited in sorted path order so the result never depends
/// on directory enumeration order.
pub fn load_screenshots(
    dir: impl AsRef<Path>,
    pattern: &ScreenshotPattern,
    on_collision: CollisionPolicy,
) -> PipelineResult<ScreenshotIndex> {
    let dir = dir.as_ref();
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| PipelineError::io(dir, e))? {
        let entry = entry.map_err(|e| PipelineError::io(dir, e))?;
        let path = entry.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let mut index = ScreenshotIndex::new();
    for path in paths {
        let Some(tick) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| pattern.parse_tick(n))
        else {
            log::debug!("Ignoring non-screenshot file {}", path.display());
            continue;
        };

        let shot = ScreenshotRef { tick, path };
        insert_screenshot(&mut index, shot, on_collision)?;
    }

    log::info!("Found {} screenshots in {}", index.len(), dir.display());
    Ok(index)
}

fn insert_screenshot(
    index: &mut ScreenshotIndex,
    shot: ScreenshotRef,
    on_collision: CollisionPolicy,
) -> PipelineResult<()> {
    let Some(existing) = index.get(&shot.tick) else {
        index.insert(shot.tick, shot.path);
        return Ok(());
    };

    match on_collision {
        CollisionPolicy::Reject => Err(PipelineError::ScreenshotCollision {
            tick:   shot.tick,
            first:  existing.clone(),
            second: shot.path,
        }),
        CollisionPolicy::GreatestPath => {
            let winner = if shot.path > *existing { shot.path } else { existing.clone() };
            log::warn!(
                "tick={} has several screenshots; keeping {}",
                shot.tick,
                winner.display()
            );
            index.insert(shot.tick, winner);
            Ok(())
        }
    }
}

/// Parse every line of `path` as a `T` and hand it to `sink`.
fn for_each_record<T: DeserializeOwned>(
    path: &Path,
    mut sink: impl FnMut(T),
) -> PipelineResult<()> {
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| PipelineError::io(path, e))?;
        let record = serde_json::from_str(&line).map_err(|source| {
            PipelineError::MalformedRecord {
                path: path.to_path_buf(),
                line: idx + 1,
                source,
            }
        })?;
        sink(record);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ticks_from_standard_names() {
        let pattern = ScreenshotPattern::default();
        assert_eq!(pattern.parse_tick("state_0.jpg"), Some(0));
        assert_eq!(pattern.parse_tick("state_18000.jpg"), Some(18000));
        assert_eq!(pattern.parse_tick("state_-60.jpg"), Some(-60));
    }

    #[test]
    fn rejects_names_outside_the_pattern() {
        let pattern = ScreenshotPattern::default();
        assert_eq!(pattern.parse_tick("state_.jpg"), None);
        assert_eq!(pattern.parse_tick("state_12.png"), None);
        assert_eq!(pattern.parse_tick("state_12a.jpg"), None);
        assert_eq!(pattern.parse_tick("state_-.jpg"), None);
        assert_eq!(pattern.parse_tick("state_12.JPG"), None);
        assert_eq!(pattern.parse_tick("shot_12.jpg"), None);
        assert_eq!(pattern.parse_tick("state_12"), None);
    }

    #[test]
    fn extra_extensions_widen_the_match() {
        let pattern = ScreenshotPattern::new("state_", &["jpg".into(), "png".into()]);
        assert_eq!(pattern.parse_tick("state_7.png"), Some(7));
    }

    #[test]
    fn greatest_path_wins_regardless_of_insert_order() {
        let a = ScreenshotRef { tick: 5, path: PathBuf::from("/d/state_005.jpg") };
        let b = ScreenshotRef { tick: 5, path: PathBuf::from("/d/state_5.jpg") };

        let mut forward = ScreenshotIndex::new();
        insert_screenshot(&mut forward, a.clone(), CollisionPolicy::GreatestPath).unwrap();
        insert_screenshot(&mut forward, b.clone(), CollisionPolicy::GreatestPath).unwrap();

        let mut reverse = ScreenshotIndex::new();
        insert_screenshot(&mut reverse, b, CollisionPolicy::GreatestPath).unwrap();
        insert_screenshot(&mut reverse, a, CollisionPolicy::GreatestPath).unwrap();

        assert_eq!(forward, reverse);
        assert_eq!(forward[&5], PathBuf::from("/d/state_5.jpg"));
    }
}
