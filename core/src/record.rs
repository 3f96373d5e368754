//! Log records — the three input streams and the aligned join result.
//!
//! Snapshots and actions carry one required field, `tick`. Everything else
//! the simulation writes is kept verbatim in `fields` so upstream schema
//! changes never break loading.

use crate::types::Tick;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// One world-state snapshot, as logged at `tick`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub tick:   Tick,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl StateSnapshot {
    pub fn new(tick: Tick) -> Self {
        Self { tick, fields: Map::new() }
    }

    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// `player.position`, written either as `{"x": .., "y": ..}` or `[x, y]`.
    pub fn player_position(&self) -> Option<(f64, f64)> {
        let position = self.fields.get("player")?.get("position")?;
        match position {
            Value::Object(obj) => Some((obj.get("x")?.as_f64()?, obj.get("y")?.as_f64()?)),
            Value::Array(xs) if xs.len() == 2 => Some((xs[0].as_f64()?, xs[1].as_f64()?)),
            _ => None,
        }
    }

    pub fn visible_entity_count(&self) -> Option<usize> {
        self.fields
            .get("visible_entities")?
            .as_array()
            .map(Vec::len)
    }
}

/// One player action. Several may share a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEvent {
    pub tick:   Tick,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ActionEvent {
    pub fn new(tick: Tick) -> Self {
        Self { tick, fields: Map::new() }
    }

    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// A screenshot discovered on disk, keyed by the tick in its filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenshotRef {
    pub tick: Tick,
    pub path: PathBuf,
}

/// A snapshot joined with its screenshot and the actions of its window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedExample {
    pub tick:            Tick,
    pub state:           StateSnapshot,
    pub screenshot_path: PathBuf,
    pub actions:         Vec<ActionEvent>,
}
