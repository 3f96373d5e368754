//! Stream aligner — joins snapshots, actions and screenshots by tick.
//!
//! WINDOWING (fixed, reproduced exactly):
//!   1. Snapshots are stable-sorted by tick; ties keep file order.
//!   2. Snapshot i owns the half-open window [tick_i, tick_{i+1}).
//!   3. A window is emitted only if tick_i has a screenshot.
//!   4. The last snapshot never starts a window and is never emitted.
//!
//! Actions keep their file order inside a window. Actions before the
//! first snapshot, or at/after the last one, belong to no window.

use crate::{
    loader::ScreenshotIndex,
    record::{ActionEvent, AlignedExample, StateSnapshot},
};
use serde::{Deserialize, Serialize};

/// Counters describing one alignment pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentStats {
    pub snapshots:                  usize,
    pub windows:                    usize,
    pub emitted:                    usize,
    pub skipped_without_screenshot: usize,
    pub actions_total:              usize,
    /// Actions that fell into an emitted window.
    pub actions_emitted:            usize,
    /// Actions that fell into a window whose snapshot had no screenshot.
    pub actions_unscreened:         usize,
    pub actions_before_first:       usize,
    pub actions_at_or_after_last:   usize,
}

pub fn align_streams(
    mut states: Vec<StateSnapshot>,
    actions: &[ActionEvent],
    screenshots: &ScreenshotIndex,
) -> (Vec<AlignedExample>, AlignmentStats) {
    states.sort_by_key(|s| s.tick); // stable

    let mut stats = AlignmentStats {
        snapshots:     states.len(),
        actions_total: actions.len(),
        ..AlignmentStats::default()
    };

    if states.len() < 2 {
        log::debug!("{} snapshot(s): nothing to window", states.len());
        if let Some(only) = states.first() {
            stats.actions_before_first = actions.iter().filter(|a| a.tick < only.tick).count();
            stats.actions_at_or_after_last = actions.len() - stats.actions_before_first;
        } else {
            stats.actions_at_or_after_last = actions.len();
        }
        return (Vec::new(), stats);
    }

    // Stable index sort: equal ticks keep file order.
    let mut by_tick: Vec<usize> = (0..actions.len()).collect();
    by_tick.sort_by_key(|&i| actions[i].tick);

    let first_tick = states[0].tick;
    let mut cursor = by_tick.partition_point(|&i| actions[i].tick < first_tick);
    stats.actions_before_first = cursor;

    let mut aligned = Vec::new();
    for pair in states.windows(2) {
        let (current, next) = (&pair[0], &pair[1]);
        stats.windows += 1;

        let start = cursor;
        let end = start + by_tick[start..].partition_point(|&i| actions[i].tick < next.tick);
        cursor = end;

        let Some(path) = screenshots.get(&current.tick) else {
            stats.skipped_without_screenshot += 1;
            stats.actions_unscreened += end - start;
            continue;
        };

        let mut window = by_tick[start..end].to_vec();
        window.sort_unstable();
        let window_actions: Vec<ActionEvent> =
            window.into_iter().map(|i| actions[i].clone()).collect();

        log::debug!(
            "window [{}, {}): {} action(s), screenshot {}",
            current.tick,
            next.tick,
            window_actions.len(),
            path.display()
        );

        stats.actions_emitted += window_actions.len();
        stats.emitted += 1;
        aligned.push(AlignedExample {
            tick:            current.tick,
            state:           current.clone(),
            screenshot_path: path.clone(),
            actions:         window_actions,
        });
    }
    stats.actions_at_or_after_last = by_tick.len() - cursor;

    log::info!(
        "Aligned {} of {} snapshots ({} without screenshot, last snapshot excluded)",
        stats.emitted,
        stats.snapshots,
        stats.skipped_without_screenshot
    );
    (aligned, stats)
}
