//! Tick-trace harness for deterministic station tests.
//!
//! A trace steps a small simulation for a fixed number of ticks and records a
//! serializable snapshot after each step. The trace can be inspected directly
//! or compared against a golden JSON file with [`run_tick_trace`].

use crate::snapshot::assert_json_snapshot;
use anyhow::Result;
use emberforge_core::SimTick;
use serde::Serialize;
use std::path::PathBuf;

/// Configuration for a golden-file tick trace.
#[derive(Debug, Clone)]
pub struct TickTraceConfig {
    /// Name written into the report.
    pub name: String,
    /// Number of ticks to step (the trace also holds the initial frame).
    pub ticks: u64,
    /// Path to the golden JSON file.
    pub snapshot_path: PathBuf,
}

/// Snapshot captured at a given tick.
#[derive(Debug, Clone, Serialize)]
pub struct TickFrame<S> {
    /// Tick number.
    pub tick: u64,
    /// Snapshot payload.
    pub snapshot: S,
}

/// Ordered frames of one trace.
#[derive(Debug, Clone, Serialize)]
pub struct TickTrace<S> {
    /// Trace name.
    pub name: String,
    /// Frame at tick 0, then one per step.
    pub frames: Vec<TickFrame<S>>,
}

impl<S> TickTrace<S> {
    /// Final frame's snapshot.
    pub fn last(&self) -> Option<&S> {
        self.frames.last().map(|frame| &frame.snapshot)
    }
}

/// Step `state` for `ticks` ticks, snapshotting before the first step and after each.
pub fn record_tick_trace<State, Snapshot, StepFn, SnapFn>(
    name: &str,
    ticks: u64,
    mut state: State,
    mut step: StepFn,
    mut snapshot: SnapFn,
) -> TickTrace<Snapshot>
where
    StepFn: FnMut(SimTick, &mut State),
    SnapFn: FnMut(SimTick, &State) -> Snapshot,
{
    let mut frames = Vec::with_capacity(ticks as usize + 1);
    let mut tick = SimTick::ZERO;
    frames.push(TickFrame {
        tick: tick.0,
        snapshot: snapshot(tick, &state),
    });

    for _ in 0..ticks {
        step(tick, &mut state);
        tick = tick.advance(1);
        frames.push(TickFrame {
            tick: tick.0,
            snapshot: snapshot(tick, &state),
        });
    }

    TickTrace {
        name: name.to_string(),
        frames,
    }
}

/// Record a trace and assert (or update) it against `config.snapshot_path`.
pub fn run_tick_trace<State, Snapshot, StepFn, SnapFn>(
    config: TickTraceConfig,
    state: State,
    step: StepFn,
    snapshot: SnapFn,
) -> Result<()>
where
    Snapshot: Serialize,
    StepFn: FnMut(SimTick, &mut State),
    SnapFn: FnMut(SimTick, &State) -> Snapshot,
{
    let trace = record_tick_trace(&config.name, config.ticks, state, step, snapshot);
    assert_json_snapshot(config.snapshot_path, &trace)
}
