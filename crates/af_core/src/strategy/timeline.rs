//! Construction of the scheduling timeline from a decoded strategy document.
//!
//! Tracks are flattened onto one shared time axis, annotated with their
//! operator index, and sorted. A single SP simulation pass then records, for
//! each event, how many full energy slots the plan expects to be available
//! at the moment it fires; the scheduler uses that number as the readiness
//! threshold for ultimates.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_INITIAL_SP, DEFAULT_LINK_ANIMATION_SECS, DEFAULT_MAX_SP, DEFAULT_SP_REGEN_RATE,
    DEFAULT_ULTIMATE_ANIMATION_SECS, SKILL_PAUSE_WINDOW_SECS, SP_PER_SLOT,
};
use crate::error::DecodeError;
use crate::strategy::codec::{decode_data_code, RawAction, Scenario, StrategyDoc};

/// What the scheduler should do when an event becomes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Bring the operator to the foreground. Authored as an "attack" action:
    /// in the strategy grammar it marks which operator carries the basic
    /// attacks from that point on.
    SwitchOperator,
    Skill,
    Link,
    Ultimate,
    Dodge,
}

/// One flattened, time-normalized scheduling event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    /// Seconds relative to battle start (prep duration already subtracted).
    pub t_seconds: f64,
    pub kind: EventKind,
    /// Acting operator, 1-based. Meaningless for [`EventKind::Dodge`].
    pub operator: u8,
    /// SP this action consumes in the simulation.
    pub sp_cost: f64,
    /// Ultimate gauge this action consumes.
    pub gauge_cost: f64,
    /// Full energy slots the plan expects available when this event fires,
    /// assuming it ran on time. Gates [`EventKind::Ultimate`] only.
    pub sp_slots_required: u8,
}

/// A decoded, normalized battle plan. Immutable once built; shared via `Arc`
/// so a reload swaps the whole plan atomically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FightPlan {
    pub scenario_id: String,
    pub scenario_name: String,
    /// The data code this plan was decoded from, kept to make reloads of an
    /// identical code a no-op.
    pub data_code: String,
    pub prep_duration: f64,
    /// Events in non-decreasing `t_seconds` order.
    pub events: Vec<ScheduledEvent>,
    /// Energy slots equivalent to the configured starting SP; the timeline
    /// loop waits for this many before restarting.
    pub initial_sp_slots: u8,
    pub max_sp_slots: u8,
}

impl FightPlan {
    /// Decode a data code and build the plan for its active scenario.
    pub fn decode(data_code: &str) -> Result<Self, DecodeError> {
        let doc = decode_data_code(data_code)?;
        Self::from_document(&doc, data_code.trim())
    }

    /// Build a plan from an already-decoded document.
    pub fn from_document(doc: &StrategyDoc, data_code: &str) -> Result<Self, DecodeError> {
        let scenario = active_scenario(doc).ok_or(DecodeError::NoScenario)?;

        let initial_sp = positive_or(doc.system_constants.initial_sp, DEFAULT_INITIAL_SP);
        let max_sp = positive_or(doc.system_constants.max_sp, DEFAULT_MAX_SP);
        let regen_rate = positive_or(doc.system_constants.sp_regen_rate, DEFAULT_SP_REGEN_RATE);

        let events = flatten_events(
            scenario,
            scenario.data.prep_duration,
            initial_sp,
            max_sp,
            regen_rate,
        );

        let plan = FightPlan {
            scenario_id: scenario.id.clone(),
            scenario_name: scenario.name.clone(),
            data_code: data_code.to_string(),
            prep_duration: scenario.data.prep_duration,
            events,
            initial_sp_slots: slots(initial_sp),
            max_sp_slots: slots(max_sp),
        };

        log::info!(
            "built fight plan '{}' ({} events, {} starting slots)",
            plan.scenario_name,
            plan.events.len(),
            plan.initial_sp_slots
        );
        Ok(plan)
    }
}

/// First scenario matching the active id, falling back to the first listed.
fn active_scenario(doc: &StrategyDoc) -> Option<&Scenario> {
    doc.scenario_list
        .iter()
        .find(|s| s.id == doc.active_scenario_id)
        .or_else(|| doc.scenario_list.first())
}

fn positive_or(value: f64, default: f64) -> f64 {
    if value > 0.0 {
        value
    } else {
        default
    }
}

fn slots(sp: f64) -> u8 {
    (sp / SP_PER_SLOT).floor().max(0.0) as u8
}

/// An interval during which SP regeneration is suspended (the game freezes
/// the gauge over skill, link and ultimate animations).
#[derive(Debug, Clone, Copy)]
struct PauseWindow {
    start: f64,
    end: f64,
}

#[derive(Debug, Clone, Copy)]
struct StagedEvent {
    t_seconds: f64,
    kind: EventKind,
    operator: u8,
    sp_cost: f64,
    gauge_cost: f64,
}

fn flatten_events(
    scenario: &Scenario,
    prep_duration: f64,
    initial_sp: f64,
    max_sp: f64,
    regen_rate: f64,
) -> Vec<ScheduledEvent> {
    let mut staged = Vec::new();
    let mut windows = Vec::new();

    for (track_index, track) in scenario.data.tracks.iter().enumerate() {
        let operator = (track_index + 1) as u8;
        for action in &track.actions {
            stage_action(action, operator, prep_duration, &mut staged, &mut windows);
        }
    }

    // Stable sort keeps authored ordering for simultaneous events
    staged.sort_by(|a, b| a.t_seconds.total_cmp(&b.t_seconds));
    let windows = merge_windows(windows);

    let mut events = Vec::with_capacity(staged.len());
    let mut sp = initial_sp;
    let mut prev_t = 0.0;

    for item in staged {
        let gap = item.t_seconds - prev_t;
        if gap > 0.0 {
            let regenerating = gap - paused_overlap(&windows, prev_t, item.t_seconds);
            if regenerating > 0.0 {
                sp += regenerating * regen_rate;
            }
            if sp > max_sp {
                sp = max_sp;
            }
        }

        events.push(ScheduledEvent {
            t_seconds: item.t_seconds,
            kind: item.kind,
            operator: item.operator,
            sp_cost: item.sp_cost,
            gauge_cost: item.gauge_cost,
            sp_slots_required: slots(sp),
        });

        sp -= item.sp_cost;
        prev_t = item.t_seconds;
    }

    events
}

fn stage_action(
    action: &RawAction,
    operator: u8,
    prep_duration: f64,
    staged: &mut Vec<StagedEvent>,
    windows: &mut Vec<PauseWindow>,
) {
    let t_seconds = (action.start_time - prep_duration).max(0.0);

    let staged_event = |kind| StagedEvent {
        t_seconds,
        kind,
        operator,
        sp_cost: 0.0,
        gauge_cost: 0.0,
    };

    match action.action_type.as_str() {
        "attack" => staged.push(staged_event(EventKind::SwitchOperator)),
        "skill" => {
            staged.push(StagedEvent { sp_cost: action.sp_cost, ..staged_event(EventKind::Skill) });
            windows.push(PauseWindow { start: t_seconds, end: t_seconds + SKILL_PAUSE_WINDOW_SECS });
        }
        "link" => {
            staged.push(staged_event(EventKind::Link));
            let animation = positive_or(action.animation_time, DEFAULT_LINK_ANIMATION_SECS);
            windows.push(PauseWindow { start: t_seconds, end: t_seconds + animation });
        }
        "ultimate" => {
            staged.push(StagedEvent {
                gauge_cost: action.gauge_cost,
                ..staged_event(EventKind::Ultimate)
            });
            let animation = positive_or(action.animation_time, DEFAULT_ULTIMATE_ANIMATION_SECS);
            windows.push(PauseWindow { start: t_seconds, end: t_seconds + animation });
        }
        "dodge" => staged.push(staged_event(EventKind::Dodge)),
        // "execution" and anything the grammar grows later
        _ => {}
    }
}

/// Merge overlapping pause windows into a disjoint, sorted set. Done once
/// before the simulation walk so overlapping animations are not counted
/// twice against the same gap.
fn merge_windows(mut windows: Vec<PauseWindow>) -> Vec<PauseWindow> {
    if windows.is_empty() {
        return windows;
    }
    windows.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut merged: Vec<PauseWindow> = Vec::with_capacity(windows.len());
    let mut current = windows[0];
    for window in windows.into_iter().skip(1) {
        if window.start <= current.end {
            if window.end > current.end {
                current.end = window.end;
            }
        } else {
            merged.push(current);
            current = window;
        }
    }
    merged.push(current);
    merged
}

/// Total paused time inside `(from, to)`, given disjoint sorted windows.
fn paused_overlap(windows: &[PauseWindow], from: f64, to: f64) -> f64 {
    let mut paused = 0.0;
    for window in windows {
        let start = window.start.max(from);
        let end = window.end.min(to);
        if start < end {
            paused += end - start;
        }
    }
    paused
}
