//! af_adapter: bridge between the af_core battle session and a
//! recognition-pipeline host.
//!
//! The core crate emits abstract [`ActionRequest`](af_core::ActionRequest)s;
//! hosts dispatch pipeline tasks by name. This crate owns that mapping, a
//! serde DTO for frames that arrive as JSON, and a small driver that feeds a
//! session and dispatches everything that comes due.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use af_core::{ActionKind, BattleSession, FrameObservation, StrategyRegistry, UltimateReady};

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("invalid frame payload: {0}")]
    InvalidFrame(#[from] serde_json::Error),
}

/// Pipeline task name for an action, following the host's naming scheme.
/// Operator-scoped tasks interpolate the 1-based operator index.
pub fn task_name(kind: ActionKind, operator: u8) -> String {
    debug_assert!(
        !kind.is_operator_scoped() || (1..=4).contains(&operator),
        "operator-scoped action {kind} needs an operator in 1..=4, got {operator}"
    );
    match kind {
        ActionKind::Attack => "__AutoFightActionAttack".to_string(),
        ActionKind::Combo => "__AutoFightActionComboClick".to_string(),
        ActionKind::Skill => format!("__AutoFightActionSkillOperators{operator}"),
        ActionKind::UltimateDown => {
            format!("__AutoFightActionEndSkillOperators{operator}KeyDown")
        }
        ActionKind::UltimateUp => format!("__AutoFightActionEndSkillOperators{operator}KeyUp"),
        ActionKind::LockTarget => "__AutoFightActionLockTarget".to_string(),
        ActionKind::Dodge => "__AutoFightActionDodge".to_string(),
        ActionKind::SwitchOperator => format!("__AutoFightActionSwitchOperator{operator}"),
    }
}

/// One frame's recognition results as hosts deliver them (JSON, camelCase).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrameInput {
    pub energy_slots: i32,
    pub combo_available: bool,
    pub ultimate_ready: Vec<u8>,
    pub enemy_visible: bool,
    pub enemy_attacking: bool,
    pub in_battle_ui: bool,
    pub character_level_shown: bool,
    pub in_fight_space: bool,
}

impl FrameInput {
    /// Attach a capture instant and convert to the core observation type.
    /// An unreadable energy gauge comes through as a negative value and is
    /// clamped to zero so the scheduler stalls safely.
    pub fn into_observation(self, now: Instant) -> FrameObservation {
        FrameObservation {
            now,
            energy_slots: self.energy_slots.clamp(0, 3) as u8,
            combo_available: self.combo_available,
            ultimate_ready: UltimateReady::from_operators(&self.ultimate_ready),
            enemy_visible: self.enemy_visible,
            enemy_attacking: self.enemy_attacking,
            in_battle_ui: self.in_battle_ui,
            character_level_shown: self.character_level_shown,
            in_fight_space: self.in_fight_space,
        }
    }
}

/// Parse a frame payload as delivered by the recognition host.
pub fn parse_frame(payload: &str) -> Result<FrameInput, AdapterError> {
    Ok(serde_json::from_str(payload)?)
}

/// Dispatch boundary: the host runs pipeline tasks by name.
pub trait ActionExecutor {
    fn run_task(&mut self, task: &str);
}

/// Feeds frames into a [`BattleSession`] and dispatches every action that
/// comes due, in execution order.
pub struct FightDriver<E: ActionExecutor> {
    session: BattleSession,
    executor: E,
}

impl<E: ActionExecutor> FightDriver<E> {
    pub fn new(registry: Arc<StrategyRegistry>, executor: E) -> Self {
        Self { session: BattleSession::new(registry), executor }
    }

    pub fn session(&self) -> &BattleSession {
        &self.session
    }

    /// Process one frame; returns how many tasks were dispatched.
    pub fn drive_frame(&mut self, frame: &FrameObservation) -> usize {
        let due = self.session.on_frame(frame);
        for request in &due {
            let task = task_name(request.kind, request.operator);
            log::debug!("dispatching {task}");
            self.executor.run_task(&task);
        }
        due.len()
    }

    /// Parse and process a JSON frame captured at `now`.
    pub fn drive_json_frame(&mut self, payload: &str, now: Instant) -> Result<usize, AdapterError> {
        let input = parse_frame(payload)?;
        Ok(self.drive_frame(&input.into_observation(now)))
    }
}
