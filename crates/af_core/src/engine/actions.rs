//! The abstract action vocabulary the scheduler emits. Translating these to
//! device input is the host executor's job.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Basic attack; also the benign stall while waiting on resources.
    Attack,
    /// Click the link-combo prompt.
    Combo,
    /// Operator skill.
    Skill,
    /// Press and hold the ultimate key.
    UltimateDown,
    /// Release the ultimate key.
    UltimateUp,
    /// One-shot camera lock onto the visible enemy.
    LockTarget,
    Dodge,
    /// Bring an operator to the foreground.
    SwitchOperator,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Attack => "Attack",
            ActionKind::Combo => "Combo",
            ActionKind::Skill => "Skill",
            ActionKind::UltimateDown => "UltimateDown",
            ActionKind::UltimateUp => "UltimateUp",
            ActionKind::LockTarget => "LockTarget",
            ActionKind::Dodge => "Dodge",
            ActionKind::SwitchOperator => "SwitchOperator",
        }
    }

    /// Whether this action is scoped to a specific operator.
    pub fn is_operator_scoped(&self) -> bool {
        matches!(
            self,
            ActionKind::Skill
                | ActionKind::UltimateDown
                | ActionKind::UltimateUp
                | ActionKind::SwitchOperator
        )
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single scheduled action: what to do, who does it, and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionRequest {
    /// Monotonic instant at which the executor should fire this action.
    pub execute_at: Instant,
    pub kind: ActionKind,
    /// Operator 1..=4 for operator-scoped kinds, 0 otherwise.
    pub operator: u8,
}

impl ActionRequest {
    pub fn new(execute_at: Instant, kind: ActionKind) -> Self {
        Self { execute_at, kind, operator: 0 }
    }

    pub fn for_operator(execute_at: Instant, kind: ActionKind, operator: u8) -> Self {
        Self { execute_at, kind, operator }
    }
}
