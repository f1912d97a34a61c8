//! Numeric defaults shared across the scheduler.
//!
//! The SP values mirror the strategy editor's system constants and apply
//! whenever a document omits them; the durations are fixed behavior of the
//! in-game UI. Treat all of them as configuration, not derived quantities.

use std::time::Duration;

/// One "slot" of skill energy.
pub const SP_PER_SLOT: f64 = 100.0;

/// Starting SP when the document does not specify a positive value.
pub const DEFAULT_INITIAL_SP: f64 = 200.0;

/// SP cap when the document does not specify a positive value.
pub const DEFAULT_MAX_SP: f64 = 300.0;

/// SP regeneration per second when the document does not specify one.
pub const DEFAULT_SP_REGEN_RATE: f64 = 8.0;

/// Regeneration stops for this long around every skill activation.
pub const SKILL_PAUSE_WINDOW_SECS: f64 = 0.5;

/// Link animation length when the action does not carry one.
pub const DEFAULT_LINK_ANIMATION_SECS: f64 = 0.5;

/// Ultimate animation length when the action does not carry one.
pub const DEFAULT_ULTIMATE_ANIMATION_SECS: f64 = 1.5;

/// Hold time between the ultimate key-down and key-up.
pub const ULTIMATE_KEY_HOLD: Duration = Duration::from_millis(1500);

/// A queued link combo is abandoned if the UI never offers it within this.
pub const LINK_TTL: Duration = Duration::from_secs(10);

/// Continuous out-of-battle time after which the session fully resets.
pub const OUT_OF_BATTLE_GRACE: Duration = Duration::from_secs(10);

/// Delay before the one-shot target lock in reactive mode.
pub const LOCK_TARGET_DELAY: Duration = Duration::from_millis(1);

/// Reaction delay for a dodge triggered by an incoming enemy attack.
pub const DODGE_REACTION_DELAY: Duration = Duration::from_millis(100);

/// Party size; operators are indexed 1 through this value.
pub const OPERATOR_COUNT: u8 = 4;
