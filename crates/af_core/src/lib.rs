//! # af_core - Timeline-Driven Auto-Battle Scheduler
//!
//! This library drives a scripted sequence of per-operator combat actions
//! along a shared time axis, reconciling the plan against observed screen
//! state on every captured frame.
//!
//! ## Features
//! - Strategy data-code decoding (url-safe base64 → gzip → JSON)
//! - SP simulation to derive per-event readiness thresholds
//! - Frame-driven scheduling with pause/resume accounting
//! - Reactive fallback mode when no strategy is loaded
//!
//! The library performs no recognition and no input injection: it consumes
//! pre-computed observations and emits abstract action requests that a host
//! executor dispatches.

// Game scheduler APIs pass several observation fields per call
#![allow(clippy::too_many_arguments)]

pub mod constants;
pub mod engine;
pub mod error;
pub mod strategy;

pub use engine::{
    ActionKind, ActionQueue, ActionRequest, BattleSession, FrameObservation, LinkBacklog,
    Observation, PauseClock, Scheduler, SessionMode, UltimateReady,
};
pub use error::DecodeError;
pub use strategy::{decode_data_code, EventKind, FightPlan, ScheduledEvent, StrategyRegistry};
