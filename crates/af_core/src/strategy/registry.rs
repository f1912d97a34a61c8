//! Process-wide holder for the currently loaded fight plan.
//!
//! The recognition layer reads the plan on every frame while the load path
//! replaces it rarely, so the registry is a read/write-locked `Option<Arc>`:
//! readers clone the `Arc` and keep working on a consistent snapshot even if
//! a swap happens mid-frame. The host owns the registry value; nothing here
//! is a true global.

use std::sync::{Arc, RwLock};

use crate::error::DecodeError;
use crate::strategy::timeline::FightPlan;

#[derive(Debug, Default)]
pub struct StrategyRegistry {
    current: RwLock<Option<Arc<FightPlan>>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `data_code` and make it the current plan.
    ///
    /// Loading the exact code that is already current is a no-op, so callers
    /// may pass the code on every battle entry without re-decoding.
    pub fn load(&self, data_code: &str) -> Result<(), DecodeError> {
        let data_code = data_code.trim();

        if let Some(current) = self.current() {
            if current.data_code == data_code {
                return Ok(());
            }
        }

        let plan = FightPlan::decode(data_code)?;
        log::info!("strategy loaded: '{}'", plan.scenario_name);
        *self.current.write().unwrap() = Some(Arc::new(plan));
        Ok(())
    }

    /// Drop the current plan; sessions fall back to reactive mode.
    pub fn clear(&self) {
        let mut current = self.current.write().unwrap();
        if current.take().is_some() {
            log::info!("strategy cleared");
        }
    }

    /// Snapshot of the current plan, if any.
    pub fn current(&self) -> Option<Arc<FightPlan>> {
        self.current.read().unwrap().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.read().unwrap().is_some()
    }
}
