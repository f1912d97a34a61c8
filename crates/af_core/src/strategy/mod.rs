//! Strategy loading: data-code decoding, timeline construction, and the
//! process-wide plan registry.

pub mod codec;
pub mod registry;
pub mod timeline;

#[cfg(test)]
pub(crate) mod test_support;

pub use codec::{decode_data_code, RawAction, Scenario, StrategyDoc, SystemConstants, Track};
pub use registry::StrategyRegistry;
pub use timeline::{EventKind, FightPlan, ScheduledEvent};
