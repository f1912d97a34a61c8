//! The timeline scheduler.
//!
//! One tick per captured frame. The cursor walks the plan's events as
//! logical time passes; whenever an event's precondition is not met the
//! clock pauses so the rest of the plan does not drift, and the scheduler
//! grinds out benign actions until the world catches up.

use std::sync::Arc;
use std::time::Instant;

use crate::constants::ULTIMATE_KEY_HOLD;
use crate::engine::actions::{ActionKind, ActionRequest};
use crate::engine::link_backlog::LinkBacklog;
use crate::engine::observation::Observation;
use crate::engine::pause_clock::PauseClock;
use crate::strategy::timeline::{EventKind, FightPlan, ScheduledEvent};

/// Sub-mode in which the cursor is frozen on an ultimate event whose
/// preconditions did not hold when it came due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// The ultimate gauge is not charged yet: grind the operator's own
    /// skill to build it (or plain attacks when SP is dry).
    RetryUltimate { operator: u8, required_slots: u8 },
    /// The gauge is charged but energy slots are short: attack until the
    /// required slots are available.
    WaitForSp { operator: u8, required_slots: u8 },
}

#[derive(Debug)]
pub struct Scheduler {
    plan: Arc<FightPlan>,
    cursor: usize,
    /// Created on the first tick; `None` means the battle has not started.
    clock: Option<PauseClock>,
    recovery: Option<Recovery>,
    backlog: LinkBacklog,
}

impl Scheduler {
    pub fn new(plan: Arc<FightPlan>) -> Self {
        Self { plan, cursor: 0, clock: None, recovery: None, backlog: LinkBacklog::new() }
    }

    pub fn plan(&self) -> &Arc<FightPlan> {
        &self.plan
    }

    /// Next event index; equals the event count once the rotation finished.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn in_recovery(&self) -> bool {
        self.recovery.is_some()
    }

    pub fn recovery(&self) -> Option<Recovery> {
        self.recovery
    }

    pub fn is_paused(&self) -> bool {
        self.clock.as_ref().is_some_and(PauseClock::is_paused)
    }

    pub fn pending_links(&self) -> usize {
        self.backlog.len()
    }

    /// Back to the pre-battle state: cursor at zero, clock unset, backlog
    /// empty, no recovery.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.clock = None;
        self.recovery = None;
        self.backlog.clear();
    }

    /// Advance the schedule by one frame and return the actions to enqueue.
    ///
    /// Requests carry absolute execute instants; everything fires at `now`
    /// except the `UltimateUp` that trails its `UltimateDown` by the key
    /// hold time.
    pub fn tick(&mut self, obs: &Observation, now: Instant) -> Vec<ActionRequest> {
        let mut actions = Vec::new();

        if self.clock.is_none() {
            self.clock = Some(PauseClock::start(now));
            log::info!("timeline started ({} events)", self.plan.events.len());
        }

        self.backlog.expire(now);

        // Armed combos fire the moment the UI offers them, in any state
        if obs.combo_available && self.backlog.try_consume(now) {
            actions.push(ActionRequest::new(now, ActionKind::Combo));
            log::debug!("combo fired, {} still pending", self.backlog.len());
        }

        if self.recovery.is_some() {
            self.tick_recovery(obs, now, &mut actions);
            return actions;
        }

        if self.cursor >= self.plan.events.len() {
            self.tick_timeline_end(obs, now, &mut actions);
            return actions;
        }

        let Some(&event) = self.plan.events.get(self.cursor) else {
            // Unreachable given the bounds check above; recover anyway
            debug_assert!(false, "cursor {} out of range", self.cursor);
            log::error!("no event at cursor {}, resetting timeline", self.cursor);
            self.reset();
            return actions;
        };

        if self.elapsed_seconds(now) < event.t_seconds {
            actions.push(ActionRequest::new(now, ActionKind::Attack));
            return actions;
        }

        self.fire_event(event, obs, now, &mut actions);
        actions
    }

    fn elapsed_seconds(&self, now: Instant) -> f64 {
        self.clock.as_ref().map_or(0.0, |clock| clock.elapsed_seconds(now))
    }

    fn fire_event(
        &mut self,
        event: ScheduledEvent,
        obs: &Observation,
        now: Instant,
        actions: &mut Vec<ActionRequest>,
    ) {
        match event.kind {
            EventKind::SwitchOperator => {
                actions.push(ActionRequest::for_operator(
                    now,
                    ActionKind::SwitchOperator,
                    event.operator,
                ));
                self.cursor += 1;
                log::debug!("switch to operator {} (t={:.2})", event.operator, event.t_seconds);
            }

            EventKind::Skill => {
                if obs.energy_slots >= 1 {
                    actions.push(ActionRequest::for_operator(
                        now,
                        ActionKind::Skill,
                        event.operator,
                    ));
                    self.cursor += 1;
                    // If the skill had been stalling on SP the clock is
                    // paused; the wait is over, so logical time moves again
                    if let Some(clock) = &mut self.clock {
                        clock.resume(now);
                    }
                    log::debug!("skill for operator {} (t={:.2})", event.operator, event.t_seconds);
                } else {
                    if let Some(clock) = &mut self.clock {
                        clock.pause(now);
                    }
                    actions.push(ActionRequest::new(now, ActionKind::Attack));
                    log::debug!("skill for operator {} gated on sp", event.operator);
                }
            }

            EventKind::Link => {
                self.backlog.enqueue(now);
                self.cursor += 1;
                log::debug!("link armed (t={:.2})", event.t_seconds);
            }

            EventKind::Ultimate => {
                let ready = obs.ultimate_ready.contains(event.operator);
                let sp_ok = obs.energy_slots >= event.sp_slots_required;

                if ready && sp_ok {
                    push_ultimate(actions, now, event.operator);
                    self.cursor += 1;
                    log::debug!(
                        "ultimate for operator {} (t={:.2})",
                        event.operator,
                        event.t_seconds
                    );
                } else {
                    if let Some(clock) = &mut self.clock {
                        clock.pause(now);
                    }
                    if !ready {
                        self.recovery = Some(Recovery::RetryUltimate {
                            operator: event.operator,
                            required_slots: event.sp_slots_required,
                        });
                        // Foreground the operator so the grinding skills
                        // below land on the right character
                        actions.push(ActionRequest::for_operator(
                            now,
                            ActionKind::SwitchOperator,
                            event.operator,
                        ));
                        log::debug!(
                            "ultimate for operator {} not charged, grinding",
                            event.operator
                        );
                    } else {
                        self.recovery = Some(Recovery::WaitForSp {
                            operator: event.operator,
                            required_slots: event.sp_slots_required,
                        });
                        actions.push(ActionRequest::new(now, ActionKind::Attack));
                        log::debug!(
                            "ultimate for operator {} waiting for sp ({}/{})",
                            event.operator,
                            obs.energy_slots,
                            event.sp_slots_required
                        );
                    }
                }
            }

            EventKind::Dodge => {
                actions.push(ActionRequest::new(now, ActionKind::Dodge));
                self.cursor += 1;
                log::debug!("dodge (t={:.2})", event.t_seconds);
            }
        }
    }

    fn tick_recovery(&mut self, obs: &Observation, now: Instant, actions: &mut Vec<ActionRequest>) {
        let Some(recovery) = self.recovery else { return };

        match recovery {
            Recovery::RetryUltimate { operator, required_slots } => {
                if obs.ultimate_ready.contains(operator) {
                    if obs.energy_slots >= required_slots {
                        self.complete_ultimate(operator, now, actions);
                    } else {
                        self.recovery =
                            Some(Recovery::WaitForSp { operator, required_slots });
                        actions.push(ActionRequest::new(now, ActionKind::Attack));
                        log::debug!(
                            "ultimate for operator {} charged, now waiting for sp ({}/{})",
                            operator,
                            obs.energy_slots,
                            required_slots
                        );
                    }
                } else if obs.energy_slots >= 1 {
                    // Build gauge with the operator's own skill
                    actions.push(ActionRequest::for_operator(now, ActionKind::Skill, operator));
                } else {
                    actions.push(ActionRequest::new(now, ActionKind::Attack));
                }
            }

            Recovery::WaitForSp { operator, required_slots } => {
                if obs.energy_slots >= required_slots {
                    self.complete_ultimate(operator, now, actions);
                } else {
                    actions.push(ActionRequest::new(now, ActionKind::Attack));
                }
            }
        }
    }

    fn complete_ultimate(&mut self, operator: u8, now: Instant, actions: &mut Vec<ActionRequest>) {
        push_ultimate(actions, now, operator);
        self.cursor += 1;
        self.recovery = None;
        if let Some(clock) = &mut self.clock {
            clock.resume(now);
        }
        log::info!("ultimate recovered for operator {}", operator);
    }

    /// Past the last event: grind attacks until energy is back to the
    /// plan's starting level, then run the whole rotation again.
    fn tick_timeline_end(
        &mut self,
        obs: &Observation,
        now: Instant,
        actions: &mut Vec<ActionRequest>,
    ) {
        if obs.energy_slots >= self.plan.initial_sp_slots {
            self.cursor = 0;
            self.clock = Some(PauseClock::start(now));
            self.recovery = None;
            self.backlog.clear();
            log::info!("timeline loop restarted");
        } else {
            actions.push(ActionRequest::new(now, ActionKind::Attack));
        }
    }
}

fn push_ultimate(actions: &mut Vec<ActionRequest>, now: Instant, operator: u8) {
    actions.push(ActionRequest::for_operator(now, ActionKind::UltimateDown, operator));
    actions.push(ActionRequest::for_operator(
        now + ULTIMATE_KEY_HOLD,
        ActionKind::UltimateUp,
        operator,
    ));
}
