//! The battle session: one value per fight, fed every captured frame.
//!
//! The session decides whether the frame belongs to a battle at all, picks
//! between timeline-driven and reactive mode, runs the matching policy, and
//! drains whatever actions have come due. Leaving battle (level overlay, or
//! ten seconds without the battle UI) resets everything so the next entry
//! starts from scratch.

use std::sync::Arc;
use std::time::Instant;

use crate::constants::{
    DODGE_REACTION_DELAY, LOCK_TARGET_DELAY, OPERATOR_COUNT, OUT_OF_BATTLE_GRACE,
    ULTIMATE_KEY_HOLD,
};
use crate::engine::action_queue::ActionQueue;
use crate::engine::actions::{ActionKind, ActionRequest};
use crate::engine::observation::FrameObservation;
use crate::engine::scheduler::Scheduler;
use crate::strategy::registry::StrategyRegistry;
use crate::strategy::timeline::FightPlan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Not in battle.
    Idle,
    /// A loaded timeline drives the actions.
    Scripted,
    /// No timeline; actions are chosen per frame from observations.
    Reactive,
}

pub struct BattleSession {
    registry: Arc<StrategyRegistry>,
    mode: SessionMode,
    scheduler: Option<Scheduler>,
    queue: ActionQueue,
    /// Reactive mode rotates skills over the party, 1..=4.
    skill_cycle: u8,
    /// Latch for the one-shot target lock in reactive mode.
    enemy_seen: bool,
    out_of_battle_since: Option<Instant>,
}

impl BattleSession {
    pub fn new(registry: Arc<StrategyRegistry>) -> Self {
        Self {
            registry,
            mode: SessionMode::Idle,
            scheduler: None,
            queue: ActionQueue::new(),
            skill_cycle: 1,
            enemy_seen: false,
            out_of_battle_since: None,
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Actions waiting in the queue (due or future).
    pub fn pending_actions(&self) -> usize {
        self.queue.len()
    }

    pub fn scheduler(&self) -> Option<&Scheduler> {
        self.scheduler.as_ref()
    }

    /// Process one captured frame and return the actions due right now, in
    /// execution order.
    pub fn on_frame(&mut self, frame: &FrameObservation) -> Vec<ActionRequest> {
        let now = frame.now;

        // The level overlay only shows once the battle is over
        if frame.character_level_shown {
            if self.mode != SessionMode::Idle {
                log::info!("character level overlay shown, leaving battle");
            }
            self.reset();
            return Vec::new();
        }

        // Battle UI gone: pause through short flickers (menus, cutscenes),
        // give up for real after the grace period
        if !frame.in_battle_ui {
            let since = match self.out_of_battle_since {
                Some(since) => since,
                None => {
                    log::info!("battle ui lost, starting grace timer");
                    self.out_of_battle_since = Some(now);
                    now
                }
            };
            if now.saturating_duration_since(since) >= OUT_OF_BATTLE_GRACE {
                log::info!("out of battle past grace period, resetting");
                self.reset();
            }
            return Vec::new();
        }
        self.out_of_battle_since = None;

        match self.registry.current() {
            Some(plan) => self.scripted_frame(plan, frame, now),
            None => self.reactive_frame(frame, now),
        }

        self.queue.drain_due(now)
    }

    /// Empty the queue and forget all battle state; the next in-battle
    /// frame starts a fresh session.
    pub fn reset(&mut self) {
        self.mode = SessionMode::Idle;
        self.scheduler = None;
        self.queue.clear();
        self.skill_cycle = 1;
        self.enemy_seen = false;
        self.out_of_battle_since = None;
    }

    fn scripted_frame(&mut self, plan: Arc<FightPlan>, frame: &FrameObservation, now: Instant) {
        // A different plan instance means the user swapped strategies
        // mid-battle: start over rather than resume an unrelated rotation
        let swapped = self
            .scheduler
            .as_ref()
            .is_some_and(|scheduler| !Arc::ptr_eq(scheduler.plan(), &plan));
        if swapped {
            log::info!("strategy swapped mid-battle, restarting session");
            self.reset();
        }

        if self.scheduler.is_none() {
            self.scheduler = Some(Scheduler::new(plan));
        }
        self.mode = SessionMode::Scripted;

        let obs = frame.combat();
        if let Some(scheduler) = &mut self.scheduler {
            for request in scheduler.tick(&obs, now) {
                self.queue.enqueue(request);
            }
        }
    }

    fn reactive_frame(&mut self, frame: &FrameObservation, now: Instant) {
        if self.mode == SessionMode::Scripted {
            log::info!("strategy cleared mid-battle, falling back to reactive mode");
            self.scheduler = None;
        }
        self.mode = SessionMode::Reactive;

        // Lock the camera once, the first time an enemy shows up
        if !self.enemy_seen && frame.enemy_visible {
            self.enemy_seen = true;
            self.queue
                .enqueue(ActionRequest::new(now + LOCK_TARGET_DELAY, ActionKind::LockTarget));
        }

        if frame.enemy_attacking {
            self.queue
                .enqueue(ActionRequest::new(now + DODGE_REACTION_DELAY, ActionKind::Dodge));
        } else {
            self.queue.enqueue(ActionRequest::new(now, ActionKind::Attack));
        }

        // A showing combo never waits; it fires alongside whatever else
        // this frame produces
        if frame.combo_available {
            self.queue.enqueue(ActionRequest::new(now, ActionKind::Combo));
        }

        if let Some(operator) = frame.ultimate_ready.smallest() {
            self.queue
                .enqueue(ActionRequest::for_operator(now, ActionKind::UltimateDown, operator));
            self.queue.enqueue(ActionRequest::for_operator(
                now + ULTIMATE_KEY_HOLD,
                ActionKind::UltimateUp,
                operator,
            ));
        } else if frame.energy_slots >= 1 {
            self.queue
                .enqueue(ActionRequest::for_operator(now, ActionKind::Skill, self.skill_cycle));
            self.skill_cycle = self.skill_cycle % OPERATOR_COUNT + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::observation::UltimateReady;
    use crate::strategy::test_support::{encode_data_code, raw_action, single_track_doc};
    use std::time::Duration;

    fn empty_registry() -> Arc<StrategyRegistry> {
        Arc::new(StrategyRegistry::new())
    }

    fn loaded_registry() -> Arc<StrategyRegistry> {
        let registry = StrategyRegistry::new();
        let code = encode_data_code(&single_track_doc(vec![raw_action("dodge", 0.0)]));
        registry.load(&code).unwrap();
        Arc::new(registry)
    }

    fn in_battle(now: Instant) -> FrameObservation {
        FrameObservation {
            in_battle_ui: true,
            in_fight_space: true,
            ..FrameObservation::new(now)
        }
    }

    fn kinds(actions: &[ActionRequest]) -> Vec<ActionKind> {
        actions.iter().map(|a| a.kind).collect()
    }

    #[test]
    fn test_mode_selection_per_frame() {
        let base = Instant::now();

        let mut session = BattleSession::new(empty_registry());
        session.on_frame(&in_battle(base));
        assert_eq!(session.mode(), SessionMode::Reactive);

        let mut session = BattleSession::new(loaded_registry());
        session.on_frame(&in_battle(base));
        assert_eq!(session.mode(), SessionMode::Scripted);
    }

    #[test]
    fn test_reactive_attack_by_default() {
        let base = Instant::now();
        let mut session = BattleSession::new(empty_registry());

        let actions = session.on_frame(&in_battle(base));
        assert_eq!(kinds(&actions), vec![ActionKind::Attack]);
    }

    #[test]
    fn test_reactive_dodge_is_delayed() {
        let base = Instant::now();
        let mut session = BattleSession::new(empty_registry());

        let frame = FrameObservation { enemy_attacking: true, ..in_battle(base) };
        let actions = session.on_frame(&frame);
        // 100ms reaction delay: not due yet
        assert!(actions.is_empty());
        assert_eq!(session.pending_actions(), 1);

        let later = in_battle(base + DODGE_REACTION_DELAY);
        let actions = session.on_frame(&later);
        assert!(kinds(&actions).contains(&ActionKind::Dodge));
    }

    #[test]
    fn test_reactive_lock_target_fires_once() {
        let base = Instant::now();
        let mut session = BattleSession::new(empty_registry());

        let frame = FrameObservation { enemy_visible: true, ..in_battle(base) };
        session.on_frame(&frame);

        let later = FrameObservation {
            enemy_visible: true,
            ..in_battle(base + Duration::from_millis(50))
        };
        let actions = session.on_frame(&later);
        let lock_count =
            kinds(&actions).iter().filter(|k| **k == ActionKind::LockTarget).count();
        assert_eq!(lock_count, 1);

        // Seen latch holds: no further locks
        let much_later = FrameObservation {
            enemy_visible: true,
            ..in_battle(base + Duration::from_secs(1))
        };
        let actions = session.on_frame(&much_later);
        assert!(!kinds(&actions).contains(&ActionKind::LockTarget));
    }

    #[test]
    fn test_reactive_combo_fires_alongside_ultimate() {
        let base = Instant::now();
        let mut session = BattleSession::new(empty_registry());

        // Combo is its own step; it never displaces the ultimate, which in
        // turn still shadows the skill cycle
        let frame = FrameObservation {
            combo_available: true,
            ultimate_ready: UltimateReady::from_operators(&[1]),
            energy_slots: 3,
            ..in_battle(base)
        };
        let actions = session.on_frame(&frame);
        let kinds = kinds(&actions);
        assert!(kinds.contains(&ActionKind::Combo));
        assert!(kinds.contains(&ActionKind::UltimateDown));
        assert!(!kinds.contains(&ActionKind::Skill));
    }

    #[test]
    fn test_reactive_combo_fires_alongside_skill() {
        let base = Instant::now();
        let mut session = BattleSession::new(empty_registry());

        let frame = FrameObservation {
            combo_available: true,
            energy_slots: 2,
            ..in_battle(base)
        };
        let actions = session.on_frame(&frame);
        let kinds = kinds(&actions);
        assert!(kinds.contains(&ActionKind::Combo));
        assert!(kinds.contains(&ActionKind::Skill));
    }

    #[test]
    fn test_reactive_ultimate_picks_smallest_ready() {
        let base = Instant::now();
        let mut session = BattleSession::new(empty_registry());

        let frame = FrameObservation {
            ultimate_ready: UltimateReady::from_operators(&[4, 2]),
            energy_slots: 3,
            ..in_battle(base)
        };
        let actions = session.on_frame(&frame);
        let down = actions.iter().find(|a| a.kind == ActionKind::UltimateDown).unwrap();
        assert_eq!(down.operator, 2);
        // Matching key-up is still pending, 1500ms out
        assert_eq!(session.pending_actions(), 1);

        let later = in_battle(base + ULTIMATE_KEY_HOLD);
        let actions = session.on_frame(&later);
        let up = actions.iter().find(|a| a.kind == ActionKind::UltimateUp).unwrap();
        assert_eq!(up.operator, 2);
    }

    #[test]
    fn test_reactive_skill_cycles_through_party() {
        let base = Instant::now();
        let mut session = BattleSession::new(empty_registry());

        let mut seen = Vec::new();
        for i in 0..5 {
            let frame = FrameObservation {
                energy_slots: 1,
                ..in_battle(base + Duration::from_millis(i * 100))
            };
            let actions = session.on_frame(&frame);
            let skill = actions.iter().find(|a| a.kind == ActionKind::Skill).unwrap();
            seen.push(skill.operator);
        }
        assert_eq!(seen, vec![1, 2, 3, 4, 1]);
    }

    #[test]
    fn test_scripted_tick_reaches_queue() {
        let base = Instant::now();
        let mut session = BattleSession::new(loaded_registry());

        let actions = session.on_frame(&in_battle(base));
        assert_eq!(kinds(&actions), vec![ActionKind::Dodge]);
        assert_eq!(session.scheduler().unwrap().cursor(), 1);
    }

    #[test]
    fn test_character_level_overlay_resets() {
        let base = Instant::now();
        let mut session = BattleSession::new(loaded_registry());
        session.on_frame(&in_battle(base));
        assert_eq!(session.mode(), SessionMode::Scripted);

        let frame = FrameObservation {
            character_level_shown: true,
            ..FrameObservation::new(base + Duration::from_secs(1))
        };
        let actions = session.on_frame(&frame);
        assert!(actions.is_empty());
        assert_eq!(session.mode(), SessionMode::Idle);
        assert!(session.scheduler().is_none());
        assert_eq!(session.pending_actions(), 0);
    }

    #[test]
    fn test_out_of_battle_pause_through_then_timeout() {
        let base = Instant::now();
        let mut session = BattleSession::new(loaded_registry());
        session.on_frame(&in_battle(base));
        assert_eq!(session.scheduler().unwrap().cursor(), 1);

        // Short flicker: state survives
        let flicker = FrameObservation::new(base + Duration::from_secs(1));
        assert!(session.on_frame(&flicker).is_empty());
        assert!(session.scheduler().is_some());

        let back = in_battle(base + Duration::from_secs(2));
        session.on_frame(&back);
        assert!(session.scheduler().is_some());

        // Sustained absence: grace timer runs out and the session resets
        let gone = FrameObservation::new(base + Duration::from_secs(3));
        session.on_frame(&gone);
        let still_gone = FrameObservation::new(base + Duration::from_secs(3) + OUT_OF_BATTLE_GRACE);
        session.on_frame(&still_gone);
        assert_eq!(session.mode(), SessionMode::Idle);
        assert!(session.scheduler().is_none());

        // Re-entry starts the rotation from scratch
        let reentry = in_battle(base + Duration::from_secs(15));
        let actions = session.on_frame(&reentry);
        assert_eq!(kinds(&actions), vec![ActionKind::Dodge]);
        assert_eq!(session.scheduler().unwrap().cursor(), 1);
    }

    #[test]
    fn test_grace_timer_keys_on_battle_ui_alone() {
        let base = Instant::now();
        let mut session = BattleSession::new(empty_registry());

        // Fight-space marker dropping out does not interrupt combat as long
        // as the battle UI is still up
        let frame = FrameObservation {
            in_battle_ui: true,
            in_fight_space: false,
            ..FrameObservation::new(base)
        };
        let actions = session.on_frame(&frame);
        assert_eq!(kinds(&actions), vec![ActionKind::Attack]);
        assert_eq!(session.mode(), SessionMode::Reactive);

        // The reverse loses the battle UI and pauses through
        let frame = FrameObservation {
            in_battle_ui: false,
            in_fight_space: true,
            ..FrameObservation::new(base + Duration::from_millis(100))
        };
        assert!(session.on_frame(&frame).is_empty());
    }

    #[test]
    fn test_strategy_swap_mid_battle_resets() {
        let base = Instant::now();
        let registry = loaded_registry();
        let mut session = BattleSession::new(registry.clone());
        session.on_frame(&in_battle(base));
        assert_eq!(session.scheduler().unwrap().cursor(), 1);

        let code = encode_data_code(&single_track_doc(vec![
            raw_action("attack", 0.0),
            raw_action("dodge", 1.0),
        ]));
        registry.load(&code).unwrap();

        let actions = session.on_frame(&in_battle(base + Duration::from_millis(100)));
        // Fresh scheduler on the new plan, starting at its first event
        assert_eq!(kinds(&actions), vec![ActionKind::SwitchOperator]);
        assert_eq!(session.scheduler().unwrap().cursor(), 1);
        assert_eq!(session.scheduler().unwrap().plan().events.len(), 2);
    }

    #[test]
    fn test_strategy_clear_mid_battle_falls_back() {
        let base = Instant::now();
        let registry = loaded_registry();
        let mut session = BattleSession::new(registry.clone());
        session.on_frame(&in_battle(base));
        assert_eq!(session.mode(), SessionMode::Scripted);

        registry.clear();
        let actions = session.on_frame(&in_battle(base + Duration::from_millis(100)));
        assert_eq!(session.mode(), SessionMode::Reactive);
        assert!(session.scheduler().is_none());
        assert_eq!(kinds(&actions), vec![ActionKind::Attack]);
    }
}
