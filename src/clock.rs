use serde::{Deserialize, Serialize};

use crate::graph::GraphModel;
use crate::physics::ForceSolver;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClockConfig {
    pub alpha_min: f64,
    pub alpha_decay: f64,
    /// Alpha held while a node is being dragged.
    pub drag_alpha: f64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            alpha_min: 0.001,
            alpha_decay: 0.0228,
            drag_alpha: 0.3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ClockState {
    /// Nothing scheduled.
    Idle,
    /// Ticking with alpha excited by a start or a drag.
    Running,
    /// Ticking, alpha decaying freely toward `alpha_min`.
    Settling,
}

/// Owns alpha and decides whether the next display frame runs a solver step.
#[derive(Clone, Debug)]
pub struct SimulationClock {
    config: ClockConfig,
    alpha: f64,
    hold: Option<f64>,
    state: ClockState,
    ticks: u64,
}

impl SimulationClock {
    pub fn new(config: ClockConfig) -> Self {
        Self {
            config,
            alpha: 0.0,
            hold: None,
            state: ClockState::Idle,
            ticks: 0,
        }
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Ticks run since the last `start`.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_scheduled(&self) -> bool {
        self.state != ClockState::Idle
    }

    pub fn start(&mut self) {
        self.alpha = 1.0;
        self.hold = None;
        self.ticks = 0;
        self.transition(ClockState::Running);
    }

    /// Raises alpha to at least `target` and keeps it there until [`Self::cool`].
    pub fn reheat(&mut self, target: f64) {
        let target = target.clamp(0.0, 1.0);
        self.alpha = self.alpha.max(target);
        self.hold = Some(target);
        self.transition(ClockState::Running);
    }

    pub fn cool(&mut self) {
        if self.hold.take().is_some() && self.state == ClockState::Running {
            self.transition(ClockState::Settling);
        }
    }

    pub fn stop(&mut self) {
        self.hold = None;
        self.alpha = 0.0;
        self.transition(ClockState::Idle);
    }

    /// Runs one solver step if a tick is scheduled. Returns whether it ran.
    pub fn tick(&mut self, solver: &mut ForceSolver, model: &mut GraphModel) -> bool {
        if self.state == ClockState::Idle {
            return false;
        }

        self.alpha *= 1.0 - self.config.alpha_decay;
        match self.hold {
            Some(hold) => self.alpha = self.alpha.max(hold),
            None => self.transition(ClockState::Settling),
        }

        solver.step(model, self.alpha as f32);
        self.ticks += 1;

        if self.alpha < self.config.alpha_min {
            tracing::debug!(ticks = self.ticks, "layout converged");
            self.alpha = 0.0;
            self.transition(ClockState::Idle);
        }
        true
    }

    fn transition(&mut self, next: ClockState) {
        if self.state != next {
            tracing::trace!(from = ?self.state, to = ?next, alpha = self.alpha, "clock transition");
            self.state = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeData, ScatterConfig};
    use crate::physics::ForceConfig;

    fn fixture() -> (ForceSolver, GraphModel) {
        let model = GraphModel::build(
            &[NodeData::new("a"), NodeData::new("b")],
            &[],
            &ScatterConfig::default(),
        )
        .unwrap();
        (ForceSolver::new(ForceConfig::default()), model)
    }

    #[test]
    fn new_clock_is_idle() {
        let (mut solver, mut model) = fixture();
        let mut clock = SimulationClock::new(ClockConfig::default());
        assert_eq!(clock.state(), ClockState::Idle);
        assert!(!clock.tick(&mut solver, &mut model));
    }

    #[test]
    fn default_schedule_settles_in_300_ticks() {
        let (mut solver, mut model) = fixture();
        let mut clock = SimulationClock::new(ClockConfig::default());
        clock.start();
        assert_eq!(clock.state(), ClockState::Running);

        while clock.tick(&mut solver, &mut model) {}
        assert_eq!(clock.ticks(), 300);
        assert_eq!(clock.state(), ClockState::Idle);
        assert_eq!(clock.alpha(), 0.0);
    }

    #[test]
    fn first_free_tick_moves_to_settling() {
        let (mut solver, mut model) = fixture();
        let mut clock = SimulationClock::new(ClockConfig::default());
        clock.start();
        clock.tick(&mut solver, &mut model);
        assert_eq!(clock.state(), ClockState::Settling);
    }

    #[test]
    fn reheat_holds_alpha_until_cooled() {
        let (mut solver, mut model) = fixture();
        let mut clock = SimulationClock::new(ClockConfig::default());

        clock.reheat(0.3);
        assert_eq!(clock.state(), ClockState::Running);
        for _ in 0..500 {
            assert!(clock.tick(&mut solver, &mut model));
        }
        assert_eq!(clock.alpha(), 0.3);
        assert_eq!(clock.state(), ClockState::Running);

        clock.cool();
        assert_eq!(clock.state(), ClockState::Settling);
        clock.tick(&mut solver, &mut model);
        assert!(clock.alpha() < 0.3);
    }

    #[test]
    fn reheat_never_lowers_alpha() {
        let mut clock = SimulationClock::new(ClockConfig::default());
        clock.start();
        clock.reheat(0.3);
        assert_eq!(clock.alpha(), 1.0);
    }

    #[test]
    fn stop_is_idempotent() {
        let (mut solver, mut model) = fixture();
        let mut clock = SimulationClock::new(ClockConfig::default());
        clock.start();
        clock.stop();
        clock.stop();
        assert!(!clock.is_scheduled());
        assert!(!clock.tick(&mut solver, &mut model));
        assert_eq!(clock.ticks(), 0);
    }
}
