//! Game driver
//!
//! Owns the simulation context and runs it at a fixed rate from variable
//! frame callbacks. Menu start, restart and resize are handled here; the
//! simulation itself never leaves a terminal status on its own.

use std::time::Duration;

use crate::consts::SIM_DT;
use crate::platform::{CancelToken, Clock, FixedStep, InputHandle};
use crate::settings::Settings;
use crate::sim::{
    GameEvent, GameStatus, HudSnapshot, InputState, RenderSnapshot, SimulationContext, tick,
};

/// What happened during one frame
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    /// Fixed steps run this frame
    pub steps: u32,
    /// Gameplay events raised during those steps
    pub events: Vec<GameEvent>,
}

/// Game instance holding all state
pub struct Game {
    ctx: SimulationContext,
    stepper: FixedStep,
    input: InputHandle,
    settings: Settings,
    /// Previous step's input, for press detection
    last_input: InputState,
}

impl Game {
    /// New game sitting in the menu
    pub fn new(settings: Settings, input: InputHandle, now: f64) -> Self {
        let seed = settings.resolve_seed();
        log::info!("Trail Rider starting (seed {})", seed);
        Self {
            ctx: SimulationContext::new(seed, settings.level_width, settings.level_height, now),
            stepper: FixedStep::new(SIM_DT, settings.max_frame_dt),
            input,
            settings,
            last_input: InputState::default(),
        }
    }

    /// Run every fixed step due at `now`
    pub fn frame(&mut self, now: f64) -> FrameReport {
        let steps = self.stepper.frame(now);

        for _ in 0..steps {
            let input = self.input.snapshot();
            let acted = self.handle_commands(&input, now);
            self.last_input = input;
            if acted {
                continue;
            }
            self.ctx.input = input;
            tick(&mut self.ctx, now);
        }

        let events = self.ctx.drain_events();
        for event in &events {
            log::debug!("{:?}", event);
        }
        if steps > 0 {
            log::trace!("Frame ran {} steps", steps);
        }

        FrameReport { steps, events }
    }

    /// Start and restart keys; true when a command consumed the step
    fn handle_commands(&mut self, input: &InputState, now: f64) -> bool {
        let enter = input.enter && !self.last_input.enter;
        let space = input.space && !self.last_input.space;

        match self.ctx.status() {
            GameStatus::Menu if enter || space => {
                self.restart(now);
                true
            }
            GameStatus::Won | GameStatus::Dead if enter => {
                self.restart(now);
                true
            }
            _ => false,
        }
    }

    /// Full level re-initialization straight into play
    pub fn restart(&mut self, now: f64) {
        let (width, height) = (self.ctx.level_width, self.ctx.level_height);
        self.ctx.init_level(width, height, GameStatus::Playing, now);
        self.stepper.reset();
    }

    /// New level extents; regenerates the level only while in the menu
    pub fn resize(&mut self, width: f32, height: f32, now: f64) -> bool {
        if self.ctx.status() != GameStatus::Menu {
            log::debug!(
                "Ignoring resize to {}x{} during {:?}",
                width,
                height,
                self.ctx.status()
            );
            return false;
        }
        self.ctx.init_level(width, height, GameStatus::Menu, now);
        true
    }

    /// Frame loop: runs until `cancel` fires, then hands the game back
    ///
    /// Cancellation is checked before every frame, so no frame starts after
    /// the token is set.
    pub fn run<C, F>(mut self, clock: &C, cancel: &CancelToken, mut on_frame: F) -> Self
    where
        C: Clock,
        F: FnMut(&Game, &FrameReport, f64),
    {
        let fps = self.settings.target_fps.max(1);
        let interval = Duration::from_secs_f64(1.0 / fps as f64);

        while !cancel.is_cancelled() {
            let now = clock.now();
            let report = self.frame(now);
            on_frame(&self, &report, now);
            clock.wait(interval);
        }

        log::info!("Frame loop stopped");
        self
    }

    pub fn status(&self) -> GameStatus {
        self.ctx.status()
    }

    pub fn context(&self) -> &SimulationContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut SimulationContext {
        &mut self.ctx
    }

    pub fn input(&self) -> &InputHandle {
        &self.input
    }

    pub fn render_snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::capture(&self.ctx)
    }

    pub fn hud(&self, now: f64) -> HudSnapshot {
        HudSnapshot::capture(&self.ctx, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Key, ManualClock};
    use crate::sim::DeathCause;

    fn test_game() -> (Game, InputHandle) {
        let settings = Settings {
            seed: Some(11),
            level_width: 3000.0,
            ..Default::default()
        };
        let input = InputHandle::default();
        (Game::new(settings, input.clone(), 0.0), input)
    }

    #[test]
    fn test_menu_waits_for_start() {
        let (mut game, input) = test_game();
        game.frame(0.0);
        let report = game.frame(0.1);
        assert!(report.steps > 0);
        assert_eq!(game.status(), GameStatus::Menu);

        input.set(Key::Enter, true);
        game.frame(0.2);
        assert_eq!(game.status(), GameStatus::Playing);
        assert!(game.context().time_ticks > 0);
    }

    #[test]
    fn test_resize_only_in_menu() {
        let (mut game, input) = test_game();
        assert!(game.resize(5000.0, 600.0, 0.0));
        assert_eq!(game.context().level_width, 5000.0);
        assert_eq!(game.context().level_height, 600.0);
        assert!(game.context().terrain.surface().last().is_some_and(|v| v.x >= 5000.0));

        input.set(Key::Space, true);
        game.frame(0.0);
        game.frame(0.05);
        assert_eq!(game.status(), GameStatus::Playing);

        let ticks = game.context().time_ticks;
        assert!(!game.resize(3000.0, 900.0, 0.1));
        assert_eq!(game.context().level_width, 5000.0);
        assert_eq!(game.context().level_height, 600.0);
        assert_eq!(game.context().time_ticks, ticks);
    }

    #[test]
    fn test_dead_stays_dead_until_enter() {
        let (mut game, input) = test_game();
        game.restart(0.0);
        game.context_mut().die(DeathCause::Killer, 0.0);

        game.frame(0.0);
        let report = game.frame(0.1);
        assert!(report.steps > 0);
        assert_eq!(game.status(), GameStatus::Dead);

        input.set(Key::Enter, true);
        game.frame(0.2);
        assert_eq!(game.status(), GameStatus::Playing);
        assert_eq!(game.context().finished_at, None);
    }

    #[test]
    fn test_held_enter_does_not_restart_again() {
        let (mut game, input) = test_game();
        input.set(Key::Enter, true);
        game.frame(0.0);
        game.frame(0.1);
        assert_eq!(game.status(), GameStatus::Playing);
        let level = game.context().level_index;

        game.context_mut().die(DeathCause::Fell, 0.1);
        game.frame(0.2);
        // Still held from before: no new press, no restart
        assert_eq!(game.status(), GameStatus::Dead);
        assert_eq!(game.context().level_index, level);
    }

    #[test]
    fn test_run_stops_on_cancel() {
        let (game, input) = test_game();
        input.set(Key::Enter, true);
        let clock = ManualClock::new(0.0);
        let cancel = CancelToken::new();

        let mut frames = 0;
        let game = game.run(&clock, &cancel, |game, _report, _now| {
            frames += 1;
            if frames == 30 {
                assert_eq!(game.status(), GameStatus::Playing);
                cancel.cancel();
            }
        });

        assert_eq!(frames, 30);
        assert!(game.context().time_ticks > 0);
        assert!(clock.now() > 0.0);
    }

    #[test]
    fn test_hud_reports_elapsed() {
        let (mut game, _input) = test_game();
        game.restart(2.0);
        let hud = game.hud(5.0);
        assert_eq!(hud.status, GameStatus::Playing);
        assert_eq!(hud.elapsed_seconds, 3.0);
        assert_eq!(hud.total, game.context().apples.len());
    }
}
