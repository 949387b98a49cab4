// Controller - owns every mode and runs the active one
//
// Per tick: forward input events to the active mode, flip to the requested
// mode if the active one is done, then update whichever mode is active.

use super::{GameContext, Mode, ModeId};
use crate::battle::BattleMode;
use crate::error::GameError;
use crate::gui::{CreditsMode, DeathSceneMode, InstructionsMode, LoadGameMode, MainMenuMode};
use crate::input_system::{InputEvent, Key};
use crate::level::LevelMode;
use crate::render::Frame;
use crate::shop::ShopMode;
use log::info;
use std::collections::HashMap;

pub struct Controller {
    modes: HashMap<ModeId, Box<dyn Mode>>,
    current: ModeId,
    quit: bool,
}

impl Controller {
    pub fn new(start: ModeId) -> Self {
        Controller {
            modes: HashMap::new(),
            current: start,
            quit: false,
        }
    }

    /// The full game, starting on the title screen.
    pub fn with_all_modes() -> Self {
        let mut controller = Self::new(ModeId::MainMenu);
        controller.register(Box::new(MainMenuMode::new()));
        controller.register(Box::new(InstructionsMode::new()));
        controller.register(Box::new(LoadGameMode::new()));
        for level in ModeId::LEVELS {
            controller.register(Box::new(LevelMode::new(level)));
        }
        for shop in ModeId::SHOPS {
            controller.register(Box::new(ShopMode::new(shop)));
        }
        controller.register(Box::new(BattleMode::new()));
        controller.register(Box::new(DeathSceneMode::new()));
        controller.register(Box::new(CreditsMode::new()));
        controller
    }

    /// Adds a mode under its own id, replacing any previous one.
    pub fn register(&mut self, mode: Box<dyn Mode>) {
        self.modes.insert(mode.id(), mode);
    }

    pub fn current(&self) -> ModeId {
        self.current
    }

    pub fn mode(&self, id: ModeId) -> Option<&dyn Mode> {
        self.modes.get(&id).map(|mode| mode.as_ref())
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Starts the initial mode.
    pub fn start(&mut self, ctx: &mut GameContext) -> Result<(), GameError> {
        let current = self.current;
        let mode = self
            .modes
            .get_mut(&current)
            .ok_or(GameError::UnknownMode(current))?;
        info!("starting in {}", current);
        mode.startup(ctx)?;
        ctx.mixer.play(current);
        Ok(())
    }

    /// One frame of game logic.
    pub fn tick(&mut self, events: &[InputEvent], ctx: &mut GameContext) -> Result<(), GameError> {
        let current = self.current;
        let mode = self
            .modes
            .get_mut(&current)
            .ok_or(GameError::UnknownMode(current))?;

        for &event in events {
            match event {
                InputEvent::Quit | InputEvent::KeyDown(Key::Quit) => self.quit = true,
                _ => {}
            }
            ctx.keys.apply(event);
            mode.get_event(event, ctx);
        }

        if mode.status().done {
            mode.status_mut().done = false;
            self.flip_state(ctx)?;
        }

        let current = self.current;
        let mode = self
            .modes
            .get_mut(&current)
            .ok_or(GameError::UnknownMode(current))?;
        mode.update(ctx)
    }

    /// Switches to the active mode's requested next mode.
    pub fn flip_state(&mut self, ctx: &mut GameContext) -> Result<(), GameError> {
        let previous = self.current;
        let next = self
            .modes
            .get(&previous)
            .and_then(|mode| mode.status().next)
            .ok_or(GameError::MissingNextMode(previous))?;

        let incoming = self
            .modes
            .get_mut(&next)
            .ok_or(GameError::UnknownMode(next))?;

        info!("mode switch: {} -> {}", previous, next);
        self.current = next;
        incoming.status_mut().previous = Some(previous);
        incoming.startup(ctx)?;
        ctx.mixer.play(next);
        Ok(())
    }

    pub fn draw(&self, ctx: &GameContext, frame: &mut Frame) {
        if let Some(mode) = self.modes.get(&self.current) {
            mode.draw(ctx, frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssets;
    use crate::game::ModeStatus;
    use crate::timer::ManualClock;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Leaves for `target` as soon as it sees a confirm press.
    struct StubMode {
        id: ModeId,
        target: ModeId,
        song: Option<&'static str>,
        status: ModeStatus,
        startups: Rc<Cell<u32>>,
    }

    impl StubMode {
        fn new(id: ModeId, target: ModeId, song: Option<&'static str>) -> Self {
            StubMode {
                id,
                target,
                song,
                status: ModeStatus::default(),
                startups: Rc::new(Cell::new(0)),
            }
        }
    }

    impl Mode for StubMode {
        fn id(&self) -> ModeId {
            self.id
        }

        fn status(&self) -> &ModeStatus {
            &self.status
        }

        fn status_mut(&mut self) -> &mut ModeStatus {
            &mut self.status
        }

        fn startup(&mut self, ctx: &mut GameContext) -> Result<(), GameError> {
            self.startups.set(self.startups.get() + 1);
            ctx.mixer.set_level_song(self.id, self.song);
            Ok(())
        }

        fn get_event(&mut self, event: InputEvent, _ctx: &mut GameContext) {
            if event == InputEvent::KeyDown(Key::Confirm) {
                self.status.finish(self.target);
            }
        }

        fn update(&mut self, _ctx: &mut GameContext) -> Result<(), GameError> {
            Ok(())
        }

        fn draw(&self, _ctx: &GameContext, frame: &mut Frame) {
            frame.text(self.id.as_str(), 0, 0, 12, crate::render::Color::WHITE);
        }
    }

    fn context() -> GameContext {
        GameContext::headless(ManualClock::new(), MemoryAssets::new(), 1)
    }

    #[test]
    fn test_mode_switch_updates_previous_and_music() {
        let mut ctx = context();
        let mut controller = Controller::new(ModeId::MainMenu);
        controller.register(Box::new(StubMode::new(ModeId::MainMenu, ModeId::Town, Some("kings_theme"))));
        let town = StubMode::new(ModeId::Town, ModeId::MainMenu, Some("town_theme"));
        let town_startups = town.startups.clone();
        controller.register(Box::new(town));

        controller.start(&mut ctx).unwrap();
        assert_eq!(ctx.mixer.current_track(), Some("kings_theme"));

        controller.tick(&[InputEvent::KeyDown(Key::Confirm)], &mut ctx).unwrap();
        assert!(ctx.keys.is_held(Key::Confirm));
        assert_eq!(controller.current(), ModeId::Town);
        assert_eq!(controller.mode(ModeId::Town).unwrap().status().previous, Some(ModeId::MainMenu));
        assert!(!controller.mode(ModeId::MainMenu).unwrap().status().done);
        assert_eq!(ctx.mixer.current_track(), Some("town_theme"));
        assert_eq!(town_startups.get(), 1);

        let mut frame = Frame::new();
        controller.draw(&ctx, &mut frame);
        assert_eq!(frame.texts(), vec!["town"]);
    }

    #[test]
    fn test_mode_may_restart_itself() {
        let mut ctx = context();
        let mut controller = Controller::new(ModeId::Battle);
        let battle = StubMode::new(ModeId::Battle, ModeId::Battle, None);
        let battle_startups = battle.startups.clone();
        controller.register(Box::new(battle));
        controller.start(&mut ctx).unwrap();

        controller.tick(&[InputEvent::KeyDown(Key::Confirm)], &mut ctx).unwrap();

        assert_eq!(controller.current(), ModeId::Battle);
        assert_eq!(controller.mode(ModeId::Battle).unwrap().status().previous, Some(ModeId::Battle));
        assert_eq!(battle_startups.get(), 2);
    }

    #[test]
    fn test_unknown_mode_is_fatal() {
        let mut ctx = context();
        let mut controller = Controller::new(ModeId::MainMenu);
        controller.register(Box::new(StubMode::new(ModeId::MainMenu, ModeId::Castle, None)));
        controller.start(&mut ctx).unwrap();

        let err = controller
            .tick(&[InputEvent::KeyDown(Key::Confirm)], &mut ctx)
            .unwrap_err();
        assert!(matches!(err, GameError::UnknownMode(ModeId::Castle)));
    }

    #[test]
    fn test_unregistered_start_mode() {
        let mut ctx = context();
        let mut controller = Controller::new(ModeId::Credits);
        assert!(matches!(controller.start(&mut ctx), Err(GameError::UnknownMode(ModeId::Credits))));
    }

    #[test]
    fn test_quit_event() {
        let mut ctx = context();
        let mut controller = Controller::new(ModeId::MainMenu);
        controller.register(Box::new(StubMode::new(ModeId::MainMenu, ModeId::Town, None)));
        controller.start(&mut ctx).unwrap();

        controller.tick(&[InputEvent::Quit], &mut ctx).unwrap();
        assert!(controller.should_quit());
    }

    #[test]
    fn test_all_modes_registered() {
        let controller = Controller::with_all_modes();
        for id in ModeId::ALL {
            assert!(controller.mode(id).is_some(), "{} missing", id);
        }
    }
}
