//! Title screens
//!
//! Main menu -> instructions -> load game (only when a save exists) -> world.
//! The first two leave on any key press; the load-game screen offers
//! "Load Game" (continue in town) or "New Game" (start on the overworld).

use super::{Fade, Menu, MenuStyle};
use crate::collision::Rect;
use crate::error::GameError;
use crate::game::{GameContext, Mode, ModeId, ModeStatus};
use crate::input_system::InputEvent;
use crate::render::{Color, DrawCommand, Frame};
use log::{info, warn};

const TITLE_SONG: &str = "kings_theme";

/// The title map drawn behind every title screen, with a box on top.
fn draw_title_screen(frame: &mut Frame, ctx: &GameContext, box_image: &str) {
    let (width, height) = ctx.screen;
    frame.fill(Color::BLACK);
    frame.push(DrawCommand::MapLayer {
        map: "title".to_string(),
        viewport: Rect::new(0, 0, width, height),
    });
    frame.image(box_image, 80, height - 330);
}

/// True for a fresh key press that should advance a title screen.
fn is_key_press(event: InputEvent) -> bool {
    matches!(event, InputEvent::KeyDown(_))
}

pub struct MainMenuMode {
    status: ModeStatus,
    fade: Fade,
}

impl MainMenuMode {
    pub fn new() -> Self {
        MainMenuMode {
            status: ModeStatus::default(),
            fade: Fade::new(),
        }
    }
}

impl Default for MainMenuMode {
    fn default() -> Self {
        Self::new()
    }
}

impl Mode for MainMenuMode {
    fn id(&self) -> ModeId {
        ModeId::MainMenu
    }

    fn status(&self) -> &ModeStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut ModeStatus {
        &mut self.status
    }

    fn startup(&mut self, ctx: &mut GameContext) -> Result<(), GameError> {
        ctx.mixer.set_level_song(ModeId::MainMenu, Some(TITLE_SONG));
        self.status.next = Some(ModeId::Instructions);
        self.fade = Fade::new();
        Ok(())
    }

    fn get_event(&mut self, event: InputEvent, _ctx: &mut GameContext) {
        if is_key_press(event) {
            self.fade.start_out();
        }
    }

    fn update(&mut self, _ctx: &mut GameContext) -> Result<(), GameError> {
        if self.fade.update() {
            self.status.done = true;
        }
        Ok(())
    }

    fn draw(&self, ctx: &GameContext, frame: &mut Frame) {
        draw_title_screen(frame, ctx, "title_box");
        self.fade.draw(frame, ctx.screen);
    }
}

/// Shows the controls and starts a fresh progress record.
pub struct InstructionsMode {
    status: ModeStatus,
    fade: Fade,
}

impl InstructionsMode {
    pub fn new() -> Self {
        InstructionsMode {
            status: ModeStatus::default(),
            fade: Fade::new(),
        }
    }
}

impl Default for InstructionsMode {
    fn default() -> Self {
        Self::new()
    }
}

impl Mode for InstructionsMode {
    fn id(&self) -> ModeId {
        ModeId::Instructions
    }

    fn status(&self) -> &ModeStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut ModeStatus {
        &mut self.status
    }

    fn startup(&mut self, ctx: &mut GameContext) -> Result<(), GameError> {
        ctx.mixer.set_level_song(ModeId::Instructions, Some(TITLE_SONG));
        ctx.progress = ctx.fresh_progress();

        let next = if ctx.store.exists() {
            ModeId::LoadGame
        } else {
            ModeId::Overworld
        };
        info!("new progress record, continuing to {}", next);
        self.status.next = Some(next);
        self.fade = Fade::new();
        Ok(())
    }

    fn get_event(&mut self, event: InputEvent, _ctx: &mut GameContext) {
        if is_key_press(event) {
            self.fade.start_out();
        }
    }

    fn update(&mut self, _ctx: &mut GameContext) -> Result<(), GameError> {
        if self.fade.update() {
            self.status.done = true;
        }
        Ok(())
    }

    fn draw(&self, ctx: &GameContext, frame: &mut Frame) {
        draw_title_screen(frame, ctx, "instructions_box");
        self.fade.draw(frame, ctx.screen);
    }
}

const LOAD_GAME: usize = 0;

pub struct LoadGameMode {
    status: ModeStatus,
    fade: Fade,
    menu: Menu,
}

impl LoadGameMode {
    pub fn new() -> Self {
        let style = MenuStyle {
            area: Rect::new(150, 220, 500, 140),
            item_spacing: 34,
            ..MenuStyle::default()
        };
        LoadGameMode {
            status: ModeStatus::default(),
            fade: Fade::new(),
            menu: Menu::with_style("", vec!["Load Game".to_string(), "New Game".to_string()], style),
        }
    }

    fn choose(&mut self, choice: usize, ctx: &mut GameContext) -> Result<(), GameError> {
        let next = if choice == LOAD_GAME {
            match ctx.store.load()? {
                Some(progress) => {
                    info!("save loaded");
                    ctx.progress = progress;
                    ModeId::Town
                }
                None => {
                    warn!("save disappeared, starting a new game");
                    ModeId::Overworld
                }
            }
        } else {
            info!("starting a new game");
            ModeId::Overworld
        };
        self.status.next = Some(next);
        self.fade.start_out();
        Ok(())
    }
}

impl Default for LoadGameMode {
    fn default() -> Self {
        Self::new()
    }
}

impl Mode for LoadGameMode {
    fn id(&self) -> ModeId {
        ModeId::LoadGame
    }

    fn status(&self) -> &ModeStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut ModeStatus {
        &mut self.status
    }

    fn startup(&mut self, ctx: &mut GameContext) -> Result<(), GameError> {
        ctx.mixer.set_level_song(ModeId::LoadGame, Some(TITLE_SONG));
        self.status.next = Some(ModeId::Town);
        self.fade = Fade::new();
        self.menu = Self::new().menu;
        Ok(())
    }

    fn update(&mut self, ctx: &mut GameContext) -> Result<(), GameError> {
        if self.fade.is_shown() {
            if let Some(choice) = self.menu.update(&ctx.keys, &mut ctx.mixer) {
                self.choose(choice, ctx)?;
            }
        }
        if self.fade.update() {
            self.status.done = true;
        }
        Ok(())
    }

    fn draw(&self, ctx: &GameContext, frame: &mut Frame) {
        draw_title_screen(frame, ctx, "loadgamebox");
        self.menu.render(frame);
        self.fade.draw(frame, ctx.screen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssets;
    use crate::input_system::{Key, KeySnapshot};
    use crate::progress::ProgressRecord;
    use crate::save::MemoryStore;
    use crate::timer::ManualClock;

    fn context() -> GameContext {
        GameContext::headless(ManualClock::new(), MemoryAssets::new(), 1)
    }

    fn run_until_done(mode: &mut dyn Mode, ctx: &mut GameContext) -> usize {
        (0..100)
            .take_while(|_| {
                mode.update(ctx).unwrap();
                !mode.status().done
            })
            .count()
    }

    #[test]
    fn test_main_menu_leaves_on_any_key() {
        let mut ctx = context();
        let mut menu = MainMenuMode::new();
        menu.startup(&mut ctx).unwrap();
        menu.update(&mut ctx).unwrap();
        assert!(!menu.status().done);

        menu.get_event(InputEvent::KeyDown(Key::Left), &mut ctx);
        run_until_done(&mut menu, &mut ctx);
        assert_eq!(menu.status().next, Some(ModeId::Instructions));
        assert_eq!(ctx.mixer.song_for(ModeId::MainMenu), Some("kings_theme"));
    }

    #[test]
    fn test_instructions_resets_progress() {
        let mut ctx = context();
        ctx.progress.inventory.add_gold(900);
        let mut instructions = InstructionsMode::new();
        instructions.startup(&mut ctx).unwrap();

        assert_eq!(ctx.progress.inventory.gold(), 100);
        assert_eq!(instructions.status().next, Some(ModeId::Overworld));

        ctx.store = Box::new(MemoryStore::with_save(ProgressRecord::default()));
        instructions.startup(&mut ctx).unwrap();
        assert_eq!(instructions.status().next, Some(ModeId::LoadGame));
    }

    #[test]
    fn test_load_game_restores_save() {
        let mut ctx = context();
        let mut saved = ProgressRecord::default();
        saved.inventory.add_gold(400);
        ctx.store = Box::new(MemoryStore::with_save(saved));

        let mut load = LoadGameMode::new();
        load.startup(&mut ctx).unwrap();
        for _ in 0..15 {
            load.update(&mut ctx).unwrap();
        }
        ctx.keys = KeySnapshot::new();
        load.update(&mut ctx).unwrap();
        ctx.keys = KeySnapshot::with(&[Key::Confirm]);
        load.update(&mut ctx).unwrap();
        ctx.keys = KeySnapshot::new();
        run_until_done(&mut load, &mut ctx);

        assert!(load.status().done);
        assert_eq!(load.status().next, Some(ModeId::Town));
        assert_eq!(ctx.progress.inventory.gold(), 500);
    }

    #[test]
    fn test_new_game_goes_to_overworld() {
        let mut ctx = context();
        ctx.store = Box::new(MemoryStore::with_save(ProgressRecord::default()));
        let mut load = LoadGameMode::new();
        load.startup(&mut ctx).unwrap();
        for _ in 0..16 {
            load.update(&mut ctx).unwrap();
        }

        let steps: [&[Key]; 4] = [&[Key::Down], &[], &[Key::Confirm], &[]];
        for keys in steps {
            ctx.keys = KeySnapshot::with(keys);
            load.update(&mut ctx).unwrap();
        }
        assert_eq!(load.status().next, Some(ModeId::Overworld));

        let mut frame = Frame::new();
        load.draw(&ctx, &mut frame);
        assert!(frame.texts().contains(&"New Game"));
    }
}
