//! Death Scene
//!
//! Shown after the player falls in battle. Offers to restart from the last
//! save point (back to town with the saved record) or to quit to the main
//! menu. A first death before any save writes a fresh record, so "Yes"
//! always has something to load.

use super::{Fade, Menu, MenuStyle};
use crate::collision::Rect;
use crate::error::GameError;
use crate::game::{GameContext, Mode, ModeId, ModeStatus};
use crate::render::{Color, DrawCommand, Frame};
use log::{info, warn};

/// Configuration for death screen appearance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeathScreenStyle {
    pub background: Color,

    /// Scale of the player sprite in the middle of the screen
    pub player_scale: u32,

    pub message_box: Rect,
}

impl Default for DeathScreenStyle {
    fn default() -> Self {
        DeathScreenStyle {
            background: Color::rgb(0, 0, 30),
            player_scale: 2,
            message_box: Rect::new(0, 448, 800, 160),
        }
    }
}

const RESTART: usize = 0;

pub struct DeathSceneMode {
    status: ModeStatus,
    fade: Fade,
    menu: Menu,
    style: DeathScreenStyle,
}

impl DeathSceneMode {
    pub fn new() -> Self {
        let style = DeathScreenStyle::default();
        DeathSceneMode {
            status: ModeStatus::default(),
            fade: Fade::new(),
            menu: Self::make_menu(&style),
            style,
        }
    }

    fn make_menu(style: &DeathScreenStyle) -> Menu {
        let menu_style = MenuStyle {
            area: style.message_box,
            item_spacing: 35,
            ..MenuStyle::default()
        };
        Menu::with_style(
            "You have died. Restart from last save point?",
            vec!["Yes".to_string(), "No".to_string()],
            menu_style,
        )
    }

    fn choose(&mut self, choice: usize, ctx: &mut GameContext) -> Result<(), GameError> {
        let next = if choice == RESTART {
            match ctx.store.load()? {
                Some(progress) => {
                    info!("restarting from the last save point");
                    ctx.progress = progress;
                }
                None => {
                    warn!("no save to restart from, using a fresh record");
                    ctx.progress = ctx.fresh_progress();
                }
            }
            ModeId::Town
        } else {
            ModeId::MainMenu
        };
        self.status.next = Some(next);
        self.fade.start_out();
        Ok(())
    }
}

impl Default for DeathSceneMode {
    fn default() -> Self {
        Self::new()
    }
}

impl Mode for DeathSceneMode {
    fn id(&self) -> ModeId {
        ModeId::DeathScene
    }

    fn status(&self) -> &ModeStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut ModeStatus {
        &mut self.status
    }

    fn startup(&mut self, ctx: &mut GameContext) -> Result<(), GameError> {
        ctx.mixer.set_level_song(ModeId::DeathScene, Some("shop_theme"));
        if !ctx.store.exists() {
            info!("no save yet, writing a fresh one");
            let fresh = ctx.fresh_progress();
            ctx.store.save(&fresh)?;
        }
        self.status.next = Some(ModeId::Town);
        self.fade = Fade::new();
        self.menu = Self::make_menu(&self.style);
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
        let (width, height) = ctx.screen;
        let scale = self.style.player_scale;
        frame.fill(self.style.background);
        frame.push(DrawCommand::Sprite {
            sheet: "player".to_string(),
            cell: (0, 0),
            x: width / 2 - 16 * scale as i32,
            y: height / 2 - 16 * scale as i32,
            scale,
            alpha: 255,
            tint: None,
        });
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

    fn died(store: MemoryStore) -> (DeathSceneMode, GameContext) {
        let mut ctx = GameContext::headless(ManualClock::new(), MemoryAssets::new(), 1);
        ctx.store = Box::new(store);
        ctx.progress.stats.health.drain(70);
        let mut scene = DeathSceneMode::new();
        scene.startup(&mut ctx).unwrap();
        for _ in 0..16 {
            scene.update(&mut ctx).unwrap();
        }
        (scene, ctx)
    }

    fn press(scene: &mut DeathSceneMode, ctx: &mut GameContext, keys: &[Key]) {
        ctx.keys = KeySnapshot::with(keys);
        scene.update(ctx).unwrap();
        ctx.keys = KeySnapshot::new();
        scene.update(ctx).unwrap();
    }

    #[test]
    fn test_first_death_writes_fresh_save() {
        let (mut scene, mut ctx) = died(MemoryStore::new());
        assert!(ctx.store.exists());

        press(&mut scene, &mut ctx, &[Key::Confirm]);
        assert_eq!(scene.status().next, Some(ModeId::Town));
        assert_eq!(ctx.progress.stats.health.current(), 70);
    }

    #[test]
    fn test_restart_loads_last_save() {
        let mut saved = ProgressRecord::default();
        saved.inventory.add_gold(250);
        let (mut scene, mut ctx) = died(MemoryStore::with_save(saved));

        press(&mut scene, &mut ctx, &[Key::Confirm]);
        for _ in 0..15 {
            scene.update(&mut ctx).unwrap();
        }
        assert!(scene.status().done);
        assert_eq!(ctx.progress.inventory.gold(), 350);
    }

    #[test]
    fn test_no_goes_to_main_menu() {
        let (mut scene, mut ctx) = died(MemoryStore::new());
        press(&mut scene, &mut ctx, &[Key::Down]);
        press(&mut scene, &mut ctx, &[Key::Confirm]);
        assert_eq!(scene.status().next, Some(ModeId::MainMenu));
        assert_eq!(ctx.progress.stats.health.current(), 0);

        let mut frame = Frame::new();
        scene.draw(&ctx, &mut frame);
        assert!(frame.texts().contains(&"You have died. Restart from last save point?"));
    }
}
