//! Exploration levels
//!
//! One [`LevelMode`] per map (town, castle, houses, overworld, dungeons). Each
//! visit rebuilds everything from the map file and the progress record: where
//! the player stands, who else is there and what they say.
//!
//! # Module Structure
//!
//! - `map`: the JSON map format and its validation
//! - `quest`: story flags applied to spawns, conversations and music
//! - `dialogue`: the talk box and the conversation flow
//! - `player_menu`: stats, items, magic and equipment pages

pub mod dialogue;
pub mod map;
pub mod player_menu;
pub mod quest;

pub use dialogue::{DialogueEvent, DialogueHandler};
pub use map::MapData;
pub use player_menu::{MenuOutcome, PlayerMenu};

use crate::actor::{Actor, ActorState};
use crate::collision::{Collidable, Portal, Rect, resolve_level_collisions};
use crate::error::GameError;
use crate::game::{GameContext, Mode, ModeId, ModeStatus};
use crate::input_system::{InputLatch, Key};
use crate::player::{check_for_input, level_player};
use crate::render::{Color, DepthSortable, DrawCommand, Frame, draw_with_depth_sorting};
use log::{debug, info};

/// Fade alpha change per tick for ordinary transitions.
pub const TRANSITION_SPEED: i32 = 17;

/// Fade alpha change per tick on the way to the credits.
pub const SLOW_TRANSITION_SPEED: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelState {
    TransitionIn,
    Normal,
    Dialogue,
    Menu,
    TransitionOut,
    SlowTransitionOut,
}

/// Everything that lives only as long as one visit to the level.
struct Visit {
    map: MapData,
    player: Actor,
    sprites: Vec<Actor>,
    blockers: Vec<Rect>,
    portals: Vec<Portal>,
    viewport: Rect,
    dialogue: DialogueHandler,
    menu: PlayerMenu,
    menu_latch: InputLatch,
    state: LevelState,
    /// Transition overlay opacity
    alpha: i32,
}

pub struct LevelMode {
    id: ModeId,
    status: ModeStatus,
    visit: Option<Visit>,
}

impl LevelMode {
    pub fn new(id: ModeId) -> Self {
        debug_assert!(id.is_level(), "{} is not a level", id);
        LevelMode {
            id,
            status: ModeStatus::default(),
            visit: None,
        }
    }

    pub fn state(&self) -> Option<LevelState> {
        self.visit.as_ref().map(|visit| visit.state)
    }

    pub fn player(&self) -> Option<&Actor> {
        self.visit.as_ref().map(|visit| &visit.player)
    }

    pub fn sprites(&self) -> &[Actor] {
        self.visit.as_ref().map_or(&[], |visit| visit.sprites.as_slice())
    }

    pub fn viewport(&self) -> Option<Rect> {
        self.visit.as_ref().map(|visit| visit.viewport)
    }

    fn running_normally(&mut self, ctx: &mut GameContext) {
        let now = ctx.now();
        let Some(visit) = self.visit.as_mut() else {
            return;
        };

        check_for_input(&mut visit.player, &ctx.keys);
        visit.player.update(now, &mut ctx.rng);
        for sprite in visit.sprites.iter_mut() {
            sprite.update(now, &mut ctx.rng);
        }

        let outcome = resolve_level_collisions(
            &mut visit.player,
            &mut visit.sprites,
            &visit.blockers,
            &visit.portals,
            visit.map.battles,
            &mut ctx.progress,
        );

        if outcome.battle && visit.map.battles {
            self.leave_for_battle(ctx);
        } else if let Some(destination) = outcome.portal {
            self.leave(destination, LevelState::TransitionOut, ctx);
        } else if ctx.progress.quest.delivered_crown {
            info!("the crown is home, rolling credits");
            self.leave(ModeId::Credits, LevelState::SlowTransitionOut, ctx);
        }

        if self.state() == Some(LevelState::Normal) {
            self.check_dialogue(ctx);
        }
        if self.state() == Some(LevelState::Normal) {
            self.check_for_menu(ctx);
        }
        self.update_viewport(ctx);
    }

    fn check_dialogue(&mut self, ctx: &mut GameContext) {
        let now = ctx.now();
        let Some(visit) = self.visit.as_mut() else {
            return;
        };

        let event = visit.dialogue.update(
            &ctx.keys,
            now,
            &visit.player,
            &mut visit.sprites,
            &mut ctx.progress,
            &ctx.registry,
        );

        match event {
            Some(DialogueEvent::Opened) => visit.state = LevelState::Dialogue,
            Some(DialogueEvent::Closed) => visit.state = LevelState::Normal,
            Some(DialogueEvent::StartBattle) => self.leave_for_battle(ctx),
            None => {}
        }
    }

    fn check_for_menu(&mut self, ctx: &mut GameContext) {
        let Some(visit) = self.visit.as_mut() else {
            return;
        };

        if visit.menu_latch.pressed(&ctx.keys, Key::Menu) && visit.player.state == ActorState::Resting {
            debug!("{}: menu opened", self.id);
            visit.menu.reset();
            visit.state = LevelState::Menu;
        }
        visit.menu_latch.release(&ctx.keys, &[Key::Menu]);
    }

    fn update_viewport(&mut self, ctx: &GameContext) {
        let Some(visit) = self.visit.as_mut() else {
            return;
        };
        let (width, height) = ctx.screen;
        visit.viewport = Rect::new(0, 0, width, height)
            .centered_on(visit.player.bounds().center())
            .clamp_within(&visit.map.pixel_bounds());
    }

    /// Remembers where the player stood so the level can put them back after
    /// the fight.
    fn leave_for_battle(&mut self, ctx: &mut GameContext) {
        if let Some(visit) = &self.visit {
            ctx.progress.last_location = visit.player.pos.tile();
            ctx.progress.last_direction = visit.player.direction;
        }
        info!("{}: battle at {:?}", self.id, ctx.progress.last_location);
        self.leave(ModeId::Battle, LevelState::TransitionOut, ctx);
    }

    fn leave(&mut self, next: ModeId, fade: LevelState, ctx: &mut GameContext) {
        let Some(visit) = self.visit.as_mut() else {
            return;
        };
        debug!("{}: leaving for {}", self.id, next);
        ctx.progress.last_state = Some(self.id);
        self.status.next = Some(next);
        visit.state = fade;
    }
}

impl Mode for LevelMode {
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
        let name = self.id.as_str();
        let map = MapData::parse(name, &ctx.assets.tilemap(name)?)?;
        let now = ctx.now();

        let (tile, direction) = if self.status.previous == Some(ModeId::Battle) {
            (ctx.progress.last_location, ctx.progress.last_direction)
        } else {
            let start = map.start_for(self.status.previous);
            (start.tile, start.direction)
        };
        info!("entering {} at {:?} from {:?}", self.id, tile, self.status.previous);

        let song = quest::level_song(self.id, &map, &ctx.progress.quest);
        ctx.mixer.set_level_song(self.id, song.as_deref());

        self.status.next = None;
        self.visit = Some(Visit {
            player: level_player(tile, direction, now),
            sprites: quest::spawn_sprites(&map, &ctx.progress, now),
            blockers: map.blocker_rects(),
            portals: map.portals(),
            viewport: Rect::new(0, 0, ctx.screen.0, ctx.screen.1),
            dialogue: DialogueHandler::new(now),
            menu: PlayerMenu::new(),
            menu_latch: InputLatch::new(),
            state: LevelState::TransitionIn,
            alpha: 255,
            map,
        });
        self.update_viewport(ctx);
        Ok(())
    }

    fn update(&mut self, ctx: &mut GameContext) -> Result<(), GameError> {
        let Some(state) = self.state() else {
            return Ok(());
        };

        match state {
            LevelState::TransitionIn => {
                if let Some(visit) = self.visit.as_mut() {
                    visit.alpha -= TRANSITION_SPEED;
                    if visit.alpha <= 0 {
                        visit.alpha = 0;
                        visit.state = LevelState::Normal;
                    }
                    // Keys held through the fade must be released first
                    visit.menu_latch.release(&ctx.keys, &[Key::Menu]);
                }
            }
            LevelState::Normal => self.running_normally(ctx),
            LevelState::Dialogue => self.check_dialogue(ctx),
            LevelState::Menu => {
                if let Some(visit) = self.visit.as_mut() {
                    if visit.menu.update(ctx) == MenuOutcome::Close {
                        debug!("{}: menu closed", self.id);
                        visit.menu_latch.disarm();
                        visit.state = LevelState::Normal;
                    }
                }
            }
            LevelState::TransitionOut | LevelState::SlowTransitionOut => {
                let speed = if state == LevelState::SlowTransitionOut {
                    SLOW_TRANSITION_SPEED
                } else {
                    TRANSITION_SPEED
                };
                if let Some(visit) = self.visit.as_mut() {
                    visit.alpha += speed;
                    if visit.alpha >= 255 {
                        visit.alpha = 255;
                        self.status.done = true;
                    }
                }
            }
        }
        Ok(())
    }

    fn draw(&self, ctx: &GameContext, frame: &mut Frame) {
        let Some(visit) = &self.visit else {
            return;
        };
        let (width, height) = ctx.screen;
        let viewport = visit.viewport;

        frame.fill(Color::BLACK);
        frame.push(DrawCommand::MapLayer {
            map: self.id.as_str().to_string(),
            viewport,
        });

        let mut actors: Vec<&dyn DepthSortable> = Vec::with_capacity(visit.sprites.len() + 1);
        actors.push(&visit.player);
        for sprite in &visit.sprites {
            actors.push(sprite);
        }
        draw_with_depth_sorting(frame, &actors, (viewport.x, viewport.y));

        visit.dialogue.draw(frame, ctx.screen);
        if visit.state == LevelState::Menu {
            visit.menu.draw(frame, ctx);
        }

        if visit.alpha > 0 {
            frame.overlay(width, height, Color::TRANSITION, visit.alpha.min(255) as u8);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Direction;
    use crate::assets::MemoryAssets;
    use crate::input_system::KeySnapshot;
    use crate::timer::ManualClock;

    const FIELD: &str = r#"{
        "width": 40, "height": 30, "music": "overworld_theme", "battles": true,
        "start_points": [
            { "tile": [10, 10], "direction": "down" },
            { "tile": [3, 4], "from": "town", "direction": "right" }
        ],
        "blockers": [[10, 12]],
        "portals": [{ "tile": [4, 4], "destination": "town" }],
        "sprites": [
            { "kind": "soldier", "tile": [10, 8], "direction": "down",
              "dialogue": ["Halt!"] }
        ]
    }"#;

    fn setup(previous: Option<ModeId>) -> (LevelMode, GameContext, ManualClock) {
        let clock = ManualClock::new();
        let assets = MemoryAssets::new().with_map("overworld", FIELD);
        let mut ctx = GameContext::headless(clock.clone(), assets, 9);
        let mut level = LevelMode::new(ModeId::Overworld);
        level.status_mut().previous = previous;
        level.startup(&mut ctx).unwrap();
        (level, ctx, clock)
    }

    /// Runs ticks (16 ms apart) until `until` holds, with a hard ceiling.
    fn run(level: &mut LevelMode, ctx: &mut GameContext, clock: &ManualClock, until: impl Fn(&LevelMode) -> bool) {
        for _ in 0..500 {
            if until(level) {
                return;
            }
            clock.advance(16);
            level.update(ctx).unwrap();
        }
        panic!("condition never reached");
    }

    fn settle(level: &mut LevelMode, ctx: &mut GameContext, clock: &ManualClock) {
        run(level, ctx, clock, |level| level.state() == Some(LevelState::Normal));
    }

    #[test]
    fn test_start_point_follows_previous_mode() {
        let (level, ctx, _) = setup(Some(ModeId::Town));
        let player = level.player().unwrap();
        assert_eq!(player.pos.tile(), (3, 4));
        assert_eq!(player.direction, Direction::Right);
        assert_eq!(ctx.mixer.song_for(ModeId::Overworld), Some("overworld_theme"));

        let (level, _, _) = setup(Some(ModeId::Castle));
        assert_eq!(level.player().unwrap().pos.tile(), (10, 10));
    }

    #[test]
    fn test_back_from_battle_uses_stashed_location() {
        let clock = ManualClock::new();
        let assets = MemoryAssets::new().with_map("overworld", FIELD);
        let mut ctx = GameContext::headless(clock, assets, 9);
        ctx.progress.last_location = (20, 15);
        ctx.progress.last_direction = Direction::Left;

        let mut level = LevelMode::new(ModeId::Overworld);
        level.status_mut().previous = Some(ModeId::Battle);
        level.startup(&mut ctx).unwrap();

        let player = level.player().unwrap();
        assert_eq!(player.pos.tile(), (20, 15));
        assert_eq!(player.direction, Direction::Left);
    }

    #[test]
    fn test_missing_map_is_fatal() {
        let mut ctx = GameContext::headless(ManualClock::new(), MemoryAssets::new(), 1);
        let mut level = LevelMode::new(ModeId::Castle);
        assert!(matches!(level.startup(&mut ctx), Err(GameError::MissingAsset(_))));
    }

    #[test]
    fn test_walk_onto_portal() {
        let (mut level, mut ctx, clock) = setup(Some(ModeId::Town));
        ctx.progress.battle_counter = 255;
        settle(&mut level, &mut ctx, &clock);

        ctx.keys = KeySnapshot::with(&[Key::Right]);
        run(&mut level, &mut ctx, &clock, |level| level.status().done);

        assert_eq!(level.status().next, Some(ModeId::Town));
        assert_eq!(level.player().unwrap().pos.tile(), (4, 4));
        assert_eq!(ctx.progress.last_state, Some(ModeId::Overworld));
    }

    #[test]
    fn test_blocker_stops_the_player() {
        let (mut level, mut ctx, clock) = setup(None);
        ctx.progress.battle_counter = 255;
        settle(&mut level, &mut ctx, &clock);

        ctx.keys = KeySnapshot::with(&[Key::Down]);
        for _ in 0..60 {
            clock.advance(16);
            level.update(&mut ctx).unwrap();
        }
        // (10, 11) is open, (10, 12) is a wall
        assert_eq!(level.player().unwrap().pos.tile(), (10, 11));
        assert_eq!(level.state(), Some(LevelState::Normal));
    }

    #[test]
    fn test_random_encounter_stashes_location() {
        let (mut level, mut ctx, clock) = setup(None);
        ctx.progress.battle_counter = 5;
        settle(&mut level, &mut ctx, &clock);

        ctx.keys = KeySnapshot::with(&[Key::Left]);
        run(&mut level, &mut ctx, &clock, |level| {
            level.state() == Some(LevelState::TransitionOut)
        });

        assert_eq!(level.status().next, Some(ModeId::Battle));
        assert_eq!(ctx.progress.last_location, (9, 10));
        assert_eq!(ctx.progress.last_direction, Direction::Left);
        assert_eq!(ctx.progress.last_state, Some(ModeId::Overworld));

        run(&mut level, &mut ctx, &clock, |level| level.status().done);
    }

    #[test]
    fn test_talk_then_menu() {
        let (mut level, mut ctx, clock) = setup(None);
        ctx.progress.battle_counter = 255;
        settle(&mut level, &mut ctx, &clock);

        // Face the soldier two tiles up: one step, then talk
        ctx.keys = KeySnapshot::with(&[Key::Up]);
        run(&mut level, &mut ctx, &clock, |level| {
            level.player().unwrap().pos.tile() == (10, 9)
                && level.player().unwrap().state == ActorState::Resting
        });
        ctx.keys = KeySnapshot::new();
        clock.advance(400);
        level.update(&mut ctx).unwrap();

        ctx.keys = KeySnapshot::with(&[Key::Confirm]);
        level.update(&mut ctx).unwrap();
        assert_eq!(level.state(), Some(LevelState::Dialogue));
        assert_eq!(level.sprites()[0].direction, Direction::Down);

        ctx.keys = KeySnapshot::new();
        level.update(&mut ctx).unwrap();
        ctx.keys = KeySnapshot::with(&[Key::Confirm]);
        level.update(&mut ctx).unwrap();
        assert_eq!(level.state(), Some(LevelState::Normal));

        ctx.keys = KeySnapshot::with(&[Key::Menu]);
        level.update(&mut ctx).unwrap();
        assert_eq!(level.state(), Some(LevelState::Menu));

        let mut frame = Frame::new();
        level.draw(&ctx, &mut frame);
        assert!(frame.texts().contains(&"Equipment"));

        // Release, then press again to close
        ctx.keys = KeySnapshot::new();
        level.update(&mut ctx).unwrap();
        ctx.keys = KeySnapshot::with(&[Key::Menu]);
        level.update(&mut ctx).unwrap();
        assert_eq!(level.state(), Some(LevelState::Normal));
    }

    #[test]
    fn test_delivered_crown_rolls_credits() {
        let (mut level, mut ctx, clock) = setup(None);
        settle(&mut level, &mut ctx, &clock);
        ctx.progress.quest.delivered_crown = true;

        level.update(&mut ctx).unwrap();
        assert_eq!(level.state(), Some(LevelState::SlowTransitionOut));
        assert_eq!(level.status().next, Some(ModeId::Credits));

        // 255 / 2 rounds up to 128 ticks
        for _ in 0..127 {
            level.update(&mut ctx).unwrap();
        }
        assert!(!level.status().done);
        level.update(&mut ctx).unwrap();
        assert!(level.status().done);
    }

    #[test]
    fn test_viewport_is_clamped_to_map() {
        let (level, _, _) = setup(Some(ModeId::Town));
        // Player at (3, 4) is near the top-left corner
        assert_eq!(level.viewport(), Some(Rect::new(0, 0, 800, 608)));

        let mut frame = Frame::new();
        level.draw(&GameContext::headless(ManualClock::new(), MemoryAssets::new(), 1), &mut frame);
        assert!(frame.commands().iter().any(|command| matches!(
            command,
            DrawCommand::MapLayer { map, .. } if map == "overworld"
        )));
        let sprites = frame
            .commands()
            .iter()
            .filter(|command| matches!(command, DrawCommand::Sprite { .. }))
            .count();
        assert_eq!(sprites, 2);
    }
}
