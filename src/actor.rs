//! Characters on a map or in a battle
//!
//! Every character (townsfolk, the player, enemies, treasure chests) is one
//! [`Actor`] struct. Kind-specific behavior is picked by [`ActorKind`] inside
//! the methods rather than through a type hierarchy.
//!
//! Behaviour is an explicit state machine: [`ActorState`] says what the actor
//! is doing, `begin_*`/`enter_*` methods are the only transitions, and
//! [`Actor::update`] runs exactly one step of the current state per tick.
//!
//! # Rust Learning Notes
//!
//! This module demonstrates:
//! - **Enum dispatch**: one `match` on the state instead of a table of callbacks
//! - **Events as return values**: `update` returns `Option<ActorEvent>` instead
//!   of calling observers, so the owner decides what happens next
//! - **Composition**: animation, timers and grid position are separate structs

use crate::animation::{AnimationController, Direction, FRAME_MS};
use crate::collision::{Collidable, Rect};
use crate::grid::{GridPosition, TILE_SIZE};
use crate::item::ItemGrant;
use crate::render::{DepthSortable, DrawCommand, Frame};
use crate::timer::Timer;
use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;

/// How long a wandering actor stands still between steps.
pub const WANDER_PAUSE_MS: u64 = 2000;

/// Opacity lost per tick while fading out.
pub const FADE_STEP: i32 = 8;

/// Distance the player lunges toward the enemies when attacking.
pub const LUNGE_DISTANCE: i32 = 110;

const LUNGE_SPEED: i32 = 5;
const SHAKE_DISTANCE: i32 = 15;
const SHAKE_CYCLES: u32 = 3;
const RUN_SPEED: i32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActorKind {
    /// Computer-controlled townsfolk
    Person,
    Player,
    Enemy,
    /// Treasure chest with its save-slot id
    Chest { identifier: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorState {
    Resting,
    Moving,
    AnimatedResting,
    AutoResting,
    AutoMoving,
    BattleResting,
    Attack,
    EnemyAttack,
    RunAway,
    VictoryDance,
    KnockBack,
    FadeDeath,
}

impl ActorState {
    /// Map-file spelling, e.g. `"autoresting"`.
    pub fn from_name(name: &str) -> Option<ActorState> {
        let state = match name {
            "resting" => ActorState::Resting,
            "moving" => ActorState::Moving,
            "animated resting" => ActorState::AnimatedResting,
            "autoresting" => ActorState::AutoResting,
            "automoving" => ActorState::AutoMoving,
            "battle resting" => ActorState::BattleResting,
            _ => return None,
        };
        Some(state)
    }
}

/// Things an actor reports from its tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorEvent {
    /// The player's lunge reached the enemy line
    AttackLanded,
    /// The player is back at its origin after attacking
    AttackFinished,
    /// An enemy finished its shake; the player takes the hit now
    EnemyAttackFinished,
    /// Fade-out completed; remove the actor
    Died,
}

#[derive(Debug, Clone)]
pub struct Actor {
    /// Sprite-sheet key
    pub name: String,
    pub kind: ActorKind,
    pub pos: GridPosition,
    pub direction: Direction,
    pub default_direction: Direction,
    pub state: ActorState,
    pub x_vel: i32,
    pub y_vel: i32,
    /// Pixels per tick when walking
    speed: i32,
    pub animation: AnimationController,
    move_timer: Timer,
    pub dialogue: Vec<String>,
    pub item: Option<ItemGrant>,
    /// Battle trigger id (e.g. `"evilwizard"`)
    pub battle: Option<String>,
    pub health: i32,
    pub level: u32,
    /// Opacity, 255 = solid
    pub alpha: i32,
    /// Draw scale (battle sprites are doubled)
    pub scale: u32,
    /// Anchor for attack and knock-back motion, in pixels
    origin: (i32, i32),
    spawn_tile: (i32, i32),
    wander_box: Vec<Rect>,
    move_counter: u32,
    /// Battle slot, stable for the whole battle
    pub slot: usize,
    removed: bool,
}

impl Actor {
    /// Creates an actor standing on a tile.
    pub fn new(name: &str, kind: ActorKind, tile: (i32, i32), direction: Direction, now_ms: u64) -> Self {
        let pos = GridPosition::at_tile(tile.0, tile.1);
        Actor {
            name: name.to_string(),
            kind,
            pos,
            direction,
            default_direction: direction,
            state: ActorState::Resting,
            x_vel: 0,
            y_vel: 0,
            speed: 1,
            animation: AnimationController::new(FRAME_MS, now_ms),
            move_timer: Timer::new(WANDER_PAUSE_MS, now_ms),
            dialogue: Vec::new(),
            item: None,
            battle: None,
            health: 0,
            level: 1,
            alpha: 255,
            scale: 1,
            origin: pos.pixels(),
            spawn_tile: tile,
            wander_box: make_wander_box(tile),
            move_counter: 0,
            slot: 0,
            removed: false,
        }
    }

    pub fn person(name: &str, tile: (i32, i32), direction: Direction, now_ms: u64) -> Self {
        Self::new(name, ActorKind::Person, tile, direction, now_ms)
    }

    pub fn chest(tile: (i32, i32), identifier: u32, now_ms: u64) -> Self {
        Self::new(
            "treasurechest",
            ActorKind::Chest { identifier },
            tile,
            Direction::Down,
            now_ms,
        )
    }

    /// A battle enemy at a pixel position, drawn at double size.
    pub fn enemy(name: &str, pixels: (i32, i32), level: u32, health: i32, now_ms: u64) -> Self {
        let mut enemy = Self::new(name, ActorKind::Enemy, (0, 0), Direction::Down, now_ms);
        enemy.place_at_pixels(pixels);
        enemy.level = level;
        enemy.health = health;
        enemy.scale = 2;
        enemy.state = ActorState::BattleResting;
        enemy
    }

    pub fn with_speed(mut self, speed: i32) -> Self {
        self.speed = speed;
        self
    }

    pub fn speed(&self) -> i32 {
        self.speed
    }

    pub fn is_player(&self) -> bool {
        self.kind == ActorKind::Player
    }

    /// Moves the actor and makes the new spot its motion anchor.
    pub fn place_at_pixels(&mut self, pixels: (i32, i32)) {
        self.pos = GridPosition::from_pixels(pixels.0, pixels.1);
        self.origin = self.pos.pixels();
    }

    pub fn origin(&self) -> (i32, i32) {
        self.origin
    }

    pub fn spawn_tile(&self) -> (i32, i32) {
        self.spawn_tile
    }

    /// Set once a fade-out finishes.
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn is_resting(&self) -> bool {
        matches!(self.state, ActorState::Resting | ActorState::AutoResting)
    }

    // ======================================================================
    // Transitions
    // ======================================================================

    /// Starts walking toward `direction`.
    ///
    /// Velocity is only set along an axis the actor is free to move on: an
    /// x-aligned actor may move vertically, a y-aligned one horizontally. An
    /// actor on a tile corner can do either, and the unit vector picks one.
    pub fn begin_moving(&mut self, direction: Direction) {
        self.direction = direction;
        self.state = ActorState::Moving;

        let (dx, dy) = direction.unit();
        if self.pos.x_aligned() {
            self.y_vel = dy * self.speed;
        }
        if self.pos.y_aligned() {
            self.x_vel = dx * self.speed;
        }
    }

    pub fn begin_resting(&mut self) {
        self.state = ActorState::Resting;
        self.animation.set_frame(1);
        self.x_vel = 0;
        self.y_vel = 0;
    }

    pub fn begin_auto_moving(&mut self, direction: Direction) {
        self.direction = direction;
        self.state = ActorState::AutoMoving;
        let (dx, dy) = direction.unit();
        self.x_vel = dx * self.speed;
        self.y_vel = dy * self.speed;
    }

    pub fn begin_auto_resting(&mut self) {
        self.state = ActorState::AutoResting;
        self.animation.set_frame(1);
        self.x_vel = 0;
        self.y_vel = 0;
    }

    /// Player lunges left toward the enemy line.
    pub fn enter_attack_state(&mut self) {
        self.x_vel = -LUNGE_SPEED;
        self.y_vel = 0;
        self.state = ActorState::Attack;
    }

    /// Enemy shakes in place three times.
    pub fn enter_enemy_attack_state(&mut self) {
        self.x_vel = -LUNGE_SPEED;
        self.y_vel = 0;
        self.state = ActorState::EnemyAttack;
        self.origin = self.pos.pixels();
        self.move_counter = 0;
    }

    /// Recoil away from the attacker, then drift back.
    pub fn enter_knock_back_state(&mut self) {
        self.x_vel = if self.is_player() { 4 } else { -4 };
        self.y_vel = 0;
        self.state = ActorState::KnockBack;
        self.origin = self.pos.pixels();
    }

    pub fn enter_run_away_state(&mut self) {
        self.state = ActorState::RunAway;
    }

    pub fn enter_victory_dance(&mut self) {
        self.state = ActorState::VictoryDance;
    }

    pub fn enter_fade_death(&mut self) {
        debug!("{} starts fading out", self.name);
        self.state = ActorState::FadeDeath;
        self.x_vel = 0;
    }

    // ======================================================================
    // Tick
    // ======================================================================

    /// Runs one step of the current state.
    pub fn update(&mut self, now_ms: u64, rng: &mut impl Rng) -> Option<ActorEvent> {
        match self.state {
            ActorState::Resting | ActorState::BattleResting => None,
            ActorState::Moving
            | ActorState::AutoMoving
            | ActorState::AnimatedResting
            | ActorState::VictoryDance => {
                self.animation.update(now_ms);
                None
            }
            ActorState::AutoResting => {
                self.auto_resting(now_ms, rng);
                None
            }
            ActorState::Attack => self.attack(),
            ActorState::EnemyAttack => self.enemy_attack(),
            ActorState::RunAway => {
                self.pos.step(RUN_SPEED, 0);
                self.direction = Direction::Right;
                self.animation.update(now_ms);
                None
            }
            ActorState::KnockBack => {
                self.knock_back();
                None
            }
            ActorState::FadeDeath => self.fade_death(),
        }
    }

    fn auto_resting(&mut self, now_ms: u64, rng: &mut impl Rng) {
        if self.move_timer.done(now_ms) {
            let direction = Direction::ALL
                .choose(rng)
                .copied()
                .unwrap_or(self.default_direction);
            self.begin_auto_moving(direction);
            self.move_timer.reset(now_ms);
        }
    }

    fn attack(&mut self) -> Option<ActorEvent> {
        self.pos.step(self.x_vel, 0);
        let x = self.pos.x();

        if self.x_vel < 0 {
            if x <= self.origin.0 - LUNGE_DISTANCE {
                self.x_vel = LUNGE_SPEED;
                return Some(ActorEvent::AttackLanded);
            }
        } else if x >= self.origin.0 {
            self.return_to_origin();
            return Some(ActorEvent::AttackFinished);
        }
        None
    }

    fn enemy_attack(&mut self) -> Option<ActorEvent> {
        self.pos.step(self.x_vel, 0);
        let x = self.pos.x();
        let start_x = self.origin.0;

        if self.move_counter == SHAKE_CYCLES {
            self.return_to_origin();
            return Some(ActorEvent::EnemyAttackFinished);
        }

        if self.x_vel < 0 && x <= start_x - SHAKE_DISTANCE {
            self.x_vel = LUNGE_SPEED;
        } else if self.x_vel > 0 && x >= start_x + SHAKE_DISTANCE {
            self.move_counter += 1;
            self.x_vel = -LUNGE_SPEED;
        }
        None
    }

    fn knock_back(&mut self) {
        self.pos.step(self.x_vel, 0);
        let x = self.pos.x();

        if self.is_player() {
            if x >= self.origin.0 + 10 {
                self.x_vel = -2;
            } else if x <= self.origin.0 {
                self.return_to_origin();
            }
        } else if x <= self.origin.0 - 10 {
            self.x_vel = 2;
        } else if x >= self.origin.0 {
            self.return_to_origin();
        }
    }

    fn fade_death(&mut self) -> Option<ActorEvent> {
        if self.removed {
            return None;
        }

        self.alpha -= FADE_STEP;
        if self.alpha <= 0 {
            self.alpha = 0;
            self.removed = true;
            return Some(ActorEvent::Died);
        }
        None
    }

    fn return_to_origin(&mut self) {
        self.pos = GridPosition::from_pixels(self.origin.0, self.origin.1);
        self.x_vel = 0;
        self.state = ActorState::BattleResting;
    }

    // ======================================================================
    // Collision
    // ======================================================================

    /// Tile rects this actor claims this tick.
    ///
    /// Resting: its own tile. Moving: the two tiles it is between, along
    /// whichever axis is not aligned.
    pub fn blockers(&self) -> Vec<Rect> {
        let (x, y) = self.pos.pixels();
        match self.state {
            ActorState::Resting | ActorState::AutoResting => {
                vec![Rect::new(x, y, TILE_SIZE, TILE_SIZE)]
            }
            ActorState::Moving | ActorState::AutoMoving => {
                if self.pos.x_aligned() {
                    let low = y.div_euclid(TILE_SIZE) * TILE_SIZE;
                    let high = low + if self.pos.y_aligned() { 0 } else { TILE_SIZE };
                    vec![
                        Rect::new(x, high, TILE_SIZE, TILE_SIZE),
                        Rect::new(x, low, TILE_SIZE, TILE_SIZE),
                    ]
                } else {
                    let low = x.div_euclid(TILE_SIZE) * TILE_SIZE;
                    vec![
                        Rect::new(low + TILE_SIZE, y, TILE_SIZE, TILE_SIZE),
                        Rect::new(low, y, TILE_SIZE, TILE_SIZE),
                    ]
                }
            }
            _ => Vec::new(),
        }
    }

    /// The ring of tiles three steps out from the spawn tile.
    pub fn wander_box(&self) -> &[Rect] {
        &self.wander_box
    }

    /// Sheet cell for the current direction and frame. Chests use column 0
    /// closed and column 1 open.
    pub fn sheet_cell(&self) -> (u32, u32) {
        match self.kind {
            ActorKind::Chest { .. } => (self.animation.frame() as u32 % 2, 0),
            _ => self.direction.sheet_cell(self.animation.frame()),
        }
    }
}

fn make_wander_box(tile: (i32, i32)) -> Vec<Rect> {
    let (tile_x, tile_y) = tile;
    let mut tiles = Vec::with_capacity(24);

    for x in tile_x - 3..=tile_x + 3 {
        tiles.push((x, tile_y - 3));
        tiles.push((x, tile_y + 3));
    }
    for y in tile_y - 2..=tile_y + 2 {
        tiles.push((tile_x - 3, y));
        tiles.push((tile_x + 3, y));
    }

    tiles
        .into_iter()
        .map(|(x, y)| Rect::new(x * TILE_SIZE, y * TILE_SIZE, TILE_SIZE, TILE_SIZE))
        .collect()
}

impl Collidable for Actor {
    fn bounds(&self) -> Rect {
        self.pos.rect()
    }
}

impl DepthSortable for Actor {
    fn depth_y(&self) -> i32 {
        self.pos.y()
    }

    fn draw(&self, frame: &mut Frame, camera: (i32, i32)) {
        if self.removed {
            return;
        }
        let (x, y) = self.pos.pixels();
        frame.push(DrawCommand::Sprite {
            sheet: self.name.clone(),
            cell: self.sheet_cell(),
            x: x - camera.0,
            y: y - camera.1,
            scale: self.scale,
            alpha: self.alpha.clamp(0, 255) as u8,
            tint: None,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1)
    }

    #[test]
    fn test_resting_actor_is_aligned() {
        let mut actor = Actor::person("oldman", (4, 5), Direction::Down, 0);
        actor.begin_moving(Direction::Right);
        actor.pos.step(actor.x_vel, actor.y_vel);
        actor.begin_resting();
        actor.pos.snap();

        assert_eq!(actor.state, ActorState::Resting);
        assert!(actor.pos.is_aligned());
        assert_eq!((actor.x_vel, actor.y_vel), (0, 0));
        assert_eq!(actor.animation.frame(), 1);
    }

    #[test]
    fn test_begin_moving_sets_one_axis() {
        for direction in Direction::ALL {
            let mut actor = Actor::person("oldman", (4, 5), Direction::Down, 0).with_speed(2);
            actor.begin_moving(direction);
            let (ux, uy) = direction.unit();
            assert_eq!((actor.x_vel, actor.y_vel), (ux * 2, uy * 2));
            assert!(actor.x_vel == 0 || actor.y_vel == 0);
        }
    }

    #[test]
    fn test_moving_between_tiles_keeps_axis() {
        let mut actor = Actor::person("oldman", (4, 5), Direction::Down, 0);
        actor.begin_moving(Direction::Down);
        actor.pos.step(actor.x_vel, actor.y_vel);
        actor.begin_resting();

        // Mid-tile vertically: a sideways request cannot add x velocity
        actor.begin_moving(Direction::Left);
        assert_eq!(actor.x_vel, 0);
    }

    #[test]
    fn test_blockers_resting_and_moving() {
        let mut actor = Actor::person("oldman", (2, 2), Direction::Down, 0);
        assert_eq!(actor.blockers(), vec![Rect::new(64, 64, 32, 32)]);

        actor.begin_moving(Direction::Down);
        actor.pos.step(0, 1);
        let blockers = actor.blockers();
        assert_eq!(blockers.len(), 2);
        assert!(blockers.contains(&Rect::new(64, 64, 32, 32)));
        assert!(blockers.contains(&Rect::new(64, 96, 32, 32)));
    }

    #[test]
    fn test_wander_box_is_a_ring() {
        let actor = Actor::person("devil", (10, 10), Direction::Down, 0);
        let ring = actor.wander_box();
        assert_eq!(ring.len(), 24);
        for rect in ring {
            let dx = (rect.x / 32 - 10).abs();
            let dy = (rect.y / 32 - 10).abs();
            assert_eq!(dx.max(dy), 3);
        }
    }

    #[test]
    fn test_auto_resting_starts_walking_after_pause() {
        let mut rng = rng();
        let mut actor = Actor::person("devil", (10, 10), Direction::Down, 0);
        actor.begin_auto_resting();

        actor.update(WANDER_PAUSE_MS, &mut rng);
        assert_eq!(actor.state, ActorState::AutoResting);

        actor.update(WANDER_PAUSE_MS + 1, &mut rng);
        assert_eq!(actor.state, ActorState::AutoMoving);
        assert_eq!(actor.x_vel.abs() + actor.y_vel.abs(), 1);
    }

    #[test]
    fn test_fade_death_fires_once_at_tick_32() {
        let mut rng = rng();
        let mut enemy = Actor::enemy("devil", (96, 96), 1, 0, 0);
        enemy.enter_fade_death();

        let mut died_at = Vec::new();
        for tick in 1..=40 {
            if enemy.update(0, &mut rng) == Some(ActorEvent::Died) {
                died_at.push(tick);
            }
        }

        assert_eq!(died_at, vec![32]);
        assert!(enemy.is_removed());
    }

    #[test]
    fn test_player_attack_lunge() {
        let mut rng = rng();
        let mut player = Actor::new("player", ActorKind::Player, (0, 0), Direction::Left, 0);
        player.place_at_pixels((640, 224));
        player.state = ActorState::BattleResting;
        player.enter_attack_state();

        let mut events = Vec::new();
        for _ in 0..100 {
            if let Some(event) = player.update(0, &mut rng) {
                events.push(event);
            }
            if player.state == ActorState::BattleResting {
                break;
            }
        }

        assert_eq!(events, vec![ActorEvent::AttackLanded, ActorEvent::AttackFinished]);
        assert_eq!(player.pos.pixels(), (640, 224));
    }

    #[test]
    fn test_enemy_attack_shakes_three_times() {
        let mut rng = rng();
        let mut enemy = Actor::enemy("devil", (96, 96), 1, 4, 0);
        enemy.enter_enemy_attack_state();

        let mut ticks = 0;
        let mut finished = false;
        while ticks < 200 && !finished {
            ticks += 1;
            finished = enemy.update(0, &mut rng) == Some(ActorEvent::EnemyAttackFinished);
            let x = enemy.pos.x();
            assert!((96 - 15..=96 + 15).contains(&x));
        }

        assert!(finished);
        assert_eq!(enemy.pos.pixels(), (96, 96));
        assert_eq!(enemy.state, ActorState::BattleResting);
    }

    #[test]
    fn test_knock_back_returns_home() {
        let mut rng = rng();
        let mut enemy = Actor::enemy("devil", (192, 96), 1, 4, 0);
        enemy.enter_knock_back_state();

        let mut min_x = enemy.pos.x();
        for _ in 0..50 {
            enemy.update(0, &mut rng);
            min_x = min_x.min(enemy.pos.x());
        }

        assert_eq!(min_x, 192 - 12);
        assert_eq!(enemy.pos.pixels(), (192, 96));
        assert_eq!(enemy.state, ActorState::BattleResting);
    }
}
