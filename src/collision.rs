/// Collision detection and response for tile maps
///
/// This module provides AABB (Axis-Aligned Bounding Box) detection plus the
/// per-tick collision pass a level runs after its actors have chosen their
/// velocities.
///
/// # Architecture
///
/// - `Rect`: integer rectangle in map pixels (exclusive right/bottom edges)
/// - `Collidable` trait: anything with a bounding box
/// - `resolve_level_collisions()`: moves actors, rolls back blocked moves, and
///   reports portal and battle triggers
///
/// # Rust Learning Notes
///
/// This module demonstrates:
/// - **Pure functions**: Stateless intersection tests
/// - **Split borrows**: `split_at_mut` lets one actor be checked against the
///   rest of the same slice without cloning
/// - **Outcome structs**: the pass reports what happened instead of mutating
///   the level directly
use crate::actor::{Actor, ActorState};
use crate::game::ModeId;
use crate::grid::TILE_SIZE;
use crate::progress::ProgressRecord;
use log::debug;
use serde::{Deserialize, Serialize};

/// Tile steps cost this much of the random-encounter counter.
pub const BATTLE_COUNTER_STEP: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect { x, y, w, h }
    }

    /// The rect covering one map tile.
    pub const fn tile(tile_x: i32, tile_y: i32) -> Self {
        Rect::new(tile_x * TILE_SIZE, tile_y * TILE_SIZE, TILE_SIZE, TILE_SIZE)
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        aabb_intersect(self, other)
    }

    /// Same size, centred on a point.
    pub fn centered_on(&self, center: (i32, i32)) -> Rect {
        Rect::new(center.0 - self.w / 2, center.1 - self.h / 2, self.w, self.h)
    }

    /// Shift this rect so it lies inside `bounds`. A rect larger than the
    /// bounds is aligned to their top-left corner.
    pub fn clamp_within(&self, bounds: &Rect) -> Rect {
        let x = if self.w >= bounds.w {
            bounds.x
        } else {
            self.x.clamp(bounds.x, bounds.right() - self.w)
        };
        let y = if self.h >= bounds.h {
            bounds.y
        } else {
            self.y.clamp(bounds.y, bounds.bottom() - self.h)
        };
        Rect::new(x, y, self.w, self.h)
    }
}

/// Trait for entities that participate in collision detection.
pub trait Collidable {
    /// Returns the axis-aligned bounding box for this entity, in map pixels.
    fn bounds(&self) -> Rect;
}

/// Checks if two axis-aligned bounding boxes intersect.
///
/// Two rectangles intersect if they overlap on both the X and Y axes. Edges
/// are exclusive, so tiles that merely touch do not collide.
pub fn aabb_intersect(a: &Rect, b: &Rect) -> bool {
    let x_overlap = a.x < b.right() && a.right() > b.x;
    let y_overlap = a.y < b.bottom() && a.bottom() > b.y;

    x_overlap && y_overlap
}

/// Returns indices of all entities whose bounds intersect `entity`.
pub fn check_collisions_with_collection<T: Collidable>(
    entity: &impl Collidable,
    entities: &[T],
) -> Vec<usize> {
    let entity_bounds = entity.bounds();

    entities
        .iter()
        .enumerate()
        .filter(|(_, other)| aabb_intersect(&entity_bounds, &other.bounds()))
        .map(|(index, _)| index)
        .collect()
}

/// A door tile that switches to another mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Portal {
    pub rect: Rect,
    pub destination: ModeId,
}

/// What the collision pass asks the level to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionOutcome {
    /// The player finished a step on a portal
    pub portal: Option<ModeId>,
    /// A random encounter or a battle-trigger sprite fired
    pub battle: bool,
}

/// One tick of level movement and collision response.
///
/// 1. Move the player by its velocity. Touching a sprite with a battle trigger
///    records it in the progress record; any blocker rolls the move back and
///    rests the player.
/// 2. Move every sprite. A sprite hitting a static blocker, the player,
///    another sprite or its wander box rolls back and auto-rests.
/// 3. A player that just landed on a tile corner checks portals, then the
///    random-encounter counter, then rests.
/// 4. Wandering sprites that land on a tile corner auto-rest.
pub fn resolve_level_collisions(
    player: &mut Actor,
    sprites: &mut [Actor],
    static_blockers: &[Rect],
    portals: &[Portal],
    allow_battles: bool,
    progress: &mut ProgressRecord,
) -> CollisionOutcome {
    let mut outcome = CollisionOutcome::default();

    let mut blockers: Vec<Rect> = static_blockers.to_vec();
    for sprite in sprites.iter() {
        blockers.extend(sprite.blockers());
    }

    let player_moved = player.x_vel != 0 || player.y_vel != 0;
    player.pos.step(player.x_vel, player.y_vel);

    if player_moved {
        let bounds = player.bounds();
        if let Some(trigger) = sprites
            .iter()
            .filter(|sprite| sprite.bounds().intersects(&bounds))
            .find_map(|sprite| sprite.battle.clone())
        {
            debug!("player touched battle trigger {}", trigger);
            progress.battle_type = Some(trigger);
            outcome.battle = true;
        }

        if blockers.iter().any(|blocker| blocker.intersects(&bounds)) {
            player.pos.unstep(player.x_vel, player.y_vel);
            player.begin_resting();
        }
    }

    for sprite in sprites.iter_mut() {
        sprite.pos.step(sprite.x_vel, sprite.y_vel);
    }
    resolve_sprite_collisions(player, sprites, static_blockers);

    if player.pos.is_aligned() {
        if player.state != ActorState::Resting {
            if let Some(portal) = portals
                .iter()
                .find(|portal| portal.rect.intersects(&player.bounds()))
            {
                outcome.portal = Some(portal.destination);
            }

            if allow_battles {
                progress.battle_counter -= BATTLE_COUNTER_STEP;
                if progress.battle_counter <= 0 {
                    outcome.battle = true;
                }
            }
        }
        player.begin_resting();
    }

    for sprite in sprites.iter_mut() {
        if sprite.state == ActorState::AutoMoving && sprite.pos.is_aligned() {
            sprite.begin_auto_resting();
        }
    }

    outcome
}

fn resolve_sprite_collisions(player: &Actor, sprites: &mut [Actor], static_blockers: &[Rect]) {
    let player_bounds = player.bounds();
    let mut collided = Vec::new();

    for index in 0..sprites.len() {
        let bounds = sprites[index].bounds();
        let hits_static = static_blockers.iter().any(|blocker| blocker.intersects(&bounds));
        let hits_player = bounds.intersects(&player_bounds);
        let hits_sprite = sprites
            .iter()
            .enumerate()
            .any(|(other, sprite)| other != index && sprite.bounds().intersects(&bounds));
        let leaves_box = sprites[index]
            .wander_box()
            .iter()
            .any(|tile| tile.intersects(&bounds));

        if hits_static || hits_player || hits_sprite || leaves_box {
            collided.push(index);
        }
    }

    for index in collided {
        let sprite = &mut sprites[index];
        if sprite.x_vel != 0 || sprite.y_vel != 0 {
            sprite.pos.unstep(sprite.x_vel, sprite.y_vel);
            sprite.begin_auto_resting();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Direction;
    use crate::actor::ActorKind;

    fn player_at(tile: (i32, i32)) -> Actor {
        Actor::new("player", ActorKind::Player, tile, Direction::Down, 0).with_speed(2)
    }

    #[test]
    fn test_aabb_intersect_overlapping() {
        let rect_a = Rect::new(0, 0, 32, 32);
        let rect_b = Rect::new(16, 16, 32, 32);

        assert!(aabb_intersect(&rect_a, &rect_b));
        assert!(aabb_intersect(&rect_b, &rect_a)); // Symmetric
    }

    #[test]
    fn test_aabb_intersect_touching_edges() {
        // Touching edges is not a collision
        let rect_a = Rect::new(0, 0, 32, 32);
        let rect_b = Rect::new(32, 0, 32, 32);

        assert!(!aabb_intersect(&rect_a, &rect_b));
    }

    #[test]
    fn test_aabb_intersect_contained() {
        let large = Rect::new(0, 0, 100, 100);
        let small = Rect::new(25, 25, 50, 50);

        assert!(aabb_intersect(&large, &small));
        assert!(aabb_intersect(&small, &large));
    }

    #[test]
    fn test_clamp_within() {
        let bounds = Rect::new(0, 0, 1000, 700);
        let view = Rect::new(0, 0, 800, 608).centered_on((50, 690));
        assert_eq!(view.clamp_within(&bounds), Rect::new(0, 92, 800, 608));

        let small_map = Rect::new(0, 0, 640, 480);
        assert_eq!(view.clamp_within(&small_map), Rect::new(0, 0, 800, 608));
    }

    #[test]
    fn test_check_collisions_with_collection() {
        let player = player_at((1, 1));
        let others = vec![
            Actor::person("oldman", (1, 1), Direction::Down, 0),
            Actor::person("king", (5, 5), Direction::Down, 0),
        ];
        assert_eq!(check_collisions_with_collection(&player, &others), vec![0]);
    }

    #[test]
    fn test_player_blocked_by_wall() {
        let mut progress = ProgressRecord::default();
        let mut player = player_at((1, 1));
        player.begin_moving(Direction::Right);

        let walls = [Rect::tile(2, 1)];
        resolve_level_collisions(&mut player, &mut [], &walls, &[], false, &mut progress);

        assert_eq!(player.pos.pixels(), (32, 32));
        assert_eq!(player.state, ActorState::Resting);
    }

    #[test]
    fn test_step_onto_portal() {
        let mut progress = ProgressRecord::default();
        let mut player = player_at((1, 1));
        player.begin_moving(Direction::Down);

        let portals = [Portal {
            rect: Rect::tile(1, 2),
            destination: ModeId::House,
        }];

        let mut outcome = CollisionOutcome::default();
        for _ in 0..16 {
            outcome = resolve_level_collisions(&mut player, &mut [], &[], &portals, false, &mut progress);
        }

        assert_eq!(outcome.portal, Some(ModeId::House));
        assert_eq!(player.pos.tile(), (1, 2));
        assert_eq!(player.state, ActorState::Resting);
    }

    #[test]
    fn test_random_encounter_counter() {
        let mut progress = ProgressRecord::default();
        progress.battle_counter = 5;
        let mut player = player_at((1, 1));
        player.begin_moving(Direction::Right);

        let mut outcome = CollisionOutcome::default();
        for _ in 0..16 {
            outcome = resolve_level_collisions(&mut player, &mut [], &[], &[], true, &mut progress);
        }

        assert!(outcome.battle);
        assert_eq!(progress.battle_counter, 0);
    }

    #[test]
    fn test_battle_trigger_sprite() {
        let mut progress = ProgressRecord::default();
        let mut player = player_at((1, 1));
        let mut wizard = Actor::person("evilwizard", (2, 1), Direction::Left, 0);
        wizard.battle = Some("evilwizard".to_string());
        player.begin_moving(Direction::Right);

        let mut sprites = [wizard];
        let outcome = resolve_level_collisions(&mut player, &mut sprites, &[], &[], false, &mut progress);

        assert!(outcome.battle);
        assert_eq!(progress.battle_type.as_deref(), Some("evilwizard"));
        assert_eq!(player.pos.pixels(), (32, 32));
    }

    #[test]
    fn test_wanderer_stays_inside_box() {
        let mut progress = ProgressRecord::default();
        let mut player = player_at((20, 20));
        let mut devil = Actor::person("devil", (5, 5), Direction::Down, 0);
        devil.begin_auto_moving(Direction::Right);

        let mut sprites = [devil];
        for _ in 0..32 * 4 {
            resolve_level_collisions(&mut player, &mut sprites, &[], &[], false, &mut progress);
            if sprites[0].state == ActorState::AutoResting {
                sprites[0].begin_auto_moving(Direction::Right);
            }
        }

        assert!(sprites[0].pos.x() <= 7 * 32);
    }
}
