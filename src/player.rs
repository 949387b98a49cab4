use crate::actor::{Actor, ActorKind, ActorState};
use crate::animation::Direction;
use crate::input_system::{Key, KeySnapshot};
use crate::render::Color;

/// Walking speed in pixels per tick. Divides the tile size.
pub const PLAYER_SPEED: i32 = 2;

/// Where the player stands on the battle screen.
pub const BATTLE_ORIGIN: (i32, i32) = (640, 224);

/// Overlay alpha change per tick for the damage and heal flashes.
const FLASH_STEP: i32 = 25;

/// The player as it walks around a level.
pub fn level_player(tile: (i32, i32), direction: Direction, now_ms: u64) -> Actor {
    Actor::new("player", ActorKind::Player, tile, direction, now_ms).with_speed(PLAYER_SPEED)
}

/// The player on the battle screen: doubled, facing the enemies.
pub fn battle_player(now_ms: u64) -> Actor {
    let mut player = level_player((0, 0), Direction::Left, now_ms);
    player.place_at_pixels(BATTLE_ORIGIN);
    player.scale = 2;
    player.state = ActorState::BattleResting;
    player
}

/// Starts walking if the player is resting and an arrow is held.
///
/// Arrows are checked in a fixed order (up, down, left, right), so holding
/// two only ever moves along one axis.
pub fn check_for_input(player: &mut Actor, keys: &KeySnapshot) {
    if player.state != ActorState::Resting {
        return;
    }

    let direction = if keys.is_held(Key::Up) {
        Direction::Up
    } else if keys.is_held(Key::Down) {
        Direction::Down
    } else if keys.is_held(Key::Left) {
        Direction::Left
    } else if keys.is_held(Key::Right) {
        Direction::Right
    } else {
        return;
    };

    player.begin_moving(direction);
}

/// A colour wash that fades in to full and back out, once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flash {
    color: Color,
    alpha: i32,
    fading_in: bool,
    active: bool,
}

impl Flash {
    pub fn new(color: Color) -> Self {
        Flash {
            color,
            alpha: 0,
            fading_in: true,
            active: false,
        }
    }

    /// Red, for taking a hit.
    pub fn damage() -> Self {
        Self::new(Color::RED)
    }

    /// Green, for potions and Cure.
    pub fn healing() -> Self {
        Self::new(Color::GREEN)
    }

    pub fn start(&mut self) {
        self.active = true;
        self.fading_in = true;
        self.alpha = 0;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn update(&mut self) {
        if !self.active {
            return;
        }

        if self.fading_in {
            self.alpha += FLASH_STEP;
            if self.alpha >= 255 {
                self.alpha = 255;
                self.fading_in = false;
            }
        } else {
            self.alpha -= FLASH_STEP;
            if self.alpha <= 0 {
                self.alpha = 0;
                self.active = false;
                self.fading_in = true;
            }
        }
    }

    /// Tint to draw the player with this tick, if any.
    pub fn tint(&self) -> Option<Color> {
        self.active
            .then(|| self.color.with_alpha(self.alpha.clamp(0, 255) as u8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_only_while_resting() {
        let mut player = level_player((3, 3), Direction::Down, 0);
        check_for_input(&mut player, &KeySnapshot::with(&[Key::Left, Key::Up]));
        assert_eq!(player.state, ActorState::Moving);
        assert_eq!(player.direction, Direction::Up);
        assert_eq!((player.x_vel, player.y_vel), (0, -PLAYER_SPEED));

        // Already moving: a new arrow does not turn the player mid-tile
        player.pos.step(player.x_vel, player.y_vel);
        check_for_input(&mut player, &KeySnapshot::with(&[Key::Right]));
        assert_eq!(player.direction, Direction::Up);
    }

    #[test]
    fn test_no_keys_keeps_resting() {
        let mut player = level_player((3, 3), Direction::Down, 0);
        check_for_input(&mut player, &KeySnapshot::with(&[Key::Confirm]));
        assert_eq!(player.state, ActorState::Resting);
    }

    #[test]
    fn test_battle_player_placement() {
        let player = battle_player(0);
        assert_eq!(player.pos.pixels(), BATTLE_ORIGIN);
        assert_eq!(player.origin(), BATTLE_ORIGIN);
        assert_eq!(player.state, ActorState::BattleResting);
        assert!(player.is_player());
    }

    #[test]
    fn test_flash_runs_once() {
        let mut flash = Flash::damage();
        assert_eq!(flash.tint(), None);

        flash.start();
        let mut ticks = 0;
        while flash.is_active() {
            flash.update();
            ticks += 1;
            assert!(ticks < 100);
        }
        // 11 steps up to 255, 11 back down to 0
        assert_eq!(ticks, 22);
        assert_eq!(flash.tint(), None);
    }
}
