//! Battle screen widgets
//!
//! - [`InfoBox`]: the message box along the bottom, or the item/spell list
//! - [`SelectBox`]: Attack / Items / Magic / Run
//! - [`SelectArrow`]: the pointer shared by every list on the screen
//! - [`PlayerHealth`]: health and magic read-out above the select box
//! - [`DamagePoints`]: numbers that rise off a target and fade

use super::BattleState;
use crate::audio::{Mixer, SoundEffect};
use crate::collision::Rect;
use crate::input_system::{InputLatch, Key, KeySnapshot};
use crate::progress::PlayerStats;
use crate::render::{Color, Frame};

pub const INFO_BOX: Rect = Rect::new(0, 448, 560, 160);
pub const SELECT_BOX: Rect = Rect::new(560, 448, 240, 160);
const HEALTH_BOX: Rect = Rect::new(560, 368, 240, 75);

pub const ACTIONS: [&str; 4] = ["Attack", "Items", "Magic", "Run"];
pub const BACK: &str = "BACK";

/// Opacity lost per tick by a damage number.
const DAMAGE_FADE: i32 = 5;

/// Numbers shown in the info box messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoBox {
    pub experience: u32,
    pub gold: u32,
    pub enemy_damage: u32,
    pub player_damage: u32,
    pub new_level: u32,
}

impl InfoBox {
    pub fn new(experience: u32, gold: u32) -> Self {
        InfoBox {
            experience,
            gold,
            ..Self::default()
        }
    }

    /// The message for a battle state. List states have no message.
    pub fn message(&self, state: BattleState) -> String {
        match state {
            BattleState::SelectAction => "Select an action.".to_string(),
            BattleState::SelectMagic => "Select a magic spell.".to_string(),
            BattleState::SelectItem => "Select an item.".to_string(),
            BattleState::SelectEnemy => "Select an enemy.".to_string(),
            BattleState::EnemyAttack => "Enemy attacks player!".to_string(),
            BattleState::PlayerAttack => "Player attacks enemy! ".to_string(),
            BattleState::RunAway => "RUN AWAY!!!".to_string(),
            BattleState::EnemyDamaged => format!("Enemy hit with {} damage.", self.enemy_damage),
            BattleState::PlayerDamaged => {
                if self.player_damage > 0 {
                    format!("Player hit with {} damage", self.player_damage)
                } else {
                    "Enemy missed!".to_string()
                }
            }
            BattleState::DrinkHealingPotion | BattleState::CureSpell => "Player healed.".to_string(),
            BattleState::DrinkEtherPotion => "Magic Points Increased.".to_string(),
            BattleState::FireSpell => "FIRE BLAST!".to_string(),
            BattleState::BattleWon => "Battle won!".to_string(),
            BattleState::ShowGold => format!("You found {} gold.", self.gold),
            BattleState::ShowExperience => {
                format!("You earned {} experience points this battle!", self.experience)
            }
            BattleState::LevelUp => format!("You leveled up to Level {}!", self.new_level),
            BattleState::TwoActions => "Two actions per turn mode is now available.".to_string(),
            BattleState::DeathFade | BattleState::TransitionOut => String::new(),
        }
    }

    /// Draws either the message or, while choosing, a titled list.
    pub fn draw(&self, frame: &mut Frame, state: BattleState, list: Option<(&str, &[String])>) {
        frame.rect(INFO_BOX, Color::WHITE, true);
        frame.rect(INFO_BOX, Color::NEAR_BLACK, false);

        match list {
            Some((title, entries)) => {
                frame.text(title, INFO_BOX.x + 195, INFO_BOX.y + 10, 22, Color::NEAR_BLACK);
                for (i, entry) in entries.iter().enumerate() {
                    let y = INFO_BOX.y + 20 + (i as i32 + 1) * 30;
                    frame.text(entry.as_str(), INFO_BOX.x + 100, y, 18, Color::NEAR_BLACK);
                }
            }
            None => {
                let message = self.message(state);
                frame.text(message, INFO_BOX.x + 50, INFO_BOX.y + 50, 18, Color::NEAR_BLACK);
            }
        }
    }
}

pub struct SelectBox;

impl SelectBox {
    pub fn draw(frame: &mut Frame) {
        frame.rect(SELECT_BOX, Color::WHITE, true);
        frame.rect(SELECT_BOX, Color::NEAR_BLACK, false);
        for (i, action) in ACTIONS.iter().enumerate() {
            let y = SELECT_BOX.y + 10 + i as i32 * 34;
            frame.text(*action, SELECT_BOX.x + 150, y, 22, Color::NEAR_BLACK);
        }
    }
}

/// Up/down pointer over whichever list is active.
#[derive(Debug, Clone, Copy)]
pub struct SelectArrow {
    pub index: usize,
    latch: InputLatch,
}

impl SelectArrow {
    pub fn new() -> Self {
        SelectArrow {
            index: 0,
            latch: InputLatch::new(),
        }
    }

    /// Moves within `0..len` on an arrow press, clicking when it moves.
    pub fn update(&mut self, keys: &KeySnapshot, len: usize, mixer: &mut Mixer) {
        if self.index >= len && len > 0 {
            self.index = len - 1;
        }

        if self.latch.pressed(keys, Key::Down) {
            if self.index + 1 < len {
                self.index += 1;
                mixer.play_effect(SoundEffect::Click);
            }
        } else if self.latch.pressed(keys, Key::Up) && self.index > 0 {
            self.index -= 1;
            mixer.play_effect(SoundEffect::Click);
        }
        self.latch.release(keys, &Key::ARROWS);
    }

    pub fn draw_at(&self, frame: &mut Frame, x: i32, y: i32) {
        frame.image("smallarrow", x, y);
    }
}

impl Default for SelectArrow {
    fn default() -> Self {
        Self::new()
    }
}

pub struct PlayerHealth;

impl PlayerHealth {
    pub fn draw(frame: &mut Frame, stats: &PlayerStats) {
        frame.rect(HEALTH_BOX, Color::WHITE, true);
        frame.rect(HEALTH_BOX, Color::NEAR_BLACK, false);
        let health = format!("Health: {}/{}", stats.health.current(), stats.health.maximum());
        let magic = format!("Magic:  {}/{}", stats.magic.current(), stats.magic.maximum());
        frame.text(health, HEALTH_BOX.x + 20, HEALTH_BOX.y + 9, 22, Color::NEAR_BLACK);
        frame.text(magic, HEALTH_BOX.x + 20, HEALTH_BOX.y + 38, 22, Color::NEAR_BLACK);
    }
}

/// A damage or healing number drifting up from where it landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamagePoints {
    pub text: String,
    pub color: Color,
    x: i32,
    y: i32,
    alpha: i32,
}

impl DamagePoints {
    /// Red damage number, "Miss" for zero.
    pub fn damage(amount: u32, at: (i32, i32)) -> Self {
        Self::new(crate::combat::damage_text(amount), Color::RED, at)
    }

    /// Green for health, blue for magic.
    pub fn healing(amount: u32, at: (i32, i32), magic: bool) -> Self {
        let color = if magic {
            Color::rgb(0, 120, 255)
        } else {
            Color::GREEN
        };
        Self::new(crate::combat::heal_text(amount), color, at)
    }

    fn new(text: String, color: Color, at: (i32, i32)) -> Self {
        DamagePoints {
            text,
            color,
            x: at.0,
            y: at.1,
            alpha: 255,
        }
    }

    pub fn update(&mut self) {
        self.y -= 1;
        self.alpha -= DAMAGE_FADE;
    }

    pub fn is_faded(&self) -> bool {
        self.alpha <= 0
    }

    pub fn draw(&self, frame: &mut Frame) {
        let color = self.color.with_alpha(self.alpha.clamp(0, 255) as u8);
        frame.text(self.text.as_str(), self.x, self.y, 22, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_damage_message() {
        let mut info = InfoBox::new(12, 30);
        info.player_damage = 4;
        assert_eq!(info.message(BattleState::PlayerDamaged), "Player hit with 4 damage");
        info.player_damage = 0;
        assert_eq!(info.message(BattleState::PlayerDamaged), "Enemy missed!");
        assert_eq!(info.message(BattleState::ShowGold), "You found 30 gold.");
        assert_eq!(
            info.message(BattleState::ShowExperience),
            "You earned 12 experience points this battle!"
        );
    }

    #[test]
    fn test_arrow_stops_at_ends() {
        let mut mixer = Mixer::default();
        let mut arrow = SelectArrow::new();
        let none = KeySnapshot::new();
        let down = KeySnapshot::with(&[Key::Down]);

        arrow.update(&none, 2, &mut mixer);
        for _ in 0..3 {
            arrow.update(&down, 2, &mut mixer);
            arrow.update(&none, 2, &mut mixer);
        }
        assert_eq!(arrow.index, 1);
        assert_eq!(mixer.take_effects(), vec![SoundEffect::Click]);
    }

    #[test]
    fn test_damage_points_fade() {
        let mut points = DamagePoints::damage(0, (10, 100));
        assert_eq!(points.text, "Miss");
        for _ in 0..51 {
            points.update();
        }
        assert!(points.is_faded());

        let heal = DamagePoints::healing(30, (0, 0), false);
        assert_eq!(heal.text, "+30");
    }
}
