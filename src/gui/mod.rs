//! Full-Screen GUI Modes
//!
//! The screens outside the game world: title, instructions, load game, the
//! death scene and the end credits. They share the [`Menu`] list widget and
//! the [`Fade`] overlay used when entering and leaving a screen.
//!
//! # Available Components
//!
//! - [`Menu`] - arrow-driven list of choices
//! - [`MainMenuMode`], [`InstructionsMode`], [`LoadGameMode`] - title screens
//! - [`DeathSceneMode`] - "restart from last save point?"
//! - [`CreditsMode`] - the closing credit pages

pub mod credits;
pub mod death_screen;
pub mod menu;
pub mod title;

pub use credits::CreditsMode;
pub use death_screen::DeathSceneMode;
pub use menu::{Menu, MenuStyle};
pub use title::{InstructionsMode, LoadGameMode, MainMenuMode};

use crate::level::TRANSITION_SPEED;
use crate::render::{Color, Frame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeState {
    In,
    Shown,
    Out,
}

/// Screen-covering overlay that clears on entry and closes on exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fade {
    state: FadeState,
    alpha: i32,
}

impl Fade {
    pub fn new() -> Self {
        Fade {
            state: FadeState::In,
            alpha: 255,
        }
    }

    pub fn state(&self) -> FadeState {
        self.state
    }

    pub fn is_shown(&self) -> bool {
        self.state == FadeState::Shown
    }

    pub fn start_out(&mut self) {
        self.state = FadeState::Out;
    }

    /// Steps the overlay. True once a fade out has fully covered the screen.
    pub fn update(&mut self) -> bool {
        match self.state {
            FadeState::In => {
                self.alpha -= TRANSITION_SPEED;
                if self.alpha <= 0 {
                    self.alpha = 0;
                    self.state = FadeState::Shown;
                }
                false
            }
            FadeState::Shown => false,
            FadeState::Out => {
                self.alpha += TRANSITION_SPEED;
                if self.alpha >= 255 {
                    self.alpha = 255;
                    return true;
                }
                false
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame, screen: (i32, i32)) {
        if self.alpha > 0 {
            frame.overlay(screen.0, screen.1, Color::TRANSITION, self.alpha.clamp(0, 255) as u8);
        }
    }
}

impl Default for Fade {
    fn default() -> Self {
        Self::new()
    }
}

/// Rough left edge that centres `text` on `center_x`.
pub fn centered_x(text: &str, size: u32, center_x: i32) -> i32 {
    center_x - (text.chars().count() as i32 * size as i32) / 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_in_then_out() {
        let mut fade = Fade::new();
        for _ in 0..15 {
            assert!(!fade.update());
        }
        assert!(fade.is_shown());

        let mut frame = Frame::new();
        fade.draw(&mut frame, (800, 608));
        assert!(frame.commands().is_empty());

        fade.start_out();
        let ticks = (0..20).take_while(|_| !fade.update()).count();
        assert_eq!(ticks, 14);
    }
}
