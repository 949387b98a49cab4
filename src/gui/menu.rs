//! Base Menu Component
//!
//! A vertical list of choices with an arrow, used by the shops, the load-game
//! screen and the death scene. Handles keyboard navigation through an
//! [`InputLatch`] so holding a key moves the selection only once.

use crate::audio::{Mixer, SoundEffect};
use crate::collision::Rect;
use crate::input_system::{InputLatch, Key, KeySnapshot};
use crate::render::{Color, Frame};

/// Keys that re-arm the menu only once all of them are up.
const WATCHED: [Key; 3] = [Key::Up, Key::Down, Key::Confirm];

/// Configuration for menu appearance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuStyle {
    /// Menu box in screen pixels
    pub area: Rect,

    pub background_color: Color,

    pub border_color: Color,

    /// Title text color
    pub title_color: Color,

    /// Normal item text color
    pub item_color: Color,

    /// Vertical distance between items
    pub item_spacing: i32,

    pub text_size: u32,

    /// Arrow image drawn left of the selected item
    pub arrow: &'static str,
}

impl Default for MenuStyle {
    fn default() -> Self {
        MenuStyle {
            area: Rect::new(0, 448, 560, 160),
            background_color: Color::WHITE,
            border_color: Color::NEAR_BLACK,
            title_color: Color::NEAR_BLACK,
            item_color: Color::NEAR_BLACK,
            item_spacing: 40,
            text_size: 22,
            arrow: "smallarrow",
        }
    }
}

/// A stateful list menu
///
/// # Example
///
/// ```ignore
/// let mut menu = Menu::new("", vec!["Yes".to_string(), "No".to_string()]);
///
/// // Every tick
/// if let Some(index) = menu.update(&ctx.keys, &mut ctx.mixer) {
///     // index 0 is "Yes"
/// }
/// menu.render(&mut frame);
/// ```
#[derive(Debug, Clone)]
pub struct Menu {
    title: String,
    items: Vec<String>,
    selected_index: usize,
    style: MenuStyle,
    latch: InputLatch,
}

impl Menu {
    /// Creates a new menu with default styling
    pub fn new(title: impl Into<String>, items: Vec<String>) -> Self {
        Self::with_style(title, items, MenuStyle::default())
    }

    pub fn with_style(title: impl Into<String>, items: Vec<String>, style: MenuStyle) -> Self {
        Menu {
            title: title.into(),
            items,
            selected_index: 0,
            style,
            latch: InputLatch::new(),
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Swaps the choices and puts the arrow back on the first one.
    pub fn set_items(&mut self, items: Vec<String>) {
        self.items = items;
        self.selected_index = 0;
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Move selection up, stopping at the top
    pub fn select_previous(&mut self) -> bool {
        if self.selected_index == 0 {
            return false;
        }
        self.selected_index -= 1;
        true
    }

    /// Move selection down, stopping at the bottom
    pub fn select_next(&mut self) -> bool {
        if self.selected_index + 1 >= self.items.len() {
            return false;
        }
        self.selected_index += 1;
        true
    }

    /// Get currently selected index
    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn selected(&self) -> Option<&str> {
        self.items.get(self.selected_index).map(String::as_str)
    }

    /// Ignore keys until everything is released again.
    pub fn disarm(&mut self) {
        self.latch.disarm();
    }

    /// Handles one tick of input. Returns the chosen index on a confirm press.
    pub fn update(&mut self, keys: &KeySnapshot, mixer: &mut Mixer) -> Option<usize> {
        debug_assert!(
            self.items.is_empty() || self.selected_index < self.items.len(),
            "menu selection out of range"
        );
        self.selected_index = self.selected_index.min(self.items.len().saturating_sub(1));

        let mut chosen = None;
        if self.latch.pressed(keys, Key::Down) {
            if self.select_next() {
                mixer.play_effect(SoundEffect::Click);
            }
        } else if self.latch.pressed(keys, Key::Up) {
            if self.select_previous() {
                mixer.play_effect(SoundEffect::Click);
            }
        } else if !self.items.is_empty() && self.latch.pressed(keys, Key::Confirm) {
            mixer.play_effect(SoundEffect::Click2);
            chosen = Some(self.selected_index);
        }

        self.latch.release(keys, &WATCHED);
        chosen
    }

    pub fn render(&self, frame: &mut Frame) {
        let style = &self.style;
        let area = style.area;
        frame.rect(area, style.background_color, true);
        frame.rect(area, style.border_color, false);

        let mut y = area.y + 15;
        if !self.title.is_empty() {
            frame.text(self.title.as_str(), area.x + 50, y, style.text_size, style.title_color);
            y += style.item_spacing;
        }

        for (i, item) in self.items.iter().enumerate() {
            let item_y = y + i as i32 * style.item_spacing;
            if i == self.selected_index {
                frame.image(style.arrow, area.x + 50, item_y);
            }
            frame.text(item.as_str(), area.x + 100, item_y, style.text_size, style.item_color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yes_no() -> Menu {
        Menu::new("Are you sure?", vec!["Yes".to_string(), "No".to_string()])
    }

    #[test]
    fn test_confirm_needs_release_first() {
        let mut menu = yes_no();
        let mut mixer = Mixer::default();
        let confirm = KeySnapshot::with(&[Key::Confirm]);

        assert_eq!(menu.update(&confirm, &mut mixer), None);
        assert_eq!(menu.update(&KeySnapshot::new(), &mut mixer), None);
        assert_eq!(menu.update(&confirm, &mut mixer), Some(0));
        assert_eq!(menu.update(&confirm, &mut mixer), None);
    }

    #[test]
    fn test_navigation_stops_at_ends() {
        let mut menu = yes_no();
        let mut mixer = Mixer::default();
        let none = KeySnapshot::new();
        let down = KeySnapshot::with(&[Key::Down]);
        let up = KeySnapshot::with(&[Key::Up]);

        menu.update(&none, &mut mixer);
        for _ in 0..3 {
            menu.update(&down, &mut mixer);
            menu.update(&none, &mut mixer);
        }
        assert_eq!(menu.selected(), Some("No"));
        menu.update(&up, &mut mixer);
        assert_eq!(menu.selected_index(), 0);
        assert_eq!(mixer.take_effects(), vec![SoundEffect::Click, SoundEffect::Click]);
    }

    #[test]
    fn test_render_marks_selection() {
        let menu = yes_no();
        let mut frame = Frame::new();
        menu.render(&mut frame);
        assert_eq!(frame.texts(), vec!["Are you sure?", "Yes", "No"]);
    }
}
