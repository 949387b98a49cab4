//! Backend-neutral draw lists
//!
//! Modes never touch a canvas. Each frame they push [`DrawCommand`]s into a
//! [`Frame`], and the front-end executes the list in order. This keeps every
//! mode testable without a window: a test can inspect the frame instead of pixels.
//!
//! # Architecture
//!
//! - `DrawCommand`: one primitive (fill, map layer, sprite cell, rect, text)
//! - `Frame`: ordered list of commands for one tick
//! - `DepthSortable`: things drawn back-to-front by their y coordinate
//!
//! # Usage Example
//!
//! ```ignore
//! let mut frame = Frame::new();
//! frame.fill(Color::BLACK);
//! draw_with_depth_sorting(&mut frame, &actors, camera);
//! frame.text("Select an action.", 50, 530, 18, Color::NEAR_BLACK);
//! ```

use crate::collision::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const NEAR_BLACK: Color = Color::rgb(1, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const GOLD: Color = Color::rgb(255, 215, 0);
    pub const BATTLE_BACKGROUND: Color = Color::rgb(0, 0, 64);
    pub const TRANSITION: Color = Color::rgb(1, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Color { a, ..self }
    }
}

/// A single drawing primitive. Coordinates are screen pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole screen
    Fill(Color),
    /// Render the named tile map so that `viewport` (map pixels) fills the screen
    MapLayer { map: String, viewport: Rect },
    /// One 32x32 cell of a sprite sheet
    Sprite {
        sheet: String,
        cell: (u32, u32),
        x: i32,
        y: i32,
        scale: u32,
        alpha: u8,
        tint: Option<Color>,
    },
    /// A whole named image (dialogue boxes, arrows, backgrounds)
    Image { key: String, x: i32, y: i32 },
    Rect {
        rect: Rect,
        color: Color,
        filled: bool,
    },
    Text {
        text: String,
        x: i32,
        y: i32,
        size: u32,
        color: Color,
    },
}

/// Commands for one rendered tick, in painting order.
#[derive(Debug, Default)]
pub struct Frame {
    commands: Vec<DrawCommand>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn fill(&mut self, color: Color) {
        self.push(DrawCommand::Fill(color));
    }

    pub fn image(&mut self, key: &str, x: i32, y: i32) {
        self.push(DrawCommand::Image {
            key: key.to_string(),
            x,
            y,
        });
    }

    pub fn text(&mut self, text: impl Into<String>, x: i32, y: i32, size: u32, color: Color) {
        self.push(DrawCommand::Text {
            text: text.into(),
            x,
            y,
            size,
            color,
        });
    }

    pub fn rect(&mut self, rect: Rect, color: Color, filled: bool) {
        self.push(DrawCommand::Rect {
            rect,
            color,
            filled,
        });
    }

    /// Full-screen translucent overlay used by fade transitions.
    pub fn overlay(&mut self, width: i32, height: i32, color: Color, alpha: u8) {
        self.rect(
            Rect::new(0, 0, width, height),
            color.with_alpha(alpha),
            true,
        );
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// All text strings in the frame, for assertions in tests.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Things drawn back-to-front by their y coordinate (painter's algorithm).
pub trait DepthSortable {
    /// The y coordinate used for sorting, in map pixels.
    fn depth_y(&self) -> i32;

    /// Push draw commands, shifted by the camera origin.
    fn draw(&self, frame: &mut Frame, camera: (i32, i32));
}

/// Draw items sorted by depth. Equal depths keep their input order.
pub fn draw_with_depth_sorting(
    frame: &mut Frame,
    items: &[&dyn DepthSortable],
    camera: (i32, i32),
) {
    let mut sorted: Vec<&dyn DepthSortable> = items.to_vec();
    sorted.sort_by_key(|item| item.depth_y());

    for item in sorted {
        item.draw(frame, camera);
    }
}
