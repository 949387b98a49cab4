//! Facing directions and two-frame walk cycles
//!
//! Every character sheet is a 4x2 grid of 32x32 cells:
//!
//! ```text
//! row 0: up 1 | up 2   | down 1  | down 2
//! row 1: left 1 | left 2 | right 1 | right 2
//! ```
//!
//! An [`AnimationController`] only tracks which of the two frames is showing and
//! flips it on a timer. Turning the frame into pixels is the renderer's job.

use crate::timer::Timer;
use serde::{Deserialize, Serialize};

/// Time each walk frame stays on screen.
pub const FRAME_MS: u64 = 100;

/// Frames per direction on a character sheet.
pub const FRAMES_PER_DIRECTION: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit vector in screen coordinates (y grows downward).
    pub fn unit(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Sheet cell `(column, row)` for this direction and walk frame.
    pub fn sheet_cell(self, frame: usize) -> (u32, u32) {
        let frame = (frame % FRAMES_PER_DIRECTION) as u32;
        match self {
            Direction::Up => (frame, 0),
            Direction::Down => (2 + frame, 0),
            Direction::Left => (frame, 1),
            Direction::Right => (2 + frame, 1),
        }
    }
}

/// Cycles a frame index on a fixed timer.
#[derive(Debug, Clone)]
pub struct AnimationController {
    frame: usize,
    frame_count: usize,
    timer: Timer,
}

impl AnimationController {
    pub fn new(frame_ms: u64, now_ms: u64) -> Self {
        AnimationController {
            frame: 0,
            frame_count: FRAMES_PER_DIRECTION,
            timer: Timer::new(frame_ms, now_ms),
        }
    }

    /// Advance to the next frame if the frame timer has run out.
    pub fn update(&mut self, now_ms: u64) {
        if self.timer.done(now_ms) {
            self.frame = (self.frame + 1) % self.frame_count;
            self.timer.reset(now_ms);
        }
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn set_frame(&mut self, frame: usize) {
        self.frame = frame % self.frame_count;
    }
}
