//! Tile-grid positions
//!
//! Actors store their position as a tile coordinate plus a sub-tile pixel offset
//! along ONE axis. The other axis has no offset field at all, so "aligned on at
//! least one axis" holds by construction instead of being asserted after the fact.
//!
//! The only way to break the rule is to ask for motion on the axis that is not
//! currently carrying the offset while the actor sits between tiles. That is a
//! caller bug: debug builds panic, release builds snap to the nearest tile first.

use crate::collision::Rect;
use log::warn;

/// Edge length of one map tile in pixels.
pub const TILE_SIZE: i32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPosition {
    tile_x: i32,
    tile_y: i32,
    /// Pixel offset along `axis`, always in `0..TILE_SIZE`
    offset: i32,
    axis: Axis,
}

impl GridPosition {
    pub fn at_tile(tile_x: i32, tile_y: i32) -> Self {
        GridPosition {
            tile_x,
            tile_y,
            offset: 0,
            axis: Axis::X,
        }
    }

    /// Build from raw pixels. Pixels off the grid on both axes are an integrity
    /// violation and get snapped to the nearest tile.
    pub fn from_pixels(x: i32, y: i32) -> Self {
        let x_aligned = x.rem_euclid(TILE_SIZE) == 0;
        let y_aligned = y.rem_euclid(TILE_SIZE) == 0;

        match (x_aligned, y_aligned) {
            (true, true) => Self::at_tile(x / TILE_SIZE, y / TILE_SIZE),
            (true, false) => GridPosition {
                tile_x: x / TILE_SIZE,
                tile_y: y.div_euclid(TILE_SIZE),
                offset: y.rem_euclid(TILE_SIZE),
                axis: Axis::Y,
            },
            (false, true) => GridPosition {
                tile_x: x.div_euclid(TILE_SIZE),
                tile_y: y / TILE_SIZE,
                offset: x.rem_euclid(TILE_SIZE),
                axis: Axis::X,
            },
            (false, false) => {
                debug_assert!(false, "position ({}, {}) is not on the tile grid", x, y);
                warn!("snapping off-grid position ({}, {}) to nearest tile", x, y);
                Self::at_tile(nearest_tile(x), nearest_tile(y))
            }
        }
    }

    pub fn pixels(&self) -> (i32, i32) {
        let base_x = self.tile_x * TILE_SIZE;
        let base_y = self.tile_y * TILE_SIZE;
        match self.axis {
            Axis::X => (base_x + self.offset, base_y),
            Axis::Y => (base_x, base_y + self.offset),
        }
    }

    pub fn x(&self) -> i32 {
        self.pixels().0
    }

    pub fn y(&self) -> i32 {
        self.pixels().1
    }

    /// On a tile corner: aligned on both axes.
    pub fn is_aligned(&self) -> bool {
        self.offset == 0
    }

    pub fn x_aligned(&self) -> bool {
        self.axis == Axis::Y || self.offset == 0
    }

    pub fn y_aligned(&self) -> bool {
        self.axis == Axis::X || self.offset == 0
    }

    /// Tile the top-left corner is in.
    pub fn tile(&self) -> (i32, i32) {
        (self.tile_x, self.tile_y)
    }

    /// The 32x32 rect at the current pixel position.
    pub fn rect(&self) -> Rect {
        let (x, y) = self.pixels();
        Rect::new(x, y, TILE_SIZE, TILE_SIZE)
    }

    /// Move by a velocity that is non-zero on at most one axis.
    pub fn step(&mut self, dx: i32, dy: i32) {
        if dx != 0 && dy != 0 {
            debug_assert!(false, "diagonal step ({}, {})", dx, dy);
            warn!("dropping vertical part of diagonal step ({}, {})", dx, dy);
        }

        if dx != 0 {
            self.shift(Axis::X, dx);
        } else if dy != 0 {
            self.shift(Axis::Y, dy);
        }
    }

    /// Move the position back by a velocity (collision rollback).
    pub fn unstep(&mut self, dx: i32, dy: i32) {
        self.step(-dx, -dy);
    }

    /// Drop any sub-tile offset, rounding to the nearest tile.
    pub fn snap(&mut self) {
        let (x, y) = self.pixels();
        *self = Self::at_tile(nearest_tile(x), nearest_tile(y));
    }

    fn shift(&mut self, axis: Axis, delta: i32) {
        if self.axis != axis && self.offset != 0 {
            debug_assert!(
                false,
                "moving along {:?} while {} px between tiles on {:?}",
                axis, self.offset, self.axis
            );
            warn!("snapping actor to grid before changing movement axis");
            self.snap();
        }

        self.axis = axis;
        let total = self.offset + delta;
        let carry = total.div_euclid(TILE_SIZE);
        self.offset = total.rem_euclid(TILE_SIZE);
        match axis {
            Axis::X => self.tile_x += carry,
            Axis::Y => self.tile_y += carry,
        }
    }
}

fn nearest_tile(pixels: i32) -> i32 {
    (pixels + TILE_SIZE / 2).div_euclid(TILE_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_tile_is_aligned() {
        let pos = GridPosition::at_tile(3, 4);
        assert_eq!(pos.pixels(), (96, 128));
        assert!(pos.is_aligned());
        assert!(pos.x_aligned() && pos.y_aligned());
    }

    #[test]
    fn test_step_keeps_other_axis_aligned() {
        let mut pos = GridPosition::at_tile(2, 2);
        pos.step(0, 2);
        assert_eq!(pos.pixels(), (64, 66));
        assert!(pos.x_aligned());
        assert!(!pos.y_aligned());

        for _ in 0..15 {
            pos.step(0, 2);
        }
        assert_eq!(pos.pixels(), (64, 96));
        assert!(pos.is_aligned());
        assert_eq!(pos.tile(), (2, 3));
    }

    #[test]
    fn test_negative_steps_borrow_a_tile() {
        let mut pos = GridPosition::at_tile(1, 0);
        pos.step(-2, 0);
        assert_eq!(pos.pixels(), (30, 0));
        assert_eq!(pos.tile(), (0, 0));
        pos.unstep(-2, 0);
        assert_eq!(pos.pixels(), (32, 0));
        assert!(pos.is_aligned());
    }

    #[test]
    fn test_large_offsets_cross_several_tiles() {
        let mut pos = GridPosition::from_pixels(640, 224);
        for _ in 0..22 {
            pos.step(-5, 0);
        }
        assert_eq!(pos.pixels(), (530, 224));
        for _ in 0..22 {
            pos.step(5, 0);
        }
        assert_eq!(pos.pixels(), (640, 224));
    }

    #[test]
    fn test_from_pixels_on_one_axis() {
        let pos = GridPosition::from_pixels(64, 70);
        assert_eq!(pos.pixels(), (64, 70));
        assert!(pos.x_aligned());
        assert!(!pos.y_aligned());
    }

    #[test]
    fn test_snap_rounds_to_nearest() {
        let mut pos = GridPosition::at_tile(0, 0);
        pos.step(20, 0);
        pos.snap();
        assert_eq!(pos.pixels(), (32, 0));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "not on the tile grid")]
    fn test_off_grid_pixels_panic_in_debug() {
        let _ = GridPosition::from_pixels(5, 7);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "between tiles")]
    fn test_turning_between_tiles_panics_in_debug() {
        let mut pos = GridPosition::at_tile(0, 0);
        pos.step(2, 0);
        pos.step(0, 2);
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn test_turning_between_tiles_snaps_in_release() {
        let mut pos = GridPosition::at_tile(0, 0);
        pos.step(2, 0);
        pos.step(0, 2);
        assert_eq!(pos.pixels(), (0, 2));
    }
}
