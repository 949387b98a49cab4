//! SDL painter
//!
//! Executes a [`Frame`]'s draw commands on an SDL canvas. Images come from
//! `assets/images/<key>.png`; anything missing is drawn as a coloured
//! placeholder so the game stays playable without art.

use crate::assets::{AssetProvider, DirectoryAssets};
use crate::collision::Rect;
use crate::grid::TILE_SIZE;
use crate::render::{Color, DrawCommand, Frame};
use crate::text::{draw_text, scale_for_size};
use log::{debug, warn};
use sdl2::image::LoadTexture;
use sdl2::pixels;
use sdl2::rect;
use sdl2::render::{BlendMode, Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use std::collections::HashMap;

fn sdl_color(color: Color) -> pixels::Color {
    pixels::Color::RGBA(color.r, color.g, color.b, color.a)
}

fn sdl_rect(r: Rect) -> rect::Rect {
    rect::Rect::new(r.x, r.y, r.w.max(0) as u32, r.h.max(0) as u32)
}

/// Stable colour for a key without art, so each placeholder is recognisable.
fn placeholder_color(key: &str) -> pixels::Color {
    let hash = key
        .bytes()
        .fold(2166136261u32, |h, b| (h ^ u32::from(b)).wrapping_mul(16777619));
    pixels::Color::RGB(64 + (hash & 0x7f) as u8, 64 + ((hash >> 8) & 0x7f) as u8, 64 + ((hash >> 16) & 0x7f) as u8)
}

pub struct Painter<'a> {
    creator: &'a TextureCreator<WindowContext>,
    assets: DirectoryAssets,
    /// `None` remembers that a key has no image
    textures: HashMap<String, Option<Texture<'a>>>,
}

impl<'a> Painter<'a> {
    pub fn new(creator: &'a TextureCreator<WindowContext>, assets: DirectoryAssets) -> Self {
        Painter {
            creator,
            assets,
            textures: HashMap::new(),
        }
    }

    fn texture(&mut self, key: &str) -> Option<&mut Texture<'a>> {
        if !self.textures.contains_key(key) {
            let loaded = self.assets.image(key).and_then(|path| {
                match self.creator.load_texture(&path) {
                    Ok(texture) => {
                        debug!("loaded {}", path.display());
                        Some(texture)
                    }
                    Err(e) => {
                        warn!("could not load {}: {}", path.display(), e);
                        None
                    }
                }
            });
            self.textures.insert(key.to_string(), loaded);
        }
        self.textures.get_mut(key).and_then(Option::as_mut)
    }

    pub fn paint(&mut self, canvas: &mut Canvas<Window>, frame: &Frame) -> Result<(), String> {
        let (width, height) = canvas.logical_size();
        let screen = rect::Rect::new(0, 0, width, height);

        for command in frame.commands() {
            match command {
                DrawCommand::Fill(color) => {
                    canvas.set_draw_color(sdl_color(*color));
                    canvas.clear();
                }
                DrawCommand::MapLayer { map, viewport } => match self.texture(map) {
                    Some(texture) => canvas.copy(texture, sdl_rect(*viewport), screen)?,
                    None => {
                        canvas.set_blend_mode(BlendMode::None);
                        canvas.set_draw_color(placeholder_color(map));
                        canvas.fill_rect(screen)?;
                        canvas.set_draw_color(pixels::Color::RGB(0, 0, 0));
                        let offset_x = viewport.x.rem_euclid(TILE_SIZE);
                        let offset_y = viewport.y.rem_euclid(TILE_SIZE);
                        for x in (0..width as i32 + TILE_SIZE).step_by(TILE_SIZE as usize) {
                            canvas.draw_line((x - offset_x, 0), (x - offset_x, height as i32))?;
                        }
                        for y in (0..height as i32 + TILE_SIZE).step_by(TILE_SIZE as usize) {
                            canvas.draw_line((0, y - offset_y), (width as i32, y - offset_y))?;
                        }
                    }
                },
                DrawCommand::Sprite {
                    sheet,
                    cell,
                    x,
                    y,
                    scale,
                    alpha,
                    tint,
                } => {
                    let size = TILE_SIZE as u32;
                    let dest = rect::Rect::new(*x, *y, size * scale, size * scale);
                    match self.texture(sheet) {
                        Some(texture) => {
                            let source = rect::Rect::new(
                                (cell.0 * size) as i32,
                                (cell.1 * size) as i32,
                                size,
                                size,
                            );
                            texture.set_alpha_mod(*alpha);
                            match tint {
                                Some(tint) => texture.set_color_mod(tint.r, tint.g, tint.b),
                                None => texture.set_color_mod(255, 255, 255),
                            }
                            canvas.copy(texture, source, dest)?;
                        }
                        None => {
                            canvas.set_blend_mode(BlendMode::Blend);
                            let color = tint.map(sdl_color).unwrap_or_else(|| placeholder_color(sheet));
                            canvas.set_draw_color(pixels::Color::RGBA(color.r, color.g, color.b, *alpha));
                            canvas.fill_rect(dest)?;
                        }
                    }
                }
                DrawCommand::Image { key, x, y } => match self.texture(key) {
                    Some(texture) => {
                        let query = texture.query();
                        canvas.copy(texture, None, rect::Rect::new(*x, *y, query.width, query.height))?;
                    }
                    None => {
                        canvas.set_blend_mode(BlendMode::None);
                        canvas.set_draw_color(placeholder_color(key));
                        canvas.draw_rect(rect::Rect::new(*x, *y, TILE_SIZE as u32, TILE_SIZE as u32))?;
                    }
                },
                DrawCommand::Rect {
                    rect,
                    color,
                    filled,
                } => {
                    canvas.set_blend_mode(BlendMode::Blend);
                    canvas.set_draw_color(sdl_color(*color));
                    if *filled {
                        canvas.fill_rect(sdl_rect(*rect))?;
                    } else {
                        canvas.draw_rect(sdl_rect(*rect))?;
                    }
                }
                DrawCommand::Text {
                    text,
                    x,
                    y,
                    size,
                    color,
                } => draw_text(canvas, text, *x, *y, sdl_color(*color), scale_for_size(*size))?,
            }
        }

        Ok(())
    }
}
