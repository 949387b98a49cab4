//! Conversations with the people on a level
//!
//! The [`DialogueHandler`] watches for a confirm press while the player rests
//! facing someone, then pages through that actor's lines one confirm press at
//! a time. When the last line is dismissed it hands out the actor's item (if
//! any, with an extra info line), starts a battle for battle-trigger actors,
//! and applies the story consequences.

use super::quest;
use crate::actor::{Actor, ActorState};
use crate::input_system::{InputLatch, Key, KeySnapshot};
use crate::item::ItemRegistry;
use crate::progress::ProgressRecord;
use crate::render::{Color, Frame};
use crate::collision::Rect;
use crate::timer::Timer;
use log::debug;

/// Cool-down between closing one conversation and opening the next.
pub const REOPEN_DELAY_MS: u64 = 300;

const BOX_HEIGHT: i32 = 140;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBoxKind {
    /// Someone speaking
    Dialogue,
    /// "Received ..." notices
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBox {
    pub kind: TextBoxKind,
    pub lines: Vec<String>,
    pub index: usize,
}

impl TextBox {
    pub fn new(kind: TextBoxKind, lines: Vec<String>) -> Self {
        TextBox {
            kind,
            lines,
            index: 0,
        }
    }

    pub fn current(&self) -> &str {
        self.lines.get(self.index).map(String::as_str).unwrap_or("")
    }

    fn on_last_line(&self) -> bool {
        self.index + 1 >= self.lines.len()
    }
}

/// What a dialogue tick asks the level to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueEvent {
    Opened,
    Closed,
    /// The conversation partner wants a fight
    StartBattle,
}

pub struct DialogueHandler {
    textbox: Option<TextBox>,
    /// Index into the level's sprites
    talking: Option<usize>,
    latch: InputLatch,
    cooldown: Timer,
}

impl DialogueHandler {
    pub fn new(now_ms: u64) -> Self {
        DialogueHandler {
            textbox: None,
            talking: None,
            latch: InputLatch::new(),
            cooldown: Timer::new(REOPEN_DELAY_MS, now_ms),
        }
    }

    pub fn is_open(&self) -> bool {
        self.textbox.is_some()
    }

    pub fn textbox(&self) -> Option<&TextBox> {
        self.textbox.as_ref()
    }

    pub fn update(
        &mut self,
        keys: &KeySnapshot,
        now_ms: u64,
        player: &Actor,
        sprites: &mut [Actor],
        progress: &mut ProgressRecord,
        registry: &ItemRegistry,
    ) -> Option<DialogueEvent> {
        let confirm = self.latch.pressed(keys, Key::Confirm);

        let event = if self.textbox.is_some() {
            if confirm {
                self.advance(now_ms, sprites, progress, registry)
            } else {
                None
            }
        } else if confirm
            && player.state == ActorState::Resting
            && self.cooldown.done(now_ms)
        {
            self.open(player, sprites)
        } else {
            None
        };

        self.latch.release(keys, &[Key::Confirm]);
        event
    }

    /// Starts talking to whoever stands on the tile the player faces.
    fn open(&mut self, player: &Actor, sprites: &mut [Actor]) -> Option<DialogueEvent> {
        let (tile_x, tile_y) = player.pos.tile();
        let (dx, dy) = player.direction.unit();
        let facing = (tile_x + dx, tile_y + dy);

        let index = sprites
            .iter()
            .position(|sprite| sprite.pos.tile() == facing && !sprite.dialogue.is_empty())?;

        let sprite = &mut sprites[index];
        debug!("talking to {}", sprite.name);
        sprite.direction = player.direction.opposite();
        self.textbox = Some(TextBox::new(TextBoxKind::Dialogue, sprite.dialogue.clone()));
        self.talking = Some(index);
        Some(DialogueEvent::Opened)
    }

    fn advance(
        &mut self,
        now_ms: u64,
        sprites: &mut [Actor],
        progress: &mut ProgressRecord,
        registry: &ItemRegistry,
    ) -> Option<DialogueEvent> {
        let textbox = self.textbox.as_mut()?;
        if !textbox.on_last_line() {
            textbox.index += 1;
            return None;
        }
        let kind = textbox.kind;

        let Some(sprite) = self.talking.and_then(|index| sprites.get_mut(index)) else {
            self.close(now_ms);
            return Some(DialogueEvent::Closed);
        };

        if kind == TextBoxKind::Dialogue {
            if let Some(grant) = sprite.item.take() {
                let notice = quest::grant_item(&grant, progress, registry);
                quest::finish_conversation(sprite, progress);
                if let Some(notice) = notice {
                    self.textbox = Some(TextBox::new(TextBoxKind::Info, vec![notice]));
                    return None;
                }
                sprite.direction = sprite.default_direction;
                self.close(now_ms);
                return Some(DialogueEvent::Closed);
            }

            if let Some(battle) = sprite.battle.clone() {
                debug!("{} starts battle {}", sprite.name, battle);
                progress.battle_type = Some(battle);
                sprite.direction = sprite.default_direction;
                self.close(now_ms);
                return Some(DialogueEvent::StartBattle);
            }

            quest::finish_conversation(sprite, progress);
        }

        sprite.direction = sprite.default_direction;
        self.close(now_ms);
        Some(DialogueEvent::Closed)
    }

    fn close(&mut self, now_ms: u64) {
        self.textbox = None;
        self.talking = None;
        self.cooldown.reset(now_ms);
    }

    pub fn draw(&self, frame: &mut Frame, screen: (i32, i32)) {
        let Some(textbox) = &self.textbox else {
            return;
        };

        let (width, height) = screen;
        let rect = Rect::new(0, height - BOX_HEIGHT, width, BOX_HEIGHT);
        frame.rect(rect, Color::WHITE, true);
        frame.rect(rect, Color::NEAR_BLACK, false);
        frame.text(textbox.current(), 40, height - BOX_HEIGHT + 50, 22, Color::NEAR_BLACK);
    }
}
