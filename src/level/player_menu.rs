//! The in-level player menu
//!
//! Four pages listed down the left edge (stats, items, magic, equipment).
//! Up/down walks the page list, confirm steps into the page's entries, and
//! confirm on an entry uses it. Cancel backs out one level; cancel or the menu
//! key on the page list closes the menu.

use crate::audio::SoundEffect;
use crate::collision::Rect;
use crate::combat::POTION_STRENGTH;
use crate::game::GameContext;
use crate::input_system::{InputLatch, Key};
use crate::item::registry::{CURE, ETHER_POTION, HEALING_POTION};
use crate::item::ItemCategory;
use crate::progress::ProgressRecord;
use crate::render::{Color, Frame};
use log::{debug, warn};

const WATCHED: [Key; 5] = [Key::Up, Key::Down, Key::Confirm, Key::Cancel, Key::Menu];

const PANEL_WIDTH: i32 = 200;
const LINE_HEIGHT: i32 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuPage {
    Stats,
    Items,
    Magic,
    Equipment,
}

impl MenuPage {
    pub const ALL: [MenuPage; 4] = [
        MenuPage::Stats,
        MenuPage::Items,
        MenuPage::Magic,
        MenuPage::Equipment,
    ];

    pub fn title(self) -> &'static str {
        match self {
            MenuPage::Stats => "Stats",
            MenuPage::Items => "Items",
            MenuPage::Magic => "Magic",
            MenuPage::Equipment => "Equipment",
        }
    }

    /// Item categories listed on the page, in display order.
    fn categories(self) -> &'static [ItemCategory] {
        match self {
            MenuPage::Stats => &[],
            MenuPage::Items => &[ItemCategory::Potion],
            MenuPage::Magic => &[ItemCategory::Spell],
            MenuPage::Equipment => &[ItemCategory::Weapon, ItemCategory::Armor],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Pages,
    Entries,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOutcome {
    Stay,
    Close,
}

pub struct PlayerMenu {
    page: usize,
    entry: usize,
    focus: Focus,
    latch: InputLatch,
    /// Feedback from the last use, e.g. "Player healed."
    message: Option<String>,
}

impl PlayerMenu {
    pub fn new() -> Self {
        PlayerMenu {
            page: 0,
            entry: 0,
            focus: Focus::Pages,
            latch: InputLatch::new(),
            message: None,
        }
    }

    /// Back to the first page with the opening key still latched.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn page(&self) -> MenuPage {
        MenuPage::ALL[self.page]
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn update(&mut self, ctx: &mut GameContext) -> MenuOutcome {
        let keys = ctx.keys;
        let mut outcome = MenuOutcome::Stay;

        if self.latch.pressed(&keys, Key::Up) {
            self.step(-1, ctx);
        } else if self.latch.pressed(&keys, Key::Down) {
            self.step(1, ctx);
        } else if self.latch.pressed(&keys, Key::Confirm) {
            self.confirm(ctx);
        } else if self.latch.pressed(&keys, Key::Cancel) {
            outcome = self.back();
        } else if self.latch.pressed(&keys, Key::Menu) {
            outcome = MenuOutcome::Close;
        }

        self.latch.release(&keys, &WATCHED);
        outcome
    }

    fn step(&mut self, delta: i32, ctx: &mut GameContext) {
        let (index, len) = match self.focus {
            Focus::Pages => (&mut self.page, MenuPage::ALL.len()),
            Focus::Entries => (&mut self.entry, entries(MenuPage::ALL[self.page], ctx).len()),
        };
        if len == 0 {
            return;
        }
        let moved = (*index as i32 + delta).clamp(0, len as i32 - 1) as usize;
        if moved != *index {
            *index = moved;
            ctx.mixer.play_effect(SoundEffect::Click);
        }
    }

    fn confirm(&mut self, ctx: &mut GameContext) {
        match self.focus {
            Focus::Pages => {
                if !entries(self.page(), ctx).is_empty() {
                    self.focus = Focus::Entries;
                    self.entry = 0;
                    self.message = None;
                    ctx.mixer.play_effect(SoundEffect::Click2);
                }
            }
            Focus::Entries => self.use_entry(ctx),
        }
    }

    fn back(&mut self) -> MenuOutcome {
        match self.focus {
            Focus::Entries => {
                self.focus = Focus::Pages;
                self.message = None;
                MenuOutcome::Stay
            }
            Focus::Pages => MenuOutcome::Close,
        }
    }

    fn use_entry(&mut self, ctx: &mut GameContext) {
        let names = entries(self.page(), ctx);
        let Some(name) = names.get(self.entry).cloned() else {
            warn!("menu selection {} out of range, resetting", self.entry);
            self.entry = 0;
            return;
        };

        let message = match self.page() {
            MenuPage::Items => drink_potion(&name, &mut ctx.progress),
            MenuPage::Magic => cast_outside_battle(&name, &mut ctx.progress),
            MenuPage::Equipment => change_equipment(&name, ctx),
            MenuPage::Stats => None,
        };
        debug!("menu used {}: {:?}", name, message);
        if message.is_some() {
            ctx.mixer.play_effect(SoundEffect::Powerup);
        }
        self.message = message;

        let remaining = entries(self.page(), ctx).len();
        if remaining == 0 {
            self.focus = Focus::Pages;
            self.entry = 0;
        } else if self.entry >= remaining {
            self.entry = remaining - 1;
        }
    }

    pub fn draw(&self, frame: &mut Frame, ctx: &GameContext) {
        let (width, height) = ctx.screen;
        let progress = &ctx.progress;

        let pages = Rect::new(0, 0, PANEL_WIDTH, height);
        frame.rect(pages, Color::rgb(30, 30, 40), true);
        frame.rect(pages, Color::WHITE, false);
        for (i, page) in MenuPage::ALL.iter().enumerate() {
            let y = 40 + i as i32 * LINE_HEIGHT;
            let color = if i == self.page { Color::GOLD } else { Color::WHITE };
            frame.text(page.title(), 40, y, 22, color);
        }

        let body = Rect::new(PANEL_WIDTH, 0, width - PANEL_WIDTH, height);
        frame.rect(body, Color::rgb(20, 20, 30), true);
        frame.rect(body, Color::WHITE, false);
        let x = PANEL_WIDTH + 40;

        match self.page() {
            MenuPage::Stats => {
                let stats = &progress.stats;
                let lines = [
                    format!("Level: {}", stats.level),
                    format!("Health: {}/{}", stats.health.current(), stats.health.maximum()),
                    format!("Magic: {}/{}", stats.magic.current(), stats.magic.maximum()),
                    format!("Experience to next level: {}", stats.experience_to_next_level),
                    format!("Gold: {}", progress.inventory.gold()),
                ];
                for (i, line) in lines.into_iter().enumerate() {
                    frame.text(line, x, 40 + i as i32 * LINE_HEIGHT, 22, Color::WHITE);
                }
            }
            page => {
                for (i, name) in entries(page, ctx).iter().enumerate() {
                    let y = 40 + i as i32 * LINE_HEIGHT;
                    let selected = self.focus == Focus::Entries && i == self.entry;
                    let color = if selected { Color::GOLD } else { Color::WHITE };
                    frame.text(entry_label(page, name, progress), x, y, 22, color);
                }
            }
        }

        if let Some(message) = &self.message {
            frame.text(message.as_str(), x, height - 60, 22, Color::GREEN);
        }
    }
}

impl Default for PlayerMenu {
    fn default() -> Self {
        Self::new()
    }
}

fn entries(page: MenuPage, ctx: &GameContext) -> Vec<String> {
    page.categories()
        .iter()
        .flat_map(|&category| ctx.progress.inventory.names_in(category, &ctx.registry))
        .collect()
}

fn entry_label(page: MenuPage, name: &str, progress: &ProgressRecord) -> String {
    let inventory = &progress.inventory;
    match page {
        MenuPage::Items => format!("{} x{}", name, inventory.quantity(name)),
        MenuPage::Equipment if inventory.is_equipped(name) => format!("{} (E)", name),
        _ => name.to_string(),
    }
}

fn drink_potion(name: &str, progress: &mut ProgressRecord) -> Option<String> {
    let strength = progress
        .inventory
        .get(name)
        .and_then(|entry| entry.power)
        .unwrap_or(POTION_STRENGTH);

    let message = match name {
        HEALING_POTION => {
            progress.stats.health.restore(strength);
            "Player healed."
        }
        ETHER_POTION => {
            progress.stats.magic.restore(strength);
            "Magic Points Increased."
        }
        _ => return None,
    };

    progress.inventory.remove_item(name, 1).ok()?;
    Some(message.to_string())
}

fn cast_outside_battle(name: &str, progress: &mut ProgressRecord) -> Option<String> {
    if name != CURE {
        return Some("Can only be used in battle.".to_string());
    }

    let entry = progress.inventory.get(name)?;
    let cost = entry.magic_points.unwrap_or(0);
    let power = entry.power.unwrap_or(0);

    if progress.stats.magic.current() < cost {
        return Some("Not enough magic points.".to_string());
    }
    progress.stats.magic.drain(cost);
    progress.stats.health.restore(power);
    Some("Player healed.".to_string())
}

fn change_equipment(name: &str, ctx: &mut GameContext) -> Option<String> {
    let category = ctx.registry.get(name)?.category;
    let inventory = &mut ctx.progress.inventory;

    match category {
        ItemCategory::Weapon => {
            inventory.equip_weapon(name).ok()?;
            ctx.mixer.play_effect(SoundEffect::Sword);
            None
        }
        ItemCategory::Armor => {
            inventory.toggle_armor(name).ok()?;
            ctx.mixer.play_effect(SoundEffect::ClothBelt);
            None
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssets;
    use crate::input_system::KeySnapshot;
    use crate::item::registry::{CHAIN_MAIL, FIRE_BLAST, LONG_SWORD};
    use crate::timer::ManualClock;

    fn context() -> GameContext {
        GameContext::headless(ManualClock::new(), MemoryAssets::new(), 4)
    }

    fn tap(menu: &mut PlayerMenu, ctx: &mut GameContext, key: Key) -> MenuOutcome {
        ctx.keys = KeySnapshot::with(&[key]);
        let outcome = menu.update(ctx);
        ctx.keys = KeySnapshot::new();
        menu.update(ctx);
        outcome
    }

    fn open_menu(ctx: &mut GameContext) -> PlayerMenu {
        let mut menu = PlayerMenu::new();
        menu.update(ctx);
        menu
    }

    #[test]
    fn test_opening_key_does_not_close() {
        let mut ctx = context();
        let mut menu = PlayerMenu::new();
        ctx.keys = KeySnapshot::with(&[Key::Menu]);
        assert_eq!(menu.update(&mut ctx), MenuOutcome::Stay);
        assert_eq!(menu.update(&mut ctx), MenuOutcome::Stay);
        ctx.keys = KeySnapshot::new();
        menu.update(&mut ctx);
        assert_eq!(tap(&mut menu, &mut ctx, Key::Menu), MenuOutcome::Close);
    }

    #[test]
    fn test_drink_healing_potion() {
        let mut ctx = context();
        ctx.progress.stats.health.drain(50);
        let mut menu = open_menu(&mut ctx);

        tap(&mut menu, &mut ctx, Key::Down);
        assert_eq!(menu.page(), MenuPage::Items);
        tap(&mut menu, &mut ctx, Key::Confirm);
        // Ether Potion sorts first
        tap(&mut menu, &mut ctx, Key::Down);
        tap(&mut menu, &mut ctx, Key::Confirm);

        assert_eq!(menu.message(), Some("Player healed."));
        assert_eq!(ctx.progress.stats.health.current(), 50);
        assert_eq!(ctx.progress.inventory.quantity(HEALING_POTION), 1);
    }

    #[test]
    fn test_last_potion_returns_to_pages() {
        let mut ctx = context();
        ctx.progress.inventory.remove_item(HEALING_POTION, 2).unwrap();
        let mut menu = open_menu(&mut ctx);

        tap(&mut menu, &mut ctx, Key::Down);
        tap(&mut menu, &mut ctx, Key::Confirm);
        tap(&mut menu, &mut ctx, Key::Confirm);

        assert!(!ctx.progress.inventory.contains(ETHER_POTION));
        assert_eq!(menu.message(), Some("Magic Points Increased."));
        // Empty page can't be entered, cancel now closes
        assert_eq!(tap(&mut menu, &mut ctx, Key::Cancel), MenuOutcome::Close);
    }

    #[test]
    fn test_cure_and_fire_blast_outside_battle() {
        let mut ctx = context();
        for spell in [CURE, FIRE_BLAST] {
            let definition = ctx.registry.get(spell).unwrap().clone();
            ctx.progress.inventory.add_item(&definition, 1);
        }
        ctx.progress.stats.health.drain(60);

        let mut menu = open_menu(&mut ctx);
        tap(&mut menu, &mut ctx, Key::Down);
        tap(&mut menu, &mut ctx, Key::Down);
        assert_eq!(menu.page(), MenuPage::Magic);
        tap(&mut menu, &mut ctx, Key::Confirm);
        tap(&mut menu, &mut ctx, Key::Confirm);

        assert_eq!(ctx.progress.stats.health.current(), 60);
        assert_eq!(ctx.progress.stats.magic.current(), 45);

        tap(&mut menu, &mut ctx, Key::Down);
        tap(&mut menu, &mut ctx, Key::Confirm);
        assert_eq!(menu.message(), Some("Can only be used in battle."));
        assert_eq!(ctx.progress.stats.magic.current(), 45);
    }

    #[test]
    fn test_equipment_page() {
        let mut ctx = context();
        for item in [LONG_SWORD, CHAIN_MAIL] {
            let definition = ctx.registry.get(item).unwrap().clone();
            ctx.progress.inventory.add_item(&definition, 1);
        }

        let mut menu = open_menu(&mut ctx);
        for _ in 0..3 {
            tap(&mut menu, &mut ctx, Key::Down);
        }
        assert_eq!(menu.page(), MenuPage::Equipment);
        tap(&mut menu, &mut ctx, Key::Confirm);

        // Long Sword, Rapier, then Chain Mail
        tap(&mut menu, &mut ctx, Key::Confirm);
        assert_eq!(ctx.progress.inventory.weapon_power(), 12);

        tap(&mut menu, &mut ctx, Key::Down);
        tap(&mut menu, &mut ctx, Key::Down);
        tap(&mut menu, &mut ctx, Key::Confirm);
        assert_eq!(ctx.progress.inventory.armor_power(), 2);
        tap(&mut menu, &mut ctx, Key::Confirm);
        assert_eq!(ctx.progress.inventory.armor_power(), 0);

        assert_eq!(tap(&mut menu, &mut ctx, Key::Cancel), MenuOutcome::Stay);
        assert_eq!(tap(&mut menu, &mut ctx, Key::Cancel), MenuOutcome::Close);
    }

    #[test]
    fn test_stats_page_draws_numbers() {
        let ctx = context();
        let menu = PlayerMenu::new();
        let mut frame = Frame::new();
        menu.draw(&mut frame, &ctx);
        let texts = frame.texts();
        assert!(texts.contains(&"Health: 70/70"));
        assert!(texts.contains(&"Gold: 100"));
    }
}
