//! Shop counter dialogue
//!
//! [`ShopGui`] runs one visit's conversation with the keeper:
//!
//! ```text
//! dialogue -> buy/sell -> select  -> confirm purchase -> accept | reject | has item
//!                      -> sell    -> confirm sale     -> accept sale | can't sell equipped
//!                      -> can't sell (nothing to offer)
//! ```
//!
//! The inn and the magic shop skip the buy/sell question and do not buy
//! anything back. Every message waits for a confirm press and then returns to
//! the start of a new transaction.

use super::{ShopItem, ShopSetup};
use crate::audio::SoundEffect;
use crate::collision::Rect;
use crate::error::GameError;
use crate::game::GameContext;
use crate::gui::Menu;
use crate::input_system::{InputLatch, Key};
use crate::inventory::InventoryError;
use crate::item::{ItemCategory, ItemDefinition};
use crate::render::{Color, Frame};
use log::{debug, info, warn};

const DIALOGUE_BOX: Rect = Rect::new(0, 0, 800, 140);
const GOLD_BOX: Rect = Rect::new(560, 448, 240, 160);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopState {
    Dialogue,
    BuySell,
    Select,
    ConfirmPurchase,
    Sell,
    ConfirmSell,
    Accept,
    AcceptSell,
    Reject,
    HasItem,
    CantSell,
    CantSellEquippedWeapon,
    CantSellEquippedArmor,
}

impl ShopState {
    /// States that show the choice box.
    fn has_menu(self) -> bool {
        matches!(
            self,
            ShopState::BuySell
                | ShopState::Select
                | ShopState::ConfirmPurchase
                | ShopState::Sell
                | ShopState::ConfirmSell
        )
    }
}

/// What the shop mode should do after a GUI tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopOutcome {
    Stay,
    Leave,
}

pub struct ShopGui {
    setup: ShopSetup,
    state: ShopState,
    /// Line of the welcome dialogue on screen
    index: usize,
    menu: Menu,
    latch: InputLatch,
    /// Catalogue index of the item being bought
    purchase: Option<usize>,
    /// Catalogue indices behind the sell list, in list order
    sell_choices: Vec<usize>,
    /// Catalogue index of the item being sold
    sale: Option<usize>,
}

impl ShopGui {
    pub fn new(setup: ShopSetup) -> Self {
        ShopGui {
            setup,
            state: ShopState::Dialogue,
            index: 0,
            menu: Menu::new("", Vec::new()),
            latch: InputLatch::new(),
            purchase: None,
            sell_choices: Vec::new(),
            sale: None,
        }
    }

    pub fn state(&self) -> ShopState {
        self.state
    }

    pub fn choices(&self) -> &[String] {
        self.menu.items()
    }

    /// The text in the dialogue box this tick.
    pub fn message(&self) -> &str {
        match self.state {
            ShopState::Dialogue | ShopState::Select => self
                .setup
                .dialogue
                .get(self.index)
                .map(String::as_str)
                .unwrap_or(""),
            ShopState::BuySell => "Would you like to buy or sell an item?",
            ShopState::ConfirmPurchase | ShopState::ConfirmSell => "Are you sure?",
            ShopState::Sell => "What would you like to sell?",
            ShopState::Accept => self.setup.accept,
            ShopState::AcceptSell => "Item sold.",
            ShopState::Reject => "You don't have enough gold!",
            ShopState::HasItem => "You have that item already.",
            ShopState::CantSell => "You don't have anything to sell!",
            ShopState::CantSellEquippedWeapon => "You can't sell an equipped weapon.",
            ShopState::CantSellEquippedArmor => "You can't sell equipped armor.",
        }
    }

    pub fn update(&mut self, ctx: &mut GameContext) -> Result<ShopOutcome, GameError> {
        if self.state.has_menu() {
            let Some(choice) = self.menu.update(&ctx.keys, &mut ctx.mixer) else {
                return Ok(ShopOutcome::Stay);
            };
            return self.choose(choice, ctx);
        }

        let keys = ctx.keys;
        let confirmed = self.latch.pressed(&keys, Key::Confirm);
        self.latch.release(&keys, &[Key::Confirm]);
        if !confirmed {
            return Ok(ShopOutcome::Stay);
        }

        match self.state {
            ShopState::Dialogue => {
                if self.index + 1 < self.setup.dialogue.len() {
                    self.index += 1;
                    ctx.mixer.play_effect(SoundEffect::Click2);
                }
                if self.index + 1 >= self.setup.dialogue.len() {
                    self.begin_new_transaction(ctx);
                }
            }
            ShopState::CantSell | ShopState::CantSellEquippedWeapon | ShopState::CantSellEquippedArmor => {
                ctx.mixer.play_effect(SoundEffect::Click2);
                self.enter(ShopState::BuySell, ctx);
            }
            _ => {
                ctx.mixer.play_effect(SoundEffect::Click2);
                self.begin_new_transaction(ctx);
            }
        }
        Ok(ShopOutcome::Stay)
    }

    fn choose(&mut self, choice: usize, ctx: &mut GameContext) -> Result<ShopOutcome, GameError> {
        match self.state {
            ShopState::BuySell => match choice {
                0 => self.enter(ShopState::Select, ctx),
                1 if self.has_sellable_items(ctx) => self.enter(ShopState::Sell, ctx),
                1 => self.enter(ShopState::CantSell, ctx),
                _ => return Ok(ShopOutcome::Leave),
            },
            ShopState::Select => {
                if choice < self.setup.catalogue.len() {
                    self.purchase = Some(choice);
                    self.enter(ShopState::ConfirmPurchase, ctx);
                } else if self.setup.sells {
                    self.enter(ShopState::BuySell, ctx);
                } else {
                    return Ok(ShopOutcome::Leave);
                }
            }
            ShopState::ConfirmPurchase => {
                if choice == 0 {
                    self.buy_item(ctx)?;
                } else {
                    self.begin_new_transaction(ctx);
                }
            }
            ShopState::Sell => match self.sell_choices.get(choice).copied() {
                Some(index) => {
                    self.sale = Some(index);
                    self.enter(ShopState::ConfirmSell, ctx);
                }
                None => self.enter(ShopState::BuySell, ctx),
            },
            ShopState::ConfirmSell => {
                if choice == 0 {
                    self.sell_item(ctx);
                } else {
                    self.begin_new_transaction(ctx);
                }
            }
            _ => {}
        }
        Ok(ShopOutcome::Stay)
    }

    fn begin_new_transaction(&mut self, ctx: &GameContext) {
        let state = if self.setup.sells {
            ShopState::BuySell
        } else {
            ShopState::Select
        };
        self.enter(state, ctx);
    }

    /// Switches state, fills the choice box and waits for a key release.
    fn enter(&mut self, state: ShopState, ctx: &GameContext) {
        debug!("shop: {:?} -> {:?}", self.state, state);
        self.state = state;

        let items = match state {
            ShopState::BuySell => vec!["Buy".to_string(), "Sell".to_string(), "Leave".to_string()],
            ShopState::Select => {
                let last = if self.setup.sells { "Cancel" } else { "Leave" };
                self.setup
                    .catalogue
                    .iter()
                    .map(|item| item.label.clone())
                    .chain(std::iter::once(last.to_string()))
                    .collect()
            }
            ShopState::ConfirmPurchase | ShopState::ConfirmSell => {
                vec!["Yes".to_string(), "No".to_string()]
            }
            ShopState::Sell => {
                let inventory = &ctx.progress.inventory;
                self.sell_choices = self
                    .setup
                    .catalogue
                    .iter()
                    .enumerate()
                    .filter(|(_, item)| inventory.contains(item.name))
                    .map(|(index, _)| index)
                    .collect();
                self.sell_choices
                    .iter()
                    .map(|&index| {
                        let item = &self.setup.catalogue[index];
                        format!("{} ({} gold)", item.name, item.sale_price())
                    })
                    .chain(std::iter::once("Cancel".to_string()))
                    .collect()
            }
            _ => Vec::new(),
        };

        self.menu.set_items(items);
        self.menu.disarm();
        self.latch.disarm();
    }

    fn has_sellable_items(&self, ctx: &GameContext) -> bool {
        self.setup
            .catalogue
            .iter()
            .any(|item| ctx.progress.inventory.contains(item.name))
    }

    /// Charges first, then refunds if the item turns out to be owned already.
    fn buy_item(&mut self, ctx: &mut GameContext) -> Result<(), GameError> {
        let Some(item) = self.purchase.and_then(|index| self.setup.catalogue.get(index)).cloned() else {
            self.begin_new_transaction(ctx);
            return Ok(());
        };
        let inventory = &mut ctx.progress.inventory;

        match inventory.spend_gold(item.price) {
            Err(InventoryError::InsufficientGold { price, available }) => {
                debug!("shop: {} costs {}, player has {}", item.name, price, available);
                self.enter(ShopState::Reject, ctx);
                return Ok(());
            }
            Err(err) => {
                warn!("shop: purchase of {} failed: {}", item.name, err);
                self.enter(ShopState::Reject, ctx);
                return Ok(());
            }
            Ok(()) => {}
        }

        if !self.setup.duplicates && inventory.contains(item.name) {
            inventory.add_gold(item.price);
            self.enter(ShopState::HasItem, ctx);
            return Ok(());
        }

        add_player_item(&item, ctx)?;
        info!("bought {} for {} gold", item.name, item.price);
        ctx.mixer.play_effect(SoundEffect::ClothBelt);
        self.enter(ShopState::Accept, ctx);
        Ok(())
    }

    fn sell_item(&mut self, ctx: &mut GameContext) {
        let Some(item) = self.sale.and_then(|index| self.setup.catalogue.get(index)).cloned() else {
            self.begin_new_transaction(ctx);
            return;
        };

        let category = ctx.registry.get(item.name).map(|definition| definition.category);
        let inventory = &mut ctx.progress.inventory;
        if inventory.is_equipped(item.name) {
            let state = if category == Some(ItemCategory::Weapon) {
                ShopState::CantSellEquippedWeapon
            } else {
                ShopState::CantSellEquippedArmor
            };
            self.enter(state, ctx);
            return;
        }

        if let Err(err) = inventory.remove_item(item.name, 1) {
            warn!("shop: cannot sell {}: {}", item.name, err);
            self.begin_new_transaction(ctx);
            return;
        }
        inventory.add_gold(item.sale_price());
        info!("sold {} for {} gold", item.name, item.sale_price());
        ctx.mixer.play_effect(SoundEffect::ClothBelt);
        self.enter(ShopState::AcceptSell, ctx);
    }

    pub fn draw(&self, frame: &mut Frame, ctx: &GameContext) {
        frame.rect(DIALOGUE_BOX, Color::WHITE, true);
        frame.rect(DIALOGUE_BOX, Color::NEAR_BLACK, false);
        frame.text(self.message(), DIALOGUE_BOX.x + 50, DIALOGUE_BOX.y + 50, 22, Color::NEAR_BLACK);
        if self.state == ShopState::Dialogue && self.index + 1 < self.setup.dialogue.len() {
            frame.image("nextarrow", DIALOGUE_BOX.w - 60, DIALOGUE_BOX.h - 40);
        }

        frame.rect(GOLD_BOX, Color::WHITE, true);
        frame.rect(GOLD_BOX, Color::NEAR_BLACK, false);
        let gold = format!("Gold: {}", ctx.progress.inventory.gold());
        frame.text(gold, GOLD_BOX.x + 80, GOLD_BOX.y + 60, 22, Color::NEAR_BLACK);

        if self.state.has_menu() {
            self.menu.render(frame);
        }
    }
}

/// Puts a bought item to use: weapons and armor are worn straight away, the
/// inn room restores everything and checkpoints the game.
fn add_player_item(item: &ShopItem, ctx: &mut GameContext) -> Result<(), GameError> {
    let definition: ItemDefinition = ctx
        .registry
        .get(item.name)
        .cloned()
        .ok_or_else(|| GameError::Config(format!("shop sells unknown item '{}'", item.name)))?;
    let inventory = &mut ctx.progress.inventory;

    match definition.category {
        ItemCategory::Weapon => {
            inventory.add_item(&definition, item.quantity);
            inventory
                .equip_weapon(item.name)
                .map_err(|e| GameError::Config(e.to_string()))?;
        }
        ItemCategory::Armor => {
            inventory.add_item(&definition, item.quantity);
            inventory
                .equip_armor(item.name)
                .map_err(|e| GameError::Config(e.to_string()))?;
        }
        ItemCategory::Spell => inventory.add_item(&definition, 1),
        ItemCategory::Potion | ItemCategory::QuestItem => inventory.add_item(&definition, item.quantity),
        ItemCategory::Service => {
            ctx.progress.stats.full_restore();
            ctx.store.save(&ctx.progress)?;
            info!("rested at the inn, game saved");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssets;
    use crate::game::ModeId;
    use crate::input_system::KeySnapshot;
    use crate::item::registry::{CHAIN_MAIL, CURE, HEALING_POTION, LONG_SWORD, RAPIER};
    use crate::shop::shop_setup;
    use crate::timer::ManualClock;

    fn open(shop: ModeId) -> (ShopGui, GameContext) {
        let mut ctx = GameContext::headless(ManualClock::new(), MemoryAssets::new(), 1);
        let gui = ShopGui::new(shop_setup(shop, &ctx.registry));
        ctx.keys = KeySnapshot::new();
        (gui, ctx)
    }

    fn press(gui: &mut ShopGui, ctx: &mut GameContext, key: Key) -> ShopOutcome {
        ctx.keys = KeySnapshot::new();
        gui.update(ctx).unwrap();
        ctx.keys = KeySnapshot::with(&[key]);
        let outcome = gui.update(ctx).unwrap();
        ctx.keys = KeySnapshot::new();
        gui.update(ctx).unwrap();
        outcome
    }

    /// Presses Down `steps` times, then Confirm.
    fn pick(gui: &mut ShopGui, ctx: &mut GameContext, steps: usize) -> ShopOutcome {
        for _ in 0..steps {
            press(gui, ctx, Key::Down);
        }
        press(gui, ctx, Key::Confirm)
    }

    #[test]
    fn test_welcome_leads_to_buy_sell() {
        let (mut gui, mut ctx) = open(ModeId::WeaponShop);
        assert_eq!(gui.message(), "Welcome to the Weapon shop!");
        press(&mut gui, &mut ctx, Key::Confirm);
        assert_eq!(gui.state(), ShopState::BuySell);
        assert_eq!(gui.choices(), ["Buy", "Sell", "Leave"]);

        pick(&mut gui, &mut ctx, 0);
        assert_eq!(gui.state(), ShopState::Select);
        assert_eq!(gui.message(), "What weapon would you like to buy?");
        assert_eq!(gui.choices(), ["Long Sword (150 gold)", "Rapier (50 gold)", "Cancel"]);
    }

    #[test]
    fn test_not_enough_gold() {
        let (mut gui, mut ctx) = open(ModeId::WeaponShop);
        press(&mut gui, &mut ctx, Key::Confirm);
        pick(&mut gui, &mut ctx, 0);
        pick(&mut gui, &mut ctx, 0);
        assert_eq!(gui.state(), ShopState::ConfirmPurchase);
        pick(&mut gui, &mut ctx, 0);

        assert_eq!(gui.state(), ShopState::Reject);
        assert_eq!(ctx.progress.inventory.gold(), 100);
        assert!(!ctx.progress.inventory.contains(LONG_SWORD));

        press(&mut gui, &mut ctx, Key::Confirm);
        assert_eq!(gui.state(), ShopState::BuySell);
    }

    #[test]
    fn test_buying_a_weapon_equips_it() {
        let (mut gui, mut ctx) = open(ModeId::WeaponShop);
        ctx.progress.inventory.add_gold(100);
        press(&mut gui, &mut ctx, Key::Confirm);
        pick(&mut gui, &mut ctx, 0);
        pick(&mut gui, &mut ctx, 0);
        pick(&mut gui, &mut ctx, 0);

        assert_eq!(gui.state(), ShopState::Accept);
        assert_eq!(gui.message(), "Item purchased.");
        assert_eq!(ctx.progress.inventory.gold(), 50);
        assert_eq!(ctx.progress.inventory.equipped_weapon(), Some(LONG_SWORD));
        assert!(ctx.mixer.take_effects().contains(&SoundEffect::ClothBelt));
    }

    #[test]
    fn test_owned_item_is_refunded() {
        let (mut gui, mut ctx) = open(ModeId::WeaponShop);
        press(&mut gui, &mut ctx, Key::Confirm);
        pick(&mut gui, &mut ctx, 0);
        // Rapier, already owned
        pick(&mut gui, &mut ctx, 1);
        pick(&mut gui, &mut ctx, 0);

        assert_eq!(gui.state(), ShopState::HasItem);
        assert_eq!(ctx.progress.inventory.gold(), 100);
        assert_eq!(ctx.progress.inventory.quantity(RAPIER), 1);
    }

    #[test]
    fn test_equipped_weapon_cannot_be_sold() {
        let (mut gui, mut ctx) = open(ModeId::WeaponShop);
        press(&mut gui, &mut ctx, Key::Confirm);
        pick(&mut gui, &mut ctx, 1);
        assert_eq!(gui.state(), ShopState::Sell);
        assert_eq!(gui.choices(), ["Rapier (25 gold)", "Cancel"]);

        pick(&mut gui, &mut ctx, 0);
        pick(&mut gui, &mut ctx, 0);
        assert_eq!(gui.state(), ShopState::CantSellEquippedWeapon);
        assert!(ctx.progress.inventory.contains(RAPIER));

        press(&mut gui, &mut ctx, Key::Confirm);
        assert_eq!(gui.state(), ShopState::BuySell);
    }

    #[test]
    fn test_nothing_to_sell_at_armor_shop() {
        let (mut gui, mut ctx) = open(ModeId::ArmorShop);
        press(&mut gui, &mut ctx, Key::Confirm);
        pick(&mut gui, &mut ctx, 1);
        assert_eq!(gui.state(), ShopState::CantSell);

        // Chain Mail goes on as soon as it is bought
        pick(&mut gui, &mut ctx, 0);
        assert_eq!(gui.state(), ShopState::BuySell);
        pick(&mut gui, &mut ctx, 0);
        pick(&mut gui, &mut ctx, 0);
        pick(&mut gui, &mut ctx, 0);
        assert_eq!(gui.state(), ShopState::Accept);
        assert!(ctx.progress.inventory.is_equipped(CHAIN_MAIL));
        assert_eq!(ctx.progress.inventory.armor_power(), 2);
    }

    #[test]
    fn test_potions_stack_and_sell_for_half() {
        let (mut gui, mut ctx) = open(ModeId::PotionShop);
        press(&mut gui, &mut ctx, Key::Confirm);
        pick(&mut gui, &mut ctx, 0);
        pick(&mut gui, &mut ctx, 0);
        pick(&mut gui, &mut ctx, 0);
        assert_eq!(gui.state(), ShopState::Accept);
        assert_eq!(ctx.progress.inventory.quantity(HEALING_POTION), 3);
        assert_eq!(ctx.progress.inventory.gold(), 85);

        press(&mut gui, &mut ctx, Key::Confirm);
        pick(&mut gui, &mut ctx, 1);
        pick(&mut gui, &mut ctx, 0);
        pick(&mut gui, &mut ctx, 0);
        assert_eq!(gui.state(), ShopState::AcceptSell);
        assert_eq!(ctx.progress.inventory.quantity(HEALING_POTION), 2);
        assert_eq!(ctx.progress.inventory.gold(), 92);
    }

    #[test]
    fn test_selling_the_last_potion_drops_the_entry() {
        let (mut gui, mut ctx) = open(ModeId::PotionShop);
        ctx.progress.inventory.remove_item(HEALING_POTION, 1).unwrap();
        assert_eq!(ctx.progress.inventory.quantity(HEALING_POTION), 1);

        press(&mut gui, &mut ctx, Key::Confirm);
        pick(&mut gui, &mut ctx, 1);
        assert_eq!(gui.state(), ShopState::Sell);
        pick(&mut gui, &mut ctx, 0);
        pick(&mut gui, &mut ctx, 0);

        assert_eq!(gui.state(), ShopState::AcceptSell);
        assert!(ctx.progress.inventory.get(HEALING_POTION).is_none());
        assert!(!ctx.progress.inventory.contains(HEALING_POTION));
        // Half of 15, rounded down
        assert_eq!(ctx.progress.inventory.gold(), 107);
    }

    #[test]
    fn test_magic_shop_has_no_selling() {
        let (mut gui, mut ctx) = open(ModeId::MagicShop);
        press(&mut gui, &mut ctx, Key::Confirm);
        assert_eq!(gui.state(), ShopState::Select);
        assert_eq!(gui.choices(), ["Cure (50 gold)", "Fire Blast (150 gold)", "Leave"]);

        pick(&mut gui, &mut ctx, 0);
        pick(&mut gui, &mut ctx, 0);
        assert_eq!(gui.state(), ShopState::Accept);
        assert!(ctx.progress.inventory.contains(CURE));
        assert_eq!(ctx.progress.inventory.gold(), 50);

        press(&mut gui, &mut ctx, Key::Confirm);
        assert_eq!(pick(&mut gui, &mut ctx, 2), ShopOutcome::Leave);
    }

    #[test]
    fn test_inn_restores_and_saves() {
        let (mut gui, mut ctx) = open(ModeId::Inn);
        ctx.progress.stats.health.drain(50);
        ctx.progress.stats.magic.drain(20);
        assert!(!ctx.store.exists());

        press(&mut gui, &mut ctx, Key::Confirm);
        assert_eq!(gui.choices(), ["Rent a room (30 gold)", "Leave"]);
        pick(&mut gui, &mut ctx, 0);
        pick(&mut gui, &mut ctx, 0);

        assert_eq!(gui.state(), ShopState::Accept);
        assert_eq!(gui.message(), "Your health has been replenished and your game saved!");
        assert_eq!(ctx.progress.stats.health.current(), 70);
        assert_eq!(ctx.progress.stats.magic.current(), 70);
        assert_eq!(ctx.progress.inventory.gold(), 70);
        let saved = ctx.store.load().unwrap().unwrap();
        assert_eq!(saved.stats.health.current(), 70);
        assert_eq!(saved.inventory.gold(), 70);
    }
}
