//! Shops and the inn
//!
//! Every shop is the same [`ShopMode`] with a different [`ShopSetup`]: who
//! stands behind the counter, what they say, what they stock and whether they
//! buy things back. The conversation itself lives in [`gui`].

pub mod gui;

pub use gui::{ShopGui, ShopOutcome, ShopState};

use crate::animation::Direction;
use crate::error::GameError;
use crate::game::{GameContext, Mode, ModeId, ModeStatus};
use crate::item::ItemRegistry;
use crate::item::registry::{
    CHAIN_MAIL, CURE, ETHER_POTION, FIRE_BLAST, HEALING_POTION, LONG_SWORD, RAPIER, ROOM,
    WOODEN_SHIELD,
};
use crate::level::TRANSITION_SPEED;
use crate::render::{Color, DrawCommand, Frame};
use log::{debug, info};

/// One line of a shop's stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopItem {
    pub name: &'static str,
    pub price: u32,
    /// How many one purchase hands over
    pub quantity: u32,
    /// Text in the choice box
    pub label: String,
}

impl ShopItem {
    fn new(name: &'static str, quantity: u32, registry: &ItemRegistry) -> Self {
        let price = registry.get(name).map_or(0, |definition| definition.value);
        ShopItem {
            name,
            price,
            quantity,
            label: format!("{} ({} gold)", name, price),
        }
    }

    /// Shops buy back at half price, rounded down.
    pub fn sale_price(&self) -> u32 {
        self.price / 2
    }
}

/// Everything that tells one shop apart from another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopSetup {
    /// Sprite sheet of the shopkeeper
    pub keeper: &'static str,
    pub dialogue: Vec<String>,
    pub accept: &'static str,
    pub catalogue: Vec<ShopItem>,
    /// Whether the keeper buys items back
    pub sells: bool,
    /// Whether owned items may be bought again
    pub duplicates: bool,
}

/// The stock and script of each shop.
pub fn shop_setup(id: ModeId, registry: &ItemRegistry) -> ShopSetup {
    let welcome = |name: &str, question: &str| vec![format!("Welcome to the {}!", name), question.to_string()];

    match id {
        ModeId::Inn => {
            let mut room = ShopItem::new(ROOM, 0, registry);
            room.label = format!("Rent a room ({} gold)", room.price);
            ShopSetup {
                keeper: "innman",
                dialogue: welcome("Inn", "Would you like a room to restore your health?"),
                accept: "Your health has been replenished and your game saved!",
                catalogue: vec![room],
                sells: false,
                duplicates: true,
            }
        }
        ModeId::WeaponShop => ShopSetup {
            keeper: "weaponman",
            dialogue: welcome("Weapon shop", "What weapon would you like to buy?"),
            accept: "Item purchased.",
            catalogue: vec![ShopItem::new(LONG_SWORD, 1, registry), ShopItem::new(RAPIER, 1, registry)],
            sells: true,
            duplicates: false,
        },
        ModeId::ArmorShop => ShopSetup {
            keeper: "armorman",
            dialogue: welcome("Armor shop", "Which piece of armor would you like to buy?"),
            accept: "Item purchased.",
            catalogue: vec![
                ShopItem::new(CHAIN_MAIL, 1, registry),
                ShopItem::new(WOODEN_SHIELD, 1, registry),
            ],
            sells: true,
            duplicates: false,
        },
        ModeId::MagicShop => ShopSetup {
            keeper: "magiclady",
            dialogue: welcome("Magic shop", "Which magic spell would you like to buy?"),
            accept: "Item purchased.",
            catalogue: vec![ShopItem::new(CURE, 1, registry), ShopItem::new(FIRE_BLAST, 1, registry)],
            sells: false,
            duplicates: false,
        },
        _ => {
            debug_assert_eq!(id, ModeId::PotionShop, "{} is not a shop", id);
            ShopSetup {
                keeper: "potionlady",
                dialogue: welcome("Potion shop", "What potion would you like to buy?"),
                accept: "Item purchased.",
                catalogue: vec![
                    ShopItem::new(HEALING_POTION, 1, registry),
                    ShopItem::new(ETHER_POTION, 1, registry),
                ],
                sells: true,
                duplicates: true,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopVisit {
    TransitionIn,
    Normal,
    TransitionOut,
}

pub struct ShopMode {
    id: ModeId,
    status: ModeStatus,
    gui: Option<ShopGui>,
    keeper: &'static str,
    visit: ShopVisit,
    alpha: i32,
}

impl ShopMode {
    pub fn new(id: ModeId) -> Self {
        debug_assert!(ModeId::SHOPS.contains(&id), "{} is not a shop", id);
        ShopMode {
            id,
            status: ModeStatus::default(),
            gui: None,
            keeper: "",
            visit: ShopVisit::TransitionIn,
            alpha: 255,
        }
    }

    pub fn gui(&self) -> Option<&ShopGui> {
        self.gui.as_ref()
    }

    pub fn visit(&self) -> ShopVisit {
        self.visit
    }
}

impl Mode for ShopMode {
    fn id(&self) -> ModeId {
        self.id
    }

    fn status(&self) -> &ModeStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut ModeStatus {
        &mut self.status
    }

    fn startup(&mut self, ctx: &mut GameContext) -> Result<(), GameError> {
        info!("entering {}", self.id);
        let setup = shop_setup(self.id, &ctx.registry);
        self.keeper = setup.keeper;
        self.gui = Some(ShopGui::new(setup));
        self.status.next = Some(ModeId::Town);
        self.visit = ShopVisit::TransitionIn;
        self.alpha = 255;
        ctx.progress.last_direction = Direction::Down;
        ctx.mixer.set_level_song(self.id, Some("shop_theme"));
        Ok(())
    }

    fn update(&mut self, ctx: &mut GameContext) -> Result<(), GameError> {
        match self.visit {
            ShopVisit::TransitionIn => {
                self.alpha -= TRANSITION_SPEED;
                if self.alpha <= 0 {
                    self.alpha = 0;
                    self.visit = ShopVisit::Normal;
                }
            }
            ShopVisit::Normal => {
                let Some(gui) = self.gui.as_mut() else {
                    return Ok(());
                };
                if gui.update(ctx)? == ShopOutcome::Leave {
                    debug!("leaving {}", self.id);
                    ctx.progress.last_state = Some(self.id);
                    self.visit = ShopVisit::TransitionOut;
                }
            }
            ShopVisit::TransitionOut => {
                self.alpha += TRANSITION_SPEED;
                if self.alpha >= 255 {
                    self.alpha = 255;
                    self.status.done = true;
                }
            }
        }
        Ok(())
    }

    fn draw(&self, ctx: &GameContext, frame: &mut Frame) {
        let (width, height) = ctx.screen;
        frame.fill(Color::BLACK);

        for (sheet, x) in [("player", 150), (self.keeper, 600)] {
            frame.push(DrawCommand::Sprite {
                sheet: sheet.to_string(),
                cell: (0, 0),
                x,
                y: 200,
                scale: 6,
                alpha: 255,
                tint: None,
            });
        }
        frame.image("shop_counter", 550, 225);

        if let Some(gui) = &self.gui {
            gui.draw(frame, ctx);
        }

        if self.alpha > 0 {
            frame.overlay(width, height, Color::TRANSITION, self.alpha.min(255) as u8);
        }
    }
}
