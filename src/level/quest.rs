//! The story script
//!
//! Quest logic lives in three places: what a level spawns (who stands where,
//! carrying what, saying what), what happens when the player finishes a
//! conversation, and which song a level plays. All three only read and write
//! [`QuestFlags`] and the inventory in the progress record.
//!
//! The story in order:
//! 1. The king hands out gold and tells of the stolen crown.
//! 2. The old man asks the player to find his sick brother.
//! 3. The brother gives the player an ELIXIR for the old man.
//! 4. The old man takes the ELIXIR and teaches Fire Blast.
//! 5. Beating the evil wizard recovers the crown.
//! 6. Returning the crown to the king ends the game.

use super::map::{MapData, SpriteData, SpriteKind};
use crate::actor::{Actor, ActorKind, ActorState};
use crate::game::ModeId;
use crate::item::registry::{ELIXIR, FIRE_BLAST};
use crate::item::{GOLD, ItemCategory, ItemGrant, ItemRegistry};
use crate::progress::{ProgressRecord, QuestFlags};
use log::{debug, info, warn};

/// Gold the king gives on the first audience.
pub const KING_REWARD: u32 = 500;

const EMPTY_CHEST: &str = "Empty.";

/// Builds the level's sprites, applying the quest state on top of the map.
pub fn spawn_sprites(map: &MapData, progress: &ProgressRecord, now_ms: u64) -> Vec<Actor> {
    map.sprites
        .iter()
        .filter(|data| !(data.kind == SpriteKind::Evilwizard && progress.quest.crown_quest))
        .map(|data| make_sprite(data, &progress.quest, now_ms))
        .collect()
}

fn make_sprite(data: &SpriteData, quest: &QuestFlags, now_ms: u64) -> Actor {
    let mut sprite = match data.kind {
        SpriteKind::Treasurechest => Actor::chest(data.tile, data.chest.unwrap_or(0), now_ms),
        kind => Actor::person(kind.sheet(), data.tile, data.direction, now_ms),
    };

    let state = data.state.as_deref().and_then(|name| {
        let state = ActorState::from_name(name);
        if state.is_none() {
            warn!("unknown sprite state '{}' at {:?}", name, data.tile);
        }
        state
    });
    if let Some(state) = state {
        sprite.state = state;
    } else if data.kind.wanders() {
        sprite.state = ActorState::AutoResting;
    }

    sprite.battle = data.battle.clone();
    sprite.dialogue = dialogue_override(data.kind, quest).unwrap_or_else(|| data.dialogue.clone());
    sprite.item = match data.kind {
        SpriteKind::Oldman if quest.has_brother_elixir && !quest.elixir_received => {
            Some(ItemGrant::new(FIRE_BLAST, 1))
        }
        SpriteKind::Oldmanbrother if quest.talked_to_sick_brother && !quest.has_brother_elixir => {
            Some(ItemGrant::new(ELIXIR, 1))
        }
        SpriteKind::Oldmanbrother => None,
        SpriteKind::King if !quest.talked_to_king => Some(ItemGrant::new(GOLD, KING_REWARD)),
        SpriteKind::King => None,
        _ => data.item.clone(),
    };

    if let Some(id) = data.chest {
        if !quest.chest_unopened(id) {
            sprite.dialogue = vec![EMPTY_CHEST.to_string()];
            sprite.item = None;
            sprite.animation.set_frame(1);
        }
    }

    sprite
}

/// Lines that replace a character's map dialogue at this point in the story.
pub fn dialogue_override(kind: SpriteKind, quest: &QuestFlags) -> Option<Vec<String>> {
    let lines: &[&str] = match kind {
        SpriteKind::Oldman if quest.has_brother_elixir && quest.elixir_received => &[
            "My good health is thanks to you.",
            "I will be forever in your debt.",
        ],
        SpriteKind::Oldman if quest.has_brother_elixir => &[
            "Thank you for reaching my brother.",
            "This ELIXIR will cure my ailment.",
            "As a reward, I will teach you a magic spell.",
            "Use it wisely.",
            "You learned FIRE BLAST.",
        ],
        SpriteKind::Oldman if quest.talked_to_sick_brother => &[
            "Hurry to the NorthEast Shores!",
            "I do not have much time left.",
        ],
        SpriteKind::Oldmanbrother if quest.has_brother_elixir && quest.elixir_received => &[
            "I am glad my brother is doing well.",
            "You have a wise and generous spirit.",
        ],
        SpriteKind::Oldmanbrother if quest.has_brother_elixir => {
            &["Hurry! There is precious little time."]
        }
        SpriteKind::Oldmanbrother if quest.talked_to_sick_brother => &[
            "My brother is sick?!?",
            "I have not seen him in years. I had no idea he was not well.",
            "Quick, take this ELIXIR to him immediately.",
        ],
        SpriteKind::King if quest.crown_quest && !quest.delivered_crown => &[
            "My crown! You recovered my stolen crown!!!",
            "I can not believe what I see before my eyes.",
            "You are truly a brave and noble warrior.",
            "Henceforth, I name thee Grand Protector of this Town!",
            "You are the greatest warrior this world has ever known.",
        ],
        SpriteKind::King if quest.delivered_crown => &[
            "Thank you for retrieving my crown.",
            "My kingdom is forever in your debt.",
        ],
        _ => return None,
    };

    Some(lines.iter().map(|line| line.to_string()).collect())
}

/// Puts a grant into the inventory. Returns the line announcing it, or
/// `None` when the item is not in the registry.
pub fn grant_item(grant: &ItemGrant, progress: &mut ProgressRecord, registry: &ItemRegistry) -> Option<String> {
    if grant.is_gold() {
        progress.inventory.add_gold(grant.quantity);
        return Some(format!("Received {} gold.", grant.quantity));
    }

    let Some(definition) = registry.get(&grant.name) else {
        warn!("grant of unknown item '{}' ignored", grant.name);
        return None;
    };

    match definition.category {
        ItemCategory::Spell if progress.inventory.contains(&grant.name) => {}
        ItemCategory::Spell => progress.inventory.add_item(definition, 1),
        _ => progress.inventory.add_item(definition, grant.quantity),
    }

    debug!("granted {} x{}", grant.name, grant.quantity);
    Some(if grant.quantity > 1 {
        format!("Received {} {}s.", grant.quantity, grant.name)
    } else {
        format!("Received {}.", grant.name)
    })
}

/// Story consequences of finishing a conversation with `sprite`.
pub fn finish_conversation(sprite: &mut Actor, progress: &mut ProgressRecord) {
    let quest = &mut progress.quest;

    match sprite.name.as_str() {
        "treasurechest" => {
            if let ActorKind::Chest { identifier } = sprite.kind {
                quest.open_chest(identifier);
            }
            sprite.item = None;
            sprite.dialogue = vec![EMPTY_CHEST.to_string()];
            sprite.animation.set_frame(1);
        }
        "oldmanbrother" => {
            if quest.talked_to_sick_brother && !quest.has_brother_elixir {
                info!("received the ELIXIR");
                quest.has_brother_elixir = true;
            }
        }
        "oldman" => {
            if quest.has_brother_elixir && !quest.elixir_received {
                info!("delivered the ELIXIR");
                if let Err(e) = progress.inventory.remove_item(ELIXIR, 1) {
                    debug!("no ELIXIR to hand over: {}", e);
                }
                quest.elixir_received = true;
            } else if !quest.talked_to_sick_brother {
                quest.talked_to_sick_brother = true;
            }
        }
        "king" => {
            if quest.crown_quest && !quest.delivered_crown {
                info!("crown returned to the king");
                quest.delivered_crown = true;
            } else {
                quest.talked_to_king = true;
            }
        }
        _ => {}
    }

    let kind = match sprite.name.as_str() {
        "oldman" => Some(SpriteKind::Oldman),
        "oldmanbrother" => Some(SpriteKind::Oldmanbrother),
        "king" => Some(SpriteKind::King),
        _ => None,
    };
    if let Some(lines) = kind.and_then(|kind| dialogue_override(kind, &progress.quest)) {
        sprite.dialogue = lines;
    }
}

/// Song for a level: the king's theme plays in town and the castle once the
/// crown is back, otherwise whatever the map names.
pub fn level_song(level: ModeId, map: &MapData, quest: &QuestFlags) -> Option<String> {
    if quest.crown_quest && matches!(level, ModeId::Town | ModeId::Castle) {
        return Some("kings_theme".to_string());
    }
    map.music.clone()
}
