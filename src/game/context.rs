// GameContext - everything a mode may touch besides its own state
//
// Modes receive `&mut GameContext` in every call instead of reaching for
// globals. The progress record is the only gameplay state in here; the rest
// are services (clock, audio, assets, the save slot, randomness).

use crate::assets::{AssetProvider, MemoryAssets};
use crate::audio::Mixer;
use crate::input_system::KeySnapshot;
use crate::item::ItemRegistry;
use crate::progress::{NewGameSettings, ProgressRecord};
use crate::save::{MemoryStore, ProgressStore};
use crate::timer::{Clock, ManualClock};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Logical screen size in pixels.
pub const SCREEN_WIDTH: i32 = 800;
pub const SCREEN_HEIGHT: i32 = 608;

pub struct GameContext {
    pub progress: ProgressRecord,
    /// Keys held as of the last processed event
    pub keys: KeySnapshot,
    pub mixer: Mixer,
    pub clock: Box<dyn Clock>,
    pub assets: Box<dyn AssetProvider>,
    pub store: Box<dyn ProgressStore>,
    pub rng: StdRng,
    pub registry: ItemRegistry,
    pub new_game: NewGameSettings,
    pub screen: (i32, i32),
}

impl GameContext {
    pub fn new(
        clock: Box<dyn Clock>,
        assets: Box<dyn AssetProvider>,
        store: Box<dyn ProgressStore>,
        mixer: Mixer,
        rng: StdRng,
        new_game: NewGameSettings,
    ) -> Self {
        let registry = ItemRegistry::create_default();
        GameContext {
            progress: ProgressRecord::new_game(&new_game, &registry),
            keys: KeySnapshot::new(),
            mixer,
            clock,
            assets,
            store,
            rng,
            registry,
            new_game,
            screen: (SCREEN_WIDTH, SCREEN_HEIGHT),
        }
    }

    /// Context with a manual clock, in-memory assets and save slot, and a
    /// seeded RNG.
    pub fn headless(clock: ManualClock, assets: MemoryAssets, seed: u64) -> Self {
        Self::new(
            Box::new(clock),
            Box::new(assets),
            Box::new(MemoryStore::new()),
            Mixer::default(),
            StdRng::seed_from_u64(seed),
            NewGameSettings::default(),
        )
    }

    pub fn now(&self) -> u64 {
        self.clock.now_ms()
    }

    /// A fresh record with the configured starting values.
    pub fn fresh_progress(&self) -> ProgressRecord {
        ProgressRecord::new_game(&self.new_game, &self.registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_context() {
        let clock = ManualClock::new();
        let mut ctx = GameContext::headless(clock.clone(), MemoryAssets::new(), 3);
        clock.advance(40);
        assert_eq!(ctx.now(), 40);

        ctx.progress.inventory.add_gold(5);
        assert_eq!(ctx.fresh_progress().inventory.gold(), 100);
        assert!(!ctx.store.exists());
    }
}
