//! Combat arithmetic for turn-based battles
//!
//! Pure functions for everything a battle rolls or computes: hit strength,
//! spell damage, rewards and the level-up curve. The battle state machine in
//! [`crate::battle`] decides *when* these run; this module only decides the numbers.
//!
//! Randomness comes in through `&mut impl Rng` so tests can pass a seeded
//! `StdRng` and get reproducible battles.
//!
//! # Rust Learning Notes
//!
//! This module demonstrates:
//! - **Generic parameters**: `impl Rng` accepts any random source
//! - **Inclusive ranges**: `gen_range(a..=b)` matches "roll between a and b"
//! - **Saturating arithmetic**: damage never underflows below zero

use rand::Rng;

/// Spread between the weakest and strongest player swing.
pub const PLAYER_HIT_SPREAD: i32 = 7;

/// Health every basic enemy gets per level.
pub const ENEMY_HEALTH_PER_LEVEL: i32 = 4;

/// The evil wizard ignores the level formula.
pub const BOSS_HEALTH: i32 = 100;

/// Health and magic restored by one potion.
pub const POTION_STRENGTH: u32 = 30;

/// Player swing: uniform in `[power - 7, power]`, never below zero.
///
/// # Example
///
/// ```ignore
/// let damage = player_hit(9, &mut rng); // 2..=9
/// ```
pub fn player_hit(weapon_power: u32, rng: &mut impl Rng) -> u32 {
    let max_strength = weapon_power as i32;
    let min_strength = max_strength - PLAYER_HIT_SPREAD;
    rng.gen_range(min_strength..=max_strength).max(0) as u32
}

/// Generic attacker swing against the player.
///
/// `max_strength = max(1, level*5 - armor)`, rolled uniformly in `[0, max_strength]`.
/// A zero roll is a miss.
pub fn enemy_hit(level: u32, armor_power: u32, rng: &mut impl Rng) -> u32 {
    let max_strength = (level as i32 * 5 - armor_power as i32).max(1);
    rng.gen_range(0..=max_strength) as u32
}

/// Fire Blast hits every enemy for `[power/2, power]`.
pub fn fire_blast_damage(power: u32, rng: &mut impl Rng) -> u32 {
    rng.gen_range(power / 2..=power)
}

/// Starting health of a freshly spawned enemy.
pub fn enemy_health(level: u32, boss: bool) -> i32 {
    if boss {
        BOSS_HEALTH
    } else {
        level as i32 * ENEMY_HEALTH_PER_LEVEL
    }
}

/// Experience for a battle: each enemy is worth 5 to 10 points.
pub fn experience_award(enemy_count: usize, rng: &mut impl Rng) -> u32 {
    (0..enemy_count).map(|_| rng.gen_range(5..=10)).sum()
}

/// Gold for a battle: each enemy drops 1 to `level * 20` coins.
pub fn gold_award(enemy_levels: &[u32], rng: &mut impl Rng) -> u32 {
    enemy_levels
        .iter()
        .map(|level| rng.gen_range(1..=(level * 20).max(1)))
        .sum()
}

/// Experience needed to climb out of `level`.
pub fn experience_for_level(level: u32) -> i32 {
    (level as i32 * 50 * 3) / 4
}

/// Floating combat text: "Miss" for zero, otherwise "-N".
pub fn damage_text(amount: u32) -> String {
    if amount == 0 {
        "Miss".to_string()
    } else {
        format!("-{}", amount)
    }
}

/// Floating healing text.
pub fn heal_text(amount: u32) -> String {
    format!("+{}", amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_player_hit_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let power = 12;
        let mut lowest = u32::MAX;
        let mut highest = 0;
        for _ in 0..1000 {
            let hit = player_hit(power, &mut rng);
            assert!((power - 7..=power).contains(&hit));
            lowest = lowest.min(hit);
            highest = highest.max(hit);
        }
        assert_eq!((lowest, highest), (power - 7, power));
    }

    #[test]
    fn test_player_hit_clamps_weak_weapons() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            assert!(player_hit(3, &mut rng) <= 3);
        }
    }

    #[test]
    fn test_enemy_hit_range() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut saw_miss = false;
        for _ in 0..1000 {
            let hit = enemy_hit(2, 0, &mut rng);
            assert!(hit <= 10);
            saw_miss |= hit == 0;
        }
        assert!(saw_miss);
    }

    #[test]
    fn test_enemy_hit_armor_floor() {
        // Armor can never push the ceiling below 1
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..200 {
            assert!(enemy_hit(1, 5, &mut rng) <= 1);
        }
    }

    #[test]
    fn test_damage_text() {
        assert_eq!(damage_text(0), "Miss");
        assert_eq!(damage_text(7), "-7");
        assert_eq!(heal_text(30), "+30");
    }

    #[test]
    fn test_rewards_are_bounded() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let exp = experience_award(3, &mut rng);
            assert!((15..=30).contains(&exp));
            let gold = gold_award(&[1, 2], &mut rng);
            assert!((2..=60).contains(&gold));
        }
    }

    #[test]
    fn test_enemy_health() {
        assert_eq!(enemy_health(1, false), 4);
        assert_eq!(enemy_health(4, false), 16);
        assert_eq!(enemy_health(4, true), 100);
    }

    #[test]
    fn test_experience_curve() {
        assert_eq!(experience_for_level(2), 75);
        assert_eq!(experience_for_level(3), 112);
    }
}
