//! Turn-based battles
//!
//! A battle is entered from a level (random encounter or battle trigger) and
//! always leaves back to that level, except when the player dies.
//!
//! The turn loop:
//!
//! ```text
//! select action -> select enemy / item / magic, or run
//!   -> player attack -> enemy damaged
//!   -> fire / cure / potion
//!   -> (next queued action) -> enemy attack -> player damaged -> ... -> select action
//! all enemies down -> battle won -> show gold -> show experience
//!   -> (level up -> (two actions)) -> leave
//! ```
//!
//! Every resolution state waits a fixed time on the battle timer before moving
//! on; animations only decide when the hit lands, never when the state ends.
//!
//! From level 3 the player picks two actions per turn; below that each action
//! runs as soon as it is picked.

pub mod gui;

use self::gui::{ACTIONS, BACK, DamagePoints, InfoBox, PlayerHealth, SelectArrow, SelectBox};
use crate::actor::{Actor, ActorEvent};
use crate::audio::SoundEffect;
use crate::combat::{self, POTION_STRENGTH};
use crate::error::GameError;
use crate::game::{GameContext, Mode, ModeId, ModeStatus};
use crate::input_system::{InputLatch, Key};
use crate::item::registry::{CURE, ETHER_POTION, FIRE_BLAST, HEALING_POTION};
use crate::item::ItemCategory;
use crate::player::{Flash, battle_player};
use crate::render::{Color, DepthSortable, DrawCommand, Frame};
use crate::timer::Timer;
use log::{debug, info, warn};
use rand::Rng;
use std::collections::VecDeque;

/// Default dwell for spells and running away.
const ACTION_MS: u64 = 1500;
const DAMAGE_MS: u64 = 1000;
const PLAYER_DAMAGED_MS: u64 = 600;
const BATTLE_WON_MS: u64 = 1800;
const SHOW_GOLD_MS: u64 = 1900;
const LEVEL_UP_MS: u64 = 2000;
const TWO_ACTIONS_MS: u64 = 2100;
const SHOW_EXPERIENCE_MS: u64 = 2200;

/// Level from which two actions are picked per turn.
pub const TWO_ACTION_LEVEL: u32 = 3;

/// Enemies stand on a column of 96 px cells.
const ENEMY_CELL: i32 = 96;

/// Battle trigger id of the final boss.
pub const EVIL_WIZARD: &str = "evilwizard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BattleState {
    SelectAction,
    SelectEnemy,
    SelectItem,
    SelectMagic,
    PlayerAttack,
    EnemyDamaged,
    EnemyAttack,
    PlayerDamaged,
    FireSpell,
    CureSpell,
    DrinkHealingPotion,
    DrinkEtherPotion,
    RunAway,
    BattleWon,
    ShowGold,
    ShowExperience,
    LevelUp,
    TwoActions,
    DeathFade,
    TransitionOut,
}

/// A queued player choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    /// Attack the enemy in this slot
    Attack(usize),
    Cure,
    FireBlast,
    HealingPotion,
    EtherPotion,
}

/// Enemy strength for battles started from a level.
pub fn enemy_level(level: Option<ModeId>) -> u32 {
    match level {
        Some(ModeId::Dungeon | ModeId::Dungeon2 | ModeId::Dungeon3 | ModeId::Dungeon4) => 2,
        Some(ModeId::Dungeon5) => 4,
        _ => 1,
    }
}

pub struct BattleMode {
    status: ModeStatus,
    state: BattleState,
    timer: Timer,
    player: Actor,
    /// Every enemy sprite, including ones still fading out
    enemies: Vec<Actor>,
    /// Slot of the enemy the player is swinging at
    attacked: Option<usize>,
    /// Which living enemy takes the next swing at the player
    enemy_index: usize,
    actions: VecDeque<PlayerAction>,
    action_selected: bool,
    /// Magic left after the spells already queued this turn
    temp_magic: u32,
    player_level: u32,
    run_away: bool,
    info: InfoBox,
    arrow: SelectArrow,
    confirm: InputLatch,
    flash: Flash,
    damage_points: Vec<DamagePoints>,
}

impl BattleMode {
    pub fn new() -> Self {
        BattleMode {
            status: ModeStatus::default(),
            state: BattleState::SelectAction,
            timer: Timer::new(ACTION_MS, 0),
            player: battle_player(0),
            enemies: Vec::new(),
            attacked: None,
            enemy_index: 0,
            actions: VecDeque::new(),
            action_selected: false,
            temp_magic: 0,
            player_level: 1,
            run_away: false,
            info: InfoBox::default(),
            arrow: SelectArrow::new(),
            confirm: InputLatch::new(),
            flash: Flash::damage(),
            damage_points: Vec::new(),
        }
    }

    pub fn state(&self) -> BattleState {
        self.state
    }

    pub fn enemies(&self) -> &[Actor] {
        &self.enemies
    }

    pub fn queued_actions(&self) -> usize {
        self.actions.len()
    }

    pub fn info(&self) -> &InfoBox {
        &self.info
    }

    /// Indices into `enemies` of those still standing.
    fn living(&self) -> Vec<usize> {
        self.enemies
            .iter()
            .enumerate()
            .filter(|(_, enemy)| enemy.health > 0)
            .map(|(index, _)| index)
            .collect()
    }

    fn make_enemies(&mut self, ctx: &mut GameContext, now: u64) {
        let level = enemy_level(self.status.previous);
        let progress = &mut ctx.progress;

        let (name, count, boss) = if progress.battle_type.is_some() {
            (EVIL_WIZARD, 1, true)
        } else if progress.quest.start_of_game {
            progress.quest.start_of_game = false;
            ("devil", 3, false)
        } else {
            ("devil", ctx.rng.gen_range(1..=2), false)
        };

        self.enemies = (0..count)
            .map(|slot| {
                let position = (ENEMY_CELL, ENEMY_CELL + slot as i32 * ENEMY_CELL);
                let mut enemy = Actor::enemy(name, position, level, combat::enemy_health(level, boss), now);
                enemy.slot = slot;
                enemy
            })
            .collect();
    }

    // ======================================================================
    // Input
    // ======================================================================

    fn check_input(&mut self, ctx: &mut GameContext) {
        let keys = ctx.keys;
        if !self.confirm.pressed(&keys, Key::Confirm) {
            self.confirm.release(&keys, &[Key::Confirm]);
            return;
        }

        match self.state {
            BattleState::SelectAction => {
                ctx.mixer.play_effect(SoundEffect::Click2);
                match self.arrow.index {
                    0 => self.enter_list(BattleState::SelectEnemy),
                    1 => self.enter_list(BattleState::SelectItem),
                    2 => self.enter_list(BattleState::SelectMagic),
                    _ => self.try_to_run_away(ctx),
                }
            }
            BattleState::SelectEnemy => {
                ctx.mixer.play_effect(SoundEffect::Click2);
                let living = self.living();
                if let Some(&index) = living.get(self.arrow.index) {
                    self.actions.push_back(PlayerAction::Attack(self.enemies[index].slot));
                    self.action_selected = true;
                }
            }
            BattleState::SelectItem => {
                ctx.mixer.play_effect(SoundEffect::Click2);
                let items = battle_items(ctx);
                match items.get(self.arrow.index).map(String::as_str) {
                    Some(HEALING_POTION) => self.choose(PlayerAction::HealingPotion),
                    Some(ETHER_POTION) => self.choose(PlayerAction::EtherPotion),
                    _ => self.enter_select_action_state(),
                }
            }
            BattleState::SelectMagic => {
                ctx.mixer.play_effect(SoundEffect::Click2);
                let spells = battle_spells(ctx);
                match spells.get(self.arrow.index).map(String::as_str) {
                    Some(name @ (CURE | FIRE_BLAST)) => {
                        let cost = ctx
                            .progress
                            .inventory
                            .get(name)
                            .and_then(|entry| entry.magic_points)
                            .unwrap_or(0);
                        if self.temp_magic >= cost {
                            self.temp_magic -= cost;
                            let action = if name == CURE {
                                PlayerAction::Cure
                            } else {
                                PlayerAction::FireBlast
                            };
                            self.choose(action);
                        }
                    }
                    _ => self.enter_select_action_state(),
                }
            }
            _ => {}
        }
    }

    fn choose(&mut self, action: PlayerAction) {
        self.actions.push_back(action);
        self.action_selected = true;
    }

    fn enter_list(&mut self, state: BattleState) {
        debug!("battle: {:?}", state);
        self.state = state;
        self.arrow.index = 0;
    }

    /// Runs queued actions: straight away below level 3, in pairs from there.
    fn execute_player_actions(&mut self, ctx: &mut GameContext) {
        if self.player_level < TWO_ACTION_LEVEL {
            if !self.actions.is_empty() {
                self.run_next_action(ctx);
            }
        } else if self.actions.len() == 2 {
            self.run_next_action(ctx);
            self.action_selected = false;
        } else if self.action_selected {
            self.enter_select_action_state();
            self.action_selected = false;
        }
    }

    // ======================================================================
    // Turn flow
    // ======================================================================

    /// Runs the next queued action, or hands the turn to the enemies.
    fn advance_turn(&mut self, ctx: &mut GameContext) {
        if !self.actions.is_empty() {
            self.run_next_action(ctx);
        } else if !self.living().is_empty() {
            self.enter_enemy_attack_state();
        } else {
            self.enter_battle_won_state(ctx);
        }
    }

    fn run_next_action(&mut self, ctx: &mut GameContext) {
        while let Some(action) = self.actions.pop_front() {
            if self.living().is_empty() {
                self.actions.clear();
                self.enter_battle_won_state(ctx);
                return;
            }
            if self.perform(action, ctx) {
                return;
            }
            warn!("battle: skipping {:?}, nothing left to use", action);
        }
        self.advance_turn(ctx);
    }

    /// Starts an action. False when the item or spell is gone.
    fn perform(&mut self, action: PlayerAction, ctx: &mut GameContext) -> bool {
        debug!("battle: player {:?}", action);
        let inventory = &ctx.progress.inventory;
        match action {
            PlayerAction::Attack(slot) => {
                self.player_attack(slot, ctx);
                true
            }
            PlayerAction::Cure if inventory.contains(CURE) => {
                self.cast_cure(ctx);
                true
            }
            PlayerAction::FireBlast if inventory.contains(FIRE_BLAST) => {
                self.cast_fire_blast(ctx);
                true
            }
            PlayerAction::HealingPotion if inventory.contains(HEALING_POTION) => {
                self.drink_healing_potion(ctx);
                true
            }
            PlayerAction::EtherPotion if inventory.contains(ETHER_POTION) => {
                self.drink_ether_potion(ctx);
                true
            }
            _ => false,
        }
    }

    fn player_attack(&mut self, slot: usize, ctx: &mut GameContext) {
        let living = self.living();
        let target = living
            .iter()
            .copied()
            .find(|&index| self.enemies[index].slot == slot)
            .or_else(|| living.first().copied());

        let Some(target) = target else {
            self.enter_battle_won_state(ctx);
            return;
        };

        self.state = BattleState::PlayerAttack;
        self.attacked = Some(self.enemies[target].slot);
        self.player.enter_attack_state();
        ctx.mixer.play_effect(SoundEffect::Sword);
    }

    fn enter_enemy_damaged_state(&mut self, ctx: &mut GameContext, now: u64) {
        self.state = BattleState::EnemyDamaged;
        let damage = combat::player_hit(ctx.progress.inventory.weapon_power(), &mut ctx.rng);
        self.info.enemy_damage = damage;
        self.arrow.index = 0;
        self.enemy_index = 0;
        self.timer.reset(now);

        let Some(enemy) = self
            .attacked
            .and_then(|slot| self.enemies.iter_mut().find(|enemy| enemy.slot == slot && enemy.health > 0))
        else {
            return;
        };

        self.damage_points.push(DamagePoints::damage(damage, top_right(enemy)));
        enemy.health -= damage as i32;
        if enemy.health <= 0 {
            debug!("battle: enemy in slot {} defeated", enemy.slot);
            enemy.enter_fade_death();
        } else {
            enemy.enter_knock_back_state();
        }
    }

    fn cast_fire_blast(&mut self, ctx: &mut GameContext) {
        ctx.mixer.play_effect(SoundEffect::Fire);
        self.state = BattleState::FireSpell;

        let (power, cost) = spell_numbers(ctx, FIRE_BLAST);
        ctx.progress.stats.magic.drain(cost);

        for enemy in self.enemies.iter_mut().filter(|enemy| enemy.health > 0) {
            let damage = combat::fire_blast_damage(power, &mut ctx.rng);
            self.damage_points.push(DamagePoints::damage(damage, top_right(enemy)));
            enemy.health -= damage as i32;
            if enemy.health <= 0 {
                enemy.enter_fade_death();
            } else {
                enemy.enter_knock_back_state();
            }
        }

        self.enemy_index = 0;
        self.arrow.index = 0;
        self.timer.reset(ctx.now());
    }

    fn cast_cure(&mut self, ctx: &mut GameContext) {
        self.state = BattleState::CureSpell;
        let (power, cost) = spell_numbers(ctx, CURE);
        self.heal(power, false, ctx);
        ctx.progress.stats.magic.drain(cost);
        self.timer.reset(ctx.now());
    }

    fn drink_healing_potion(&mut self, ctx: &mut GameContext) {
        self.state = BattleState::DrinkHealingPotion;
        self.heal(POTION_STRENGTH, false, ctx);
        if let Err(e) = ctx.progress.inventory.remove_item(HEALING_POTION, 1) {
            warn!("battle: {}", e);
        }
        self.timer.reset(ctx.now());
    }

    fn drink_ether_potion(&mut self, ctx: &mut GameContext) {
        self.state = BattleState::DrinkEtherPotion;
        self.heal(POTION_STRENGTH, true, ctx);
        self.temp_magic += POTION_STRENGTH;
        if let Err(e) = ctx.progress.inventory.remove_item(ETHER_POTION, 1) {
            warn!("battle: {}", e);
        }
        self.timer.reset(ctx.now());
    }

    fn heal(&mut self, amount: u32, magic: bool, ctx: &mut GameContext) {
        let stats = &mut ctx.progress.stats;
        if magic {
            stats.magic.restore(amount);
        } else {
            stats.health.restore(amount);
        }
        self.flash = Flash::healing();
        self.flash.start();
        self.enemy_index = 0;
        self.damage_points.push(DamagePoints::healing(amount, top_right(&self.player), magic));
        ctx.mixer.play_effect(SoundEffect::Powerup);
    }

    fn try_to_run_away(&mut self, ctx: &mut GameContext) {
        info!("battle: player tries to run");
        self.run_away = true;
        self.enemy_index = 0;
        if self.living().is_empty() {
            self.enter_run_away_state(ctx);
        } else {
            self.enter_enemy_attack_state();
        }
    }

    fn enter_enemy_attack_state(&mut self) {
        let living = self.living();
        if self.enemy_index >= living.len() {
            self.enemy_index = 0;
        }
        let Some(&index) = living.get(self.enemy_index) else {
            return;
        };
        self.state = BattleState::EnemyAttack;
        self.enemies[index].enter_enemy_attack_state();
    }

    fn enter_player_damaged_state(&mut self, ctx: &mut GameContext, now: u64) {
        self.state = BattleState::PlayerDamaged;
        let living = self.living();
        if self.enemy_index >= living.len() {
            self.enemy_index = 0;
        }
        let level = living
            .get(self.enemy_index)
            .map(|&index| self.enemies[index].level)
            .unwrap_or(1);

        let damage = combat::enemy_hit(level, ctx.progress.inventory.armor_power(), &mut ctx.rng);
        self.info.player_damage = damage;
        self.damage_points.push(DamagePoints::damage(damage, top_right(&self.player)));
        self.timer.reset(now);
        self.damage_player(damage, ctx);
    }

    fn damage_player(&mut self, damage: u32, ctx: &mut GameContext) {
        ctx.progress.stats.health.drain(damage);

        if damage > 0 {
            ctx.mixer.play_effect(SoundEffect::Punch);
            self.flash = Flash::damage();
            self.flash.start();
            self.player.enter_knock_back_state();
        } else {
            ctx.mixer.play_effect(SoundEffect::Miss);
        }

        if ctx.progress.stats.health.is_empty() {
            info!("battle: player died");
            self.state = BattleState::DeathFade;
            self.status.next = Some(ModeId::DeathScene);
        }
    }

    fn switch_enemy(&mut self) {
        if self.enemy_index + 1 < self.living().len() {
            self.enemy_index += 1;
            self.enter_enemy_attack_state();
        }
    }

    fn enter_run_away_state(&mut self, ctx: &mut GameContext) {
        self.state = BattleState::RunAway;
        self.player.enter_run_away_state();
        self.timer.reset(ctx.now());
        ctx.mixer.play_effect(SoundEffect::RunAway);
    }

    fn enter_select_action_state(&mut self) {
        self.state = BattleState::SelectAction;
        self.arrow.index = 0;
    }

    fn enter_battle_won_state(&mut self, ctx: &mut GameContext) {
        info!("battle won");
        ctx.mixer.play_effect(SoundEffect::BattleWon);
        self.state = BattleState::BattleWon;
        self.player.enter_victory_dance();
        self.timer.reset(ctx.now());
    }

    fn end_battle(&mut self, ctx: &mut GameContext) {
        let progress = &mut ctx.progress;
        if progress.battle_type.as_deref() == Some(EVIL_WIZARD) {
            info!("the evil wizard is beaten, the crown is recovered");
            progress.quest.crown_quest = true;
            progress.quest.talked_to_king = true;
        }
        progress.last_state = Some(ModeId::Battle);
        progress.battle_counter = ctx.rng.gen_range(50..=255);
        progress.battle_type = None;
        self.state = BattleState::TransitionOut;
    }

    // ======================================================================
    // Timed states
    // ======================================================================

    fn check_timed_events(&mut self, ctx: &mut GameContext, now: u64) {
        match self.state {
            BattleState::EnemyDamaged
            | BattleState::DrinkHealingPotion
            | BattleState::DrinkEtherPotion => {
                if self.timer.done_after(DAMAGE_MS, now) {
                    self.timer.reset(now);
                    self.advance_turn(ctx);
                }
            }
            BattleState::FireSpell | BattleState::CureSpell => {
                if self.timer.done(now) {
                    self.timer.reset(now);
                    self.advance_turn(ctx);
                }
            }
            BattleState::RunAway => {
                if self.timer.done(now) {
                    self.end_battle(ctx);
                }
            }
            BattleState::BattleWon => {
                if self.timer.done_after(BATTLE_WON_MS, now) {
                    ctx.progress.inventory.add_gold(self.info.gold);
                    self.state = BattleState::ShowGold;
                    self.timer.reset(now);
                }
            }
            BattleState::ShowGold => {
                if self.timer.done_after(SHOW_GOLD_MS, now) {
                    self.state = BattleState::ShowExperience;
                    self.timer.reset(now);
                }
            }
            BattleState::ShowExperience => {
                if self.timer.done_after(SHOW_EXPERIENCE_MS, now) {
                    match ctx.progress.stats.gain_experience(self.info.experience) {
                        Some(level_up) => {
                            info!("player reached level {}", level_up.new_level);
                            self.info.new_level = level_up.new_level;
                            self.state = BattleState::LevelUp;
                            self.timer.reset(now);
                        }
                        None => self.end_battle(ctx),
                    }
                }
            }
            BattleState::LevelUp => {
                if self.timer.done_after(LEVEL_UP_MS, now) {
                    if ctx.progress.stats.level == TWO_ACTION_LEVEL {
                        self.state = BattleState::TwoActions;
                        self.timer.reset(now);
                    } else {
                        self.end_battle(ctx);
                    }
                }
            }
            BattleState::TwoActions => {
                if self.timer.done_after(TWO_ACTIONS_MS, now) {
                    self.end_battle(ctx);
                }
            }
            BattleState::PlayerDamaged => {
                if self.timer.done_after(PLAYER_DAMAGED_MS, now) {
                    let living = self.living().len();
                    if self.enemy_index + 1 >= living {
                        if self.run_away {
                            self.enter_run_away_state(ctx);
                        } else {
                            self.enter_select_action_state();
                        }
                    } else {
                        self.switch_enemy();
                    }
                    self.timer.reset(now);
                }
            }
            _ => {}
        }
    }

    /// Steps every sprite and reacts to what their animations report.
    fn update_sprites(&mut self, ctx: &mut GameContext, now: u64) {
        if let Some(event) = self.player.update(now, &mut ctx.rng) {
            if event == ActorEvent::AttackLanded && self.state == BattleState::PlayerAttack {
                self.enter_enemy_damaged_state(ctx, now);
            }
        }

        let mut enemy_attack_finished = false;
        for enemy in self.enemies.iter_mut() {
            match enemy.update(now, &mut ctx.rng) {
                Some(ActorEvent::EnemyAttackFinished) => enemy_attack_finished = true,
                Some(ActorEvent::Died) => debug!("battle: enemy in slot {} removed", enemy.slot),
                _ => {}
            }
        }
        self.enemies.retain(|enemy| !enemy.is_removed());

        if enemy_attack_finished && self.state == BattleState::EnemyAttack {
            self.enter_player_damaged_state(ctx, now);
        }

        self.flash.update();
        for points in self.damage_points.iter_mut() {
            points.update();
        }
        self.damage_points.retain(|points| !points.is_faded());
    }

    fn update_arrow(&mut self, ctx: &mut GameContext) {
        let len = match self.state {
            BattleState::SelectAction => ACTIONS.len(),
            BattleState::SelectEnemy => self.living().len(),
            BattleState::SelectItem => battle_items(ctx).len(),
            BattleState::SelectMagic => battle_spells(ctx).len(),
            _ => return,
        };
        self.arrow.update(&ctx.keys, len, &mut ctx.mixer);
    }

    fn draw_arrow(&self, frame: &mut Frame) {
        match self.state {
            BattleState::SelectAction => {
                self.arrow.draw_at(frame, 590, 472 + self.arrow.index as i32 * 34);
            }
            BattleState::SelectEnemy => {
                let living = self.living();
                if let Some(&index) = living.get(self.arrow.index) {
                    let (x, y) = self.enemies[index].pos.pixels();
                    self.arrow.draw_at(frame, x - 60, y + 20);
                }
            }
            BattleState::SelectItem | BattleState::SelectMagic => {
                self.arrow.draw_at(frame, 30, 508 + self.arrow.index as i32 * 29);
            }
            _ => {}
        }
    }
}

impl Default for BattleMode {
    fn default() -> Self {
        Self::new()
    }
}

impl Mode for BattleMode {
    fn id(&self) -> ModeId {
        ModeId::Battle
    }

    fn status(&self) -> &ModeStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut ModeStatus {
        &mut self.status
    }

    fn startup(&mut self, ctx: &mut GameContext) -> Result<(), GameError> {
        let now = ctx.now();
        ctx.mixer.set_level_song(ModeId::Battle, Some("high_action"));

        self.status.next = ctx
            .progress
            .last_state
            .or(self.status.previous)
            .or(Some(ModeId::Overworld));
        self.state = BattleState::SelectAction;
        self.timer = Timer::new(ACTION_MS, now);
        self.player = battle_player(now);
        self.make_enemies(ctx, now);

        let levels: Vec<u32> = self.enemies.iter().map(|enemy| enemy.level).collect();
        let experience = combat::experience_award(self.enemies.len(), &mut ctx.rng);
        let gold = combat::gold_award(&levels, &mut ctx.rng);
        self.info = InfoBox::new(experience, gold);

        self.attacked = None;
        self.enemy_index = 0;
        self.actions.clear();
        self.action_selected = false;
        self.temp_magic = ctx.progress.stats.magic.current();
        self.player_level = ctx.progress.stats.level;
        self.run_away = false;
        self.arrow = SelectArrow::new();
        self.confirm = InputLatch::new();
        self.flash = Flash::damage();
        self.damage_points.clear();

        info!(
            "battle started against {} {}(s), level {}",
            self.enemies.len(),
            self.enemies.first().map_or("enemy", |enemy| enemy.name.as_str()),
            enemy_level(self.status.previous)
        );
        Ok(())
    }

    fn update(&mut self, ctx: &mut GameContext) -> Result<(), GameError> {
        let now = ctx.now();

        self.check_input(ctx);
        self.check_timed_events(ctx, now);
        if self.state == BattleState::SelectAction && self.enemies.is_empty() {
            self.enter_battle_won_state(ctx);
        }
        self.update_sprites(ctx, now);
        self.update_arrow(ctx);
        self.execute_player_actions(ctx);

        if matches!(self.state, BattleState::TransitionOut | BattleState::DeathFade) {
            debug!("battle over, next {:?}", self.status.next);
            self.status.done = true;
        }
        Ok(())
    }

    fn draw(&self, ctx: &GameContext, frame: &mut Frame) {
        frame.fill(Color::BATTLE_BACKGROUND);

        for enemy in &self.enemies {
            enemy.draw(frame, (0, 0));
        }

        let (x, y) = self.player.pos.pixels();
        frame.push(DrawCommand::Sprite {
            sheet: self.player.name.clone(),
            cell: self.player.sheet_cell(),
            x,
            y,
            scale: self.player.scale,
            alpha: self.player.alpha.clamp(0, 255) as u8,
            tint: self.flash.tint(),
        });

        let list = match self.state {
            BattleState::SelectItem => Some(("SELECT ITEM", item_labels(ctx))),
            BattleState::SelectMagic => Some(("SELECT MAGIC SPELL", battle_spells(ctx))),
            _ => None,
        };
        self.info
            .draw(frame, self.state, list.as_ref().map(|(title, entries)| (*title, entries.as_slice())));
        SelectBox::draw(frame);
        PlayerHealth::draw(frame, &ctx.progress.stats);
        self.draw_arrow(frame);

        for points in &self.damage_points {
            points.draw(frame);
        }
    }
}

/// Potions usable in battle, then "BACK".
fn battle_items(ctx: &GameContext) -> Vec<String> {
    let inventory = &ctx.progress.inventory;
    [HEALING_POTION, ETHER_POTION]
        .into_iter()
        .filter(|name| inventory.contains(name))
        .map(str::to_string)
        .chain(std::iter::once(BACK.to_string()))
        .collect()
}

fn item_labels(ctx: &GameContext) -> Vec<String> {
    battle_items(ctx)
        .into_iter()
        .map(|name| match ctx.progress.inventory.quantity(&name) {
            0 => name,
            quantity => format!("{}: {}", name, quantity),
        })
        .collect()
}

/// Known spells, then "BACK".
fn battle_spells(ctx: &GameContext) -> Vec<String> {
    ctx.progress
        .inventory
        .names_in(ItemCategory::Spell, &ctx.registry)
        .into_iter()
        .chain(std::iter::once(BACK.to_string()))
        .collect()
}

fn spell_numbers(ctx: &GameContext, name: &str) -> (u32, u32) {
    ctx.progress
        .inventory
        .get(name)
        .map(|entry| (entry.power.unwrap_or(0), entry.magic_points.unwrap_or(0)))
        .unwrap_or((0, 0))
}

/// Where damage numbers appear over a sprite.
fn top_right(actor: &Actor) -> (i32, i32) {
    let (x, y) = actor.pos.pixels();
    (x + 32 * actor.scale as i32, y)
}
