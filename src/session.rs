//! One player's save slot: score, the adopted pet, inventory, cooldowns and
//! play clock, plus the care actions that tie them together.

use crate::config::Economy;
use crate::cooldown::{ActionCooldowns, CooldownKind};
use crate::inventory::{Inventory, Item, ItemKind, Shop};
use crate::pet::Pet;
use crate::score::Score;
use crate::snapshot::{PetSnapshot, PlayerSnapshot, StockSnapshot, SAVE_VERSION};
use chrono::{DateTime, Duration as ChronoDuration, Utc};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CareAction {
    Feed(String),
    Gift(String),
    Play,
    Vet,
    Exercise,
    Sleep,
    WakeUp,
}

/// How a care action went. Rejections are ordinary outcomes the UI reports,
/// not errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    Done { score_delta: i32 },
    NoPet,
    /// Dead, or asleep for an action that needs the pet awake.
    PetUnavailable,
    CoolingDown { remaining: ChronoDuration },
    UnknownItem,
    OutOfStock,
    InsufficientScore { needed: i32 },
    AlreadyHealthy,
}

impl ActionOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, ActionOutcome::Done { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Bought { item: Item, price: i32 },
    NotSold,
    InsufficientScore { needed: i32 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerSession {
    name: String,
    score: Score,
    pet: Option<Pet>,
    inventory: Inventory,
    cooldowns: ActionCooldowns,
    session_started_at: Option<DateTime<Utc>>,
    total_play_time: ChronoDuration,
    session_count: u32,
}

impl PlayerSession {
    pub fn new(name: impl Into<String>, cooldown: ChronoDuration, now: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            score: Score::default(),
            pet: None,
            inventory: Inventory::default(),
            cooldowns: ActionCooldowns::new(cooldown, now),
            session_started_at: None,
            total_play_time: ChronoDuration::zero(),
            session_count: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn score_mut(&mut self) -> &mut Score {
        &mut self.score
    }

    pub fn pet(&self) -> Option<&Pet> {
        self.pet.as_ref()
    }

    pub fn pet_mut(&mut self) -> Option<&mut Pet> {
        self.pet.as_mut()
    }

    /// Takes ownership of a new pet and hands back the previous one, which
    /// is otherwise left untouched.
    pub fn adopt(&mut self, pet: Pet) -> Option<Pet> {
        tracing::info!(
            player = %self.name,
            pet = pet.name(),
            species = %pet.species(),
            "adopted a pet"
        );
        self.pet.replace(pet)
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    pub fn cooldowns(&self) -> &ActionCooldowns {
        &self.cooldowns
    }

    pub fn cooldowns_mut(&mut self) -> &mut ActionCooldowns {
        &mut self.cooldowns
    }

    pub fn start_session(&mut self, now: DateTime<Utc>) {
        self.session_started_at = Some(now);
    }

    pub fn end_session(&mut self, now: DateTime<Utc>) -> Option<ChronoDuration> {
        let start = self.session_started_at.take()?;
        let length = now.signed_duration_since(start).max(ChronoDuration::zero());
        self.total_play_time = self.total_play_time + length;
        self.session_count = self.session_count.saturating_add(1);
        Some(length)
    }

    pub fn total_play_time(&self) -> ChronoDuration {
        self.total_play_time
    }

    pub fn session_count(&self) -> u32 {
        self.session_count
    }

    pub fn set_total_play_time(&mut self, total: ChronoDuration) {
        self.total_play_time = total.max(ChronoDuration::zero());
    }

    pub fn average_play_time(&self) -> ChronoDuration {
        if self.session_count == 0 {
            return ChronoDuration::zero();
        }
        self.total_play_time / i32::try_from(self.session_count).unwrap_or(i32::MAX)
    }

    pub fn reset_play_time_statistics(&mut self) {
        self.total_play_time = ChronoDuration::zero();
        self.session_count = 0;
    }

    /// Runs one care action through the cooldown gate and the score economy.
    /// Stock and cooldowns are only consumed when the action goes through.
    pub fn perform(
        &mut self,
        action: CareAction,
        now: DateTime<Utc>,
        economy: &Economy,
    ) -> ActionOutcome {
        let outcome = self.dispatch(&action, now, economy);
        match &outcome {
            ActionOutcome::Done { score_delta } => {
                tracing::info!(?action, score_delta, score = self.score.get(), "care action done")
            }
            other => tracing::debug!(?action, outcome = ?other, "care action rejected"),
        }
        outcome
    }

    fn dispatch(
        &mut self,
        action: &CareAction,
        now: DateTime<Utc>,
        economy: &Economy,
    ) -> ActionOutcome {
        let Some(pet) = self.pet.as_mut() else {
            return ActionOutcome::NoPet;
        };

        match action {
            CareAction::Sleep | CareAction::WakeUp if pet.is_dead() => {
                ActionOutcome::PetUnavailable
            }
            CareAction::Sleep => {
                pet.sleep();
                ActionOutcome::Done { score_delta: 0 }
            }
            CareAction::WakeUp => {
                pet.wake_up();
                ActionOutcome::Done { score_delta: 0 }
            }
            _ if !pet.is_responsive() => ActionOutcome::PetUnavailable,
            CareAction::Feed(name) | CareAction::Gift(name) => {
                let kind = if matches!(action, CareAction::Feed(_)) {
                    ItemKind::Food
                } else {
                    ItemKind::Gift
                };
                let Some(item) = self.inventory.find(kind, name).cloned() else {
                    return ActionOutcome::UnknownItem;
                };
                if !self.inventory.take_one(kind, &item) {
                    return ActionOutcome::OutOfStock;
                }
                let reward = match kind {
                    ItemKind::Food => {
                        pet.feed(item.value);
                        economy.feed_reward
                    }
                    ItemKind::Gift => {
                        pet.give_gift(item.value);
                        economy.gift_reward
                    }
                };
                self.score.increment(reward);
                ActionOutcome::Done { score_delta: reward }
            }
            CareAction::Play => {
                if !self.cooldowns.try_consume(CooldownKind::Play, now) {
                    return ActionOutcome::CoolingDown {
                        remaining: self.cooldowns.remaining(CooldownKind::Play, now),
                    };
                }
                pet.play(economy.play_happiness);
                self.score.increment(economy.play_reward);
                self.cooldowns.commit(CooldownKind::Play, now);
                ActionOutcome::Done {
                    score_delta: economy.play_reward,
                }
            }
            CareAction::Vet => {
                if !self.cooldowns.try_consume(CooldownKind::Vet, now) {
                    return ActionOutcome::CoolingDown {
                        remaining: self.cooldowns.remaining(CooldownKind::Vet, now),
                    };
                }
                if pet.health() >= pet.max_vitals().health {
                    return ActionOutcome::AlreadyHealthy;
                }
                if !self.score.try_spend(economy.vet_cost) {
                    return ActionOutcome::InsufficientScore {
                        needed: economy.vet_cost,
                    };
                }
                pet.take_to_vet();
                self.cooldowns.commit(CooldownKind::Vet, now);
                ActionOutcome::Done {
                    score_delta: -economy.vet_cost,
                }
            }
            CareAction::Exercise => {
                pet.exercise();
                self.score.increment(economy.exercise_reward);
                ActionOutcome::Done {
                    score_delta: economy.exercise_reward,
                }
            }
        }
    }

    pub fn buy(&mut self, shop: &Shop, kind: ItemKind, name: &str) -> PurchaseOutcome {
        let Some(entry) = shop.find(kind, name) else {
            return PurchaseOutcome::NotSold;
        };
        if !self.score.try_spend(entry.price) {
            return PurchaseOutcome::InsufficientScore { needed: entry.price };
        }
        self.inventory.add(kind, entry.item.clone(), 1);
        tracing::info!(item = %entry.item.name, price = entry.price, "bought from shop");
        PurchaseOutcome::Bought {
            item: entry.item.clone(),
            price: entry.price,
        }
    }

    pub fn to_snapshot(&self, now: DateTime<Utc>) -> PlayerSnapshot {
        let stock = |kind: ItemKind| -> Vec<StockSnapshot> {
            self.inventory
                .items(kind)
                .map(|(item, quantity)| StockSnapshot {
                    name: item.name.clone(),
                    value: item.value,
                    quantity,
                })
                .collect()
        };
        PlayerSnapshot {
            version: SAVE_VERSION,
            saved_at: now,
            player_name: self.name.clone(),
            score: self.score.get(),
            total_play_ms: self.total_play_time.num_milliseconds(),
            session_count: self.session_count,
            last_played_at: self.cooldowns.last_used(CooldownKind::Play),
            last_vet_at: self.cooldowns.last_used(CooldownKind::Vet),
            pet: self.pet.as_ref().map(PetSnapshot::from),
            food: stock(ItemKind::Food),
            gifts: stock(ItemKind::Gift),
        }
    }

    pub fn from_snapshot(snap: &PlayerSnapshot, cooldown: ChronoDuration) -> Self {
        let mut inventory = Inventory::empty();
        for (kind, list) in [(ItemKind::Food, &snap.food), (ItemKind::Gift, &snap.gifts)] {
            for s in list {
                inventory.add(kind, Item::new(s.name.clone(), s.value), s.quantity);
            }
        }
        Self {
            name: snap.player_name.clone(),
            score: Score::new(snap.score),
            pet: snap.pet.as_ref().map(PetSnapshot::restore),
            inventory,
            cooldowns: ActionCooldowns::restore(cooldown, snap.last_played_at, snap.last_vet_at),
            session_started_at: None,
            total_play_time: ChronoDuration::milliseconds(snap.total_play_ms.max(0)),
            session_count: snap.session_count,
        }
    }
}
