//! Virtual-pet simulation core: stat decay, rate-limited care actions,
//! parental play windows and a points economy, with JSON save slots.

pub mod config;
pub mod cooldown;
pub mod error;
pub mod inventory;
pub mod parental;
pub mod pet;
pub mod scheduler;
pub mod score;
pub mod session;
pub mod snapshot;
pub mod species;
pub mod storage;
