//! Shell Pack Booster core.
//!
//! A player starts a timed booster, waits (or opens it early), and receives a
//! randomly rolled card whose rarity and stats scale with the wait. This crate
//! holds the timer state machine, the reward engine and the persisted state;
//! the ratzilla frontend in `main.rs` only renders what [`BoosterService`]
//! returns.

pub mod catalog;
pub mod collection;
pub mod console;
pub mod constants;
pub mod error;
pub mod ids;
pub mod model;
pub mod reward;
pub mod service;
pub mod storage;
pub mod time;
pub mod timer;

pub use catalog::{BoosterType, Catalog, CardTemplate, PackEntry};
pub use error::BoosterError;
pub use model::{Card, PersistedState, RarityTier, StatKind, Stats, Timer, TimerStatus};
pub use service::BoosterService;
pub use storage::{MemoryStorage, Persistence, StorageBackend};
pub use time::{Clock, ManualClock, SystemClock};
