//! # Reveille Core Library
//!
//! Core business logic for the Reveille clock application: alarms with
//! weekday repeat rules, countdown timers, a stopwatch, and a world-clock
//! board. The GUI layer is a thin shell over this library; everything here
//! is host-driven and thread-free.
//!
//! ## Architecture
//!
//! - **Rule engine**: a weekday vocabulary plus a bidirectional codec
//!   between repeat rules and their display subtitles
//! - **Stores**: mutex-serialized collections that persist JSON blobs to a
//!   key-value store after each mutation and publish snapshots to
//!   observers in registration order
//! - **Scheduling**: a pure planner mapping each enabled alarm or active
//!   timer onto triggers for an external notification scheduler
//! - **Ticking**: the timer ledger advances one second per `tick()` call
//!   from the host's loop; the stopwatch reads the wall clock on demand
//!
//! ## Key Components
//!
//! - [`RuleSet`]: set of repeat weekdays; empty means "fire once"
//! - [`AlarmStore`] / [`TimerLedger`]: the authoritative collections
//! - [`TriggerScheduler`]: boundary to the platform notification center
//! - [`Config`]: TOML-backed user preferences

pub mod alarm;
pub mod error;
pub mod notify;
pub mod observer;
pub mod rule;
pub mod stopwatch;
pub mod storage;
pub mod timer;
pub mod weekday;
pub mod worldclock;

#[cfg(test)]
pub(crate) mod testutil;

pub use alarm::{Alarm, AlarmStore};
pub use error::{CoreError, Result, SchedulerError, StorageError};
pub use notify::{
    InMemoryScheduler, TriggerContent, TriggerFire, TriggerRequest, TriggerScheduler,
};
pub use observer::{ObserverId, Observers};
pub use rule::RuleSet;
pub use stopwatch::{LapTime, Stopwatch};
pub use storage::{Config, JsonFileStore, KeyValueStore};
pub use timer::{TimerLedger, TimerRecord};
pub use weekday::Weekday;
pub use worldclock::{WorldClockBoard, WorldClockEntry};
