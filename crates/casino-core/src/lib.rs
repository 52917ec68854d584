//! # Couples Casino Core Library
//!
//! Core logic for Couples Casino: two partners write challenge tasks for each
//! other, and once a week each of them spins for one of the partner's tasks.
//! The `casino` CLI is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Temporal gate**: pure functions deciding spin day, the threshold hour
//!   and week boundaries, plus an async countdown ticker
//! - **Sampler**: category-balanced random reveal of the partner's pool
//! - **Weekly flow**: phase derivation and the spin, verify, complete and
//!   veto workflows for one acting user
//! - **Storage**: the [`CasinoStore`] persistence boundary, its SQLite
//!   implementation and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`SpinSchedule`]: Weekly spin clock
//! - [`TaskSampler`]: Reveal sampling
//! - [`WeeklyFlow`]: Workflow over a store for one session
//! - [`CasinoDb`]: SQLite persistence
//! - [`Config`]: Application configuration management

pub mod error;
pub mod sampler;
pub mod spin;
pub mod storage;
pub mod task;
pub mod user;
pub mod week;
pub mod weekly;

pub use error::{ConfigError, CoreError, DatabaseError, ErrorKind, ValidationError};
pub use sampler::{select_random_tasks, spin_wheel, SamplerConfig, TaskSampler};
pub use spin::{Side, SpinStatus, VetoUsage, WeeklySpin};
pub use storage::{CasinoDb, CasinoStore, Config};
pub use task::{PoolSummary, Task, TaskStatus, TaskUpdate};
pub use user::{Session, User};
pub use week::{Countdown, SpinSchedule};
pub use weekly::{CurrentWeekView, Phase, SpinOutcome, WeeklyFlow};
