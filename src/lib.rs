//! Ant Colony Optimization route discovery for task dispatch.
//!
//! Given a set of tasks described by facets (bandwidth, latency, CPU
//! weight, retry limit, timeout), a colony of ants searches for a
//! low-cost visiting order. The best order found becomes a per-task
//! dispatch priority.
//!
//! - [`aco`]: Task model, colony engine and priority extraction.
//! - [`error`]: Error taxonomy shared by all operations.
//!
//! # Features
//!
//! - `serde`: Serialize/deserialize the task model, config and priority map.
//! - `parallel`: Construct ant tours on rayon workers.
//!
//! # Architecture
//!
//! This crate sits at Layer 2 (Algorithms) in the U-Engine ecosystem,
//! depending only on `u-numflow` (Layer 1: Foundation) for seeded random
//! streams. Task origination and dispatch live in higher layers.

pub mod aco;
pub mod error;

pub use error::AcoError;
