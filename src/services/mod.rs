// src/services/mod.rs

pub mod attempt;
pub mod reconcile;
pub mod scoring;

pub use attempt::AttemptEngine;
