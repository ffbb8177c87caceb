// src/handlers/mod.rs

pub mod attempt;
pub mod docs;
pub mod quiz;
pub mod stats;
