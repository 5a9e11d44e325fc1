// src/ai/mod.rs
//! Optional AI generation path. Host-side only: nothing in the extraction
//! core calls into this module.
pub mod client;
pub mod models;

pub use client::generate_faqs;
pub use models::{AiOutput, AiSettings, Provider};
