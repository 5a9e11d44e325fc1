// src/lib.rs
//! Heuristic FAQ extraction from article HTML.
//!
//! [`extract`] finds question/answer pairs; [`render::build_block`] and
//! [`render::build_schema`] turn the same item list into a display block and
//! FAQPage structured data. All three are pure and never fail.
//!
//! ```
//! use faq_extractor::render::{build_block, build_schema, BlockOptions};
//!
//! let items = faq_extractor::extract("<h2>What is it?</h2><p>A tool.</p>");
//! let block = build_block(&items, &BlockOptions::default());
//! let schema = build_schema(&items);
//! assert_eq!(schema.main_entity.len(), 1);
//! assert!(block.contains("What is it?"));
//! ```
pub mod ai;
pub mod config;
pub mod extractors;
pub mod render;
pub mod sanitize;
pub mod storage;
pub mod utils;

pub use extractors::{extract, FaqExtractor, FaqItem, Matcher};
