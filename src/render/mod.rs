// src/render/mod.rs
pub mod block;
pub mod schema;

// Re-export key rendering types for convenience
pub use block::{build_block, build_raw_block, BlockOptions};
pub use schema::{build_schema, to_json, to_script_tag, FaqSchema};
