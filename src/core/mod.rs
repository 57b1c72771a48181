// LogScope - core/mod.rs
//
// Core logic layer: parsing, categorisation, filtering, aggregation, export.
// Dependencies: standard library and pure data crates (regex, chrono, serde).
// Must NOT depend on: platform, app, or read from the filesystem.

pub mod aggregate;
pub mod export;
pub mod filter;
pub mod model;
pub mod parser;
pub mod rules;
