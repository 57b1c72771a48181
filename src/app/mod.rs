// LogScope - app/mod.rs
//
// Application layer: source loading, rule selection, session state, report.
// Dependencies: core and platform layers.

pub mod ingest;
pub mod report;
pub mod rules_mgr;
pub mod state;
