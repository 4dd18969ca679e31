//! hris-forest: org-group and reporting-line hierarchies plus fiscal-year
//! earnings summaries from unified HRIS records.
//!
//! Layers:
//! - `domain`: records, forest arena, hierarchy builder, renderer, earnings aggregation
//! - `application`: services orchestrating the domain
//! - `infrastructure`: filesystem boundary, record decoding, service wiring
//! - `cli`: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
