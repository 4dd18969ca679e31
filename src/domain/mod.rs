//! Domain layer: entities and the hierarchy / earnings algorithms
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod earnings;
pub mod entities;
pub mod error;
pub mod render;

pub use arena::{ForestArena, TreeNode};
pub use builder::{ForestBuilder, Partitions, TreeResult};
pub use earnings::{
    aggregate_window, DateFilter, EarningDetail, EarningsLookup, FiscalWindow, WindowBounds,
};
pub use entities::*;
pub use error::DomainError;
pub use render::{DisplayNameChain, ForestRenderer, ForestSummary};
