//! River Farm: tile placement on a 4x6 board, scored by which water sources
//! each player's fields can reach through the composed river network.

pub mod grid;
pub mod networks;
pub mod plugin;
pub mod report;
pub mod scoring;
pub mod tiles;
pub mod types;
