pub mod logging;
pub mod models;
pub mod playout;
pub mod plugin;
pub mod settings;
pub mod simulator;
