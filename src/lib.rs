pub mod app;
pub mod config;
pub mod effects;
pub mod keys;
pub mod palette;
pub mod panel;
pub mod terminal;
pub mod ticker;
pub mod ui;
