//! Terminal frontend: wires stdin, the core state machine and the engine.
mod app;
mod config;
mod effects;
mod input;
mod logging;
mod ui;

pub use app::run_app;
