pub mod app;
pub mod assistant;
pub mod catalog;
pub mod command;
pub mod config;
pub mod decision;
pub mod dispatch;
pub mod prompts;
pub mod provider;
pub mod shared;
pub mod telemetry;
pub mod transport;
