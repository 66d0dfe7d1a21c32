pub mod cli;
pub mod components;
pub mod config;
pub mod db;
pub mod models;
pub mod services;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use db::Database;

/// Prefix shared by every localization key this crate emits.
pub const LOCALIZATION_KEY: &str = "taxonomy::lang.";
