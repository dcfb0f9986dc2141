pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod display;
pub mod inventory;
pub mod output;
pub mod render;

#[cfg(test)]
mod tests;
