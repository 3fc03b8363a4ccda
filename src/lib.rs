pub mod app;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod output;
pub mod password;
pub mod relay;
pub mod table;
pub mod utils;

#[cfg(test)]
mod tests;
