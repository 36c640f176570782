pub mod cache;
pub mod config;
pub mod controller;
pub mod dashboard;
pub mod error;
pub mod fees;
pub mod meteora;
pub mod models;
pub mod server;
pub mod solana;
pub mod source;
pub mod state;
pub mod utils;
