pub mod accounts;
pub mod client;
pub mod instructions;
pub mod metadata;

pub use client::{DbcClient, DBC_PROGRAM_ID};
