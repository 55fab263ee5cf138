pub mod config;
pub mod release;
