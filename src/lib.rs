pub mod board;
pub mod cache;
pub mod config;
pub mod error;
pub mod feed;
pub mod network;
pub mod types;
