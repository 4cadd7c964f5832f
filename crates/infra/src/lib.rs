//! Infrastructure layer: stores, stock orchestration, DB, config, seeding.

pub mod config;
pub mod db;
pub mod seed;
pub mod stock_engine;
pub mod store;


pub use stock_engine::{StockEngine, StockError};
