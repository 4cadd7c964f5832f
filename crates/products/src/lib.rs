//! Products domain module.
//!
//! This crate contains the product catalog model (bill-of-materials over
//! articles) and the stock rules derived from it, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod product;
pub mod stock;

pub use product::{Product, ProductArticle, ProductWithStock};
pub use stock::{decrement_batch, derive_stock, with_stock};
