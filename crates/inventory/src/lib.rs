//! Inventory domain module.
//!
//! This crate contains the article model (raw stock units and their on-hand
//! quantity), implemented purely as domain types (no IO, no HTTP, no storage).

pub mod article;

pub use article::{Article, ArticleDecrement};
