use serde::{Deserialize, Serialize};

use warehouse_core::{ArticleId, Entity};

/// A raw stock-keeping unit with a quantity on hand.
///
/// `stock` is signed: selling without an availability check may drive it
/// below zero, and that state is preserved rather than clamped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub name: String,
    pub stock: i32,
}

impl Article {
    pub fn new(id: ArticleId, name: impl Into<String>, stock: i32) -> Self {
        Self {
            id,
            name: name.into(),
            stock,
        }
    }
}

impl Entity for Article {
    type Id = ArticleId;

    fn id(&self) -> ArticleId {
        self.id
    }
}

/// One line of a decrement batch: reduce `id`'s stock by `quantity`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleDecrement {
    pub id: ArticleId,
    pub quantity: i32,
}

impl ArticleDecrement {
    pub fn new(id: ArticleId, quantity: i32) -> Self {
        Self { id, quantity }
    }
}
