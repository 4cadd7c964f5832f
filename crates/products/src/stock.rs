//! Stock rules: deriving sellable units from article inventory, and scaling a
//! sale into an article decrement batch.
//!
//! ## Derived stock
//!
//! A product's stock is the minimum, across its bill-of-materials, of
//! `floor(article_stock / quantity_required)` (truncating toward zero, so a
//! negative on-hand quantity yields a zero or negative capacity).
//!
//! - An unknown article anywhere in the list makes the product unavailable (0),
//!   regardless of the other components.
//! - An empty bill-of-materials yields 0, not "unlimited".
//!
//! ## Removal
//!
//! Selling `n` units decrements every component by `quantity_required * n`.
//! No availability check is made: overselling drives article stock negative.

use std::collections::HashMap;

use warehouse_core::{ArticleId, DomainError, DomainResult};
use warehouse_inventory::{Article, ArticleDecrement};

use crate::product::{Product, ProductArticle, ProductWithStock};

/// Derive the number of complete product units available.
///
/// `on_hand` returns the current stock of an article, or `None` when the
/// article does not exist.
pub fn derive_stock<F>(articles: &[ProductArticle], mut on_hand: F) -> i32
where
    F: FnMut(ArticleId) -> Option<i32>,
{
    articles
        .iter()
        .try_fold(None, |min: Option<i32>, line| {
            let capacity = on_hand(line.id)? / line.quantity();
            Some(Some(min.map_or(capacity, |m| m.min(capacity))))
        })
        .flatten()
        .unwrap_or(0)
}

/// Join products against articles and derive each product's stock.
///
/// Output order follows `products`.
pub fn with_stock(products: Vec<Product>, articles: &[Article]) -> Vec<ProductWithStock> {
    let inventory: HashMap<ArticleId, i32> = articles.iter().map(|a| (a.id, a.stock)).collect();

    products
        .into_iter()
        .map(|product| {
            let stock = derive_stock(&product.articles, |id| inventory.get(&id).copied());
            ProductWithStock { product, stock }
        })
        .collect()
}

/// Scale a product's bill-of-materials into the decrement batch for selling
/// `quantity` units, preserving component order.
///
/// Returns an empty batch for a product with no components.
// TODO: reject the sale when any line exceeds current article stock once an
// availability check is agreed on; today overselling is accepted.
pub fn decrement_batch(product: &Product, quantity: i32) -> DomainResult<Vec<ArticleDecrement>> {
    if quantity < 1 {
        return Err(DomainError::validation(format!(
            "quantity must be positive, got {quantity}"
        )));
    }

    product
        .articles
        .iter()
        .map(|line| {
            line.quantity()
                .checked_mul(quantity)
                .map(|amount| ArticleDecrement::new(line.id, amount))
                .ok_or_else(|| {
                    DomainError::validation(format!(
                        "decrement for article {} overflows ({} x {quantity})",
                        line.id,
                        line.quantity()
                    ))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use warehouse_core::ProductId;

    fn line(id: i32, quantity: i32) -> ProductArticle {
        ProductArticle::new(ArticleId::new(id), quantity).unwrap()
    }

    fn product(id: i32, lines: Vec<ProductArticle>) -> Product {
        Product::new(ProductId::new(id), format!("product-{id}"), 100, lines)
    }

    fn article(id: i32, stock: i32) -> Article {
        Article::new(ArticleId::new(id), format!("article-{id}"), stock)
    }

    #[test]
    fn stock_is_minimum_component_capacity() {
        // capacities: 12/4 = 3, 17/8 = 2, 2/1 = 2
        let products = vec![product(1, vec![line(1, 4), line(2, 8), line(3, 1)])];
        let articles = vec![article(1, 12), article(2, 17), article(3, 2)];

        let out = with_stock(products, &articles);
        assert_eq!(out[0].stock, 2);
    }

    #[test]
    fn missing_article_makes_product_unavailable() {
        let products = vec![product(1, vec![line(1, 4), line(4, 1)])];
        let articles = vec![article(1, 1000)];

        let out = with_stock(products, &articles);
        assert_eq!(out[0].stock, 0);
    }

    #[test]
    fn missing_first_article_short_circuits() {
        let mut looked_up = Vec::new();
        let stock = derive_stock(&[line(7, 1), line(1, 1)], |id| {
            looked_up.push(id);
            if id == ArticleId::new(1) { Some(50) } else { None }
        });

        assert_eq!(stock, 0);
        assert_eq!(looked_up, vec![ArticleId::new(7)]);
    }

    #[test]
    fn empty_bill_of_materials_has_zero_stock() {
        let out = with_stock(vec![product(1, vec![])], &[article(1, 10)]);
        assert_eq!(out[0].stock, 0);
    }

    #[test]
    fn negative_stock_is_not_clamped() {
        let stock = derive_stock(&[line(1, 2), line(2, 1)], |id| match id.get() {
            1 => Some(-7),
            _ => Some(10),
        });
        // -7 / 2 truncates toward zero
        assert_eq!(stock, -3);
    }

    #[test]
    fn oversold_components_report_negative_product_stock() {
        // Three tables sold from legs 12, screws 17, top 1.
        let products = vec![
            product(1, vec![line(1, 4), line(2, 8), line(3, 1)]),
            product(2, vec![line(1, 4), line(2, 8), line(4, 1)]),
        ];
        let articles = vec![article(1, 0), article(2, -7), article(3, 2), article(4, -2)];

        let stocks: Vec<i32> = with_stock(products, &articles).iter().map(|p| p.stock).collect();
        // chair: min(0, 0, 2) = 0; table: min(0, 0, -2) = -2
        assert_eq!(stocks, vec![0, -2]);
    }

    #[test]
    fn leftover_stock_never_rounds_up() {
        let stock = derive_stock(&[line(1, 4)], |_| Some(7));
        assert_eq!(stock, 1);
    }

    #[test]
    fn output_preserves_product_order() {
        let products = vec![
            product(3, vec![line(1, 1)]),
            product(1, vec![line(1, 2)]),
            product(2, vec![]),
        ];
        let out = with_stock(products, &[article(1, 4)]);

        let ids: Vec<i32> = out.iter().map(|p| p.product.id.get()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        let stocks: Vec<i32> = out.iter().map(|p| p.stock).collect();
        assert_eq!(stocks, vec![4, 2, 0]);
    }

    #[test]
    fn decrement_batch_scales_every_line() {
        let p = product(1, vec![line(1, 5), line(2, 2)]);
        let batch = decrement_batch(&p, 3).unwrap();

        assert_eq!(
            batch,
            vec![
                ArticleDecrement::new(ArticleId::new(1), 15),
                ArticleDecrement::new(ArticleId::new(2), 6),
            ]
        );
    }

    #[test]
    fn decrement_batch_for_empty_product_is_empty() {
        let batch = decrement_batch(&product(1, vec![]), 1).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn decrement_batch_rejects_non_positive_quantity() {
        let p = product(1, vec![line(1, 1)]);
        assert!(matches!(decrement_batch(&p, 0), Err(DomainError::Validation(_))));
    }

    #[test]
    fn decrement_batch_rejects_overflow() {
        let p = product(1, vec![line(1, i32::MAX)]);
        assert!(matches!(decrement_batch(&p, 2), Err(DomainError::Validation(_))));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn lines() -> impl Strategy<Value = Vec<(i32, i32)>> {
            // (article stock, quantity required)
            prop::collection::vec((-1_000i32..1_000, 1i32..50), 1..8)
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: with every component present, stock is the minimum truncated quotient.
            #[test]
            fn stock_matches_min_of_quotients(components in lines()) {
                let bom: Vec<ProductArticle> = components
                    .iter()
                    .enumerate()
                    .map(|(i, (_, q))| line(i as i32, *q))
                    .collect();
                let stock = derive_stock(&bom, |id| Some(components[id.get() as usize].0));

                let expected = components.iter().map(|(s, q)| s / q).min().unwrap();
                prop_assert_eq!(stock, expected);
            }

            /// Property: any missing component yields zero stock.
            #[test]
            fn any_missing_component_yields_zero(
                components in lines(),
                missing in any::<prop::sample::Index>(),
            ) {
                let bom: Vec<ProductArticle> = components
                    .iter()
                    .enumerate()
                    .map(|(i, (_, q))| line(i as i32, *q))
                    .collect();
                let hole = missing.index(components.len());
                let stock = derive_stock(&bom, |id| {
                    let i = id.get() as usize;
                    if i == hole { None } else { Some(components[i].0) }
                });

                prop_assert_eq!(stock, 0);
            }

            /// Property: every decrement equals quantity_required * quantity, in order.
            #[test]
            fn decrement_batch_multiplies_in_order(components in lines(), qty in 1i32..100) {
                let bom: Vec<ProductArticle> = components
                    .iter()
                    .enumerate()
                    .map(|(i, (_, q))| line(i as i32, *q))
                    .collect();
                let p = product(1, bom.clone());
                let batch = decrement_batch(&p, qty).unwrap();

                prop_assert_eq!(batch.len(), bom.len());
                for (d, l) in batch.iter().zip(bom.iter()) {
                    prop_assert_eq!(d.id, l.id);
                    prop_assert_eq!(d.quantity, l.quantity() * qty);
                }
            }
        }
    }
}
