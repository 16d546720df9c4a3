//! Built-in product dataset used by the mocked catalog backend.

use std::collections::HashSet;

use rust_decimal::Decimal;
use time::OffsetDateTime;
use time::macros::datetime;

use super::error::DomainError;
use super::product::Product;

fn product(
    id: i64,
    name: &str,
    price_cents: i64,
    created_at: OffsetDateTime,
    ratings: &[u8],
    stock: u32,
    discount: Option<u8>,
) -> Product {
    Product {
        id,
        name: name.to_string(),
        price: Decimal::new(price_cents, 2),
        created_at,
        image: format!("/static/products/{id}.webp"),
        ratings: ratings.to_vec(),
        stock,
        discount,
    }
}

/// The seed catalog, in insertion order.
#[rustfmt::skip]
pub fn seed_products() -> Vec<Product> {
    vec![
        product(1, "Linen Throw Pillow", 3400, datetime!(2024-01-04 09:15 UTC), &[5, 4, 5, 4], 42, None),
        product(2, "Ceramic Pour-Over Set", 5900, datetime!(2024-01-19 14:02 UTC), &[5, 5, 4], 18, Some(10)),
        product(3, "Walnut Desk Organizer", 4850, datetime!(2024-02-02 11:40 UTC), &[3, 4, 3], 25, None),
        product(4, "Merino Wool Beanie", 2900, datetime!(2024-02-21 08:05 UTC), &[4, 4, 5, 5, 3], 60, Some(15)),
        product(5, "Brass Table Lamp", 12900, datetime!(2024-03-03 17:30 UTC), &[5, 4], 7, None),
        product(6, "Recycled Glass Tumblers", 2400, datetime!(2024-03-15 10:12 UTC), &[2, 3, 3], 120, None),
        product(7, "Canvas Weekender Bag", 8900, datetime!(2024-04-01 12:00 UTC), &[], 14, Some(20)),
        product(8, "Stoneware Dinner Plates", 6400, datetime!(2024-04-18 16:45 UTC), &[4, 5, 4, 4], 33, None),
        product(9, "Cedar Scented Candle", 1800, datetime!(2024-05-06 07:50 UTC), &[5, 5, 5, 4, 5], 80, None),
        product(10, "Bamboo Cutting Board", 3200, datetime!(2024-05-22 13:25 UTC), &[3, 2, 4], 51, Some(5)),
        product(11, "Wool Area Rug", 24900, datetime!(2024-06-09 15:10 UTC), &[4, 3], 4, None),
        product(12, "Cast Iron Skillet", 4500, datetime!(2024-06-27 09:35 UTC), &[5, 4, 5], 27, None),
    ]
}

/// Validate every product and require unique ids.
pub fn validate_catalog(products: &[Product]) -> Result<(), DomainError> {
    let mut seen = HashSet::with_capacity(products.len());
    for product in products {
        product.validate()?;
        if !seen.insert(product.id) {
            return Err(DomainError::invariant(format!(
                "duplicate product id {}",
                product.id
            )));
        }
    }
    Ok(())
}
