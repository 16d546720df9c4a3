//! Catalog products and their derived rating figures.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::error::DomainError;

pub const MIN_RATING_VALUE: u8 = 1;
pub const MAX_RATING_VALUE: u8 = 5;
const MAX_DISCOUNT_PERCENT: u8 = 100;

/// A product as stored in the catalog dataset.
///
/// The average rating is never stored; it is derived from `ratings` on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub ratings: Vec<u8>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub discount: Option<u8>,
}

impl Product {
    pub fn avg_rating(&self) -> f64 {
        average_rating(&self.ratings)
    }

    /// Check the dataset invariants for a single product.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.price.is_sign_negative() {
            return Err(DomainError::validation(format!(
                "product {} has a negative price",
                self.id
            )));
        }
        if let Some(value) = self
            .ratings
            .iter()
            .find(|value| !(MIN_RATING_VALUE..=MAX_RATING_VALUE).contains(*value))
        {
            return Err(DomainError::validation(format!(
                "product {} has rating {value} outside {MIN_RATING_VALUE}..={MAX_RATING_VALUE}",
                self.id
            )));
        }
        if let Some(discount) = self.discount.filter(|value| *value > MAX_DISCOUNT_PERCENT) {
            return Err(DomainError::validation(format!(
                "product {} has discount {discount}% above {MAX_DISCOUNT_PERCENT}%",
                self.id
            )));
        }
        Ok(())
    }

    /// Project the product into the row shape returned by catalog queries.
    pub fn summary(&self) -> ProductSummary {
        ProductSummary {
            id: self.id,
            name: self.name.clone(),
            price: self.price,
            created_at: self.created_at,
            image: self.image.clone(),
            avg_rating: self.avg_rating(),
        }
    }

    pub fn rating_summary(&self) -> RatingSummary {
        RatingSummary {
            product_id: self.id,
            avg_rating: self.avg_rating(),
            count: self.ratings.len() as u64,
        }
    }
}

/// Query projection of a [`Product`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub image: String,
    pub avg_rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub product_id: i64,
    pub avg_rating: f64,
    pub count: u64,
}

/// Arithmetic mean of the ratings, or `0.0` when there are none.
pub fn average_rating(ratings: &[u8]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let total: u64 = ratings.iter().map(|value| u64::from(*value)).sum();
    total as f64 / ratings.len() as f64
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn product(ratings: Vec<u8>) -> Product {
        Product {
            id: 1,
            name: "Desk lamp".to_string(),
            price: Decimal::new(2450, 2),
            created_at: datetime!(2024-01-10 09:00 UTC),
            image: String::new(),
            ratings,
            stock: 3,
            discount: None,
        }
    }

    #[test]
    fn average_of_empty_ratings_is_zero() {
        assert_eq!(average_rating(&[]), 0.0);
    }

    #[test]
    fn average_is_arithmetic_mean() {
        assert_eq!(average_rating(&[5, 5, 5]), 5.0);
        assert_eq!(average_rating(&[1, 2, 3]), 2.0);
        assert_eq!(average_rating(&[4, 5]), 4.5);
    }

    #[test]
    fn average_does_not_touch_input() {
        let ratings = vec![3, 1, 2];
        let _ = average_rating(&ratings);
        assert_eq!(ratings, vec![3, 1, 2]);
    }

    #[test]
    fn summary_derives_average() {
        let summary = product(vec![2, 4]).summary();
        assert_eq!(summary.avg_rating, 3.0);
        assert_eq!(summary.name, "Desk lamp");
    }

    #[test]
    fn rating_summary_counts_votes() {
        let summary = product(vec![1, 2, 3]).rating_summary();
        assert_eq!(summary.product_id, 1);
        assert_eq!(summary.avg_rating, 2.0);
        assert_eq!(summary.count, 3);
    }

    #[test]
    fn validate_rejects_out_of_range_rating() {
        let err = product(vec![5, 6]).validate().expect_err("rating 6 is invalid");
        assert!(err.to_string().contains("rating 6"));
    }

    #[test]
    fn validate_rejects_negative_price_and_large_discount() {
        let mut negative = product(vec![]);
        negative.price = Decimal::new(-1, 0);
        assert!(negative.validate().is_err());

        let mut discounted = product(vec![]);
        discounted.discount = Some(101);
        assert!(discounted.validate().is_err());

        discounted.discount = Some(100);
        assert!(discounted.validate().is_ok());
    }
}
