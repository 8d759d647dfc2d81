//! Shared domain models.

use serde::Serialize;

/// A normalized catalog entry, field names camel-cased for the
/// presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    /// Numeric identifier, unique within the catalog.
    pub id: u32,
    /// Display title.
    pub title: String,
    /// Price before any discount, in the store currency.
    pub original_price: f64,
    /// Discount in percent; `None` means the game sells at full price.
    pub discount_percentage: Option<f64>,
    /// Genre labels, in backend order.
    pub genres: Vec<String>,
    /// Platform label (e.g. `PC`).
    pub platform: String,
    /// Absolute URL of the cover image.
    pub image_url: String,
}

impl Game {
    /// Whether a discount currently applies.
    pub fn has_discount(&self) -> bool {
        self.discount_percentage.is_some()
    }

    /// Price after applying the discount percentage, if any.
    pub fn final_price(&self) -> f64 {
        match self.discount_percentage {
            Some(percentage) => self.original_price * (100.0 - percentage) / 100.0,
            None => self.original_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(discount: Option<f64>) -> Game {
        Game {
            id: 7,
            title: "Sample".to_string(),
            original_price: 40.0,
            discount_percentage: discount,
            genres: vec!["Action".to_string()],
            platform: "PC".to_string(),
            image_url: "http://localhost:3001/img/sample.png".to_string(),
        }
    }

    #[test]
    fn full_price_without_discount() {
        let game = sample(None);
        assert!(!game.has_discount());
        assert_eq!(game.final_price(), 40.0);
    }

    #[test]
    fn discount_reduces_final_price() {
        let game = sample(Some(25.0));
        assert!(game.has_discount());
        assert_eq!(game.final_price(), 30.0);
    }

    #[test]
    fn serializes_with_camel_case_names() {
        let value = serde_json::to_value(sample(Some(25.0))).unwrap();
        let object = value.as_object().unwrap();
        assert!(object.contains_key("originalPrice"));
        assert!(object.contains_key("discountPercentage"));
        assert!(object.contains_key("imageUrl"));
        assert!(!object.contains_key("original_price"));
    }
}
