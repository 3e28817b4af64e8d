//! Canonical basket encoding.
//!
//! The gateway expects the purchased items as a base64-encoded array of
//! `[name, unit_price, quantity]` triples. The same string is sent as the
//! `user_basket` form field and is part of the token signing string, so the
//! encoding must be byte-for-byte stable.
//!
//! # Examples
//!
//! ```
//! use paytr_client::basket::{BasketItem, encode_basket};
//!
//! # fn example() -> paytr_client::Result<()> {
//! let items = vec![BasketItem::new("Kalem", "10.50", 3)];
//! let basket = encode_basket(&items)?;
//! assert_eq!(basket, "W1siS2FsZW0iLCIxMC41MCIsM11d");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

mod quote;

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

pub use self::quote::quote_to_ascii;
use crate::error::{PaytrError, Result};

/// A single purchased item.
///
/// The unit price is carried as text so that the decimal formatting chosen by
/// the merchant (`"18.00"` vs `"18"`) reaches the gateway unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketItem {
    name: String,
    unit_price: String,
    quantity: u32,
}

impl BasketItem {
    /// Creates a new basket item.
    ///
    /// Values are validated when the basket is encoded, not here.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for constructors"
    )]
    pub fn new(name: impl Into<String>, unit_price: impl Into<String>, quantity: u32) -> Self {
        Self { name: name.into(), unit_price: unit_price.into(), quantity }
    }

    /// Item display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price as decimal text (e.g. `"33.25"`).
    #[must_use]
    pub fn unit_price(&self) -> &str {
        &self.unit_price
    }

    /// Number of units.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Validates the item and appends its `[name,price,quantity]` entry to `out`.
    fn write_entry(&self, index: usize, out: &mut String) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PaytrError::ValidationError(format!("basket item {index} has an empty name")));
        }
        if !is_decimal_literal(&self.unit_price) {
            return Err(PaytrError::EncodingError(format!(
                "basket item {index} unit price '{}' is not a decimal literal",
                self.unit_price
            )));
        }

        out.push('[');
        out.push_str(&quote_to_ascii(&self.name));
        out.push(',');
        out.push_str(&quote_to_ascii(&self.unit_price));
        out.push(',');
        out.push_str(&self.quantity.to_string());
        out.push(']');
        Ok(())
    }
}

/// Accepts `digits` or `digits.digits`.
fn is_decimal_literal(price: &str) -> bool {
    let (whole, fraction) = match price.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (price, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    all_digits(whole) && fraction.is_none_or(all_digits)
}

/// Encodes `items` into the canonical basket string.
///
/// Each item becomes `[name,price,quantity]` with name and price quoted by
/// [`quote_to_ascii`]; entries are comma-joined, wrapped in `[...]` and the
/// UTF-8 bytes are base64-encoded with the standard padded alphabet.
///
/// # Errors
///
/// - [`PaytrError::ValidationError`] if `items` is empty or an item has an empty name
/// - [`PaytrError::EncodingError`] if a unit price is not a decimal literal
pub fn encode_basket(items: &[BasketItem]) -> Result<String> {
    if items.is_empty() {
        return Err(PaytrError::ValidationError(
            "basket must contain at least one item".to_owned(),
        ));
    }

    let mut raw = String::from("[");
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            raw.push(',');
        }
        item.write_entry(index, &mut raw)?;
    }
    raw.push(']');

    Ok(STANDARD.encode(raw.as_bytes()))
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    fn sample_items() -> Vec<BasketItem> {
        vec![
            BasketItem::new("Örnek ürün 1", "18.00", 1),
            BasketItem::new("Örnek ürün 2", "33.25", 2),
            BasketItem::new("Örnek ürün 3", "45.42", 1),
        ]
    }

    fn decode(basket: &str) -> String {
        String::from_utf8(STANDARD.decode(basket).unwrap()).unwrap()
    }

    #[test]
    fn test_encode_single_item() {
        let basket = encode_basket(&[BasketItem::new("Kalem", "10.50", 3)]).unwrap();
        assert_eq!(basket, "W1siS2FsZW0iLCIxMC41MCIsM11d");
        assert_eq!(decode(&basket), r#"[["Kalem","10.50",3]]"#);
    }

    #[test]
    fn test_encode_turkish_items_golden() {
        let basket = encode_basket(&sample_items()).unwrap();
        assert_eq!(
            basket,
            "W1siXHUwMGQ2cm5layBcdTAwZmNyXHUwMGZjbiAxIiwiMTguMDAiLDFdLFsiXHUwMGQ2cm5layBcdTAwZmNyXHUwMGZjbiAyIiwiMzMuMjUiLDJdLFsiXHUwMGQ2cm5layBcdTAwZmNyXHUwMGZjbiAzIiwiNDUuNDIiLDFdXQ=="
        );
    }

    #[test]
    fn test_decoded_basket_is_json_array_of_triples() {
        let items = sample_items();
        let basket = encode_basket(&items).unwrap();
        let raw = decode(&basket);
        assert!(raw.is_ascii());

        let parsed: Value = serde_json::from_str(&raw).unwrap();
        let entries = parsed.as_array().unwrap();
        assert_eq!(entries.len(), items.len());

        for (entry, item) in entries.iter().zip(&items) {
            let triple = entry.as_array().unwrap();
            assert_eq!(triple.len(), 3);
            assert_eq!(triple[0].as_str().unwrap(), item.name());
            assert_eq!(triple[1].as_str().unwrap(), item.unit_price());
            assert_eq!(triple[2].as_u64().unwrap(), u64::from(item.quantity()));
        }
    }

    #[test]
    fn test_empty_basket_is_rejected() {
        let result = encode_basket(&[]);
        assert!(matches!(result, Err(PaytrError::ValidationError(_))));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let result = encode_basket(&[BasketItem::new("  ", "1.00", 1)]);
        assert!(matches!(result, Err(PaytrError::ValidationError(_))));
    }

    #[test]
    fn test_invalid_price_is_encoding_error() {
        for price in ["", "18,00", "1.2.3", ".50", "10.", "-5", "1e3", "12 TL"] {
            let result = encode_basket(&[BasketItem::new("Kalem", price, 1)]);
            assert!(
                matches!(result, Err(PaytrError::EncodingError(_))),
                "price {price:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_price_formatting_is_preserved() {
        let basket = encode_basket(&[BasketItem::new("A", "18", 0), BasketItem::new("B", "0.10", 7)])
            .unwrap();
        assert_eq!(decode(&basket), r#"[["A","18",0],["B","0.10",7]]"#);
    }

    #[test]
    fn test_quotes_in_name_are_escaped() {
        let basket = encode_basket(&[BasketItem::new(r#"5" disk"#, "1.00", 1)]).unwrap();
        assert_eq!(decode(&basket), r#"[["5\" disk","1.00",1]]"#);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let items = sample_items();
        assert_eq!(encode_basket(&items).unwrap(), encode_basket(&items).unwrap());
    }
}
