//! Print size catalog.
//!
//! The catalog is compiled in; only the external product ids can be
//! overridden through configuration.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{CurrencyCode, Price, ProductId};

/// Default product ids, used when no override is configured.
pub const DEFAULT_PRODUCT_ID_5X7: ProductId = ProductId::new(4842);
pub const DEFAULT_PRODUCT_ID_6X6: ProductId = ProductId::new(4843);
pub const DEFAULT_PRODUCT_ID_6X8: ProductId = ProductId::new(4844);
pub const DEFAULT_PRODUCT_ID_8X8: ProductId = ProductId::new(4844);

/// Error returned when a string is not a catalog size code.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown print size: {0:?}")]
pub struct UnknownSizeCode(pub String);

/// A print size offered in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeCode {
    #[serde(rename = "5x7")]
    FiveBySeven,
    #[serde(rename = "6x6")]
    SixBySix,
    #[serde(rename = "6x8")]
    SixByEight,
    #[serde(rename = "8x8")]
    EightByEight,
}

impl SizeCode {
    /// The code as shown to the endpoint (e.g. `"6x6"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FiveBySeven => "5x7",
            Self::SixBySix => "6x6",
            Self::SixByEight => "6x8",
            Self::EightByEight => "8x8",
        }
    }
}

impl fmt::Display for SizeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeCode {
    type Err = UnknownSizeCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "5x7" => Ok(Self::FiveBySeven),
            "6x6" => Ok(Self::SixBySix),
            "6x8" => Ok(Self::SixByEight),
            "8x8" => Ok(Self::EightByEight),
            other => Err(UnknownSizeCode(other.to_string())),
        }
    }
}

/// One purchasable print size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SizeOption {
    pub code: SizeCode,
    /// Inch rendition, e.g. "6×6 inches".
    pub label: &'static str,
    /// Centimetre rendition, e.g. "15.2×15.2 cm".
    pub dimensions: &'static str,
    pub price: Price,
    pub product_id: ProductId,
    /// Highlighted as the most popular choice.
    pub featured: bool,
}

impl SizeOption {
    /// Both unit renditions, e.g. "6×6 inches (15.2×15.2 cm)".
    #[must_use]
    pub fn physical_dimensions(&self) -> String {
        format!("{} ({})", self.label, self.dimensions)
    }
}

/// Optional product id overrides, one per size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductIdOverrides {
    pub five_by_seven: Option<ProductId>,
    pub six_by_six: Option<ProductId>,
    pub six_by_eight: Option<ProductId>,
    pub eight_by_eight: Option<ProductId>,
}

/// The fixed list of size options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    options: Vec<SizeOption>,
}

impl Catalog {
    /// Build the catalog, applying any configured product id overrides.
    #[must_use]
    pub fn new(overrides: ProductIdOverrides) -> Self {
        let usd = |cents| Price::from_cents(cents, CurrencyCode::USD);
        let options = vec![
            SizeOption {
                code: SizeCode::FiveBySeven,
                label: "5×7 inches",
                dimensions: "12.7×17.8 cm",
                price: usd(8499),
                product_id: overrides.five_by_seven.unwrap_or(DEFAULT_PRODUCT_ID_5X7),
                featured: false,
            },
            SizeOption {
                code: SizeCode::SixBySix,
                label: "6×6 inches",
                dimensions: "15.2×15.2 cm",
                price: usd(8999),
                product_id: overrides.six_by_six.unwrap_or(DEFAULT_PRODUCT_ID_6X6),
                featured: true,
            },
            SizeOption {
                code: SizeCode::SixByEight,
                label: "6×8 inches",
                dimensions: "15.2×20.3 cm",
                price: usd(9499),
                product_id: overrides.six_by_eight.unwrap_or(DEFAULT_PRODUCT_ID_6X8),
                featured: false,
            },
            SizeOption {
                code: SizeCode::EightByEight,
                label: "8×8 inches",
                dimensions: "20.3×20.3 cm",
                price: usd(9999),
                product_id: overrides.eight_by_eight.unwrap_or(DEFAULT_PRODUCT_ID_8X8),
                featured: false,
            },
        ];
        Self { options }
    }

    /// All options in display order.
    #[must_use]
    pub fn options(&self) -> &[SizeOption] {
        &self.options
    }

    /// Exact lookup by code.
    #[must_use]
    pub fn get(&self, code: SizeCode) -> Option<&SizeOption> {
        self.options.iter().find(|o| o.code == code)
    }

    /// Resolve a raw size code, falling back to the first option.
    ///
    /// An unmatched code (including `""`) is not an error: the review screen
    /// and the payload always need a concrete option.
    #[must_use]
    pub fn product_info(&self, code: &str) -> &SizeOption {
        #[allow(clippy::indexing_slicing)] // `new` always builds four options
        let first = &self.options[0];
        code.parse::<SizeCode>()
            .ok()
            .and_then(|code| self.get(code))
            .unwrap_or(first)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(ProductIdOverrides::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_info_matches_every_code() {
        let catalog = Catalog::default();
        for code in ["5x7", "6x6", "6x8", "8x8"] {
            assert_eq!(catalog.product_info(code).code.as_str(), code);
        }
    }

    #[test]
    fn test_product_info_falls_back_to_first() {
        let catalog = Catalog::default();
        assert_eq!(catalog.product_info("").code, SizeCode::FiveBySeven);
        assert_eq!(catalog.product_info("10x10").code, SizeCode::FiveBySeven);
        assert_eq!(catalog.product_info("6X6").code, SizeCode::FiveBySeven);
    }

    #[test]
    fn test_default_prices_and_ids() {
        let catalog = Catalog::default();
        let six = catalog.get(SizeCode::SixBySix).unwrap();
        assert_eq!(six.price.display(), "$89.99");
        assert_eq!(six.product_id, ProductId::new(4843));

        let prices: Vec<String> = catalog.options().iter().map(|o| o.price.display()).collect();
        assert_eq!(prices, vec!["$84.99", "$89.99", "$94.99", "$99.99"]);

        let eight = catalog.get(SizeCode::EightByEight).unwrap();
        assert_eq!(eight.product_id, ProductId::new(4844));
    }

    #[test]
    fn test_overrides_replace_defaults() {
        let catalog = Catalog::new(ProductIdOverrides {
            six_by_six: Some(ProductId::new(9001)),
            ..ProductIdOverrides::default()
        });
        assert_eq!(catalog.product_info("6x6").product_id, ProductId::new(9001));
        assert_eq!(catalog.product_info("5x7").product_id, DEFAULT_PRODUCT_ID_5X7);
    }

    #[test]
    fn test_exactly_one_featured() {
        let catalog = Catalog::default();
        let featured: Vec<_> = catalog.options().iter().filter(|o| o.featured).collect();
        assert_eq!(featured.len(), 1);
        assert_eq!(featured[0].code, SizeCode::SixBySix);
    }

    #[test]
    fn test_size_code_round_trips_through_str() {
        for option in Catalog::default().options() {
            assert_eq!(option.code.as_str().parse::<SizeCode>().unwrap(), option.code);
        }
        assert_eq!(
            "".parse::<SizeCode>(),
            Err(UnknownSizeCode(String::new()))
        );
    }

    #[test]
    fn test_physical_dimensions() {
        let catalog = Catalog::default();
        assert_eq!(
            catalog.get(SizeCode::FiveBySeven).unwrap().physical_dimensions(),
            "5×7 inches (12.7×17.8 cm)"
        );
    }
}
