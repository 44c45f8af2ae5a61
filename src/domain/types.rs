//! Strongly-typed value objects used by domain entities.
//!
//! Products, attachments and remote records carry these wrappers instead of
//! raw primitives so that identifiers, SKUs, prices and URLs are validated
//! once at the boundary.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::ValidateUrl;

/// Errors produced when attempting to construct constrained domain types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// An identifier was zero or negative.
    #[error("{0} must be greater than zero")]
    NonPositiveId(&'static str),
    /// A numeric value required to be non-negative was negative.
    #[error("{0} must be zero or greater")]
    NegativeNumber(&'static str),
    /// A string was empty or whitespace-only after trimming.
    #[error("{0} cannot be empty")]
    EmptyString(&'static str),
    /// URL validation failed.
    #[error("{0} must be a valid URL")]
    InvalidUrl(&'static str),
    /// Catch-all for custom validation failures.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

fn trim_and_require_non_empty<S: Into<String>>(
    value: S,
    field: &'static str,
) -> Result<String, TypeConstraintError> {
    let trimmed = value.into().trim().to_string();
    if trimmed.is_empty() {
        Err(TypeConstraintError::EmptyString(field))
    } else {
        Ok(trimmed)
    }
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId($field))
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

macro_rules! non_empty_string_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed, non-empty value.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                trim_and_require_non_empty(value, $field).map(Self)
            }

            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }
    };
}

macro_rules! url_string_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed URL and validates its format.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let trimmed = trim_and_require_non_empty(value, $field)?;
                if !trimmed.as_str().validate_url() {
                    return Err(TypeConstraintError::InvalidUrl($field));
                }
                Ok(Self(trimmed))
            }

            /// Borrow the URL as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

macro_rules! non_negative_i32_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Constructs a value that must be zero or greater.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value >= 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NegativeNumber($field))
                }
            }

            /// Returns the raw `i32` value.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl PartialEq<i32> for $name {
            fn eq(&self, other: &i32) -> bool {
                self.0 == *other
            }
        }
    };
}

/// Enumerations persisted as fixed string tokens.
macro_rules! token_enum {
    ($name:ident, $doc:expr, $field:expr, { $($variant:ident => $token:literal),+ $(,)? }) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
        #[serde(try_from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            /// String representation used in persistence.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $token,)+
                }
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                match value.trim() {
                    $($token => Ok(Self::$variant),)+
                    other => Err(TypeConstraintError::InvalidValue(format!(
                        "{}: {other}",
                        $field
                    ))),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::try_from(value.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }
    };
}

id_newtype!(ProductId, "Unique identifier for a product.", "product_id");
id_newtype!(
    AttachmentId,
    "Unique identifier for a media attachment.",
    "attachment_id"
);
id_newtype!(
    CategoryId,
    "Identifier of the category synced products are filed under.",
    "category_id"
);

non_empty_string_newtype!(
    ProductSku,
    "Product SKU enforcing non-empty values.",
    "product sku"
);
non_empty_string_newtype!(
    ProductName,
    "Product name enforcing non-empty values.",
    "product name"
);
non_empty_string_newtype!(
    AttachmentTitle,
    "Attachment title enforcing non-empty values.",
    "attachment title"
);
non_empty_string_newtype!(MimeType, "Media type of a stored file.", "mime type");

url_string_newtype!(CatalogUrl, "Remote catalog endpoint.", "catalog url");
url_string_newtype!(ImageUrl, "Remote product image URL.", "image url");

non_negative_i32_newtype!(
    StockQuantity,
    "Number of units in stock.",
    "stock quantity"
);

token_enum!(StockStatus, "Stock availability of a product.", "stock status", {
    InStock => "instock",
    OutOfStock => "outofstock",
});

token_enum!(
    PublicationStatus,
    "Publication state of a product.",
    "publication status",
    {
        Publish => "publish",
        Draft => "draft",
    }
);

token_enum!(
    CatalogVisibility,
    "Whether a product is listed in the storefront catalog.",
    "catalog visibility",
    {
        Visible => "visible",
        Hidden => "hidden",
    }
);

/// Regular price rendered with exactly two decimal places, e.g. `"12.50"`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct RegularPrice(String);

impl RegularPrice {
    /// Parses a price such as `"$12.5"`.
    ///
    /// Every `$` is dropped, the remainder is parsed as a decimal, rounded half
    /// away from zero and rendered with two decimals and no grouping.
    pub fn parse(raw: &str) -> Result<Self, TypeConstraintError> {
        let stripped = raw.replace('$', "");
        let stripped = stripped.trim();
        if stripped.is_empty() {
            return Err(TypeConstraintError::EmptyString("price"));
        }

        let value = Decimal::from_str(stripped)
            .map_err(|_| TypeConstraintError::InvalidValue(format!("price: {raw}")))?;
        if value < Decimal::ZERO {
            return Err(TypeConstraintError::NegativeNumber("price"));
        }

        let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(2);
        Ok(Self(rounded.to_string()))
    }

    /// Borrow the normalised price.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the owned string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RegularPrice {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl PartialEq<&str> for RegularPrice {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_skus() {
        let value = ProductSku::new("  SKU-1  ").unwrap();
        assert_eq!(value.as_str(), "SKU-1");
    }

    #[test]
    fn rejects_empty_skus() {
        assert_eq!(
            ProductSku::new("   ").unwrap_err(),
            TypeConstraintError::EmptyString("product sku")
        );
    }

    #[test]
    fn rejects_non_positive_ids() {
        let err = ProductId::new(0).unwrap_err();
        assert_eq!(err, TypeConstraintError::NonPositiveId("product_id"));
    }

    #[test]
    fn validates_urls() {
        assert!(ImageUrl::new("https://loremflickr.com/640/480/food").is_ok());
        let err = ImageUrl::new("not-a-url").unwrap_err();
        assert_eq!(err, TypeConstraintError::InvalidUrl("image url"));
    }

    #[test]
    fn normalises_prices_to_two_decimals() {
        assert_eq!(RegularPrice::parse("$12.5").unwrap(), "12.50");
        assert_eq!(RegularPrice::parse("9").unwrap(), "9.00");
        assert_eq!(RegularPrice::parse(" $1234.567 ").unwrap(), "1234.57");
        assert_eq!(RegularPrice::parse("0.005").unwrap(), "0.01");
    }

    #[test]
    fn rejects_unparseable_prices() {
        assert_eq!(
            RegularPrice::parse("$").unwrap_err(),
            TypeConstraintError::EmptyString("price")
        );
        assert!(matches!(
            RegularPrice::parse("ten dollars"),
            Err(TypeConstraintError::InvalidValue(_))
        ));
        assert_eq!(
            RegularPrice::parse("-$3").unwrap_err(),
            TypeConstraintError::NegativeNumber("price")
        );
    }

    #[test]
    fn stock_quantity_rejects_negative_numbers() {
        assert_eq!(
            StockQuantity::new(-1).unwrap_err(),
            TypeConstraintError::NegativeNumber("stock quantity")
        );
    }

    #[test]
    fn token_enums_round_trip_through_persistence_strings() {
        assert_eq!(StockStatus::InStock.as_str(), "instock");
        assert_eq!(
            PublicationStatus::try_from("publish").unwrap(),
            PublicationStatus::Publish
        );
        assert!(CatalogVisibility::try_from("search").is_err());
    }
}
