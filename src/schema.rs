use bson::{Document, doc};
use serde::{Deserialize, Serialize};

use crate::errors::QueryError;

/// Name of the collection every descriptor targets.
pub const COLLECTION: &str = "books";

/// The closed set of fields a book document carries. Criteria, projections,
/// sorts and index keys are all spelled in terms of this enum, so a
/// descriptor can never name a field the collection does not have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Title,
    Author,
    Genre,
    PublishedYear,
    Price,
    InStock,
}

impl Field {
    pub const ALL: [Self; 6] =
        [Self::Title, Self::Author, Self::Genre, Self::PublishedYear, Self::Price, Self::InStock];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Genre => "genre",
            Self::PublishedYear => "published_year",
            Self::Price => "price",
            Self::InStock => "in_stock",
        }
    }

    /// Whether ordered comparisons (`$gt`) apply to this field.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::PublishedYear | Self::Price)
    }

    /// # Errors
    /// Returns `UnknownField` when `name` is not a book field.
    pub fn from_name(name: &str) -> Result<Self, QueryError> {
        Self::ALL
            .into_iter()
            .find(|f| f.name() == name)
            .ok_or_else(|| QueryError::UnknownField(name.to_string()))
    }
}

/// A book record as stored in the external collection. No invariants are
/// enforced on this side; validation, if any, belongs to the store's schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub published_year: i32,
    pub price: f64,
    pub in_stock: bool,
}

impl Book {
    /// BSON document form, mainly for building fixtures.
    #[must_use]
    pub fn to_document(&self) -> Document {
        doc! {
            "title": self.title.clone(),
            "author": self.author.clone(),
            "genre": self.genre.clone(),
            "published_year": self.published_year,
            "price": self.price,
            "in_stock": self.in_stock,
        }
    }
}
