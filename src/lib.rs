pub mod errors;
pub mod logger;
pub mod query;
pub mod schema;

use bson::Document;

use crate::errors::QueryError;
use crate::query::{Criteria, FindOptions, Order};
use crate::schema::Field;

/// Facade binding descriptors to the `books` collection.
///
/// Every method builds one immutable descriptor and renders it as the driver
/// command document for that operation. Nothing is executed, cached, or
/// retained here; results and failure semantics belong to the external store.
pub struct Books {
    collection: String,
}

impl Books {
    #[must_use]
    pub fn new() -> Self {
        Self { collection: schema::COLLECTION.to_string() }
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// # Errors
    /// Propagates criteria validation from [`query::find_by`].
    pub fn find_by(
        &self,
        criteria: Criteria,
        options: FindOptions,
    ) -> Result<Document, QueryError> {
        Ok(query::command_doc(&query::find_by(criteria, options)?, &self.collection))
    }

    #[must_use]
    pub fn update_one_price(&self, title: &str, new_price: f64) -> Document {
        query::command_doc(&query::update_one_price(title, new_price), &self.collection)
    }

    #[must_use]
    pub fn delete_one_by_title(&self, title: &str) -> Document {
        query::command_doc(&query::delete_one_by_title(title), &self.collection)
    }

    #[must_use]
    pub fn average_price_by_genre(&self) -> Document {
        query::command_doc(&query::average_price_by_genre(), &self.collection)
    }

    #[must_use]
    pub fn top_author_by_book_count(&self) -> Document {
        query::command_doc(&query::top_author_by_book_count(), &self.collection)
    }

    #[must_use]
    pub fn count_by_decade(&self) -> Document {
        query::command_doc(&query::count_by_decade(), &self.collection)
    }

    /// # Errors
    /// Returns an error when `keys` is empty.
    pub fn ensure_index(&self, keys: &[(Field, Order)]) -> Result<Document, QueryError> {
        Ok(query::command_doc(&query::ensure_index(keys)?, &self.collection))
    }

    /// # Errors
    /// Propagates criteria validation from [`query::explain_find`].
    pub fn explain_find(&self, criteria: Criteria) -> Result<Document, QueryError> {
        Ok(query::command_doc(&query::explain_find(criteria)?, &self.collection))
    }
}

impl Default for Books {
    fn default() -> Self {
        Self::new()
    }
}

/// Initializes the logging system.
///
/// Optional; descriptors build fine without it, but guard-limit warnings go
/// nowhere until a logger is installed.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    logger::init()?;
    Ok(())
}
