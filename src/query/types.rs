use bson::Bson;
use serde::{Deserialize, Serialize};

use crate::schema::Field;

// Guard limits for descriptor construction
pub(crate) const MAX_SORT_FIELDS: usize = 8;
pub(crate) const MAX_PROJECTION_FIELDS: usize = 16;
pub(crate) const MAX_LIMIT: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    /// Driver encoding: `1` ascending, `-1` descending.
    #[must_use]
    pub const fn wire(self) -> i32 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: Field,
    pub order: Order,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    Eq,
    Gt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: Field,
    pub op: CmpOp,
    pub value: Bson,
}

/// Match criteria: a mapping from field to one condition. A later condition
/// on the same field replaces the earlier one. Empty criteria match all
/// documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Criteria(pub(crate) Vec<Condition>);

impl Criteria {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn eq(self, field: Field, value: impl Into<Bson>) -> Self {
        self.with(field, CmpOp::Eq, value.into())
    }

    #[must_use]
    pub fn gt(self, field: Field, value: impl Into<Bson>) -> Self {
        self.with(field, CmpOp::Gt, value.into())
    }

    fn with(mut self, field: Field, op: CmpOp, value: Bson) -> Self {
        self.0.retain(|c| c.field != field);
        self.0.push(Condition { field, op, value });
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.0
    }
}

/// Options for `find_by`.
///
/// Semantics:
/// - When `projection` is `Some(fields)`, returned documents contain only
///   those fields; the store's identifier is excluded.
/// - Sorting applies before pagination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindOptions {
    pub projection: Option<Vec<Field>>,
    pub sort: Option<Vec<SortSpec>>,
    pub limit: Option<u32>,
    pub skip: Option<u64>,
}

/// Index keys in declaration order. A one-element list is a single-field
/// index, more elements form a compound index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexKeys(pub(crate) Vec<(Field, Order)>);

impl IndexKeys {
    #[must_use]
    pub fn keys(&self) -> &[(Field, Order)] {
        &self.0
    }

    /// Driver-conventional index name, e.g. `title_1` or
    /// `author_1_published_year_1`.
    #[must_use]
    pub fn default_name(&self) -> String {
        self.0
            .iter()
            .map(|(f, o)| format!("{}_{}", f.name(), o.wire()))
            .collect::<Vec<_>>()
            .join("_")
    }
}

/// Computed expressions usable in `$addFields`. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    /// `field - (field mod 10)` over a year field.
    DecadeOf(Field),
}

/// Group accumulators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Accumulator {
    /// `$avg` over a stored field.
    Avg(Field),
    /// `$sum: 1` per document.
    CountAll,
}

/// One aggregation pipeline stage. This layer assembles the sequence; the
/// store executes it. Group and sort keys are paths, so stages may refer to
/// fields computed earlier in the pipeline (`decade`, `bookCount`, `_id`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stage {
    AddFields { name: String, expr: Expr },
    Group { key: String, accumulators: Vec<(String, Accumulator)> },
    Sort { key: String, order: Order },
    Limit(u32),
}

/// A complete request descriptor, one variant per operation kind.
/// Constructed once, rendered to a driver command once, then discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Query {
    Find { criteria: Criteria, options: FindOptions },
    UpdateOne { criteria: Criteria, set: Vec<(Field, Bson)> },
    DeleteOne { criteria: Criteria },
    Aggregate { pipeline: Vec<Stage> },
    CreateIndex { keys: IndexKeys },
    Explain { criteria: Criteria },
}
