use bson::Bson;

use crate::errors::QueryError;
use crate::schema::Field;

use super::types::{
    Accumulator, CmpOp, Criteria, Expr, FindOptions, IndexKeys, MAX_LIMIT, MAX_PROJECTION_FIELDS,
    MAX_SORT_FIELDS, Order, Query, Stage,
};

/// Builds a filter descriptor. Oversized sort/projection lists are truncated
/// with a warning; `limit` is clamped to the guard maximum.
///
/// # Errors
/// Returns `InvalidComparison` when a greater-than condition targets a
/// non-numeric field.
pub fn find_by(criteria: Criteria, mut options: FindOptions) -> Result<Query, QueryError> {
    validate_criteria(&criteria)?;
    if let Some(sort) = &mut options.sort
        && sort.len() > MAX_SORT_FIELDS
    {
        log::warn!("sort spec too long: {}", sort.len());
        sort.truncate(MAX_SORT_FIELDS);
    }
    if let Some(proj) = &mut options.projection
        && proj.len() > MAX_PROJECTION_FIELDS
    {
        log::warn!("projection too long: {}", proj.len());
        proj.truncate(MAX_PROJECTION_FIELDS);
    }
    if let Some(limit) = options.limit {
        options.limit = Some(limit.min(MAX_LIMIT));
    }
    Ok(Query::Find { criteria, options })
}

/// Update descriptor setting `price` on the document matching `title`.
/// Zero-match and multi-match behavior is the store's; the command pins
/// single-document semantics.
#[must_use]
pub fn update_one_price(title: &str, new_price: f64) -> Query {
    Query::UpdateOne {
        criteria: Criteria::new().eq(Field::Title, title),
        set: vec![(Field::Price, Bson::Double(new_price))],
    }
}

/// Delete descriptor matching one document by `title`. Same delegation note
/// as `update_one_price`.
#[must_use]
pub fn delete_one_by_title(title: &str) -> Query {
    Query::DeleteOne { criteria: Criteria::new().eq(Field::Title, title) }
}

/// Groups by `genre` and computes the arithmetic mean of `price` per group
/// as `averagePrice`.
#[must_use]
pub fn average_price_by_genre() -> Query {
    Query::Aggregate {
        pipeline: vec![Stage::Group {
            key: Field::Genre.name().to_string(),
            accumulators: vec![("averagePrice".to_string(), Accumulator::Avg(Field::Price))],
        }],
    }
}

/// Groups by `author`, counts documents per group, keeps the largest group.
/// Tie-break among equal counts is implementation-defined by the store.
#[must_use]
pub fn top_author_by_book_count() -> Query {
    Query::Aggregate {
        pipeline: vec![
            Stage::Group {
                key: Field::Author.name().to_string(),
                accumulators: vec![("bookCount".to_string(), Accumulator::CountAll)],
            },
            Stage::Sort { key: "bookCount".to_string(), order: Order::Desc },
            Stage::Limit(1),
        ],
    }
}

/// Buckets documents by publication decade (`published_year` minus
/// `published_year mod 10`), counts per bucket, sorted ascending by decade.
#[must_use]
pub fn count_by_decade() -> Query {
    Query::Aggregate {
        pipeline: vec![
            Stage::AddFields {
                name: "decade".to_string(),
                expr: Expr::DecadeOf(Field::PublishedYear),
            },
            Stage::Group {
                key: "decade".to_string(),
                accumulators: vec![("bookCount".to_string(), Accumulator::CountAll)],
            },
            Stage::Sort { key: "_id".to_string(), order: Order::Asc },
        ],
    }
}

/// Index-creation descriptor over one or more keys.
///
/// # Errors
/// Returns `EmptyIndexKeys` when `keys` is empty.
pub fn ensure_index(keys: &[(Field, Order)]) -> Result<Query, QueryError> {
    if keys.is_empty() {
        return Err(QueryError::EmptyIndexKeys);
    }
    Ok(Query::CreateIndex { keys: IndexKeys(keys.to_vec()) })
}

/// Requests the store's query-plan and execution-statistics report for a
/// find over `criteria` instead of the matching documents.
///
/// # Errors
/// Same criteria validation as `find_by`.
pub fn explain_find(criteria: Criteria) -> Result<Query, QueryError> {
    validate_criteria(&criteria)?;
    Ok(Query::Explain { criteria })
}

fn validate_criteria(criteria: &Criteria) -> Result<(), QueryError> {
    for c in criteria.conditions() {
        if matches!(c.op, CmpOp::Gt) && !c.field.is_numeric() {
            return Err(QueryError::InvalidComparison(format!(
                "$gt not supported on {}",
                c.field.name()
            )));
        }
    }
    Ok(())
}
