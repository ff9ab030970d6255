use bson::{Bson, Document, doc};

use crate::schema::Field;

use super::types::{Accumulator, CmpOp, Criteria, Expr, IndexKeys, Query, SortSpec, Stage};

/// Filter document: `{field: value}` for equality, `{field: {"$gt": value}}`
/// for greater-than. Empty criteria encode as `{}`, which the store treats
/// as match-all.
#[must_use]
pub fn criteria_doc(criteria: &Criteria) -> Document {
    let mut out = Document::new();
    for c in criteria.conditions() {
        match c.op {
            CmpOp::Eq => {
                out.insert(c.field.name(), c.value.clone());
            }
            CmpOp::Gt => {
                out.insert(c.field.name(), doc! { "$gt": c.value.clone() });
            }
        }
    }
    out
}

/// Projection document including each field and excluding the store's
/// identifier.
#[must_use]
pub fn projection_doc(fields: &[Field]) -> Document {
    let mut out = Document::new();
    for f in fields {
        out.insert(f.name(), 1);
    }
    out.insert("_id", 0);
    out
}

#[must_use]
pub fn sort_doc(sort: &[SortSpec]) -> Document {
    let mut out = Document::new();
    for s in sort {
        out.insert(s.field.name(), s.order.wire());
    }
    out
}

#[must_use]
pub fn index_key_doc(keys: &IndexKeys) -> Document {
    let mut out = Document::new();
    for (f, o) in keys.keys() {
        out.insert(f.name(), o.wire());
    }
    out
}

fn path(field: Field) -> String {
    format!("${}", field.name())
}

fn expr_doc(expr: Expr) -> Bson {
    match expr {
        Expr::DecadeOf(f) => Bson::Document(doc! {
            "$subtract": [path(f), { "$mod": [path(f), 10] }],
        }),
    }
}

fn accumulator_doc(acc: Accumulator) -> Bson {
    match acc {
        Accumulator::Avg(f) => Bson::Document(doc! { "$avg": path(f) }),
        Accumulator::CountAll => Bson::Document(doc! { "$sum": 1 }),
    }
}

#[must_use]
pub fn stage_doc(stage: &Stage) -> Document {
    match stage {
        Stage::AddFields { name, expr } => {
            let mut body = Document::new();
            body.insert(name.as_str(), expr_doc(*expr));
            doc! { "$addFields": body }
        }
        Stage::Group { key, accumulators } => {
            let mut body = doc! { "_id": format!("${key}") };
            for (name, acc) in accumulators {
                body.insert(name.as_str(), accumulator_doc(*acc));
            }
            doc! { "$group": body }
        }
        Stage::Sort { key, order } => {
            let mut body = Document::new();
            body.insert(key.as_str(), order.wire());
            doc! { "$sort": body }
        }
        Stage::Limit(n) => doc! { "$limit": i64::from(*n) },
    }
}

/// Stage documents in pipeline order.
#[must_use]
pub fn pipeline_docs(stages: &[Stage]) -> Vec<Document> {
    stages.iter().map(stage_doc).collect()
}

/// Renders a descriptor as the driver command for `collection`. This is the
/// boundary contract: the shapes below are exactly what the store's driver
/// accepts.
#[must_use]
pub fn command_doc(query: &Query, collection: &str) -> Document {
    match query {
        Query::Find { criteria, options } => {
            let mut cmd = doc! { "find": collection, "filter": criteria_doc(criteria) };
            if let Some(fields) = &options.projection {
                cmd.insert("projection", projection_doc(fields));
            }
            if let Some(sort) = &options.sort {
                cmd.insert("sort", sort_doc(sort));
            }
            if let Some(limit) = options.limit {
                cmd.insert("limit", i64::from(limit));
            }
            if let Some(skip) = options.skip {
                cmd.insert("skip", i64::try_from(skip).unwrap_or(i64::MAX));
            }
            cmd
        }
        Query::UpdateOne { criteria, set } => {
            let mut set_doc = Document::new();
            for (f, v) in set {
                set_doc.insert(f.name(), v.clone());
            }
            doc! {
                "update": collection,
                "updates": [{
                    "q": criteria_doc(criteria),
                    "u": { "$set": set_doc },
                    "multi": false,
                }],
            }
        }
        Query::DeleteOne { criteria } => doc! {
            "delete": collection,
            "deletes": [{ "q": criteria_doc(criteria), "limit": 1 }],
        },
        Query::Aggregate { pipeline } => doc! {
            "aggregate": collection,
            "pipeline": pipeline_docs(pipeline),
            "cursor": {},
        },
        Query::CreateIndex { keys } => doc! {
            "createIndexes": collection,
            "indexes": [{ "key": index_key_doc(keys), "name": keys.default_name() }],
        },
        Query::Explain { criteria } => doc! {
            "explain": { "find": collection, "filter": criteria_doc(criteria) },
            "verbosity": "executionStats",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::super::types::Order;
    use super::*;

    #[test]
    fn group_stage_shape() {
        let stage = Stage::Group {
            key: "genre".to_string(),
            accumulators: vec![("averagePrice".to_string(), Accumulator::Avg(Field::Price))],
        };
        assert_eq!(
            stage_doc(&stage),
            doc! { "$group": { "_id": "$genre", "averagePrice": { "$avg": "$price" } } }
        );
    }

    #[test]
    fn decade_expression_shape() {
        let stage = Stage::AddFields {
            name: "decade".to_string(),
            expr: Expr::DecadeOf(Field::PublishedYear),
        };
        assert_eq!(
            stage_doc(&stage),
            doc! { "$addFields": { "decade": {
                "$subtract": ["$published_year", { "$mod": ["$published_year", 10] }],
            } } }
        );
    }

    #[test]
    fn sort_doc_uses_wire_directions() {
        let sort = [
            SortSpec { field: Field::Price, order: Order::Desc },
            SortSpec { field: Field::Title, order: Order::Asc },
        ];
        assert_eq!(sort_doc(&sort), doc! { "price": -1, "title": 1 });
    }
}
