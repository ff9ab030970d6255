use std::cmp::Ordering;

use bson::{Bson, Document};

use crate::schema::Field;

use super::types::{Accumulator, CmpOp, Criteria, Expr, FindOptions, Order, SortSpec, Stage};

/// Whether a fixture document satisfies the criteria. Empty criteria match
/// everything; a missing field never matches. Numeric equality is
/// cross-type, like the store's: `Int32(10)` equals `Double(10.0)`.
#[must_use]
pub fn matches(doc: &Document, criteria: &Criteria) -> bool {
    criteria.conditions().iter().all(|c| {
        doc.get(c.field.name()).is_some_and(|v| match c.op {
            CmpOp::Eq => bson_eq(v, &c.value),
            CmpOp::Gt => compare_bson(v, &c.value) == Ordering::Greater,
        })
    })
}

fn bson_eq(a: &Bson, b: &Bson) -> bool {
    if as_f64(a).is_some() && as_f64(b).is_some() {
        return compare_bson(a, b) == Ordering::Equal;
    }
    a == b
}

/// Applies a find descriptor to in-memory documents: filter, sort,
/// projection, skip and limit. Dry-run support for fixtures; real execution
/// belongs to the store.
#[must_use]
pub fn run_find(docs: &[Document], criteria: &Criteria, opts: &FindOptions) -> Vec<Document> {
    let mut out: Vec<Document> = docs.iter().filter(|d| matches(d, criteria)).cloned().collect();
    if let Some(sort) = &opts.sort {
        out.sort_by(|a, b| compare_docs(a, b, sort));
    }
    if let Some(fields) = &opts.projection {
        for d in &mut out {
            *d = project(d, fields);
        }
    }
    // No limit means no truncation; the guard clamp belongs to `find_by`.
    let skip = usize::try_from(opts.skip.unwrap_or(0)).unwrap_or(usize::MAX);
    let limit = opts.limit.map_or(usize::MAX, |l| l as usize);
    if skip >= out.len() {
        return Vec::new();
    }
    let end = skip.saturating_add(limit).min(out.len());
    out[skip..end].to_vec()
}

/// Runs an assembled pipeline over in-memory documents. Groups keep
/// first-seen key order, which makes tie-breaks deterministic in tests
/// without promising any particular store behavior.
#[must_use]
pub fn run_pipeline(docs: &[Document], stages: &[Stage]) -> Vec<Document> {
    let mut rows: Vec<Document> = docs.to_vec();
    for stage in stages {
        match stage {
            Stage::AddFields { name, expr } => {
                for d in &mut rows {
                    if let Some(v) = eval_expr(d, *expr) {
                        d.insert(name.as_str(), v);
                    }
                }
            }
            Stage::Group { key, accumulators } => {
                rows = group_rows(&rows, key, accumulators);
            }
            Stage::Sort { key, order } => {
                rows.sort_by(|a, b| {
                    let ord = match (a.get(key), b.get(key)) {
                        (Some(x), Some(y)) => compare_bson(x, y),
                        (Some(_), None) => Ordering::Greater,
                        (None, Some(_)) => Ordering::Less,
                        (None, None) => Ordering::Equal,
                    };
                    if matches!(order, Order::Asc) { ord } else { ord.reverse() }
                });
            }
            Stage::Limit(n) => rows.truncate(*n as usize),
        }
    }
    rows
}

fn eval_expr(doc: &Document, expr: Expr) -> Option<Bson> {
    match expr {
        Expr::DecadeOf(f) => {
            let year = match doc.get(f.name())? {
                Bson::Int32(i) => i64::from(*i),
                Bson::Int64(i) => *i,
                _ => return None,
            };
            Some(Bson::Int64(year - year % 10))
        }
    }
}

fn group_rows(rows: &[Document], key: &str, accumulators: &[(String, Accumulator)]) -> Vec<Document> {
    let mut keys: Vec<Bson> = Vec::new();
    let mut buckets: Vec<Vec<&Document>> = Vec::new();
    for d in rows {
        let k = d.get(key).cloned().unwrap_or(Bson::Null);
        match keys.iter().position(|existing| existing == &k) {
            Some(i) => buckets[i].push(d),
            None => {
                keys.push(k);
                buckets.push(vec![d]);
            }
        }
    }
    keys.into_iter()
        .zip(buckets)
        .map(|(k, bucket)| {
            let mut out = Document::new();
            out.insert("_id", k);
            for (name, acc) in accumulators {
                out.insert(name.as_str(), accumulate(&bucket, *acc));
            }
            out
        })
        .collect()
}

fn accumulate(bucket: &[&Document], acc: Accumulator) -> Bson {
    match acc {
        Accumulator::CountAll => Bson::Int64(i64::try_from(bucket.len()).unwrap_or(i64::MAX)),
        Accumulator::Avg(f) => {
            let nums: Vec<f64> =
                bucket.iter().filter_map(|d| d.get(f.name()).and_then(as_f64)).collect();
            if nums.is_empty() {
                // `$avg` over no numeric values is null
                Bson::Null
            } else {
                #[allow(clippy::cast_precision_loss)]
                Bson::Double(nums.iter().sum::<f64>() / nums.len() as f64)
            }
        }
    }
}

pub(crate) fn compare_docs(a: &Document, b: &Document, sort: &[SortSpec]) -> Ordering {
    for s in sort {
        let ord = match (a.get(s.field.name()), b.get(s.field.name())) {
            (Some(x), Some(y)) => compare_bson(x, y),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return if matches!(s.order, Order::Asc) { ord } else { ord.reverse() };
        }
    }
    Ordering::Equal
}

pub(crate) fn compare_bson(a: &Bson, b: &Bson) -> Ordering {
    if let (Some(x), Some(y)) = (as_f64(a), as_f64(b)) {
        return x.total_cmp(&y);
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => x.cmp(y),
        (Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn as_f64(v: &Bson) -> Option<f64> {
    #[allow(clippy::cast_precision_loss)]
    match v {
        Bson::Int32(i) => Some(f64::from(*i)),
        Bson::Int64(i) => Some(*i as f64),
        Bson::Double(f) => Some(*f),
        _ => None,
    }
}

fn type_rank(v: &Bson) -> u8 {
    match v {
        Bson::Null => 0,
        Bson::Boolean(_) => 1,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) => 2,
        Bson::String(_) => 3,
        Bson::Array(_) => 4,
        Bson::Document(_) => 5,
        _ => u8::MAX,
    }
}

fn project(doc: &Document, fields: &[Field]) -> Document {
    let mut out = Document::new();
    for f in fields {
        if let Some(v) = doc.get(f.name()) {
            out.insert(f.name(), v.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn empty_criteria_match_everything() {
        assert!(matches(&doc! { "title": "Dune" }, &Criteria::new()));
    }

    #[test]
    fn gt_compares_across_numeric_types() {
        let c = Criteria::new().gt(Field::Price, 10);
        assert!(matches(&doc! { "price": 10.5 }, &c));
        assert!(!matches(&doc! { "price": 10 }, &c));
    }

    #[test]
    fn eq_matches_across_numeric_types() {
        let c = Criteria::new().eq(Field::Price, 10);
        assert!(matches(&doc! { "price": 10.0 }, &c));
        assert!(!matches(&doc! { "price": 10.5 }, &c));
        // stored Int32 year vs Int64 criterion
        let c = Criteria::new().eq(Field::PublishedYear, Bson::Int64(1995));
        assert!(matches(&doc! { "published_year": 1995_i32 }, &c));
    }

    #[test]
    fn eq_stays_strict_for_non_numeric_values() {
        let c = Criteria::new().eq(Field::Title, "10");
        assert!(!matches(&doc! { "title": 10 }, &c));
        assert!(matches(&doc! { "title": "10" }, &c));
    }

    #[test]
    fn run_find_without_limit_returns_all_matches() {
        let docs: Vec<Document> = (0..super::super::types::MAX_LIMIT + 5)
            .map(|i| doc! { "published_year": i64::from(i) })
            .collect();
        let out = run_find(&docs, &Criteria::new(), &FindOptions::default());
        assert_eq!(out.len(), docs.len());
    }

    #[test]
    fn missing_field_never_matches() {
        let c = Criteria::new().eq(Field::Genre, "Fantasy");
        assert!(!matches(&doc! { "title": "Dune" }, &c));
    }

    #[test]
    fn projection_drops_unlisted_fields() {
        let docs = [doc! { "title": "Dune", "price": 9.99, "_id": 7 }];
        let opts =
            FindOptions { projection: Some(vec![Field::Title]), ..Default::default() };
        let out = run_find(&docs, &Criteria::new(), &opts);
        assert_eq!(out, vec![doc! { "title": "Dune" }]);
    }

    #[test]
    fn group_avg_is_null_without_numeric_values() {
        let rows = [doc! { "genre": "Fantasy", "price": "n/a" }];
        let grouped = group_rows(
            &rows,
            "genre",
            &[("averagePrice".to_string(), Accumulator::Avg(Field::Price))],
        );
        assert_eq!(grouped, vec![doc! { "_id": "Fantasy", "averagePrice": Bson::Null }]);
    }
}
