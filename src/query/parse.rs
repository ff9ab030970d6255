use std::collections::BTreeMap;

use bson::Bson;
use serde::Deserialize;

use crate::errors::QueryError;
use crate::schema::Field;

use super::types::Criteria;

// Serde-facing shape for shell-style criteria JSON. Variant order matters:
// the bare-value arm would otherwise swallow `$gt` objects.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ConditionSerde {
    Gt {
        #[serde(rename = "$gt")]
        gt: Bson,
    },
    Eq(Bson),
}

/// Parses shell-style criteria JSON such as
/// `{"genre": "Fiction", "published_year": {"$gt": 2010}}`.
///
/// # Errors
/// Returns an error on malformed JSON, unknown field names, or a `$gt`
/// condition whose field or operand is not numeric.
pub fn parse_criteria_json(json: &str) -> Result<Criteria, QueryError> {
    let raw: BTreeMap<String, ConditionSerde> = serde_json::from_str(json)?;
    let mut out = Criteria::new();
    for (name, cond) in raw {
        let field = Field::from_name(&name)?;
        out = match cond {
            ConditionSerde::Gt { gt } => {
                if !field.is_numeric() {
                    return Err(QueryError::InvalidComparison(format!(
                        "$gt not supported on {name}"
                    )));
                }
                if !matches!(gt, Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_)) {
                    return Err(QueryError::InvalidComparison(format!(
                        "$gt on {name} requires a numeric operand"
                    )));
                }
                out.gt(field, gt)
            }
            ConditionSerde::Eq(value) => out.eq(field, value),
        };
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::super::encode::criteria_doc;
    use super::*;
    use bson::doc;

    #[test]
    fn parse_eq_and_gt() {
        let c = parse_criteria_json(r#"{"genre": "Fiction", "published_year": {"$gt": 2010}}"#)
            .unwrap();
        assert_eq!(
            criteria_doc(&c),
            doc! { "genre": "Fiction", "published_year": { "$gt": 2010 } }
        );
    }

    #[test]
    fn parse_rejects_unknown_field() {
        let err = parse_criteria_json(r#"{"publisher": "Tor"}"#).unwrap_err();
        assert!(matches!(err, QueryError::UnknownField(f) if f == "publisher"));
    }

    #[test]
    fn parse_rejects_gt_on_text_field() {
        assert!(parse_criteria_json(r#"{"title": {"$gt": "m"}}"#).is_err());
    }
}
