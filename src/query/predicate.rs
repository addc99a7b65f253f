use serde_json::{Map, Value};

/// Storage-independent filter expression. Each store translates this to its
/// native query form; nothing else in the crate builds query text directly.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every row.
    True,
    /// Field equals value. A null value matches rows where the field is
    /// absent or null.
    Eq(String, Value),
    /// Case-insensitive substring match on a string field.
    ILike(String, String),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Predicate::Eq(field.into(), value)
    }

    pub fn ilike(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Predicate::ILike(field.into(), needle.into())
    }

    /// AND-combination that folds away trivial shapes.
    pub fn and(parts: Vec<Predicate>) -> Self {
        let mut parts: Vec<Predicate> = parts
            .into_iter()
            .filter(|p| !matches!(p, Predicate::True))
            .collect();
        match parts.len() {
            0 => Predicate::True,
            1 => parts.remove(0),
            _ => Predicate::And(parts),
        }
    }

    pub fn or(mut parts: Vec<Predicate>) -> Self {
        match parts.len() {
            0 => Predicate::True,
            1 => parts.remove(0),
            _ => Predicate::Or(parts),
        }
    }

    /// Evaluate against an in-memory record.
    pub fn matches(&self, record: &Map<String, Value>) -> bool {
        match self {
            Predicate::True => true,
            Predicate::Eq(field, value) => match record.get(field) {
                Some(actual) => actual == value,
                None => value.is_null(),
            },
            Predicate::ILike(field, needle) => record
                .get(field)
                .and_then(Value::as_str)
                .map(|s| s.to_lowercase().contains(&needle.to_lowercase()))
                .unwrap_or(false),
            Predicate::And(parts) => parts.iter().all(|p| p.matches(record)),
            Predicate::Or(parts) => parts.iter().any(|p| p.matches(record)),
        }
    }
}
