//! Store-independent filter structure.
//!
//! A [`Predicate`] is a conjunction of [`Condition`]s, each testing one stored
//! field. An empty predicate matches every record. Translation into the store's
//! query language lives in [`crate::mongodb::translate`].

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};

use super::text::TextPattern;

/// A literal compared against a stored field
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Id(ObjectId),
    Text(String),
    Int(i64),
    Float(f64),
    Date(DateTime<Utc>),
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::Id(id)
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Value::Date(ts)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Test {
    Equals(Value),
    Matches(TextPattern),
    /// Inclusive bounds; at least one is set
    Range {
        lower: Option<Value>,
        upper: Option<Value>,
    },
    /// Calendar month (1-12) of a date field, in any year
    MonthOf(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: &'static str,
    pub test: Test,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    conditions: Vec<Condition>,
}

impl Predicate {
    /// Matches every record
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &'static str, test: Test) -> Self {
        self.conditions.push(Condition { field, test });
        self
    }

    pub fn eq(self, field: &'static str, value: impl Into<Value>) -> Self {
        self.with(field, Test::Equals(value.into()))
    }

    /// Shorthand for an exact id match on `_id`
    pub fn by_id(id: ObjectId) -> Self {
        Self::all().eq("_id", id)
    }

    /// Adds a text condition when a pattern is present
    pub fn matching(self, field: &'static str, pattern: Option<TextPattern>) -> Self {
        match pattern {
            Some(pattern) => self.with(field, Test::Matches(pattern)),
            None => self,
        }
    }

    /// Adds a range condition when at least one bound is present
    pub fn between<V: Into<Value>>(
        self,
        field: &'static str,
        lower: Option<V>,
        upper: Option<V>,
    ) -> Self {
        if lower.is_none() && upper.is_none() {
            return self;
        }
        self.with(
            field,
            Test::Range {
                lower: lower.map(Into::into),
                upper: upper.map(Into::into),
            },
        )
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn condition(&self, field: &str) -> Option<&Test> {
        self.conditions
            .iter()
            .find(|c| c.field == field)
            .map(|c| &c.test)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_empty() {
        assert!(Predicate::all().is_empty());
    }

    #[test]
    fn test_optional_parts_are_skipped() {
        let predicate = Predicate::all()
            .matching("name", None)
            .between::<i64>("quantity", None, None);
        assert!(predicate.is_empty());
    }

    #[test]
    fn test_conditions_accumulate_in_order() {
        let id = ObjectId::new();
        let predicate = Predicate::all()
            .eq("supplier_id", id)
            .matching("name", TextPattern::parse("dip"))
            .between("price", Some(1.5), None);

        let fields: Vec<_> = predicate.conditions().iter().map(|c| c.field).collect();
        assert_eq!(fields, vec!["supplier_id", "name", "price"]);
        assert_eq!(
            predicate.condition("supplier_id"),
            Some(&Test::Equals(Value::Id(id)))
        );
        assert_eq!(
            predicate.condition("price"),
            Some(&Test::Range {
                lower: Some(Value::Float(1.5)),
                upper: None
            })
        );
    }

    #[test]
    fn test_by_id() {
        let id = ObjectId::new();
        assert_eq!(
            Predicate::by_id(id).condition("_id"),
            Some(&Test::Equals(Value::Id(id)))
        );
    }
}
