//! Composable aggregation stages.
//!
//! Reports are declared as a [`Pipeline`] of [`Stage`]s (join, filter, group,
//! shape). The store decides how to execute them; the field names flowing in
//! and out of each stage are the contract.

use crate::query::Predicate;
use crate::repository::EntityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: &'static str,
    pub order: SortOrder,
}

impl SortKey {
    pub fn asc(field: &'static str) -> Self {
        Self {
            field,
            order: SortOrder::Ascending,
        }
    }

    pub fn desc(field: &'static str) -> Self {
        Self {
            field,
            order: SortOrder::Descending,
        }
    }
}

/// A value computed from the current record
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Value at a (dotted) field path
    Field(&'static str),
    /// Field value rendered as a string; used for every id in report output
    ToString(&'static str),
    /// The whole current record
    Root,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Accumulator {
    Sum(Expr),
    Avg(Expr),
    /// Number of records in the group
    Count,
    /// Value from the first record of the group, in input order
    First(Expr),
    /// One sub-record per group member, built from the named expressions
    Push(Vec<(&'static str, Expr)>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(Predicate),
    /// Join records of `from` whose `foreign_field` equals `local_field`;
    /// matches land in the array `as_field`
    Lookup {
        from: EntityKind,
        local_field: &'static str,
        foreign_field: &'static str,
        as_field: &'static str,
    },
    /// One output record per element of the array at `path`. With
    /// `preserve_empty` records without matches are kept and the field dropped.
    Unwind {
        path: &'static str,
        preserve_empty: bool,
    },
    /// Group by `key`; the key is exposed as `_id` to later stages
    Group {
        key: Expr,
        fields: Vec<(&'static str, Accumulator)>,
    },
    Sort(Vec<SortKey>),
    /// Output exactly the named fields
    Project(Vec<(&'static str, Expr)>),
    Skip(u64),
    Limit(u64),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Skipped when the predicate is empty
    pub fn filter(self, predicate: Predicate) -> Self {
        if predicate.is_empty() {
            self
        } else {
            self.stage(Stage::Match(predicate))
        }
    }

    /// Join `from` on `local_field == _id` and unwind the single match into `as_field`
    pub fn join_one(
        self,
        from: EntityKind,
        local_field: &'static str,
        as_field: &'static str,
        keep_unmatched: bool,
    ) -> Self {
        self.stage(Stage::Lookup {
            from,
            local_field,
            foreign_field: "_id",
            as_field,
        })
        .stage(Stage::Unwind {
            path: as_field,
            preserve_empty: keep_unmatched,
        })
    }

    pub fn group(self, key: Expr, fields: Vec<(&'static str, Accumulator)>) -> Self {
        self.stage(Stage::Group { key, fields })
    }

    pub fn sort(self, keys: Vec<SortKey>) -> Self {
        self.stage(Stage::Sort(keys))
    }

    pub fn project(self, fields: Vec<(&'static str, Expr)>) -> Self {
        self.stage(Stage::Project(fields))
    }

    /// Skip then limit; a zero skip adds no stage
    pub fn window(self, skip: u64, limit: u64) -> Self {
        let with_skip = if skip > 0 {
            self.stage(Stage::Skip(skip))
        } else {
            self
        };
        with_skip.stage(Stage::Limit(limit))
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::TextPattern;

    #[test]
    fn test_empty_filter_adds_no_stage() {
        let pipeline = Pipeline::new().filter(Predicate::all());
        assert!(pipeline.is_empty());

        let pipeline = Pipeline::new()
            .filter(Predicate::all().matching("name", TextPattern::parse("dipi")));
        assert_eq!(pipeline.len(), 1);
    }

    #[test]
    fn test_join_one_is_lookup_then_unwind() {
        let pipeline = Pipeline::new().join_one(EntityKind::Medicine, "medicine_id", "medicine", true);
        assert_eq!(
            pipeline.stages(),
            &[
                Stage::Lookup {
                    from: EntityKind::Medicine,
                    local_field: "medicine_id",
                    foreign_field: "_id",
                    as_field: "medicine",
                },
                Stage::Unwind {
                    path: "medicine",
                    preserve_empty: true,
                },
            ]
        );
    }

    #[test]
    fn test_window_omits_zero_skip() {
        assert_eq!(Pipeline::new().window(0, 10).stages(), &[Stage::Limit(10)]);
        assert_eq!(
            Pipeline::new().window(20, 10).stages(),
            &[Stage::Skip(20), Stage::Limit(10)]
        );
    }
}
