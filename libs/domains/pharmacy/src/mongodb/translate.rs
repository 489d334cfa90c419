//! Predicates and pipeline stages rendered as MongoDB query documents.

use bson::{doc, Bson, Document};

use crate::pipeline::{Accumulator, Expr, Pipeline, SortKey, SortOrder, Stage};
use crate::query::{Predicate, Test, Value};

pub fn filter(predicate: &Predicate) -> Document {
    let mut filter = Document::new();
    // Second and later conditions on a field, plus `$expr` tests
    let mut extra: Vec<Document> = Vec::new();

    for condition in predicate.conditions() {
        let field = condition.field;
        match &condition.test {
            Test::MonthOf(month) => extra.push(doc! {
                "$expr": { "$eq": [{ "$month": path(field) }, *month as i32] }
            }),
            test => {
                let rendered = test_to_bson(test);
                if filter.contains_key(field) {
                    extra.push(doc! { field: rendered });
                } else {
                    filter.insert(field, rendered);
                }
            }
        }
    }

    if !extra.is_empty() {
        filter.insert("$and", extra);
    }
    filter
}

pub fn sort(keys: &[SortKey]) -> Document {
    keys.iter()
        .map(|key| {
            let direction = match key.order {
                SortOrder::Ascending => 1,
                SortOrder::Descending => -1,
            };
            (key.field.to_string(), Bson::Int32(direction))
        })
        .collect()
}

pub fn pipeline(pipeline: &Pipeline) -> Vec<Document> {
    pipeline.stages().iter().map(stage).collect()
}

fn stage(stage: &Stage) -> Document {
    match stage {
        Stage::Match(predicate) => doc! { "$match": filter(predicate) },
        Stage::Lookup {
            from,
            local_field,
            foreign_field,
            as_field,
        } => doc! {
            "$lookup": {
                "from": from.collection(),
                "localField": *local_field,
                "foreignField": *foreign_field,
                "as": *as_field,
            }
        },
        Stage::Unwind {
            path: field,
            preserve_empty,
        } => doc! {
            "$unwind": {
                "path": path(field),
                "preserveNullAndEmptyArrays": *preserve_empty,
            }
        },
        Stage::Group { key, fields } => {
            let mut group = doc! { "_id": expr(key) };
            for (name, accumulator) in fields {
                group.insert(*name, accumulate(accumulator));
            }
            doc! { "$group": group }
        }
        Stage::Sort(keys) => doc! { "$sort": sort(keys) },
        Stage::Project(fields) => {
            let mut projection = doc! { "_id": 0 };
            for (name, value) in fields {
                projection.insert(*name, expr(value));
            }
            doc! { "$project": projection }
        }
        Stage::Skip(n) => doc! { "$skip": clamp_i64(*n) },
        Stage::Limit(n) => doc! { "$limit": clamp_i64(*n) },
    }
}

fn accumulate(accumulator: &Accumulator) -> Document {
    match accumulator {
        Accumulator::Sum(value) => doc! { "$sum": expr(value) },
        Accumulator::Avg(value) => doc! { "$avg": expr(value) },
        Accumulator::Count => doc! { "$sum": 1 },
        Accumulator::First(value) => doc! { "$first": expr(value) },
        Accumulator::Push(fields) => {
            let item: Document = fields
                .iter()
                .map(|(name, value)| (name.to_string(), expr(value)))
                .collect();
            doc! { "$push": item }
        }
    }
}

fn expr(expr: &Expr) -> Bson {
    match expr {
        Expr::Field(field) => Bson::String(path(field)),
        Expr::ToString(field) => Bson::Document(doc! { "$toString": path(field) }),
        Expr::Root => Bson::String("$$ROOT".to_string()),
    }
}

fn test_to_bson(test: &Test) -> Bson {
    match test {
        Test::Equals(value) => value_to_bson(value),
        Test::Matches(pattern) => Bson::Document(doc! {
            "$regex": pattern.to_regex(),
            "$options": "i",
        }),
        Test::Range { lower, upper } => {
            let mut range = Document::new();
            if let Some(lower) = lower {
                range.insert("$gte", value_to_bson(lower));
            }
            if let Some(upper) = upper {
                range.insert("$lte", value_to_bson(upper));
            }
            Bson::Document(range)
        }
        // Rendered through `$expr` by `filter`.
        Test::MonthOf(month) => Bson::Int32(*month as i32),
    }
}

fn value_to_bson(value: &Value) -> Bson {
    match value {
        Value::Id(id) => Bson::ObjectId(*id),
        Value::Text(text) => Bson::String(text.clone()),
        Value::Int(n) => Bson::Int64(*n),
        Value::Float(n) => Bson::Double(*n),
        Value::Date(ts) => Bson::DateTime(bson::DateTime::from_chrono(*ts)),
    }
}

pub(crate) fn clamp_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn path(field: &str) -> String {
    format!("${}", field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::TextPattern;
    use crate::repository::EntityKind;
    use bson::oid::ObjectId;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_empty_predicate_is_empty_filter() {
        assert_eq!(filter(&Predicate::all()), doc! {});
    }

    #[test]
    fn test_text_conditions_are_escaped_and_case_insensitive() {
        let predicate =
            Predicate::all().matching("name", TextPattern::parse("^vit. c"));
        assert_eq!(
            filter(&predicate),
            doc! { "name": { "$regex": "^vit\\. c", "$options": "i" } }
        );
    }

    #[test]
    fn test_equality_and_range() {
        let supplier = ObjectId::new();
        let predicate = Predicate::all()
            .eq("supplier_id", supplier)
            .between("price", Some(5.0), Some(20.0));
        assert_eq!(
            filter(&predicate),
            doc! {
                "supplier_id": supplier,
                "price": { "$gte": 5.0, "$lte": 20.0 },
            }
        );
    }

    #[test]
    fn test_date_bounds_render_as_bson_dates() {
        let from = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let predicate = Predicate::all().between("created_at", Some(from), None);
        assert_eq!(
            filter(&predicate),
            doc! { "created_at": { "$gte": bson::DateTime::from_chrono(from) } }
        );
    }

    #[test]
    fn test_repeated_field_and_month_go_to_and() {
        let from = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let predicate = Predicate::all()
            .between("expiry_date", Some(from), None)
            .with("expiry_date", Test::MonthOf(7))
            .between("expiry_date", None, Some(from));

        assert_eq!(
            filter(&predicate),
            doc! {
                "expiry_date": { "$gte": bson::DateTime::from_chrono(from) },
                "$and": [
                    { "$expr": { "$eq": [{ "$month": "$expiry_date" }, 7] } },
                    { "expiry_date": { "$lte": bson::DateTime::from_chrono(from) } },
                ],
            }
        );
    }

    #[test]
    fn test_sort_keeps_key_order() {
        let rendered = sort(&[SortKey::desc("price"), SortKey::asc("_id")]);
        let keys: Vec<&String> = rendered.keys().collect();
        assert_eq!(keys, ["price", "_id"]);
        assert_eq!(rendered.get_i32("price").unwrap(), -1);
    }

    #[test]
    fn test_stages() {
        let pipeline = Pipeline::new()
            .join_one(EntityKind::Supplier, "_id", "supplier", false)
            .group(
                Expr::Field("supplier_id"),
                vec![
                    ("medicine_count", Accumulator::Count),
                    ("cheapest", Accumulator::First(Expr::Root)),
                    (
                        "lots",
                        Accumulator::Push(vec![("lot_id", Expr::ToString("_id"))]),
                    ),
                ],
            )
            .project(vec![("supplier_id", Expr::ToString("_id"))])
            .window(10, 5);

        assert_eq!(
            super::pipeline(&pipeline),
            vec![
                doc! { "$lookup": {
                    "from": "fornecedores",
                    "localField": "_id",
                    "foreignField": "_id",
                    "as": "supplier",
                } },
                doc! { "$unwind": { "path": "$supplier", "preserveNullAndEmptyArrays": false } },
                doc! { "$group": {
                    "_id": "$supplier_id",
                    "medicine_count": { "$sum": 1 },
                    "cheapest": { "$first": "$$ROOT" },
                    "lots": { "$push": { "lot_id": { "$toString": "$_id" } } },
                } },
                doc! { "$project": { "_id": 0, "supplier_id": { "$toString": "$_id" } } },
                doc! { "$skip": 10_i64 },
                doc! { "$limit": 5_i64 },
            ]
        );
    }
}
