//! Aggregation pipelines behind the reports.
//!
//! Each builder returns the collection to start from and the stages to run
//! there. Joins, grouping and shaping all happen in the store; rows come back
//! in the shape of the matching `models::reports` type.

use crate::pipeline::{Accumulator, Expr, Pipeline, SortKey};
use crate::query::{Predicate, TextPattern};
use crate::repository::EntityKind;

/// Which end of the price range a supplier extreme report picks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceExtreme {
    MostExpensive,
    Cheapest,
}

/// Stock total and lot list per medicine whose name matches `pattern`
pub fn stock_by_medicine_name(pattern: TextPattern) -> (EntityKind, Pipeline) {
    let pipeline = Pipeline::new()
        .join_one(EntityKind::Medicine, "medicine_id", "medicine", false)
        .filter(Predicate::all().matching("medicine.name", Some(pattern)))
        .sort(vec![SortKey::asc("expiry_date")])
        .group(
            Expr::Field("medicine.name"),
            vec![
                ("total_quantity", Accumulator::Sum(Expr::Field("quantity"))),
                (
                    "lots",
                    Accumulator::Push(vec![
                        ("lot_id", Expr::ToString("_id")),
                        ("quantity", Expr::Field("quantity")),
                        ("entry_date", Expr::Field("entry_date")),
                        ("expiry_date", Expr::Field("expiry_date")),
                    ]),
                ),
            ],
        )
        .project(vec![
            ("medicine_name", Expr::Field("_id")),
            ("total_quantity", Expr::Field("total_quantity")),
            ("lots", Expr::Field("lots")),
        ])
        .sort(vec![SortKey::asc("medicine_name")]);

    (EntityKind::StockLot, pipeline)
}

/// Suppliers whose address matches `pattern`, flattened for display
pub fn suppliers_by_address(pattern: TextPattern) -> (EntityKind, Pipeline) {
    let pipeline = Pipeline::new()
        .filter(Predicate::all().matching("address", Some(pattern)))
        .sort(vec![SortKey::asc("name")])
        .project(vec![
            ("id", Expr::ToString("_id")),
            ("name", Expr::Field("name")),
            ("tax_id", Expr::Field("tax_id")),
            ("phone", Expr::Field("phone")),
            ("address", Expr::Field("address")),
        ]);

    (EntityKind::Supplier, pipeline)
}

pub fn medicine_count_per_supplier() -> (EntityKind, Pipeline) {
    let pipeline = Pipeline::new()
        .group(
            Expr::Field("supplier_id"),
            vec![("medicine_count", Accumulator::Count)],
        )
        .join_one(EntityKind::Supplier, "_id", "supplier", false)
        .project(vec![
            ("supplier_id", Expr::ToString("_id")),
            ("supplier_name", Expr::Field("supplier.name")),
            ("medicine_count", Expr::Field("medicine_count")),
        ])
        .sort(vec![SortKey::asc("supplier_name")]);

    (EntityKind::Medicine, pipeline)
}

pub fn average_price_per_supplier() -> (EntityKind, Pipeline) {
    let pipeline = Pipeline::new()
        .group(
            Expr::Field("supplier_id"),
            vec![("average_price", Accumulator::Avg(Expr::Field("price")))],
        )
        .join_one(EntityKind::Supplier, "_id", "supplier", false)
        .project(vec![
            ("supplier_id", Expr::ToString("_id")),
            ("supplier_name", Expr::Field("supplier.name")),
            ("average_price", Expr::Field("average_price")),
        ])
        .sort(vec![SortKey::asc("supplier_name")]);

    (EntityKind::Medicine, pipeline)
}

/// One medicine per supplier: the first after sorting by price. Ties go to
/// the lowest id.
pub fn price_extreme_per_supplier(extreme: PriceExtreme) -> (EntityKind, Pipeline) {
    let by_price = match extreme {
        PriceExtreme::MostExpensive => SortKey::desc("price"),
        PriceExtreme::Cheapest => SortKey::asc("price"),
    };

    let pipeline = Pipeline::new()
        .sort(vec![by_price, SortKey::asc("_id")])
        .group(
            Expr::Field("supplier_id"),
            vec![("medicine", Accumulator::First(Expr::Root))],
        )
        .join_one(EntityKind::Supplier, "_id", "supplier", false)
        .project(vec![
            ("supplier_id", Expr::ToString("_id")),
            ("supplier_name", Expr::Field("supplier.name")),
            ("medicine_id", Expr::ToString("medicine._id")),
            ("medicine_name", Expr::Field("medicine.name")),
            ("price", Expr::Field("medicine.price")),
        ])
        .sort(vec![SortKey::asc("supplier_name")]);

    (EntityKind::Medicine, pipeline)
}

/// Medicines grouped under each supplier whose name matches `pattern`
pub fn medicines_by_supplier_name(pattern: TextPattern) -> (EntityKind, Pipeline) {
    let pipeline = Pipeline::new()
        .join_one(EntityKind::Supplier, "supplier_id", "supplier", false)
        .filter(Predicate::all().matching("supplier.name", Some(pattern)))
        .sort(vec![SortKey::asc("name")])
        .group(
            Expr::Field("supplier._id"),
            vec![
                (
                    "supplier_name",
                    Accumulator::First(Expr::Field("supplier.name")),
                ),
                (
                    "medicines",
                    Accumulator::Push(vec![
                        ("id", Expr::ToString("_id")),
                        ("name", Expr::Field("name")),
                        ("description", Expr::Field("description")),
                        ("price", Expr::Field("price")),
                        ("expiry_date", Expr::Field("expiry_date")),
                    ]),
                ),
            ],
        )
        .project(vec![
            ("supplier_id", Expr::ToString("_id")),
            ("supplier_name", Expr::Field("supplier_name")),
            ("medicines", Expr::Field("medicines")),
        ])
        .sort(vec![SortKey::asc("supplier_name")]);

    (EntityKind::Medicine, pipeline)
}
