//! MongoDB implementation of EntityStore

pub mod translate;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::{FindOptions as DriverFindOptions, IndexOptions},
    Collection, Database, IndexModel,
};
use tracing::instrument;

use crate::error::PharmacyResult;
use crate::pipeline::Pipeline;
use crate::query::Predicate;
use crate::repository::{EntityKind, EntityStore, FindOptions};

/// MongoDB-backed store for all three collections
#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn collection(&self, kind: EntityKind) -> Collection<Document> {
        self.db.collection::<Document>(kind.collection())
    }

    /// Create the indexes the filters and reference checks rely on
    pub async fn init_indexes(&self) -> PharmacyResult<()> {
        self.collection(EntityKind::Supplier)
            .create_indexes(vec![
                // Unique tax id
                IndexModel::builder()
                    .keys(doc! { "tax_id": 1 })
                    .options(
                        IndexOptions::builder()
                            .unique(true)
                            .name("idx_tax_id_unique".to_string())
                            .build(),
                    )
                    .build(),
                index(doc! { "name": 1 }, "idx_name"),
            ])
            .await?;

        self.collection(EntityKind::Medicine)
            .create_indexes(vec![
                index(doc! { "name": 1 }, "idx_name"),
                index(doc! { "supplier_id": 1 }, "idx_supplier"),
                index(doc! { "price": 1 }, "idx_price"),
            ])
            .await?;

        self.collection(EntityKind::StockLot)
            .create_indexes(vec![
                index(doc! { "medicine_id": 1 }, "idx_medicine"),
                index(doc! { "expiry_date": 1 }, "idx_expiry"),
                index(doc! { "entry_date": 1, "expiry_date": 1 }, "idx_entry_expiry"),
            ])
            .await?;

        tracing::info!("Pharmacy indexes created successfully");
        Ok(())
    }
}

fn index(keys: Document, name: &str) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().name(name.to_string()).build())
        .build()
}

fn driver_find_options(options: &FindOptions) -> DriverFindOptions {
    let mut driver = DriverFindOptions::default();
    if options.skip > 0 {
        driver.skip = Some(options.skip);
    }
    driver.limit = options.limit.map(translate::clamp_i64);
    if !options.sort.is_empty() {
        driver.sort = Some(translate::sort(&options.sort));
    }
    driver
}

#[async_trait]
impl EntityStore for MongoStore {
    #[instrument(skip(self, predicate), fields(collection = kind.collection()))]
    async fn find_one(
        &self,
        kind: EntityKind,
        predicate: Predicate,
    ) -> PharmacyResult<Option<Document>> {
        let record = self
            .collection(kind)
            .find_one(translate::filter(&predicate))
            .await?;
        Ok(record)
    }

    #[instrument(skip(self, predicate), fields(collection = kind.collection()))]
    async fn find(
        &self,
        kind: EntityKind,
        predicate: Predicate,
        options: FindOptions,
    ) -> PharmacyResult<Vec<Document>> {
        let collection = self.collection(kind);
        let cursor = collection
            .find(translate::filter(&predicate))
            .with_options(driver_find_options(&options))
            .await?;
        let records: Vec<Document> = cursor.try_collect().await?;
        Ok(records)
    }

    #[instrument(skip(self, predicate), fields(collection = kind.collection()))]
    async fn count(&self, kind: EntityKind, predicate: Predicate) -> PharmacyResult<u64> {
        let count = self
            .collection(kind)
            .count_documents(translate::filter(&predicate))
            .await?;
        Ok(count)
    }

    #[instrument(skip(self, record), fields(collection = kind.collection()))]
    async fn insert(&self, kind: EntityKind, record: Document) -> PharmacyResult<()> {
        self.collection(kind).insert_one(record).await?;
        Ok(())
    }

    #[instrument(skip(self, record), fields(collection = kind.collection()))]
    async fn replace(
        &self,
        kind: EntityKind,
        id: ObjectId,
        record: Document,
    ) -> PharmacyResult<bool> {
        let result = self
            .collection(kind)
            .replace_one(doc! { "_id": id }, record)
            .await?;
        Ok(result.matched_count > 0)
    }

    #[instrument(skip(self), fields(collection = kind.collection()))]
    async fn delete(&self, kind: EntityKind, id: ObjectId) -> PharmacyResult<bool> {
        let result = self.collection(kind).delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self, pipeline), fields(collection = kind.collection(), stages = pipeline.len()))]
    async fn run_pipeline(
        &self,
        kind: EntityKind,
        pipeline: Pipeline,
    ) -> PharmacyResult<Vec<Document>> {
        let cursor = self
            .collection(kind)
            .aggregate(translate::pipeline(&pipeline))
            .await?;
        let rows: Vec<Document> = cursor.try_collect().await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SortKey;
    use mongodb::Client;

    #[test]
    fn test_find_options_carry_window_and_sort() {
        let options =
            FindOptions::sorted(vec![SortKey::asc("name"), SortKey::asc("_id")]).paged(40, 20);
        let driver = driver_find_options(&options);

        assert_eq!(driver.skip, Some(40));
        assert_eq!(driver.limit, Some(20));
        assert_eq!(driver.sort, Some(doc! { "name": 1, "_id": 1 }));
    }

    #[test]
    fn test_default_find_options_are_unbounded() {
        let driver = driver_find_options(&FindOptions::default());
        assert_eq!(driver.skip, None);
        assert_eq!(driver.limit, None);
        assert_eq!(driver.sort, None);
    }

    #[tokio::test]
    async fn test_find_without_server_is_database_error() {
        let client = Client::with_uri_str("mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200")
            .await
            .unwrap();
        let store = MongoStore::new(client.database("farmacia_test"));

        let result = store
            .find(
                EntityKind::Supplier,
                Predicate::all(),
                FindOptions::sorted(vec![SortKey::asc("name")]).paged(0, 10),
            )
            .await;
        assert!(matches!(result, Err(crate::PharmacyError::Database(_))));
    }
}
