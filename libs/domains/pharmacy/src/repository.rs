use std::marker::PhantomData;

use async_trait::async_trait;
use bson::{oid::ObjectId, Document};
use serde::{de::DeserializeOwned, Serialize};
use strum::Display;

use crate::error::PharmacyResult;
use crate::models::{Medicine, StockLot, Supplier};
use crate::pipeline::{Pipeline, SortKey};
use crate::query::Predicate;

/// The three record types and the collections holding them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum EntityKind {
    Supplier,
    Medicine,
    #[strum(serialize = "Stock lot")]
    StockLot,
}

impl EntityKind {
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Supplier => "fornecedores",
            EntityKind::Medicine => "remedios",
            EntityKind::StockLot => "estoques",
        }
    }

    /// Lowercase name for use inside sentences
    pub fn noun(self) -> &'static str {
        match self {
            EntityKind::Supplier => "supplier",
            EntityKind::Medicine => "medicine",
            EntityKind::StockLot => "stock lot",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub skip: u64,
    pub limit: Option<u64>,
    pub sort: Vec<SortKey>,
}

impl FindOptions {
    pub fn sorted(sort: Vec<SortKey>) -> Self {
        Self {
            sort,
            ..Default::default()
        }
    }

    pub fn paged(mut self, skip: u64, limit: u64) -> Self {
        self.skip = skip;
        self.limit = Some(limit);
        self
    }
}

/// Persistence interface over the three collections.
///
/// Records cross this boundary as BSON documents so that implementations
/// stay independent of the entity types; see [`Records`] for the typed view.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// First record matching the predicate
    async fn find_one(&self, kind: EntityKind, predicate: Predicate)
        -> PharmacyResult<Option<Document>>;

    /// Matching records, ordered and windowed by `options`
    async fn find(
        &self,
        kind: EntityKind,
        predicate: Predicate,
        options: FindOptions,
    ) -> PharmacyResult<Vec<Document>>;

    async fn count(&self, kind: EntityKind, predicate: Predicate) -> PharmacyResult<u64>;

    async fn insert(&self, kind: EntityKind, record: Document) -> PharmacyResult<()>;

    /// Replace the record with `id`; false if it does not exist
    async fn replace(&self, kind: EntityKind, id: ObjectId, record: Document)
        -> PharmacyResult<bool>;

    /// Delete the record with `id`; false if it does not exist
    async fn delete(&self, kind: EntityKind, id: ObjectId) -> PharmacyResult<bool>;

    /// Execute an aggregation pipeline starting from `kind`'s collection
    async fn run_pipeline(&self, kind: EntityKind, pipeline: Pipeline)
        -> PharmacyResult<Vec<Document>>;
}

/// A record type persisted through an [`EntityStore`]
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    const KIND: EntityKind;

    fn id(&self) -> ObjectId;
}

impl Entity for Supplier {
    const KIND: EntityKind = EntityKind::Supplier;

    fn id(&self) -> ObjectId {
        self.id
    }
}

impl Entity for Medicine {
    const KIND: EntityKind = EntityKind::Medicine;

    fn id(&self) -> ObjectId {
        self.id
    }
}

impl Entity for StockLot {
    const KIND: EntityKind = EntityKind::StockLot;

    fn id(&self) -> ObjectId {
        self.id
    }
}

/// Typed access to one collection of an [`EntityStore`]
pub struct Records<'a, S: ?Sized, E> {
    store: &'a S,
    entity: PhantomData<fn() -> E>,
}

impl<'a, S, E> Records<'a, S, E>
where
    S: EntityStore + ?Sized,
    E: Entity,
{
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            entity: PhantomData,
        }
    }

    pub async fn get(&self, id: ObjectId) -> PharmacyResult<Option<E>> {
        self.first(Predicate::by_id(id)).await
    }

    pub async fn first(&self, predicate: Predicate) -> PharmacyResult<Option<E>> {
        self.store
            .find_one(E::KIND, predicate)
            .await?
            .map(bson::from_document)
            .transpose()
            .map_err(Into::into)
    }

    pub async fn find(&self, predicate: Predicate, options: FindOptions) -> PharmacyResult<Vec<E>> {
        self.store
            .find(E::KIND, predicate, options)
            .await?
            .into_iter()
            .map(|doc| bson::from_document(doc).map_err(Into::into))
            .collect()
    }

    pub async fn count(&self, predicate: Predicate) -> PharmacyResult<u64> {
        self.store.count(E::KIND, predicate).await
    }

    pub async fn insert(&self, record: &E) -> PharmacyResult<()> {
        self.store
            .insert(E::KIND, bson::to_document(record)?)
            .await
    }

    pub async fn replace(&self, record: &E) -> PharmacyResult<bool> {
        self.store
            .replace(E::KIND, record.id(), bson::to_document(record)?)
            .await
    }

    pub async fn delete(&self, id: ObjectId) -> PharmacyResult<bool> {
        self.store.delete(E::KIND, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateSupplier;

    #[test]
    fn test_kind_names() {
        assert_eq!(EntityKind::StockLot.to_string(), "Stock lot");
        assert_eq!(EntityKind::StockLot.noun(), "stock lot");
        assert_eq!(EntityKind::Supplier.collection(), "fornecedores");
        assert_eq!(EntityKind::Medicine.collection(), "remedios");
        assert_eq!(EntityKind::StockLot.collection(), "estoques");
    }

    #[tokio::test]
    async fn test_records_decode_documents() {
        let supplier = Supplier::create(CreateSupplier {
            name: "Teste Farma".into(),
            tax_id: "12345678001122".into(),
            phone: "(11) 99999-1234".into(),
            address: "Rua Teste, 100".into(),
        })
        .unwrap();
        let stored = bson::to_document(&supplier).unwrap();
        let id = supplier.id;

        let mut store = MockEntityStore::new();
        store
            .expect_find_one()
            .withf(move |kind, predicate| {
                *kind == EntityKind::Supplier && *predicate == Predicate::by_id(id)
            })
            .returning(move |_, _| Ok(Some(stored.clone())));

        let found = Records::<_, Supplier>::new(&store).get(id).await.unwrap();
        assert_eq!(found, Some(supplier));
    }

    #[tokio::test]
    async fn test_records_surface_decode_errors() {
        let mut store = MockEntityStore::new();
        store
            .expect_find()
            .returning(|_, _, _| Ok(vec![bson::doc! { "_id": 1 }]));

        let result = Records::<_, Medicine>::new(&store)
            .find(Predicate::all(), FindOptions::default())
            .await;
        assert!(matches!(
            result,
            Err(crate::PharmacyError::Serialization(_))
        ));
    }
}
