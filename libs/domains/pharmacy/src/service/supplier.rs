use std::sync::Arc;

use bson::oid::ObjectId;
use tracing::instrument;

use super::validate_input;
use crate::error::{PharmacyError, PharmacyResult};
use crate::models::{CreateSupplier, Supplier, SupplierFilter, UpdateSupplier};
use crate::pipeline::SortKey;
use crate::query::{PageParams, Paginated, Predicate};
use crate::references::ReferenceResolver;
use crate::repository::{EntityKind, EntityStore, FindOptions, Records};
use crate::validation::normalize_tax_id;

/// Supplier CRUD with tax id uniqueness and restricted deletes
pub struct SupplierService<S: EntityStore> {
    store: Arc<S>,
}

impl<S: EntityStore> SupplierService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    fn records(&self) -> Records<'_, S, Supplier> {
        Records::new(self.store.as_ref())
    }

    #[instrument(skip(self, input), fields(supplier_name = %input.name))]
    pub async fn create(&self, input: CreateSupplier) -> PharmacyResult<Supplier> {
        validate_input(&input)?;
        let supplier = Supplier::create(input)?;

        self.ensure_tax_id_free(&supplier.tax_id).await?;
        self.records()
            .insert(&supplier)
            .await
            .map_err(|e| duplicate_as_tax_id(e, &supplier.tax_id))?;

        tracing::info!(supplier_id = %supplier.id, "Supplier created successfully");
        Ok(supplier)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: ObjectId) -> PharmacyResult<Supplier> {
        self.records()
            .get(id)
            .await?
            .ok_or_else(|| PharmacyError::not_found(EntityKind::Supplier, id))
    }

    /// Look up by tax id; punctuation in `raw` is ignored
    #[instrument(skip(self))]
    pub async fn get_by_tax_id(&self, raw: &str) -> PharmacyResult<Supplier> {
        let tax_id = normalize_tax_id(raw)?;
        self.records()
            .first(Predicate::all().eq("tax_id", tax_id.clone()))
            .await?
            .ok_or_else(|| PharmacyError::not_found(EntityKind::Supplier, tax_id))
    }

    /// Filtered page of suppliers ordered by name
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: SupplierFilter,
        params: PageParams,
    ) -> PharmacyResult<Paginated<Supplier>> {
        let page = params.validate()?;
        let predicate = filter.to_predicate()?;

        let total = self.records().count(predicate.clone()).await?;
        let suppliers = self
            .records()
            .find(
                predicate,
                FindOptions::sorted(vec![SortKey::asc("name")]).paged(page.skip(), page.size),
            )
            .await?;

        Ok(Paginated::new(suppliers, page, total))
    }

    #[instrument(skip(self))]
    pub async fn count(&self, filter: SupplierFilter) -> PharmacyResult<u64> {
        self.records().count(filter.to_predicate()?).await
    }

    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: ObjectId, changes: UpdateSupplier) -> PharmacyResult<Supplier> {
        validate_input(&changes)?;
        let changes = changes.parse()?;
        let mut supplier = self.get(id).await?;
        let previous_tax_id = supplier.tax_id.clone();

        supplier.apply(changes);
        if supplier.tax_id != previous_tax_id {
            self.ensure_tax_id_free(&supplier.tax_id).await?;
        }

        let replaced = self
            .records()
            .replace(&supplier)
            .await
            .map_err(|e| duplicate_as_tax_id(e, &supplier.tax_id))?;
        if !replaced {
            return Err(PharmacyError::not_found(EntityKind::Supplier, id));
        }

        tracing::info!(supplier_id = %id, "Supplier updated successfully");
        Ok(supplier)
    }

    /// Refused while any medicine still references the supplier
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ObjectId) -> PharmacyResult<()> {
        self.get(id).await?;
        ReferenceResolver::new(self.store.as_ref())
            .ensure_unreferenced(EntityKind::Supplier, id, EntityKind::Medicine, "supplier_id")
            .await?;

        if !self.records().delete(id).await? {
            return Err(PharmacyError::not_found(EntityKind::Supplier, id));
        }

        tracing::info!(supplier_id = %id, "Supplier deleted successfully");
        Ok(())
    }

    async fn ensure_tax_id_free(&self, tax_id: &str) -> PharmacyResult<()> {
        let existing = self
            .records()
            .count(Predicate::all().eq("tax_id", tax_id.to_string()))
            .await?;
        if existing > 0 {
            return Err(PharmacyError::DuplicateTaxId(tax_id.to_string()));
        }
        Ok(())
    }
}

impl<S: EntityStore> Clone for SupplierService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

// The unique index catches inserts that race past the pre-check.
fn duplicate_as_tax_id(err: PharmacyError, tax_id: &str) -> PharmacyError {
    match err {
        PharmacyError::DuplicateKey(_) => PharmacyError::DuplicateTaxId(tax_id.to_string()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockEntityStore;
    use crate::service::fixtures;

    fn input() -> CreateSupplier {
        CreateSupplier {
            name: "Teste Farma".into(),
            tax_id: "12345678001122".into(),
            phone: "(11) 99999-1234".into(),
            address: "Rua Teste, 100".into(),
        }
    }

    fn service(store: MockEntityStore) -> SupplierService<MockEntityStore> {
        SupplierService::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_create_with_fresh_tax_id() {
        let mut store = MockEntityStore::new();
        store
            .expect_count()
            .withf(|kind, predicate| {
                *kind == EntityKind::Supplier
                    && *predicate == Predicate::all().eq("tax_id", "12345678001122".to_string())
            })
            .times(1)
            .returning(|_, _| Ok(0));
        store
            .expect_insert()
            .withf(|kind, doc| {
                *kind == EntityKind::Supplier && doc.get_str("tax_id").ok() == Some("12345678001122")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let supplier = service(store).create(input()).await.unwrap();
        assert_eq!(supplier.name, "Teste Farma");
        assert_eq!(supplier.tax_id, "12345678001122");
        assert_eq!(supplier.created_at, supplier.updated_at);
    }

    #[tokio::test]
    async fn test_create_duplicate_tax_id_is_conflict() {
        let mut store = MockEntityStore::new();
        store.expect_count().returning(|_, _| Ok(1));
        store.expect_insert().times(0);

        let err = service(store).create(input()).await.unwrap_err();
        assert!(matches!(err, PharmacyError::DuplicateTaxId(ref t) if t == "12345678001122"));
    }

    #[tokio::test]
    async fn test_create_race_on_unique_index_is_conflict() {
        let mut store = MockEntityStore::new();
        store.expect_count().returning(|_, _| Ok(0));
        store
            .expect_insert()
            .returning(|_, _| Err(PharmacyError::DuplicateKey("E11000".into())));

        let err = service(store).create(input()).await.unwrap_err();
        assert!(matches!(err, PharmacyError::DuplicateTaxId(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_payload_before_store() {
        let store = MockEntityStore::new();
        let mut bad = input();
        bad.tax_id = "1234".into();

        let err = service(store).create(bad).await.unwrap_err();
        assert!(matches!(err, PharmacyError::Validation(_)));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let mut store = MockEntityStore::new();
        store.expect_find_one().returning(|_, _| Ok(None));

        let err = service(store).get(ObjectId::new()).await.unwrap_err();
        assert!(matches!(
            err,
            PharmacyError::NotFound {
                entity: EntityKind::Supplier,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_get_by_tax_id_normalizes_input() {
        let existing = fixtures::supplier();
        let stored = fixtures::doc(&existing);

        let mut store = MockEntityStore::new();
        store
            .expect_find_one()
            .withf(|_, predicate| {
                *predicate == Predicate::all().eq("tax_id", "12345678001122".to_string())
            })
            .returning(move |_, _| Ok(Some(stored.clone())));

        let found = service(store)
            .get_by_tax_id("12.345.678/0011-22")
            .await
            .unwrap();
        assert_eq!(found, existing);
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let existing = fixtures::supplier();
        let stored = fixtures::doc(&existing);
        let id = existing.id;

        let mut store = MockEntityStore::new();
        store
            .expect_find_one()
            .returning(move |_, _| Ok(Some(stored.clone())));
        // Tax id unchanged: no uniqueness check.
        store.expect_count().times(0);
        store
            .expect_replace()
            .withf(move |kind, replaced_id, doc| {
                *kind == EntityKind::Supplier
                    && *replaced_id == id
                    && doc.get_str("phone").ok() == Some("(11) 99999-0000")
                    && doc.get_str("name").ok() == Some("Teste Farma")
            })
            .times(1)
            .returning(|_, _, _| Ok(true));

        let updated = service(store)
            .update(
                id,
                UpdateSupplier {
                    phone: Some("(11) 99999-0000".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.phone, "(11) 99999-0000");
        assert_eq!(updated.name, existing.name);
        assert_eq!(updated.tax_id, existing.tax_id);
        assert_eq!(updated.address, existing.address);
        assert_eq!(updated.created_at, existing.created_at);
        assert!(updated.updated_at > existing.updated_at);
    }

    #[tokio::test]
    async fn test_update_to_taken_tax_id_is_conflict() {
        let stored = fixtures::doc(&fixtures::supplier());

        let mut store = MockEntityStore::new();
        store
            .expect_find_one()
            .returning(move |_, _| Ok(Some(stored.clone())));
        store.expect_count().returning(|_, _| Ok(1));
        store.expect_replace().times(0);

        let err = service(store)
            .update(
                ObjectId::new(),
                UpdateSupplier {
                    tax_id: Some("99.999.999/0001-99".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PharmacyError::DuplicateTaxId(_)));
    }

    #[tokio::test]
    async fn test_update_with_blank_name_never_reaches_the_store() {
        let mut store = MockEntityStore::new();
        store.expect_find_one().times(0);
        store.expect_replace().times(0);

        let err = service(store)
            .update(
                ObjectId::new(),
                UpdateSupplier {
                    name: Some("   ".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PharmacyError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_with_medicines_is_restricted() {
        let existing = fixtures::supplier();
        let stored = fixtures::doc(&existing);

        let mut store = MockEntityStore::new();
        store
            .expect_find_one()
            .returning(move |_, _| Ok(Some(stored.clone())));
        store
            .expect_count()
            .withf(|kind, _| *kind == EntityKind::Medicine)
            .returning(|_, _| Ok(2));
        store.expect_delete().times(0);

        let err = service(store).delete(existing.id).await.unwrap_err();
        assert!(matches!(
            err,
            PharmacyError::HasDependents {
                dependents: EntityKind::Medicine,
                count: 2,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_delete_unreferenced() {
        let existing = fixtures::supplier();
        let stored = fixtures::doc(&existing);
        let id = existing.id;

        let mut store = MockEntityStore::new();
        store
            .expect_find_one()
            .returning(move |_, _| Ok(Some(stored.clone())));
        store.expect_count().returning(|_, _| Ok(0));
        store
            .expect_delete()
            .withf(move |kind, deleted| *kind == EntityKind::Supplier && *deleted == id)
            .times(1)
            .returning(|_, _| Ok(true));

        service(store).delete(id).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_pages_sorted_by_name() {
        let stored = fixtures::doc(&fixtures::supplier());

        let mut store = MockEntityStore::new();
        store.expect_count().returning(|_, _| Ok(23));
        store
            .expect_find()
            .withf(|_, _, options| {
                *options
                    == FindOptions::sorted(vec![SortKey::asc("name")]).paged(10, 10)
            })
            .returning(move |_, _, _| Ok(vec![stored.clone()]));

        let page = service(store)
            .list(
                SupplierFilter::default(),
                PageParams {
                    pagina: Some(2),
                    limite: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(page.total, 23);
        assert_eq!(page.paginas, 3);
        assert_eq!(page.pagina, 2);
        assert_eq!(page.data.len(), 1);
    }

    #[tokio::test]
    async fn test_list_rejects_bad_page_before_store() {
        let store = MockEntityStore::new();
        let err = service(store)
            .list(
                SupplierFilter::default(),
                PageParams {
                    pagina: Some(0),
                    limite: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PharmacyError::InvalidPagination(_)));
    }
}
