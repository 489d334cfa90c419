//! Cross-record reference checks done on every write.
//!
//! Ids are parsed by the caller before any lookup; one that parses but points
//! at nothing is not found. Deletes are restricted while dependents exist.

use bson::oid::ObjectId;
use tracing::instrument;

use crate::error::{PharmacyError, PharmacyResult};
use crate::models::{Medicine, Supplier};
use crate::query::Predicate;
use crate::repository::{Entity, EntityKind, EntityStore, Records};

/// Parse a hex ObjectId coming from a path, body or query string
pub fn parse_id(raw: &str) -> PharmacyResult<ObjectId> {
    ObjectId::parse_str(raw.trim()).map_err(|_| PharmacyError::InvalidId(raw.to_string()))
}

pub struct ReferenceResolver<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: EntityStore + ?Sized> ReferenceResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn resolve_supplier(&self, id: ObjectId) -> PharmacyResult<Supplier> {
        self.resolve(id).await
    }

    #[instrument(skip(self))]
    pub async fn resolve_medicine(&self, id: ObjectId) -> PharmacyResult<Medicine> {
        self.resolve(id).await
    }

    async fn resolve<E: Entity>(&self, id: ObjectId) -> PharmacyResult<E> {
        Records::<S, E>::new(self.store)
            .get(id)
            .await?
            .ok_or_else(|| PharmacyError::reference_not_found(E::KIND, id))
    }

    /// Fail with `HasDependents` while any `dependents` record points at `id`
    /// through `field`
    #[instrument(skip(self))]
    pub async fn ensure_unreferenced(
        &self,
        entity: EntityKind,
        id: ObjectId,
        dependents: EntityKind,
        field: &'static str,
    ) -> PharmacyResult<()> {
        let count = self
            .store
            .count(dependents, Predicate::all().eq(field, id))
            .await?;

        if count > 0 {
            tracing::warn!(%entity, %id, count, "Delete blocked by dependent records");
            return Err(PharmacyError::HasDependents {
                entity,
                id: id.to_hex(),
                dependents,
                count,
            });
        }
        Ok(())
    }
}
