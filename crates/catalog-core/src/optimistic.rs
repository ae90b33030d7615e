// ── Optimistic membership mutations ──
//
// Moves an entity in or out of a destination domain (e.g. a store game
// into the manager). The source domain's flag flips before the server
// call, is rolled back if the call fails, and a confirmed change is
// followed by a refetch of the destination's current page.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use strum::Display;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use catalog_api::CatalogApi;

use crate::error::CoreError;
use crate::model::{CatalogEntity, EntityId, Membership};
use crate::session::{SessionBus, SessionSignal};
use crate::store::DomainCache;

/// Lifecycle of one optimistic transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TxPhase {
    AppliedLocally,
    PendingConfirmation,
    Confirmed,
    RolledBack,
}

/// Record of a membership change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipTx {
    pub id: EntityId,
    /// Flag before the flip, if the entity was on the cached source page.
    pub previous: Option<bool>,
    pub requested: bool,
    pub phase: TxPhase,
}

impl MembershipTx {
    fn advance(&mut self, phase: TxPhase) {
        debug!(id = %self.id, from = %self.phase, to = %phase, "membership transaction");
        self.phase = phase;
    }
}

#[derive(Clone, Copy)]
enum Desired {
    Set(bool),
    Toggle,
}

/// Coordinates optimistic membership changes between a source domain `S`
/// and the destination domain `D` that `S::TARGET` refers to.
///
/// Mutations on the same entity are serialized; different entities
/// proceed concurrently.
pub struct MembershipCoordinator<S: Membership, D: CatalogEntity> {
    api: Arc<dyn CatalogApi>,
    bus: SessionBus,
    source: Arc<DomainCache<S>>,
    destination: Arc<DomainCache<D>>,
    locks: DashMap<EntityId, Arc<Mutex<()>>>,
}

impl<S: Membership, D: CatalogEntity> MembershipCoordinator<S, D> {
    pub fn new(
        api: Arc<dyn CatalogApi>,
        bus: SessionBus,
        source: Arc<DomainCache<S>>,
        destination: Arc<DomainCache<D>>,
    ) -> Self {
        Self {
            api,
            bus,
            source,
            destination,
            locks: DashMap::new(),
        }
    }

    /// Add (`member = true`) or remove entity `id` from the destination.
    pub async fn set_membership(
        &self,
        id: EntityId,
        member: bool,
    ) -> Result<MembershipTx, CoreError> {
        self.run(id, Desired::Set(member)).await
    }

    /// Invert the cached flag of `id`. The entity must be on the cached
    /// source page.
    pub async fn toggle(&self, id: EntityId) -> Result<MembershipTx, CoreError> {
        self.run(id, Desired::Toggle).await
    }

    /// Number of entities with a transaction currently holding a lock.
    pub fn in_flight(&self) -> usize {
        self.locks.len()
    }

    async fn run(&self, id: EntityId, desired: Desired) -> Result<MembershipTx, CoreError> {
        let lock = Arc::clone(self.locks.entry(id).or_default().value());
        let result = {
            let _guard = lock.lock().await;
            self.run_locked(id, desired).await
        };
        drop(lock);
        self.locks.remove_if(&id, |_, l| Arc::strong_count(l) == 1);
        result
    }

    async fn run_locked(&self, id: EntityId, desired: Desired) -> Result<MembershipTx, CoreError> {
        let requested = match desired {
            Desired::Set(member) => member,
            Desired::Toggle => !self.source.is_member(id).ok_or_else(|| CoreError::NotFound {
                entity_type: S::LABEL,
                identifier: id.to_string(),
            })?,
        };

        // (1) flip locally
        let previous = self.source.set_member_flag(id, requested);
        let mut tx = MembershipTx {
            id,
            previous,
            requested,
            phase: TxPhase::AppliedLocally,
        };

        // (2) confirm with the server
        tx.advance(TxPhase::PendingConfirmation);
        match self.api.set_membership(S::TARGET, id.get(), requested).await {
            Ok(()) => {
                tx.advance(TxPhase::Confirmed);
                info!(domain = S::LABEL, %id, member = requested, "membership confirmed");
                // (3) destination is refetched, never patched locally
                if let Err(err) = self.destination.refetch_current().await {
                    warn!(domain = D::LABEL, error = %err, "destination refetch failed");
                }
                Ok(tx)
            }
            Err(err) => {
                // (4) roll back to pre-mutation truth
                if let Some(before) = previous {
                    self.source.set_member_flag(id, before);
                }
                tx.advance(TxPhase::RolledBack);
                let err = CoreError::from(err);
                if err.is_unauthorized() {
                    self.bus.publish(SessionSignal::Unauthorized);
                }
                warn!(domain = S::LABEL, %id, error = %err, "membership change rolled back");
                Err(err)
            }
        }
    }
}
