//! In-memory lease record store
//!
//! Mirrors the queries the core needs, including a buffered transactional
//! session. Can be configured to refuse transactions so the fall-back path
//! in the renewal orchestrator is testable.

use async_trait::async_trait;
use dashmap::DashMap;
use lessor_core::{LeaseStore, LeaseTxn};
use lessor_domain::{
    ApprovalStatus, ClientId, Lease, LeaseError, LeaseId, LeaseStatus, Luid, StoreError,
};

/// In-memory implementation of [`LeaseStore`]
#[derive(Debug, Default)]
pub struct MemoryLeaseStore {
    leases: DashMap<LeaseId, Lease>,
    transactions_supported: bool,
}

impl MemoryLeaseStore {
    /// Store with transaction support
    #[must_use]
    pub fn new() -> Self {
        Self {
            leases: DashMap::new(),
            transactions_supported: true,
        }
    }

    /// Store that refuses to open transactions, like a standalone deployment
    #[must_use]
    pub fn without_transactions() -> Self {
        Self {
            leases: DashMap::new(),
            transactions_supported: false,
        }
    }

    /// Seed a lease directly, bypassing service validation
    pub fn seed(&self, lease: Lease) {
        self.leases.insert(lease.id, lease);
    }

    /// Current state of a lease by internal key
    #[must_use]
    pub fn get(&self, id: LeaseId) -> Option<Lease> {
        self.leases.get(&id).map(|l| l.clone())
    }

    /// First stored lease matching a predicate
    pub fn get_where(&self, pred: impl Fn(&Lease) -> bool) -> Option<Lease> {
        self.leases.iter().find(|l| pred(l.value())).map(|l| l.clone())
    }

    /// Number of stored leases matching a predicate
    pub fn count_where(&self, pred: impl Fn(&Lease) -> bool) -> usize {
        self.leases.iter().filter(|l| pred(l.value())).count()
    }

    fn find_open_renewal(&self, previous: LeaseId) -> Option<Lease> {
        self.leases
            .iter()
            .find(|l| {
                l.previous_lease_id == Some(previous)
                    && l.status.is_open_renewal_state()
                    && !l.deleted
            })
            .map(|l| l.clone())
    }
}

#[async_trait]
impl LeaseStore for MemoryLeaseStore {
    async fn find_by_luid(
        &self,
        client: ClientId,
        luid: &Luid,
    ) -> Result<Option<Lease>, LeaseError> {
        Ok(self
            .leases
            .iter()
            .find(|l| l.client_id == client && &l.luid == luid)
            .map(|l| l.clone()))
    }

    async fn find_by_id(&self, id: LeaseId) -> Result<Option<Lease>, LeaseError> {
        Ok(self.get(id))
    }

    async fn find_by_envelope(&self, envelope_id: &str) -> Result<Option<Lease>, LeaseError> {
        Ok(self
            .leases
            .iter()
            .find(|l| {
                l.esignature
                    .as_ref()
                    .is_some_and(|e| e.envelope_id == envelope_id)
            })
            .map(|l| l.clone()))
    }

    async fn find_open_renewal_of(
        &self,
        previous: LeaseId,
    ) -> Result<Option<Lease>, LeaseError> {
        Ok(self.find_open_renewal(previous))
    }

    async fn list_renewal_candidates(&self) -> Result<Vec<Lease>, LeaseError> {
        Ok(self
            .leases
            .iter()
            .filter(|l| {
                l.status == LeaseStatus::Active
                    && !l.deleted
                    && l.renewal_options.auto_renew
                    && l.renewal_options
                        .days_before_expiry_to_generate_renewal
                        .is_some()
            })
            .map(|l| l.clone())
            .collect())
    }

    async fn list_dispatch_candidates(&self) -> Result<Vec<Lease>, LeaseError> {
        Ok(self
            .leases
            .iter()
            .filter(|l| {
                l.status == LeaseStatus::ReadyForSignature
                    && l.approval_status == ApprovalStatus::Approved
                    && l.previous_lease_id.is_some()
                    && !l.deleted
            })
            .map(|l| l.clone())
            .collect())
    }

    async fn list_pending_approvals(
        &self,
        client: ClientId,
        luids: &[Luid],
    ) -> Result<Vec<Lease>, LeaseError> {
        Ok(self
            .leases
            .iter()
            .filter(|l| {
                l.client_id == client
                    && luids.contains(&l.luid)
                    && l.approval_status == ApprovalStatus::Pending
                    && !l.deleted
            })
            .map(|l| l.clone())
            .collect())
    }

    async fn insert(&self, lease: Lease) -> Result<Lease, LeaseError> {
        self.leases.insert(lease.id, lease.clone());
        Ok(lease)
    }

    async fn update(&self, lease: Lease) -> Result<Lease, LeaseError> {
        if !self.leases.contains_key(&lease.id) {
            return Err(LeaseError::Store(StoreError::Backend(format!(
                "update of unknown lease {}",
                lease.id
            ))));
        }
        self.leases.insert(lease.id, lease.clone());
        Ok(lease)
    }

    async fn begin(&self) -> Result<Box<dyn LeaseTxn + '_>, LeaseError> {
        if !self.transactions_supported {
            return Err(LeaseError::Store(StoreError::TransactionsUnsupported));
        }
        Ok(Box::new(MemoryTxn {
            store: self,
            staged: Vec::new(),
        }))
    }
}

/// Buffered session: writes apply on commit, reads see staged writes first
struct MemoryTxn<'a> {
    store: &'a MemoryLeaseStore,
    staged: Vec<Lease>,
}

#[async_trait]
impl LeaseTxn for MemoryTxn<'_> {
    async fn find_open_renewal_of(
        &mut self,
        previous: LeaseId,
    ) -> Result<Option<Lease>, LeaseError> {
        if let Some(staged) = self.staged.iter().find(|l| {
            l.previous_lease_id == Some(previous) && l.status.is_open_renewal_state()
        }) {
            return Ok(Some(staged.clone()));
        }
        Ok(self.store.find_open_renewal(previous))
    }

    async fn insert(&mut self, lease: Lease) -> Result<Lease, LeaseError> {
        self.staged.push(lease.clone());
        Ok(lease)
    }

    async fn update(&mut self, lease: Lease) -> Result<Lease, LeaseError> {
        self.staged.push(lease.clone());
        Ok(lease)
    }

    async fn commit(self: Box<Self>) -> Result<(), LeaseError> {
        let MemoryTxn { store, staged } = *self;
        for lease in staged {
            store.leases.insert(lease.id, lease);
        }
        Ok(())
    }
}
