//! Admission control for RPC operations.
//!
//! Each operation category owns a fixed pool of slots. Acquisition never waits: when a
//! pool is full the request is rejected immediately with
//! [`AppError::ResourceExhausted`]. A granted slot is held by an [`AdmissionPermit`]
//! and returned to its pool when the permit is dropped, whichever way the operation
//! ends.

use std::fmt;
use std::sync::Arc;

use filestore_core::{AdmissionLimits, AppError, OperationKind};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

#[derive(Debug)]
struct SlotPool {
    capacity: usize,
    semaphore: Arc<Semaphore>,
}

impl SlotPool {
    fn new(capacity: usize) -> Self {
        let capacity = capacity.min(Semaphore::MAX_PERMITS);
        Self {
            capacity,
            semaphore: Arc::new(Semaphore::new(capacity)),
        }
    }

    fn in_flight(&self) -> usize {
        self.capacity - self.semaphore.available_permits()
    }
}

/// Independent slot pools for uploads, downloads and listings.
#[derive(Clone, Debug)]
pub struct AdmissionController {
    upload: Arc<SlotPool>,
    download: Arc<SlotPool>,
    list: Arc<SlotPool>,
}

impl AdmissionController {
    pub fn new(limits: AdmissionLimits) -> Self {
        Self {
            upload: Arc::new(SlotPool::new(limits.upload)),
            download: Arc::new(SlotPool::new(limits.download)),
            list: Arc::new(SlotPool::new(limits.list)),
        }
    }

    fn pool(&self, kind: OperationKind) -> &Arc<SlotPool> {
        match kind {
            OperationKind::Upload => &self.upload,
            OperationKind::Download => &self.download,
            OperationKind::List => &self.list,
        }
    }

    /// Take a slot for `kind` without waiting.
    ///
    /// A pool with capacity 0 rejects every request.
    pub fn try_acquire(&self, kind: OperationKind) -> Result<AdmissionPermit, AppError> {
        let pool = self.pool(kind);
        match pool.semaphore.clone().try_acquire_owned() {
            Ok(permit) => {
                tracing::debug!(
                    operation = %kind,
                    in_flight = pool.in_flight(),
                    capacity = pool.capacity,
                    "Admitted request"
                );
                Ok(AdmissionPermit {
                    kind,
                    pool: Arc::clone(pool),
                    permit: Some(permit),
                })
            }
            Err(_) => {
                tracing::warn!(
                    operation = %kind,
                    capacity = pool.capacity,
                    "Rejected request: limit exceeded"
                );
                Err(AppError::ResourceExhausted {
                    operation: kind,
                    capacity: pool.capacity,
                })
            }
        }
    }

    /// Slots of `kind` currently held
    pub fn in_flight(&self, kind: OperationKind) -> usize {
        self.pool(kind).in_flight()
    }

    pub fn capacity(&self, kind: OperationKind) -> usize {
        self.pool(kind).capacity
    }
}

/// A held admission slot. Dropping it returns the slot.
pub struct AdmissionPermit {
    kind: OperationKind,
    pool: Arc<SlotPool>,
    permit: Option<OwnedSemaphorePermit>,
}

impl AdmissionPermit {
    pub fn kind(&self) -> OperationKind {
        self.kind
    }
}

impl fmt::Debug for AdmissionPermit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdmissionPermit")
            .field("kind", &self.kind)
            .finish()
    }
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        drop(self.permit.take());
        tracing::debug!(
            operation = %self.kind,
            in_flight = self.pool.in_flight(),
            "Released admission slot"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(upload: usize, download: usize, list: usize) -> AdmissionController {
        AdmissionController::new(AdmissionLimits::new(upload, download, list))
    }

    #[test]
    fn test_admits_up_to_capacity_then_rejects() {
        let admission = controller(2, 2, 2);

        let first = admission.try_acquire(OperationKind::Upload).unwrap();
        let second = admission.try_acquire(OperationKind::Upload).unwrap();
        assert_eq!(admission.in_flight(OperationKind::Upload), 2);

        let third = admission.try_acquire(OperationKind::Upload);
        match third {
            Err(AppError::ResourceExhausted {
                operation,
                capacity,
            }) => {
                assert_eq!(operation, OperationKind::Upload);
                assert_eq!(capacity, 2);
            }
            other => panic!("expected ResourceExhausted, got {:?}", other),
        }

        drop(first);
        drop(second);
    }

    #[test]
    fn test_release_on_drop_frees_slot() {
        let admission = controller(1, 1, 1);

        let permit = admission.try_acquire(OperationKind::Download).unwrap();
        assert!(admission.try_acquire(OperationKind::Download).is_err());

        drop(permit);
        assert_eq!(admission.in_flight(OperationKind::Download), 0);
        assert!(admission.try_acquire(OperationKind::Download).is_ok());
    }

    #[test]
    fn test_zero_capacity_always_rejects() {
        let admission = controller(0, 1, 1);
        assert_eq!(admission.capacity(OperationKind::Upload), 0);
        assert!(admission.try_acquire(OperationKind::Upload).is_err());
        assert!(admission.try_acquire(OperationKind::Upload).is_err());
    }

    #[test]
    fn test_categories_are_independent() {
        let admission = controller(1, 1, 1);

        let _upload = admission.try_acquire(OperationKind::Upload).unwrap();
        assert!(admission.try_acquire(OperationKind::Upload).is_err());

        let download = admission.try_acquire(OperationKind::Download).unwrap();
        let list = admission.try_acquire(OperationKind::List).unwrap();
        assert_eq!(download.kind(), OperationKind::Download);
        assert_eq!(list.kind(), OperationKind::List);
    }

    #[test]
    fn test_clones_share_pools() {
        let admission = controller(1, 1, 1);
        let cloned = admission.clone();

        let _permit = admission.try_acquire(OperationKind::List).unwrap();
        assert_eq!(cloned.in_flight(OperationKind::List), 1);
        assert!(cloned.try_acquire(OperationKind::List).is_err());
    }

    #[tokio::test]
    async fn test_permit_released_when_task_ends() {
        let admission = controller(1, 1, 1);
        let permit = admission.try_acquire(OperationKind::Upload).unwrap();

        let handle = tokio::spawn(async move {
            let _held = permit;
            tokio::task::yield_now().await;
        });
        handle.await.unwrap();

        assert_eq!(admission.in_flight(OperationKind::Upload), 0);
    }
}
