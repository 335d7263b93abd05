use std::sync::Arc;
use std::time::Duration;

use futures::lock::{Mutex, OwnedMutexGuard};
use moka::future::Cache;

/// Per-employee async mutexes. Holding the guard serializes the
/// read-check-write sequence for one employee's leave records.
///
/// The cache has no size bound, only an idle timeout: an entry must never
/// be evicted while its mutex is held. The idle period must therefore
/// exceed the longest time a guard is held.
pub struct EmployeeLocks {
    locks: Cache<String, Arc<Mutex<()>>>,
}

impl EmployeeLocks {
    pub fn new(idle: Duration) -> Self {
        Self {
            locks: Cache::builder().time_to_idle(idle).build(),
        }
    }

    pub async fn acquire(&self, employee_id: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .get_with(employee_id.to_string(), async { Arc::new(Mutex::new(())) })
            .await;
        lock.lock_owned().await
    }

    /// Locks every listed employee, in sorted order and each once.
    pub async fn acquire_all<'a>(&self, employee_ids: impl IntoIterator<Item = &'a str>) -> Vec<OwnedMutexGuard<()>> {
        let mut ids: Vec<&str> = employee_ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();

        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            guards.push(self.acquire(id).await);
        }
        guards
    }
}
