//! Set reconciliation for one-to-many link tables.
//!
//! Given a parent id and the desired set of related ids, bring the stored
//! links in line: link what is missing, unlink what is no longer wanted,
//! leave the intersection alone. Each row is applied on its own, so one bad
//! id does not stop the rest.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::database::{DatabaseError, LinkRepository};

/// Minimal view of a parent/child link table
#[async_trait]
pub trait LinkStore: Send + Sync {
    async fn linked_ids(&self, parent_id: i64) -> Result<Vec<i64>, DatabaseError>;

    async fn is_linked(&self, parent_id: i64, child_id: i64) -> Result<bool, DatabaseError>;

    /// Returns false when the link already existed
    async fn link(&self, parent_id: i64, child_id: i64) -> Result<bool, DatabaseError>;

    /// Returns false when there was nothing to remove
    async fn unlink(&self, parent_id: i64, child_id: i64) -> Result<bool, DatabaseError>;
}

#[async_trait]
impl<R> LinkStore for R
where
    R: LinkRepository + ?Sized,
{
    async fn linked_ids(&self, parent_id: i64) -> Result<Vec<i64>, DatabaseError> {
        let links = self.find_by_lesson_plan(parent_id).await?;
        Ok(links.into_iter().map(|link| link.related_id).collect())
    }

    async fn is_linked(&self, parent_id: i64, child_id: i64) -> Result<bool, DatabaseError> {
        Ok(self.find_one(parent_id, child_id).await?.is_some())
    }

    async fn link(&self, parent_id: i64, child_id: i64) -> Result<bool, DatabaseError> {
        Ok(self.insert(parent_id, child_id).await?.is_some())
    }

    async fn unlink(&self, parent_id: i64, child_id: i64) -> Result<bool, DatabaseError> {
        match self.find_one(parent_id, child_id).await? {
            Some(link) => self.delete(link.id).await,
            None => Ok(false),
        }
    }
}

/// Outcome of one reconciliation pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub inserted: Vec<i64>,
    pub deleted: Vec<i64>,
    /// Ids whose row could not be written or removed
    pub failed: Vec<i64>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn is_noop(&self) -> bool {
        self.inserted.is_empty() && self.deleted.is_empty() && self.failed.is_empty()
    }
}

/// `(desired - current, current - desired)`, each deduplicated in input order
pub fn diff(current: &[i64], desired: &[i64]) -> (Vec<i64>, Vec<i64>) {
    let current_set: HashSet<i64> = current.iter().copied().collect();
    let desired_set: HashSet<i64> = desired.iter().copied().collect();

    let mut seen = HashSet::new();
    let to_insert = desired
        .iter()
        .copied()
        .filter(|id| !current_set.contains(id) && seen.insert(*id))
        .collect();

    let mut seen = HashSet::new();
    let to_delete = current
        .iter()
        .copied()
        .filter(|id| !desired_set.contains(id) && seen.insert(*id))
        .collect();

    (to_insert, to_delete)
}

/// Make the links stored for `parent_id` equal `desired`.
///
/// Only reading the current links can fail the whole call. Row-level failures
/// are logged and listed in the report.
pub async fn reconcile<S>(store: &S, parent_id: i64, desired: &[i64]) -> Result<ReconcileReport, DatabaseError>
where
    S: LinkStore + ?Sized,
{
    let current = store.linked_ids(parent_id).await?;
    let (to_insert, to_delete) = diff(&current, desired);
    let mut report = ReconcileReport::default();

    for child_id in to_insert {
        // Another writer may have linked it since the current set was read
        let result = match store.is_linked(parent_id, child_id).await {
            Ok(true) => continue,
            Ok(false) => store.link(parent_id, child_id).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(true) => report.inserted.push(child_id),
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(parent_id, child_id, error = %e, "Failed to insert link");
                report.failed.push(child_id);
            }
        }
    }

    for child_id in to_delete {
        match store.unlink(parent_id, child_id).await {
            Ok(true) => report.deleted.push(child_id),
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(parent_id, child_id, error = %e, "Failed to delete link");
                report.failed.push(child_id);
            }
        }
    }

    if !report.is_noop() {
        tracing::debug!(
            parent_id,
            inserted = ?report.inserted,
            deleted = ?report.deleted,
            failed = ?report.failed,
            "Reconciled links"
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryLinks;
    use crate::database::models::Link;

    async fn seeded(parent_id: i64, ids: &[i64]) -> MemoryLinks {
        let links = MemoryLinks::default();
        for id in ids {
            links.insert(parent_id, *id).await.unwrap();
        }
        links
    }

    async fn sorted_ids(store: &MemoryLinks, parent_id: i64) -> Vec<i64> {
        let mut ids = store.linked_ids(parent_id).await.unwrap();
        ids.sort();
        ids
    }

    #[test]
    fn diff_preserves_order_and_collapses_duplicates() {
        let (to_insert, to_delete) = diff(&[2, 3, 4], &[1, 2, 1, 3, 5]);
        assert_eq!(to_insert, vec![1, 5]);
        assert_eq!(to_delete, vec![4]);
    }

    #[tokio::test]
    async fn replaces_only_the_difference() {
        let store = seeded(7, &[2, 3, 4]).await;
        let untouched = store.find_one(7, 2).await.unwrap().unwrap();

        let report = reconcile(&store, 7, &[1, 2, 3]).await.unwrap();

        assert_eq!(report.inserted, vec![1]);
        assert_eq!(report.deleted, vec![4]);
        assert!(report.is_clean());
        assert_eq!(sorted_ids(&store, 7).await, vec![1, 2, 3]);
        assert_eq!(store.find_one(7, 2).await.unwrap(), Some(untouched));
    }

    #[tokio::test]
    async fn second_pass_is_a_noop() {
        let store = seeded(1, &[5]).await;
        reconcile(&store, 1, &[5, 6]).await.unwrap();
        let report = reconcile(&store, 1, &[5, 6]).await.unwrap();
        assert!(report.is_noop());
    }

    #[tokio::test]
    async fn empty_desired_set_removes_everything() {
        let store = seeded(3, &[1, 2]).await;
        store.insert(4, 1).await.unwrap();

        let report = reconcile(&store, 3, &[]).await.unwrap();

        assert_eq!(report.deleted, vec![1, 2]);
        assert!(store.linked_ids(3).await.unwrap().is_empty());
        // Other parents keep their links
        assert_eq!(store.linked_ids(4).await.unwrap(), vec![1]);
    }

    /// Refuses to link one poisoned id, otherwise behaves like the memory store
    struct Flaky {
        inner: MemoryLinks,
        poisoned: i64,
    }

    #[async_trait]
    impl LinkRepository for Flaky {
        async fn find_by_lesson_plan(&self, lesson_plan_id: i64) -> Result<Vec<Link>, DatabaseError> {
            self.inner.find_by_lesson_plan(lesson_plan_id).await
        }

        async fn find_by_related(&self, related_id: i64) -> Result<Vec<Link>, DatabaseError> {
            self.inner.find_by_related(related_id).await
        }

        async fn find_one(&self, lesson_plan_id: i64, related_id: i64) -> Result<Option<Link>, DatabaseError> {
            self.inner.find_one(lesson_plan_id, related_id).await
        }

        async fn insert(&self, lesson_plan_id: i64, related_id: i64) -> Result<Option<Link>, DatabaseError> {
            if related_id == self.poisoned {
                return Err(DatabaseError::NotFound(format!("no row {}", related_id)));
            }
            self.inner.insert(lesson_plan_id, related_id).await
        }

        async fn delete(&self, link_id: i64) -> Result<bool, DatabaseError> {
            self.inner.delete(link_id).await
        }

        async fn delete_by_lesson_plan(&self, lesson_plan_id: i64) -> Result<u64, DatabaseError> {
            self.inner.delete_by_lesson_plan(lesson_plan_id).await
        }

        async fn delete_by_related(&self, related_id: i64) -> Result<u64, DatabaseError> {
            self.inner.delete_by_related(related_id).await
        }
    }

    #[tokio::test]
    async fn row_failures_do_not_stop_the_pass() {
        let store = Flaky {
            inner: seeded(1, &[10]).await,
            poisoned: 99,
        };

        let report = reconcile(&store, 1, &[99, 11]).await.unwrap();

        assert_eq!(report.failed, vec![99]);
        assert_eq!(report.inserted, vec![11]);
        assert_eq!(report.deleted, vec![10]);
        assert_eq!(store.linked_ids(1).await.unwrap(), vec![11]);
    }
}
