use chrono::Utc;

use crate::domain::catalog::{RemoteProductRecord, SkuSet};
use crate::domain::task::SyncTask;
use crate::queue::TaskQueue;
use crate::repository::ProductReader;
use crate::services::catalog::{CatalogSource, FetchError};
use crate::services::deletion::scan_for_deletions;
use crate::services::{ServiceResult, SyncSettings, TaskOutcome};

/// Fetch the catalog and fan it out into per-product tasks.
///
/// An unreachable catalog schedules a single [`SyncTask::RemoteRestart`]
/// instead of failing. A rejected or malformed response does nothing.
pub async fn run_import<C, R, Q>(
    catalog: &C,
    repo: &R,
    queue: &Q,
    settings: &SyncSettings,
) -> ServiceResult<TaskOutcome>
where
    C: CatalogSource + ?Sized,
    R: ProductReader,
    Q: TaskQueue,
{
    match catalog.fetch().await {
        Ok(records) => reconcile(records, repo, queue),
        Err(FetchError::Transport(e)) => {
            let at = Utc::now() + settings.restart_remote_after;
            log::warn!("Catalog unreachable ({e}), retrying at {at}");
            queue.schedule_single(at, SyncTask::RemoteRestart)?;
            Ok(TaskOutcome::RetryScheduled(at))
        }
        Err(FetchError::Malformed(e)) => {
            log::warn!("Ignoring malformed catalog response: {e}");
            Ok(TaskOutcome::NothingToImport)
        }
        Err(FetchError::Rejected) => {
            log::debug!("Catalog reported an error or no products");
            Ok(TaskOutcome::NothingToImport)
        }
    }
}

/// Enqueue one [`SyncTask::ImportProduct`] per record, then a single
/// deletion scan against the SKUs seen.
pub fn reconcile<R, Q>(
    records: Vec<RemoteProductRecord>,
    repo: &R,
    queue: &Q,
) -> ServiceResult<TaskOutcome>
where
    R: ProductReader,
    Q: TaskQueue,
{
    let mut seen = SkuSet::new();
    let upserts = records.len();

    for record in records {
        seen.insert(&record.sku);
        queue.enqueue(SyncTask::ImportProduct(record))?;
    }

    let deletions = scan_for_deletions(&seen, repo, queue)?;

    Ok(TaskOutcome::Dispatched { upserts, deletions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test::TestRepository;
    use crate::services::test::{
        FakeCatalog, RecordingQueue, sample_product, sample_record, sample_settings,
    };

    #[tokio::test]
    async fn every_record_becomes_one_import_task() {
        let catalog = FakeCatalog::returning(vec![sample_record("A"), sample_record("B")]);
        let repo = TestRepository::default();
        let queue = RecordingQueue::default();

        let outcome = run_import(&catalog, &repo, &queue, &sample_settings())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            TaskOutcome::Dispatched {
                upserts: 2,
                deletions: 0
            }
        );
        assert_eq!(queue.imports(), vec!["A", "B"]);
        assert!(queue.deletions().is_empty());
        assert!(queue.scheduled().is_empty());
    }

    #[tokio::test]
    async fn products_missing_from_catalog_are_deleted() {
        let catalog = FakeCatalog::returning(vec![
            sample_record("B"),
            sample_record("C"),
            sample_record("D"),
        ]);
        let repo = TestRepository::new(vec![
            sample_product(1, "A"),
            sample_product(2, "B"),
            sample_product(3, "C"),
        ]);
        let queue = RecordingQueue::default();

        let outcome = run_import(&catalog, &repo, &queue, &sample_settings())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            TaskOutcome::Dispatched {
                upserts: 3,
                deletions: 1
            }
        );
        assert_eq!(queue.imports(), vec!["B", "C", "D"]);
        assert_eq!(queue.deletions(), vec!["A"]);
    }

    #[tokio::test]
    async fn error_flag_enqueues_nothing() {
        let catalog = FakeCatalog::failing(FetchError::Rejected);
        let repo = TestRepository::new(vec![sample_product(1, "A")]);
        let queue = RecordingQueue::default();

        let outcome = run_import(&catalog, &repo, &queue, &sample_settings())
            .await
            .unwrap();

        assert_eq!(outcome, TaskOutcome::NothingToImport);
        assert!(queue.enqueued().is_empty());
        assert!(queue.scheduled().is_empty());
    }

    #[tokio::test]
    async fn malformed_response_enqueues_nothing() {
        let catalog = FakeCatalog::failing(FetchError::Malformed("expected value".into()));
        let repo = TestRepository::new(vec![sample_product(1, "A")]);
        let queue = RecordingQueue::default();

        let outcome = run_import(&catalog, &repo, &queue, &sample_settings())
            .await
            .unwrap();

        assert_eq!(outcome, TaskOutcome::NothingToImport);
        assert!(queue.enqueued().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_schedules_single_restart() {
        let catalog = FakeCatalog::failing(FetchError::Transport("connection refused".into()));
        let repo = TestRepository::new(vec![sample_product(1, "A")]);
        let queue = RecordingQueue::default();
        let before = Utc::now();

        let outcome = run_import(&catalog, &repo, &queue, &sample_settings())
            .await
            .unwrap();

        let after = Utc::now();
        let scheduled = queue.scheduled();
        assert_eq!(scheduled.len(), 1);
        let (at, task) = &scheduled[0];
        assert_eq!(task, &SyncTask::RemoteRestart);
        assert!(*at >= before + chrono::Duration::seconds(60));
        assert!(*at <= after + chrono::Duration::seconds(60));
        assert_eq!(outcome, TaskOutcome::RetryScheduled(*at));
        assert!(queue.enqueued().is_empty());
    }

    #[test]
    fn reconcile_skips_deletions_when_all_skus_are_blank() {
        let repo = TestRepository::new(vec![sample_product(1, "A")]);
        let queue = RecordingQueue::default();

        let outcome = reconcile(vec![sample_record("  ")], &repo, &queue).unwrap();

        assert_eq!(
            outcome,
            TaskOutcome::Dispatched {
                upserts: 1,
                deletions: 0
            }
        );
        assert!(queue.deletions().is_empty());
    }
}
