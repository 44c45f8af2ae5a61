use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::{Mutex as TaskMutex, OwnedMutexGuard};

use crate::domain::task::{SyncTask, TaskKind};
use crate::queue::{TaskHandler, TaskQueue};
use crate::repository::{ProductReader, ProductWriter};
use crate::services::catalog::CatalogSource;
use crate::services::deletion::delete_product;
use crate::services::images::ImageImporter;
use crate::services::sync::run_import;
use crate::services::upsert::upsert_product;
use crate::services::{ServiceResult, SyncSettings, TaskOutcome};

/// One lock per SKU with a product task in flight.
#[derive(Default)]
struct SkuLocks {
    locks: Mutex<HashMap<String, Arc<TaskMutex<()>>>>,
}

impl SkuLocks {
    /// Wait until no other product task holds `sku`.
    async fn lock(&self, sku: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Entries nobody holds or waits on are dropped.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(sku.trim().to_string()).or_default())
        };
        lock.lock_owned().await
    }
}

/// Routes dequeued [`SyncTask`]s to their handlers.
///
/// Tasks run concurrently, but tasks touching the same SKU run one at a time.
pub struct SyncWorker<R, C, I, Q> {
    repo: R,
    catalog: C,
    images: I,
    queue: Q,
    settings: SyncSettings,
    sku_locks: SkuLocks,
}

impl<R, C, I, Q> SyncWorker<R, C, I, Q>
where
    R: ProductReader + ProductWriter + Send + Sync,
    C: CatalogSource,
    I: ImageImporter,
    Q: TaskQueue,
{
    pub fn new(repo: R, catalog: C, images: I, queue: Q, settings: SyncSettings) -> Self {
        Self {
            repo,
            catalog,
            images,
            queue,
            settings,
            sku_locks: SkuLocks::default(),
        }
    }

    /// Run the handler registered for `task`.
    pub async fn dispatch(&self, task: SyncTask) -> ServiceResult<TaskOutcome> {
        match task {
            SyncTask::StartImport | SyncTask::RemoteRestart => {
                run_import(&self.catalog, &self.repo, &self.queue, &self.settings).await
            }
            SyncTask::ImportProduct(record) => {
                let _guard = self.sku_locks.lock(&record.sku).await;
                upsert_product(&record, &self.repo, &self.images, &self.settings).await
            }
            SyncTask::DeleteProduct(sku) => {
                let _guard = self.sku_locks.lock(&sku).await;
                delete_product(&sku, &self.repo)
            }
        }
    }
}

#[async_trait]
impl<R, C, I, Q> TaskHandler for SyncWorker<R, C, I, Q>
where
    R: ProductReader + ProductWriter + Send + Sync,
    C: CatalogSource,
    I: ImageImporter,
    Q: TaskQueue,
{
    async fn handle(&self, task: SyncTask) {
        let kind = task.kind();
        let result = self.dispatch(task).await;
        log_outcome(kind, &result);
    }
}

/// Failed tasks are dropped after logging; the next cycle retries them.
pub fn log_outcome(kind: TaskKind, result: &ServiceResult<TaskOutcome>) {
    match result {
        Ok(outcome @ TaskOutcome::Skipped(_)) => log::debug!("{kind}: {outcome}"),
        Ok(outcome) => log::info!("{kind}: {outcome}"),
        Err(e) => log::error!("{kind} failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test::TestRepository;
    use crate::services::catalog::FetchError;
    use crate::services::test::{
        FakeCatalog, FakeImporter, RecordingQueue, sample_product, sample_record, sample_settings,
    };

    fn worker(
        catalog: FakeCatalog,
        products: Vec<crate::domain::product::Product>,
    ) -> SyncWorker<TestRepository, FakeCatalog, FakeImporter, RecordingQueue> {
        SyncWorker::new(
            TestRepository::new(products),
            catalog,
            FakeImporter::default(),
            RecordingQueue::default(),
            sample_settings(),
        )
    }

    #[tokio::test]
    async fn start_import_fans_out_records() {
        let worker = worker(
            FakeCatalog::returning(vec![sample_record("B")]),
            vec![sample_product(1, "A")],
        );

        let outcome = worker.dispatch(SyncTask::StartImport).await.unwrap();

        assert_eq!(
            outcome,
            TaskOutcome::Dispatched {
                upserts: 1,
                deletions: 1
            }
        );
        assert_eq!(worker.queue.imports(), vec!["B"]);
        assert_eq!(worker.queue.deletions(), vec!["A"]);
    }

    #[tokio::test]
    async fn remote_restart_runs_the_import_again() {
        let worker = worker(
            FakeCatalog::failing(FetchError::Transport("timed out".into())),
            vec![],
        );

        let outcome = worker.dispatch(SyncTask::RemoteRestart).await.unwrap();

        assert!(matches!(outcome, TaskOutcome::RetryScheduled(_)));
        assert_eq!(worker.queue.scheduled().len(), 1);
    }

    #[tokio::test]
    async fn product_tasks_reach_the_store() {
        let worker = worker(FakeCatalog::returning(vec![]), vec![sample_product(1, "A")]);

        let created = worker
            .dispatch(SyncTask::ImportProduct(sample_record("B")))
            .await
            .unwrap();
        let deleted = worker
            .dispatch(SyncTask::DeleteProduct("A".into()))
            .await
            .unwrap();

        assert!(matches!(created, TaskOutcome::Created(_)));
        assert!(matches!(deleted, TaskOutcome::Deleted(_)));
        let skus: Vec<_> = worker.repo.products().into_iter().map(|p| p.sku).collect();
        assert_eq!(skus.len(), 1);
        assert_eq!(skus[0], "B");
    }

    #[tokio::test]
    async fn overlapping_imports_of_one_sku_create_one_product() {
        let worker = worker(FakeCatalog::returning(vec![]), vec![]);

        let (first, second) = tokio::join!(
            worker.dispatch(SyncTask::ImportProduct(sample_record("A"))),
            worker.dispatch(SyncTask::ImportProduct(sample_record("A"))),
        );

        assert!(matches!(first, Ok(TaskOutcome::Created(_))));
        assert!(matches!(second, Ok(TaskOutcome::Updated(_))));
        let products = worker.repo.products();
        assert_eq!(products.len(), 1);
        assert!(products[0].has_image());
        assert_eq!(worker.images.calls().len(), 1);
    }

    #[tokio::test]
    async fn imports_of_different_skus_do_not_wait_on_each_other() {
        let worker = worker(FakeCatalog::returning(vec![]), vec![]);

        let (a, b) = tokio::join!(
            worker.dispatch(SyncTask::ImportProduct(sample_record("A"))),
            worker.dispatch(SyncTask::ImportProduct(sample_record("B"))),
        );

        assert!(matches!(a, Ok(TaskOutcome::Created(_))));
        assert!(matches!(b, Ok(TaskOutcome::Created(_))));
        assert_eq!(worker.repo.products().len(), 2);
        assert_eq!(worker.images.calls().len(), 2);
    }

    #[tokio::test]
    async fn released_sku_locks_are_pruned() {
        let locks = SkuLocks::default();

        drop(locks.lock("A").await);
        let _held = locks.lock(" B ").await;

        let keys: Vec<String> = locks.locks.lock().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["B".to_string()]);
    }

    #[tokio::test]
    async fn handler_swallows_failures() {
        let worker = SyncWorker::new(
            TestRepository::failing_writes(vec![]),
            FakeCatalog::returning(vec![]),
            FakeImporter::default(),
            RecordingQueue::default(),
            sample_settings(),
        );

        worker
            .handle(SyncTask::ImportProduct(sample_record("A")))
            .await;

        assert!(worker.repo.products().is_empty());
    }
}
