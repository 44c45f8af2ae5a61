use actix_web::{HttpRequest, HttpResponse, delete, post, web};

use crate::domain::catalog::RemoteProductRecord;
use crate::routes::{AdminState, ensure_admin};
use crate::services::events::{
    request_import, request_product_deletion, request_product_import, request_restart,
};
use crate::services::{ServiceError, ServiceResult};

fn accepted_or_error(result: ServiceResult<()>) -> HttpResponse {
    match result {
        Ok(()) => HttpResponse::Accepted().finish(),
        Err(ServiceError::TypeConstraint(e)) => HttpResponse::BadRequest().body(e),
        Err(ServiceError::Unavailable) | Err(ServiceError::Queue(_)) => {
            HttpResponse::ServiceUnavailable().finish()
        }
        Err(e) => {
            log::error!("Failed to enqueue sync event: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/v1/sync")]
pub async fn api_v1_sync(req: HttpRequest, state: web::Data<AdminState>) -> HttpResponse {
    if let Err(response) = ensure_admin(&req, &state) {
        return response;
    }
    let result = match &state.backend {
        Some(backend) => request_import(&backend.queue),
        None => Err(ServiceError::Unavailable),
    };
    accepted_or_error(result)
}

#[post("/v1/restart")]
pub async fn api_v1_restart(req: HttpRequest, state: web::Data<AdminState>) -> HttpResponse {
    if let Err(response) = ensure_admin(&req, &state) {
        return response;
    }
    let result = match &state.backend {
        Some(backend) => request_restart(&backend.queue),
        None => Err(ServiceError::Unavailable),
    };
    accepted_or_error(result)
}

#[post("/v1/products")]
pub async fn api_v1_import_product(
    req: HttpRequest,
    state: web::Data<AdminState>,
    record: web::Json<RemoteProductRecord>,
) -> HttpResponse {
    if let Err(response) = ensure_admin(&req, &state) {
        return response;
    }
    let result = match &state.backend {
        Some(backend) => request_product_import(record.into_inner(), &backend.queue),
        None => Err(ServiceError::Unavailable),
    };
    accepted_or_error(result)
}

#[delete("/v1/products/{sku}")]
pub async fn api_v1_delete_product(
    req: HttpRequest,
    state: web::Data<AdminState>,
    sku: web::Path<String>,
) -> HttpResponse {
    if let Err(response) = ensure_admin(&req, &state) {
        return response;
    }
    let result = match &state.backend {
        Some(backend) => request_product_deletion(&sku, &backend.queue),
        None => Err(ServiceError::Unavailable),
    };
    accepted_or_error(result)
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;
    use actix_web::{App, test};
    use tempfile::NamedTempFile;

    use super::*;
    use crate::db::{establish_connection_pool, run_migrations};
    use crate::domain::task::SyncTask;
    use crate::queue::TokioTaskQueue;
    use crate::repository::DieselRepository;
    use crate::routes::SyncBackend;

    const TOKEN: &str = "s3cret-admin-token";

    fn state(backend: Option<SyncBackend>, admin_token: Option<&str>) -> web::Data<AdminState> {
        web::Data::new(AdminState {
            backend,
            catalog_url: "https://catalog.test/products".into(),
            sync_interval_secs: 3600,
            admin_token: admin_token.map(str::to_string),
        })
    }

    fn backend(db: &NamedTempFile) -> (SyncBackend, tokio::sync::mpsc::UnboundedReceiver<SyncTask>) {
        let pool = establish_connection_pool(db.path().to_str().unwrap()).unwrap();
        run_migrations(&mut pool.get().unwrap()).unwrap();
        let (queue, receiver) = TokioTaskQueue::new();
        let backend = SyncBackend {
            repo: DieselRepository::new(pool),
            queue,
        };
        (backend, receiver)
    }

    fn authorized(request: TestRequest) -> TestRequest {
        request.insert_header(("Authorization", format!("Bearer {TOKEN}")))
    }

    #[actix_web::test]
    async fn events_are_refused_without_store() {
        let app = test::init_service(
            App::new().app_data(state(None, Some(TOKEN))).service(
                web::scope("/api")
                    .service(api_v1_sync)
                    .service(api_v1_delete_product),
            ),
        )
        .await;

        let sync = authorized(TestRequest::post().uri("/api/v1/sync")).to_request();
        let delete = authorized(TestRequest::delete().uri("/api/v1/products/A-1")).to_request();

        assert_eq!(
            test::call_service(&app, sync).await.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            test::call_service(&app, delete).await.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[actix_web::test]
    async fn events_are_enqueued() {
        let db = NamedTempFile::new().unwrap();
        let (backend, mut receiver) = backend(&db);

        let app = test::init_service(
            App::new().app_data(state(Some(backend), Some(TOKEN))).service(
                web::scope("/api")
                    .service(api_v1_sync)
                    .service(api_v1_restart)
                    .service(api_v1_import_product)
                    .service(api_v1_delete_product),
            ),
        )
        .await;

        let requests = vec![
            TestRequest::post().uri("/api/v1/sync"),
            TestRequest::post().uri("/api/v1/restart"),
            TestRequest::post()
                .uri("/api/v1/products")
                .set_json(serde_json::json!({
                    "sku": "A-1", "name": "Lamp", "price": "$3", "in_stock": 2
                })),
            TestRequest::delete().uri("/api/v1/products/A-1"),
        ];
        for request in requests {
            assert_eq!(
                test::call_service(&app, authorized(request).to_request())
                    .await
                    .status(),
                StatusCode::ACCEPTED
            );
        }

        assert_eq!(receiver.recv().await, Some(SyncTask::StartImport));
        assert_eq!(receiver.recv().await, Some(SyncTask::RemoteRestart));
        assert!(matches!(
            receiver.recv().await,
            Some(SyncTask::ImportProduct(record)) if record.sku == "A-1"
        ));
        assert_eq!(
            receiver.recv().await,
            Some(SyncTask::DeleteProduct("A-1".into()))
        );
    }

    #[actix_web::test]
    async fn unauthenticated_delete_is_rejected() {
        let db = NamedTempFile::new().unwrap();
        let (backend, mut receiver) = backend(&db);
        let app = test::init_service(
            App::new()
                .app_data(state(Some(backend), Some(TOKEN)))
                .service(web::scope("/api").service(api_v1_delete_product)),
        )
        .await;

        let anonymous = TestRequest::delete().uri("/api/v1/products/A-1").to_request();
        let wrong_token = TestRequest::delete()
            .uri("/api/v1/products/A-1")
            .insert_header(("Authorization", "Bearer s3cret-admin-tokeN"))
            .to_request();
        let wrong_scheme = TestRequest::delete()
            .uri("/api/v1/products/A-1")
            .insert_header(("Authorization", format!("Basic {TOKEN}")))
            .to_request();

        for request in [anonymous, wrong_token, wrong_scheme] {
            let response = test::call_service(&app, request).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert!(response.headers().contains_key("www-authenticate"));
        }
        assert!(receiver.try_recv().is_err());
    }

    #[actix_web::test]
    async fn api_is_locked_without_configured_token() {
        let db = NamedTempFile::new().unwrap();
        let (backend, mut receiver) = backend(&db);

        for admin_token in [None, Some("")] {
            let app = test::init_service(
                App::new()
                    .app_data(state(Some(backend.clone()), admin_token))
                    .service(web::scope("/api").service(api_v1_sync)),
            )
            .await;

            let request = TestRequest::post()
                .uri("/api/v1/sync")
                .insert_header(("Authorization", "Bearer "))
                .to_request();

            assert_eq!(
                test::call_service(&app, request).await.status(),
                StatusCode::UNAUTHORIZED
            );
        }
        assert!(receiver.try_recv().is_err());
    }

    #[actix_web::test]
    async fn blank_sku_is_a_bad_request() {
        let db = NamedTempFile::new().unwrap();
        let (backend, _receiver) = backend(&db);
        let app = test::init_service(
            App::new()
                .app_data(state(Some(backend), Some(TOKEN)))
                .service(web::scope("/api").service(api_v1_import_product)),
        )
        .await;

        let request = authorized(TestRequest::post().uri("/api/v1/products").set_json(
            serde_json::json!({
                "sku": " ", "name": "Lamp", "price": "$3", "in_stock": 2
            }),
        ))
        .to_request();

        assert_eq!(
            test::call_service(&app, request).await.status(),
            StatusCode::BAD_REQUEST
        );
    }
}
