use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};
use tera::{Context, Tera};

use crate::queue::TokioTaskQueue;
use crate::repository::DieselRepository;

pub mod api;
pub mod main;

/// Handles the admin surface needs once the product store is up.
#[derive(Clone)]
pub struct SyncBackend {
    pub repo: DieselRepository,
    pub queue: TokioTaskQueue,
}

/// Shared state of the admin server.
pub struct AdminState {
    /// `None` when the product store could not be opened; sync is disabled.
    pub backend: Option<SyncBackend>,
    pub catalog_url: String,
    pub sync_interval_secs: u64,
    /// Bearer token the API requires. `None` keeps the API locked.
    pub admin_token: Option<String>,
}

/// Check the `Authorization: Bearer <token>` header against the configured
/// admin token, answering 401 when it is missing or wrong.
pub fn ensure_admin(req: &HttpRequest, state: &AdminState) -> Result<(), HttpResponse> {
    let expected = match state.admin_token.as_deref() {
        Some(token) if !token.is_empty() => token,
        _ => {
            log::warn!("Rejected API call to {}: no admin token configured", req.path());
            return Err(unauthorized());
        }
    };

    let provided = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    match provided {
        Some(token) if tokens_match(token, expected) => Ok(()),
        _ => {
            log::warn!("Rejected unauthenticated API call to {}", req.path());
            Err(unauthorized())
        }
    }
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized()
        .insert_header((header::WWW_AUTHENTICATE, "Bearer"))
        .finish()
}

/// Comparison whose running time does not depend on where the inputs differ.
fn tokens_match(provided: &str, expected: &str) -> bool {
    provided.len() == expected.len()
        && provided
            .bytes()
            .zip(expected.bytes())
            .fold(0u8, |diff, (a, b)| diff | (a ^ b))
            == 0
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    HttpResponse::Ok().body(tera.render(template, context).unwrap_or_else(|e| {
        log::error!("Failed to render template '{template}': {e}");
        String::new()
    }))
}
