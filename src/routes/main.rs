use actix_web::{HttpResponse, Responder, get, web};
use tera::{Context, Tera};

use crate::repository::DieselRepository;
use crate::routes::{AdminState, render_template};
use crate::services::main::show_index;

#[get("/")]
pub async fn index(state: web::Data<AdminState>, tera: web::Data<Tera>) -> impl Responder {
    let repo = state.backend.as_ref().map(|backend| &backend.repo);

    let view = match show_index::<DieselRepository>(
        repo,
        &state.catalog_url,
        state.sync_interval_secs,
    ) {
        Ok(view) => view,
        Err(_) => return HttpResponse::InternalServerError().finish(),
    };

    let mut context = Context::new();
    context.insert("current_page", "index");
    context.insert("view", &view);

    render_template(&tera, "main/index.html", &context)
}
