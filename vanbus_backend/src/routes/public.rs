use crate::helper::public_helpers::{self, DEFAULT_FEATURED_LIMIT, DEFAULT_LIST_LIMIT};
use crate::models::ListFilter;
use crate::AppState;
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

const MAX_LIMIT: usize = 100;

#[derive(Deserialize)]
pub struct PostsQuery {
    q: Option<String>,
    limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct FeaturedQuery {
    limit: Option<usize>,
}

pub fn config_public(cfg: &mut web::ServiceConfig) {
    cfg.route("/is_server_active", web::get().to(is_server_active))
        .route("/posts", web::get().to(list_posts))
        .route("/posts/featured", web::get().to(featured_posts))
        .route("/posts/{slug}", web::get().to(get_post_by_slug));
}

async fn is_server_active() -> impl Responder {
    HttpResponse::Ok().body("active")
}

async fn list_posts(state: web::Data<AppState>, query: web::Query<PostsQuery>) -> impl Responder {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIMIT);
    let mut filter = ListFilter::default().limit(limit);
    if let Some(q) = query.q.as_deref() {
        filter = filter.search(q);
    }

    HttpResponse::Ok().json(public_helpers::fetch_posts(&state.pipeline, &filter).await)
}

async fn featured_posts(state: web::Data<AppState>, query: web::Query<FeaturedQuery>) -> impl Responder {
    let limit = query.limit.unwrap_or(DEFAULT_FEATURED_LIMIT).min(MAX_LIMIT);
    HttpResponse::Ok().json(public_helpers::fetch_featured_posts(&state.pipeline, limit).await)
}

async fn get_post_by_slug(state: web::Data<AppState>, slug: web::Path<String>) -> impl Responder {
    match public_helpers::fetch_post_by_slug(&state.pipeline, &slug).await {
        Some(detail) => HttpResponse::Ok().json(detail),
        None => HttpResponse::NotFound().body("Post not found"),
    }
}
