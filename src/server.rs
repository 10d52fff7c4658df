//! REST API for ragvec.
//!
//! A thin caller layer over one shared [`VectorStore`]. Embeddings are
//! computed by the client; the endpoints accept the vectors directly.
//!
//! ## Endpoints
//!
//! - `POST /upsert` - Store one record
//! - `POST /query` - Top-k similarity search
//! - `GET /health` - Liveness and record count
//!
//! ## Usage
//!
//! ```rust,no_run
//! use actix_web::{web, App, HttpServer};
//! use ragvec::StoreConfig;
//!
//! #[actix_web::main]
//! async fn main() -> std::io::Result<()> {
//!     let store = web::Data::from(StoreConfig::default().build());
//!     HttpServer::new(move || App::new().app_data(store.clone()).configure(ragvec::server::config))
//!         .bind("127.0.0.1:7878")?
//!         .run()
//!         .await
//! }
//! ```

use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use serde::{Serialize, Deserialize};
use crate::backend::{Metadata, QueryHit, VectorStore};
use crate::config::Config;

const DEFAULT_TOP_K: usize = 3;

// --- Request structs ---

#[derive(Deserialize)]
struct UpsertRequest {
    id: String,
    vector: Vec<f32>,
    #[serde(default)]
    metadata: Metadata,
}

#[derive(Deserialize)]
struct QueryRequest {
    vector: Vec<f32>,
    #[serde(default = "default_top_k")]
    top_k: usize,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

// --- Response structs ---

#[derive(Serialize)]
struct UpsertResponse {
    status: &'static str,
    id: String,
}

#[derive(Serialize)]
struct QueryResponse {
    results: Vec<QueryHit>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    records: usize,
}

// --- Handlers ---

async fn upsert_handler(
    store: web::Data<dyn VectorStore>,
    body: web::Json<UpsertRequest>,
) -> impl Responder {
    let UpsertRequest { id, vector, metadata } = body.into_inner();

    match store.upsert(id.clone(), vector, metadata) {
        Ok(()) => HttpResponse::Ok().json(UpsertResponse { status: "upserted", id }),
        Err(e) => {
            tracing::warn!(%id, error = %e, "upsert rejected");
            HttpResponse::BadRequest().json(serde_json::json!({"error": e.to_string()}))
        }
    }
}

async fn query_handler(
    store: web::Data<dyn VectorStore>,
    body: web::Json<QueryRequest>,
) -> impl Responder {
    match store.query(&body.vector, body.top_k) {
        Ok(results) => HttpResponse::Ok().json(QueryResponse { results }),
        Err(e) => {
            tracing::warn!(top_k = body.top_k, error = %e, "query rejected");
            HttpResponse::BadRequest().json(serde_json::json!({"error": e.to_string()}))
        }
    }
}

async fn health_handler(store: web::Data<dyn VectorStore>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse { status: "ok", records: store.len() })
}

/// Registers the routes. The app must carry a `web::Data<dyn VectorStore>`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/upsert").route(web::post().to(upsert_handler)))
       .service(web::resource("/query").route(web::post().to(query_handler)))
       .service(web::resource("/health").route(web::get().to(health_handler)));
}

/// Builds the store from `config` and serves it until shutdown.
pub async fn serve(config: &Config) -> std::io::Result<()> {
    let store: web::Data<dyn VectorStore> = web::Data::from(config.store.build());

    tracing::info!(bind = %config.server.bind, "starting HTTP server");

    HttpServer::new(move || App::new().app_data(store.clone()).configure(self::config))
        .bind(&config.server.bind)?
        .run()
        .await
}
