//! HTTP API server for jot.
//!
//! Five operations over one `notes` table: create, list-by-owner, get,
//! partial update, delete. Validation happens at the handler boundary and
//! short-circuits before any persistence call; the repository translates
//! zero-row results into not-found errors which map to 404 here.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use uuid::Uuid;

use jot_core::{CreateNoteRequest, NoteRepository, UpdateNoteRequest};
use jot_db::Database;

/// Shared application state.
#[derive(Clone)]
struct AppState {
    db: Database,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   RUST_LOG    - standard env filter (default: "jot_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "jot_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // Get configuration from environment
    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| jot_core::Error::Config("DATABASE_URL must be set".to_string()))?;
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = resolve_port(std::env::var("PORT").ok())?;

    // Connect to database
    info!("Connecting to database...");
    let db = Database::connect(&database_url).await?;
    info!("Database connected");

    // Bootstrap the notes table on an empty database
    db.ensure_schema().await?;

    let state = AppState { db };
    let app = app(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Resolve the listen port from the PORT environment variable.
///
/// A missing PORT falls back to 3000; a malformed one is a configuration
/// error, consistent with how a missing DATABASE_URL is treated.
fn resolve_port(raw: Option<String>) -> jot_core::Result<u16> {
    match raw {
        Some(value) => value.parse().map_err(|_| {
            jot_core::Error::Config(format!("PORT must be a valid port number, got '{}'", value))
        }),
        None => Ok(3000),
    }
}

/// Build the router with all routes and middleware.
fn app(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/", get(root))
        .route("/health", get(health_check))
        // Notes CRUD ("/notes" kept as an alias so clients that drop the
        // trailing slash are not redirected or rejected)
        .route("/notes/", get(list_notes).post(create_note))
        .route("/notes", get(list_notes).post(create_note))
        .route(
            "/notes/:note_id",
            get(get_note).put(update_note).delete(delete_note),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// HEALTH CHECK
// =============================================================================

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "jot API is running",
    }))
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// =============================================================================
// NOTE HANDLERS
// =============================================================================

#[derive(Debug, Deserialize)]
struct UserIdQuery {
    /// Owner UUID; kept as a raw string so a malformed value maps to 422
    /// instead of a framework-default rejection.
    user_id: Option<String>,
}

/// Parse the required `user_id` query parameter.
fn parse_user_id(query: &UserIdQuery) -> Result<Uuid, ApiError> {
    let raw = query
        .user_id
        .as_deref()
        .ok_or_else(|| ApiError::Validation("user_id query parameter is required".to_string()))?;
    raw.parse().map_err(|_| {
        ApiError::Validation("Invalid user_id format. Must be a valid UUID.".to_string())
    })
}

/// Parse a `note_id` path segment.
fn parse_note_id(raw: &str) -> Result<Uuid, ApiError> {
    raw.parse().map_err(|_| {
        ApiError::Validation("Invalid note ID format. Must be a valid UUID.".to_string())
    })
}

/// Map a JSON body rejection into the validation error path, so body
/// failures carry the same `{"error": ...}` shape and 422 status as every
/// other invalid input instead of axum's plain-text default.
fn invalid_body(rejection: JsonRejection) -> ApiError {
    ApiError::Validation(rejection.body_text())
}

async fn create_note(
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
    body: Result<Json<CreateNoteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = parse_user_id(&query)?;
    let Json(body) = body.map_err(invalid_body)?;
    body.validate()?;

    let note = state.db.notes.insert(user_id, body).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

async fn list_notes(
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = parse_user_id(&query)?;

    let notes = state.db.notes.list_for_user(user_id).await?;
    Ok(Json(notes))
}

/// Fetch a single note by id.
///
/// Known gap preserved from the observed behavior: ownership is not checked
/// here, so any caller who knows a note id may read it.
async fn get_note(
    State(state): State<AppState>,
    Path(note_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_note_id(&note_id)?;

    let note = state.db.notes.fetch(id).await?;
    Ok(Json(note))
}

async fn update_note(
    State(state): State<AppState>,
    Path(note_id): Path<String>,
    body: Result<Json<UpdateNoteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_note_id(&note_id)?;
    let Json(body) = body.map_err(invalid_body)?;
    body.validate()?;

    let note = state.db.notes.update(id, body).await?;
    Ok(Json(note))
}

async fn delete_note(
    State(state): State<AppState>,
    Path(note_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_note_id(&note_id)?;

    state.db.notes.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// ERROR HANDLING
// =============================================================================

#[derive(Debug)]
enum ApiError {
    Database(jot_core::Error),
    NotFound(String),
    Validation(String),
}

impl From<jot_core::Error> for ApiError {
    fn from(err: jot_core::Error) -> Self {
        match &err {
            jot_core::Error::NoteNotFound(_) => ApiError::NotFound(err.to_string()),
            jot_core::Error::InvalidInput(msg) => ApiError::Validation(msg.clone()),
            _ => ApiError::Database(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Database(err) => {
                // Database and connectivity failures are logged server-side;
                // the client only ever sees a generic message.
                error!(error = %err, "Internal error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_id_missing() {
        let query = UserIdQuery { user_id: None };
        let err = parse_user_id(&query).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_parse_user_id_malformed() {
        let query = UserIdQuery {
            user_id: Some("not-a-uuid".to_string()),
        };
        let err = parse_user_id(&query).unwrap_err();
        match err {
            ApiError::Validation(msg) => assert!(msg.contains("user_id")),
            other => panic!("Expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_user_id_valid() {
        let query = UserIdQuery {
            user_id: Some("11111111-1111-1111-1111-111111111111".to_string()),
        };
        let id = parse_user_id(&query).unwrap();
        assert_eq!(id.to_string(), "11111111-1111-1111-1111-111111111111");
    }

    #[test]
    fn test_parse_note_id_malformed() {
        assert!(parse_note_id("definitely-not-a-uuid").is_err());
        assert!(parse_note_id("").is_err());
    }

    #[test]
    fn test_resolve_port_defaults_to_3000() {
        assert_eq!(resolve_port(None).unwrap(), 3000);
    }

    #[test]
    fn test_resolve_port_parses_value() {
        assert_eq!(resolve_port(Some("8080".to_string())).unwrap(), 8080);
    }

    #[test]
    fn test_resolve_port_rejects_garbage() {
        let err = resolve_port(Some("not-a-port".to_string())).unwrap_err();
        assert!(matches!(err, jot_core::Error::Config(_)));
        assert!(err.to_string().contains("not-a-port"));
    }

    #[test]
    fn test_validation_error_maps_to_422() {
        let response = ApiError::Validation("bad input".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_error_responses_carry_json_bodies() {
        for err in [
            ApiError::Validation("bad input".to_string()),
            ApiError::NotFound("Note not found".to_string()),
            ApiError::Database(jot_core::Error::Internal("boom".to_string())),
        ] {
            let response = err.into_response();
            let content_type = response
                .headers()
                .get(axum::http::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");
            assert!(
                content_type.starts_with("application/json"),
                "error responses must be JSON, got '{}'",
                content_type
            );
        }
    }

    #[test]
    fn test_not_found_error_maps_to_404() {
        let response = ApiError::NotFound("Note not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_database_error_maps_to_500() {
        let err = ApiError::Database(jot_core::Error::Internal("boom".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_core_not_found_maps_to_api_not_found() {
        let err: ApiError = jot_core::Error::NoteNotFound(Uuid::nil()).into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_core_invalid_input_maps_to_validation() {
        let err: ApiError = jot_core::Error::InvalidInput("title is required".to_string()).into();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_core_config_error_stays_internal() {
        let err: ApiError = jot_core::Error::Config("DATABASE_URL must be set".to_string()).into();
        assert!(matches!(err, ApiError::Database(_)));
    }
}
