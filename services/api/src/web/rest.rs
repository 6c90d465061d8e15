//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the thought endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::{
    auth::{AuthResponse, LoginRequest, SignupRequest},
    protocol::{
        CreateThoughtRequest, Envelope, HttpError, ListThoughtsParams, PageEnvelope,
        ThoughtResponse, UpdateThoughtRequest,
    },
    state::AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use happy_thoughts_core::domain::Identity;
use happy_thoughts_core::ports::PortError;
use happy_thoughts_core::query::ListQuery;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_thoughts_handler,
        get_thought_handler,
        liked_thoughts_handler,
        create_thought_handler,
        update_thought_handler,
        delete_thought_handler,
        like_thought_handler,
        unlike_thought_handler,
        crate::web::auth::signup_handler,
        crate::web::auth::login_handler,
        crate::web::auth::logout_handler,
    ),
    components(
        schemas(
            ThoughtResponse,
            CreateThoughtRequest,
            UpdateThoughtRequest,
            SignupRequest,
            LoginRequest,
            AuthResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Happy Thoughts API", description = "Post, browse and like short happy thoughts.")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

//=========================================================================================
// Endpoint Listing
//=========================================================================================

#[derive(Serialize, Debug)]
pub struct EndpointInfo {
    pub path: &'static str,
    pub methods: &'static [&'static str],
}

pub const ENDPOINTS: &[EndpointInfo] = &[
    EndpointInfo { path: "/", methods: &["GET"] },
    EndpointInfo { path: "/thoughts", methods: &["GET", "POST"] },
    EndpointInfo { path: "/thoughts/{id}", methods: &["GET", "PATCH", "DELETE"] },
    EndpointInfo { path: "/thoughts/liked/{clientId}", methods: &["GET"] },
    EndpointInfo { path: "/thoughts/{id}/like", methods: &["POST", "DELETE"] },
    EndpointInfo { path: "/auth/signup", methods: &["POST"] },
    EndpointInfo { path: "/auth/login", methods: &["POST"] },
    EndpointInfo { path: "/auth/logout", methods: &["POST"] },
];

/// GET / - Service welcome and route listing
pub async fn welcome_handler() -> Envelope<&'static [EndpointInfo]> {
    Envelope::ok("Welcome to the Happy Thoughts API", ENDPOINTS)
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

fn bad_body(rejection: JsonRejection) -> HttpError {
    HttpError::new(StatusCode::BAD_REQUEST, rejection.body_text())
}

/// List thoughts with optional category filter, date sort and pagination.
#[utoipa::path(
    get,
    path = "/thoughts",
    params(ListThoughtsParams),
    responses(
        (status = 200, description = "A page of thoughts, with page, limit and total", body = [ThoughtResponse]),
        (status = 400, description = "page or limit is not a number"),
        (status = 404, description = "No thoughts match the query"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_thoughts_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListThoughtsParams>,
) -> Result<PageEnvelope<ThoughtResponse>, HttpError> {
    let query = ListQuery::from_params(
        params.category.as_deref(),
        params.sort_by.as_deref(),
        params.page.as_deref(),
        params.limit.as_deref(),
    )
    .map_err(|e| HttpError::from_port(e, "Invalid query parameters."))?;

    let page = state.thoughts.list(&query).await.map_err(|e| match e {
        PortError::NotFound(message) => HttpError::new(StatusCode::NOT_FOUND, message)
            .with_response(Value::Array(Vec::new())),
        other => HttpError::from_port(other, "Error fetching thoughts."),
    })?;

    Ok(PageEnvelope::ok("Thoughts retrieved successfully.", page))
}

/// Fetch one thought by id.
#[utoipa::path(
    get,
    path = "/thoughts/{id}",
    params(("id" = String, Path, description = "Thought id")),
    responses(
        (status = 200, description = "Thought found", body = ThoughtResponse),
        (status = 404, description = "Thought not found")
    )
)]
pub async fn get_thought_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Envelope<ThoughtResponse>, HttpError> {
    let thought = state
        .thoughts
        .get(&id)
        .await
        .map_err(|e| HttpError::from_port(e, "Error finding thought."))?;
    Ok(Envelope::ok("Thought found.", thought.into()))
}

/// Fetch every thought liked by a client.
#[utoipa::path(
    get,
    path = "/thoughts/liked/{clientId}",
    params(("clientId" = String, Path, description = "Caller identity")),
    responses(
        (status = 200, description = "Liked thoughts, possibly empty", body = [ThoughtResponse]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn liked_thoughts_handler(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<String>,
) -> Result<Envelope<Vec<ThoughtResponse>>, HttpError> {
    let thoughts = state
        .thoughts
        .liked_by(&client_id)
        .await
        .map_err(|e| HttpError::from_port(e, "Error retrieving liked thoughts."))?;
    Ok(Envelope::ok(
        "Liked thoughts retrieved.",
        thoughts.into_iter().map(Into::into).collect(),
    ))
}

/// Post a new thought.
#[utoipa::path(
    post,
    path = "/thoughts",
    request_body = CreateThoughtRequest,
    responses(
        (status = 200, description = "Thought created", body = ThoughtResponse),
        (status = 400, description = "Message missing or too short"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_thought_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<CreateThoughtRequest>, JsonRejection>,
) -> Result<Envelope<ThoughtResponse>, HttpError> {
    let Json(req) = payload.map_err(bad_body)?;

    let thought = state
        .thoughts
        .create(req.message, req.category)
        .await
        .map_err(|e| HttpError::from_port(e, "Couldn't create thought."))?;

    info!("Thought {} created by {}", thought.id, identity);
    Ok(Envelope::ok("Thought created successfully.", thought.into()))
}

/// Replace the message of a thought.
#[utoipa::path(
    patch,
    path = "/thoughts/{id}",
    params(("id" = String, Path, description = "Thought id")),
    request_body = UpdateThoughtRequest,
    responses(
        (status = 200, description = "Thought updated", body = ThoughtResponse),
        (status = 400, description = "New message missing or too short"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "Thought not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_thought_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateThoughtRequest>, JsonRejection>,
) -> Result<Envelope<ThoughtResponse>, HttpError> {
    let Json(req) = payload.map_err(bad_body)?;

    let thought = state
        .thoughts
        .update_message(&id, req.new_message)
        .await
        .map_err(|e| HttpError::from_port(e, "Thought unable to be updated."))?;
    Ok(Envelope::ok("Thought updated successfully.", thought.into()))
}

/// Delete a thought permanently.
#[utoipa::path(
    delete,
    path = "/thoughts/{id}",
    params(("id" = String, Path, description = "Thought id")),
    responses(
        (status = 200, description = "Thought deleted, prior state returned", body = ThoughtResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "Thought not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_thought_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Envelope<ThoughtResponse>, HttpError> {
    let thought = state
        .thoughts
        .delete(&id)
        .await
        .map_err(|e| HttpError::from_port(e, "Couldn't delete thought."))?;

    info!("Thought {} deleted by {}", thought.id, identity);
    Ok(Envelope::ok("Thought successfully deleted.", thought.into()))
}

/// Like a thought as the calling user.
#[utoipa::path(
    post,
    path = "/thoughts/{id}/like",
    params(("id" = String, Path, description = "Thought id")),
    responses(
        (status = 200, description = "Thought liked", body = ThoughtResponse),
        (status = 400, description = "Already liked by this caller"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "Thought not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn like_thought_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Envelope<ThoughtResponse>, HttpError> {
    let thought = state
        .thoughts
        .like(&id, &identity)
        .await
        .map_err(|e| HttpError::from_port(e, "Error liking thought"))?;
    Ok(Envelope::ok("Thought liked", thought.into()))
}

/// Withdraw the calling user's like.
#[utoipa::path(
    delete,
    path = "/thoughts/{id}/like",
    params(("id" = String, Path, description = "Thought id")),
    responses(
        (status = 200, description = "Thought unliked", body = ThoughtResponse),
        (status = 400, description = "Not previously liked by this caller"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "Thought not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn unlike_thought_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Envelope<ThoughtResponse>, HttpError> {
    let thought = state
        .thoughts
        .unlike(&id, &identity)
        .await
        .map_err(|e| HttpError::from_port(e, "Error unliking thought"))?;
    Ok(Envelope::ok("Thought unliked", thought.into()))
}
