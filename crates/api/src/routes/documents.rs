//! Document routes: reads, draft editing and status transitions.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use docflow_core::document::{DocumentStatus, DocumentType};
use docflow_core::lifecycle::DraftUpdate;
use docflow_shared::types::{CustomerId, DocumentId, PageRequest};
use docflow_store::{CreateQuotationInput, DocumentFilter, DocumentRepository};
use serde::Deserialize;

use crate::{AppState, error::engine_error_response, middleware::Actor};

/// Creates the document routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/quotations", post(create_quotation))
        .route("/documents", get(list_documents))
        .route(
            "/documents/{id}",
            get(get_document).put(update_document).delete(delete_document),
        )
        .route("/documents/{id}/submit", post(submit_document))
        .route("/documents/{id}/approve", post(approve_document))
        .route("/documents/{id}/reject", post(reject_document))
        .route("/documents/{id}/clone", post(clone_document))
}

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for listing documents.
#[derive(Debug, Default, Deserialize)]
pub struct ListDocumentsQuery {
    /// Filter by document type.
    #[serde(rename = "type")]
    pub document_type: Option<DocumentType>,
    /// Filter by status.
    pub status: Option<DocumentStatus>,
    /// Filter by customer.
    pub customer_id: Option<CustomerId>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size (default: 20, max: 100).
    pub per_page: Option<u32>,
}

impl ListDocumentsQuery {
    fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Request body for approving a document.
#[derive(Debug, Default, Deserialize)]
pub struct ApproveRequest {
    /// Optional approval notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request body for rejecting a document.
#[derive(Debug, Default, Deserialize)]
pub struct RejectRequest {
    /// Why the document was rejected.
    #[serde(default)]
    pub reason: String,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/quotations` - Create a quotation from caller-supplied lines.
async fn create_quotation(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateQuotationInput>,
) -> impl IntoResponse {
    let repo = DocumentRepository::new(state.store.clone());
    match repo.create_quotation(payload, actor.context()).await {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(e) => engine_error_response(&e),
    }
}

/// GET `/documents` - List documents with filters.
async fn list_documents(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<ListDocumentsQuery>,
) -> impl IntoResponse {
    let repo = DocumentRepository::new(state.store.clone());
    let filter = DocumentFilter {
        document_type: query.document_type,
        status: query.status,
        customer_id: query.customer_id,
    };

    let page = repo
        .list(filter, &query.page_request(), actor.context())
        .await;
    (StatusCode::OK, Json(page)).into_response()
}

/// GET `/documents/{id}` - Fetch a document with its overlay.
async fn get_document(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DocumentId>,
) -> impl IntoResponse {
    let repo = DocumentRepository::new(state.store.clone());
    match repo.get(id, actor.context()).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => engine_error_response(&e),
    }
}

/// PUT `/documents/{id}` - Edit a draft.
async fn update_document(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DocumentId>,
    Json(payload): Json<DraftUpdate>,
) -> impl IntoResponse {
    let repo = DocumentRepository::new(state.store.clone());
    match repo.update_draft(id, payload, actor.context()).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => engine_error_response(&e),
    }
}

/// DELETE `/documents/{id}` - Delete a draft.
async fn delete_document(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DocumentId>,
) -> impl IntoResponse {
    let repo = DocumentRepository::new(state.store.clone());
    match repo.delete_draft(id, actor.context()).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => engine_error_response(&e),
    }
}

/// POST `/documents/{id}/submit` - Submit a draft for review.
async fn submit_document(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DocumentId>,
) -> impl IntoResponse {
    let repo = DocumentRepository::new(state.store.clone());
    match repo.submit(id, actor.context()).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => engine_error_response(&e),
    }
}

/// POST `/documents/{id}/approve` - Approve a pending document.
async fn approve_document(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DocumentId>,
    Json(payload): Json<ApproveRequest>,
) -> impl IntoResponse {
    let repo = DocumentRepository::new(state.store.clone());
    match repo.approve(id, payload.notes, actor.context()).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => engine_error_response(&e),
    }
}

/// POST `/documents/{id}/reject` - Reject a pending document.
async fn reject_document(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DocumentId>,
    Json(payload): Json<RejectRequest>,
) -> impl IntoResponse {
    let repo = DocumentRepository::new(state.store.clone());
    match repo.reject(id, &payload.reason, actor.context()).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => engine_error_response(&e),
    }
}

/// POST `/documents/{id}/clone` - Copy a rejected document into a new draft.
async fn clone_document(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DocumentId>,
) -> impl IntoResponse {
    let repo = DocumentRepository::new(state.store.clone());
    match repo.clone_document(id, actor.context()).await {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(e) => engine_error_response(&e),
    }
}
