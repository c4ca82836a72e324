//! Handlers for `/subjects` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/subjects` | Every subject with its ancestor closure |
//! | `POST` | `/subjects` | Body: `{"category":"who","name":"alice","parents":["who"]}` |
//! | `GET`  | `/subjects/{name}` | Case-insensitive; 404 if not found |
//! | `GET`  | `/subjects/{name}/descendants` | The subject first, then everything below it |
//! | `POST` | `/subjects/{name}/children` | Body: `{"child":"alice"}`; 204 |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use softdb_core::{
  store::{Catalog, SubjectRepository},
  subject::{Category, NewSubject, Subject},
};
use serde::Deserialize;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /subjects`
pub async fn list<C: Catalog>(
  State(catalog): State<Arc<C>>,
) -> Result<Json<Vec<Subject>>, ApiError> {
  let subjects = catalog
    .subjects()
    .get_all_subjects()
    .await
    .map_err(ApiError::store)?;
  Ok(Json(subjects))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub category:    String,
  pub name:        String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub parents:     Vec<String>,
}

impl TryFrom<CreateBody> for NewSubject {
  type Error = ApiError;

  fn try_from(body: CreateBody) -> Result<Self, ApiError> {
    let category = Category::parse(&body.category)?;
    Ok(
      body
        .parents
        .iter()
        .fold(NewSubject::new(category, body.name, body.description), |s, p| {
          s.with_parent(p)
        }),
    )
  }
}

/// `POST /subjects`
pub async fn create<C: Catalog>(
  State(catalog): State<Arc<C>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let subject = catalog
    .subjects()
    .store_subject(body.try_into()?)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(subject)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /subjects/{name}`
pub async fn get_one<C: Catalog>(
  State(catalog): State<Arc<C>>,
  Path(name): Path<String>,
) -> Result<Json<Subject>, ApiError> {
  let subject = catalog
    .subjects()
    .get_subject_by_name(&name)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(subject))
}

// ─── Hierarchy ────────────────────────────────────────────────────────────────

/// `GET /subjects/{name}/descendants`
pub async fn descendants<C: Catalog>(
  State(catalog): State<Arc<C>>,
  Path(name): Path<String>,
) -> Result<Json<Vec<Subject>>, ApiError> {
  let subjects = catalog
    .subjects()
    .get_all_descendant_subjects(&name)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(subjects))
}

#[derive(Debug, Deserialize)]
pub struct ChildBody {
  pub child: String,
}

/// `POST /subjects/{name}/children` — body: `{"child":"alice"}`
pub async fn add_child<C: Catalog>(
  State(catalog): State<Arc<C>>,
  Path(parent): Path<String>,
  Json(body): Json<ChildBody>,
) -> Result<StatusCode, ApiError> {
  catalog
    .subjects()
    .add_child(&parent, &body.child)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
