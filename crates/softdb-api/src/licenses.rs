//! Handlers for `/licenses` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/licenses` | Applications and tags folded in |
//! | `POST` | `/licenses` | See [`CreateBody`] |
//! | `GET`  | `/licenses/{id}` | 404 if not found |
//! | `POST` | `/licenses/{id}/applications` | Body: `{"application":"Chrome"}`; 204 |

use std::{collections::BTreeMap, sync::Arc};

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use softdb_core::{
  license::{License, NewLicense},
  store::{Catalog, LicenseRepository},
};
use serde::Deserialize;

use crate::error::ApiError;

/// `GET /licenses`
pub async fn list<C: Catalog>(
  State(catalog): State<Arc<C>>,
) -> Result<Json<Vec<License>>, ApiError> {
  let licenses = catalog
    .licenses()
    .get_all_licenses()
    .await
    .map_err(ApiError::store)?;
  Ok(Json(licenses))
}

/// Body of `POST /licenses`:
///
/// ```json
/// {
///   "expires": "2025-01-01",
///   "accountingCode": "CS-101",
///   "applications": ["Chrome"],
///   "tags": { "who": ["alice"] }
/// }
/// ```
///
/// `accountingCode` and `tags` may be omitted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  pub expires:         NaiveDate,
  pub accounting_code: Option<String>,
  pub applications:    Vec<String>,
  #[serde(default)]
  pub tags:            BTreeMap<String, Vec<String>>,
}

impl From<CreateBody> for NewLicense {
  fn from(body: CreateBody) -> Self {
    NewLicense {
      expires:         body.expires,
      accounting_code: body.accounting_code.into(),
      applications:    body.applications,
      tags:            body.tags,
    }
  }
}

/// `POST /licenses`
pub async fn create<C: Catalog>(
  State(catalog): State<Arc<C>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let license = catalog
    .licenses()
    .store_license(body.into())
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(license)))
}

/// `GET /licenses/{id}`
pub async fn get_one<C: Catalog>(
  State(catalog): State<Arc<C>>,
  Path(id): Path<i64>,
) -> Result<Json<License>, ApiError> {
  let license = catalog
    .licenses()
    .get_license(id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(license))
}

#[derive(Debug, Deserialize)]
pub struct ApplicationBody {
  pub application: String,
}

/// `POST /licenses/{id}/applications`
pub async fn add_application<C: Catalog>(
  State(catalog): State<Arc<C>>,
  Path(id): Path<i64>,
  Json(body): Json<ApplicationBody>,
) -> Result<StatusCode, ApiError> {
  catalog
    .licenses()
    .add_application_to_license(&body.application, id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
