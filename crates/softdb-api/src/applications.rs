//! Handlers for `/applications` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/applications` | Rooms resolved |
//! | `POST` | `/applications` | Body: `{"name":"Chrome","type":"desktop","rooms":["Lab A"]}` |
//! | `GET`  | `/applications/names` | Names only |
//! | `GET`  | `/applications/{name}` | 404 if not found |
//! | `POST` | `/applications/{name}/rooms` | Body: `{"address":"Lab A"}`; 204 |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use softdb_core::{
  application::{Application, ApplicationType, NewApplication},
  store::{ApplicationRepository, Catalog},
};
use serde::Deserialize;

use crate::error::ApiError;

/// `GET /applications`
pub async fn list<C: Catalog>(
  State(catalog): State<Arc<C>>,
) -> Result<Json<Vec<Application>>, ApiError> {
  let applications = catalog
    .applications()
    .get_all_applications()
    .await
    .map_err(ApiError::store)?;
  Ok(Json(applications))
}

/// `GET /applications/names`
pub async fn names<C: Catalog>(
  State(catalog): State<Arc<C>>,
) -> Result<Json<Vec<String>>, ApiError> {
  let names = catalog
    .applications()
    .get_all_application_names()
    .await
    .map_err(ApiError::store)?;
  Ok(Json(names))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:  String,
  #[serde(rename = "type")]
  pub kind:  String,
  #[serde(default)]
  pub rooms: Vec<String>,
}

impl TryFrom<CreateBody> for NewApplication {
  type Error = ApiError;

  fn try_from(body: CreateBody) -> Result<Self, ApiError> {
    let kind = ApplicationType::parse(&body.kind)?;
    Ok(NewApplication { name: body.name, kind, rooms: body.rooms })
  }
}

/// `POST /applications`
pub async fn create<C: Catalog>(
  State(catalog): State<Arc<C>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let application = catalog
    .applications()
    .store_application(body.try_into()?)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(application)))
}

/// `GET /applications/{name}`
pub async fn get_one<C: Catalog>(
  State(catalog): State<Arc<C>>,
  Path(name): Path<String>,
) -> Result<Json<Application>, ApiError> {
  let application = catalog
    .applications()
    .get_application_by_name(&name)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(application))
}

#[derive(Debug, Deserialize)]
pub struct RoomBody {
  pub address: String,
}

/// `POST /applications/{name}/rooms`
pub async fn add_room<C: Catalog>(
  State(catalog): State<Arc<C>>,
  Path(name): Path<String>,
  Json(body): Json<RoomBody>,
) -> Result<StatusCode, ApiError> {
  catalog
    .applications()
    .add_application_to_room(&name, &body.address)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
