//! Handlers for `/rooms` endpoints.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use softdb_core::{
  room::{NewRoom, Room},
  store::{Catalog, RoomRepository},
};

use crate::error::ApiError;

/// `GET /rooms`
pub async fn list<C: Catalog>(
  State(catalog): State<Arc<C>>,
) -> Result<Json<Vec<Room>>, ApiError> {
  let rooms = catalog.rooms().get_all_rooms().await.map_err(ApiError::store)?;
  Ok(Json(rooms))
}

/// `POST /rooms` — body: `{"address":"Lab A"}`
pub async fn create<C: Catalog>(
  State(catalog): State<Arc<C>>,
  Json(body): Json<NewRoom>,
) -> Result<impl IntoResponse, ApiError> {
  let room = catalog.rooms().store_room(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(room)))
}

/// `GET /rooms/{address}`
pub async fn get_one<C: Catalog>(
  State(catalog): State<Arc<C>>,
  Path(address): Path<String>,
) -> Result<Json<Room>, ApiError> {
  let room = catalog
    .rooms()
    .get_room_by_address(&address)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(room))
}
