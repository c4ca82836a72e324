//! JSON REST API for SoftDB.
//!
//! Exposes an axum [`Router`] backed by any [`softdb_core::store::Catalog`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", softdb_api::api_router(catalog.clone()))
//! ```

pub mod applications;
pub mod error;
pub mod licenses;
pub mod rooms;
pub mod subjects;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use softdb_core::store::Catalog;

pub use error::ApiError;

/// Build a fully-materialised API router for `catalog`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<C>(catalog: Arc<C>) -> Router<()>
where
  C: Catalog + 'static,
{
  Router::new()
    // Subjects
    .route("/subjects", get(subjects::list::<C>).post(subjects::create::<C>))
    .route("/subjects/{name}", get(subjects::get_one::<C>))
    .route("/subjects/{name}/descendants", get(subjects::descendants::<C>))
    .route("/subjects/{name}/children", post(subjects::add_child::<C>))
    // Rooms
    .route("/rooms", get(rooms::list::<C>).post(rooms::create::<C>))
    .route("/rooms/{address}", get(rooms::get_one::<C>))
    // Applications
    .route(
      "/applications",
      get(applications::list::<C>).post(applications::create::<C>),
    )
    .route("/applications/names", get(applications::names::<C>))
    .route("/applications/{name}", get(applications::get_one::<C>))
    .route("/applications/{name}/rooms", post(applications::add_room::<C>))
    // Licenses
    .route("/licenses", get(licenses::list::<C>).post(licenses::create::<C>))
    .route("/licenses/{id}", get(licenses::get_one::<C>))
    .route(
      "/licenses/{id}/applications",
      post(licenses::add_application::<C>),
    )
    .with_state(catalog)
}

// ─── Router tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use serde_json::{Value, json};
  use softdb_store_sqlite::Services;
  use tower::ServiceExt as _;

  async fn app() -> Router {
    let services = Services::open_in_memory().await.unwrap();
    api_router(Arc::new(services))
  }

  async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
      Some(json) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string())),
      None => builder.body(Body::empty()),
    }
    .unwrap();
    app.clone().oneshot(req).await.unwrap()
  }

  async fn json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  async fn seed_chrome(app: &Router) {
    let resp = send(app, "POST", "/rooms", Some(json!({ "address": "Lab A" }))).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let resp = send(
      app,
      "POST",
      "/applications",
      Some(json!({ "name": "Chrome", "type": "desktop", "rooms": ["Lab A"] })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
  }

  #[tokio::test]
  async fn roots_are_listed() {
    let app = app().await;
    let resp = send(&app, "GET", "/subjects", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let subjects = json_body(resp).await;
    assert_eq!(subjects.as_array().unwrap().len(), 5);
    assert_eq!(subjects[0]["name"], "who");
    assert_eq!(subjects[0]["category"], "who");
  }

  #[tokio::test]
  async fn subject_hierarchy_over_http() {
    let app = app().await;
    let resp = send(
      &app,
      "POST",
      "/subjects",
      Some(json!({ "category": "where", "name": "Lab A", "parents": ["where"] })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(json_body(resp).await["name"], "lab a");

    let resp = send(&app, "GET", "/subjects/LAB%20A", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["parents"], json!(["lab a", "where"]));

    let resp = send(&app, "GET", "/subjects/where/descendants", None).await;
    let names: Vec<Value> = json_body(resp)
      .await
      .as_array()
      .unwrap()
      .iter()
      .map(|s| s["name"].clone())
      .collect();
    assert_eq!(names, [json!("where"), json!("lab a")]);

    let resp = send(
      &app,
      "POST",
      "/subjects/who/children",
      Some(json!({ "child": "who" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn unknown_category_is_a_bad_request() {
    let app = app().await;
    let resp = send(
      &app,
      "POST",
      "/subjects",
      Some(json!({ "category": "how", "name": "x" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(resp).await["error"].as_str().unwrap().contains("how"));
  }

  #[tokio::test]
  async fn missing_rows_are_404() {
    let app = app().await;
    for uri in ["/subjects/ghost", "/rooms/nowhere", "/applications/vim", "/licenses/9"] {
      let resp = send(&app, "GET", uri, None).await;
      assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }
  }

  #[tokio::test]
  async fn duplicates_are_409() {
    let app = app().await;
    seed_chrome(&app).await;
    let resp = send(&app, "POST", "/rooms", Some(json!({ "address": "Lab A" }))).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn applications_and_names() {
    let app = app().await;
    seed_chrome(&app).await;
    let resp = send(&app, "POST", "/rooms", Some(json!({ "address": "Lab B" }))).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = send(
      &app,
      "POST",
      "/applications/Chrome/rooms",
      Some(json!({ "address": "Lab B" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(&app, "GET", "/applications/names", None).await;
    assert_eq!(json_body(resp).await, json!(["Chrome"]));

    let resp = send(&app, "GET", "/applications/Chrome", None).await;
    let chrome = json_body(resp).await;
    assert_eq!(chrome["type"], "desktop");
    assert_eq!(chrome["rooms"][1]["address"], "Lab B");
  }

  #[tokio::test]
  async fn license_lifecycle() {
    let app = app().await;
    seed_chrome(&app).await;

    let resp = send(
      &app,
      "POST",
      "/licenses",
      Some(json!({
        "expires": "2025-01-01",
        "applications": ["Chrome"],
        "tags": { "who": ["alice"] },
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let license = json_body(resp).await;
    assert_eq!(license["accountingCode"], "UNKNOWN");
    assert_eq!(license["expires"], "2025-01-01");
    assert_eq!(license["applications"][0]["name"], "Chrome");
    assert_eq!(license["tags"]["who"]["name"], "who");
    assert_eq!(license["tags"]["who"]["values"], json!(["alice"]));

    let id = license["id"].as_i64().unwrap();
    let resp = send(&app, "GET", &format!("/licenses/{id}"), None).await;
    assert_eq!(json_body(resp).await, license);

    let resp = send(&app, "GET", "/licenses", None).await;
    assert_eq!(json_body(resp).await, json!([license]));
  }

  #[tokio::test]
  async fn license_failures_map_to_statuses() {
    let app = app().await;
    seed_chrome(&app).await;

    let resp = send(
      &app,
      "POST",
      "/licenses",
      Some(json!({ "expires": "2025-01-01", "applications": [] })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send(
      &app,
      "POST",
      "/licenses",
      Some(json!({ "expires": "2025-01-01", "applications": ["Vim"] })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let resp = send(
      &app,
      "POST",
      "/licenses/1/applications",
      Some(json!({ "application": "Chrome" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let resp = send(&app, "GET", "/licenses", None).await;
    assert_eq!(json_body(resp).await, json!([]));
  }
}
