use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use nftboard::{
    collections_router, CollectionDataset, Favorites, FavoritesError, FavoritesStore,
    InMemoryFavoritesStore, ALL_CHAINS, ALL_PERIODS,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;

fn app() -> Router {
    let dataset = CollectionDataset::bundled().expect("bundled dataset parses");
    let favorites =
        Favorites::open(Arc::new(InMemoryFavoritesStore::new())).expect("empty store opens");
    collections_router(Arc::new(dataset), favorites)
}

struct ReadOnlyStore;

impl FavoritesStore for ReadOnlyStore {
    fn load(&self, _key: &str) -> Result<Option<String>, FavoritesError> {
        Ok(None)
    }

    fn save(&self, _key: &str, _value: &str) -> Result<(), FavoritesError> {
        Err(FavoritesError::Store("read-only volume".to_string()))
    }
}

async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    (status, String::from_utf8(body).unwrap())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn send_json(app: Router, method: Method, uri: &str, payload: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn every_period_returns_records_with_allowed_chains() {
    let allowed: Vec<String> = ALL_CHAINS.iter().map(|c| c.as_str().to_string()).collect();

    for period in ALL_PERIODS {
        let (status, json) = get_json(app(), &format!("/api/collections/{period}")).await;
        assert_eq!(status, StatusCode::OK);

        let collections = json["collections"].as_array().unwrap();
        assert!(!collections.is_empty());
        for record in collections {
            let chain = record["chain"].as_str().unwrap().to_string();
            assert!(allowed.contains(&chain), "unexpected chain {chain}");
        }
    }
}

#[tokio::test]
async fn record_shape_is_preserved() {
    let (status, json) = get_json(app(), "/api/collections/24h").await;
    assert_eq!(status, StatusCode::OK);

    let record = &json["collections"][0];
    for key in ["name", "chain", "floor_price", "floor_usd", "floor_change", "top_offer", "listed", "volume"] {
        assert!(record[key].is_string(), "{key} should be a string");
    }
    assert!(record["sales"].is_u64());
    assert!(record["owners"].is_u64());
    assert!(record["floor_chart"].as_array().unwrap().iter().all(Value::is_number));
}

#[tokio::test]
async fn unknown_chain_in_source_is_served_as_ethereum() {
    let (_, json) = get_json(app(), "/api/collections/1h").await;
    let frogs = json["collections"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["name"] == "Mystery Frogs")
        .expect("bundled dataset has a record with an off-list chain");
    assert_eq!(frogs["chain"], "Ethereum");
}

#[tokio::test]
async fn invalid_period_returns_error_payload() {
    for bad in ["2w", "1H", "all"] {
        let (status, json) = get_json(app(), &format!("/api/collections/{bad}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, json!({ "error": "Invalid time period requested" }));
    }
}

#[tokio::test]
async fn charts_endpoint_downsamples_with_period_window() {
    let (status, json) = get_json(app(), "/api/collections/7d/charts").await;
    assert_eq!(status, StatusCode::OK);

    let charts = json.as_array().unwrap();
    assert!(!charts.is_empty());
    for chart in charts {
        assert_eq!(chart["window_size"], 7);
        let y = chart["y"].as_array().unwrap();
        let x = chart["x"].as_array().unwrap();
        assert_eq!(x.len(), y.len());
        assert!(["up", "down"].contains(&chart["direction"].as_str().unwrap()));
    }

    let (status, json) = get_json(app(), "/api/collections/90d/charts").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid time period requested");
}

#[tokio::test]
async fn favorites_toggle_add_and_remove_round_trip() {
    let app = app();

    let (status, json) = send_json(
        app.clone(),
        Method::POST,
        "/api/favorites/toggle",
        json!({ "id": "x", "name": "Foo" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["favorite"], true);
    assert_eq!(json["items"], json!([{ "id": "x", "name": "Foo" }]));

    let (_, json) = send_json(
        app.clone(),
        Method::POST,
        "/api/favorites/toggle",
        json!({ "id": "x", "name": "Foo" }),
    )
    .await;
    assert_eq!(json["favorite"], false);
    assert_eq!(json["items"], json!([]));

    send_json(app.clone(), Method::POST, "/api/favorites", json!({ "id": "1", "name": "Foo" })).await;
    send_json(app.clone(), Method::POST, "/api/favorites", json!({ "id": "2", "name": "Foo" })).await;

    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/api/favorites/1")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app.clone(), request).await;
    assert_eq!(status, StatusCode::OK);
    let items: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(items, json!([{ "id": "2", "name": "Foo" }]));

    let (_, listed) = get_json(app, "/api/favorites").await;
    assert_eq!(listed, items);
}

#[tokio::test]
async fn dashboard_page_falls_back_to_one_hour_and_stars_favorites() {
    let app = app();
    send_json(
        app.clone(),
        Method::POST,
        "/api/favorites/toggle",
        json!({ "id": "0", "name": "Azuki" }),
    )
    .await;

    let request = Request::builder()
        .uri("/dashboard?period=bogus")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);

    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("<table id=\"collections-table\">"));
    assert!(text.contains(">Floor 1h</th>"));
    assert!(text.contains("fav-btn is-fav\" data-id=\"1\" data-name=\"Azuki\""));
    assert!(text.contains("<svg class=\"sparkline\""));
}

#[tokio::test]
async fn dashboard_rejects_sorting_on_unsortable_column() {
    let (status, json) = get_json(app(), "/dashboard?period=7d&sort=chain").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "column chain is not sortable");
}

#[tokio::test]
async fn dashboard_favorite_ids_match_across_sort_orders() {
    let (status, plain) = get_text(app(), "/dashboard?period=1h").await;
    assert_eq!(status, StatusCode::OK);
    let (status, sorted) = get_text(app(), "/dashboard?period=1h&sort=sales&order=desc").await;
    assert_eq!(status, StatusCode::OK);

    for button in [
        "data-id=\"0\" data-name=\"Pudgy Penguins\"",
        "data-id=\"3\" data-name=\"Gods Unchained\"",
    ] {
        assert!(plain.contains(button), "plain page missing {button}");
        assert!(sorted.contains(button), "sorted page missing {button}");
    }
    assert_ne!(
        plain.find("data-name=\"Pudgy Penguins\"") < plain.find("data-name=\"Gods Unchained\""),
        sorted.find("data-name=\"Pudgy Penguins\"") < sorted.find("data-name=\"Gods Unchained\""),
        "sales sort should reorder the rows"
    );
}

#[tokio::test]
async fn favorites_store_failure_returns_server_error() {
    let dataset = CollectionDataset::bundled().expect("bundled dataset parses");
    let favorites = Favorites::open(Arc::new(ReadOnlyStore)).expect("empty store opens");
    let app = collections_router(Arc::new(dataset), favorites);

    let (status, json) = send_json(
        app.clone(),
        Method::POST,
        "/api/favorites/toggle",
        json!({ "id": "0", "name": "Pudgy Penguins" }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json,
        json!({ "error": "favorites store unavailable: read-only volume" })
    );

    let (status, listed) = get_json(app, "/api/favorites").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([]));
}
