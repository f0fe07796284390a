use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode};
use axum_test::{
    multipart::{MultipartForm, Part},
    TestServer,
};
use serde_json::{json, Value};
use tokio::sync::Notify;

use storefront_discovery::{
    api::{create_router, handlers, AppState},
    error::UploadError,
    models::{ImageUpload, Product, UploadState},
    services::{BeginUpload, CatalogStore, ImageRecommender, WishlistStore},
};

/// Recommender answering every upload with the same products
struct FixedRecommender {
    products: Vec<Product>,
}

#[async_trait::async_trait]
impl ImageRecommender for FixedRecommender {
    async fn recommend(&self, _image: ImageUpload) -> Result<Vec<Product>, UploadError> {
        Ok(self.products.clone())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Recommender whose service always answers HTTP 500
struct BrokenRecommender;

#[async_trait::async_trait]
impl ImageRecommender for BrokenRecommender {
    async fn recommend(&self, _image: ImageUpload) -> Result<Vec<Product>, UploadError> {
        Err(UploadError::Status {
            status: 500,
            body: "Internal Server Error".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "broken"
    }
}

/// Recommender that holds the upload open until released
struct GatedRecommender {
    started: Arc<Notify>,
    release: Arc<Notify>,
}

#[async_trait::async_trait]
impl ImageRecommender for GatedRecommender {
    async fn recommend(&self, _image: ImageUpload) -> Result<Vec<Product>, UploadError> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(vec![Product::new("g1", "Gated Result", 5.0)])
    }

    fn name(&self) -> &'static str {
        "gated"
    }
}

/// Recommender whose service never answers
struct SilentRecommender;

#[async_trait::async_trait]
impl ImageRecommender for SilentRecommender {
    async fn recommend(&self, _image: ImageUpload) -> Result<Vec<Product>, UploadError> {
        std::future::pending().await
    }

    fn name(&self) -> &'static str {
        "silent"
    }
}

fn sample_catalog() -> CatalogStore {
    CatalogStore::new(
        vec![
            Product::new("aaaaa", "Women Round Neck Cotton Top", 100.0).with_image("/img/1.png"),
            Product::new("aaaab", "Men Round Neck Pure Cotton T-shirt", 200.0)
                .with_image("/img/2.png")
                .with_size("M"),
            Product::new("aaaac", "Girls Round Neck Cotton Top", 220.0),
            Product::new("aaaad", "Women Zip-Front Relaxed Fit Jacket", 130.0),
            Product::new("aaaae", "Boy Round Neck Pure Cotton T-shirt", 140.0),
            Product::new("aaaaf", "Kid Tapered Slim Fit Trouser", 38.0),
            Product::new("aaaag", "Men Tapered Fit Flat-Front Trousers", 160.0),
            Product::new("aaaah", "Women Palazzo Pants with Waist Belt", 170.0),
            Product::new("aaaai", "Men Slim Fit Relaxed Denim Jacket", 190.0),
            Product::new("aaaaj", "Kid Wool Sweater", 75.0),
        ],
        "$",
    )
}

fn recommended_products() -> Vec<Product> {
    vec![
        Product::new("r1", "Striped Linen Shirt", 29.99).with_image("http://cdn/r1.png"),
        Product::new("r2", "Oxford Shirt", 39.5).with_image("http://cdn/r2.png"),
        Product::new("r3", "Flannel Shirt", 45.0).with_image("http://cdn/r3.png"),
    ]
}

fn create_state(recommender: Arc<dyn ImageRecommender>) -> AppState {
    AppState::new(
        sample_catalog(),
        WishlistStore::new(),
        recommender,
        "/images/placeholder.png",
    )
}

fn create_test_server_with(recommender: Arc<dyn ImageRecommender>) -> TestServer {
    let app = create_router(create_state(recommender));
    TestServer::new(app).unwrap()
}

fn create_test_server() -> TestServer {
    create_test_server_with(Arc::new(FixedRecommender {
        products: recommended_products(),
    }))
}

fn image_form() -> MultipartForm {
    MultipartForm::new().add_part(
        "image",
        Part::bytes(vec![0xFF, 0xD8, 0xFF, 0xE0])
            .file_name("photo.jpg")
            .mime_type("image/jpeg"),
    )
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_new_arrivals_rail() {
    let server = create_test_server();

    let response = server.get("/new-arrivals").await;
    response.assert_status_ok();
    let cards: Vec<Value> = response.json();
    assert_eq!(cards.len(), 3);
    assert_eq!(cards[0]["name"], "Women Round Neck Cotton Top");
    assert_eq!(cards[1]["price_label"], "$200.00");
    assert_eq!(cards[2]["image"], "/images/placeholder.png");
}

#[tokio::test]
async fn test_initial_search_view() {
    let server = create_test_server();

    let response = server.get("/search").await;
    response.assert_status_ok();
    let view: Value = response.json();

    assert_eq!(view["query"], "");
    assert_eq!(view["popup_visible"], false);
    assert_eq!(view["can_submit"], false);
    assert_eq!(view["upload"]["status"], "idle");
    assert_eq!(view["recommendations"].as_array().unwrap().len(), 0);
    assert_eq!(view["results"]["kind"], "matches");
    assert_eq!(view["results"]["total"], 10);
    assert_eq!(view["results"]["items"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_text_query_filters_catalog() {
    let server = create_test_server();

    let response = server
        .put("/search/query")
        .json(&json!({ "query": "T-SHIRT" }))
        .await;
    response.assert_status_ok();
    let view: Value = response.json();

    let items = view["results"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], "aaaab");
    assert_eq!(items[1]["id"], "aaaae");
    assert_eq!(items[0]["detail_path"], "/product/aaaab");
}

#[tokio::test]
async fn test_no_results_state() {
    let server = create_test_server();

    let response = server
        .put("/search/query")
        .json(&json!({ "query": "velvet" }))
        .await;
    let view: Value = response.json();

    assert_eq!(view["results"]["kind"], "no_results");
    assert_eq!(view["results"]["query"], "velvet");
    assert_eq!(view["results"]["message"], "No results found for \"velvet\"");
}

#[tokio::test]
async fn test_popup_toggle() {
    let server = create_test_server();

    let view: Value = server.post("/search/popup").await.json();
    assert_eq!(view["popup_visible"], true);

    let view: Value = server.post("/search/popup").await.json();
    assert_eq!(view["popup_visible"], false);
}

#[tokio::test]
async fn test_submit_without_file_is_noop() {
    let server = create_test_server();

    let response = server.post("/search/submit").await;
    response.assert_status_ok();
    let view: Value = response.json();
    assert_eq!(view["upload"]["status"], "idle");
    assert_eq!(view["recommendations"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_image_search_flow() {
    let server = create_test_server();

    let response = server.post("/search/image").multipart(image_form()).await;
    response.assert_status_ok();
    let view: Value = response.json();
    assert_eq!(view["selected_file"], "photo.jpg");
    assert_eq!(view["can_submit"], true);

    let response = server.post("/search/submit").await;
    response.assert_status_ok();
    let view: Value = response.json();

    let recommendations = view["recommendations"].as_array().unwrap();
    assert_eq!(recommendations.len(), 3);
    assert_eq!(recommendations[0]["name"], "Striped Linen Shirt");
    assert_eq!(recommendations[0]["price_label"], "$29.99");
    assert_eq!(recommendations[0]["image"], "http://cdn/r1.png");
    assert_eq!(view["upload"]["status"], "succeeded");
    assert_eq!(view["upload"]["count"], 3);
    assert!(view["selected_file"].is_null());

    let view: Value = server.post("/search/upload-status/dismiss").await.json();
    assert_eq!(view["upload"]["status"], "idle");
    assert_eq!(view["recommendations"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_select_image_requires_image_field() {
    let server = create_test_server();

    let form = MultipartForm::new().add_text("comment", "no file here");
    let response = server.post("/search/image").multipart(form).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_select_large_phone_photo() {
    let server = create_test_server();

    let form = MultipartForm::new().add_part(
        "image",
        Part::bytes(vec![0xAB; 3 * 1024 * 1024])
            .file_name("IMG_0042.jpg")
            .mime_type("image/jpeg"),
    );
    let response = server.post("/search/image").multipart(form).await;
    response.assert_status_ok();
    let view: Value = response.json();
    assert_eq!(view["selected_file"], "IMG_0042.jpg");
    assert_eq!(view["can_submit"], true);
}

#[tokio::test]
async fn test_select_image_over_limit_is_rejected() {
    let state = create_state(Arc::new(FixedRecommender {
        products: recommended_products(),
    }))
    .with_max_upload_bytes(1024 * 1024);
    let server = TestServer::new(create_router(state)).unwrap();

    let form = MultipartForm::new().add_part(
        "image",
        Part::bytes(vec![0xAB; 2 * 1024 * 1024])
            .file_name("huge.jpg")
            .mime_type("image/jpeg"),
    );
    let response = server.post("/search/image").multipart(form).await;
    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);

    let view: Value = server.get("/search").await.json();
    assert!(view["selected_file"].is_null());
}

#[tokio::test]
async fn test_select_image_rejects_non_image_content_type() {
    let server = create_test_server();

    let form = MultipartForm::new().add_part(
        "image",
        Part::bytes(b"hello".to_vec())
            .file_name("notes.txt")
            .mime_type("text/plain"),
    );
    let response = server.post("/search/image").multipart(form).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let view: Value = server.get("/search").await.json();
    assert!(view["selected_file"].is_null());
    assert_eq!(view["can_submit"], false);
}

#[tokio::test]
async fn test_failed_upload_is_reported_in_view() {
    let server = create_test_server_with(Arc::new(BrokenRecommender));

    server.post("/search/image").multipart(image_form()).await;
    let response = server.post("/search/submit").await;
    response.assert_status_ok();
    let view: Value = response.json();

    assert_eq!(view["upload"]["status"], "failed");
    assert!(view["upload"]["message"].as_str().unwrap().contains("500"));
    assert_eq!(view["recommendations"].as_array().unwrap().len(), 0);
    assert!(view["selected_file"].is_null());
}

#[tokio::test]
async fn test_second_submit_while_uploading_conflicts() {
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let server = create_test_server_with(Arc::new(GatedRecommender {
        started: started.clone(),
        release: release.clone(),
    }));

    server.post("/search/image").multipart(image_form()).await;

    let first = async { server.post("/search/submit").await };
    let second = async {
        started.notified().await;

        // The page stays readable while the upload is in flight
        let view: Value = server.get("/search").await.json();
        assert_eq!(view["upload"]["status"], "uploading");

        server.post("/search/image").multipart(image_form()).await;
        let response = server.post("/search/submit").await;
        release.notify_one();
        response
    };

    let (first, second) = tokio::join!(first, second);

    second.assert_status(StatusCode::CONFLICT);
    first.assert_status_ok();
    let view: Value = first.json();
    assert_eq!(view["recommendations"][0]["name"], "Gated Result");
    // The selection made during the upload is still pending
    assert_eq!(view["selected_file"], "photo.jpg");
}

#[tokio::test]
async fn test_dropped_submit_does_not_block_later_uploads() {
    let state = create_state(Arc::new(SilentRecommender));
    state.coordinator.write().await.select_file(
        ImageUpload::new("photo.jpg", vec![0xFF, 0xD8]).with_content_type("image/jpeg"),
    );

    // The client gives up while the service is still working
    let timed_out = tokio::time::timeout(
        Duration::from_millis(50),
        handlers::submit_search(State(state.clone())),
    )
    .await;
    assert!(timed_out.is_err());

    let upload = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let upload = state.coordinator.read().await.upload_state().clone();
            if !upload.is_uploading() {
                return upload;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    match upload {
        UploadState::Failed { message, .. } => assert!(message.contains("cancelled")),
        other => panic!("expected failed upload, got {:?}", other),
    }

    let server = TestServer::new(create_router(state.clone())).unwrap();
    let view: Value = server.post("/search/upload-status/dismiss").await.json();
    assert_eq!(view["upload"]["status"], "idle");

    server.post("/search/image").multipart(image_form()).await;
    let mut coordinator = state.coordinator.write().await;
    assert!(matches!(coordinator.begin_upload(), BeginUpload::Started(_)));
}

#[tokio::test]
async fn test_wishlist_add_and_remove() {
    let server = create_test_server();

    let response = server
        .post("/wishlist")
        .json(&json!({ "id": "aaaaa", "size": "S" }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let response = server
        .post("/wishlist")
        .json(&json!({ "id": "aaaaa", "size": "S" }))
        .await;
    response.assert_status_ok();
    let items: Vec<Value> = response.json();
    assert_eq!(items.len(), 1);

    let items: Vec<Value> = server
        .post("/wishlist")
        .json(&json!({ "id": "aaaac" }))
        .await
        .json();
    assert_eq!(items[1], json!({ "id": "aaaac", "size": "default" }));

    let items: Vec<Value> = server
        .delete("/wishlist")
        .json(&json!({ "id": "aaaaa", "size": "S" }))
        .await
        .json();
    assert_eq!(items, vec![json!({ "id": "aaaac", "size": "default" })]);

    let items: Vec<Value> = server.get("/wishlist").await.json();
    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn test_toggle_catalog_product() {
    let server = create_test_server();

    let response = server
        .post("/wishlist/toggle")
        .json(&json!({ "id": "aaaab" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, json!({ "id": "aaaab", "size": "M", "wishlisted": true }));

    let view: Value = server
        .put("/search/query")
        .json(&json!({ "query": "pure cotton" }))
        .await
        .json();
    assert_eq!(view["results"]["items"][0]["wishlisted"], true);
    assert_eq!(view["results"]["items"][1]["wishlisted"], false);

    let body: Value = server
        .post("/wishlist/toggle")
        .json(&json!({ "id": "aaaab" }))
        .await
        .json();
    assert_eq!(body["wishlisted"], false);
}

#[tokio::test]
async fn test_toggle_recommended_product() {
    let server = create_test_server();

    let response = server
        .post("/wishlist/toggle")
        .json(&json!({ "id": "r2" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    server.post("/search/image").multipart(image_form()).await;
    server.post("/search/submit").await;

    let body: Value = server
        .post("/wishlist/toggle")
        .json(&json!({ "id": "r2" }))
        .await
        .json();
    assert_eq!(body, json!({ "id": "r2", "size": "default", "wishlisted": true }));

    let view: Value = server.get("/search").await.json();
    assert_eq!(view["recommendations"][1]["wishlisted"], true);

    let items: Vec<Value> = server.get("/wishlist").await.json();
    assert_eq!(items, vec![json!({ "id": "r2", "size": "default" })]);
}
