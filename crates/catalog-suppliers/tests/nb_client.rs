//! Integration tests for `NbClient` against a `wiremock` server.
//!
//! Covers login, bearer-token reuse and refresh, the 401 re-login path and
//! error propagation for the feed endpoints.

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use catalog_core::NbCredentials;
use catalog_suppliers::{NbClient, SupplierError};

fn test_client(base_url: &str, refresh_every: u32) -> NbClient {
    NbClient::new(
        base_url,
        NbCredentials {
            user: "api-user".to_owned(),
            password: "s3cret".to_owned(),
        },
        5,
        "catalog-test/0.1",
        0,
        0,
        refresh_every,
    )
    .expect("failed to build test NbClient")
}

async fn mount_login(server: &MockServer, token: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_string_contains("user=api-user"))
        .and(body_string_contains("mode=api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": token })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn product_json(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "title": "Teclado Genius KB-110",
        "sku": "31300700",
        "mainImage": "https://static.nb.com.ar/i/nb_teclado_ver_1",
        "stock": "Medio",
        "amountStock": 8,
        "price": { "value": 4.1, "finalPrice": 4.96, "iva": 21 },
        "cotizacion": 1150,
        "categoryId": 9,
        "category": "Teclados",
        "brandId": 2,
        "brand": "Genius"
    })
}

// ---------------------------------------------------------------------------
// Login and product feed
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_products_logs_in_and_sends_bearer_token() {
    let server = MockServer::start().await;
    mount_login(&server, "tok-1", 1).await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([product_json(11)])))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 25);
    let products = client.fetch_products().await.expect("feed parses");

    assert_eq!(products.len(), 1);
    let product = &products.items[0];
    assert_eq!(product.id, 11);
    assert_eq!(product.brand.as_deref(), Some("Genius"));
    assert_eq!(product.price.as_ref().and_then(|p| p.final_price), Some(4.96));
}

#[tokio::test]
async fn malformed_feed_entries_are_rejected_one_by_one() {
    let server = MockServer::start().await;
    mount_login(&server, "tok-1", 1).await;

    let mut stringly = product_json(13);
    stringly["amountStock"] = json!("7");
    stringly["price"]["finalPrice"] = json!("10.25");
    let mut untitled = product_json(12);
    untitled["title"] = serde_json::Value::Null;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([product_json(11), untitled, stringly])),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 25);
    let feed = client.fetch_products().await.expect("feed parses");

    let ids: Vec<i64> = feed.items.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![11, 13]);
    assert_eq!(feed.items[1].amount_stock, Some(7.0));
    assert_eq!(
        feed.items[1].price.as_ref().and_then(|p| p.final_price),
        Some(10.25)
    );
    assert_eq!(feed.rejected.len(), 1);
    assert_eq!(feed.rejected[0].external_id, Some(12));
}

#[tokio::test]
async fn login_failure_is_reported_as_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 25);
    let err = client.fetch_products().await.unwrap_err();
    assert!(matches!(err, SupplierError::Auth { .. }), "got {err:?}");
}

#[tokio::test]
async fn login_without_token_is_reported_as_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 25);
    let err = client.login().await.unwrap_err();
    assert!(matches!(err, SupplierError::Auth { .. }), "got {err:?}");
}

// ---------------------------------------------------------------------------
// Token lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn token_is_reacquired_after_refresh_every_requests() {
    let server = MockServer::start().await;
    // 3 requests with refresh_every = 2 → login before request 1 and 3.
    mount_login(&server, "tok-1", 2).await;

    Mock::given(method("GET"))
        .and(path("/brands"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 2, "description": "Genius", "imagen": null }
        ])))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 2);
    for _ in 0..3 {
        let brands = client.fetch_brands().await.expect("brands parse");
        assert_eq!(brands[0].description, "Genius");
    }
}

#[tokio::test]
async fn unauthorized_response_forces_relogin_and_single_retry() {
    let server = MockServer::start().await;
    mount_login(&server, "tok-1", 2).await;

    Mock::given(method("GET"))
        .and(path("/categories"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 9, "description": "Teclados", "initialB": 1, "initialC": 0 }
        ])))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 25);
    let categories = client.fetch_categories().await.expect("retry succeeds");
    assert_eq!(categories[0].initial_b, Some(1));
}

// ---------------------------------------------------------------------------
// Item detail
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_item_parses_images_and_attributes() {
    let server = MockServer::start().await;
    mount_login(&server, "tok-1", 1).await;

    Mock::given(method("GET"))
        .and(path("/item/11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "images": [{ "checksum": "aa11", "order": 0 }, { "checksum": "bb22", "order": 1 }],
            "description": { "value": "Teclado USB" },
            "attributes": [{ "name": "Conexión", "value": "USB" }, { "name": "", "value": "x" }]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 25);
    let item = client
        .fetch_item(11)
        .await
        .expect("request ok")
        .expect("item present");
    assert_eq!(item.images.len(), 2);
    assert_eq!(item.images[1].checksum, "bb22");
    assert_eq!(
        item.description.and_then(|d| d.value).as_deref(),
        Some("Teclado USB")
    );
    assert_eq!(item.attributes.len(), 2);
}

#[tokio::test]
async fn fetch_item_returns_none_on_404() {
    let server = MockServer::start().await;
    mount_login(&server, "tok-1", 1).await;

    Mock::given(method("GET"))
        .and(path("/item/999"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 25);
    assert!(client.fetch_item(999).await.expect("404 is not an error").is_none());
}

// ---------------------------------------------------------------------------
// Error propagation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn malformed_feed_is_a_deserialize_error() {
    let server = MockServer::start().await;
    mount_login(&server, "tok-1", 1).await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 25);
    let err = client.fetch_products().await.unwrap_err();
    assert!(matches!(err, SupplierError::Deserialize { .. }), "got {err:?}");
}

#[tokio::test]
async fn server_error_is_retried_then_surfaced() {
    let server = MockServer::start().await;
    mount_login(&server, "tok-1", 1).await;

    Mock::given(method("GET"))
        .and(path("/brands"))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&server)
        .await;

    let client = NbClient::new(
        &server.uri(),
        NbCredentials {
            user: "api-user".to_owned(),
            password: "s3cret".to_owned(),
        },
        5,
        "catalog-test/0.1",
        2,
        0,
        25,
    )
    .expect("client builds");
    let err = client.fetch_brands().await.unwrap_err();
    assert!(matches!(
        err,
        SupplierError::UnexpectedStatus { status: 502, .. }
    ));
}
