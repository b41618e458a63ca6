//! End-to-end tests: the full router over an in-memory store.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use shopfloor_api::{build_router, AppState};
use shopfloor_core::{AuthConfig, CredentialService, NewAccount, Role};
use shopfloor_db::{Database, DbConfig};

const ADMIN_EMAIL: &str = "admin@shopfloor.local";
const ADMIN_PASSWORD: &str = "admin-pass";

struct TestApp {
    router: Router,
    db: Database,
    credentials: CredentialService,
}

impl TestApp {
    async fn new() -> Self {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let credentials = CredentialService::new(&AuthConfig::new("http-test-secret")).unwrap();

        let admin = NewAccount {
            email: ADMIN_EMAIL.to_string(),
            password: ADMIN_PASSWORD.to_string(),
            first_name: "Admin".to_string(),
            last_name: None,
            role: Role::Admin,
        }
        .validated()
        .unwrap();
        db.accounts().create(admin, &credentials).await.unwrap();

        let router = build_router(AppState::new(db.clone(), credentials.clone()));
        TestApp {
            router,
            db,
            credentials,
        }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    async fn admin_token(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    async fn register(&self, email: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({
                    "email": email,
                    "password": "customer-pass",
                    "first_name": "Casey",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    async fn create_item(&self, token: &str, name: &str, quantity: i64, price_cents: i64) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/items",
                Some(token),
                Some(json!({ "name": name, "quantity": quantity, "price_cents": price_cents })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}

// =============================================================================
// Service
// =============================================================================

#[tokio::test]
async fn test_root_and_health() {
    let app = TestApp::new().await;

    let (status, body) = app.send(Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "shopfloor-api");

    let (status, body) = app.send(Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["migrations"], "1/1");
}

#[tokio::test]
async fn test_health_reports_pending_migrations() {
    let db = Database::new(DbConfig::in_memory().run_migrations(false))
        .await
        .unwrap();
    let credentials = CredentialService::new(&AuthConfig::new("http-test-secret")).unwrap();
    let router = build_router(AppState::new(db, credentials));

    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["database"], "connected");
    assert_eq!(body["migrations"], "0/1");
}

#[tokio::test]
async fn test_health_reports_unreachable_store() {
    let app = TestApp::new().await;
    app.db.close().await;

    let (status, body) = app.send(Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["database"], "unreachable");
    assert!(body.get("migrations").is_none());
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn test_register_login_profile() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "email": "Casey@Example.com",
                "password": "customer-pass",
                "first_name": "Casey",
                "last_name": "Jones",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["account"]["email"], "casey@example.com");
    assert_eq!(body["account"]["role"], "customer");
    assert!(body["account"].get("password_hash").is_none());

    let token = app.login("casey@example.com", "customer-pass").await;
    let (status, body) = app
        .send(Method::GET, "/api/auth/profile", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "casey@example.com");
    assert_eq!(body["last_name"], "Jones");
    assert!(!body["last_access_at"].is_null());
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = TestApp::new().await;
    app.register("casey@example.com").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "email": "CASEY@example.com",
                "password": "another-pass",
                "first_name": "Other",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_login_failures_are_uniform() {
    let app = TestApp::new().await;
    app.register("casey@example.com").await;

    let (wrong_status, wrong_body) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "casey@example.com", "password": "nope-nope" })),
        )
        .await;
    let (unknown_status, unknown_body) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ghost@example.com", "password": "nope-nope" })),
        )
        .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_bad_tokens_are_rejected() {
    let app = TestApp::new().await;

    let (status, _) = app.send(Method::GET, "/api/auth/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(Method::GET, "/api/auth/profile", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let expired = app
        .credentials
        .issue_token_with_ttl(ADMIN_EMAIL, -120)
        .unwrap();
    let (status, _) = app
        .send(Method::GET, "/api/auth/profile", Some(&expired), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Valid signature, but nobody has this email.
    let orphan = app.credentials.issue_token("ghost@example.com").unwrap();
    let (status, _) = app
        .send(Method::GET, "/api/auth/profile", Some(&orphan), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_inactive_account_token_is_forbidden() {
    let app = TestApp::new().await;
    let token = app.register("casey@example.com").await;

    let account = app
        .db
        .accounts()
        .get_by_email("casey@example.com")
        .await
        .unwrap()
        .unwrap();
    app.db.accounts().set_active(&account.id, false).await.unwrap();

    let (status, body) = app
        .send(Method::GET, "/api/auth/profile", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Account is inactive");
}

// =============================================================================
// Items
// =============================================================================

#[tokio::test]
async fn test_item_writes_require_admin() {
    let app = TestApp::new().await;
    let customer = app.register("casey@example.com").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/items",
            Some(&customer),
            Some(json!({ "name": "Widget", "quantity": 10, "price_cents": 250 })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/items",
            None,
            Some(json!({ "name": "Widget", "quantity": 10, "price_cents": 250 })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_item_crud() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let widget = app.create_item(&admin, "Widget", 10, 250).await;
    let widget_id = id_of(&widget);
    assert_eq!(widget["quantity"], 10);

    let (status, body) = app
        .send(Method::GET, &format!("/api/items/{widget_id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Widget");

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/items/{widget_id}"),
            Some(&admin),
            Some(json!({ "price_cents": 300 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price_cents"], 300);
    assert_eq!(body["quantity"], 10);

    let (status, body) = app
        .send(Method::DELETE, &format!("/api/items/{widget_id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (status, body) = app
        .send(Method::GET, &format!("/api/items/{widget_id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_item_validation_and_name_conflicts() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    app.create_item(&admin, "Widget", 10, 250).await;
    let gadget = app.create_item(&admin, "Gadget", 5, 900).await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/items",
            Some(&admin),
            Some(json!({ "name": "Widget", "quantity": 1, "price_cents": 100 })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/items/{}", id_of(&gadget)),
            Some(&admin),
            Some(json!({ "name": "Widget" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    for bad in [
        json!({ "name": "Free", "quantity": 1, "price_cents": 0 }),
        json!({ "name": "Negative", "quantity": -1, "price_cents": 100 }),
        json!({ "name": "   ", "quantity": 1, "price_cents": 100 }),
    ] {
        let (status, body) = app.send(Method::POST, "/api/items", Some(&admin), Some(bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_item_listing_search_and_pagination() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    for name in ["Blue Widget", "Gadget", "Red Widget"] {
        app.create_item(&admin, name, 1, 100).await;
    }

    let (status, body) = app.send(Method::GET, "/api/items", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
    assert_eq!(body[0]["name"], "Red Widget");

    let (status, body) = app
        .send(Method::GET, "/api/items?search=widget", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Blue Widget", "Red Widget"]);

    let (_, body) = app
        .send(Method::GET, "/api/items?offset=1&limit=1", None, None)
        .await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "Gadget");

    for query in ["limit=0", "limit=1001", "offset=-1", "limit=abc"] {
        let (status, body) = app
            .send(Method::GET, &format!("/api/items?{query}"), None, None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{query}");
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn test_widget_order_scenario() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let customer = app.register("casey@example.com").await;
    let widget_id = id_of(&app.create_item(&admin, "Widget", 10, 250).await);

    let (status, order) = app
        .send(
            Method::POST,
            "/api/orders",
            Some(&customer),
            Some(json!({
                "items": [{ "item_id": widget_id, "quantity": 4 }],
                "shipping_address": "1 Main St",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{order}");
    assert_eq!(order["total_cents"], 1000);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["account_email"], "casey@example.com");
    assert_eq!(order["lines"][0]["item_name"], "Widget");
    assert_eq!(order["lines"][0]["unit_price_cents"], 250);
    assert_eq!(order["lines"][0]["subtotal_cents"], 1000);

    let (_, item) = app
        .send(Method::GET, &format!("/api/items/{widget_id}"), None, None)
        .await;
    assert_eq!(item["quantity"], 6);
}

#[tokio::test]
async fn test_order_rejections() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let customer = app.register("casey@example.com").await;
    let widget_id = id_of(&app.create_item(&admin, "Widget", 10, 250).await);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/orders",
            Some(&customer),
            Some(json!({ "items": [{ "item_id": widget_id, "quantity": 11 }] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("available 10"), "{message}");
    assert!(message.contains("requested 11"), "{message}");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/orders",
            Some(&customer),
            Some(json!({ "items": [{ "item_id": "no-such-item", "quantity": 1 }] })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/orders",
            Some(&customer),
            Some(json!({ "items": [] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/orders",
            None,
            Some(json!({ "items": [{ "item_id": widget_id, "quantity": 1 }] })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Nothing moved.
    let (_, item) = app
        .send(Method::GET, &format!("/api/items/{widget_id}"), None, None)
        .await;
    assert_eq!(item["quantity"], 10);
    let (_, stats) = app.send(Method::GET, "/api/stats", None, None).await;
    assert_eq!(stats["total_orders"], 0);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new().await;
    let customer = app.register("casey@example.com").await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/orders")
        .header(header::AUTHORIZATION, format!("Bearer {customer}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_order_visibility() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let casey = app.register("casey@example.com").await;
    let robin = app.register("robin@example.com").await;
    let widget_id = id_of(&app.create_item(&admin, "Widget", 10, 250).await);

    let place = |token: String| {
        let body = json!({ "items": [{ "item_id": widget_id.clone(), "quantity": 1 }] });
        let app = &app;
        async move { app.send(Method::POST, "/api/orders", Some(&token), Some(body)).await }
    };
    let (_, caseys_order) = place(casey.clone()).await;
    let (_, robins_order) = place(robin.clone()).await;

    let (status, body) = app.send(Method::GET, "/api/orders", Some(&casey), None).await;
    assert_eq!(status, StatusCode::OK);
    let mine = body.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["id"], caseys_order["id"]);

    let (_, body) = app.send(Method::GET, "/api/orders", Some(&admin), None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let robins_uri = format!("/api/orders/{}", id_of(&robins_order));
    let (status, _) = app.send(Method::GET, &robins_uri, Some(&casey), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.send(Method::GET, &robins_uri, Some(&robin), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.send(Method::GET, &robins_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(Method::GET, "/api/orders/no-such-order", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_order_status_updates() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let customer = app.register("casey@example.com").await;
    let widget_id = id_of(&app.create_item(&admin, "Widget", 10, 250).await);

    let (_, order) = app
        .send(
            Method::POST,
            "/api/orders",
            Some(&customer),
            Some(json!({ "items": [{ "item_id": widget_id, "quantity": 2 }] })),
        )
        .await;
    let status_uri = format!("/api/orders/{}/status", id_of(&order));

    let (status, _) = app
        .send(Method::PUT, &status_uri, Some(&customer), Some(json!({ "status": "shipped" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(Method::PUT, &status_uri, Some(&admin), Some(json!({ "status": "lost" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (_, current) = app
        .send(Method::GET, &format!("/api/orders/{}", id_of(&order)), Some(&admin), None)
        .await;
    assert_eq!(current["status"], "pending");

    let (status, body) = app
        .send(Method::PUT, &status_uri, Some(&admin), Some(json!({ "status": "shipped" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "shipped");
    assert_eq!(body["total_cents"], 500);

    let (status, _) = app
        .send(
            Method::PUT,
            "/api/orders/no-such-order/status",
            Some(&admin),
            Some(json!({ "status": "cancelled" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_referenced_item_delete_conflicts() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let customer = app.register("casey@example.com").await;
    let widget_id = id_of(&app.create_item(&admin, "Widget", 10, 250).await);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/orders",
            Some(&customer),
            Some(json!({ "items": [{ "item_id": widget_id, "quantity": 1 }] })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .send(Method::DELETE, &format!("/api/items/{widget_id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

// =============================================================================
// Accounts & stats
// =============================================================================

#[tokio::test]
async fn test_account_listing_is_admin_only() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let customer = app.register("casey@example.com").await;

    let (status, _) = app.send(Method::GET, "/api/accounts", Some(&customer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.send(Method::GET, "/api/accounts", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let accounts = body.as_array().unwrap();
    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[0]["email"], "casey@example.com");
    assert!(accounts.iter().all(|a| a.get("password_hash").is_none()));
}

#[tokio::test]
async fn test_stats() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    app.create_item(&admin, "Widget", 10, 250).await;
    app.create_item(&admin, "Gizmo", 0, 1250).await;

    let (status, body) = app.send(Method::GET, "/api/stats", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_items"], 2);
    assert_eq!(body["items_in_stock"], 1);
    assert_eq!(body["items_out_of_stock"], 1);
    assert_eq!(body["inventory_value_cents"], 2500);
    assert_eq!(body["total_accounts"], 1);
}
