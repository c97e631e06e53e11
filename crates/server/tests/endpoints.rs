use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::Utc;
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::{Account, AccountKind, Engine, InstituteType, NewAccount};
use migration::MigratorTrait;

struct TestApp {
    router: Router,
    engine: Engine,
}

async fn test_app() -> TestApp {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db.clone()).build().await.unwrap();
    let served = Engine::builder().database(db).build().await.unwrap();
    TestApp {
        router: server::router(served),
        engine,
    }
}

impl TestApp {
    async fn account(&self, username: &str, kind: AccountKind) -> Account {
        let mut cmd = NewAccount::new(username, "secret", kind);
        if kind == AccountKind::Institute {
            cmd = cmd.institute_type(InstituteType::Masjid);
        }
        self.engine.create_account(cmd, Utc::now()).await.unwrap()
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        username: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(username) = username {
            let credentials = STANDARD.encode(format!("{username}:secret"));
            builder = builder.header(header::AUTHORIZATION, format!("Basic {credentials}"));
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
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn create_request(&self, institute: &str, prices: &[i64]) -> Value {
        let items: Vec<Value> = prices
            .iter()
            .map(|price| json!({ "title": format!("item {price}"), "quantity": 1, "price": price }))
            .collect();
        let (status, body) = self
            .send(
                Method::POST,
                "/donations",
                Some(institute),
                Some(json!({
                    "title": "Ramadan iftar",
                    "description": "Food for the evening meal",
                    "items": items,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }
}

#[tokio::test]
async fn health_is_public() {
    let app = test_app().await;
    let (status, _) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn writes_require_credentials() {
    let app = test_app().await;
    app.account("masjid", AccountKind::Institute).await;

    let body = json!({ "title": "t", "description": "d", "items": [] });
    let (status, _) = app
        .send(Method::POST, "/donations", None, Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(Method::POST, "/donations", Some("nobody"), Some(body))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn institute_creates_and_anyone_reads_requests() {
    let app = test_app().await;
    app.account("masjid", AccountKind::Institute).await;

    let created = app.create_request("masjid", &[30, 10, 50]).await;
    assert_eq!(created["total_price"], 90);
    assert_eq!(created["amount_received"], 0);
    assert_eq!(created["status"], "open");
    assert_eq!(created["items"][0]["status"], "pending");

    let id = created["id"].as_str().unwrap();
    let (status, fetched) = app
        .send(Method::GET, &format!("/donations/{id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], created["id"]);

    let (status, listed) = app
        .send(Method::GET, "/donations?status=open", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn users_cannot_create_requests() {
    let app = test_app().await;
    app.account("zaid", AccountKind::User).await;

    let (status, body) = app
        .send(
            Method::POST,
            "/donations",
            Some("zaid"),
            Some(json!({ "title": "t", "description": "d", "items": [] })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn unknown_request_is_404() {
    let app = test_app().await;
    let id = uuid::Uuid::new_v4();
    let (status, _) = app
        .send(Method::GET, &format!("/donations/{id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_items_are_422() {
    let app = test_app().await;
    app.account("masjid", AccountKind::Institute).await;

    let (status, _) = app
        .send(
            Method::POST,
            "/donations",
            Some("masjid"),
            Some(json!({
                "title": "Carpets",
                "description": "Prayer hall",
                "items": [{ "title": "carpet", "quantity": 0, "price": 100 }],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn item_status_follows_actor_roles() {
    let app = test_app().await;
    app.account("masjid", AccountKind::Institute).await;
    app.account("zaid", AccountKind::User).await;
    app.account("amina", AccountKind::User).await;
    app.account("root", AccountKind::Admin).await;

    let created = app.create_request("masjid", &[25]).await;
    let id = created["id"].as_str().unwrap();
    let item_id = created["items"][0]["id"].as_str().unwrap();
    let uri = format!("/donations/{id}/items/{item_id}/status");

    let (status, item) = app
        .send(Method::PUT, &uri, Some("zaid"), Some(json!({ "status": "taken" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["status"], "taken");
    assert_eq!(item["updated_by"], "user");

    let (status, _) = app
        .send(Method::PUT, &uri, Some("amina"), Some(json!({ "status": "taken" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(Method::PUT, &uri, Some("amina"), Some(json!({ "status": "pending" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(Method::PUT, &uri, Some("root"), Some(json!({ "status": "pending" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, item) = app
        .send(Method::PUT, &uri, Some("masjid"), Some(json!({ "status": "fulfilled" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["status"], "fulfilled");
    assert_eq!(item["updated_by"], "institute");
}

#[tokio::test]
async fn unknown_item_status_is_a_json_400() {
    let app = test_app().await;
    app.account("masjid", AccountKind::Institute).await;
    app.account("zaid", AccountKind::User).await;

    let created = app.create_request("masjid", &[25]).await;
    let id = created["id"].as_str().unwrap();
    let item_id = created["items"][0]["id"].as_str().unwrap();
    let uri = format!("/donations/{id}/items/{item_id}/status");

    let (status, body) = app
        .send(Method::PUT, &uri, Some("zaid"), Some(json!({ "status": "shipped" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some_and(|msg| msg.contains("shipped")));

    let (status, body) = app
        .send(Method::PUT, &uri, Some("zaid"), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (_, stored) = app
        .send(Method::GET, &format!("/donations/{id}"), None, None)
        .await;
    assert_eq!(stored["items"][0]["status"], "pending");
}

#[tokio::test]
async fn donation_credits_wallet_and_request() {
    let app = test_app().await;
    let masjid = app.account("masjid", AccountKind::Institute).await;
    app.account("zaid", AccountKind::User).await;

    let created = app.create_request("masjid", &[30, 10, 50]).await;
    let request_id = created["id"].as_str().unwrap();

    let (status, tx) = app
        .send(
            Method::POST,
            &format!("/transactions/pay/{}", masjid.id),
            Some("zaid"),
            Some(json!({
                "type": "donation",
                "amount_minor": 40,
                "external_id": "pay_123",
                "donation_request_id": request_id,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(tx["status"], "accepted");
    assert_eq!(tx["type"], "donation");

    let (_, request) = app
        .send(Method::GET, &format!("/donations/{request_id}"), None, None)
        .await;
    assert_eq!(request["amount_received"], 40);
    let collected = request["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|item| item["status"] == "collected")
        .count();
    assert_eq!(collected, 2);

    let (status, wallet) = app
        .send(Method::GET, &format!("/wallets/{}", masjid.id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(wallet["balance_minor"], 40);
    assert_eq!(wallet["transactions"].as_array().map(Vec::len), Some(1));

    let (status, history) = app
        .send(Method::GET, "/transactions", Some("zaid"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history[0]["external_id"], "pay_123");
}

#[tokio::test]
async fn withdraw_is_reviewed_by_an_admin() {
    let app = test_app().await;
    let masjid = app.account("masjid", AccountKind::Institute).await;
    app.account("zaid", AccountKind::User).await;
    app.account("root", AccountKind::Admin).await;

    let (status, _) = app
        .send(
            Method::POST,
            "/transactions/withdraw",
            Some("masjid"),
            Some(json!({ "amount_minor": 10 })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    app.send(
        Method::POST,
        &format!("/transactions/pay/{}", masjid.id),
        Some("zaid"),
        Some(json!({ "type": "payment", "amount_minor": 100 })),
    )
    .await;

    let (status, withdraw) = app
        .send(
            Method::POST,
            "/transactions/withdraw",
            Some("masjid"),
            Some(json!({ "amount_minor": 60 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(withdraw["status"], "pending");
    let withdraw_id = withdraw["id"].as_str().unwrap();

    let (status, _) = app
        .send(Method::GET, "/admin/withdraw-requests", Some("masjid"), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, queue) = app
        .send(
            Method::GET,
            "/admin/withdraw-requests?status=pending",
            Some("root"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(queue.as_array().map(Vec::len), Some(1));

    let uri = format!("/admin/withdraw-requests/{withdraw_id}");
    let (status, reviewed) = app
        .send(Method::PUT, &uri, Some("root"), Some(json!({ "decision": "accept" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reviewed["status"], "accepted");

    let (status, _) = app
        .send(Method::PUT, &uri, Some("root"), Some(json!({ "decision": "cancel" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, wallet) = app
        .send(Method::GET, &format!("/wallets/{}", masjid.id), None, None)
        .await;
    assert_eq!(wallet["balance_minor"], 40);
    assert_eq!(wallet["total_withdrawn_minor"], 60);
}

#[tokio::test]
async fn wallet_activation_round_trip() {
    let app = test_app().await;
    let masjid = app.account("masjid", AccountKind::Institute).await;
    app.account("root", AccountKind::Admin).await;

    let details = json!({
        "bank_name": "State Bank",
        "account_holder_name": "Masjid Trust",
        "account_number": "123456789",
        "confirm_account_number": "123456789",
        "ifsc_code": "SBIN0000001",
        "finance_mobile": "9876543210",
    });
    let (status, request) = app
        .send(
            Method::POST,
            "/wallets/activation",
            Some("masjid"),
            Some(details.clone()),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .send(Method::POST, "/wallets/activation", Some("masjid"), Some(details))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let uri = format!(
        "/admin/wallet-activation-requests/{}",
        request["id"].as_str().unwrap()
    );
    let (status, reviewed) = app
        .send(Method::PUT, &uri, Some("root"), Some(json!({ "decision": "accept" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reviewed["status"], "accepted");

    let (_, wallet) = app
        .send(Method::GET, &format!("/wallets/{}", masjid.id), None, None)
        .await;
    assert_eq!(wallet["is_active"], true);
    assert_eq!(wallet["activation_status"], "accepted");
    assert_eq!(wallet["bank_details"]["ifsc_code"], "SBIN0000001");
}

#[tokio::test]
async fn follow_round_trip() {
    let app = test_app().await;
    let masjid = app.account("masjid", AccountKind::Institute).await;
    let zaid = app.account("zaid", AccountKind::User).await;

    let follow_uri = format!("/follows/{}", masjid.id);
    let (status, _) = app.send(Method::POST, &follow_uri, Some("zaid"), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app.send(Method::POST, &follow_uri, Some("zaid"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = app.send(Method::POST, &follow_uri, Some("masjid"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, following) = app.send(Method::GET, "/follows", Some("zaid"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(following[0]["id"], masjid.id.to_string());
    assert_eq!(following[0]["institute_type"], "masjid");

    let followers_uri = format!("/institutes/{}/followers", masjid.id);
    let (status, followers) = app.send(Method::GET, &followers_uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(followers[0]["username"], "zaid");

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/followers/{}", zaid.id),
            Some("masjid"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, followers) = app.send(Method::GET, &followers_uri, None, None).await;
    assert_eq!(followers.as_array().map(Vec::len), Some(0));

    let (status, _) = app.send(Method::DELETE, &follow_uri, Some("zaid"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .send(
            Method::GET,
            &format!("/institutes/{}/followers", uuid::Uuid::new_v4()),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn posts_with_comments_and_reactions() {
    let app = test_app().await;
    app.account("masjid", AccountKind::Institute).await;
    app.account("madrasa", AccountKind::Institute).await;
    app.account("zaid", AccountKind::User).await;
    app.account("root", AccountKind::Admin).await;

    let (status, post) = app
        .send(
            Method::POST,
            "/posts",
            Some("masjid"),
            Some(json!({ "type": "notice", "title": "Taraweeh", "location": "Main hall" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(post["status"], "active");
    let id = post["id"].as_str().unwrap();

    let (status, _) = app
        .send(
            Method::POST,
            "/posts",
            Some("zaid"),
            Some(json!({ "type": "notice", "title": "Mine" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, comment) = app
        .send(
            Method::POST,
            &format!("/posts/{id}/comments"),
            Some("zaid"),
            Some(json!({ "text": "Which rakat count?" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["author"]["role"], "user");
    let comment_id = comment["id"].as_str().unwrap();

    let (status, reply) = app
        .send(
            Method::POST,
            &format!("/posts/{id}/comments/{comment_id}/replies"),
            Some("masjid"),
            Some(json!({ "text": "Twenty" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reply["author"]["role"], "institute");

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/posts/{id}/comments"),
            Some("root"),
            Some(json!({ "text": "hi" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, like) = app
        .send(Method::PUT, &format!("/posts/{id}/like"), Some("zaid"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(like, json!({ "liked": true, "likes": 1 }));

    let (status, share) = app
        .send(
            Method::POST,
            &format!("/posts/{id}/shares"),
            Some("zaid"),
            Some(json!({})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(share["shares"], 1);

    let (status, fetched) = app
        .send(Method::GET, &format!("/posts/{id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["likes"], 1);
    assert_eq!(fetched["shares"], 1);
    assert_eq!(fetched["comments"][0]["replies"][0]["text"], "Twenty");

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/posts/{id}"),
            Some("madrasa"),
            Some(json!({ "title": "Taken over" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, moderated) = app
        .send(
            Method::PUT,
            &format!("/admin/posts/{id}/status"),
            Some("root"),
            Some(json!({ "status": "inactive" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moderated["status"], "inactive");

    let (_, listed) = app.send(Method::GET, "/posts", None, None).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(0));

    let (status, _) = app
        .send(Method::PUT, &format!("/posts/{id}/like"), Some("zaid"), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(Method::DELETE, &format!("/posts/{id}"), Some("masjid"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app
        .send(Method::GET, &format!("/posts/{id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn feed_leaves_out_blocked_posts() {
    let app = test_app().await;
    app.account("masjid", AccountKind::Institute).await;
    app.account("zaid", AccountKind::User).await;

    let (_, post) = app
        .send(
            Method::POST,
            "/posts",
            Some("masjid"),
            Some(json!({ "type": "quran", "title": "Surah Al-Kahf" })),
        )
        .await;
    let id = post["id"].as_str().unwrap();

    let (status, feed) = app.send(Method::GET, "/posts/feed", Some("zaid"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feed.as_array().map(Vec::len), Some(1));

    let (status, _) = app
        .send(Method::PUT, &format!("/posts/{id}/block"), Some("zaid"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, feed) = app.send(Method::GET, "/posts/feed", Some("zaid"), None).await;
    assert_eq!(feed.as_array().map(Vec::len), Some(0));
    let (_, public) = app.send(Method::GET, "/posts", None, None).await;
    assert_eq!(public.as_array().map(Vec::len), Some(1));

    let (status, _) = app
        .send(Method::DELETE, &format!("/posts/{id}/block"), Some("zaid"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, feed) = app.send(Method::GET, "/posts/feed", Some("zaid"), None).await;
    assert_eq!(feed.as_array().map(Vec::len), Some(1));
}
