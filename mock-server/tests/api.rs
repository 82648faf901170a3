use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, app_with_secret, API_PREFIX};
use serde_json::Value;
use tower::ServiceExt;

const TOKEN: &str = "Bearer test-token";

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get_request(path: &str) -> Request<String> {
    Request::builder()
        .uri(format!("{API_PREFIX}{path}"))
        .header(http::header::AUTHORIZATION, TOKEN)
        .body(String::new())
        .unwrap()
}

fn form_request(method: &str, path: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(format!("{API_PREFIX}{path}"))
        .header(http::header::AUTHORIZATION, TOKEN)
        .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(body.to_string())
        .unwrap()
}

fn delete_request(path: &str) -> Request<String> {
    Request::builder()
        .method("DELETE")
        .uri(format!("{API_PREFIX}{path}"))
        .header(http::header::AUTHORIZATION, TOKEN)
        .body(String::new())
        .unwrap()
}

/// Create an item and return its xid.
async fn create(app: &Router, segment: &str, body: &str) -> String {
    let resp = app
        .clone()
        .oneshot(form_request("POST", &format!("/users/@me/{segment}"), body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let json = body_json(resp).await;
    json["data"]["xid"].as_str().unwrap().to_string()
}

// --- auth ---

#[tokio::test]
async fn missing_bearer_returns_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri(format!("{API_PREFIX}/users/@me/moves"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(resp).await;
    assert_eq!(json["meta"]["code"], 401);
}

#[tokio::test]
async fn empty_bearer_returns_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri(format!("{API_PREFIX}/users/@me/moves"))
                .header(http::header::AUTHORIZATION, "Bearer ")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- list ---

#[tokio::test]
async fn list_moves_empty() {
    let resp = app().oneshot(get_request("/users/@me/moves?")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["meta"]["code"], 200);
    assert_eq!(json["data"]["size"], 0);
    assert!(json["data"]["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn list_unknown_segment_returns_404() {
    let resp = app().oneshot(get_request("/users/@me/todos")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_honours_limit() {
    let app = app();
    create(&app, "meals", "title=Breakfast").await;
    create(&app, "meals", "title=Lunch").await;
    let resp = app
        .clone()
        .oneshot(get_request("/users/@me/meals?limit=1"))
        .await
        .unwrap();
    let json = body_json(resp).await;
    assert_eq!(json["data"]["size"], 1);
    assert_eq!(json["data"]["items"][0]["title"], "Breakfast");
}

// --- create / get ---

#[tokio::test]
async fn create_then_get_sleep() {
    let app = app();
    let xid = create(&app, "sleeps", "time_created=1385877310&tz=America%2FToronto").await;

    let resp = app
        .clone()
        .oneshot(get_request(&format!("/sleeps/{xid}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["data"]["xid"], xid.as_str());
    assert_eq!(json["data"]["tz"], "America/Toronto");
}

#[tokio::test]
async fn create_without_form_content_type_is_rejected() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("{API_PREFIX}/users/@me/meals"))
                .header(http::header::AUTHORIZATION, TOKEN)
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(r#"{"title":"x"}"#.to_string())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn get_missing_item_returns_404() {
    let resp = app().oneshot(get_request("/moves/nope")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- sub-resources ---

#[tokio::test]
async fn sub_resources_of_existing_item() {
    let app = app();
    let xid = create(&app, "workouts", "sub_type=1").await;
    for sub in ["image", "snapshot", "ticks"] {
        let resp = app
            .clone()
            .oneshot(get_request(&format!("/workouts/{xid}/{sub}")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{sub}");
        let json = body_json(resp).await;
        assert_eq!(json["data"]["kind"], sub);
    }
}

#[tokio::test]
async fn unknown_sub_resource_returns_404() {
    let app = app();
    let xid = create(&app, "moves", "steps=10").await;
    let resp = app
        .oneshot(get_request(&format!("/moves/{xid}/heartrate")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- update ---

#[tokio::test]
async fn partial_update_merges_fields() {
    let app = app();
    let xid = create(&app, "meals", "title=Dinner&note=pasta").await;
    let resp = app
        .clone()
        .oneshot(form_request(
            "POST",
            &format!("/meals/{xid}/partialUpdate"),
            "note=risotto&xid=hijack",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["data"]["title"], "Dinner");
    assert_eq!(json["data"]["note"], "risotto");
    assert_eq!(json["data"]["xid"], xid.as_str());
}

#[tokio::test]
async fn partial_update_missing_item_returns_404() {
    let resp = app()
        .oneshot(form_request("POST", "/meals/ghost/partialUpdate", "note=x"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- delete ---

#[tokio::test]
async fn delete_then_get_returns_404() {
    let app = app();
    let xid = create(&app, "body_events", "weight=70").await;

    let resp = app
        .clone()
        .oneshot(delete_request(&format!("/body_events/{xid}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(get_request(&format!("/body_events/{xid}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app
        .oneshot(delete_request(&format!("/body_events/{xid}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- refresh token ---

#[tokio::test]
async fn refresh_token_checks_secret() {
    let app = app_with_secret("s3cret");
    let resp = app
        .clone()
        .oneshot(form_request("POST", "/users/@me/refreshToken", "secret=s3cret"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert!(json["data"]["refresh_token"].as_str().is_some());

    let resp = app
        .oneshot(form_request("POST", "/users/@me/refreshToken", "secret=wrong"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- webhook ---

#[tokio::test]
async fn webhook_subscribe_and_unsubscribe() {
    let app = app();
    let resp = app
        .clone()
        .oneshot(form_request(
            "POST",
            "/users/@me/pubsub?webhook=https%3A%2F%2Fexample.com%2Fhook",
            "",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["data"]["webhook"], "https://example.com/hook");

    let resp = app.oneshot(delete_request("/users/@me/pubsub")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn webhook_without_url_returns_400() {
    let resp = app()
        .oneshot(form_request("POST", "/users/@me/pubsub", ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = body_bytes(resp).await;
    assert!(!bytes.is_empty());
}
