use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{test, App};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};

use video_api::claims::user::UserClaim;
use video_api::configure;
use video_api::middleware::auth::{FixedPrincipal, JwtResolver, Principal, PrincipalResolver};
use video_api::models::{InteractionKind, NewInteraction, NewVideo, User};
use video_api::store::{MemoryStore, StoreError, StoreResult, VideoStore};

/// Builds the real application over the given store and resolver.
macro_rules! test_app {
    ($store:expr, $resolver:expr) => {
        test::init_service(App::new().configure(configure($store, $resolver))).await
    };
}

fn fixture() -> (Arc<MemoryStore>, User, Arc<dyn PrincipalResolver>) {
    let store = Arc::new(MemoryStore::new());
    let user = store
        .ensure_user("john_doe", "https://picsum.photos/150/150?random=1")
        .unwrap();
    let resolver: Arc<dyn PrincipalResolver> = Arc::new(FixedPrincipal(Principal::from(&user)));
    (store, user, resolver)
}

fn add_video(store: &MemoryStore, user_id: i32, title: &str) -> i32 {
    let (video, _) = store
        .create_video_with_meta_items(
            NewVideo {
                title: title.to_string(),
                description: None,
                video_url: format!("https://cdn.test/{}.mp4", title),
                user_id,
            },
            vec![],
        )
        .unwrap();
    video.id
}

#[actix_rt::test]
async fn create_video_returns_owner_and_meta_items() {
    let (store, user, resolver) = fixture();
    let app = test_app!(store.clone(), resolver);

    let req = test::TestRequest::post()
        .uri("/api/videos")
        .set_json(json!({
            "title": "Amazing Nature Documentary",
            "description": "Wildlife",
            "videoUrl": "https://cdn.test/nature.mp4",
            "metaItems": [
                { "type": "category", "value": "nature" },
                { "thumbnailUrl": "https://picsum.photos/320/180", "label": "Preview 1" }
            ]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);

    let data = &body["data"];
    assert_eq!(data["title"], "Amazing Nature Documentary");
    assert_eq!(data["videoUrl"], "https://cdn.test/nature.mp4");
    assert_eq!(data["user"]["id"], user.id);
    assert_eq!(data["user"]["username"], "john_doe");
    assert_eq!(data["user"]["avatarUrl"], "https://picsum.photos/150/150?random=1");

    let items = data["metaItems"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    for item in items {
        assert_eq!(item["videoId"], data["id"]);
    }
    assert_eq!(items[0]["type"], "category");
    assert_eq!(items[1]["label"], "Preview 1");

    assert_eq!(store.count_videos().unwrap(), 1);
}

#[actix_rt::test]
async fn create_without_meta_items_returns_empty_list() {
    let (store, _, resolver) = fixture();
    let app = test_app!(store, resolver);

    let req = test::TestRequest::post()
        .uri("/api/videos")
        .set_json(json!({ "title": "Plain", "videoUrl": "https://cdn.test/plain.mp4" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["metaItems"], json!([]));
    assert_eq!(body["data"]["description"], Value::Null);
}

#[actix_rt::test]
async fn create_with_missing_fields_writes_nothing() {
    let (store, _, resolver) = fixture();
    let app = test_app!(store.clone(), resolver);

    let bodies = [
        json!({ "videoUrl": "https://cdn.test/a.mp4", "metaItems": [{ "label": "orphan" }] }),
        json!({ "title": "No url", "metaItems": [{ "label": "orphan" }] }),
        json!({ "title": "", "videoUrl": "https://cdn.test/a.mp4" }),
    ];

    for body in bodies {
        let req = test::TestRequest::post()
            .uri("/api/videos")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{body}");

        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Title and videoUrl are required");
    }

    assert_eq!(store.count_videos().unwrap(), 0);
    assert!(store.find_meta_items_by_video_ids(&[1, 2, 3]).unwrap().is_empty());
}

#[actix_rt::test]
async fn malformed_body_is_a_bad_request() {
    let (store, _, resolver) = fixture();
    let app = test_app!(store, resolver);

    let req = test::TestRequest::post()
        .uri("/api/videos")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}

#[actix_rt::test]
async fn list_paginates_newest_first() {
    let (store, user, resolver) = fixture();
    for n in 1..=5 {
        add_video(&store, user.id, &format!("video-{}", n));
    }
    let app = test_app!(store, resolver);

    let req = test::TestRequest::get().uri("/api/videos?page=1&limit=2").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["video-5", "video-4"]);
    assert_eq!(
        body["pagination"],
        json!({
            "currentPage": 1,
            "totalPages": 3,
            "totalItems": 5,
            "itemsPerPage": 2,
            "hasNext": true,
            "hasPrev": false
        })
    );

    let req = test::TestRequest::get().uri("/api/videos?page=3&limit=2").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "video-1");
    assert_eq!(body["pagination"]["hasNext"], false);
    assert_eq!(body["pagination"]["hasPrev"], true);

    let req = test::TestRequest::get().uri("/api/videos?page=4&limit=2").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["pagination"]["currentPage"], 4);
    assert_eq!(body["pagination"]["hasNext"], false);
}

#[actix_rt::test]
async fn list_defaults_bad_paging_params() {
    let (store, user, resolver) = fixture();
    add_video(&store, user.id, "only");
    let app = test_app!(store, resolver);

    for uri in ["/api/videos", "/api/videos?page=abc&limit=-4", "/api/videos?page=0&limit=0"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["pagination"]["currentPage"], 1, "{uri}");
        assert_eq!(body["pagination"]["itemsPerPage"], 10, "{uri}");
        assert_eq!(body["pagination"]["totalPages"], 1, "{uri}");
    }
}

#[actix_rt::test]
async fn large_limit_returns_the_whole_page() {
    let (store, user, resolver) = fixture();
    for n in 1..=150 {
        add_video(&store, user.id, &format!("video-{}", n));
    }
    let app = test_app!(store, resolver);

    let req = test::TestRequest::get().uri("/api/videos?page=1&limit=150").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 150);
    assert_eq!(body["pagination"]["itemsPerPage"], 150);
    assert_eq!(body["pagination"]["totalPages"], 1);
    assert_eq!(body["pagination"]["hasNext"], false);
}

#[actix_rt::test]
async fn paging_params_use_leading_digits() {
    let (store, user, resolver) = fixture();
    for n in 1..=3 {
        add_video(&store, user.id, &format!("video-{}", n));
    }
    let app = test_app!(store, resolver);

    let req = test::TestRequest::get().uri("/api/videos?page=2abc&limit=1x").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["pagination"]["currentPage"], 2);
    assert_eq!(body["pagination"]["itemsPerPage"], 1);
    assert_eq!(body["data"][0]["title"], "video-2");
}

#[actix_rt::test]
async fn bare_video_has_zero_stats() {
    let (store, user, resolver) = fixture();
    add_video(&store, user.id, "quiet");
    let app = test_app!(store, resolver);

    let req = test::TestRequest::get().uri("/api/videos").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["metaItems"], json!([]));
    assert_eq!(
        body["data"][0]["interactions"],
        json!({ "likes": 0, "views": 0, "comments": 0 })
    );
}

#[actix_rt::test]
async fn stats_count_each_interaction_type() {
    let (store, user, resolver) = fixture();
    let video_id = add_video(&store, user.id, "popular");
    add_video(&store, user.id, "other");

    let mut viewers = vec![user.id];
    for n in 0..4 {
        viewers.push(store.ensure_user(&format!("viewer_{}", n), "x").unwrap().id);
    }
    for viewer in &viewers[..3] {
        store
            .record_interaction(NewInteraction::new(*viewer, video_id, InteractionKind::Like, None))
            .unwrap();
    }
    for viewer in &viewers {
        store
            .record_interaction(NewInteraction::new(*viewer, video_id, InteractionKind::View, None))
            .unwrap();
    }
    store
        .record_interaction(NewInteraction::new(
            user.id,
            video_id,
            InteractionKind::Comment,
            Some("Great video!".into()),
        ))
        .unwrap();

    let app = test_app!(store, resolver);
    let req = test::TestRequest::get().uri("/api/videos").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let data = body["data"].as_array().unwrap();
    let popular = data.iter().find(|v| v["id"] == video_id).unwrap();
    assert_eq!(popular["interactions"], json!({ "likes": 3, "views": 5, "comments": 1 }));

    let other = data.iter().find(|v| v["id"] != video_id).unwrap();
    assert_eq!(other["interactions"], json!({ "likes": 0, "views": 0, "comments": 0 }));
}

#[actix_rt::test]
async fn second_like_is_rejected_but_comments_repeat() {
    let (store, user, resolver) = fixture();
    let video_id = add_video(&store, user.id, "liked");
    let app = test_app!(store, resolver);
    let uri = format!("/api/videos/{}/interactions", video_id);

    let like = || test::TestRequest::post().uri(&uri).set_json(json!({ "type": "like" })).to_request();

    let resp = test::call_service(&app, like()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["type"], "like");
    assert_eq!(body["data"]["userId"], user.id);

    let resp = test::call_service(&app, like()).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);

    for text in ["First!", "Second thoughts"] {
        let req = test::TestRequest::post()
            .uri(&uri)
            .set_json(json!({ "type": "comment", "content": text }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get().uri("/api/videos").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        body["data"][0]["interactions"],
        json!({ "likes": 1, "views": 0, "comments": 2 })
    );
}

#[actix_rt::test]
async fn interaction_on_unknown_video_is_not_found() {
    let (store, _, resolver) = fixture();
    let app = test_app!(store, resolver);

    let req = test::TestRequest::post()
        .uri("/api/videos/404/interactions")
        .set_json(json!({ "type": "view" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn long_title_is_accepted() {
    let (store, _, resolver) = fixture();
    let app = test_app!(store, resolver);
    let title = "t".repeat(300);

    let req = test::TestRequest::post()
        .uri("/api/videos")
        .set_json(json!({ "title": title, "videoUrl": "https://cdn.test/long.mp4" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["title"], title);
}

#[actix_rt::test]
async fn interaction_from_vanished_user_is_unauthorized() {
    let (store, user, _) = fixture();
    let video_id = add_video(&store, user.id, "clip");
    let ghost: Arc<dyn PrincipalResolver> = Arc::new(FixedPrincipal(Principal {
        user_id: 9_999,
        username: "ghost".into(),
    }));
    let app = test_app!(store, ghost);

    let req = test::TestRequest::post()
        .uri(&format!("/api/videos/{}/interactions", video_id))
        .set_json(json!({ "type": "like" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

fn bearer(secret: &str, user: &User) -> String {
    let claim = UserClaim {
        id: user.id,
        username: user.username.clone(),
        exp: chrono::Utc::now().timestamp() + 600,
    };
    let token = encode(&Header::default(), &claim, &EncodingKey::from_secret(secret.as_bytes())).unwrap();
    format!("Bearer {}", token)
}

#[actix_rt::test]
async fn jwt_protects_the_video_routes() {
    let (store, user, _) = fixture();
    let resolver: Arc<dyn PrincipalResolver> = Arc::new(JwtResolver::new("test-secret"));
    let app = test_app!(store, resolver);

    let req = test::TestRequest::get().uri("/api/videos").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);

    let req = test::TestRequest::post()
        .uri("/api/videos")
        .insert_header(("Authorization", bearer("wrong-secret", &user)))
        .set_json(json!({ "title": "A", "videoUrl": "https://cdn.test/a.mp4" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/videos")
        .insert_header(("Authorization", bearer("test-secret", &user)))
        .set_json(json!({ "title": "A", "videoUrl": "https://cdn.test/a.mp4" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
}

#[actix_rt::test]
async fn health_and_unknown_routes() {
    let (store, _, resolver) = fixture();
    let app = test_app!(store, resolver);

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Server is running");
    assert!(body["timestamp"].is_string());

    let req = test::TestRequest::get().uri("/nowhere").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "success": false, "message": "Route not found" }));
}

/// A store whose every call fails, standing in for a lost database.
struct UnreachableStore;

fn unreachable<T>() -> StoreResult<T> {
    Err(StoreError::Migration("connection refused".into()))
}

impl VideoStore for UnreachableStore {
    fn create_video_with_meta_items(
        &self,
        _: NewVideo,
        _: Vec<video_api::models::MetaItemPayload>,
    ) -> StoreResult<(video_api::models::VideoWithUser, Vec<video_api::models::MetaItem>)> {
        unreachable()
    }
    fn list_videos_page(&self, _: i64, _: i64) -> StoreResult<Vec<video_api::models::VideoWithUser>> {
        unreachable()
    }
    fn find_meta_items_by_video_ids(&self, _: &[i32]) -> StoreResult<Vec<video_api::models::MetaItem>> {
        unreachable()
    }
    fn group_interaction_counts(&self, _: &[i32]) -> StoreResult<Vec<video_api::models::InteractionCount>> {
        unreachable()
    }
    fn count_videos(&self) -> StoreResult<i64> {
        unreachable()
    }
    fn find_user(&self, _: i32) -> StoreResult<Option<User>> {
        unreachable()
    }
    fn find_user_by_username(&self, _: &str) -> StoreResult<Option<User>> {
        unreachable()
    }
    fn ensure_user(&self, _: &str, _: &str) -> StoreResult<User> {
        unreachable()
    }
    fn record_interaction(&self, _: NewInteraction) -> StoreResult<video_api::models::Interaction> {
        unreachable()
    }
    fn clear(&self) -> StoreResult<()> {
        unreachable()
    }
}

#[actix_rt::test]
async fn store_failures_are_generic_500s() {
    let resolver: Arc<dyn PrincipalResolver> = Arc::new(FixedPrincipal(Principal {
        user_id: 1,
        username: "john_doe".into(),
    }));
    let app = test_app!(Arc::new(UnreachableStore), resolver);

    let requests = [
        test::TestRequest::get().uri("/api/videos").to_request(),
        test::TestRequest::post()
            .uri("/api/videos")
            .set_json(json!({ "title": "A", "videoUrl": "https://cdn.test/a.mp4" }))
            .to_request(),
    ];

    for req in requests {
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "success": false, "message": "Internal server error" }));
    }
}
