//! Route guard and router behaviour against a stub backend

use portal_session::config::RouteConfig;
use portal_session::{
    ApiClient, AuthStore, GuardDecision, LoginRequest, Location, MemoryStorage, Navigator,
    RouteGuard, RouteMeta, RouteTable, Router, Session,
};
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_json() -> Value {
    json!({
        "email": "a@b.com",
        "role": "USER",
        "maskedName": "A**",
        "authenticated": true
    })
}

fn cached_session() -> Session {
    serde_json::from_value(json!({"user": user_json(), "isAuthenticated": true})).unwrap()
}

/// Standard routes plus a protected `/reports` and a public `/about`
fn setup(server: &MockServer, storage: MemoryStorage) -> (AuthStore, Router) {
    let routes = RouteConfig::default();
    let table = RouteTable::standard(&routes)
        .route("/reports", RouteMeta::PROTECTED)
        .route("/about", RouteMeta::PUBLIC);
    let router = Router::new(RouteGuard::new(table, &routes));
    let store = AuthStore::new(
        ApiClient::new(server.uri()).unwrap(),
        Arc::new(router.clone()),
        Arc::new(storage),
        routes,
    );
    (store, router)
}

async fn mount_session_rejected(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/user/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/web/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_protected_route_redirects_to_login_with_target() {
    let server = MockServer::start().await;
    mount_session_rejected(&server).await;

    let (store, router) = setup(&server, MemoryStorage::new());
    let landed = router.navigate(&store, "/reports").await;

    assert_eq!(landed.path(), "/login");
    assert_eq!(landed.query("redirect"), Some("/reports"));
    assert_eq!(landed.full_path(), "/login?redirect=%2Freports");
    assert_eq!(router.current(), landed);
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn test_unlisted_route_requires_a_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/web/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let (store, router) = setup(&server, MemoryStorage::new());
    let landed = router.navigate(&store, "/settings").await;

    assert_eq!(
        landed,
        Location::new("/login").with_query("redirect", "/settings")
    );
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn test_guard_decision_for_failed_check() {
    let server = MockServer::start().await;
    mount_session_rejected(&server).await;

    let (store, router) = setup(&server, MemoryStorage::new());
    let decision = router
        .guard()
        .evaluate(&store, &Location::parse("/reports?tab=2"))
        .await;

    let expected = Location::new("/login").with_query("redirect", "/reports?tab=2");
    assert_eq!(decision, GuardDecision::Redirect(expected));
}

#[tokio::test]
async fn test_protected_route_allowed_when_check_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(1)
        .mount(&server)
        .await;

    let (store, router) = setup(&server, MemoryStorage::new());
    let landed = router.navigate(&store, "/reports").await;

    assert_eq!(landed, Location::new("/reports"));
    assert!(store.is_authenticated());
}

#[tokio::test]
async fn test_login_page_redirects_home_when_authenticated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/web/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .mount(&server)
        .await;

    let (store, router) = setup(&server, MemoryStorage::new());
    store
        .login(LoginRequest::new("a@b.com", "x"))
        .await
        .unwrap();

    let decision = router.guard().evaluate(&store, &Location::new("/login")).await;
    assert_eq!(decision, GuardDecision::Redirect(Location::new("/")));

    let landed = router.navigate(&store, "/signup").await;
    assert_eq!(landed, Location::new("/"));
}

#[tokio::test]
async fn test_public_route_needs_no_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(0)
        .mount(&server)
        .await;

    let (store, router) = setup(&server, MemoryStorage::new());

    assert_eq!(router.navigate(&store, "/about").await, Location::new("/about"));
    assert_eq!(router.navigate(&store, "/login").await, Location::new("/login"));
    assert_eq!(
        router.history(),
        vec![Location::new("/about"), Location::new("/login")]
    );
}

#[tokio::test]
async fn test_history_keeps_most_recent_navigations() {
    let server = MockServer::start().await;
    let (store, router) = setup(&server, MemoryStorage::new());

    for _ in 0..Router::HISTORY_LIMIT {
        router.navigate(&store, "/about").await;
    }
    router.navigate(&store, "/login").await;

    let history = router.history();
    assert_eq!(history.len(), Router::HISTORY_LIMIT);
    assert_eq!(history.last(), Some(&Location::new("/login")));
    assert_eq!(history.first(), Some(&Location::new("/about")));
}

#[tokio::test]
async fn test_cached_session_is_revalidated_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(1)
        .mount(&server)
        .await;

    let (store, router) = setup(&server, MemoryStorage::with_session(cached_session()));
    assert!(store.needs_revalidation());

    assert_eq!(router.navigate(&store, "/reports").await, Location::new("/reports"));
    assert_eq!(router.navigate(&store, "/").await, Location::new("/"));
    assert!(!store.needs_revalidation());
}

#[tokio::test]
async fn test_stale_cached_session_is_rejected() {
    let server = MockServer::start().await;
    mount_session_rejected(&server).await;

    let (store, router) = setup(&server, MemoryStorage::with_session(cached_session()));
    let landed = router.navigate(&store, "/").await;

    assert_eq!(landed.path(), "/login");
    assert_eq!(landed.query("redirect"), Some("/"));
    assert!(store.session().user().is_none());
}

#[tokio::test]
async fn test_login_returns_to_redirect_target() {
    let server = MockServer::start().await;
    mount_session_rejected(&server).await;
    Mock::given(method("POST"))
        .and(path("/auth/web/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .mount(&server)
        .await;

    let (store, router) = setup(&server, MemoryStorage::new());
    router.navigate(&store, "/reports").await;

    store
        .login(LoginRequest::new("a@b.com", "x"))
        .await
        .unwrap();
    assert_eq!(router.pending(), vec![Location::new("/reports")]);

    assert_eq!(router.settle(&store).await, Some(Location::new("/reports")));
    assert!(router.pending().is_empty());
}

#[tokio::test]
async fn test_external_redirect_target_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/web/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .mount(&server)
        .await;

    let (store, router) = setup(&server, MemoryStorage::new());
    router
        .navigate(&store, "/login?redirect=https%3A%2F%2Fevil.example")
        .await;

    store
        .login(LoginRequest::new("a@b.com", "x"))
        .await
        .unwrap();
    assert_eq!(router.pending(), vec![Location::new("/")]);
}
