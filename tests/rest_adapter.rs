use admin_crud_sdk::config::ResourceBinding;
use admin_crud_sdk::store::{AuthTokens, User};
use admin_crud_sdk::{
    AdminError, AuthEvent, ClientConfig, Filters, HttpTransport, ListQuery, MemoryBackend, Operation, Record,
    ResourceAdapter, RestAdapter, RowId, SessionStore,
};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Requests seen by the mock backend, as `(route, payload)`.
#[derive(Clone, Default)]
struct Seen(Arc<Mutex<Vec<(String, Value)>>>);

impl Seen {
    fn push(&self, route: &str, payload: Value) {
        self.0.lock().unwrap().push((route.to_string(), payload));
    }

    fn all(&self) -> Vec<(String, Value)> {
        self.0.lock().unwrap().clone()
    }
}

async fn page_list(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    seen.push("pageList", body);
    Json(json!({
        "code": 1,
        "msg": "ok",
        "data": {
            "records": [{ "dictId": "d-21", "dictName": "gender" }, { "dictId": "d-22", "dictName": "status" }],
            "total": "25",
            "current": "3",
            "size": "10"
        }
    }))
}

async fn users(State(seen): State<Seen>, headers: HeaderMap, Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    seen.push("users", json!({ "query": q, "auth": auth }));
    Json(json!({
        "code": 200,
        "data": { "data": { "list": [{ "id": 1, "username": "admin" }], "total": -4 } }
    }))
}

async fn create_dict(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    seen.push("create", body);
    Json(json!({ "code": 1, "msg": "ok", "data": "d-100" }))
}

async fn update_dict(State(seen): State<Seen>, Path(id): Path<String>, Json(body): Json<Value>) -> Json<Value> {
    seen.push("update", json!({ "id": id, "body": body }));
    Json(json!({ "code": "1", "data": null }))
}

async fn delete_dict(State(seen): State<Seen>, Path(id): Path<String>) -> Json<Value> {
    seen.push("delete", json!(id));
    Json(json!({ "code": 1, "data": true }))
}

async fn rejected() -> Json<Value> {
    Json(json!({ "code": 0, "msg": "dict type already exists", "data": null }))
}

async fn unauthorized() -> StatusCode {
    StatusCode::UNAUTHORIZED
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "stack trace")
}

async fn serve(seen: Seen) -> String {
    let app = Router::new()
        .route("/dict/pageList", post(page_list))
        .route("/dict", post(create_dict))
        .route("/dict/:id", put(update_dict).delete(delete_dict))
        .route("/users", get(users))
        .route("/rejected/pageList", post(rejected))
        .route("/secure", get(unauthorized))
        .route("/broken", get(broken))
        .with_state(seen);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn binding(v: Value) -> ResourceBinding {
    serde_json::from_value(v).unwrap()
}

fn dict_binding() -> ResourceBinding {
    binding(json!({
        "list": { "method": "POST", "path": "/dict/pageList" },
        "listStyle": "body",
        "create": { "method": "POST", "path": "/dict" },
        "update": { "method": "PUT", "path": "/dict/{id}" },
        "delete": { "method": "DELETE", "path": "/dict/{id}" },
        "successCode": 1
    }))
}

fn transport(base: &str) -> HttpTransport {
    HttpTransport::new(&ClientConfig::default().with_base_url(base)).unwrap()
}

fn query(page: u32, filters: Value) -> ListQuery {
    let filters: Filters = serde_json::from_value(filters).unwrap();
    ListQuery {
        page,
        page_size: 10,
        filters,
    }
}

#[tokio::test]
async fn body_style_list_with_string_counts() {
    let seen = Seen::default();
    let base = serve(seen.clone()).await;
    let adapter = RestAdapter::new(transport(&base), dict_binding(), "dictId");

    let page = adapter.list(&query(3, json!({ "dictName": "gen" }))).await.unwrap();
    assert_eq!(page.total, 25);
    assert_eq!(page.current, Some(3));
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0]["dictId"], json!("d-21"));

    let (route, body) = &seen.all()[0];
    assert_eq!(route, "pageList");
    assert_eq!(body, &json!({ "params": { "dictName": "gen" }, "current": 3, "size": 10 }));
}

#[tokio::test]
async fn query_style_list_sends_token_and_clamps_negative_total() {
    let seen = Seen::default();
    let base = serve(seen.clone()).await;
    let session = Arc::new(SessionStore::open(Arc::new(MemoryBackend::new())).unwrap());
    session
        .sign_in(
            User {
                id: "1".into(),
                username: "admin".into(),
                ..Default::default()
            },
            AuthTokens {
                access_token: "tok-1".into(),
                refresh_token: "ref-1".into(),
            },
            Vec::new(),
        )
        .unwrap();
    let adapter = RestAdapter::new(
        transport(&base).with_session(session),
        binding(json!({ "list": { "method": "GET", "path": "users" }, "successCode": 200 })),
        "id",
    );
    assert!(!adapter.supports(Operation::Create));

    let page = adapter.list(&query(1, json!({ "role": "admin", "status": 1 }))).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.total, 0);

    let (_, seen_req) = &seen.all()[0];
    assert_eq!(seen_req["auth"], json!("Bearer tok-1"));
    assert_eq!(seen_req["query"]["current"], json!("1"));
    assert_eq!(seen_req["query"]["size"], json!("10"));
    assert_eq!(seen_req["query"]["role"], json!("admin"));
    assert_eq!(seen_req["query"]["status"], json!("1"));

    let err = adapter.create(Record::new()).await.unwrap_err();
    assert!(matches!(err, AdminError::Unsupported("create")));
}

#[tokio::test]
async fn create_with_bare_id_is_synthesized() {
    let seen = Seen::default();
    let base = serve(seen.clone()).await;
    let adapter = RestAdapter::new(transport(&base), dict_binding(), "dictId");

    let data = json!({ "dictName": "gender", "dictType": "sys_user_sex" }).as_object().cloned().unwrap();
    let created = adapter.create(data.clone()).await.unwrap();
    assert_eq!(created["dictId"], json!("d-100"));
    assert_eq!(created["dictName"], json!("gender"));
    assert_eq!(seen.all()[0].1, Value::Object(data));
}

#[tokio::test]
async fn update_and_delete_hit_the_id_path() {
    let seen = Seen::default();
    let base = serve(seen.clone()).await;
    let adapter = RestAdapter::new(transport(&base), dict_binding(), "dictId");

    let id = RowId::Text("d 7".into());
    let data = json!({ "dictName": "renamed" }).as_object().cloned().unwrap();
    let updated = adapter.update(&id, data).await.unwrap();
    assert_eq!(updated["dictId"], json!("d 7"));
    assert!(adapter.delete(&RowId::Int(8)).await.unwrap());

    let all = seen.all();
    assert_eq!(all[0].1["id"], json!("d 7"));
    assert_eq!(all[1], ("delete".to_string(), json!("8")));
}

#[tokio::test]
async fn business_failure_carries_backend_message() {
    let base = serve(Seen::default()).await;
    let mut b = dict_binding();
    b.list.path = "/rejected/pageList".into();
    let adapter = RestAdapter::new(transport(&base), b, "dictId");

    let err = adapter.list(&query(1, json!({}))).await.unwrap_err();
    match &err {
        AdminError::Business { code, message } => {
            assert_eq!(*code, 0);
            assert_eq!(message.as_deref(), Some("dict type already exists"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.user_message(), "dict type already exists");
}

#[tokio::test]
async fn unauthorized_clears_session_and_broadcasts() {
    let base = serve(Seen::default()).await;
    let session = Arc::new(SessionStore::open(Arc::new(MemoryBackend::new())).unwrap());
    session
        .sign_in(
            User::default(),
            AuthTokens {
                access_token: "expired".into(),
                refresh_token: "r".into(),
            },
            Vec::new(),
        )
        .unwrap();
    let transport = transport(&base).with_session(session.clone());
    let mut events = transport.subscribe();
    let adapter = RestAdapter::new(
        transport,
        binding(json!({ "list": { "method": "GET", "path": "/secure" }, "successCode": 200 })),
        "id",
    );

    let err = adapter.list(&query(1, json!({}))).await.unwrap_err();
    assert!(matches!(err, AdminError::Unauthorized));
    assert!(!session.is_authenticated());
    assert_eq!(events.recv().await.unwrap(), AuthEvent::LoginRequired);
}

#[tokio::test]
async fn server_error_is_a_transport_error() {
    let base = serve(Seen::default()).await;
    let adapter = RestAdapter::new(
        transport(&base),
        binding(json!({ "list": { "method": "GET", "path": "/broken" }, "successCode": 200 })),
        "id",
    );
    let err = adapter.list(&query(1, json!({}))).await.unwrap_err();
    assert!(matches!(err, AdminError::Transport { status: Some(500), .. }));
    assert_eq!(err.user_message(), admin_crud_sdk::error::SERVER_ERROR_MESSAGE);
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let adapter = RestAdapter::new(transport(&base), dict_binding(), "dictId");
    let err = adapter.list(&query(1, json!({}))).await.unwrap_err();
    assert!(matches!(err, AdminError::Transport { status: None, .. }));
    assert_eq!(err.user_message(), admin_crud_sdk::error::NETWORK_ERROR_MESSAGE);
}
