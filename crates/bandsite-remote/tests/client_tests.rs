use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};

use bandsite_core::{
    Album, Filter, ObjectStorage, Order, Record, Select, StorageError, Table, TableService,
};
use bandsite_remote::SupabaseClient;

/// A request seen by the mock server.
#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
}

impl Recorded {
    fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).and_then(|v| v.to_str().ok())
    }

    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

#[derive(Clone, Default)]
struct MockState {
    requests: Arc<Mutex<Vec<Recorded>>>,
    responses: Arc<Mutex<VecDeque<(StatusCode, Value)>>>,
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.requests.lock().unwrap().push(Recorded {
        method,
        path: uri.path().to_string(),
        query,
        headers,
        body,
    });

    let (status, body) = state
        .responses
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or((StatusCode::OK, json!([])));
    (status, Json(body)).into_response()
}

/// Start a mock PostgREST server and a client pointed at it.
async fn create_test_client() -> (SupabaseClient, MockState) {
    let state = MockState::default();
    let app = Router::new().fallback(handle).with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = SupabaseClient::new(format!("http://{}/", addr), "anon-key".to_string().into());
    (client, state)
}

fn respond(state: &MockState, status: StatusCode, body: Value) {
    state.responses.lock().unwrap().push_back((status, body));
}

fn last_request(state: &MockState) -> Recorded {
    state.requests.lock().unwrap().last().cloned().unwrap()
}

// ============================================================================
// Table endpoint tests
// ============================================================================

#[tokio::test]
async fn test_select_encodes_query() {
    let (client, state) = create_test_client().await;
    respond(&state, StatusCode::OK, json!([{"id": 1, "date": "2024-05-01"}]));

    let rows = client
        .select(Select::from(Table::Shows).order(Order::asc("date")))
        .await
        .unwrap();

    assert_eq!(rows, vec![json!({"id": 1, "date": "2024-05-01"})]);

    let req = last_request(&state);
    assert_eq!(req.method, Method::GET);
    assert_eq!(req.path, "/rest/v1/shows");
    assert_eq!(req.param("select"), Some("*"));
    assert_eq!(req.param("order"), Some("date.asc"));
    assert_eq!(req.header("apikey"), Some("anon-key"));
    assert_eq!(req.header("authorization"), Some("Bearer anon-key"));
}

#[tokio::test]
async fn test_select_keeps_locale_order() {
    let (client, state) = create_test_client().await;
    respond(
        &state,
        StatusCode::OK,
        json!([{"id": 1, "title": "Tour", "description": {"fr": "c", "de": "d"}}]),
    );

    let rows = client.select(Select::from(Table::Albums)).await.unwrap();
    let album = Album::decode(rows.into_iter().next().unwrap()).unwrap();

    assert_eq!(album.description.get("es"), "c");
}

#[tokio::test]
async fn test_select_with_embed_and_limit() {
    let (client, state) = create_test_client().await;

    client
        .select(
            Select::from(Table::Albums)
                .embed(Table::Photos, "album_id")
                .order(Order::desc("created_at"))
                .single(),
        )
        .await
        .unwrap();

    let req = last_request(&state);
    assert_eq!(req.param("select"), Some("*,photos(*)"));
    assert_eq!(req.param("order"), Some("created_at.desc"));
    assert_eq!(req.param("limit"), Some("1"));
}

#[tokio::test]
async fn test_insert_returns_representation() {
    let (client, state) = create_test_client().await;
    respond(
        &state,
        StatusCode::CREATED,
        json!([{"id": 42, "ticket_links": ["http://x"]}]),
    );

    let stored = client
        .insert(Table::Shows, vec![json!({"ticket_links": ["http://x"]})])
        .await
        .unwrap();

    assert_eq!(stored[0]["id"], 42);

    let req = last_request(&state);
    assert_eq!(req.method, Method::POST);
    assert_eq!(req.header("prefer"), Some("return=representation"));
    assert_eq!(req.json(), json!([{"ticket_links": ["http://x"]}]));
}

#[tokio::test]
async fn test_insert_with_empty_response_is_error() {
    let (client, state) = create_test_client().await;
    respond(&state, StatusCode::CREATED, json!([]));

    let err = client
        .insert(Table::Songs, vec![json!({"title": "x"})])
        .await
        .unwrap_err();

    assert_eq!(err, StorageError::EmptyResponse("songs"));
}

#[tokio::test]
async fn test_update_filters_by_id() {
    let (client, state) = create_test_client().await;

    client
        .update(Table::Members, json!({"order_index": 2}), vec![Filter::id(7)])
        .await
        .unwrap();

    let req = last_request(&state);
    assert_eq!(req.method, Method::PATCH);
    assert_eq!(req.path, "/rest/v1/members");
    assert_eq!(req.param("id"), Some("eq.7"));
    assert_eq!(req.json(), json!({"order_index": 2}));
}

#[tokio::test]
async fn test_delete_and_delete_all() {
    let (client, state) = create_test_client().await;

    client
        .delete(Table::Photos, vec![Filter::id(3)])
        .await
        .unwrap();
    let req = last_request(&state);
    assert_eq!(req.method, Method::DELETE);
    assert_eq!(req.param("id"), Some("eq.3"));

    client.delete_all(Table::TechnicalRider).await.unwrap();
    let req = last_request(&state);
    assert_eq!(req.path, "/rest/v1/technical_rider");
    assert_eq!(req.param("id"), Some("not.is.null"));
}

#[tokio::test]
async fn test_api_error_status() {
    let (client, state) = create_test_client().await;
    respond(
        &state,
        StatusCode::UNAUTHORIZED,
        json!({"message": "permission denied"}),
    );

    let err = client
        .delete(Table::Shows, vec![Filter::id(1)])
        .await
        .unwrap_err();

    match err {
        StorageError::Api { status, message } => {
            assert_eq!(status, 401);
            assert!(message.contains("permission denied"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_connection_refused_is_request_error() {
    let client = SupabaseClient::new("http://127.0.0.1:1", "anon-key".to_string().into());

    let err = client.select(Select::from(Table::Songs)).await.unwrap_err();

    assert!(matches!(err, StorageError::Request(_)));
}

#[tokio::test]
async fn test_access_token_overrides_bearer() {
    let (client, state) = create_test_client().await;
    let client = client.with_access_token("user-jwt".to_string().into());

    client.select(Select::from(Table::Songs)).await.unwrap();

    let req = last_request(&state);
    assert_eq!(req.header("apikey"), Some("anon-key"));
    assert_eq!(req.header("authorization"), Some("Bearer user-jwt"));
}

// ============================================================================
// Storage endpoint tests
// ============================================================================

#[tokio::test]
async fn test_upload_object() {
    let (client, state) = create_test_client().await;
    respond(&state, StatusCode::OK, json!({"Key": "images/abc.png"}));

    client
        .upload("images", "abc.png", vec![1, 2, 3], Some("image/png"))
        .await
        .unwrap();

    let req = last_request(&state);
    assert_eq!(req.method, Method::POST);
    assert_eq!(req.path, "/storage/v1/object/images/abc.png");
    assert_eq!(req.header("content-type"), Some("image/png"));
    assert_eq!(req.body.as_ref(), &[1, 2, 3]);
}

#[tokio::test]
async fn test_public_url() {
    let client = SupabaseClient::new("https://demo.supabase.co/", "k".to_string().into());

    assert_eq!(client.base_url(), "https://demo.supabase.co");
    assert_eq!(
        client.public_url("images", "abc.png"),
        "https://demo.supabase.co/storage/v1/object/public/images/abc.png"
    );
}
