#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use parking_lot::Mutex;
use serde_json::{json, Value};
use signage_console_client::{
    ApiClient, ApiConfig, LoginRedirect, MemoryStorage, Notifier, SessionManager,
};
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

pub const VALID_EMAIL: &str = "root@signage.test";
pub const VALID_PASSWORD: &str = "correct horse";
pub const DISABLED_EMAIL: &str = "disabled@signage.test";
pub const CRASH_EMAIL: &str = "crash@signage.test";
pub const GARBAGE_TOKEN_EMAIL: &str = "garbage@signage.test";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// Unsigned JWT-shaped token carrying `claims`.
pub fn token(claims: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.dGVzdC1zaWduYXR1cmU")
}

pub fn token_expiring_at(email: &str, role: &str, site_id: Option<i64>, exp: i64) -> String {
    token(json!({"sub": email, "role": role, "site_id": site_id, "exp": exp}))
}

pub fn fresh_token(email: &str, role: &str, site_id: Option<i64>) -> String {
    token_expiring_at(email, role, site_id, now() + 3600)
}

pub fn expired_token(email: &str) -> String {
    token_expiring_at(email, "admin", None, now() - 3600)
}

/// One request as seen by the mock backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub route: &'static str,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub query: HashMap<String, String>,
    pub body: Value,
}

#[derive(Debug, Clone, Default)]
pub struct Backend {
    log: Arc<Mutex<Vec<Recorded>>>,
    media: Arc<Mutex<Vec<String>>>,
}

impl Backend {
    pub fn requests(&self) -> Vec<Recorded> {
        self.log.lock().clone()
    }

    pub fn requests_to(&self, route: &str) -> Vec<Recorded> {
        self.log
            .lock()
            .iter()
            .filter(|r| r.route == route)
            .cloned()
            .collect()
    }

    fn record(
        &self,
        route: &'static str,
        headers: &HeaderMap,
        query: HashMap<String, String>,
        body: Value,
    ) {
        let header = |name: HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        self.log.lock().push(Recorded {
            route,
            authorization: header(AUTHORIZATION),
            content_type: header(CONTENT_TYPE),
            query,
            body,
        });
    }
}

fn detail(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

fn device(id: i64, site_id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "site_id": site_id,
        "name": name,
        "location": "Entrance",
        "enabled": true,
        "volume": 50,
        "screen_on": true,
        "last_seen": "2024-05-02T09:15:00.123456",
        "is_online": true,
        "is_playing": false,
        "current_media": null,
        "ip_address": "10.0.0.12",
        "mac_address": null,
        "system_info": null,
        "schedule": null,
        "pending_actions": null
    })
}

async fn login(State(b): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    b.record("login", &headers, HashMap::new(), body.clone());
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    match email {
        VALID_EMAIL if password == VALID_PASSWORD => Json(json!({
            "access_token": fresh_token(VALID_EMAIL, "superadmin", None),
            "token_type": "bearer",
            "user": {"email": VALID_EMAIL, "role": "superadmin", "site_id": null}
        }))
        .into_response(),
        DISABLED_EMAIL => detail(StatusCode::FORBIDDEN, "Compte désactivé"),
        CRASH_EMAIL => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response(),
        GARBAGE_TOKEN_EMAIL => Json(json!({"access_token": "not-a-jwt"})).into_response(),
        _ => detail(StatusCode::BAD_REQUEST, "Identifiants incorrects"),
    }
}

async fn change_password(
    State(b): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    b.record("change-password", &headers, HashMap::new(), body.clone());
    if body["current_password"] != VALID_PASSWORD {
        return detail(StatusCode::BAD_REQUEST, "Mot de passe actuel incorrect");
    }
    Json(json!({"message": "Mot de passe modifié avec succès"})).into_response()
}

async fn me(State(b): State<Backend>, headers: HeaderMap) -> Response {
    b.record("me", &headers, HashMap::new(), Value::Null);
    if headers.get(AUTHORIZATION).is_none() {
        return detail(StatusCode::UNAUTHORIZED, "Not authenticated");
    }
    Json(json!({"id": 1, "email": VALID_EMAIL, "role": "superadmin", "site_id": null})).into_response()
}

async fn list_devices(
    State(b): State<Backend>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    // Slow on purpose so that concurrent calls complete out of dispatch order
    tokio::time::sleep(Duration::from_millis(150)).await;
    let site = query.get("site_id").and_then(|s| s.parse::<i64>().ok());
    b.record("devices", &headers, query, Value::Null);

    let devices: Vec<Value> = [device(1, 1, "hall-1"), device(2, 2, "lobby-1")]
        .into_iter()
        .filter(|d| site.map_or(true, |s| d["site_id"] == s))
        .collect();
    Json(devices).into_response()
}

async fn statistics(
    State(b): State<Backend>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    b.record("statistics", &headers, query, Value::Null);
    Json(json!({"total": 2, "online": 1, "offline": 1, "playing": 0})).into_response()
}

async fn get_device(State(b): State<Backend>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    b.record("device", &headers, HashMap::new(), Value::Null);
    match id {
        1 => Json(device(1, 1, "hall-1")).into_response(),
        666 => Json(json!({"id": "not-a-number"})).into_response(),
        _ => detail(StatusCode::NOT_FOUND, "Device non trouvé"),
    }
}

async fn device_action(
    State(b): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    b.record("action", &headers, HashMap::new(), body.clone());
    Json(json!({
        "status": "Action enregistrée",
        "device": format!("device-{id}"),
        "action": body["action"]
    }))
    .into_response()
}

async fn list_sites(State(b): State<Backend>, headers: HeaderMap) -> Response {
    b.record("sites", &headers, HashMap::new(), Value::Null);
    Json(json!([
        {"id": 1, "name": "Hall", "address": "1 rue de la Paix"},
        {"id": 2, "name": "Lobby", "address": "2 avenue Foch"}
    ]))
    .into_response()
}

async fn get_site(State(b): State<Backend>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    b.record("site", &headers, HashMap::new(), Value::Null);
    match id {
        1 => Json(json!({"id": 1, "name": "Hall", "address": "1 rue de la Paix"})).into_response(),
        _ => detail(StatusCode::NOT_FOUND, "Site non trouvé"),
    }
}

async fn create_site(State(b): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    b.record("site-create", &headers, HashMap::new(), body.clone());
    Json(json!({"id": 3, "name": body["name"], "address": body["address"]})).into_response()
}

async fn update_site(
    State(b): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    b.record("site-update", &headers, HashMap::new(), body.clone());
    let name = body.get("name").cloned().unwrap_or(json!("Hall"));
    Json(json!({"id": id, "name": name, "address": "1 rue de la Paix"})).into_response()
}

async fn delete_site(State(b): State<Backend>, headers: HeaderMap, Path(_id): Path<i64>) -> Response {
    b.record("site-delete", &headers, HashMap::new(), Value::Null);
    Json(json!({"message": "Site supprimé avec succès"})).into_response()
}

async fn create_device(State(b): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    b.record("device-create", &headers, HashMap::new(), body.clone());
    let mut created = body;
    created["id"] = json!(10);
    Json(created).into_response()
}

async fn update_device(
    State(b): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    b.record("device-update", &headers, HashMap::new(), body.clone());
    let mut updated = device(id, 1, "hall-1");
    if let (Some(target), Some(changes)) = (updated.as_object_mut(), body.as_object()) {
        for (key, value) in changes {
            target.insert(key.clone(), value.clone());
        }
    }
    Json(updated).into_response()
}

async fn delete_device(State(b): State<Backend>, headers: HeaderMap, Path(_id): Path<i64>) -> Response {
    b.record("device-delete", &headers, HashMap::new(), Value::Null);
    Json(json!({"status": "Device supprimé"})).into_response()
}

// Rejects every caller, like a backend that no longer accepts the token.
async fn list_users(State(b): State<Backend>, headers: HeaderMap) -> Response {
    b.record("users", &headers, HashMap::new(), Value::Null);
    detail(StatusCode::UNAUTHORIZED, "Could not validate credentials")
}

fn user(id: i64) -> Value {
    json!({"id": id, "email": "ops@signage.test", "role": "admin", "site_id": 2})
}

async fn get_user(State(b): State<Backend>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    b.record("user", &headers, HashMap::new(), Value::Null);
    match id {
        5 => Json(user(5)).into_response(),
        _ => detail(StatusCode::NOT_FOUND, "Utilisateur non trouvé"),
    }
}

async fn create_user(State(b): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    b.record("user-create", &headers, HashMap::new(), body.clone());
    Json(json!({
        "id": 6,
        "email": body["email"],
        "role": body["role"],
        "site_id": body["site_id"]
    }))
    .into_response()
}

async fn update_user(
    State(b): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    b.record("user-update", &headers, HashMap::new(), body.clone());
    let mut updated = user(id);
    if let (Some(target), Some(changes)) = (updated.as_object_mut(), body.as_object()) {
        for (key, value) in changes.iter().filter(|(key, _)| key.as_str() != "password") {
            target.insert(key.clone(), value.clone());
        }
    }
    Json(updated).into_response()
}

async fn delete_user(State(b): State<Backend>, headers: HeaderMap, Path(_id): Path<i64>) -> Response {
    b.record("user-delete", &headers, HashMap::new(), Value::Null);
    Json(json!({"message": "Utilisateur supprimé avec succès"})).into_response()
}

async fn upload(State(b): State<Backend>, headers: HeaderMap, mut multipart: Multipart) -> Response {
    let mut fields = HashMap::new();
    let mut file_name = String::new();
    let mut file_body = String::new();

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            file_name = field.file_name().unwrap_or_default().to_string();
            file_body = field.text().await.unwrap_or_default();
        } else {
            fields.insert(name, field.text().await.unwrap_or_default());
        }
    }

    let site = fields.get("site_name").cloned().unwrap_or_default();
    let replace = fields.get("replace").map(String::as_str) == Some("true");
    b.record(
        "upload",
        &headers,
        fields,
        json!({"file_name": file_name, "file_body": file_body}),
    );

    let path = format!("{site}/{file_name}");
    let mut media = b.media.lock();
    if media.contains(&path) && !replace {
        return detail(StatusCode::CONFLICT, "Fichier déjà existant");
    }
    if !media.contains(&path) {
        media.push(path.clone());
    }
    Json(json!({"status": "success", "file_path": format!("/media/{path}")})).into_response()
}

async fn list_media(
    State(b): State<Backend>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let site = query.get("site_name").cloned().unwrap_or_default();
    b.record("media-list", &headers, query, Value::Null);
    let files: Vec<Value> = b
        .media
        .lock()
        .iter()
        .filter_map(|path| path.split_once('/'))
        .filter(|(s, _)| *s == site)
        .map(|(s, f)| json!({"filename": f, "site_name": s}))
        .collect();
    Json(json!({ "files": files })).into_response()
}

async fn delete_media(
    State(b): State<Backend>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let path = format!(
        "{}/{}",
        query.get("site_name").cloned().unwrap_or_default(),
        query.get("filename").cloned().unwrap_or_default()
    );
    let file = query.get("filename").cloned().unwrap_or_default();
    b.record("media-delete", &headers, query, Value::Null);
    b.media.lock().retain(|p| *p != path);
    Json(json!({"status": "deleted", "file": file})).into_response()
}

fn router(backend: Backend) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/change-password", post(change_password))
        .route("/api/auth/me", get(me))
        .route("/api/devices/", get(list_devices).post(create_device))
        .route("/api/devices/statistics", get(statistics))
        .route(
            "/api/devices/{id}",
            get(get_device).put(update_device).delete(delete_device),
        )
        .route("/api/devices/{id}/action", post(device_action))
        .route("/api/sites/", get(list_sites).post(create_site))
        .route(
            "/api/sites/{id}",
            get(get_site).put(update_site).delete(delete_site),
        )
        .route("/api/users/", get(list_users).post(create_user))
        .route(
            "/api/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/api/media/upload", post(upload))
        .route("/api/media/list", get(list_media))
        .route("/api/media/delete", delete(delete_media))
        .with_state(backend)
}

/// Starts the mock backend and returns its API base URL.
pub async fn spawn_backend(backend: Backend) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock backend");
    let addr = listener.local_addr().expect("local addr");
    let app = router(backend);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock backend");
    });
    format!("http://{addr}/api")
}

/// Base URL of a port nothing listens on.
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}/api")
}

#[derive(Debug, Default)]
pub struct CountingRedirect {
    count: AtomicUsize,
    paths: Mutex<Vec<String>>,
}

impl CountingRedirect {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().clone()
    }
}

impl LoginRedirect for CountingRedirect {
    fn redirect_to_login(&self, path: &str) {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.paths.lock().push(path.to_string());
    }
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    successes: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn successes(&self) -> Vec<String> {
        self.successes.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.successes.lock().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().push(message.to_string());
    }
}

/// A client wired to a fresh mock backend with recording hooks.
pub struct Harness {
    pub backend: Backend,
    pub storage: Arc<MemoryStorage>,
    pub redirects: Arc<CountingRedirect>,
    pub notes: Arc<RecordingNotifier>,
    pub client: ApiClient,
}

impl Harness {
    pub async fn start() -> Self {
        let backend = Backend::default();
        let base_url = spawn_backend(backend.clone()).await;
        Self::with_base_url(backend, &base_url)
    }

    pub async fn unreachable() -> Self {
        let base_url = unreachable_base_url().await;
        Self::with_base_url(Backend::default(), &base_url)
    }

    fn with_base_url(backend: Backend, base_url: &str) -> Self {
        init_tracing();
        let storage = Arc::new(MemoryStorage::new());
        let redirects = Arc::new(CountingRedirect::default());
        let client = ApiClient::new(ApiConfig::new(base_url).expect("config"), storage.clone())
            .expect("client")
            .with_login_redirect(redirects.clone());

        Self {
            backend,
            storage,
            redirects,
            notes: Arc::new(RecordingNotifier::default()),
            client,
        }
    }

    pub fn sessions(&self) -> SessionManager {
        SessionManager::new(self.client.clone()).with_notifier(self.notes.clone())
    }
}
