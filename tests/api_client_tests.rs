//! ApiClient against an in-process axum server
//!
//! The server mimics the collaborator API closely enough to check request
//! shapes (multipart fields, bearer header, JSON bodies) and the mapping of
//! statuses onto `HorizonError`.

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use horizon::api::{ApiClient, AssistantApi, AudioClip, ChatPayload, ChatRequest, ProfileUpdate};
use horizon::messages::Sender;
use horizon::{HorizonError, Language};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const TOKEN: &str = "good-token";

#[derive(Default)]
struct Seen {
    /// Multipart fields of the last chat request; files as "file:<name>:<len>"
    chat_fields: HashMap<String, String>,
    authorization: Vec<String>,
    tts_bodies: Vec<Value>,
    deleted: Vec<String>,
    cleared: bool,
    profile_bodies: Vec<Value>,
    password_bodies: Vec<Value>,
    account_deleted: bool,
}

type Shared = Arc<Mutex<Seen>>;

fn authorized(seen: &Shared, headers: &HeaderMap) -> bool {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let ok = auth == format!("Bearer {}", TOKEN);
    seen.lock().authorization.push(auth);
    ok
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "Could not validate credentials" })),
    )
        .into_response()
}

async fn chat(State(seen): State<Shared>, headers: HeaderMap, mut multipart: Multipart) -> Response {
    if !authorized(&seen, &headers) {
        return unauthorized();
    }
    let mut fields = HashMap::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let data = field.bytes().await.unwrap();
        let value = match file_name {
            Some(file) => format!("file:{}:{}", file, data.len()),
            None => String::from_utf8_lossy(&data).to_string(),
        };
        fields.insert(name, value);
    }

    let user_text = fields
        .get("message")
        .cloned()
        .unwrap_or_else(|| "transcribed question".to_string());
    seen.lock().chat_fields = fields;

    Json(json!({
        "response_text": "Onion prices are rising ||| Stock up before the festival.",
        "user_text": user_text,
        "audio_url": null,
        "detected_language": "hi-IN",
    }))
    .into_response()
}

async fn tts(State(seen): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&seen, &headers) {
        return unauthorized();
    }
    let text = body["text"].as_str().unwrap_or_default().to_string();
    seen.lock().tts_bodies.push(body);
    match text.as_str() {
        "boom" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": "TTS engine crashed" })),
        )
            .into_response(),
        "silence" => Json(json!({ "audio_url": null })).into_response(),
        _ => Json(json!({ "audio_url": "/static/audio/answer.mp3" })).into_response(),
    }
}

async fn audio_file() -> Response {
    (StatusCode::OK, b"ID3\x04audio".to_vec()).into_response()
}

async fn history(State(seen): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&seen, &headers) {
        return unauthorized();
    }
    Json(json!([
        { "id": 41, "text": "Will it rain?", "sender": "user", "timestamp": "2024-06-01T09:30:00.123456" },
        { "id": "42", "text": "Light showers ||| Carry a cover.", "sender": "ai", "timestamp": "2024-06-01T09:30:02Z" }
    ]))
    .into_response()
}

async fn clear(State(seen): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&seen, &headers) {
        return unauthorized();
    }
    seen.lock().cleared = true;
    Json(json!({ "message": "History cleared" })).into_response()
}

async fn delete_one(
    State(seen): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&seen, &headers) {
        return unauthorized();
    }
    if id == "404" {
        return (StatusCode::NOT_FOUND, Json(json!({ "detail": "Message not found" }))).into_response();
    }
    seen.lock().deleted.push(id);
    Json(json!({ "message": "Message deleted" })).into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] == "secret" {
        Json(json!({
            "access_token": TOKEN,
            "token_type": "bearer",
            "username": body["username"],
        }))
        .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Invalid credentials" })),
        )
            .into_response()
    }
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["username"] == "taken" {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "Username already registered" })),
        )
            .into_response()
    } else {
        Json(json!({ "message": "User created successfully" })).into_response()
    }
}

async fn profile(State(seen): State<Shared>, headers: HeaderMap) -> Response {
    if headers.get("authorization").and_then(|v| v.to_str().ok()) == Some("Bearer slow") {
        tokio::time::sleep(Duration::from_secs(3)).await;
    }
    if !authorized(&seen, &headers) {
        return unauthorized();
    }
    Json(json!({ "username": "asha", "display_name": "Asha Devi" })).into_response()
}

async fn update_profile(State(seen): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&seen, &headers) {
        return unauthorized();
    }
    let display_name = body.get("display_name").cloned().unwrap_or(json!("Asha Devi"));
    let avatar_url = body.get("avatar_url").cloned().unwrap_or(Value::Null);
    seen.lock().profile_bodies.push(body);
    Json(json!({
        "message": "Profile updated successfully",
        "user": { "username": "asha", "display_name": display_name, "avatar_url": avatar_url },
    }))
    .into_response()
}

async fn delete_account(State(seen): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&seen, &headers) {
        return unauthorized();
    }
    seen.lock().account_deleted = true;
    Json(json!({ "message": "Profile deleted successfully" })).into_response()
}

async fn change_password(State(seen): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&seen, &headers) {
        return unauthorized();
    }
    let correct = body["current_password"] == "secret";
    seen.lock().password_bodies.push(body);
    if !correct {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Incorrect current password" })),
        )
            .into_response();
    }
    Json(json!({ "message": "Password updated successfully" })).into_response()
}

async fn reset_password(State(seen): State<Shared>, Json(body): Json<Value>) -> Response {
    let known = body["username"] == "asha";
    seen.lock().password_bodies.push(body);
    if !known {
        return (StatusCode::NOT_FOUND, Json(json!({ "detail": "User not found" }))).into_response();
    }
    Json(json!({ "message": "Password reset successfully" })).into_response()
}

async fn spawn_server() -> (String, Shared) {
    let seen: Shared = Arc::new(Mutex::new(Seen::default()));
    let app = Router::new()
        .route("/api/chat", post(chat))
        .route("/api/chat/tts", post(tts))
        .route("/api/chat/history", get(history).delete(clear))
        .route("/api/chat/history/{id}", delete(delete_one))
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route(
            "/api/auth/profile",
            get(profile).put(update_profile).delete(delete_account),
        )
        .route("/api/auth/change-password", post(change_password))
        .route("/api/auth/reset-password", post(reset_password))
        .route("/static/audio/answer.mp3", get(audio_file))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), seen)
}

fn client(base_url: &str) -> ApiClient {
    ApiClient::new(base_url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_text_chat_sends_form_fields() {
    let (url, seen) = spawn_server().await;
    let api = client(&url);

    let reply = api
        .chat(
            TOKEN,
            ChatRequest {
                payload: ChatPayload::Text("price of onion".into()),
                language: Language::Marathi,
            },
        )
        .await
        .unwrap();

    assert_eq!(reply.summary(), "Onion prices are rising");
    assert_eq!(reply.user_text.as_deref(), Some("price of onion"));
    assert_eq!(reply.audio_url, None);
    assert_eq!(reply.detected_language, Some(Language::Hindi));

    let seen = seen.lock();
    assert_eq!(seen.chat_fields.get("message").map(String::as_str), Some("price of onion"));
    assert_eq!(seen.chat_fields.get("language").map(String::as_str), Some("mr"));
    assert!(!seen.chat_fields.contains_key("audio"));
    assert_eq!(seen.authorization, vec![format!("Bearer {}", TOKEN)]);
}

#[tokio::test]
async fn test_voice_chat_uploads_wav() {
    let (url, seen) = spawn_server().await;
    let api = client(&url);

    let reply = api
        .chat(
            TOKEN,
            ChatRequest {
                payload: ChatPayload::Audio(AudioClip::wav(vec![0; 44])),
                language: Language::English,
            },
        )
        .await
        .unwrap();

    assert_eq!(reply.user_text.as_deref(), Some("transcribed question"));
    let seen = seen.lock();
    let audio = seen.chat_fields.get("audio").unwrap();
    assert!(audio.starts_with("file:"), "audio part should be a file: {}", audio);
    assert!(audio.ends_with(":44"));
    assert!(!seen.chat_fields.contains_key("message"));
}

#[tokio::test]
async fn test_rejected_token_is_unauthorized() {
    let (url, _seen) = spawn_server().await;
    let api = client(&url);

    let err = api
        .chat(
            "stale-token",
            ChatRequest {
                payload: ChatPayload::Text("hi".into()),
                language: Language::English,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, HorizonError::Unauthorized));

    let err = api.history("stale-token").await.unwrap_err();
    assert!(matches!(err, HorizonError::Unauthorized));
}

#[tokio::test]
async fn test_synthesize_and_fetch_audio() {
    let (url, seen) = spawn_server().await;
    let api = client(&url);

    let audio_url = api
        .synthesize(TOKEN, "Onion prices are rising", Language::Tamil)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(audio_url, "/static/audio/answer.mp3");
    assert_eq!(
        seen.lock().tts_bodies[0],
        json!({ "text": "Onion prices are rising", "language": "ta" })
    );

    let bytes = api.fetch_audio(&audio_url).await.unwrap();
    assert_eq!(bytes, b"ID3\x04audio");

    let absolute = format!("{}{}", url, audio_url);
    assert_eq!(api.fetch_audio(&absolute).await.unwrap(), b"ID3\x04audio");

    let inline = api.fetch_audio("data:audio/mp3;base64,SUQzBA==").await.unwrap();
    assert_eq!(inline, b"ID3\x04");
}

#[tokio::test]
async fn test_synthesis_without_audio_and_server_error() {
    let (url, _seen) = spawn_server().await;
    let api = client(&url);

    assert_eq!(api.synthesize(TOKEN, "silence", Language::English).await.unwrap(), None);

    let err = api
        .synthesize(TOKEN, "boom", Language::English)
        .await
        .unwrap_err();
    match err {
        HorizonError::Transport(message) => assert!(message.contains("TTS engine crashed")),
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_history_parses_mixed_ids_and_timestamps() {
    let (url, _seen) = spawn_server().await;
    let api = client(&url);

    let messages = api.history(TOKEN).await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].id, "41");
    assert_eq!(messages[0].sender, Sender::User);
    assert_eq!(
        messages[0].timestamp.to_rfc3339(),
        "2024-06-01T09:30:00.123456+00:00"
    );
    assert_eq!(messages[1].id, "42");
    assert_eq!(messages[1].sender, Sender::Ai);
    assert_eq!(messages[1].spoken_summary(), "Light showers");
}

#[tokio::test]
async fn test_delete_and_clear_history() {
    let (url, seen) = spawn_server().await;
    let api = client(&url);

    api.delete_message(TOKEN, "42").await.unwrap();
    assert_eq!(seen.lock().deleted, vec!["42".to_string()]);

    let err = api.delete_message(TOKEN, "404").await.unwrap_err();
    assert!(matches!(err, HorizonError::Transport(_)));

    api.clear_history(TOKEN).await.unwrap();
    assert!(seen.lock().cleared);
}

#[tokio::test]
async fn test_login_and_register() {
    let (url, _seen) = spawn_server().await;
    let api = client(&url);

    let reply = api.login("asha", "secret").await.unwrap();
    assert_eq!(reply.access_token, TOKEN);
    assert_eq!(reply.username, "asha");

    // A refused login explains itself instead of ending a session
    let err = api.login("asha", "nope").await.unwrap_err();
    match err {
        HorizonError::Rejected(detail) => assert_eq!(detail, "Invalid credentials"),
        other => panic!("expected rejection, got {:?}", other),
    }

    api.register("ravi", "pw").await.unwrap();
    let err = api.register("taken", "pw").await.unwrap_err();
    assert_eq!(err.user_message(), "Username already registered");
}

#[tokio::test]
async fn test_profile() {
    let (url, _seen) = spawn_server().await;
    let profile = client(&url).profile(TOKEN).await.unwrap();
    assert_eq!(profile.username, "asha");
    assert_eq!(profile.display_name.as_deref(), Some("Asha Devi"));
    assert_eq!(profile.avatar_url, None);
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
    let (url, _seen) = spawn_server().await;
    let api = ApiClient::new(&url, Duration::from_millis(200)).unwrap();

    let err = api.profile("slow").await.unwrap_err();
    match err {
        HorizonError::Transport(message) => assert_eq!(message, "request timed out"),
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = client(&url).history(TOKEN).await.unwrap_err();
    assert!(matches!(err, HorizonError::Transport(_)));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_update_profile_sends_set_fields() {
    let (url, seen) = spawn_server().await;
    let api = client(&url);

    let profile = api
        .update_profile(
            TOKEN,
            &ProfileUpdate {
                display_name: None,
                avatar_url: Some("https://example.org/asha.png".into()),
            },
        )
        .await
        .unwrap();

    assert_eq!(profile.username, "asha");
    assert_eq!(profile.display_name.as_deref(), Some("Asha Devi"));
    assert_eq!(profile.avatar_url.as_deref(), Some("https://example.org/asha.png"));
    assert_eq!(
        seen.lock().profile_bodies,
        vec![json!({ "avatar_url": "https://example.org/asha.png" })]
    );

    let err = api
        .update_profile("stale-token", &ProfileUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, HorizonError::Unauthorized));
}

#[tokio::test]
async fn test_change_password_wrong_current_is_rejected() {
    let (url, seen) = spawn_server().await;
    let api = client(&url);

    api.change_password(TOKEN, "secret", "monsoon").await.unwrap();
    assert_eq!(
        seen.lock().password_bodies[0],
        json!({ "current_password": "secret", "new_password": "monsoon" })
    );

    // The 401 here is about the old password, not the session
    let err = api.change_password(TOKEN, "guess", "monsoon").await.unwrap_err();
    match err {
        HorizonError::Rejected(detail) => assert_eq!(detail, "Incorrect current password"),
        other => panic!("expected rejection, got {:?}", other),
    }
    assert_eq!(
        seen.lock().authorization,
        vec![format!("Bearer {}", TOKEN), format!("Bearer {}", TOKEN)]
    );
}

#[tokio::test]
async fn test_reset_password() {
    let (url, seen) = spawn_server().await;
    let api = client(&url);

    api.reset_password("asha", "monsoon").await.unwrap();
    assert_eq!(
        seen.lock().password_bodies[0],
        json!({ "username": "asha", "new_password": "monsoon" })
    );

    let err = api.reset_password("nobody", "monsoon").await.unwrap_err();
    match err {
        HorizonError::Rejected(detail) => assert_eq!(detail, "User not found"),
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_delete_account() {
    let (url, seen) = spawn_server().await;
    let api = client(&url);

    let err = api.delete_account("stale-token").await.unwrap_err();
    assert!(matches!(err, HorizonError::Unauthorized));
    assert!(!seen.lock().account_deleted);

    api.delete_account(TOKEN).await.unwrap();
    assert!(seen.lock().account_deleted);
}
