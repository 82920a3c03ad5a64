use messenger_gtk::api::models::{ChatAction, ProfileField};
use messenger_gtk::api::{ApiClient, ApiError};
use messenger_gtk::session::login::LoginForm;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

#[derive(Debug)]
struct Recorded {
    request_line: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl Recorded {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is JSON")
    }
}

fn reply(status: &str, extra_headers: &[&str], body: &str) -> String {
    let mut out = format!("HTTP/1.1 {status}\r\nContent-Type: application/json\r\nConnection: close\r\n");
    for header in extra_headers {
        out.push_str(header);
        out.push_str("\r\n");
    }
    out.push_str(&format!("Content-Length: {}\r\n\r\n{body}", body.len()));
    out
}

async fn read_request(stream: &mut TcpStream) -> Recorded {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let head_end = loop {
        let n = stream.read(&mut chunk).await.expect("read request");
        assert!(n > 0, "client closed before sending headers");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let mut lines = head.split("\r\n").filter(|l| !l.is_empty());
    let request_line = lines.next().unwrap_or_default().to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();
    let length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = buf[head_end..].to_vec();
    while body.len() < length {
        let n = stream.read(&mut chunk).await.expect("read body");
        assert!(n > 0, "client closed mid-body");
        body.extend_from_slice(&chunk[..n]);
    }
    Recorded { request_line, headers, body: String::from_utf8_lossy(&body).to_string() }
}

/// Serve `responses` in order, one connection each, and hand back what the
/// client sent.
async fn serve(responses: Vec<String>) -> (String, JoinHandle<Vec<Recorded>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        let mut seen = Vec::new();
        for response in responses {
            let (mut stream, _) = listener.accept().await.unwrap();
            seen.push(read_request(&mut stream).await);
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
        }
        seen
    });
    (base, handle)
}

#[tokio::test]
async fn csrf_cookie_is_sent_back_as_header() {
    let (base, server) = serve(vec![
        reply("200 OK", &["Set-Cookie: csrftoken=tok123; Path=/"], "{}"),
        reply("200 OK", &[], r#"{"is_archived": true, "has_unread": false, "is_favourite": false}"#),
    ])
    .await;
    let client = ApiClient::new(&base).unwrap();
    assert_eq!(client.csrf_token(), None);

    client.bootstrap_csrf().await.unwrap();
    assert_eq!(client.csrf_token().as_deref(), Some("tok123"));

    let status = client.toggle_chat("+14155552671", ChatAction::Archive).await.unwrap();
    assert!(status.is_archived);

    let seen = server.await.unwrap();
    assert_eq!(seen[0].request_line, "GET /login/ HTTP/1.1");
    assert_eq!(seen[1].request_line, "POST /api/chat-toggle/ HTTP/1.1");
    assert_eq!(seen[1].header("x-csrftoken"), Some("tok123"));
    assert!(seen[1].header("cookie").unwrap_or_default().contains("csrftoken=tok123"));
    assert_eq!(seen[1].json(), serde_json::json!({ "phone": "+14155552671", "action": "archive" }));
}

#[tokio::test]
async fn server_error_text_wins_over_status() {
    let (base, server) = serve(vec![reply("404 Not Found", &[], r#"{"error": "User not found"}"#)]).await;
    let client = ApiClient::new(&base).unwrap();
    match client.get_or_create_chat("+10000000000").await {
        Err(ApiError::Server(text)) => assert_eq!(text, "User not found"),
        other => panic!("unexpected {other:?}"),
    }
    let seen = server.await.unwrap();
    assert_eq!(seen[0].request_line, "POST /api/get_or_create_chat/ HTTP/1.1");
    assert_eq!(seen[0].json(), serde_json::json!({ "phone": "+10000000000" }));
}

#[tokio::test]
async fn plain_failure_maps_to_http_error() {
    let (base, _server) = serve(vec![reply("500 Internal Server Error", &[], "oops")]).await;
    let client = ApiClient::new(&base).unwrap();
    match client.active_chats().await {
        Err(ApiError::Http { status, .. }) => assert_eq!(status, 500),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn opened_chat_decodes_history() {
    let body = r#"{
        "chat_id": 12,
        "other_user": {"username": "Ana", "phone": "+14155552671", "profile_pic": "", "about": "Around", "parsed_phone": "+1 4155552671"},
        "messages": [
            {"id": 1, "text": "hi", "timestamp": "2024-05-01T09:00:00", "sender_username": "user_+14155552671", "delivered": true, "read": false}
        ],
        "created": false
    }"#;
    let (base, _server) = serve(vec![reply("200 OK", &[], body)]).await;
    let client = ApiClient::new(&base).unwrap();
    let opened = client.get_or_create_chat("+14155552671").await.unwrap();
    assert_eq!(opened.chat_id, 12);
    assert_eq!(opened.other_user.username, "Ana");
    assert_eq!(opened.other_user.about_line(), "Around");
    assert_eq!(opened.other_user.display_phone(), "+1 4155552671");
    assert_eq!(opened.messages.len(), 1);
    assert!(opened.messages[0].delivered);
}

#[tokio::test]
async fn login_flow_requests() {
    let (base, server) = serve(vec![
        reply("200 OK", &[], r#"{"exists": false}"#),
        reply("200 OK", &[], r#"{"success": true}"#),
        reply("200 OK", &["Set-Cookie: sessionid=s1; Path=/"], r#"{"success": true}"#),
    ])
    .await;
    let client = ApiClient::new(&base).unwrap();
    assert!(!client.check_phone("+14155552671").await.unwrap());
    client.register("+14155552671", "pw").await.unwrap();
    client.login("+14155552671", "pw").await.unwrap();
    assert!(client.has_session());

    let seen = server.await.unwrap();
    assert_eq!(seen[0].request_line, "POST /check-phone/ HTTP/1.1");
    assert_eq!(seen[1].request_line, "POST /register/ HTTP/1.1");
    assert_eq!(seen[1].json(), serde_json::json!({ "phone": "+14155552671", "password": "pw" }));
    assert_eq!(seen[2].request_line, "POST /api/login/ HTTP/1.1");
    assert_eq!(seen[2].json(), serde_json::json!({ "fullPhone": "+14155552671", "password": "pw" }));
}

#[tokio::test]
async fn read_receipt_and_profile_update_paths() {
    let (base, server) = serve(vec![reply("200 OK", &[], "{}"), reply("200 OK", &[], "{}")]).await;
    let client = ApiClient::new(&base).unwrap();
    client.mark_message_read(42).await.unwrap();
    client.update_profile_field(ProfileField::About, "Busy").await.unwrap();

    let seen = server.await.unwrap();
    assert_eq!(seen[0].request_line, "POST /api/messages/42/mark-read/ HTTP/1.1");
    assert_eq!(seen[0].json(), serde_json::json!({ "read": true }));
    assert_eq!(seen[1].request_line, "PUT /api/setup/ HTTP/1.1");
    assert_eq!(seen[1].json(), serde_json::json!({ "about": "Busy" }));
}

#[tokio::test]
async fn own_profile_comes_from_search_echo() {
    let body = r#"{"chats": [], "people": [], "messages": [], "selfUser": {"name": "Me", "about": "Around", "fullphone": "+14155552671"}}"#;
    let (base, server) = serve(vec![reply("200 OK", &[], body)]).await;
    let client = ApiClient::new(&base).unwrap();
    let me = client.own_profile("+14155552671").await.unwrap().unwrap();
    assert_eq!(me.name.as_deref(), Some("Me"));
    assert_eq!(me.about.as_deref(), Some("Around"));

    let seen = server.await.unwrap();
    assert_eq!(seen[0].request_line, "GET /api/search-users?q=%2B14155552671 HTTP/1.1");
}

#[tokio::test]
async fn chat_status_query_and_badge() {
    let (base, server) = serve(vec![reply("200 OK", &[], r#"{"is_archived": false, "has_unread": true, "is_favourite": true}"#)]).await;
    let client = ApiClient::new(&base).unwrap();
    let status = client.chat_status("+14155552671").await.unwrap();
    assert!(status.is_favourite);
    assert_eq!(status.badge_count(), 1);

    let seen = server.await.unwrap();
    assert_eq!(seen[0].request_line, "GET /api/chat-status/?phone=%2B14155552671 HTTP/1.1");
}

#[tokio::test]
async fn rejected_sign_in_shows_fixed_text() {
    let (base, _server) = serve(vec![reply("400 Bad Request", &[], r#"{"error": "Invalid phone or password"}"#)]).await;
    let client = ApiClient::new(&base).unwrap();
    let mut form = LoginForm::new("+1");
    form.set_number("4155552671");
    form.on_phone_checked(true);
    let creds = form.prepare_login("wrong").unwrap();

    match client.login(&creds.full_phone, &creds.password).await {
        Err(ApiError::Server(text)) => assert_eq!(text, "Invalid phone or password"),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(form.failure_text(), "Error: Login failed");
}
