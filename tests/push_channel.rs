use futures::{SinkExt, StreamExt};
use messenger_gtk::api::models::{OpenedChat, OtherUser};
use messenger_gtk::api::socket::{PushChannel, ws_url};
use messenger_gtk::session::UiSession;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use url::Url;

async fn listener() -> (TcpListener, Url) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();
    (listener, base)
}

fn opened(chat_id: i64) -> OpenedChat {
    OpenedChat {
        chat_id,
        other_user: OtherUser {
            username: format!("peer{chat_id}"),
            phone: format!("+1415555{chat_id:04}"),
            ..Default::default()
        },
        messages: Vec::new(),
        created: true,
    }
}

#[tokio::test]
async fn frames_flow_both_ways() {
    let (listener, base) = listener().await;
    let (seen_tx, seen_rx) = oneshot::channel::<(String, Option<String>)>();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut seen_tx = Some(seen_tx);
        let callback = move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
            let cookie = req
                .headers()
                .get("cookie")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            if let Some(tx) = seen_tx.take() {
                let _ = tx.send((req.uri().path().to_string(), cookie));
            }
            Ok(resp)
        };
        let mut ws = tokio_tungstenite::accept_hdr_async(stream, callback).await.unwrap();

        let pushed = r#"{"type": "message", "sender": "user_+14155552671", "message": "hi", "timestamp": "2024-05-01T09:00:00", "message_id": 9}"#;
        ws.send(Message::Text(pushed.to_string())).await.unwrap();

        let outgoing = loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => break text,
                Some(Ok(_)) => continue,
                other => panic!("unexpected {other:?}"),
            }
        };
        serde_json::from_str::<serde_json::Value>(&outgoing).unwrap()
    });

    let url = ws_url(&base, 4).unwrap();
    let (channel, mut frames) = PushChannel::connect(url, Some("sessionid=s1; csrftoken=c2".into()), 4)
        .await
        .unwrap();
    assert_eq!(channel.chat_id(), 4);

    let (path, cookie) = seen_rx.await.unwrap();
    assert_eq!(path, "/ws/chat/4/");
    assert_eq!(cookie.as_deref(), Some("sessionid=s1; csrftoken=c2"));

    let frame = tokio::time::timeout(Duration::from_secs(5), frames.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(frame.id, Some(9));
    assert_eq!(frame.message, "hi");

    channel.send_message("yo").unwrap();
    let written = tokio::time::timeout(Duration::from_secs(5), server).await.unwrap().unwrap();
    assert_eq!(written, serde_json::json!({ "type": "message", "message": "yo" }));
}

#[tokio::test]
async fn switching_chats_hands_back_the_old_channel() {
    let (listener, base) = listener().await;
    let server = tokio::spawn(async move {
        let mut sockets = Vec::new();
        for _ in 0..2 {
            let (stream, _) = listener.accept().await.unwrap();
            sockets.push(tokio_tungstenite::accept_async(stream).await.unwrap());
        }
        // Hold both open until the client is done.
        tokio::time::sleep(Duration::from_secs(2)).await;
        drop(sockets);
    });

    let mut session = UiSession::new("me");
    assert!(session.open_chat(&opened(4), "+14155550004").is_none());

    let (first, _first_frames) = PushChannel::connect(ws_url(&base, 4).unwrap(), None, 4).await.unwrap();
    let (early, _early_frames) = PushChannel::connect(ws_url(&base, 5).unwrap(), None, 5).await.unwrap();

    // A channel for a chat that is not open is refused.
    let refused = session.attach_channel(early).unwrap_err();
    assert_eq!(refused.chat_id(), 5);
    refused.close();

    assert!(session.attach_channel(first).is_ok());
    assert!(session.has_channel());

    let previous = session.open_chat(&opened(5), "+14155550005").unwrap();
    assert_eq!(previous.chat_id(), 4);
    assert!(!session.has_channel());
    previous.close();

    server.abort();
}

#[tokio::test]
async fn opening_another_chat_closes_the_old_socket() {
    let (listener, base) = listener().await;
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        loop {
            match ws.next().await {
                Some(Ok(Message::Close(_))) => break true,
                Some(Ok(_)) => continue,
                _ => break false,
            }
        }
    });

    let mut session = UiSession::new("me");
    assert!(session.open_chat(&opened(4), "+14155550004").is_none());
    let (channel, _frames) = PushChannel::connect(ws_url(&base, 4).unwrap(), None, 4).await.unwrap();
    assert!(session.attach_channel(channel).is_ok());

    let previous = session.open_chat(&opened(5), "+14155550005").unwrap();
    assert_eq!(previous.chat_id(), 4);
    drop(previous);

    let saw_close = tokio::time::timeout(Duration::from_secs(5), server).await.unwrap().unwrap();
    assert!(saw_close);
}
