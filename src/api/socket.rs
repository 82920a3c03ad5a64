use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::COOKIE;
use url::Url;

use crate::api::error::{ApiError, ApiResult};
use crate::api::events::{IncomingFrame, OutgoingFrame};

/// Socket URL for a chat: `ws://` next to an `http` base, `wss://` next to
/// an `https` one.
pub fn ws_url(base: &Url, chat_id: i64) -> ApiResult<Url> {
    let mut url = base.clone();
    let scheme = if base.scheme() == "https" { "wss" } else { "ws" };
    url.set_scheme(scheme)
        .map_err(|_| ApiError::SocketSetup(format!("no socket URL for {base}")))?;
    url.set_path(&format!("/ws/chat/{chat_id}/"));
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// The live-update connection for one open chat.
///
/// Incoming frames arrive on the receiver returned by [`PushChannel::connect`]
/// in the order the server sent them. Dropping the handle closes the socket.
pub struct PushChannel {
    chat_id: i64,
    outgoing: mpsc::UnboundedSender<WsMessage>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl PushChannel {
    /// Must be called from within the tokio runtime.
    pub async fn connect(
        url: Url,
        cookie: Option<String>,
        chat_id: i64,
    ) -> ApiResult<(Self, mpsc::UnboundedReceiver<IncomingFrame>)> {
        let mut request = url.as_str().into_client_request()?;
        if let Some(cookie) = cookie {
            let value = HeaderValue::from_str(&cookie)
                .map_err(|e| ApiError::SocketSetup(format!("invalid cookie header: {e}")))?;
            request.headers_mut().insert(COOKIE, value);
        }

        let (stream, _) = connect_async(request).await?;
        info!("push channel connected for chat {chat_id}");
        let (mut sink, mut source) = stream.split();

        let (frames_tx, frames_rx) = mpsc::unbounded_channel();
        let (outgoing, mut outgoing_rx) = mpsc::unbounded_channel::<WsMessage>();

        let writer = tokio::spawn(async move {
            while let Some(msg) = outgoing_rx.recv().await {
                let closing = matches!(msg, WsMessage::Close(_));
                if let Err(e) = sink.send(msg).await {
                    warn!("push channel write failed: {e}");
                    break;
                }
                if closing {
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let reader = tokio::spawn(async move {
            while let Some(msg) = source.next().await {
                match msg {
                    Ok(WsMessage::Text(text)) => match IncomingFrame::parse(&text) {
                        Ok(frame) => {
                            if frames_tx.send(frame).is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("dropping undecodable push frame: {e}"),
                    },
                    Ok(WsMessage::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("push channel error: {e}");
                        break;
                    }
                }
            }
            debug!("push channel for chat {chat_id} closed");
        });

        Ok((Self { chat_id, outgoing, reader, writer }, frames_rx))
    }

    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }

    pub fn is_open(&self) -> bool {
        !self.writer.is_finished() && !self.reader.is_finished()
    }

    pub fn send_message(&self, text: &str) -> ApiResult<()> {
        if !self.is_open() {
            return Err(ApiError::NotConnected);
        }
        let frame = serde_json::to_string(&OutgoingFrame::Message { message: text.to_string() })?;
        self.outgoing
            .send(WsMessage::Text(frame))
            .map_err(|_| ApiError::NotConnected)
    }

    pub fn close(self) {
        drop(self);
    }
}

impl Drop for PushChannel {
    fn drop(&mut self) {
        debug!("closing push channel for chat {}", self.chat_id);
        let _ = self.outgoing.send(WsMessage::Close(None));
        self.reader.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_http_uses_ws() {
        let base = Url::parse("http://127.0.0.1:8000/").unwrap();
        assert_eq!(ws_url(&base, 7).unwrap().as_str(), "ws://127.0.0.1:8000/ws/chat/7/");
    }

    #[test]
    fn https_uses_wss_and_drops_query() {
        let base = Url::parse("https://chat.example.com/app?x=1").unwrap();
        assert_eq!(ws_url(&base, 12).unwrap().as_str(), "wss://chat.example.com/ws/chat/12/");
    }

    #[test]
    fn opaque_base_is_a_setup_error() {
        let base = Url::parse("mailto:someone@example.com").unwrap();
        assert!(matches!(ws_url(&base, 1), Err(ApiError::SocketSetup(_))));
    }

    #[tokio::test]
    async fn bad_cookie_fails_before_connecting() {
        let url = Url::parse("ws://127.0.0.1:9/ws/chat/1/").unwrap();
        let res = PushChannel::connect(url, Some("sessionid=a\nb".into()), 1).await;
        assert!(matches!(res, Err(ApiError::SocketSetup(_))));
    }
}
