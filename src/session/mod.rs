//! Toolkit-independent state of the chat window.
//!
//! Everything the window shows is derived from a single [`UiSession`]; the
//! GTK layer renders it and feeds user input and server replies back in.

pub mod bubbles;
pub mod chat;
pub mod context_menu;
pub mod login;
pub mod profile;
pub mod read_tracker;
pub mod rolls;
pub mod search;
pub mod view;

use log::{debug, info};

use crate::api::error::{ApiError, ApiResult};
use crate::api::events::IncomingFrame;
use crate::api::models::OpenedChat;
use crate::api::socket::PushChannel;

pub use bubbles::Bubble;
pub use chat::ActiveChat;
pub use context_menu::ContextMenu;
pub use profile::ProfileEditor;
pub use read_tracker::ReadTracker;
pub use rolls::ChatRolls;
pub use search::SearchPanel;
pub use view::ViewSwitcher;

pub struct UiSession {
    /// Username the server stamps on our own messages.
    current_user: String,
    pub view: ViewSwitcher,
    pub rolls: ChatRolls,
    pub reads: ReadTracker,
    pub menu: ContextMenu,
    pub profile: ProfileEditor,
    pub search: SearchPanel,
    chat: Option<ActiveChat>,
    channel: Option<PushChannel>,
}

impl UiSession {
    pub fn new(current_user: &str) -> Self {
        Self {
            current_user: current_user.to_string(),
            view: ViewSwitcher::new(),
            rolls: ChatRolls::new(),
            reads: ReadTracker::new(),
            menu: ContextMenu::new(),
            profile: ProfileEditor::default(),
            search: SearchPanel::new(),
            chat: None,
            channel: None,
        }
    }

    pub fn current_user(&self) -> &str {
        &self.current_user
    }

    pub fn chat(&self) -> Option<&ActiveChat> {
        self.chat.as_ref()
    }

    pub fn current_chat_id(&self) -> Option<i64> {
        self.chat.as_ref().map(|c| c.chat_id)
    }

    pub fn current_phone(&self) -> Option<&str> {
        self.chat.as_ref().map(|c| c.phone.as_str())
    }

    /// Replace the open chat with `opened`. The previous push channel is
    /// detached and returned so the caller closes it before connecting the
    /// next one.
    pub fn open_chat(&mut self, opened: &OpenedChat, phone: &str) -> Option<PushChannel> {
        let previous = self.channel.take();
        let chat = ActiveChat::from_opened(opened, phone, &self.current_user);
        self.reads.reset_watch();
        for id in chat.received_ids() {
            self.reads.watch(id);
        }
        info!("opened chat {} with {} messages", chat.chat_id, chat.bubbles.len());
        self.chat = Some(chat);
        self.view.enter_chat();
        previous
    }

    /// Attach the push channel for the open chat. A channel for a chat that
    /// is no longer open is handed back to be dropped.
    pub fn attach_channel(&mut self, channel: PushChannel) -> Result<(), PushChannel> {
        if self.current_chat_id() != Some(channel.chat_id()) {
            debug!("discarding push channel for stale chat {}", channel.chat_id());
            return Err(channel);
        }
        if let Some(old) = self.channel.replace(channel) {
            old.close();
        }
        Ok(())
    }

    pub fn has_channel(&self) -> bool {
        self.channel.as_ref().is_some_and(|c| c.is_open())
    }

    /// Detach the channel, e.g. on logout.
    pub fn take_channel(&mut self) -> Option<PushChannel> {
        self.channel.take()
    }

    /// Append a pushed frame for chat `chat_id`. Frames for another chat,
    /// or arriving with no chat open, are dropped.
    pub fn push_frame(&mut self, chat_id: i64, frame: &IncomingFrame) -> Option<&Bubble> {
        let me = self.current_user.clone();
        let chat = self.chat.as_mut().filter(|c| c.chat_id == chat_id)?;
        let bubble = chat.push(frame, &me);
        if !bubble.is_sent() {
            if let Some(id) = bubble.message_id {
                self.reads.watch(id);
            }
        }
        Some(bubble)
    }

    /// Send composer text. Blank text is ignored (`Ok(false)`).
    pub fn send(&self, text: &str) -> ApiResult<bool> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(false);
        }
        let channel = self.channel.as_ref().ok_or(ApiError::NotConnected)?;
        channel.send_message(text)?;
        Ok(true)
    }

    /// A received bubble crossed the visibility threshold. Returns the id and
    /// phone to report read, once per id.
    pub fn observe_read(&mut self, message_id: i64, fraction: f64) -> Option<(i64, String)> {
        let phone = self.current_phone()?.to_string();
        self.reads.observe(message_id, fraction).then_some((message_id, phone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{HistoryMessage, OtherUser};

    fn opened(chat_id: i64) -> OpenedChat {
        OpenedChat {
            chat_id,
            other_user: OtherUser {
                username: "Ana".into(),
                phone: "+14155552671".into(),
                ..Default::default()
            },
            messages: vec![
                HistoryMessage {
                    id: 1,
                    text: "hi".into(),
                    timestamp: "2024-05-01T09:00:00".into(),
                    sender_username: "user_+14155552671".into(),
                    delivered: true,
                    read: false,
                },
                HistoryMessage {
                    id: 2,
                    text: "hello".into(),
                    timestamp: "2024-05-01T09:01:00".into(),
                    sender_username: "me".into(),
                    delivered: true,
                    read: true,
                },
            ],
            created: false,
        }
    }

    #[test]
    fn opening_a_chat_watches_received_history() {
        let mut session = UiSession::new("me");
        assert!(session.open_chat(&opened(4), "+14155552671").is_none());
        assert_eq!(session.current_chat_id(), Some(4));
        assert_eq!(session.reads.pending().collect::<Vec<_>>(), vec![1]);
        assert!(session.view.chat_view_activated());
    }

    #[test]
    fn pushed_frames_append_in_arrival_order() {
        let mut session = UiSession::new("me");
        session.open_chat(&opened(4), "+14155552671");
        for (id, text) in [(3, "one"), (4, "two")] {
            let frame = IncomingFrame {
                sender: "user_+14155552671".into(),
                message: text.into(),
                id: Some(id),
                ..Default::default()
            };
            session.push_frame(4, &frame).unwrap();
        }
        let texts: Vec<&str> = session.chat().unwrap().bubbles.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["hi", "hello", "one", "two"]);
        let bubbles = &session.chat().unwrap().bubbles;
        assert!(bubbles[2].first_in_group);
        assert!(!bubbles[3].first_in_group);
        assert_eq!(session.reads.pending().collect::<Vec<_>>(), vec![1, 3, 4]);
    }

    #[test]
    fn frames_for_other_chats_are_dropped() {
        let mut session = UiSession::new("me");
        assert!(session.push_frame(4, &IncomingFrame::default()).is_none());
        session.open_chat(&opened(4), "+1");
        assert!(session.push_frame(5, &IncomingFrame::default()).is_none());
    }

    #[test]
    fn sending_requires_a_channel() {
        let mut session = UiSession::new("me");
        assert!(!session.send("   ").unwrap());
        assert!(matches!(session.send("hi"), Err(ApiError::NotConnected)));
        session.open_chat(&opened(4), "+1");
        assert!(!session.has_channel());
        assert!(matches!(session.send("hi"), Err(ApiError::NotConnected)));
    }

    #[test]
    fn read_reports_carry_the_chat_phone() {
        let mut session = UiSession::new("me");
        assert_eq!(session.observe_read(1, 1.0), None);
        session.open_chat(&opened(4), "+14155552671");
        assert_eq!(session.observe_read(1, 0.2), None);
        assert_eq!(session.observe_read(1, 0.6), Some((1, "+14155552671".to_string())));
        assert_eq!(session.observe_read(1, 0.6), None);
        assert_eq!(session.observe_read(2, 1.0), None);
    }
}
