use crate::api::events::IncomingFrame;
use crate::api::models::{OpenedChat, OtherUser};
use crate::session::bubbles::{self, Bubble};

/// The chat currently shown in the chat pane.
#[derive(Debug, Clone)]
pub struct ActiveChat {
    pub chat_id: i64,
    /// Phone the chat was opened with; badge refreshes use it.
    pub phone: String,
    pub peer: OtherUser,
    pub bubbles: Vec<Bubble>,
}

impl ActiveChat {
    pub fn from_opened(opened: &OpenedChat, phone: &str, me: &str) -> Self {
        Self {
            chat_id: opened.chat_id,
            phone: phone.to_string(),
            peer: opened.other_user.clone(),
            bubbles: bubbles::history(&opened.messages, me),
        }
    }

    /// Ids of history bubbles the user has to see to mark read.
    pub fn received_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.bubbles
            .iter()
            .filter(|b| !b.is_sent())
            .filter_map(|b| b.message_id)
    }

    pub fn push(&mut self, frame: &IncomingFrame, me: &str) -> &Bubble {
        let bubble = bubbles::live(frame, me, self.bubbles.last());
        self.bubbles.push(bubble);
        let last = self.bubbles.len() - 1;
        &self.bubbles[last]
    }
}
