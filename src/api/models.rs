use serde::{Deserialize, Serialize};

/// One row of a chat list as returned by `/api/chats/*/`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ChatSummary {
    pub id: i64,
    pub phone: String,
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    /// Last message preview.
    #[serde(default)]
    pub message: String,
    /// Last message time, already formatted `HH:MM` by the server.
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub unread_count: u32,
    #[serde(default)]
    pub has_unread: bool,
}

/// A message from the chat history.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct HistoryMessage {
    pub id: i64,
    pub text: String,
    pub timestamp: String,
    pub sender_username: String,
    #[serde(default)]
    pub delivered: bool,
    #[serde(default)]
    pub read: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct OtherUser {
    pub username: String,
    pub phone: String,
    #[serde(default)]
    pub profile_pic: String,
    #[serde(default)]
    pub about: Option<String>,
    /// `"+1 4155552671"`: country code and national number apart.
    #[serde(default)]
    pub parsed_phone: Option<String>,
}

impl OtherUser {
    pub fn about_line(&self) -> &str {
        match self.about.as_deref().map(str::trim) {
            Some(about) if !about.is_empty() => about,
            _ => "No status message",
        }
    }

    pub fn display_phone(&self) -> &str {
        self.parsed_phone.as_deref().filter(|p| !p.trim().is_empty()).unwrap_or(&self.phone)
    }
}

/// Reply of `POST /api/get_or_create_chat/`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OpenedChat {
    pub chat_id: i64,
    pub other_user: OtherUser,
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
    #[serde(default)]
    pub created: bool,
}

/// Reply of `/api/chat-status/` and `/api/chat-toggle/`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChatStatus {
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub has_unread: bool,
    #[serde(default)]
    pub is_favourite: bool,
    #[serde(default)]
    pub unread_count: Option<u32>,
}

impl ChatStatus {
    /// Badge count, falling back to a single unread when the server only
    /// reports the flag.
    pub fn badge_count(&self) -> u32 {
        self.unread_count.unwrap_or(u32::from(self.has_unread))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatAction {
    #[serde(rename = "archive")]
    Archive,
    #[serde(rename = "mark-read")]
    MarkRead,
    #[serde(rename = "favourite")]
    Favourite,
}

impl ChatAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatAction::Archive => "archive",
            ChatAction::MarkRead => "mark-read",
            ChatAction::Favourite => "favourite",
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ToggleRequest<'a> {
    pub phone: &'a str,
    pub action: ChatAction,
}

/// A person as formatted by `/api/search-users`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct SearchPerson {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    /// Display-formatted phone.
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    /// Raw E.164 phone, used to open the chat.
    #[serde(default)]
    pub fullphone: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct SearchChat {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub fullphone: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub last_message_preview: Option<String>,
    #[serde(default)]
    pub last_message_time: Option<String>,
    #[serde(default)]
    pub unread_count: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchMessage {
    #[serde(default)]
    pub message_id: Option<i64>,
    #[serde(default)]
    pub chat_id: Option<i64>,
    #[serde(default)]
    pub chat_name: Option<String>,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub other_user: Option<SearchPerson>,
    #[serde(default)]
    pub time: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct SearchResults {
    #[serde(default)]
    pub chats: Vec<SearchChat>,
    #[serde(default)]
    pub people: Vec<SearchPerson>,
    #[serde(default)]
    pub messages: Vec<SearchMessage>,
    #[serde(default, rename = "selfUser")]
    pub self_user: Option<SearchPerson>,
}

/// Inline-editable profile fields.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProfileField {
    Name,
    About,
}

impl ProfileField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileField::Name => "name",
            ProfileField::About => "about",
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CheckPhoneReply {
    #[serde(default)]
    pub exists: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorReply {
    #[serde(default)]
    pub error: Option<String>,
}
