//! Global search over chats, people and messages.

use crate::api::models::{SearchPerson, SearchResults};

pub const DEFAULT_AVATAR: &str = "https://media.tenor.com/t3dLLNaI50oAAAAM/cat-cats.gif";
pub const NO_RESULTS: &str = "No results";
pub const SEARCH_FAILED: &str = "Error loading results";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEntry {
    /// Full phone used to open the chat; entries without one are inert.
    pub phone: Option<String>,
    pub name: String,
    pub avatar: String,
    pub time: String,
    pub preview: String,
    pub unread_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSection {
    pub label: &'static str,
    pub entries: Vec<SearchEntry>,
}

impl SearchSection {
    pub fn placeholder(&self) -> Option<&'static str> {
        self.entries.is_empty().then_some(NO_RESULTS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchState {
    /// No query; the normal chat list shows.
    #[default]
    Hidden,
    Loading,
    Results(Vec<SearchSection>),
    Failed,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn avatar_of(picture: &Option<String>) -> String {
    non_empty(picture).unwrap_or(DEFAULT_AVATAR).to_string()
}

fn person_entry(person: &SearchPerson) -> SearchEntry {
    SearchEntry {
        phone: non_empty(&person.fullphone).map(str::to_string),
        name: non_empty(&person.name)
            .or(non_empty(&person.phone))
            .unwrap_or_default()
            .to_string(),
        avatar: avatar_of(&person.profile_picture),
        time: String::new(),
        preview: person.about.clone().unwrap_or_default(),
        unread_count: 0,
    }
}

/// Turn a search reply into the three rendered sections.
pub fn sections(results: &SearchResults) -> Vec<SearchSection> {
    let chats = results
        .chats
        .iter()
        .map(|chat| SearchEntry {
            phone: non_empty(&chat.fullphone).map(str::to_string),
            name: non_empty(&chat.name)
                .or(non_empty(&chat.phone))
                .unwrap_or_default()
                .to_string(),
            avatar: avatar_of(&chat.profile_picture),
            time: chat.last_message_time.clone().unwrap_or_default(),
            preview: chat.last_message_preview.clone().unwrap_or_default(),
            unread_count: chat.unread_count,
        })
        .collect();

    let people = results.people.iter().map(person_entry).collect();

    let me = results.self_user.clone().unwrap_or_else(|| SearchPerson {
        phone: Some("You".to_string()),
        ..SearchPerson::default()
    });
    let messages = results
        .messages
        .iter()
        .map(|hit| {
            let other = hit.other_user.clone().unwrap_or_else(|| SearchPerson {
                name: Some("Unknown".to_string()),
                ..SearchPerson::default()
            });
            let self_chat = non_empty(&other.phone).is_none() && non_empty(&other.name).is_none();
            let (who, fallback) = if self_chat { (&me, "You") } else { (&other, "Unknown") };
            SearchEntry {
                phone: non_empty(&who.fullphone).map(str::to_string),
                name: non_empty(&who.name)
                    .or(non_empty(&who.phone))
                    .unwrap_or(fallback)
                    .to_string(),
                avatar: avatar_of(&who.profile_picture),
                time: hit.time.clone().unwrap_or_default(),
                preview: hit.snippet.clone(),
                unread_count: 0,
            }
        })
        .collect();

    vec![
        SearchSection { label: "Chats", entries: chats },
        SearchSection { label: "People", entries: people },
        SearchSection { label: "Messages", entries: messages },
    ]
}

#[derive(Debug, Default)]
pub struct SearchPanel {
    query: String,
    state: SearchState,
}

impl SearchPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// New input text. Returns the query to fetch, or `None` when the input
    /// is blank and the results are hidden.
    pub fn set_query(&mut self, text: &str) -> Option<String> {
        self.query = text.trim().to_string();
        if self.query.is_empty() {
            self.state = SearchState::Hidden;
            return None;
        }
        self.state = SearchState::Loading;
        Some(self.query.clone())
    }

    /// Apply results for `query`; stale replies for an older query are
    /// dropped.
    pub fn apply(&mut self, query: &str, results: &SearchResults) -> bool {
        if query != self.query || self.query.is_empty() {
            return false;
        }
        self.state = SearchState::Results(sections(results));
        true
    }

    pub fn fail(&mut self, query: &str) -> bool {
        if query != self.query || self.query.is_empty() {
            return false;
        }
        self.state = SearchState::Failed;
        true
    }

    pub fn is_open(&self) -> bool {
        self.state != SearchState::Hidden
    }
}
