//! Message bubbles of the chat pane.

use chrono::{DateTime, Local, NaiveDateTime};

use crate::api::events::IncomingFrame;
use crate::api::models::HistoryMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Sent,
    Received,
}

/// Delivery marker shown on sent bubbles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ticks {
    /// Single grey tick.
    Sent,
    /// Grey double tick.
    Delivered,
    /// Blue double tick.
    Read,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble {
    pub message_id: Option<i64>,
    pub text: String,
    pub time: String,
    pub direction: Direction,
    pub first_in_group: bool,
    pub ticks: Option<Ticks>,
}

impl Bubble {
    pub fn is_sent(&self) -> bool {
        self.direction == Direction::Sent
    }
}

pub fn ticks_for(direction: Direction, delivered: bool, read: bool) -> Option<Ticks> {
    match direction {
        Direction::Received => None,
        Direction::Sent if read => Some(Ticks::Read),
        Direction::Sent if delivered => Some(Ticks::Delivered),
        Direction::Sent => Some(Ticks::Sent),
    }
}

/// `HH:MM` in local time. Timestamps without an offset are taken as-is;
/// unparsable ones render empty.
pub fn format_time(timestamp: &str) -> String {
    if let Ok(ts) = DateTime::parse_from_rfc3339(timestamp) {
        return ts.with_timezone(&Local).format("%H:%M").to_string();
    }
    match NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(ts) => ts.format("%H:%M").to_string(),
        Err(_) => String::new(),
    }
}

fn direction_of(sender: &str, me: &str) -> Direction {
    if sender == me { Direction::Sent } else { Direction::Received }
}

/// Bubbles for a freshly loaded history, grouped by consecutive sender.
pub fn history(messages: &[HistoryMessage], me: &str) -> Vec<Bubble> {
    messages
        .iter()
        .enumerate()
        .map(|(idx, msg)| {
            let direction = direction_of(&msg.sender_username, me);
            let first_in_group = idx == 0 || messages[idx - 1].sender_username != msg.sender_username;
            Bubble {
                message_id: Some(msg.id),
                text: msg.text.clone(),
                time: format_time(&msg.timestamp),
                direction,
                first_in_group,
                ticks: ticks_for(direction, msg.delivered, msg.read),
            }
        })
        .collect()
}

/// Bubble for a pushed frame, grouped against the last bubble on screen.
pub fn live(frame: &IncomingFrame, me: &str, last: Option<&Bubble>) -> Bubble {
    let direction = direction_of(&frame.sender, me);
    Bubble {
        message_id: frame.id,
        text: frame.message.clone(),
        time: format_time(&frame.timestamp),
        direction,
        first_in_group: last.map_or(true, |b| b.direction != direction),
        ticks: ticks_for(direction, frame.delivered, frame.read),
    }
}
