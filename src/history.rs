//! Conversation history as handed in by callers.
//!
//! A history is either a single string or an ordered list of messages. Each
//! message is a plain user utterance or a structured record whose content is
//! a list of parts; parts that name image files are carried as
//! [`ContentPart::Image`] so later stages can drop them.

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;

static IMAGE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(jpe?g|png|gif|bmp|tiff?)$").expect("image path pattern is valid")
});

/// Returns true when `s` ends in a known raster image extension.
pub fn is_image_path(s: &str) -> bool {
    IMAGE_PATH.is_match(s)
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum ContentPart {
    Text(String),
    Image(String),
    Other(Value),
}

impl From<Value> for ContentPart {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) if is_image_path(&s) => ContentPart::Image(s),
            Value::String(s) => ContentPart::Text(s),
            other => ContentPart::Other(other),
        }
    }
}

impl From<&str> for ContentPart {
    fn from(s: &str) -> Self {
        ContentPart::from(Value::String(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Message {
    Plain(String),
    Structured {
        #[serde(default)]
        role: Option<String>,
        content: Vec<ContentPart>,
    },
}

impl Message {
    pub fn structured(role: &str, content: Vec<ContentPart>) -> Self {
        Message::Structured {
            role: Some(role.to_string()),
            content,
        }
    }
}

impl From<&str> for Message {
    fn from(s: &str) -> Self {
        Message::Plain(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum History {
    Text(String),
    Messages(Vec<Message>),
}

impl Default for History {
    fn default() -> Self {
        History::Messages(Vec::new())
    }
}

impl From<&str> for History {
    fn from(s: &str) -> Self {
        History::Text(s.to_string())
    }
}

impl From<Vec<Message>> for History {
    fn from(messages: Vec<Message>) -> Self {
        History::Messages(messages)
    }
}
