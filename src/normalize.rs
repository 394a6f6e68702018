use crate::history::{ContentPart, History, Message, is_image_path};

pub const DEFAULT_ROLE: &str = "user";

/// One role-tagged line of conversation after flattening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTurn {
    pub role: String,
    pub text: String,
}

impl NormalizedTurn {
    fn new(role: &str, text: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            text: text.into(),
        }
    }

    pub fn render(&self) -> String {
        format!("{}: {}", self.role, self.text)
    }
}

/// Flattens `history` into ordered turns. The system prompt always leads as a
/// `user` turn since the target API gets no dedicated system role here.
pub fn normalize(history: &History, system: &str) -> Vec<NormalizedTurn> {
    let mut turns = vec![NormalizedTurn::new(DEFAULT_ROLE, system)];

    match history {
        History::Text(text) => turns.push(NormalizedTurn::new(DEFAULT_ROLE, text.as_str())),
        History::Messages(messages) => {
            for message in messages {
                match message {
                    Message::Plain(text) => {
                        turns.push(NormalizedTurn::new(DEFAULT_ROLE, text.as_str()))
                    }
                    Message::Structured { role, content } => {
                        let text = join_text_parts(content);
                        if !text.is_empty() {
                            let role = role.as_deref().unwrap_or(DEFAULT_ROLE);
                            turns.push(NormalizedTurn::new(role, text));
                        }
                    }
                }
            }
        }
    }

    turns
}

fn join_text_parts(content: &[ContentPart]) -> String {
    content
        .iter()
        .filter_map(|part| match part {
            ContentPart::Text(text) if !is_image_path(text) => Some(text.clone()),
            ContentPart::Text(_) | ContentPart::Image(_) => None,
            ContentPart::Other(value) => Some(value.to_string()),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_lines(turns: &[NormalizedTurn]) -> Vec<String> {
    turns.iter().map(NormalizedTurn::render).collect()
}
