use serde::{Deserialize, Serialize};

/// Message the upload endpoint returns once the document is indexed.
pub const UPLOAD_SUCCESS_MESSAGE: &str = "PDF uploaded successfully";

/// Which side of the conversation a turn belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Human,
    Bot,
}

/// A single completed turn. Serialized in the shape the ask endpoint
/// expects inside `chat_history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    #[serde(rename = "type")]
    role: Role,
    #[serde(rename = "message")]
    text: String,
}

impl Exchange {
    pub fn human(text: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            text: text.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Serialize)]
pub struct AskRequest<'a> {
    pub question: &'a str,
    pub chat_history: &'a [Exchange],
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AskReply {
    #[serde(default)]
    pub response: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadReply {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl UploadReply {
    /// True only for the exact success sentinel.
    pub fn is_accepted(&self) -> bool {
        self.message.as_deref() == Some(UPLOAD_SUCCESS_MESSAGE)
    }
}
