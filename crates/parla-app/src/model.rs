// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::ids::*;

const RULE_TITLE_MAX_CHARS: usize = 40;

/// Wire field names follow the backend's short aliases; the Rust side keeps
/// readable names via serde renames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "i")]
    pub id: String,
    #[serde(rename = "f_n", default)]
    pub first_name: String,
    #[serde(rename = "l_n", default)]
    pub last_name: String,
    #[serde(rename = "u", default)]
    pub username: String,
    #[serde(rename = "e", default)]
    pub email: String,
    #[serde(rename = "c_at", default)]
    pub created_at: String,
    #[serde(default)]
    pub is_email_verified: bool,
    #[serde(default)]
    pub is_active: bool,
    #[serde(rename = "p_id", default)]
    pub plan_id: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl User {
    /// Name used for the hub greeting; falls back to a neutral salutation.
    pub fn greeting_name(&self) -> &str {
        if self.first_name.is_empty() {
            "there"
        } else {
            &self.first_name
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: TaskId,
    #[serde(default)]
    pub whatsapp_chat_id: String,
    #[serde(default)]
    pub card_type: String,
    pub task_description: String,
    #[serde(default)]
    pub task_message: String,
    #[serde(default)]
    pub task_category: String,
    #[serde(default)]
    pub last_updated_at: String,
}

/// View-model projection of a task for list rendering. Derived 1:1 from the
/// fetched task and superseded wholesale on refetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: TaskId,
    pub title: String,
    pub subtitle: String,
    pub category: String,
    pub timestamp: String,
    pub recipient: String,
    pub platform: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionChat {
    pub w_id: ChatId,
    #[serde(default)]
    pub chat_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "_id")]
    pub id: SuggestionId,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub suggestion_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub why: String,
    #[serde(default)]
    pub chats: Vec<SuggestionChat>,
    #[serde(default)]
    pub rule: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub display_rule: String,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Suggestion {
    pub fn chat_ids(&self) -> Vec<ChatId> {
        self.chats.iter().map(|chat| chat.w_id.clone()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    Active,
    Inactive,
}

impl RuleStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }

    pub const fn flipped(self) -> Self {
        match self {
            Self::Active => Self::Inactive,
            Self::Inactive => Self::Active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub rule_id: RuleId,
    #[serde(default)]
    pub w_id: Vec<ChatId>,
    pub raw_text: String,
    pub status: RuleStatus,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub last_triggered_at: Option<String>,
    #[serde(default)]
    pub trigger_time: Option<String>,
}

impl Rule {
    /// List title: the rule text clipped to a stable width.
    pub fn title(&self) -> String {
        let chars: Vec<char> = self.raw_text.chars().collect();
        if chars.len() <= RULE_TITLE_MAX_CHARS {
            return self.raw_text.clone();
        }
        let mut clipped: String = chars[..RULE_TITLE_MAX_CHARS].iter().collect();
        clipped.push_str("...");
        clipped
    }
}

/// Full-record payload republished on toggle; the backend replaces the rule
/// wholesale rather than patching individual fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleUpdate {
    pub rule_id: RuleId,
    pub w_id: Vec<ChatId>,
    pub raw_text: String,
    pub status: RuleStatus,
}

impl RuleUpdate {
    /// The toggle mutation: same record, flipped status.
    pub fn toggle_of(rule: &Rule) -> Self {
        Self {
            rule_id: rule.rule_id.clone(),
            w_id: rule.w_id.clone(),
            raw_text: rule.raw_text.clone(),
            status: rule.status.flipped(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRule {
    pub w_id: Vec<ChatId>,
    pub raw_text: String,
    pub status: RuleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion_id: Option<SuggestionId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorSummary {
    pub count: i64,
    #[serde(default)]
    pub available_services: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupEntry {
    pub w_id: ChatId,
    #[serde(default)]
    pub chat_name: String,
    #[serde(default)]
    pub num_active_rules: i64,
    #[serde(default)]
    pub num_inactive_rules: i64,
    #[serde(default)]
    pub moderation_status: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GroupDirectory {
    #[serde(default)]
    pub groups: Vec<GroupEntry>,
    #[serde(default)]
    pub chats: Vec<GroupEntry>,
    #[serde(default)]
    pub num_groups: i64,
    #[serde(default)]
    pub num_chats: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubAttachment {
    Image(Attachment),
    Audio(Attachment),
}

/// Parts carried by a task submission. At most one image and one audio
/// attachment are recognized; extras are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskSubmission {
    pub message: Option<String>,
    pub image: Option<Attachment>,
    pub audio: Option<Attachment>,
}

impl TaskSubmission {
    pub fn assemble(message: Option<String>, attachments: Vec<HubAttachment>) -> Self {
        let mut submission = Self {
            message: message.filter(|text| !text.is_empty()),
            image: None,
            audio: None,
        };
        for attachment in attachments {
            match attachment {
                HubAttachment::Image(file) if submission.image.is_none() => {
                    submission.image = Some(file);
                }
                HubAttachment::Audio(file) if submission.audio.is_none() => {
                    submission.audio = Some(file);
                }
                HubAttachment::Image(_) | HubAttachment::Audio(_) => {}
            }
        }
        submission
    }

    pub fn text(message: impl Into<String>) -> Self {
        Self::assemble(Some(message.into()), Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.message.is_none() && self.image.is_none() && self.audio.is_none()
    }
}
