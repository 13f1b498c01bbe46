// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Development-mode request interception. `dispatch` is pure: it inspects
//! the path and method and returns a canned payload or `NoMatch`, leaving
//! the transport decision to the client.

use anyhow::{Context, Result};
use parla_app::{
    ChatId, ConnectorSummary, GroupDirectory, GroupEntry, Rule, RuleId, RuleStatus, Suggestion,
    SuggestionChat, SuggestionId, Task, TaskId, User,
};
use reqwest::Method;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

use crate::{AckEnvelope, JobEnvelope, RedirectEnvelope, RuleCreatedEnvelope};

#[derive(Debug, Clone, PartialEq)]
pub enum MockOutcome {
    Matched(MockPayload),
    NoMatch,
}

/// Closed set of canned response shapes, serialized only at the transport
/// boundary so the mock stays shape-compatible with the real backend.
#[derive(Debug, Clone, PartialEq)]
pub enum MockPayload {
    User(User),
    Tasks(Vec<Task>),
    Suggestions(Vec<Suggestion>),
    Rules(Vec<Rule>),
    Connectors(ConnectorSummary),
    Groups(GroupDirectory),
    Redirect(RedirectEnvelope),
    Job(JobEnvelope),
    RuleCreated(RuleCreatedEnvelope),
    Ack(AckEnvelope),
}

impl MockPayload {
    pub fn into_value(self) -> Result<Value> {
        let value = match self {
            Self::User(user) => serde_json::to_value(user),
            Self::Tasks(tasks) => serde_json::to_value(tasks),
            Self::Suggestions(suggestions) => serde_json::to_value(suggestions),
            Self::Rules(rules) => serde_json::to_value(rules),
            Self::Connectors(connectors) => serde_json::to_value(connectors),
            Self::Groups(groups) => serde_json::to_value(groups),
            Self::Redirect(redirect) => serde_json::to_value(redirect),
            Self::Job(job) => serde_json::to_value(job),
            Self::RuleCreated(created) => serde_json::to_value(created),
            Self::Ack(ack) => serde_json::to_value(ack),
        };
        value.context("serialize mock payload")
    }
}

/// Route a request against the mock table. GET requests match a fixed set of
/// exact and prefix routes; mutations always match so development mode never
/// mutates a real backend. Unmatched GETs fall through to the network.
pub fn dispatch(url: &str, method: &Method) -> MockOutcome {
    if *method == Method::GET {
        let payload = match url {
            "/v1/users/me" => Some(MockPayload::User(mock_user())),
            "/v1/dashboard/apex-tasks" => Some(MockPayload::Tasks(mock_tasks())),
            "/v1/suggestions" => Some(MockPayload::Suggestions(mock_suggestions())),
            "/v1/connectors/all" => Some(MockPayload::Connectors(mock_connectors())),
            "/v1/rules" => Some(MockPayload::Rules(mock_rules())),
            _ if url.starts_with("/v1/groups") => Some(MockPayload::Groups(mock_groups())),
            // Rule detail reuses the canned collection.
            _ if url.starts_with("/v1/rules/") => Some(MockPayload::Rules(mock_rules())),
            _ if url.starts_with("/v1/connectors/connect/") => {
                Some(MockPayload::Redirect(RedirectEnvelope {
                    redirect_url: "https://example.com/mock-connector-auth".to_owned(),
                }))
            }
            _ => None,
        };
        return match payload {
            Some(payload) => MockOutcome::Matched(payload),
            None => MockOutcome::NoMatch,
        };
    }

    if matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    ) {
        log::debug!("mock intercepting {method} {url}");

        if url.starts_with("/v1/dashboard/apex-task/") {
            return MockOutcome::Matched(MockPayload::Ack(AckEnvelope {
                success: true,
                message: "Task submitted successfully (Mock)".to_owned(),
            }));
        }
        if url == "/v1/groups" && (*method == Method::POST || *method == Method::PUT) {
            return MockOutcome::Matched(MockPayload::Job(JobEnvelope {
                success: true,
                job_id: "mock-job-id".to_owned(),
            }));
        }
        if url == "/v1/rules" && *method == Method::POST {
            return MockOutcome::Matched(MockPayload::RuleCreated(RuleCreatedEnvelope {
                success: "true".to_owned(),
                rule_id: generated_rule_id(),
            }));
        }
        return MockOutcome::Matched(MockPayload::Ack(AckEnvelope {
            success: true,
            message: "Action completed successfully (Mock)".to_owned(),
        }));
    }

    MockOutcome::NoMatch
}

pub fn mock_user() -> User {
    User {
        id: "user_23456789".to_owned(),
        first_name: "John".to_owned(),
        last_name: "Doe".to_owned(),
        username: "johndoe".to_owned(),
        email: "john.doe@example.com".to_owned(),
        created_at: stamp(OffsetDateTime::now_utc()),
        is_email_verified: true,
        is_active: true,
        plan_id: "p_123".to_owned(),
        is_admin: true,
    }
}

pub fn mock_tasks() -> Vec<Task> {
    let now = OffsetDateTime::now_utc();
    vec![
        Task {
            task_id: TaskId::new("task-1"),
            whatsapp_chat_id: "12345".to_owned(),
            card_type: "message".to_owned(),
            task_description: "Analyze group chats".to_owned(),
            task_message: "Hi John, I found some interesting items in the group.".to_owned(),
            task_category: "Tasks".to_owned(),
            last_updated_at: stamp(now),
        },
        Task {
            task_id: TaskId::new("task-2"),
            whatsapp_chat_id: "67890".to_owned(),
            card_type: "message".to_owned(),
            task_description: "Follow up on email".to_owned(),
            task_message: "John, you have an unread urgent email from the boss.".to_owned(),
            task_category: "Work".to_owned(),
            last_updated_at: stamp(now - Duration::hours(1)),
        },
    ]
}

pub fn mock_suggestions() -> Vec<Suggestion> {
    let now = OffsetDateTime::now_utc();
    vec![Suggestion {
        id: SuggestionId::new("sugg-1"),
        user_id: "user_23456789".to_owned(),
        suggestion_type: "rule".to_owned(),
        status: "pending".to_owned(),
        why: "To automate responses in the Work group".to_owned(),
        chats: vec![SuggestionChat {
            w_id: ChatId::new("12345"),
            chat_name: "Work".to_owned(),
        }],
        rule: "Notify on mentions".to_owned(),
        action: "notify".to_owned(),
        display_rule: "When I am mentioned in Work".to_owned(),
        deadline: None,
        created_at: stamp(now),
        updated_at: stamp(now),
    }]
}

pub fn mock_connectors() -> ConnectorSummary {
    ConnectorSummary {
        count: 2,
        available_services: vec!["google_drive".to_owned(), "whatsapp".to_owned()],
    }
}

pub fn mock_groups() -> GroupDirectory {
    GroupDirectory {
        groups: vec![
            GroupEntry {
                w_id: ChatId::new("group-1"),
                chat_name: "Product Team".to_owned(),
                num_active_rules: 2,
                num_inactive_rules: 1,
                moderation_status: true,
            },
            GroupEntry {
                w_id: ChatId::new("group-2"),
                chat_name: "Marketing Updates".to_owned(),
                num_active_rules: 0,
                num_inactive_rules: 1,
                moderation_status: false,
            },
        ],
        chats: vec![GroupEntry {
            w_id: ChatId::new("chat-1"),
            chat_name: "Alice Smith".to_owned(),
            num_active_rules: 1,
            num_inactive_rules: 0,
            moderation_status: true,
        }],
        num_groups: 2,
        num_chats: 1,
    }
}

pub fn mock_rules() -> Vec<Rule> {
    let now = OffsetDateTime::now_utc();
    vec![
        Rule {
            rule_id: RuleId::new("rule-1"),
            w_id: vec![ChatId::new("group-1")],
            raw_text: "Auto-reply to price inquiries with the catalog link.".to_owned(),
            status: RuleStatus::Active,
            is_default: false,
            created_at: stamp(now),
            last_triggered_at: Some(stamp(now - Duration::hours(1))),
            trigger_time: None,
        },
        Rule {
            rule_id: RuleId::new("rule-2"),
            w_id: vec![ChatId::new("group-1"), ChatId::new("chat-1")],
            raw_text: "Notify me whenever a message contains keywords: \"urgent\", \"help\"."
                .to_owned(),
            status: RuleStatus::Inactive,
            is_default: true,
            created_at: stamp(now - Duration::days(1)),
            last_triggered_at: None,
            trigger_time: None,
        },
    ]
}

fn generated_rule_id() -> RuleId {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
    RuleId::new(format!("rule_{}", nanos.rem_euclid(100_000)))
}

fn stamp(moment: OffsetDateTime) -> String {
    moment
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_owned())
}
