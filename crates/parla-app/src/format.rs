// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::sync::OnceLock;
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

use crate::model::{Rule, RuleStatus};

static LOCAL_OFFSET: OnceLock<UtcOffset> = OnceLock::new();

/// Resolves the local UTC offset once and caches it for the process
/// lifetime. On Unix the lookup refuses to run once the process has
/// threads, so the binary calls this at startup; later callers read the
/// cache. Falls back to UTC when the offset cannot be determined.
pub fn init_local_offset() -> UtcOffset {
    *LOCAL_OFFSET.get_or_init(|| UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC))
}

/// Buckets an RFC 3339 timestamp relative to `now` using floor division.
/// Unparseable input degrades to the freshest bucket rather than erroring.
pub fn relative_time_label(raw: &str, now: OffsetDateTime) -> String {
    let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) else {
        return "just now".to_owned();
    };

    let minutes = (now - parsed).whole_minutes();
    if minutes < 1 {
        return "just now".to_owned();
    }
    if minutes < 60 {
        return format!("{minutes} min ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }
    format!("{}d ago", hours / 24)
}

pub fn chat_count_label(count: usize) -> String {
    if count == 1 {
        "1 chat".to_owned()
    } else {
        format!("{count} chats")
    }
}

pub fn rule_status_label(rule: &Rule) -> String {
    if rule.status == RuleStatus::Inactive {
        return "Paused".to_owned();
    }
    if rule.w_id.is_empty() {
        return "Active (no chats)".to_owned();
    }
    format!("Watching {}", chat_count_label(rule.w_id.len()))
}

/// Renders a trigger time as local hour:minute with a 12-hour period marker.
/// Absent or malformed input means "no time available", never an error.
pub fn trigger_time_label(raw: Option<&str>) -> Option<String> {
    let parsed = OffsetDateTime::parse(raw?, &Rfc3339).ok()?;
    parsed
        .to_offset(init_local_offset())
        .format(&time::macros::format_description!(
            "[hour repr:12 padding:none]:[minute] [period]"
        ))
        .ok()
}

/// Subtext under the rule toggle. `trigger_time` is when a scheduled rule
/// next executes, so "Next run" holds for one-time and recurring schedules.
pub fn toggle_status_text(rule: &Rule) -> String {
    if rule.status == RuleStatus::Inactive {
        return "Status: Paused".to_owned();
    }

    let status = rule_status_label(rule);
    match trigger_time_label(rule.trigger_time.as_deref()) {
        Some(next_run) => format!("Status: {status} \u{2022} Next run: {next_run}"),
        None => format!("Status: {status}"),
    }
}

/// All rules are WhatsApp rules today (the `w_id` scope field is a WhatsApp
/// chat id). The parameter keeps the signature stable for when other
/// services land.
pub fn service_badge(_rule: &Rule) -> &'static str {
    "WhatsApp"
}

#[cfg(test)]
mod tests {
    use super::{
        chat_count_label, relative_time_label, rule_status_label, service_badge,
        toggle_status_text, trigger_time_label,
    };
    use crate::ids::{ChatId, RuleId};
    use crate::model::{Rule, RuleStatus};
    use time::Duration;
    use time::format_description::well_known::Rfc3339;
    use time::macros::datetime;

    fn rule_with(status: RuleStatus, chats: usize, trigger_time: Option<&str>) -> Rule {
        Rule {
            rule_id: RuleId::new("rule-1"),
            w_id: (0..chats)
                .map(|index| ChatId::new(format!("chat-{index}")))
                .collect(),
            raw_text: "Auto-reply to price inquiries.".to_owned(),
            status,
            is_default: false,
            created_at: String::new(),
            last_triggered_at: None,
            trigger_time: trigger_time.map(str::to_owned),
        }
    }

    fn ago(duration: Duration) -> String {
        (datetime!(2026-08-29 12:00:00 UTC) - duration)
            .format(&Rfc3339)
            .expect("fixture timestamp should format")
    }

    #[test]
    fn relative_time_buckets_use_floor_division() {
        let now = datetime!(2026-08-29 12:00:00 UTC);
        assert_eq!(relative_time_label(&ago(Duration::seconds(30)), now), "just now");
        assert_eq!(
            relative_time_label(&ago(Duration::minutes(45)), now),
            "45 min ago"
        );
        assert_eq!(relative_time_label(&ago(Duration::hours(5)), now), "5h ago");
        assert_eq!(relative_time_label(&ago(Duration::days(3)), now), "3d ago");
    }

    #[test]
    fn relative_time_floors_partial_units() {
        let now = datetime!(2026-08-29 12:00:00 UTC);
        assert_eq!(
            relative_time_label(&ago(Duration::minutes(59) + Duration::seconds(59)), now),
            "59 min ago"
        );
        assert_eq!(
            relative_time_label(&ago(Duration::hours(23) + Duration::minutes(59)), now),
            "23h ago"
        );
    }

    #[test]
    fn relative_time_tolerates_garbage_input() {
        let now = datetime!(2026-08-29 12:00:00 UTC);
        assert_eq!(relative_time_label("not-a-timestamp", now), "just now");
        assert_eq!(relative_time_label("", now), "just now");
    }

    #[test]
    fn chat_count_label_handles_zero_one_and_many() {
        assert_eq!(chat_count_label(0), "0 chats");
        assert_eq!(chat_count_label(1), "1 chat");
        assert_eq!(chat_count_label(2), "2 chats");
    }

    #[test]
    fn status_label_covers_paused_empty_and_watching() {
        assert_eq!(
            rule_status_label(&rule_with(RuleStatus::Inactive, 3, None)),
            "Paused"
        );
        assert_eq!(
            rule_status_label(&rule_with(RuleStatus::Active, 0, None)),
            "Active (no chats)"
        );
        assert_eq!(
            rule_status_label(&rule_with(RuleStatus::Active, 1, None)),
            "Watching 1 chat"
        );
        assert_eq!(
            rule_status_label(&rule_with(RuleStatus::Active, 4, None)),
            "Watching 4 chats"
        );
    }

    #[test]
    fn local_offset_resolves_once_and_stays_fixed() {
        let first = super::init_local_offset();
        let second = super::init_local_offset();
        assert_eq!(first, second);
    }

    #[test]
    fn trigger_time_label_rejects_invalid_input() {
        assert_eq!(trigger_time_label(None), None);
        assert_eq!(trigger_time_label(Some("")), None);
        assert_eq!(trigger_time_label(Some("tomorrow-ish")), None);
    }

    #[test]
    fn trigger_time_label_renders_twelve_hour_clock() {
        let label = trigger_time_label(Some("2026-08-29T14:05:00Z"))
            .expect("valid timestamp should render");
        assert!(label.ends_with("AM") || label.ends_with("PM"), "got {label}");
        assert!(label.contains(':'), "got {label}");
    }

    #[test]
    fn toggle_text_for_paused_rule_omits_schedule() {
        let rule = rule_with(RuleStatus::Inactive, 2, Some("2026-08-29T14:05:00Z"));
        assert_eq!(toggle_status_text(&rule), "Status: Paused");
    }

    #[test]
    fn toggle_text_appends_next_run_when_schedule_is_valid() {
        let scheduled = rule_with(RuleStatus::Active, 2, Some("2026-08-29T14:05:00Z"));
        let text = toggle_status_text(&scheduled);
        assert!(text.starts_with("Status: Watching 2 chats"), "got {text}");
        assert!(text.contains("Next run:"), "got {text}");

        let unscheduled = rule_with(RuleStatus::Active, 2, Some("whenever"));
        assert_eq!(toggle_status_text(&unscheduled), "Status: Watching 2 chats");
    }

    #[test]
    fn service_badge_is_whatsapp() {
        assert_eq!(
            service_badge(&rule_with(RuleStatus::Active, 1, None)),
            "WhatsApp"
        );
    }
}
