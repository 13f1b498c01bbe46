// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use parla_app::{
    ChatId, GroupDirectory, GroupEntry, Rule, RuleId, RuleStatus, Suggestion, SuggestionChat,
    SuggestionId, Task, TaskId, User,
};
use std::path::PathBuf;
use time::format_description::well_known::Rfc3339;
use time::{Date, Duration, Month, OffsetDateTime, Time};

const FIRST_NAMES: [&str; 12] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Rowan",
];
const LAST_NAMES: [&str; 12] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Bennett", "Brooks",
];

const CHAT_NAMES: [&str; 10] = [
    "Family",
    "Marketing Team",
    "Weekend Plans",
    "Book Club",
    "Project Falcon",
    "Neighbors",
    "Running Group",
    "Design Reviews",
    "School Parents",
    "Trip Planning",
];

const TASK_CATEGORIES: [&str; 6] = ["work", "personal", "finance", "travel", "health", "social"];

const TASK_DESCRIPTIONS: [&str; 8] = [
    "Follow up on unanswered question",
    "Reply to the meeting invite",
    "Confirm the delivery address",
    "Review the shared document",
    "Send the payment reminder",
    "Schedule the group call",
    "Answer the open poll",
    "Acknowledge the announcement",
];

const TASK_MESSAGES: [&str; 8] = [
    "Hey, did you get a chance to look at this?",
    "Can you confirm before tomorrow?",
    "The team is waiting on your reply.",
    "This looks urgent, please check.",
    "Reminder: the deadline is Friday.",
    "Let me know what works for you.",
    "We need your input on the plan.",
    "Thanks in advance for the quick turnaround.",
];

const RULE_TEXTS: [&str; 8] = [
    "Notify me when anyone mentions the launch date",
    "Summarize this chat every evening",
    "Alert me about messages containing payment links",
    "Flag questions addressed to me that go unanswered",
    "Remind me about events shared in this group",
    "Watch for schedule changes and ping me",
    "Collect action items from the daily standup",
    "Tell me when the delivery status updates",
];

const SUGGESTION_REASONS: [&str; 5] = [
    "You often miss messages in this chat",
    "This chat has frequent time-sensitive updates",
    "Several questions here went unanswered last week",
    "Payment requests appear in this chat regularly",
    "Event details are shared here and easy to lose",
];

const REFERENCE_YEAR: i32 = 2026;

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Deterministic fixture builder for hub entities. The same seed always
/// produces the same sequence of records.
#[derive(Debug, Clone)]
pub struct HubFaker {
    rng: DeterministicRng,
    counter: u64,
}

impl HubFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            counter: 0,
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn user(&mut self) -> User {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let username = format!(
            "{}{}",
            first.to_ascii_lowercase(),
            last.to_ascii_lowercase()
        );
        User {
            id: format!("user_{:08}", self.int_range_i64(10_000_000, 99_999_999)),
            first_name: first.to_owned(),
            last_name: last.to_owned(),
            email: format!("{username}@example.com"),
            username,
            created_at: self.recent_timestamp(730),
            is_email_verified: true,
            is_active: true,
            plan_id: format!("p_{:03}", self.int_range_i64(100, 999)),
            is_admin: false,
        }
    }

    pub fn task(&mut self) -> Task {
        Task {
            task_id: TaskId::new(format!("task-{}", self.next_id())),
            whatsapp_chat_id: self.chat_id().into_string(),
            card_type: "message".to_owned(),
            task_description: self.pick(&TASK_DESCRIPTIONS).to_owned(),
            task_message: self.pick(&TASK_MESSAGES).to_owned(),
            task_category: self.pick(&TASK_CATEGORIES).to_owned(),
            last_updated_at: self.recent_timestamp(3),
        }
    }

    pub fn tasks(&mut self, count: usize) -> Vec<Task> {
        (0..count).map(|_| self.task()).collect()
    }

    pub fn suggestion(&mut self) -> Suggestion {
        let rule = self.pick(&RULE_TEXTS).to_owned();
        let chat_count = 1 + self.rng.int_n(2);
        let chats = (0..chat_count)
            .map(|_| SuggestionChat {
                w_id: self.chat_id(),
                chat_name: self.pick(&CHAT_NAMES).to_owned(),
            })
            .collect();
        Suggestion {
            id: SuggestionId::new(format!("sugg-{}", self.next_id())),
            user_id: format!("user_{:08}", self.int_range_i64(10_000_000, 99_999_999)),
            suggestion_type: "rule".to_owned(),
            status: "pending".to_owned(),
            why: self.pick(&SUGGESTION_REASONS).to_owned(),
            chats,
            display_rule: rule.clone(),
            rule,
            action: "notify".to_owned(),
            deadline: None,
            created_at: self.recent_timestamp(14),
            updated_at: self.recent_timestamp(7),
        }
    }

    pub fn suggestions(&mut self, count: usize) -> Vec<Suggestion> {
        (0..count).map(|_| self.suggestion()).collect()
    }

    pub fn rule(&mut self) -> Rule {
        let status = if self.rng.bool() {
            RuleStatus::Active
        } else {
            RuleStatus::Inactive
        };
        let mut rule = Rule {
            rule_id: RuleId::new(format!("rule-{}", self.next_id())),
            w_id: vec![self.chat_id()],
            raw_text: self.pick(&RULE_TEXTS).to_owned(),
            status,
            is_default: false,
            created_at: self.recent_timestamp(90),
            last_triggered_at: None,
            trigger_time: None,
        };
        if status == RuleStatus::Active && self.rng.bool() {
            rule.last_triggered_at = Some(self.recent_timestamp(7));
        }
        if self.rng.bool() {
            rule.trigger_time = Some(self.recent_timestamp(1));
        }
        rule
    }

    pub fn rules(&mut self, count: usize) -> Vec<Rule> {
        (0..count).map(|_| self.rule()).collect()
    }

    pub fn group_directory(&mut self, group_count: usize, chat_count: usize) -> GroupDirectory {
        let groups: Vec<GroupEntry> = (0..group_count).map(|_| self.group_entry(true)).collect();
        let chats: Vec<GroupEntry> = (0..chat_count).map(|_| self.group_entry(false)).collect();
        GroupDirectory {
            num_groups: groups.len() as i64,
            num_chats: chats.len() as i64,
            groups,
            chats,
        }
    }

    fn group_entry(&mut self, is_group: bool) -> GroupEntry {
        let chat_name = if is_group {
            self.pick(&CHAT_NAMES).to_owned()
        } else {
            format!("{} {}", self.pick(&FIRST_NAMES), self.pick(&LAST_NAMES))
        };
        GroupEntry {
            w_id: self.chat_id(),
            chat_name,
            num_active_rules: self.int_range_i64(0, 4),
            num_inactive_rules: self.int_range_i64(0, 2),
            moderation_status: self.rng.bool(),
        }
    }

    pub fn chat_id(&mut self) -> ChatId {
        ChatId::new(format!("{:012}", self.int_range_i64(0, 999_999_999_999)))
    }

    fn next_id(&mut self) -> u64 {
        self.counter += 1;
        self.counter
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range_i64(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }

    fn recent_timestamp(&mut self, window_days: i64) -> String {
        let end = reference_now();
        let start = end - Duration::days(window_days.max(1));
        let start_ts = start.unix_timestamp();
        let span = (end.unix_timestamp() - start_ts) as u64;
        let offset = self.rng.next_u64() % (span + 1);
        let moment = OffsetDateTime::from_unix_timestamp(start_ts + offset as i64)
            .expect("valid unix timestamp");
        moment.format(&Rfc3339).expect("rfc3339 formats")
    }
}

/// Temp directory plus a cookie-file path inside it, for token storage tests.
pub fn temp_cookie_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let cookie_path = dir.path().join("cookies.txt");
    Ok((dir, cookie_path))
}

pub fn fixture_datetime() -> &'static str {
    "2026-02-19T12:34:56Z"
}

pub fn rfc3339(moment: OffsetDateTime) -> String {
    moment.format(&Rfc3339).expect("rfc3339 formats")
}

fn reference_now() -> OffsetDateTime {
    let date = Date::from_calendar_date(REFERENCE_YEAR, Month::January, 1)
        .expect("valid calendar date");
    let midnight = Time::from_hms(0, 0, 0).expect("valid midnight");
    date.with_time(midnight).assume_utc()
}

#[cfg(test)]
mod tests {
    use super::HubFaker;
    use parla_app::RuleStatus;
    use std::collections::BTreeSet;

    #[test]
    fn same_seed_same_sequence() {
        let mut left = HubFaker::new(42);
        let mut right = HubFaker::new(42);
        assert_eq!(left.task(), right.task());
        assert_eq!(left.suggestion(), right.suggestion());
        assert_eq!(left.rule(), right.rule());
    }

    #[test]
    fn ids_are_unique_within_a_faker() {
        let mut faker = HubFaker::new(7);
        let ids: BTreeSet<_> = faker
            .tasks(20)
            .into_iter()
            .map(|task| task.task_id)
            .collect();
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn user_has_greeting_material() {
        let mut faker = HubFaker::new(3);
        let user = faker.user();
        assert!(!user.first_name.is_empty());
        assert_ne!(user.greeting_name(), "there");
        assert!(user.email.contains('@'));
    }

    #[test]
    fn suggestion_carries_at_least_one_chat() {
        let mut faker = HubFaker::new(11);
        for _ in 0..20 {
            let suggestion = faker.suggestion();
            assert!(!suggestion.chats.is_empty());
            assert!(!suggestion.display_rule.is_empty());
            assert!(!suggestion.chat_ids().is_empty());
        }
    }

    #[test]
    fn inactive_rules_never_carry_a_trigger_history() {
        let mut faker = HubFaker::new(5);
        for _ in 0..50 {
            let rule = faker.rule();
            if rule.status == RuleStatus::Inactive {
                assert!(rule.last_triggered_at.is_none());
            }
        }
    }

    #[test]
    fn group_directory_counts_match_contents() {
        let mut faker = HubFaker::new(9);
        let directory = faker.group_directory(3, 5);
        assert_eq!(directory.num_groups, 3);
        assert_eq!(directory.num_chats, 5);
        assert_eq!(directory.groups.len(), 3);
        assert_eq!(directory.chats.len(), 5);
    }

    #[test]
    fn timestamps_are_rfc3339() {
        let mut faker = HubFaker::new(13);
        let task = faker.task();
        assert!(task.last_updated_at.contains('T'), "got {}", task.last_updated_at);
        assert!(task.last_updated_at.ends_with('Z'), "got {}", task.last_updated_at);
    }

    #[test]
    fn variety_across_seeds() {
        let mut descriptions = BTreeSet::new();
        for seed in 0_u64..20_u64 {
            let mut faker = HubFaker::new(seed);
            descriptions.insert(faker.task().task_description);
        }
        assert!(descriptions.len() >= 3, "got {}", descriptions.len());
    }
}
