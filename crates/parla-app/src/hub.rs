// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::OffsetDateTime;
use url::form_urlencoded;

use crate::format::relative_time_label;
use crate::ids::{ChatId, SuggestionId};
use crate::model::{Card, NewRule, RuleStatus, Suggestion, Task};
use crate::state::HubState;
use crate::tabs::HubTab;

pub const CARD_PLATFORM: &str = "whatsapp";

impl Card {
    pub fn from_task(task: &Task, now: OffsetDateTime) -> Self {
        Self {
            id: task.task_id.clone(),
            title: task.task_description.clone(),
            subtitle: task.task_message.clone(),
            category: task.task_category.to_lowercase(),
            timestamp: relative_time_label(&task.last_updated_at, now),
            recipient: if task.whatsapp_chat_id.is_empty() {
                "Unknown".to_owned()
            } else {
                task.whatsapp_chat_id.clone()
            },
            platform: CARD_PLATFORM,
        }
    }
}

pub fn cards_from_tasks(tasks: &[Task], now: OffsetDateTime) -> Vec<Card> {
    tasks.iter().map(|task| Card::from_task(task, now)).collect()
}

impl HubState {
    /// Filtering pipeline for the card list: dismissed cards are dropped
    /// regardless of search, then a non-empty query keeps cards whose title
    /// or subtitle matches case-insensitively.
    pub fn visible_cards<'a>(&self, cards: &'a [Card]) -> Vec<&'a Card> {
        let query = self.search_query.to_lowercase();
        cards
            .iter()
            .filter(|card| !self.is_card_dismissed(&card.id))
            .filter(|card| {
                if query.is_empty() {
                    return true;
                }
                card.title.to_lowercase().contains(&query)
                    || card.subtitle.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Non-dismissed suggestions, demoted ones last in demotion order.
    pub fn ordered_suggestions<'a>(&self, suggestions: &'a [Suggestion]) -> Vec<&'a Suggestion> {
        let visible: Vec<&Suggestion> = suggestions
            .iter()
            .filter(|suggestion| !self.is_suggestion_dismissed(&suggestion.id))
            .collect();

        let demoted = self.demoted_suggestions();
        if demoted.is_empty() {
            return visible;
        }

        let mut front: Vec<&Suggestion> = visible
            .iter()
            .copied()
            .filter(|suggestion| !demoted.contains(&suggestion.id))
            .collect();
        let back = demoted.iter().filter_map(|id| {
            visible
                .iter()
                .copied()
                .find(|suggestion| &suggestion.id == id)
        });
        front.extend(back);
        front
    }

    /// Pending count for the active tab: visible cards plus ordered
    /// suggestions on the actions tab, the unfiltered rule total otherwise.
    pub fn pending_count(
        &self,
        cards: &[Card],
        suggestions: &[Suggestion],
        rule_count: usize,
    ) -> usize {
        match self.active_tab {
            HubTab::Actions => {
                self.visible_cards(cards).len() + self.ordered_suggestions(suggestions).len()
            }
            HubTab::Rules => rule_count,
        }
    }
}

/// Prefill carried from a suggestion into the rule-creation form. Creating
/// a rule never deletes the suggestion it came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleFormSeed {
    pub display_rule: String,
    pub chat_ids: Vec<ChatId>,
    pub suggestion_id: Option<SuggestionId>,
}

impl RuleFormSeed {
    pub fn from_suggestion(suggestion: &Suggestion) -> Self {
        Self {
            display_rule: suggestion.display_rule.clone(),
            chat_ids: suggestion.chat_ids(),
            suggestion_id: Some(suggestion.id.clone()),
        }
    }

    /// Query-string encoding of the rule-creation target, matching the web
    /// surface: `suggestion`, comma-joined `chatIds`, `suggestion_id`.
    pub fn to_query(&self) -> String {
        let chat_ids = self
            .chat_ids
            .iter()
            .map(ChatId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer.append_pair("suggestion", &self.display_rule);
        serializer.append_pair("chatIds", &chat_ids);
        if let Some(id) = &self.suggestion_id {
            serializer.append_pair("suggestion_id", id.as_str());
        }
        serializer.finish()
    }

    pub fn from_query(query: &str) -> Self {
        let mut seed = Self::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "suggestion" => seed.display_rule = value.into_owned(),
                "chatIds" => {
                    seed.chat_ids = value
                        .split(',')
                        .filter(|part| !part.is_empty())
                        .map(ChatId::new)
                        .collect();
                }
                "suggestion_id" => seed.suggestion_id = Some(SuggestionId::new(value.into_owned())),
                _ => {}
            }
        }
        seed
    }

    /// New rules start active, scoped to the seeded chats.
    pub fn into_new_rule(self, raw_text: String) -> NewRule {
        NewRule {
            w_id: self.chat_ids,
            raw_text,
            status: RuleStatus::Active,
            suggestion_id: self.suggestion_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RuleFormSeed, cards_from_tasks};
    use crate::ids::{ChatId, SuggestionId, TaskId};
    use crate::model::{RuleStatus, Suggestion, SuggestionChat, Task};
    use crate::state::{HubCommand, HubState};
    use crate::tabs::HubTab;
    use time::format_description::well_known::Rfc3339;
    use time::macros::datetime;

    fn task(id: &str, description: &str, message: &str) -> Task {
        Task {
            task_id: TaskId::new(id),
            whatsapp_chat_id: "12345".to_owned(),
            card_type: "message".to_owned(),
            task_description: description.to_owned(),
            task_message: message.to_owned(),
            task_category: "Work".to_owned(),
            last_updated_at: (datetime!(2026-08-29 11:00:00 UTC))
                .format(&Rfc3339)
                .expect("fixture timestamp should format"),
        }
    }

    fn suggestion(id: &str) -> Suggestion {
        Suggestion {
            id: SuggestionId::new(id),
            user_id: "user-1".to_owned(),
            suggestion_type: "rule".to_owned(),
            status: "pending".to_owned(),
            why: String::new(),
            chats: vec![SuggestionChat {
                w_id: ChatId::new("12345"),
                chat_name: "Work".to_owned(),
            }],
            rule: "Notify on mentions".to_owned(),
            action: "notify".to_owned(),
            display_rule: format!("When I am mentioned ({id})"),
            deadline: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn cards_project_tasks_with_lowercased_category() {
        let now = datetime!(2026-08-29 12:00:00 UTC);
        let cards = cards_from_tasks(&[task("task-1", "Follow up", "Unread email")], now);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].category, "work");
        assert_eq!(cards[0].timestamp, "1h ago");
        assert_eq!(cards[0].recipient, "12345");
        assert_eq!(cards[0].platform, "whatsapp");
    }

    #[test]
    fn card_recipient_falls_back_to_unknown() {
        let now = datetime!(2026-08-29 12:00:00 UTC);
        let mut orphan = task("task-1", "Follow up", "Unread email");
        orphan.whatsapp_chat_id = String::new();
        let cards = cards_from_tasks(&[orphan], now);
        assert_eq!(cards[0].recipient, "Unknown");
    }

    #[test]
    fn dismissed_card_never_reappears_even_under_search() {
        let now = datetime!(2026-08-29 12:00:00 UTC);
        let cards = cards_from_tasks(
            &[
                task("task-1", "Analyze group chats", "Interesting items found"),
                task("task-2", "Follow up on email", "You have an urgent email"),
            ],
            now,
        );

        let mut state = HubState::default();
        state.dispatch(HubCommand::DismissCard(TaskId::new("task-2")));

        let visible = state.visible_cards(&cards);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, TaskId::new("task-1"));

        state.dispatch(HubCommand::SetSearch("urgent".to_owned()));
        assert!(state.visible_cards(&cards).is_empty());
    }

    #[test]
    fn search_matches_title_or_subtitle_case_insensitively() {
        let now = datetime!(2026-08-29 12:00:00 UTC);
        let cards = cards_from_tasks(
            &[
                task("task-1", "Analyze group chats", "Interesting items found"),
                task("task-2", "Follow up", "You have an URGENT email from the boss"),
            ],
            now,
        );

        let mut state = HubState::default();
        state.dispatch(HubCommand::SetSearch("urgent".to_owned()));
        let visible = state.visible_cards(&cards);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, TaskId::new("task-2"));

        state.dispatch(HubCommand::ClearSearch);
        assert_eq!(state.visible_cards(&cards).len(), 2);
    }

    #[test]
    fn card_without_matching_text_is_excluded() {
        let now = datetime!(2026-08-29 12:00:00 UTC);
        let mut bare = task("task-1", "Analyze group chats", "");
        bare.task_message = String::new();
        let cards = cards_from_tasks(&[bare], now);

        let mut state = HubState::default();
        state.dispatch(HubCommand::SetSearch("urgent".to_owned()));
        assert!(state.visible_cards(&cards).is_empty());
    }

    #[test]
    fn demoted_suggestions_move_to_the_back_in_demotion_order() {
        let suggestions = vec![suggestion("sugg-1"), suggestion("sugg-2"), suggestion("sugg-3")];
        let mut state = HubState::default();

        state.dispatch(HubCommand::SendSuggestionToBack(SuggestionId::new("sugg-1")));
        state.dispatch(HubCommand::SendSuggestionToBack(SuggestionId::new("sugg-2")));

        let ordered = state.ordered_suggestions(&suggestions);
        let ids: Vec<&str> = ordered.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["sugg-3", "sugg-1", "sugg-2"]);

        // Re-demoting moves to the end again without duplicating.
        state.dispatch(HubCommand::SendSuggestionToBack(SuggestionId::new("sugg-1")));
        let ordered = state.ordered_suggestions(&suggestions);
        let ids: Vec<&str> = ordered.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["sugg-3", "sugg-2", "sugg-1"]);
    }

    #[test]
    fn dismissed_suggestions_are_dropped_before_ordering() {
        let suggestions = vec![suggestion("sugg-1"), suggestion("sugg-2")];
        let mut state = HubState::default();

        state.dispatch(HubCommand::SendSuggestionToBack(SuggestionId::new("sugg-1")));
        state.dispatch(HubCommand::DismissSuggestion(SuggestionId::new("sugg-1")));

        let ordered = state.ordered_suggestions(&suggestions);
        assert_eq!(ordered.len(), 1);
        assert_eq!(ordered[0].id, SuggestionId::new("sugg-2"));
    }

    #[test]
    fn pending_count_tracks_the_active_tab() {
        let now = datetime!(2026-08-29 12:00:00 UTC);
        let cards = cards_from_tasks(
            &[task("task-1", "Follow up", "Unread email")],
            now,
        );
        let suggestions = vec![suggestion("sugg-1"), suggestion("sugg-2")];

        let mut state = HubState::default();
        assert_eq!(state.pending_count(&cards, &suggestions, 7), 3);

        state.dispatch(HubCommand::DismissSuggestion(SuggestionId::new("sugg-1")));
        assert_eq!(state.pending_count(&cards, &suggestions, 7), 2);

        state.dispatch(HubCommand::SelectTab(HubTab::Rules));
        assert_eq!(state.pending_count(&cards, &suggestions, 7), 7);
    }

    #[test]
    fn rule_form_seed_round_trips_through_its_query() {
        let source = suggestion("sugg-1");
        let seed = RuleFormSeed::from_suggestion(&source);
        let query = seed.to_query();
        assert!(query.contains("suggestion_id=sugg-1"), "got {query}");
        assert!(query.contains("chatIds=12345"), "got {query}");

        let parsed = RuleFormSeed::from_query(&query);
        assert_eq!(parsed, seed);
    }

    #[test]
    fn rule_form_seed_joins_multiple_chat_scopes_with_commas() {
        let mut source = suggestion("sugg-1");
        source.chats.push(crate::model::SuggestionChat {
            w_id: ChatId::new("67890"),
            chat_name: "Marketing".to_owned(),
        });
        let query = RuleFormSeed::from_suggestion(&source).to_query();
        assert!(query.contains("chatIds=12345%2C67890"), "got {query}");
    }

    #[test]
    fn seeded_new_rule_starts_active() {
        let seed = RuleFormSeed::from_suggestion(&suggestion("sugg-1"));
        let new_rule = seed.into_new_rule("Notify on mentions".to_owned());
        assert_eq!(new_rule.status, RuleStatus::Active);
        assert_eq!(new_rule.w_id, vec![ChatId::new("12345")]);
        assert_eq!(new_rule.suggestion_id, Some(SuggestionId::new("sugg-1")));
    }
}
