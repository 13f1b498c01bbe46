// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use crate::ids::{SuggestionId, TaskId};
use crate::tabs::HubTab;

/// Process-local hub state. Dismissal sets and the demotion list reset on
/// restart; the server is never told about card dismissals.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HubState {
    pub active_tab: HubTab,
    pub search_query: String,
    pub status_line: Option<String>,
    dismissed_cards: BTreeSet<TaskId>,
    dismissed_suggestions: BTreeSet<SuggestionId>,
    demoted_suggestions: Vec<SuggestionId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubCommand {
    SelectTab(HubTab),
    NextTab,
    SetSearch(String),
    ClearSearch,
    DismissCard(TaskId),
    DismissSuggestion(SuggestionId),
    SendSuggestionToBack(SuggestionId),
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubEvent {
    TabChanged(HubTab),
    SearchChanged(String),
    CardDismissed(TaskId),
    /// `newly_dismissed` is false when the id was already in the set, so the
    /// runtime issues at most one remote delete per insertion.
    SuggestionDismissed {
        id: SuggestionId,
        newly_dismissed: bool,
    },
    SuggestionDemoted(SuggestionId),
    StatusUpdated(String),
    StatusCleared,
}

impl HubState {
    pub fn dispatch(&mut self, command: HubCommand) -> Vec<HubEvent> {
        match command {
            HubCommand::SelectTab(tab) => {
                if self.active_tab == tab {
                    return Vec::new();
                }
                self.active_tab = tab;
                vec![HubEvent::TabChanged(tab)]
            }
            HubCommand::NextTab => {
                self.active_tab = self.active_tab.next();
                vec![HubEvent::TabChanged(self.active_tab)]
            }
            HubCommand::SetSearch(query) => {
                self.search_query = query.clone();
                vec![HubEvent::SearchChanged(query)]
            }
            HubCommand::ClearSearch => {
                self.search_query.clear();
                vec![HubEvent::SearchChanged(String::new())]
            }
            HubCommand::DismissCard(id) => {
                self.dismissed_cards.insert(id.clone());
                vec![HubEvent::CardDismissed(id)]
            }
            HubCommand::DismissSuggestion(id) => {
                let newly_dismissed = self.dismissed_suggestions.insert(id.clone());
                vec![HubEvent::SuggestionDismissed {
                    id,
                    newly_dismissed,
                }]
            }
            HubCommand::SendSuggestionToBack(id) => {
                self.demoted_suggestions
                    .retain(|existing| existing != &id);
                self.demoted_suggestions.push(id.clone());
                vec![HubEvent::SuggestionDemoted(id)]
            }
            HubCommand::SetStatus(message) => {
                self.status_line = Some(message.clone());
                vec![HubEvent::StatusUpdated(message)]
            }
            HubCommand::ClearStatus => {
                self.status_line = None;
                vec![HubEvent::StatusCleared]
            }
        }
    }

    pub fn is_card_dismissed(&self, id: &TaskId) -> bool {
        self.dismissed_cards.contains(id)
    }

    pub fn is_suggestion_dismissed(&self, id: &SuggestionId) -> bool {
        self.dismissed_suggestions.contains(id)
    }

    /// Demoted ids, oldest demotion first.
    pub fn demoted_suggestions(&self) -> &[SuggestionId] {
        &self.demoted_suggestions
    }

    pub fn dismissed_card_count(&self) -> usize {
        self.dismissed_cards.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{HubCommand, HubEvent, HubState};
    use crate::ids::{SuggestionId, TaskId};
    use crate::tabs::HubTab;

    #[test]
    fn tab_selection_is_idempotent() {
        let mut state = HubState::default();

        let events = state.dispatch(HubCommand::SelectTab(HubTab::Rules));
        assert_eq!(state.active_tab, HubTab::Rules);
        assert_eq!(events, vec![HubEvent::TabChanged(HubTab::Rules)]);

        let repeated = state.dispatch(HubCommand::SelectTab(HubTab::Rules));
        assert!(repeated.is_empty());
    }

    #[test]
    fn card_dismissal_is_local_and_sticky() {
        let mut state = HubState::default();
        let id = TaskId::new("task-1");

        state.dispatch(HubCommand::DismissCard(id.clone()));
        assert!(state.is_card_dismissed(&id));

        state.dispatch(HubCommand::DismissCard(id.clone()));
        assert!(state.is_card_dismissed(&id));
        assert_eq!(state.dismissed_card_count(), 1);
    }

    #[test]
    fn suggestion_dismissal_reports_first_insertion_only() {
        let mut state = HubState::default();
        let id = SuggestionId::new("sugg-1");

        let first = state.dispatch(HubCommand::DismissSuggestion(id.clone()));
        assert_eq!(
            first,
            vec![HubEvent::SuggestionDismissed {
                id: id.clone(),
                newly_dismissed: true,
            }]
        );

        let second = state.dispatch(HubCommand::DismissSuggestion(id.clone()));
        assert_eq!(
            second,
            vec![HubEvent::SuggestionDismissed {
                id,
                newly_dismissed: false,
            }]
        );
    }

    #[test]
    fn send_to_back_never_duplicates_an_id() {
        let mut state = HubState::default();
        let first = SuggestionId::new("sugg-1");
        let second = SuggestionId::new("sugg-2");

        state.dispatch(HubCommand::SendSuggestionToBack(first.clone()));
        state.dispatch(HubCommand::SendSuggestionToBack(second.clone()));
        assert_eq!(
            state.demoted_suggestions(),
            &[first.clone(), second.clone()]
        );

        state.dispatch(HubCommand::SendSuggestionToBack(first.clone()));
        assert_eq!(state.demoted_suggestions(), &[second, first]);
    }

    #[test]
    fn search_and_status_updates_emit_events() {
        let mut state = HubState::default();

        let events = state.dispatch(HubCommand::SetSearch("urgent".to_owned()));
        assert_eq!(state.search_query, "urgent");
        assert_eq!(events, vec![HubEvent::SearchChanged("urgent".to_owned())]);

        state.dispatch(HubCommand::ClearSearch);
        assert!(state.search_query.is_empty());

        state.dispatch(HubCommand::SetStatus("rule updated".to_owned()));
        assert_eq!(state.status_line.as_deref(), Some("rule updated"));

        state.dispatch(HubCommand::ClearStatus);
        assert!(state.status_line.is_none());
    }
}
