// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use parla_api::Client;
use parla_app::{
    NewRule, Rule, RuleId, RuleUpdate, Suggestion, SuggestionId, Task, TaskId, TaskSubmission, User,
};
use parla_tui::{InternalEvent, MutationKind};
use std::sync::mpsc::Sender;
use std::thread;

/// `HubRuntime` backed by the blocking API client. Loads run on the UI
/// thread; mutations run on short-lived worker threads so a slow backend
/// never stalls the event loop.
pub struct ApiRuntime {
    client: Client,
}

impl ApiRuntime {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl parla_tui::HubRuntime for ApiRuntime {
    fn load_user(&mut self) -> Result<Option<User>> {
        Ok(self.client.session().verify(&self.client))
    }

    fn load_tasks(&mut self) -> Result<Vec<Task>> {
        self.client.list_tasks()
    }

    fn load_suggestions(&mut self) -> Result<Vec<Suggestion>> {
        self.client.list_suggestions()
    }

    fn load_rules(&mut self) -> Result<Vec<Rule>> {
        self.client.list_rules()
    }

    fn delete_suggestion(&mut self, id: &SuggestionId) -> Result<()> {
        self.client.delete_suggestion(id)
    }

    fn update_rule(&mut self, update: &RuleUpdate) -> Result<()> {
        self.client.update_rule(update)
    }

    fn create_rule(&mut self, rule: &NewRule) -> Result<RuleId> {
        self.client.create_rule(rule)
    }

    fn submit_task(&mut self, id: &TaskId, submission: &TaskSubmission) -> Result<String> {
        self.client.submit_task(id, submission)
    }

    fn spawn_delete_suggestion(
        &mut self,
        id: SuggestionId,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let client = self.client.clone();
        thread::spawn(move || {
            let outcome = match client.delete_suggestion(&id) {
                Ok(()) => Ok("suggestion dismissed".to_owned()),
                Err(error) => Err(format!("{error:#}")),
            };
            report(&tx, MutationKind::SuggestionDeleted, outcome);
        });
        Ok(())
    }

    fn spawn_update_rule(&mut self, update: RuleUpdate, tx: Sender<InternalEvent>) -> Result<()> {
        let client = self.client.clone();
        thread::spawn(move || {
            let outcome = match client.update_rule(&update) {
                Ok(()) => Ok("rule updated".to_owned()),
                Err(error) => Err(format!("{error:#}")),
            };
            report(&tx, MutationKind::RuleToggled, outcome);
        });
        Ok(())
    }

    fn spawn_create_rule(&mut self, rule: NewRule, tx: Sender<InternalEvent>) -> Result<()> {
        let client = self.client.clone();
        thread::spawn(move || {
            let outcome = match client.create_rule(&rule) {
                Ok(rule_id) => Ok(format!("rule created ({rule_id})")),
                Err(error) => Err(format!("{error:#}")),
            };
            report(&tx, MutationKind::RuleCreated, outcome);
        });
        Ok(())
    }

    fn spawn_submit_task(
        &mut self,
        id: TaskId,
        submission: TaskSubmission,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let client = self.client.clone();
        thread::spawn(move || {
            let outcome = match client.submit_task(&id, &submission) {
                Ok(message) => Ok(message),
                Err(error) => Err(format!("{error:#}")),
            };
            report(&tx, MutationKind::TaskSubmitted, outcome);
        });
        Ok(())
    }
}

fn report(
    tx: &Sender<InternalEvent>,
    kind: MutationKind,
    outcome: std::result::Result<String, String>,
) {
    if tx.send(InternalEvent::MutationFinished { kind, outcome }).is_err() {
        log::debug!("mutation channel closed before {kind:?} finished");
    }
}

#[cfg(test)]
mod tests {
    use super::ApiRuntime;
    use anyhow::Result;
    use parla_api::{AuthStore, Client, MOCK_TOKEN, MemoryTokenStorage};
    use parla_app::{RuleUpdate, TaskSubmission};
    use parla_tui::{HubRuntime, InternalEvent, MutationKind};
    use std::sync::Arc;
    use std::sync::mpsc;
    use std::time::Duration;

    fn mock_runtime() -> Result<ApiRuntime> {
        let client = Client::new(
            "http://127.0.0.1:1",
            Duration::from_millis(200),
            Arc::new(MemoryTokenStorage::with_token(MOCK_TOKEN)),
            AuthStore::new(),
            true,
        )?;
        Ok(ApiRuntime::new(client))
    }

    #[test]
    fn loads_come_from_the_canned_dispatcher() -> Result<()> {
        let mut runtime = mock_runtime()?;

        let user = runtime.load_user()?.expect("mock session should verify");
        assert_eq!(user.first_name, "John");
        assert_eq!(runtime.load_tasks()?.len(), 2);
        assert_eq!(runtime.load_suggestions()?.len(), 1);
        assert_eq!(runtime.load_rules()?.len(), 2);
        Ok(())
    }

    #[test]
    fn spawn_update_rule_reports_over_the_channel() -> Result<()> {
        let mut runtime = mock_runtime()?;
        let rule = runtime.load_rules()?.remove(0);
        let (tx, rx) = mpsc::channel();

        runtime.spawn_update_rule(RuleUpdate::toggle_of(&rule), tx)?;

        let event = rx.recv_timeout(Duration::from_secs(5))?;
        assert_eq!(
            event,
            InternalEvent::MutationFinished {
                kind: MutationKind::RuleToggled,
                outcome: Ok("rule updated".to_owned()),
            }
        );
        Ok(())
    }

    #[test]
    fn spawn_create_rule_reports_the_generated_id() -> Result<()> {
        let mut runtime = mock_runtime()?;
        let suggestion = runtime.load_suggestions()?.remove(0);
        let (tx, rx) = mpsc::channel();

        let new_rule = parla_app::RuleFormSeed::from_suggestion(&suggestion)
            .into_new_rule("Summarize mentions".to_owned());
        runtime.spawn_create_rule(new_rule, tx)?;

        let event = rx.recv_timeout(Duration::from_secs(5))?;
        match event {
            InternalEvent::MutationFinished {
                kind: MutationKind::RuleCreated,
                outcome: Ok(message),
            } => assert!(message.starts_with("rule created (rule_"), "got {message}"),
            other => panic!("unexpected event {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn spawn_submit_task_reports_the_backend_message() -> Result<()> {
        let mut runtime = mock_runtime()?;
        let task = runtime.load_tasks()?.remove(0);
        let (tx, rx) = mpsc::channel();

        runtime.spawn_submit_task(task.task_id, TaskSubmission::text("done"), tx)?;

        let event = rx.recv_timeout(Duration::from_secs(5))?;
        assert_eq!(
            event,
            InternalEvent::MutationFinished {
                kind: MutationKind::TaskSubmitted,
                outcome: Ok("Task submitted successfully (Mock)".to_owned()),
            }
        );
        Ok(())
    }

    #[test]
    fn spawn_delete_suggestion_succeeds_under_the_mock_transport() -> Result<()> {
        let mut runtime = mock_runtime()?;
        let suggestion = runtime.load_suggestions()?.remove(0);
        let (tx, rx) = mpsc::channel();

        runtime.spawn_delete_suggestion(suggestion.id, tx)?;

        let event = rx.recv_timeout(Duration::from_secs(5))?;
        assert_eq!(
            event,
            InternalEvent::MutationFinished {
                kind: MutationKind::SuggestionDeleted,
                outcome: Ok("suggestion dismissed".to_owned()),
            }
        );
        Ok(())
    }
}
