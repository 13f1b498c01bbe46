// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use parla_app::{
    Card, HubCommand, HubEvent, HubState, HubTab, NewRule, Rule, RuleFormSeed, RuleId, RuleUpdate,
    Suggestion, SuggestionId, TabBinding, TabEnvironment, Task, TaskId, TaskSubmission, User,
    cards_from_tasks, chat_count_label, relative_time_label, rule_status_label, service_badge,
    toggle_status_text,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;

const STATUS_CLEAR_SECONDS: u64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    SuggestionDeleted,
    RuleToggled,
    RuleCreated,
    TaskSubmitted,
}

impl MutationKind {
    const fn label(self) -> &'static str {
        match self {
            Self::SuggestionDeleted => "suggestion dismissed",
            Self::RuleToggled => "rule updated",
            Self::RuleCreated => "rule created",
            Self::TaskSubmitted => "task submitted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus {
        token: u64,
    },
    MutationFinished {
        kind: MutationKind,
        outcome: std::result::Result<String, String>,
    },
}

/// Data seam between the hub UI and the transport layer. The default
/// `spawn_*` methods run the mutation inline and report over the channel;
/// the api-backed runtime overrides them with worker threads.
pub trait HubRuntime {
    fn load_user(&mut self) -> Result<Option<User>>;
    fn load_tasks(&mut self) -> Result<Vec<Task>>;
    fn load_suggestions(&mut self) -> Result<Vec<Suggestion>>;
    fn load_rules(&mut self) -> Result<Vec<Rule>>;
    fn delete_suggestion(&mut self, id: &SuggestionId) -> Result<()>;
    fn update_rule(&mut self, update: &RuleUpdate) -> Result<()>;
    fn create_rule(&mut self, rule: &NewRule) -> Result<RuleId>;
    fn submit_task(&mut self, id: &TaskId, submission: &TaskSubmission) -> Result<String>;

    fn spawn_delete_suggestion(
        &mut self,
        id: SuggestionId,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let outcome = match self.delete_suggestion(&id) {
            Ok(()) => Ok(MutationKind::SuggestionDeleted.label().to_owned()),
            Err(error) => Err(error.to_string()),
        };
        send_mutation_finished(&tx, MutationKind::SuggestionDeleted, outcome)
    }

    fn spawn_update_rule(&mut self, update: RuleUpdate, tx: Sender<InternalEvent>) -> Result<()> {
        let outcome = match self.update_rule(&update) {
            Ok(()) => Ok(MutationKind::RuleToggled.label().to_owned()),
            Err(error) => Err(error.to_string()),
        };
        send_mutation_finished(&tx, MutationKind::RuleToggled, outcome)
    }

    fn spawn_create_rule(&mut self, rule: NewRule, tx: Sender<InternalEvent>) -> Result<()> {
        let outcome = match self.create_rule(&rule) {
            Ok(rule_id) => Ok(format!("rule created ({rule_id})")),
            Err(error) => Err(error.to_string()),
        };
        send_mutation_finished(&tx, MutationKind::RuleCreated, outcome)
    }

    fn spawn_submit_task(
        &mut self,
        id: TaskId,
        submission: TaskSubmission,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let outcome = match self.submit_task(&id, &submission) {
            Ok(message) => Ok(message),
            Err(error) => Err(error.to_string()),
        };
        send_mutation_finished(&tx, MutationKind::TaskSubmitted, outcome)
    }
}

fn send_mutation_finished(
    tx: &Sender<InternalEvent>,
    kind: MutationKind,
    outcome: std::result::Result<String, String>,
) -> Result<()> {
    tx.send(InternalEvent::MutationFinished { kind, outcome })
        .map_err(|_| anyhow::anyhow!("mutation event channel closed"))
}

/// Row addressing for the actions tab: cards render first, suggestions after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionRow {
    Card(usize),
    Suggestion(usize),
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ComposerUiState {
    task_id: TaskId,
    title: String,
    input: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct RuleFormUiState {
    seed: RuleFormSeed,
    input: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ViewData {
    user: Option<User>,
    cards: Vec<Card>,
    suggestions: Vec<Suggestion>,
    rules: Vec<Rule>,
    selected: usize,
    search_input: Option<String>,
    composer: Option<ComposerUiState>,
    rule_form: Option<RuleFormUiState>,
    help_visible: bool,
    status_token: u64,
    pending_rule_refresh: bool,
}

impl ViewData {
    fn action_rows(&self, state: &HubState) -> Vec<ActionRow> {
        let mut rows: Vec<ActionRow> = state
            .visible_cards(&self.cards)
            .into_iter()
            .filter_map(|card| {
                self.cards
                    .iter()
                    .position(|candidate| candidate.id == card.id)
            })
            .map(ActionRow::Card)
            .collect();
        for suggestion in state.ordered_suggestions(&self.suggestions) {
            if let Some(index) = self
                .suggestions
                .iter()
                .position(|candidate| candidate.id == suggestion.id)
            {
                rows.push(ActionRow::Suggestion(index));
            }
        }
        rows
    }

    fn row_count(&self, state: &HubState) -> usize {
        match state.active_tab {
            HubTab::Actions => self.action_rows(state).len(),
            HubTab::Rules => self.rules.len(),
        }
    }

    fn clamp_selection(&mut self, state: &HubState) {
        let count = self.row_count(state);
        if count == 0 {
            self.selected = 0;
        } else if self.selected >= count {
            self.selected = count - 1;
        }
    }

    fn selected_action_row(&self, state: &HubState) -> Option<ActionRow> {
        self.action_rows(state).get(self.selected).copied()
    }
}

pub fn run_app<R: HubRuntime, E: TabEnvironment>(
    state: &mut HubState,
    runtime: &mut R,
    binding: &mut TabBinding<E>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    state.dispatch(HubCommand::SelectTab(binding.initial_tab()));
    if let Err(error) = refresh_view_data(state, runtime, &mut view_data) {
        state.dispatch(HubCommand::SetStatus(format!("load failed: {error}")));
    }

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_tx, &internal_rx);
        if view_data.pending_rule_refresh {
            view_data.pending_rule_refresh = false;
            match runtime.load_rules() {
                Ok(rules) => view_data.rules = rules,
                Err(error) => {
                    emit_status(state, &mut view_data, &internal_tx, format!(
                        "rule refresh failed: {error}"
                    ));
                }
            }
            view_data.clamp_selection(state);
        }

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, binding, &mut view_data, &internal_tx, key)
                    {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut HubState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(HubCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::MutationFinished { kind, outcome } => match outcome {
                Ok(message) => {
                    if kind == MutationKind::RuleCreated || kind == MutationKind::RuleToggled {
                        view_data.pending_rule_refresh = true;
                    }
                    emit_status(state, view_data, tx, message);
                }
                Err(error) => {
                    if kind == MutationKind::RuleToggled {
                        // The record's remote state is unknown after a failed
                        // toggle; refetch rather than guess.
                        view_data.pending_rule_refresh = true;
                    }
                    emit_status(state, view_data, tx, format!("{}: {error}", kind.label()));
                }
            },
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(STATUS_CLEAR_SECONDS));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut HubState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(HubCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn refresh_view_data<R: HubRuntime>(
    state: &mut HubState,
    runtime: &mut R,
    view_data: &mut ViewData,
) -> Result<()> {
    view_data.user = runtime.load_user()?;
    let tasks = runtime.load_tasks()?;
    view_data.cards = cards_from_tasks(&tasks, OffsetDateTime::now_utc());
    view_data.suggestions = runtime.load_suggestions()?;
    view_data.rules = runtime.load_rules()?;
    view_data.clamp_selection(state);
    Ok(())
}

fn handle_key_event<R: HubRuntime, E: TabEnvironment>(
    state: &mut HubState,
    runtime: &mut R,
    binding: &mut TabBinding<E>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.composer.is_some() {
        handle_composer_key(state, runtime, view_data, internal_tx, key);
        return false;
    }
    if view_data.rule_form.is_some() {
        handle_rule_form_key(state, runtime, view_data, internal_tx, key);
        return false;
    }
    if view_data.search_input.is_some() {
        handle_search_key(state, view_data, key);
        return false;
    }
    if view_data.help_visible {
        view_data.help_visible = false;
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Tab => {
            state.dispatch(HubCommand::NextTab);
            binding.record(state.active_tab);
            view_data.selected = 0;
        }
        KeyCode::Char('1') => {
            select_tab(state, binding, view_data, HubTab::Actions);
        }
        KeyCode::Char('2') => {
            select_tab(state, binding, view_data, HubTab::Rules);
        }
        KeyCode::Char('/') => {
            view_data.search_input = Some(state.search_query.clone());
        }
        KeyCode::Esc => {
            if !state.search_query.is_empty() {
                state.dispatch(HubCommand::ClearSearch);
                view_data.clamp_selection(state);
            }
        }
        KeyCode::Down | KeyCode::Char('j') => {
            let count = view_data.row_count(state);
            if count > 0 && view_data.selected + 1 < count {
                view_data.selected += 1;
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view_data.selected = view_data.selected.saturating_sub(1);
        }
        KeyCode::Char('R') => {
            if let Err(error) = refresh_view_data(state, runtime, view_data) {
                emit_status(state, view_data, internal_tx, format!("refresh failed: {error}"));
            } else {
                emit_status(state, view_data, internal_tx, "refreshed");
            }
        }
        KeyCode::Char('?') => {
            view_data.help_visible = true;
        }
        KeyCode::Char('d') if state.active_tab == HubTab::Actions => {
            dismiss_selected(state, runtime, view_data, internal_tx);
        }
        KeyCode::Char('b') if state.active_tab == HubTab::Actions => {
            if let Some(ActionRow::Suggestion(index)) = view_data.selected_action_row(state)
                && let Some(suggestion) = view_data.suggestions.get(index)
            {
                state.dispatch(HubCommand::SendSuggestionToBack(suggestion.id.clone()));
                view_data.clamp_selection(state);
            }
        }
        KeyCode::Char('m') if state.active_tab == HubTab::Actions => {
            if let Some(ActionRow::Card(index)) = view_data.selected_action_row(state)
                && let Some(card) = view_data.cards.get(index)
            {
                view_data.composer = Some(ComposerUiState {
                    task_id: card.id.clone(),
                    title: card.title.clone(),
                    input: String::new(),
                });
            }
        }
        KeyCode::Char('n') => {
            let seed = match (state.active_tab, view_data.selected_action_row(state)) {
                (HubTab::Actions, Some(ActionRow::Suggestion(index))) => view_data
                    .suggestions
                    .get(index)
                    .map(RuleFormSeed::from_suggestion)
                    .unwrap_or_default(),
                _ => RuleFormSeed::default(),
            };
            let input = seed.display_rule.clone();
            view_data.rule_form = Some(RuleFormUiState { seed, input });
        }
        KeyCode::Char('t') if state.active_tab == HubTab::Rules => {
            toggle_selected_rule(state, runtime, view_data, internal_tx);
        }
        _ => {}
    }
    false
}

fn select_tab<E: TabEnvironment>(
    state: &mut HubState,
    binding: &mut TabBinding<E>,
    view_data: &mut ViewData,
    tab: HubTab,
) {
    let events = state.dispatch(HubCommand::SelectTab(tab));
    if events.contains(&HubEvent::TabChanged(tab)) {
        binding.record(tab);
        view_data.selected = 0;
    }
}

fn dismiss_selected<R: HubRuntime>(
    state: &mut HubState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    match view_data.selected_action_row(state) {
        Some(ActionRow::Card(index)) => {
            if let Some(card) = view_data.cards.get(index) {
                state.dispatch(HubCommand::DismissCard(card.id.clone()));
                view_data.clamp_selection(state);
            }
        }
        Some(ActionRow::Suggestion(index)) => {
            let Some(suggestion) = view_data.suggestions.get(index) else {
                return;
            };
            let id = suggestion.id.clone();
            let events = state.dispatch(HubCommand::DismissSuggestion(id.clone()));
            view_data.clamp_selection(state);
            let newly_dismissed = events.iter().any(|event| {
                matches!(
                    event,
                    HubEvent::SuggestionDismissed {
                        newly_dismissed: true,
                        ..
                    }
                )
            });
            if newly_dismissed
                && let Err(error) = runtime.spawn_delete_suggestion(id, internal_tx.clone())
            {
                emit_status(state, view_data, internal_tx, format!("dismiss failed: {error}"));
            }
        }
        None => {}
    }
}

fn toggle_selected_rule<R: HubRuntime>(
    state: &mut HubState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(rule) = view_data.rules.get(view_data.selected) else {
        return;
    };
    let update = RuleUpdate::toggle_of(rule);
    // The view keeps showing the fetched collection; the finished mutation
    // schedules a rules refetch.
    if let Err(error) = runtime.spawn_update_rule(update, internal_tx.clone()) {
        emit_status(state, view_data, internal_tx, format!("toggle failed: {error}"));
    }
}

fn handle_search_key(state: &mut HubState, view_data: &mut ViewData, key: KeyEvent) {
    let Some(input) = view_data.search_input.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => {
            view_data.search_input = None;
            state.dispatch(HubCommand::ClearSearch);
            view_data.clamp_selection(state);
        }
        KeyCode::Enter => {
            view_data.search_input = None;
        }
        KeyCode::Backspace => {
            input.pop();
            let query = input.clone();
            state.dispatch(HubCommand::SetSearch(query));
            view_data.clamp_selection(state);
        }
        KeyCode::Char(ch) => {
            input.push(ch);
            let query = input.clone();
            state.dispatch(HubCommand::SetSearch(query));
            view_data.clamp_selection(state);
        }
        _ => {}
    }
}

fn handle_composer_key<R: HubRuntime>(
    state: &mut HubState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(composer) = view_data.composer.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => {
            view_data.composer = None;
        }
        KeyCode::Enter => {
            let submission = TaskSubmission::text(composer.input.clone());
            if submission.is_empty() {
                return;
            }
            let task_id = composer.task_id.clone();
            view_data.composer = None;
            if let Err(error) = runtime.spawn_submit_task(task_id, submission, internal_tx.clone())
            {
                emit_status(state, view_data, internal_tx, format!("submit failed: {error}"));
            }
        }
        KeyCode::Backspace => {
            composer.input.pop();
        }
        KeyCode::Char(ch) => {
            composer.input.push(ch);
        }
        _ => {}
    }
}

fn handle_rule_form_key<R: HubRuntime>(
    state: &mut HubState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(form) = view_data.rule_form.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => {
            view_data.rule_form = None;
        }
        KeyCode::Enter => {
            let text = form.input.trim().to_owned();
            if text.is_empty() {
                return;
            }
            let seed = form.seed.clone();
            view_data.rule_form = None;
            let new_rule = seed.into_new_rule(text);
            if let Err(error) = runtime.spawn_create_rule(new_rule, internal_tx.clone()) {
                emit_status(state, view_data, internal_tx, format!("create failed: {error}"));
            }
        }
        KeyCode::Backspace => {
            form.input.pop();
        }
        KeyCode::Char(ch) => {
            form.input.push(ch);
        }
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &HubState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let header = Paragraph::new(header_text(view_data))
        .block(Block::default().title("parla").borders(Borders::ALL));
    frame.render_widget(header, layout[0]);

    let selected = HubTab::ALL
        .iter()
        .position(|tab| *tab == state.active_tab)
        .unwrap_or(0);
    let tab_titles = HubTab::ALL
        .iter()
        .map(|tab| tab_title(*tab, state, view_data))
        .collect::<Vec<String>>();
    let tabs = Tabs::new(tab_titles)
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[1]);

    let body_text = match state.active_tab {
        HubTab::Actions => render_actions_text(state, view_data),
        HubTab::Rules => render_rules_text(state, view_data),
    };
    let body = Paragraph::new(body_text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(state.active_tab.label()),
    );
    frame.render_widget(body, layout[2]);

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[3]);

    if let Some(composer) = &view_data.composer {
        let area = centered_rect(70, 40, frame.area());
        frame.render_widget(Clear, area);
        let widget = Paragraph::new(render_composer_text(composer))
            .block(Block::default().title("reply").borders(Borders::ALL));
        frame.render_widget(widget, area);
    }

    if let Some(form) = &view_data.rule_form {
        let area = centered_rect(70, 40, frame.area());
        frame.render_widget(Clear, area);
        let widget = Paragraph::new(render_rule_form_text(form))
            .block(Block::default().title("new rule").borders(Borders::ALL));
        frame.render_widget(widget, area);
    }

    if view_data.help_visible {
        let area = centered_rect(80, 70, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn header_text(view_data: &ViewData) -> String {
    let name = view_data
        .user
        .as_ref()
        .map(|user| user.greeting_name().to_owned())
        .unwrap_or_else(|| "there".to_owned());
    format!("Hi {name} -- here's what needs your attention")
}

fn tab_title(tab: HubTab, state: &HubState, view_data: &ViewData) -> String {
    let count = match tab {
        HubTab::Actions => {
            let mut actions_state = state.clone();
            actions_state.active_tab = HubTab::Actions;
            actions_state.pending_count(&view_data.cards, &view_data.suggestions, 0)
        }
        HubTab::Rules => view_data.rules.len(),
    };
    format!("{} ({count})", tab.label())
}

fn render_actions_text(state: &HubState, view_data: &ViewData) -> String {
    let rows = view_data.action_rows(state);
    if rows.is_empty() {
        return if state.search_query.is_empty() {
            "All caught up.".to_owned()
        } else {
            format!("No matches for {:?}.", state.search_query)
        };
    }

    let mut lines = Vec::new();
    let mut wrote_suggestion_header = false;
    for (position, row) in rows.iter().enumerate() {
        let marker = if position == view_data.selected {
            "> "
        } else {
            "  "
        };
        match row {
            ActionRow::Card(index) => {
                let Some(card) = view_data.cards.get(*index) else {
                    continue;
                };
                lines.push(format!(
                    "{marker}[{}] {} -- {} ({}, {})",
                    card.category, card.title, card.subtitle, card.recipient, card.timestamp
                ));
            }
            ActionRow::Suggestion(index) => {
                if !wrote_suggestion_header {
                    lines.push(String::new());
                    lines.push("Suggestions".to_owned());
                    wrote_suggestion_header = true;
                }
                let Some(suggestion) = view_data.suggestions.get(*index) else {
                    continue;
                };
                lines.push(format!(
                    "{marker}{} ({})",
                    suggestion.display_rule,
                    chat_count_label(suggestion.chats.len())
                ));
            }
        }
    }
    lines.join("\n")
}

fn render_rules_text(state: &HubState, view_data: &ViewData) -> String {
    if view_data.rules.is_empty() {
        return "No rules yet. Press n to create one.".to_owned();
    }

    let now = OffsetDateTime::now_utc();
    let mut lines = Vec::new();
    for (position, rule) in view_data.rules.iter().enumerate() {
        let marker = if state.active_tab == HubTab::Rules && position == view_data.selected {
            "> "
        } else {
            "  "
        };
        let default_mark = if rule.is_default { " [default]" } else { "" };
        lines.push(format!(
            "{marker}{} [{}]{default_mark}",
            rule.title(),
            service_badge(rule)
        ));
        lines.push(format!(
            "    {} -- {}",
            rule_status_label(rule),
            toggle_status_text(rule)
        ));
        if let Some(last) = &rule.last_triggered_at {
            lines.push(format!(
                "    last triggered {}",
                relative_time_label(last, now)
            ));
        }
    }
    lines.join("\n")
}

fn render_composer_text(composer: &ComposerUiState) -> String {
    [
        format!("reply to: {}", composer.title),
        String::new(),
        format!("> {}_", composer.input),
        String::new(),
        "enter: send    esc: cancel".to_owned(),
    ]
    .join("\n")
}

fn render_rule_form_text(form: &RuleFormUiState) -> String {
    let scope = if form.seed.chat_ids.is_empty() {
        "all chats".to_owned()
    } else {
        chat_count_label(form.seed.chat_ids.len())
    };
    [
        format!("scope: {scope}"),
        String::new(),
        format!("> {}_", form.input),
        String::new(),
        "enter: create    esc: cancel".to_owned(),
    ]
    .join("\n")
}

fn status_text(state: &HubState, view_data: &ViewData) -> String {
    if let Some(input) = &view_data.search_input {
        return format!("search: {input}_");
    }
    if let Some(status) = &state.status_line {
        return status.clone();
    }
    if !state.search_query.is_empty() {
        return format!("filter: {} (esc clears)", state.search_query);
    }
    "tab: switch  /: search  d: dismiss  b: later  m: reply  n: new rule  t: toggle  ?: help"
        .to_owned()
}

fn help_overlay_text() -> String {
    [
        "tab / 1 / 2   switch between inbox and rules",
        "j / k         move selection",
        "/             search cards by title or message",
        "d             dismiss the selected card or suggestion",
        "b             push the selected suggestion to the back",
        "m             reply to the selected card",
        "n             create a rule (seeded from a suggestion)",
        "t             pause or resume the selected rule",
        "R             reload everything from the backend",
        "q / ctrl-q    quit",
    ]
    .join("\n")
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
