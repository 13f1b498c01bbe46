// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

pub const TAB_QUERY_KEY: &str = "tab";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HubTab {
    #[default]
    Actions,
    Rules,
}

impl HubTab {
    pub const ALL: [Self; 2] = [Self::Actions, Self::Rules];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Actions => "actions",
            Self::Rules => "rules",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Actions => "Your Inbox",
            Self::Rules => "Workspace Rules",
        }
    }

    /// Absent or `actions` selects the default tab; any other value lands on
    /// the rules side, which also covers future non-default tabs.
    pub fn from_query_value(value: Option<&str>) -> Self {
        match value {
            None | Some("") | Some("actions") => Self::Actions,
            Some(_) => Self::Rules,
        }
    }

    pub const fn next(self) -> Self {
        match self {
            Self::Actions => Self::Rules,
            Self::Rules => Self::Actions,
        }
    }
}

/// Parses the persisted query string and derives the active tab.
pub fn tab_from_query(query: &str) -> HubTab {
    let value = form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == TAB_QUERY_KEY)
        .map(|(_, value)| value.into_owned());
    HubTab::from_query_value(value.as_deref())
}

/// Rewrites the `tab` parameter while preserving every other pair. The
/// default tab removes the parameter entirely; any other tab sets it.
pub fn query_with_tab(query: &str, tab: HubTab) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if key != TAB_QUERY_KEY {
            serializer.append_pair(&key, &value);
        }
    }
    if tab != HubTab::Actions {
        serializer.append_pair(TAB_QUERY_KEY, tab.as_str());
    }
    serializer.finish()
}

/// Where the query string lives between runs. The web original mirrors it
/// into the browser URL; the terminal client mirrors it into a session file.
pub trait TabEnvironment {
    fn read_query(&mut self) -> String;
    fn write_query(&mut self, query: &str);
}

impl<E: TabEnvironment + ?Sized> TabEnvironment for &mut E {
    fn read_query(&mut self) -> String {
        (**self).read_query()
    }

    fn write_query(&mut self, query: &str) {
        (**self).write_query(query);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemoryTabEnvironment {
    pub query: String,
}

impl TabEnvironment for MemoryTabEnvironment {
    fn read_query(&mut self) -> String {
        self.query.clone()
    }

    fn write_query(&mut self, query: &str) {
        self.query = query.to_owned();
    }
}

/// Two-way binding: derive the initial tab from the environment, mirror
/// every subsequent change back to it.
#[derive(Debug)]
pub struct TabBinding<E: TabEnvironment> {
    env: E,
}

impl<E: TabEnvironment> TabBinding<E> {
    pub fn new(env: E) -> Self {
        Self { env }
    }

    pub fn initial_tab(&mut self) -> HubTab {
        tab_from_query(&self.env.read_query())
    }

    pub fn record(&mut self, tab: HubTab) {
        let rewritten = query_with_tab(&self.env.read_query(), tab);
        self.env.write_query(&rewritten);
    }

    pub fn env(&self) -> &E {
        &self.env
    }
}
