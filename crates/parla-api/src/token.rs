// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Cookie name this client writes.
pub const TOKEN_KEY: &str = "parla-token";
/// Cookie name the backend sets; may differ from the internal one.
pub const BACKEND_COOKIE_NAME: &str = "access-token";

const TOKEN_MAX_AGE_SECONDS: u64 = 31_536_000;

/// Where the bearer token lives. Implementations degrade to absence when the
/// medium is unreadable; get/set/clear never fail.
pub trait TokenStorage: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, token: &str);
    fn clear(&self);
}

/// Cookie-file storage: one `name=value; attrs` line per cookie. Reads
/// recognize both the backend cookie name and the internal one.
#[derive(Debug)]
pub struct CookieFileStorage {
    path: PathBuf,
}

impl CookieFileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl TokenStorage for CookieFileStorage {
    fn get(&self) -> Option<String> {
        let contents = fs::read_to_string(&self.path).ok()?;
        for line in contents.lines() {
            let Some((name, value)) = parse_cookie_line(line) else {
                continue;
            };
            if name == BACKEND_COOKIE_NAME || name == TOKEN_KEY {
                if value.is_empty() {
                    return None;
                }
                return Some(value.to_owned());
            }
        }
        None
    }

    fn set(&self, token: &str) {
        if let Some(parent) = self.path.parent()
            && let Err(error) = fs::create_dir_all(parent)
        {
            log::warn!("cannot create token directory {}: {error}", parent.display());
            return;
        }
        let line = format!(
            "{TOKEN_KEY}={token}; Max-Age={TOKEN_MAX_AGE_SECONDS}; SameSite=Strict\n"
        );
        if let Err(error) = fs::write(&self.path, line) {
            log::warn!("cannot write token file {}: {error}", self.path.display());
        }
    }

    fn clear(&self) {
        if self.path.exists()
            && let Err(error) = fs::remove_file(&self.path)
        {
            log::warn!("cannot remove token file {}: {error}", self.path.display());
        }
    }
}

fn parse_cookie_line(line: &str) -> Option<(&str, &str)> {
    let first = line.split(';').next()?.trim();
    let (name, value) = first.split_once('=')?;
    Some((name.trim(), value.trim()))
}

/// In-memory storage for tests.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_owned())),
        }
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn get(&self) -> Option<String> {
        match self.token.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => None,
        }
    }

    fn set(&self, token: &str) {
        if let Ok(mut guard) = self.token.lock() {
            *guard = Some(token.to_owned());
        }
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.token.lock() {
            *guard = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        BACKEND_COOKIE_NAME, CookieFileStorage, MemoryTokenStorage, TOKEN_KEY, TokenStorage,
        parse_cookie_line,
    };

    #[test]
    fn cookie_line_parses_name_value_and_drops_attrs() {
        assert_eq!(
            parse_cookie_line("parla-token=abc; Max-Age=31536000; SameSite=Strict"),
            Some(("parla-token", "abc"))
        );
        assert_eq!(parse_cookie_line("  access-token = xyz "), Some(("access-token", "xyz")));
        assert_eq!(parse_cookie_line("not a cookie"), None);
        assert_eq!(parse_cookie_line(""), None);
    }

    #[test]
    fn file_storage_round_trips_a_token() {
        let dir = tempfile::tempdir().expect("temp dir should create");
        let storage = CookieFileStorage::new(dir.path().join("cookies.txt"));

        assert_eq!(storage.get(), None);
        storage.set("tok-1");
        assert_eq!(storage.get().as_deref(), Some("tok-1"));
        storage.clear();
        assert_eq!(storage.get(), None);
    }

    #[test]
    fn file_storage_recognizes_the_backend_cookie_name() {
        let dir = tempfile::tempdir().expect("temp dir should create");
        let path = dir.path().join("cookies.txt");
        std::fs::write(
            &path,
            format!("theme=dark\n{BACKEND_COOKIE_NAME}=from-backend; SameSite=Strict\n"),
        )
        .expect("fixture should write");

        let storage = CookieFileStorage::new(path);
        assert_eq!(storage.get().as_deref(), Some("from-backend"));
    }

    #[test]
    fn file_storage_written_line_carries_expected_attributes() {
        let dir = tempfile::tempdir().expect("temp dir should create");
        let path = dir.path().join("cookies.txt");
        let storage = CookieFileStorage::new(path.clone());
        storage.set("tok-2");

        let contents = std::fs::read_to_string(&path).expect("token file should read");
        assert!(contents.starts_with(&format!("{TOKEN_KEY}=tok-2;")), "got {contents}");
        assert!(contents.contains("Max-Age=31536000"), "got {contents}");
        assert!(contents.contains("SameSite=Strict"), "got {contents}");
    }

    #[test]
    fn empty_cookie_value_reads_as_absent() {
        let dir = tempfile::tempdir().expect("temp dir should create");
        let path = dir.path().join("cookies.txt");
        std::fs::write(&path, "parla-token=; Max-Age=0\n").expect("fixture should write");

        let storage = CookieFileStorage::new(path);
        assert_eq!(storage.get(), None);
    }

    #[test]
    fn memory_storage_round_trips() {
        let storage = MemoryTokenStorage::new();
        assert_eq!(storage.get(), None);
        storage.set("tok-3");
        assert_eq!(storage.get().as_deref(), Some("tok-3"));
        storage.clear();
        assert_eq!(storage.get(), None);
    }
}
