// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, bail};
use config::Config;
use parla_api::{
    AuthStore, Client, CookieFileStorage, MOCK_TOKEN, MemoryTokenStorage, Session, TokenStorage,
    sign_in_url,
};
use parla_app::{HubState, TabBinding, TabEnvironment, query_with_tab};
use runtime::ApiRuntime;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

// Placeholder origin for mock mode; every request is answered by the canned
// dispatcher before the transport is consulted.
const MOCK_BASE_URL: &str = "http://localhost:9";

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    init_logging();
    // The local offset lookup fails once the process has threads (and the
    // HTTP client spawns some), so resolve it first.
    parla_app::init_local_offset();

    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `parla --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    if options.print_signin_url {
        println!(
            "{}",
            sign_in_url(config.google_auth_url(), config.redirect_uri()).with_context(|| {
                format!("fill in the [auth] section of {}", options.config_path.display())
            })?
        );
        return Ok(());
    }

    if let Some(token) = &options.login {
        let cookie_path = config.cookie_path()?;
        let session = Session::new(
            Arc::new(CookieFileStorage::new(cookie_path.clone())),
            AuthStore::new(),
        );
        session.login(token);
        println!("token stored at {}", cookie_path.display());
        return Ok(());
    }

    if options.logout {
        let session = Session::new(
            Arc::new(CookieFileStorage::new(config.cookie_path()?)),
            AuthStore::new(),
        );
        session.logout();
        println!("signed out");
        return Ok(());
    }

    let mock = options.mock || config.mock();
    let storage: Arc<dyn TokenStorage> = if mock {
        Arc::new(MemoryTokenStorage::with_token(MOCK_TOKEN))
    } else {
        Arc::new(CookieFileStorage::new(config.cookie_path()?))
    };

    let base_url = if mock {
        config
            .api
            .base_url
            .clone()
            .unwrap_or_else(|| MOCK_BASE_URL.to_owned())
    } else {
        config.api_base_url()?.to_owned()
    };

    let client = Client::new(
        &base_url,
        config.api_timeout()?,
        storage,
        AuthStore::new(),
        mock,
    )
    .with_context(|| format!("invalid [api] config in {}", options.config_path.display()))?;
    if options.check_only {
        return Ok(());
    }

    let session = client.session();
    if !session.hydrate() {
        bail!(
            "no session token -- run `parla --print-signin-url`, complete the flow in a browser, then `parla --login <token>` (or use --mock)"
        );
    }
    if session.verify(&client).is_none() {
        bail!(
            "session rejected by {} -- sign in again with `parla --login <token>`, or check api.base_url",
            client.base_url()
        );
    }

    let mut env = FileTabEnvironment::new(config.session_query_path()?);
    if env.read_query().is_empty() {
        env.write_query(&query_with_tab("", config.default_tab()?));
    }
    let mut binding = TabBinding::new(env);

    let mut state = HubState::default();
    let mut runtime = ApiRuntime::new(client);
    parla_tui::run_app(&mut state, &mut runtime, &mut binding)
}

fn init_logging() {
    if env::var_os("PARLA_LOG").is_some() {
        env_logger::Builder::from_env(env_logger::Env::new().filter("PARLA_LOG")).init();
    }
}

/// Persists the hub's query string between runs, standing in for the
/// browser URL of the web original. Unreadable state degrades to empty.
struct FileTabEnvironment {
    path: PathBuf,
}

impl FileTabEnvironment {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TabEnvironment for FileTabEnvironment {
    fn read_query(&mut self) -> String {
        match fs::read_to_string(&self.path) {
            Ok(raw) => raw.trim().to_owned(),
            Err(_) => String::new(),
        }
    }

    fn write_query(&mut self, query: &str) {
        if let Some(parent) = self.path.parent()
            && let Err(error) = fs::create_dir_all(parent)
        {
            log::warn!("create session directory {}: {error}", parent.display());
            return;
        }
        if let Err(error) = fs::write(&self.path, query) {
            log::warn!("write session query {}: {error}", self.path.display());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    print_signin_url: bool,
    mock: bool,
    login: Option<String>,
    logout: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        print_signin_url: false,
        mock: false,
        login: None,
        logout: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--print-signin-url" => {
                options.print_signin_url = true;
            }
            "--mock" => {
                options.mock = true;
            }
            "--login" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--login requires a token"))?;
                options.login = Some(value.as_ref().to_owned());
            }
            "--logout" => {
                options.logout = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("parla");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --print-signin-url       Print the Google sign-in URL");
    println!("  --login <token>          Store a session token and exit");
    println!("  --logout                 Clear the stored session token");
    println!("  --mock                   Launch against the built-in mock backend");
    println!("  --check                  Validate config + client construction");
    println!("  --help                   Show this help");
}
