//! `AppScout` command-line front end
//!
//! Usage:
//!   appscout detect [--threshold <T>] [--no-delay]
//!   appscout apps [--against <NAMES>] [--threshold <T>]
//!   appscout login <PHONE> <PASSWORD>
//!   appscout signup <FULL_NAME> <EMAIL> <PHONE> <PASSWORD>
//!   appscout logout
//!   appscout background
//!   appscout status
//!
//! `APPSCOUT_HOME` overrides the data directory (config.json, storage.json,
//! app.log) and `RUST_LOG` the log filter.

use anyhow::{Context, Result, bail};
use appscout::api::{HttpRemoteService, RegisterRequest, RemoteService};
use appscout::config::{AppConfig, ConfigManager};
use appscout::controller::{
    Collaborators, Dashboard, LifecycleEvent, Notice, NoticeLevel, Notifier, TracingNotifier,
};
use appscout::device::{DeviceInfoProvider, HostDeviceInfo};
use appscout::error::get_user_friendly_error;
use appscout::matcher::{MatchOptions, SimilarityMatcher};
use appscout::platform::{SimilarAppEvents, enumerate_or_empty, enumerator_for};
use appscout::session::{self, SessionContext};
use appscout::storage::{FileStore, KeyValueStore};
use appscout::utils;
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::{Arc, mpsc};
use tracing::{error, info};

/// AppScout - find installed apps that resemble a watch list
#[derive(Parser, Debug)]
#[command(name = "appscout", version)]
#[command(about = "Find installed apps that resemble a watch list and report them")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the detection pass and report matches
    Detect {
        /// Match threshold, 0.0 (exact) to 1.0 (anything)
        #[arg(long)]
        threshold: Option<f64>,

        /// Report immediately after the notice
        #[arg(long)]
        no_delay: bool,
    },

    /// List installed apps
    Apps {
        /// Comma-separated names to match against, offline
        #[arg(long, value_delimiter = ',')]
        against: Option<Vec<String>>,

        /// Match threshold for --against
        #[arg(long, requires = "against")]
        threshold: Option<f64>,
    },

    /// Log in and store the session token
    Login { phone: String, password: String },

    /// Create an account
    Signup {
        full_name: String,
        email: String,
        phone: String,
        password: String,
    },

    /// Forget the session token
    Logout,

    /// Record that the app left the foreground
    Background,

    /// Show session, device and configuration
    Status,
}

impl Command {
    /// Subcommand name for log lines; arguments may hold credentials
    fn name(&self) -> &'static str {
        match self {
            Self::Detect { .. } => "detect",
            Self::Apps { .. } => "apps",
            Self::Login { .. } => "login",
            Self::Signup { .. } => "signup",
            Self::Logout => "logout",
            Self::Background => "background",
            Self::Status => "status",
        }
    }
}

/// Prints notices to the terminal and logs them
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        let tag = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        println!("[{tag}] {}: {}", notice.title, notice.message);
        TracingNotifier.notify(notice);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = ConfigManager::ensure_data_dir().context("Failed to create data directory")?;
    utils::init_logging(&data_dir).context("Failed to initialize logging system")?;

    let config = load_config()?;
    let store: Arc<dyn KeyValueStore> =
        Arc::new(FileStore::open(&data_dir).context("Failed to open local storage")?);

    let result = match &cli.command {
        Command::Detect {
            threshold,
            no_delay,
        } => run_detect(*threshold, *no_delay, config, store),
        Command::Apps { against, threshold } => run_apps(against.as_deref(), *threshold, &config),
        Command::Login { phone, password } => run_login(phone, password, &config, store.as_ref()),
        Command::Signup {
            full_name,
            email,
            phone,
            password,
        } => {
            let request = RegisterRequest {
                full_name: full_name.clone(),
                email: email.clone(),
                phone_number: phone.clone(),
                password: password.clone(),
            };
            run_signup(&request, &config)
        }
        Command::Logout => run_logout(store.as_ref()),
        Command::Background => run_background(store.as_ref()),
        Command::Status => run_status(&data_dir, &config, store),
    };

    if let Err(e) = &result {
        error!("Command '{}' failed: {:#}", cli.command.name(), e);
    }
    result
}

/// Load the configuration, writing the defaults on first run so they can be edited
fn load_config() -> Result<AppConfig> {
    let config = ConfigManager::load().context("Failed to load application configuration")?;
    if !ConfigManager::get_config_path().exists() {
        ConfigManager::save(&config).context("Failed to write default configuration")?;
        info!(
            "Default configuration written to {}",
            ConfigManager::get_config_path().display()
        );
    }
    Ok(config)
}

fn http_service(config: &AppConfig) -> Result<HttpRemoteService> {
    HttpRemoteService::new(config.api.clone()).context("Failed to create HTTP client")
}

fn run_detect(
    threshold: Option<f64>,
    no_delay: bool,
    mut config: AppConfig,
    store: Arc<dyn KeyValueStore>,
) -> Result<()> {
    if let Some(threshold) = threshold {
        config.detection.threshold = threshold;
        config.sanitize();
    }
    if no_delay {
        config.detection.report_delay_ms = 0;
    }

    let collaborators = Collaborators {
        store: Arc::clone(&store),
        enumerator: enumerator_for(&config),
        remote: Arc::new(http_service(&config)?),
        device: Box::new(HostDeviceInfo::new(store)),
        notifier: Arc::new(ConsoleNotifier),
        events: SimilarAppEvents::new(),
    };
    let dashboard = Dashboard::new(&config.detection, collaborators);

    let (sender, receiver) = mpsc::channel();
    let handle = dashboard.spawn_event_loop(receiver);
    sender.send(LifecycleEvent::Mount)?;
    sender.send(LifecycleEvent::Unmount)?;
    drop(sender);

    if handle.join().is_err() {
        bail!("Dashboard event loop panicked");
    }
    Ok(())
}

fn run_apps(against: Option<&[String]>, threshold: Option<f64>, config: &AppConfig) -> Result<()> {
    let installed = enumerate_or_empty(enumerator_for(config).as_ref());

    let Some(against) = against else {
        for name in &installed {
            println!("{name}");
        }
        println!("{} installed app(s)", installed.len());
        return Ok(());
    };

    let reference: Vec<&str> = against.iter().map(|name| name.trim()).collect();
    let options = MatchOptions {
        threshold: threshold.unwrap_or(config.detection.threshold),
        ..MatchOptions::from(&config.detection)
    };
    let matcher = SimilarityMatcher::new(reference, options);

    for name in &installed {
        if let Some(score) = matcher.best_score(name) {
            println!("{score:.3}  {name}");
        }
    }
    Ok(())
}

fn run_login(
    phone_number: &str,
    password: &str,
    config: &AppConfig,
    store: &dyn KeyValueStore,
) -> Result<()> {
    match http_service(config)?.login(phone_number, password) {
        Ok(outcome) => {
            session::store_login(store, &outcome.token, outcome.user_id.as_deref())
                .context("Failed to store session token")?;
            println!("{}", outcome.message.as_deref().unwrap_or("Logged in"));
            Ok(())
        }
        Err(e) => {
            println!("Invalid credentials: {}", get_user_friendly_error(&e));
            Err(e).context("Login failed")
        }
    }
}

fn run_signup(request: &RegisterRequest, config: &AppConfig) -> Result<()> {
    match http_service(config)?.register(request) {
        Ok(message) => {
            println!("{message}");
            Ok(())
        }
        Err(e) => {
            println!("{}", get_user_friendly_error(&e));
            Err(e).context("Registration failed")
        }
    }
}

fn run_logout(store: &dyn KeyValueStore) -> Result<()> {
    session::logout(store).context("Failed to log out")?;
    println!("Logout Successfully");
    Ok(())
}

fn run_background(store: &dyn KeyValueStore) -> Result<()> {
    let stamp = session::record_background(store, Utc::now())
        .context("Failed to save last close date")?;
    println!("Last close date saved: {stamp}");
    Ok(())
}

fn run_status(data_dir: &Path, config: &AppConfig, store: Arc<dyn KeyValueStore>) -> Result<()> {
    println!("Data directory:  {}", data_dir.display());
    println!("API base URL:    {}", config.api.base_url);
    println!("Threshold:       {}", config.detection.threshold);
    println!("Enumerator:      {:?}", config.enumerator);

    match SessionContext::load(store.as_ref()) {
        Ok(session) => {
            println!("Logged in:       yes");
            println!(
                "User id:         {}",
                session.user_id.as_deref().unwrap_or("(none)")
            );
            println!(
                "Last close date: {}",
                session
                    .last_backgrounded_at_string()
                    .as_deref()
                    .unwrap_or("(never)")
            );
        }
        Err(e) => println!("Logged in:       no ({e})"),
    }

    let identity = HostDeviceInfo::new(store)
        .identity()
        .context("Failed to read device identity")?;
    println!("Device id:       {}", identity.device_id);
    println!("Device name:     {}", identity.device_name);
    println!("Device model:    {}", identity.device_model);
    println!("Device OS:       {}", identity.device_os);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_detect_flags() {
        let cli = Cli::try_parse_from(["appscout", "detect", "--threshold", "0.25", "--no-delay"]).unwrap();
        match cli.command {
            Command::Detect {
                threshold,
                no_delay,
            } => {
                assert_eq!(threshold, Some(0.25));
                assert!(no_delay);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["appscout", "detect"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Detect {
                threshold: None,
                no_delay: false
            }
        ));
    }

    #[test]
    fn test_apps_against_splits_on_commas() {
        let cli = Cli::try_parse_from(["appscout", "apps", "--against", "whatsapp,telegram", "--threshold", "0.2"])
            .unwrap();
        match cli.command {
            Command::Apps { against, threshold } => {
                assert_eq!(
                    against,
                    Some(vec!["whatsapp".to_string(), "telegram".to_string()])
                );
                assert_eq!(threshold, Some(0.2));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["appscout", "detect", "--threshold", "high"]).is_err());
        assert!(Cli::try_parse_from(["appscout", "detect", "--threshold"]).is_err());
        assert!(Cli::try_parse_from(["appscout", "apps", "--threshold", "0.2"]).is_err());
        assert!(Cli::try_parse_from(["appscout", "login", "5550100"]).is_err());
        assert!(Cli::try_parse_from(["appscout", "frobnicate"]).is_err());
        assert!(Cli::try_parse_from(["appscout"]).is_err());
    }

    #[test]
    fn test_signup_positionals() {
        let cli = Cli::try_parse_from(["appscout", "signup", "Ada Lovelace", "ada@example.com", "5550100", "pw"])
            .unwrap();
        match cli.command {
            Command::Signup {
                full_name,
                email,
                phone,
                password,
            } => {
                assert_eq!(full_name, "Ada Lovelace");
                assert_eq!(email, "ada@example.com");
                assert_eq!(phone, "5550100");
                assert_eq!(password, "pw");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
