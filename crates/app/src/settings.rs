//! Settings for the application, read from `settings.toml` and `CATAT_*`
//! environment variables (`CATAT_APP__LEVEL=debug`).
//!
//! ```toml
//! [app]
//! level = "info"
//! timezone = "Asia/Jakarta"
//! session_timeout_minutes = 10
//!
//! [store]
//! sqlite = "catat.db"
//!
//! [telegram]
//! token = "..."
//! allowed_users = []
//!
//! [console]
//! sender = "console"
//! ```

use chrono::TimeDelta;
use chrono_tz::Tz;
use clap::Parser;
use serde::Deserialize;

use crate::error::{AppError, Result};

const DEFAULT_CONFIG_PATH: &str = "settings.toml";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
    pub timezone: String,
    pub session_timeout_minutes: u32,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            timezone: engine::DEFAULT_TIMEZONE.name().to_string(),
            session_timeout_minutes: 10,
        }
    }
}

impl App {
    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| AppError::InvalidSetting(format!("unknown timezone {}", self.timezone)))
    }

    pub fn session_timeout(&self) -> Result<TimeDelta> {
        TimeDelta::try_minutes(i64::from(self.session_timeout_minutes))
            .filter(|timeout| *timeout > TimeDelta::zero())
            .ok_or_else(|| {
                AppError::InvalidSetting(format!(
                    "session_timeout_minutes must be positive, got {}",
                    self.session_timeout_minutes
                ))
            })
    }
}

/// Where the ledger lives.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Store {
    #[default]
    Memory,
    Csv(String),
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Telegram {
    pub token: String,
    #[serde(default)]
    pub allowed_users: Vec<u64>,
}

#[derive(Debug, Deserialize)]
pub struct Console {
    #[serde(default = "default_console_sender")]
    pub sender: String,
}

fn default_console_sender() -> String {
    chat_bot::DEFAULT_CONSOLE_SENDER.to_string()
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub store: Store,
    pub telegram: Option<Telegram>,
    pub console: Option<Console>,
}

#[derive(Debug, Parser)]
#[command(name = "catat", version, about = "Chat-driven income and expense ledger")]
struct Args {
    /// Config file path (TOML).
    #[arg(long, env = "CATAT_CONFIG")]
    config: Option<String>,
    /// Override the log level.
    #[arg(long)]
    level: Option<String>,
}

impl Settings {
    pub fn new() -> Result<Self> {
        let args = Args::parse();
        let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);

        let mut settings = Self::from_sources(
            config::Config::builder()
                .add_source(config::File::with_name(config_path).required(false))
                .add_source(
                    config::Environment::with_prefix("CATAT")
                        .prefix_separator("_")
                        .separator("__"),
                ),
        )?;

        if let Some(level) = args.level {
            settings.app.level = level;
        }
        Ok(settings)
    }

    fn from_sources(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        if settings.telegram.is_none() && settings.console.is_none() {
            return Err(AppError::NoTransport);
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Result<Settings> {
        Settings::from_sources(
            config::Config::builder()
                .add_source(config::File::from_str(toml, config::FileFormat::Toml)),
        )
    }

    #[test]
    fn defaults_fill_missing_sections() {
        let settings = parse("[telegram]\ntoken = \"123:abc\"").unwrap();
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.app.timezone().unwrap(), chrono_tz::Asia::Jakarta);
        assert_eq!(settings.app.session_timeout().unwrap(), TimeDelta::minutes(10));
        assert!(matches!(settings.store, Store::Memory));
        assert!(settings.telegram.unwrap().allowed_users.is_empty());
        assert!(settings.console.is_none());
    }

    #[test]
    fn full_file() {
        let settings = parse(
            r#"
            [app]
            level = "debug"
            timezone = "Asia/Makassar"
            session_timeout_minutes = 5

            [store]
            sqlite = "data/catat.db"

            [telegram]
            token = "123:abc"
            allowed_users = [42, 7]
            "#,
        )
        .unwrap();
        assert_eq!(settings.app.timezone().unwrap(), chrono_tz::Asia::Makassar);
        assert_eq!(settings.app.session_timeout().unwrap(), TimeDelta::minutes(5));
        assert!(matches!(settings.store, Store::Sqlite(ref path) if path == "data/catat.db"));
        let telegram = settings.telegram.unwrap();
        assert_eq!(telegram.allowed_users, vec![42, 7]);
    }

    #[test]
    fn store_can_be_a_plain_string() {
        let settings = parse("store = \"memory\"\n[console]\nsender = \"me\"").unwrap();
        assert!(matches!(settings.store, Store::Memory));
        assert_eq!(settings.console.unwrap().sender, "me");

        let settings = parse("[store]\ncsv = \"ledger.csv\"\n[console]\nsender = \"me\"").unwrap();
        assert!(matches!(settings.store, Store::Csv(ref path) if path == "ledger.csv"));
    }

    #[test]
    fn a_transport_is_required() {
        assert!(matches!(parse("[app]\nlevel = \"warn\""), Err(AppError::NoTransport)));
    }

    #[test]
    fn rejects_bad_values() {
        let settings = parse(
            "[app]\ntimezone = \"Mars/Base\"\nsession_timeout_minutes = 0\n[console]\nsender = \"me\"",
        )
        .unwrap();
        assert!(settings.app.timezone().is_err());
        assert!(settings.app.session_timeout().is_err());
    }
}
