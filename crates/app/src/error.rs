use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("invalid setting: {0}")]
    InvalidSetting(String),
    #[error("no transport configured, add a [telegram] or [console] section")]
    NoTransport,
    #[error("ledger error: {0}")]
    Ledger(#[from] engine::LedgerError),
    #[error("bot error: {0}")]
    Bot(#[from] chat_bot::BotError),
}
