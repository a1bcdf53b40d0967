//! Chat front end of the ledger.
//!
//! [`Dispatcher`] turns chat messages into ledger operations and replies. The
//! transports ([`Bot`] for Telegram, [`Console`] for stdin) only move text in
//! and out of it.

use teloxide::prelude::*;

pub use console::{Console, DEFAULT_CONSOLE_SENDER};
pub use dispatcher::{DEFAULT_SESSION_TIMEOUT, Dispatcher, DispatcherBuilder};
pub use parsing::{
    Command, DATE_FORMAT, FlowCommand, ParseError, parse_command, parse_date_range,
    parse_report_choice,
};
pub use state::ReportStep;

mod console;
mod dispatcher;
mod handlers;
mod parsing;
mod state;
mod ui;

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("no ledger configured for the dispatcher")]
    MissingLedger,
    #[error("no dispatcher configured for the bot")]
    MissingDispatcher,
    #[error("telegram token is empty")]
    MissingToken,
    #[error("session timeout must be positive")]
    InvalidSessionTimeout,
    #[error("console io: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone)]
pub struct ConfigParameters {
    allowed_users: Option<Vec<UserId>>,
    dispatcher: Dispatcher,
}

pub struct Bot {
    token: String,
    allowed_users: Option<Vec<UserId>>,
    dispatcher: Dispatcher,
}

impl Bot {
    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    pub async fn run(&self) {
        tracing::info!("Starting telegram bot...");

        let bot = teloxide::Bot::new(&self.token);

        let parameters = ConfigParameters {
            allowed_users: self.allowed_users.clone(),
            dispatcher: self.dispatcher.clone(),
        };

        let handler =
            dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

        teloxide::dispatching::Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![parameters])
            .default_handler(|upd| async move {
                tracing::warn!("Unhandled update: {:?}", upd);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }
}

#[derive(Default)]
pub struct BotBuilder {
    token: String,
    allowed_users: Option<Vec<UserId>>,
    dispatcher: Option<Dispatcher>,
}

impl BotBuilder {
    pub fn token(mut self, token: &str) -> BotBuilder {
        self.token = token.to_string();
        self
    }

    /// Telegram user ids. An empty list lets everyone in.
    pub fn allowed_users(mut self, allowed_users: Vec<u64>) -> BotBuilder {
        if !allowed_users.is_empty() {
            self.allowed_users = Some(allowed_users.into_iter().map(UserId).collect());
        }
        self
    }

    pub fn dispatcher(mut self, dispatcher: Dispatcher) -> BotBuilder {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn build(self) -> Result<Bot, BotError> {
        tracing::info!("Initializing telegram bot...");
        if self.token.trim().is_empty() {
            return Err(BotError::MissingToken);
        }
        Ok(Bot {
            token: self.token,
            allowed_users: self.allowed_users,
            dispatcher: self.dispatcher.ok_or(BotError::MissingDispatcher)?,
        })
    }
}
