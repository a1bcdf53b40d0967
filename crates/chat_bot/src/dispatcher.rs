//! Transport-independent message handling.
//!
//! Every inbound message goes through [`Dispatcher::handle`], whatever chat
//! service delivered it. The reply, if any, is handed back to the transport.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use engine::{Amount, Clock, DateWindow, Ledger, LedgerError, TransactionKind};

use crate::{
    BotError,
    parsing::{Command, ParseError, parse_command},
    state::{Effect, ReportStep, Session, SessionStore, Transition},
    ui,
};

/// Idle time after which an open report flow is forgotten.
pub const DEFAULT_SESSION_TIMEOUT: TimeDelta = TimeDelta::minutes(10);

#[derive(Clone)]
pub struct Dispatcher {
    ledger: Arc<Ledger>,
    clock: Arc<dyn Clock>,
    sessions: SessionStore,
    session_timeout: TimeDelta,
}

impl Dispatcher {
    /// Return a builder for `Dispatcher`.
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// Handles one message from `sender` and returns the reply to send.
    ///
    /// Messages from the same sender are handled one at a time, in arrival
    /// order. `None` means the message is ignored.
    pub async fn handle(&self, sender: &str, text: &str) -> Option<String> {
        let mut slot = self.sessions.lock(sender).await;
        let now = self.clock.now();

        if let Some(session) = *slot
            && session.is_expired(now, self.session_timeout)
        {
            tracing::info!("report flow for {sender} expired in {:?}", session.step);
            *slot = None;
        }

        let current = *slot;
        let reply = match current {
            Some(session) => {
                let transition = session.step.advance(text);
                Some(self.apply(sender, &mut slot, transition, now).await)
            }
            None => self.handle_command(sender, &mut slot, text, now).await,
        };

        drop(slot);
        self.sessions.release(sender).await;

        let swept = self.sessions.sweep_expired(now, self.session_timeout).await;
        if swept > 0 {
            tracing::info!("dropped {swept} idle report flows");
        }
        reply
    }

    /// Current step of the sender's report flow, if one is open.
    pub async fn session(&self, sender: &str) -> Option<ReportStep> {
        self.sessions.get(sender).await.map(|session| session.step)
    }

    /// Number of senders currently holding session state.
    pub async fn active_sessions(&self) -> usize {
        self.sessions.len().await
    }

    async fn handle_command(
        &self,
        sender: &str,
        slot: &mut Option<Session>,
        text: &str,
        now: DateTime<Utc>,
    ) -> Option<String> {
        match parse_command(text) {
            Ok(Command::RecordTransaction {
                kind,
                amount,
                description,
            }) => Some(self.record(sender, kind, amount, &description).await),
            Ok(Command::RequestReport) => {
                Some(self.apply(sender, slot, ReportStep::begin(), now).await)
            }
            Ok(Command::Help) => Some(ui::help_text().to_string()),
            Ok(Command::Unrecognized { raw }) => {
                tracing::debug!("ignoring message from {sender}: {raw:?}");
                None
            }
            Err(err) => {
                tracing::debug!("rejected command from {sender}: {err}");
                Some(ui::parse_error_hint(err))
            }
        }
    }

    /// Stores the next step and carries out the effect of `transition`.
    async fn apply(
        &self,
        sender: &str,
        slot: &mut Option<Session>,
        transition: Transition,
        now: DateTime<Utc>,
    ) -> String {
        *slot = transition.next.map(|step| Session::new(step, now));

        match transition.effect {
            Effect::Prompt(prompt) => ui::prompt_text(prompt),
            Effect::Report(window) => match self.report(window).await {
                Ok(text) => text,
                Err(err) => {
                    tracing::error!("report for {sender} failed: {err}");
                    *slot = None;
                    ui::REPORT_FAILED.to_string()
                }
            },
        }
    }

    async fn record(
        &self,
        sender: &str,
        kind: TransactionKind,
        amount: Amount,
        description: &str,
    ) -> String {
        match self.ledger.append(kind, amount, description).await {
            Ok(record) => ui::render_recorded(&record),
            Err(LedgerError::MissingDescription) => {
                ui::parse_error_hint(ParseError::MissingDescription)
            }
            Err(LedgerError::InvalidAmount(_)) => ui::parse_error_hint(ParseError::InvalidAmount),
            Err(err) => {
                tracing::error!("recording {} for {sender} failed: {err}", kind.as_str());
                ui::RECORD_FAILED.to_string()
            }
        }
    }

    async fn report(&self, window: Option<DateWindow>) -> Result<String, LedgerError> {
        let summary = self.ledger.query(window).await?;
        Ok(ui::render_report(window.as_ref(), &summary))
    }
}

/// The builder for `Dispatcher`
pub struct DispatcherBuilder {
    ledger: Option<Arc<Ledger>>,
    session_timeout: TimeDelta,
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self {
            ledger: None,
            session_timeout: DEFAULT_SESSION_TIMEOUT,
        }
    }
}

impl DispatcherBuilder {
    /// Pass the required ledger. Its clock also drives session expiry.
    pub fn ledger(mut self, ledger: Arc<Ledger>) -> DispatcherBuilder {
        self.ledger = Some(ledger);
        self
    }

    pub fn session_timeout(mut self, timeout: TimeDelta) -> DispatcherBuilder {
        self.session_timeout = timeout;
        self
    }

    /// Construct `Dispatcher`
    pub fn build(self) -> Result<Dispatcher, BotError> {
        let ledger = self.ledger.ok_or(BotError::MissingLedger)?;
        if self.session_timeout <= TimeDelta::zero() {
            return Err(BotError::InvalidSessionTimeout);
        }
        Ok(Dispatcher {
            clock: ledger.clock(),
            ledger,
            sessions: SessionStore::default(),
            session_timeout: self.session_timeout,
        })
    }
}
