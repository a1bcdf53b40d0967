//! Per-sender conversation state.
//!
//! The report flow is a two-step dialogue. [`ReportStep::advance`] is the
//! whole transition table; the dispatcher only stores the resulting step and
//! carries out the effect.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, TimeDelta, Utc};
use engine::DateWindow;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::parsing::{FlowCommand, ParseError, parse_date_range, parse_report_choice};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportStep {
    AwaitingReportChoice,
    AwaitingDateRange,
}

/// Fixed replies the flow can ask the dispatcher to send.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prompt {
    ReportOptions,
    DateRangeFormat,
    InvalidChoice,
    InvalidDateFormat,
    InvertedDateRange,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    Prompt(Prompt),
    /// Run a report over the window, `None` meaning today.
    Report(Option<DateWindow>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    /// `None` ends the flow.
    pub next: Option<ReportStep>,
    pub effect: Effect,
}

impl Transition {
    fn stay(step: ReportStep, prompt: Prompt) -> Self {
        Self {
            next: Some(step),
            effect: Effect::Prompt(prompt),
        }
    }

    fn report(window: Option<DateWindow>) -> Self {
        Self {
            next: None,
            effect: Effect::Report(window),
        }
    }
}

impl ReportStep {
    /// Transition taken on `!report`.
    #[must_use]
    pub fn begin() -> Transition {
        Transition::stay(ReportStep::AwaitingReportChoice, Prompt::ReportOptions)
    }

    /// Feeds one message into the flow.
    #[must_use]
    pub fn advance(self, input: &str) -> Transition {
        match self {
            ReportStep::AwaitingReportChoice => match parse_report_choice(input) {
                Ok(FlowCommand::ReportChoiceToday) => Transition::report(None),
                Ok(FlowCommand::ReportChoiceCustom) => {
                    Transition::stay(ReportStep::AwaitingDateRange, Prompt::DateRangeFormat)
                }
                Ok(FlowCommand::ReportDateRange(_)) | Err(_) => {
                    Transition::stay(self, Prompt::InvalidChoice)
                }
            },
            ReportStep::AwaitingDateRange => match parse_date_range(input) {
                Ok(FlowCommand::ReportDateRange(window)) => Transition::report(Some(window)),
                Err(ParseError::InvertedDateRange) => {
                    Transition::stay(self, Prompt::InvertedDateRange)
                }
                Ok(_) | Err(_) => Transition::stay(self, Prompt::InvalidDateFormat),
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Session {
    pub step: ReportStep,
    /// Last time the sender moved the flow forward or was re-prompted.
    pub touched_at: DateTime<Utc>,
}

impl Session {
    #[must_use]
    pub fn new(step: ReportStep, now: DateTime<Utc>) -> Self {
        Self {
            step,
            touched_at: now,
        }
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>, timeout: TimeDelta) -> bool {
        now - self.touched_at >= timeout
    }
}

/// Exclusive access to one sender's session. Holding it serializes that
/// sender's messages; other senders are not blocked.
pub type SessionSlot = OwnedMutexGuard<Option<Session>>;

/// Sender-keyed sessions. Entries only live while a flow is open or a
/// message for that sender is being handled.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<String, Arc<Mutex<Option<Session>>>>>>,
}

impl SessionStore {
    /// Waits for the sender's slot, creating an empty one if needed.
    pub async fn lock(&self, sender: &str) -> SessionSlot {
        let slot = {
            let mut guard = self.inner.lock().await;
            Arc::clone(guard.entry(sender.to_string()).or_default())
        };
        slot.lock_owned().await
    }

    /// Drops the sender's entry when its flow is over and nobody else is
    /// waiting on it. Call after the slot guard is released.
    pub async fn release(&self, sender: &str) {
        let mut guard = self.inner.lock().await;
        let idle = guard.get(sender).is_some_and(|slot| {
            Arc::strong_count(slot) == 1 && slot.try_lock().is_ok_and(|session| session.is_none())
        });
        if idle {
            guard.remove(sender);
        }
    }

    /// Drops every expired session nobody is holding or waiting on.
    /// Returns how many were removed.
    pub async fn sweep_expired(&self, now: DateTime<Utc>, timeout: TimeDelta) -> usize {
        let mut guard = self.inner.lock().await;
        let before = guard.len();
        guard.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(locked) => (*locked).is_some_and(|session| !session.is_expired(now, timeout)),
                Err(_) => true,
            }
        });
        before - guard.len()
    }

    /// Snapshot of the sender's session, if a flow is open.
    pub async fn get(&self, sender: &str) -> Option<Session> {
        let slot = {
            let guard = self.inner.lock().await;
            guard.get(sender).map(Arc::clone)
        }?;
        let session = slot.lock().await;
        *session
    }

    /// Number of senders with an entry.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}
