//! User commands and their dispatch through the reconciliation path.

use tracing::debug;

use crate::backend::HidBackend;
use crate::dump::{ReportDump, dump_reports};
use crate::error::Result;
use crate::observer::Origin;
use crate::session::Session;
use crate::state::CallState;
use crate::usage::ReportType;

/// A discrete user command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Flip the off-hook state
    ToggleHook,
    /// Flip the mute state
    ToggleMute,
    /// Flip ring indicator and ringer tone together
    ToggleRinger,
    /// Dump every report, field and usage of the device
    DumpReports,
    /// Stop the session
    Quit,
    /// List the commands
    Help,
}

impl Command {
    /// Every command, in help order.
    pub const ALL: [Self; 6] = [
        Self::ToggleHook,
        Self::ToggleMute,
        Self::ToggleRinger,
        Self::DumpReports,
        Self::Quit,
        Self::Help,
    ];

    /// Map a console key to a command.
    #[must_use]
    pub fn from_key(key: char) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    #[must_use]
    pub fn key(self) -> char {
        match self {
            Self::ToggleHook => 'o',
            Self::ToggleMute => 'm',
            Self::ToggleRinger => 'r',
            Self::DumpReports => 'd',
            Self::Quit => 'q',
            Self::Help => '?',
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::ToggleHook => "offhook toggle",
            Self::ToggleMute => "mute toggle",
            Self::ToggleRinger => "ringer toggle",
            Self::DumpReports => "dump reports",
            Self::Quit => "quit",
            Self::Help => "this help",
        }
    }
}

/// Result of a dispatched command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A toggle went through; the state after it.
    Applied(CallState),
    /// Shutdown has been requested.
    ShuttingDown,
    /// The caller should list [`Command::ALL`].
    Help,
    /// Reports per type, in [`ReportType::ALL`] order.
    Reports(Vec<(ReportType, Vec<ReportDump>)>),
}

impl<D: HidBackend> Session<D> {
    /// Execute a user command.
    ///
    /// Toggles take the call-state lock for their whole duration and always
    /// flip the stored value, unlike hardware events which only act on change.
    ///
    /// # Errors
    /// Propagates the first failed device write or report query.
    pub fn dispatch(&self, command: Command) -> Result<Outcome> {
        debug!(?command, "Dispatching command");

        match command {
            Command::ToggleHook => {
                let mut state = self.store().lock();
                let off_hook = !state.hook;
                self.apply_hook(&mut state, off_hook, Origin::User)?;
                Ok(Outcome::Applied(*state))
            }
            Command::ToggleMute => {
                let mut state = self.store().lock();
                self.toggle_mute(&mut state, Origin::User)?;
                Ok(Outcome::Applied(*state))
            }
            Command::ToggleRinger => {
                let mut state = self.store().lock();
                self.toggle_ringer(&mut state, Origin::User)?;
                Ok(Outcome::Applied(*state))
            }
            Command::DumpReports => {
                let reports = ReportType::ALL
                    .into_iter()
                    .map(|report_type| Ok((report_type, dump_reports(self.device(), report_type)?)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Outcome::Reports(reports))
            }
            Command::Quit => {
                self.request_shutdown();
                Ok(Outcome::ShuttingDown)
            }
            Command::Help => Ok(Outcome::Help),
        }
    }
}
