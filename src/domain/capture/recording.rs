//! Recording state machine

use std::fmt;
use thiserror::Error;

/// Recording lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordingState {
    #[default]
    Idle,
    Starting,
    Active,
    Finalizing,
}

impl RecordingState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Active => "recording",
            Self::Finalizing => "finalizing",
        }
    }
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid recording transition: cannot {action} while {current_state}")]
pub struct InvalidRecordingTransition {
    pub current_state: RecordingState,
    pub action: String,
}

/// Recording session entity.
///
/// State machine:
///   IDLE -> STARTING (begin_start)
///   STARTING -> ACTIVE (acknowledge_start)
///   ACTIVE -> FINALIZING (begin_finalize)
///   STARTING | ACTIVE | FINALIZING -> IDLE (finish)
///
/// A finalize error never returns to ACTIVE; the recording is over and
/// `failure` records why.
#[derive(Debug, Default)]
pub struct RecordingSession {
    state: RecordingState,
    failure: Option<String>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == RecordingState::Idle
    }

    /// Failure recorded for the current recording, if any
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Transition from IDLE to STARTING
    pub fn begin_start(&mut self) -> Result<(), InvalidRecordingTransition> {
        self.require(RecordingState::Idle, "start recording")?;
        self.failure = None;
        self.state = RecordingState::Starting;
        Ok(())
    }

    /// Transition from STARTING to ACTIVE on hardware acknowledgment
    pub fn acknowledge_start(&mut self) -> Result<(), InvalidRecordingTransition> {
        self.require(RecordingState::Starting, "acknowledge start")?;
        self.state = RecordingState::Active;
        Ok(())
    }

    /// Transition from ACTIVE to FINALIZING (user stop or hardware error)
    pub fn begin_finalize(
        &mut self,
        failure: Option<String>,
    ) -> Result<(), InvalidRecordingTransition> {
        self.require(RecordingState::Active, "stop recording")?;
        self.failure = failure;
        self.state = RecordingState::Finalizing;
        Ok(())
    }

    /// Return to IDLE once the encoder closed the file.
    /// Returns the failure recorded for this recording, combining a
    /// previously signaled error with the finalize error.
    pub fn finish(
        &mut self,
        error: Option<String>,
    ) -> Result<Option<String>, InvalidRecordingTransition> {
        if self.state == RecordingState::Idle {
            return Err(InvalidRecordingTransition {
                current_state: self.state,
                action: "finalize recording".to_string(),
            });
        }
        self.state = RecordingState::Idle;
        Ok(error.or_else(|| self.failure.take()))
    }

    fn require(
        &self,
        state: RecordingState,
        action: &str,
    ) -> Result<(), InvalidRecordingTransition> {
        if self.state != state {
            return Err(InvalidRecordingTransition {
                current_state: self.state,
                action: action.to_string(),
            });
        }
        Ok(())
    }
}
