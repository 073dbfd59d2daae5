//! Camera session state machine

use std::fmt;
use thiserror::Error;

use super::settings::{CaptureMode, CaptureSettings, FlashMode, LensFacing, ZoomRange};

/// Camera session phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionPhase {
    #[default]
    Unbound,
    Binding,
    Bound,
    Error,
}

impl SessionPhase {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unbound => "unbound",
            Self::Binding => "binding",
            Self::Bound => "bound",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid session transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid session transition: cannot {action} while {current_phase}")]
pub struct InvalidSessionTransition {
    pub current_phase: SessionPhase,
    pub action: String,
}

/// Camera session entity.
/// Tracks the bind lifecycle and the settings it realizes on hardware.
///
/// State machine:
///   UNBOUND | BOUND | ERROR -> BINDING (begin_bind)
///   BINDING -> BOUND (complete_bind)
///   BINDING -> ERROR (fail_bind)
///   any -> UNBOUND (release)
///
/// Settings requested by `begin_bind` are recorded immediately and stay
/// recorded (but unrealized) if the bind fails.
#[derive(Debug, Default)]
pub struct CameraSession {
    phase: SessionPhase,
    settings: CaptureSettings,
    generation: u64,
    last_error: Option<String>,
}

impl CameraSession {
    /// Create an unbound session with the given initial settings
    pub fn new(settings: CaptureSettings) -> Self {
        Self {
            phase: SessionPhase::Unbound,
            settings,
            generation: 0,
            last_error: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    /// Number of successful binds so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Reason of the last failed bind, cleared on success
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_bound(&self) -> bool {
        self.phase == SessionPhase::Bound
    }

    /// Transition to BINDING, recording the requested lens and mode
    pub fn begin_bind(
        &mut self,
        lens: LensFacing,
        mode: CaptureMode,
    ) -> Result<(), InvalidSessionTransition> {
        if self.phase == SessionPhase::Binding {
            return Err(InvalidSessionTransition {
                current_phase: self.phase,
                action: "bind".to_string(),
            });
        }
        self.settings.set_lens(lens);
        self.settings.set_mode(mode);
        self.phase = SessionPhase::Binding;
        Ok(())
    }

    /// Transition from BINDING to BOUND with the device-reported zoom range.
    /// Zoom resets to the default ratio clamped into the new range.
    pub fn complete_bind(&mut self, range: ZoomRange) -> Result<u64, InvalidSessionTransition> {
        self.require(SessionPhase::Binding, "complete bind")?;
        self.settings.reset_zoom(range);
        self.generation += 1;
        self.last_error = None;
        self.phase = SessionPhase::Bound;
        Ok(self.generation)
    }

    /// Transition from BINDING to ERROR
    pub fn fail_bind(&mut self, reason: impl Into<String>) -> Result<(), InvalidSessionTransition> {
        self.require(SessionPhase::Binding, "fail bind")?;
        self.last_error = Some(reason.into());
        self.phase = SessionPhase::Error;
        Ok(())
    }

    /// Drop any pipeline and return to UNBOUND
    pub fn release(&mut self) {
        self.phase = SessionPhase::Unbound;
    }

    /// Settings of the bound pipeline, or an error naming the action
    pub fn require_bound(&self, action: &str) -> Result<&CaptureSettings, InvalidSessionTransition> {
        self.require(SessionPhase::Bound, action)?;
        Ok(&self.settings)
    }

    /// Record a zoom ratio applied to the bound pipeline; returns the
    /// clamped value.
    pub fn commit_zoom(&mut self, ratio: f32) -> Result<f32, InvalidSessionTransition> {
        self.require(SessionPhase::Bound, "set zoom")?;
        Ok(self.settings.set_zoom(ratio))
    }

    /// Record a flash mode applied to the bound pipeline
    pub fn commit_flash(&mut self, flash: FlashMode) -> Result<(), InvalidSessionTransition> {
        self.require(SessionPhase::Bound, "set flash")?;
        self.settings.set_flash(flash);
        Ok(())
    }

    fn require(&self, phase: SessionPhase, action: &str) -> Result<(), InvalidSessionTransition> {
        if self.phase != phase {
            return Err(InvalidSessionTransition {
                current_phase: self.phase,
                action: action.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bound_session() -> CameraSession {
        let mut session = CameraSession::default();
        session.begin_bind(LensFacing::Back, CaptureMode::Photo).unwrap();
        session.complete_bind(ZoomRange::new(1.0, 8.0)).unwrap();
        session
    }

    #[test]
    fn new_session_is_unbound() {
        let session = CameraSession::default();
        assert_eq!(session.phase(), SessionPhase::Unbound);
        assert_eq!(session.generation(), 0);
    }

    #[test]
    fn bind_cycle() {
        let session = bound_session();
        assert!(session.is_bound());
        assert_eq!(session.generation(), 1);
        assert_eq!(session.settings().zoom_ratio(), 1.0);
    }

    #[test]
    fn bind_while_binding_fails() {
        let mut session = CameraSession::default();
        session.begin_bind(LensFacing::Back, CaptureMode::Photo).unwrap();

        let err = session
            .begin_bind(LensFacing::Front, CaptureMode::Photo)
            .unwrap_err();
        assert_eq!(err.current_phase, SessionPhase::Binding);
    }

    #[test]
    fn failed_bind_keeps_requested_settings_and_is_retryable() {
        let mut session = bound_session();
        session.begin_bind(LensFacing::Front, CaptureMode::Video).unwrap();
        session.fail_bind("device busy").unwrap();

        assert_eq!(session.phase(), SessionPhase::Error);
        assert_eq!(session.settings().lens(), LensFacing::Front);
        assert_eq!(session.settings().mode(), CaptureMode::Video);
        assert_eq!(session.last_error(), Some("device busy"));

        session.begin_bind(LensFacing::Front, CaptureMode::Video).unwrap();
        session.complete_bind(ZoomRange::fixed()).unwrap();
        assert!(session.is_bound());
        assert!(session.last_error().is_none());
    }

    #[test]
    fn complete_bind_outside_binding_fails() {
        let mut session = CameraSession::default();
        assert!(session.complete_bind(ZoomRange::fixed()).is_err());
        assert!(session.fail_bind("x").is_err());
    }

    #[test]
    fn rebind_resets_zoom() {
        let mut session = bound_session();
        session.commit_zoom(4.0).unwrap();
        assert_eq!(session.settings().zoom_ratio(), 4.0);

        session.begin_bind(LensFacing::Front, CaptureMode::Photo).unwrap();
        session.complete_bind(ZoomRange::new(1.0, 2.0)).unwrap();
        assert_eq!(session.settings().zoom_ratio(), 1.0);
    }

    #[test]
    fn controls_require_bound_pipeline() {
        let mut session = CameraSession::default();
        assert!(session.commit_zoom(2.0).is_err());
        assert!(session.commit_flash(FlashMode::On).is_err());

        let mut session = bound_session();
        assert_eq!(session.commit_zoom(20.0).unwrap(), 8.0);
        session.commit_flash(FlashMode::Auto).unwrap();
        assert_eq!(session.settings().flash(), FlashMode::Auto);
    }

    #[test]
    fn require_bound_names_action() {
        let session = CameraSession::default();
        let err = session.require_bound("capture photo").unwrap_err();
        assert_eq!(err.current_phase, SessionPhase::Unbound);
        assert!(err.to_string().contains("capture photo"));
    }

    #[test]
    fn release_returns_to_unbound() {
        let mut session = bound_session();
        session.release();
        assert_eq!(session.phase(), SessionPhase::Unbound);
    }
}
