//! Capture lifecycle state machine

use std::fmt;
use thiserror::Error;

use crate::domain::error::CaptureError;
use crate::domain::target::TabId;

/// Capture controller states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    CountingDown,
    Acquiring,
    Recording,
    Stopping,
}

impl CaptureState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::CountingDown => "counting-down",
            Self::Acquiring => "acquiring",
            Self::Recording => "recording",
            Self::Stopping => "stopping",
        }
    }

    /// Whether this state is projected as "a recording is active".
    pub const fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The transition that was attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionAction {
    Start,
    Acquire,
    MarkRecording,
    Stop,
    Finish,
}

impl TransitionAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start recording",
            Self::Acquire => "acquire streams",
            Self::MarkRecording => "mark recording",
            Self::Stop => "stop recording",
            Self::Finish => "finish recording",
        }
    }
}

impl fmt::Display for TransitionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: CaptureState,
    pub action: TransitionAction,
}

impl From<InvalidStateTransition> for CaptureError {
    fn from(err: InvalidStateTransition) -> Self {
        match err.action {
            TransitionAction::Start => CaptureError::AlreadyRecording,
            TransitionAction::Stop => CaptureError::NotRecording,
            _ => CaptureError::Worker(err.to_string()),
        }
    }
}

/// Capture lifecycle entity.
///
/// State machine:
///   IDLE -> COUNTING_DOWN (begin_countdown)
///   COUNTING_DOWN -> ACQUIRING (begin_acquiring)
///   ACQUIRING -> RECORDING (mark_recording)
///   RECORDING -> STOPPING (begin_stopping)
///   STOPPING -> IDLE (finish)
///   any -> IDLE(error) (fail)
#[derive(Debug, Default)]
pub struct CaptureLifecycle {
    state: CaptureState,
    target: Option<TabId>,
    last_error: Option<String>,
}

impl CaptureLifecycle {
    /// Create a new lifecycle in idle state
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Tab targeted by the active session, if any
    pub fn target(&self) -> Option<TabId> {
        self.target
    }

    /// Message of the failure that last returned the lifecycle to idle
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_idle(&self) -> bool {
        self.state == CaptureState::Idle
    }

    pub fn is_recording(&self) -> bool {
        self.state == CaptureState::Recording
    }

    fn expect(
        &self,
        expected: CaptureState,
        action: TransitionAction,
    ) -> Result<(), InvalidStateTransition> {
        if self.state != expected {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action,
            });
        }
        Ok(())
    }

    /// Transition from IDLE to COUNTING_DOWN
    pub fn begin_countdown(&mut self, target: TabId) -> Result<(), InvalidStateTransition> {
        self.expect(CaptureState::Idle, TransitionAction::Start)?;
        self.state = CaptureState::CountingDown;
        self.target = Some(target);
        self.last_error = None;
        Ok(())
    }

    /// Transition from COUNTING_DOWN to ACQUIRING
    pub fn begin_acquiring(&mut self) -> Result<(), InvalidStateTransition> {
        self.expect(CaptureState::CountingDown, TransitionAction::Acquire)?;
        self.state = CaptureState::Acquiring;
        Ok(())
    }

    /// Transition from ACQUIRING to RECORDING
    pub fn mark_recording(&mut self) -> Result<(), InvalidStateTransition> {
        self.expect(CaptureState::Acquiring, TransitionAction::MarkRecording)?;
        self.state = CaptureState::Recording;
        Ok(())
    }

    /// Transition from RECORDING to STOPPING
    pub fn begin_stopping(&mut self) -> Result<(), InvalidStateTransition> {
        self.expect(CaptureState::Recording, TransitionAction::Stop)?;
        self.state = CaptureState::Stopping;
        Ok(())
    }

    /// Transition from STOPPING to IDLE
    pub fn finish(&mut self) -> Result<(), InvalidStateTransition> {
        self.expect(CaptureState::Stopping, TransitionAction::Finish)?;
        self.state = CaptureState::Idle;
        self.target = None;
        Ok(())
    }

    /// Return to IDLE from any state, remembering why
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.state = CaptureState::Idle;
        self.target = None;
        self.last_error = Some(reason.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAB: TabId = TabId(7);

    fn recording() -> CaptureLifecycle {
        let mut lifecycle = CaptureLifecycle::new();
        lifecycle.begin_countdown(TAB).unwrap();
        lifecycle.begin_acquiring().unwrap();
        lifecycle.mark_recording().unwrap();
        lifecycle
    }

    #[test]
    fn new_lifecycle_is_idle() {
        let lifecycle = CaptureLifecycle::new();
        assert!(lifecycle.is_idle());
        assert!(lifecycle.target().is_none());
        assert!(!lifecycle.state().is_active());
    }

    #[test]
    fn full_cycle() {
        let mut lifecycle = recording();
        assert!(lifecycle.is_recording());
        assert_eq!(lifecycle.target(), Some(TAB));

        lifecycle.begin_stopping().unwrap();
        assert_eq!(lifecycle.state(), CaptureState::Stopping);

        lifecycle.finish().unwrap();
        assert!(lifecycle.is_idle());
        assert!(lifecycle.target().is_none());

        // Can start another cycle
        lifecycle.begin_countdown(TabId(8)).unwrap();
        assert_eq!(lifecycle.state(), CaptureState::CountingDown);
    }

    #[test]
    fn start_while_active_fails() {
        for mut lifecycle in [recording(), {
            let mut l = CaptureLifecycle::new();
            l.begin_countdown(TAB).unwrap();
            l
        }] {
            let err = lifecycle.begin_countdown(TabId(9)).unwrap_err();
            assert_eq!(err.action, TransitionAction::Start);
            assert_eq!(CaptureError::from(err), CaptureError::AlreadyRecording);
            assert_eq!(lifecycle.target(), Some(TAB));
        }
    }

    #[test]
    fn stop_before_recording_fails() {
        let mut lifecycle = CaptureLifecycle::new();
        let err = lifecycle.begin_stopping().unwrap_err();
        assert_eq!(err.current_state, CaptureState::Idle);
        assert_eq!(CaptureError::from(err), CaptureError::NotRecording);

        lifecycle.begin_countdown(TAB).unwrap();
        assert!(lifecycle.begin_stopping().is_err());

        lifecycle.begin_acquiring().unwrap();
        let err = lifecycle.begin_stopping().unwrap_err();
        assert_eq!(err.current_state, CaptureState::Acquiring);
    }

    #[test]
    fn fail_returns_to_idle_from_any_state() {
        let mut lifecycle = CaptureLifecycle::new();
        lifecycle.begin_countdown(TAB).unwrap();
        lifecycle.begin_acquiring().unwrap();

        lifecycle.fail("permission denied");
        assert!(lifecycle.is_idle());
        assert_eq!(lifecycle.last_error(), Some("permission denied"));

        lifecycle.begin_countdown(TAB).unwrap();
        assert!(lifecycle.last_error().is_none());
    }

    #[test]
    fn acquire_requires_countdown() {
        let mut lifecycle = CaptureLifecycle::new();
        let err = lifecycle.begin_acquiring().unwrap_err();
        assert_eq!(err.action, TransitionAction::Acquire);
    }

    #[test]
    fn active_projection() {
        assert!(!CaptureState::Idle.is_active());
        assert!(CaptureState::CountingDown.is_active());
        assert!(CaptureState::Acquiring.is_active());
        assert!(CaptureState::Recording.is_active());
        assert!(CaptureState::Stopping.is_active());
    }

    #[test]
    fn error_display() {
        let err = InvalidStateTransition {
            current_state: CaptureState::Acquiring,
            action: TransitionAction::Stop,
        };
        let msg = err.to_string();
        assert!(msg.contains("stop recording"));
        assert!(msg.contains("acquiring"));
    }
}
