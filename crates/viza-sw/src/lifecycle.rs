//! Worker lifecycle
//!
//! `Parsed → Installing → Installed → Activating → Activated`, with failure
//! edges into `Redundant`.

use crate::error::WorkerError;

/// Worker states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkerState {
    /// Loaded, install not yet run
    #[default]
    Parsed,
    Installing,
    /// Installed and waiting to activate
    Installed,
    Activating,
    /// Active and controlling pages
    Activated,
    /// Failed or replaced; never controls pages again
    Redundant,
}

impl WorkerState {
    /// Only an active worker intercepts fetches
    pub fn controls_pages(&self) -> bool {
        matches!(self, WorkerState::Activated)
    }
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
            WorkerState::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

fn is_valid_transition(from: WorkerState, to: WorkerState) -> bool {
    use WorkerState::*;

    matches!(
        (from, to),
        (Parsed, Installing)
            | (Installing, Installed)
            | (Installing, Redundant)
            | (Installed, Activating)
            | (Activating, Activated)
            | (Activating, Redundant)
            | (Activated, Redundant)
    )
}

/// Lifecycle state plus the pending skip-waiting request
#[derive(Debug, Default)]
pub struct Lifecycle {
    state: WorkerState,
    skip_waiting: bool,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn transition(&mut self, to: WorkerState) -> Result<(), WorkerError> {
        let from = self.state;
        if !is_valid_transition(from, to) {
            return Err(WorkerError::InvalidStateTransition { from, to });
        }
        tracing::debug!(%from, %to, "worker state change");
        self.state = to;
        Ok(())
    }

    /// Ask to activate as soon as installed instead of waiting
    pub fn request_skip_waiting(&mut self) {
        self.skip_waiting = true;
    }

    /// Installed and allowed to activate right now
    pub fn ready_to_activate(&self) -> bool {
        self.state == WorkerState::Installed && self.skip_waiting
    }
}
