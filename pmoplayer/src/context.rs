use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::errors::PlayerError;
use crate::graph::{ContextState, Destination, GraphContext};

const DEFAULT_DESTINATION: &str = "default-output";

/// Contexte de graphe logiciel.
///
/// Modélise le cycle de vie d'un contexte audio : il démarre par défaut
/// suspendu (aucune interaction utilisateur), `resume` le fait passer en
/// `Running`, et un contexte fermé ne peut plus reprendre.
#[derive(Debug)]
pub struct SoftwareContext {
    state: Mutex<ContextState>,
    destination: Destination,
}

impl SoftwareContext {
    pub fn new(initial_state: ContextState) -> Self {
        Self {
            state: Mutex::new(initial_state),
            destination: Destination::new(DEFAULT_DESTINATION),
        }
    }

    pub fn with_destination(mut self, name: impl Into<String>) -> Self {
        self.destination = Destination::new(name);
        self
    }

    fn lock_state(&self) -> MutexGuard<'_, ContextState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Suspend un contexte actif ; sans effet sur un contexte fermé.
    pub fn suspend(&self) {
        let mut state = self.lock_state();
        if *state == ContextState::Running {
            *state = ContextState::Suspended;
        }
    }

    pub fn close(&self) {
        *self.lock_state() = ContextState::Closed;
    }
}

impl Default for SoftwareContext {
    fn default() -> Self {
        Self::new(ContextState::Suspended)
    }
}

#[async_trait]
impl GraphContext for SoftwareContext {
    fn state(&self) -> ContextState {
        *self.lock_state()
    }

    fn destination(&self) -> Destination {
        self.destination.clone()
    }

    async fn resume(&self) -> Result<(), PlayerError> {
        let mut state = self.lock_state();
        match *state {
            ContextState::Closed => Err(PlayerError::graph("Cannot resume a closed audio context")),
            ContextState::Suspended => {
                debug!(destination = %self.destination.name(), "Audio context resumed");
                *state = ContextState::Running;
                Ok(())
            }
            ContextState::Running => Ok(()),
        }
    }
}
