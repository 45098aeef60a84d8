//! Abstractions du graphe audio (contexte d'exécution et nœuds routables).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::errors::PlayerError;

/// État d'exécution d'un contexte de graphe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextState {
    Running,
    Suspended,
    Closed,
}

impl ContextState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ContextState::Running => "running",
            ContextState::Suspended => "suspended",
            ContextState::Closed => "closed",
        }
    }
}

impl fmt::Display for ContextState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContextState {
    type Err = PlayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "running" => Ok(ContextState::Running),
            "suspended" => Ok(ContextState::Suspended),
            "closed" => Ok(ContextState::Closed),
            other => Err(PlayerError::Config(format!(
                "Unknown audio context state '{}'",
                other
            ))),
        }
    }
}

/// Point de sortie d'un contexte (la destination finale du graphe).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Destination {
    name: String,
}

impl Destination {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Environnement de routage audio, avec un cycle suspendu / actif.
#[async_trait]
pub trait GraphContext: Send + Sync {
    fn state(&self) -> ContextState;

    fn destination(&self) -> Destination;

    /// Reprend un contexte suspendu. Peut ne jamais aboutir : aucun délai
    /// n'est imposé par l'appelant.
    async fn resume(&self) -> Result<(), PlayerError>;
}

/// Connexion routable produite en branchant la sortie d'un sink dans un contexte.
pub trait GraphNode: Send + Sync {
    fn connect(&mut self, destination: &Destination) -> Result<(), PlayerError>;

    /// Contexte propriétaire de ce nœud.
    fn context(&self) -> Arc<dyn GraphContext>;
}
