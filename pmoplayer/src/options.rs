//! Câblage par défaut du player : modules, services et table des types.

use pmoconfig::{default_type_map, Config};
use std::fmt;
use std::sync::Arc;

use crate::context::SoftwareContext;
use crate::element::{ElementSink, ElementSinkOptions};
use crate::emitter::Emitter;
use crate::errors::PlayerError;
use crate::graph::{ContextState, GraphContext};
use crate::sink::AudioSink;
use crate::stream::TypeMap;

/// Fabrique d'un sink neuf ; reçoit l'emitter si les événements média sont relayés.
pub type SinkFactory = Arc<dyn Fn(Option<Emitter>) -> Box<dyn AudioSink> + Send + Sync>;

/// Fabrique d'un contexte de graphe neuf.
pub type ContextFactory = Arc<dyn Fn() -> Arc<dyn GraphContext> + Send + Sync>;

/// Collaborateurs créés par le player à sa construction.
#[derive(Clone)]
pub struct PlayerModules {
    pub create_sink: SinkFactory,
    pub create_context: ContextFactory,
}

impl PlayerModules {
    pub fn new<S, C>(create_sink: S, create_context: C) -> Self
    where
        S: Fn(Option<Emitter>) -> Box<dyn AudioSink> + Send + Sync + 'static,
        C: Fn() -> Arc<dyn GraphContext> + Send + Sync + 'static,
    {
        Self {
            create_sink: Arc::new(create_sink),
            create_context: Arc::new(create_context),
        }
    }

    /// [`ElementSink`] et [`SoftwareContext`] avec les réglages donnés.
    pub fn software(sink_options: ElementSinkOptions, initial_state: ContextState) -> Self {
        Self::new(
            move |emitter| Box::new(ElementSink::new(sink_options.clone(), emitter)) as Box<dyn AudioSink>,
            move || Arc::new(SoftwareContext::new(initial_state)) as Arc<dyn GraphContext>,
        )
    }
}

impl Default for PlayerModules {
    fn default() -> Self {
        Self::software(ElementSinkOptions::default(), ContextState::Suspended)
    }
}

impl fmt::Debug for PlayerModules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerModules").finish_non_exhaustive()
    }
}

/// Options du [`Player`](crate::Player).
#[derive(Clone, Debug)]
pub struct PlayerOptions {
    /// Lance `play` à la fin de chaque `load_stream` réussi.
    pub auto_play: bool,
    /// Relaie les événements de l'élément média sur l'emitter.
    pub media_events: bool,
    pub type_map: TypeMap,
    pub modules: PlayerModules,
    /// Service d'événements exposé par [`Player::emitter`](crate::Player::emitter).
    pub emitter: Emitter,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            auto_play: true,
            media_events: false,
            type_map: default_type_map(),
            modules: PlayerModules::default(),
            emitter: Emitter::new(),
        }
    }
}

impl PlayerOptions {
    /// Construit les options depuis la configuration.
    pub fn from_config(config: &Config) -> Result<Self, PlayerError> {
        let auto_play = config
            .get_autoplay()
            .map_err(|e| PlayerError::Config(e.to_string()))?;
        let media_events = config
            .get_sink_media_events()
            .map_err(|e| PlayerError::Config(e.to_string()))?;
        let initial_state: ContextState = config.get_context_initial_state().parse()?;

        Ok(Self {
            auto_play,
            media_events,
            type_map: config.get_type_map(),
            modules: PlayerModules::software(ElementSinkOptions::from_config(config), initial_state),
            emitter: Emitter::new(),
        })
    }

    pub fn with_auto_play(mut self, auto_play: bool) -> Self {
        self.auto_play = auto_play;
        self
    }

    pub fn with_type_map(mut self, type_map: TypeMap) -> Self {
        self.type_map = type_map;
        self
    }

    pub fn with_modules(mut self, modules: PlayerModules) -> Self {
        self.modules = modules;
        self
    }

    pub fn with_emitter(mut self, emitter: Emitter) -> Self {
        self.emitter = emitter;
        self
    }
}
