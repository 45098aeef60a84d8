//! Sink par défaut : modèle logiciel d'un élément média
//!
//! [`ElementSink`] reproduit le comportement d'un élément `<audio>` vis-à-vis
//! du player : la source demandée est mise en attente (`src`) et n'est
//! affectée à l'élément qu'au moment de `play`, `pause` vide la source de
//! l'élément pour couper le flux, et la sortie ne peut être routée qu'une
//! seule fois dans un graphe. Le décodage n'est pas fait ici.

use async_trait::async_trait;
use pmoconfig::Config;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::emitter::{Emitter, HookArgs};
use crate::errors::PlayerError;
use crate::graph::{ContextState, Destination, GraphContext, GraphNode};
use crate::hooks::MediaEvent;
use crate::sink::AudioSink;

const CAN_PLAY_PROBABLY: &str = "probably";
const CAN_PLAY_MAYBE: &str = "maybe";

/// Réglages transmis tels quels à l'élément.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSinkOptions {
    /// Indication de préchargement (`none`, `metadata`, `auto`).
    pub preload: String,
    /// Politique CORS (`anonymous`, `use-credentials`).
    pub cross_origin: String,
    /// Media types que l'élément sait décoder.
    pub supported_types: Vec<String>,
}

impl ElementSinkOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            preload: config.get_sink_preload(),
            cross_origin: config.get_sink_cross_origin(),
            supported_types: config.get_supported_media_types(),
        }
    }
}

impl Default for ElementSinkOptions {
    fn default() -> Self {
        Self::from_config(&Config::embedded())
    }
}

/// Forme canonique d'un media type : minuscules, sans espaces.
fn normalize_media_type(media_type: &str) -> String {
    media_type
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase()
}

fn container_of(media_type: &str) -> &str {
    media_type.split(';').next().unwrap_or(media_type)
}

/// Élément média logiciel.
///
/// Comme un élément `<audio>`, il ne peut être routé qu'une fois : la
/// connexion est réservée dès `graph_connection`, avant le `connect` du
/// nœud. Si ce `connect` échoue (contexte fermé par exemple), les tentatives
/// suivantes du player échouent aussi et la lecture continue sans routage.
pub struct ElementSink {
    options: ElementSinkOptions,
    // Source demandée, appliquée à l'élément au prochain play
    staged_src: String,
    element_src: String,
    volume: f64,
    playing: bool,
    routed: bool,
    emitter: Option<Emitter>,
}

impl ElementSink {
    pub fn new(options: ElementSinkOptions, emitter: Option<Emitter>) -> Self {
        Self {
            options,
            staged_src: String::new(),
            element_src: String::new(),
            volume: 1.0,
            playing: false,
            routed: false,
            emitter,
        }
    }

    pub fn options(&self) -> &ElementSinkOptions {
        &self.options
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Source effectivement chargée dans l'élément.
    pub fn element_src(&self) -> &str {
        &self.element_src
    }

    async fn notify(&self, event: MediaEvent, args: HookArgs) {
        if let Some(emitter) = &self.emitter {
            emitter.emit(event, args).await;
        }
    }

    async fn clear_element_src(&mut self) {
        if !self.element_src.is_empty() {
            self.element_src.clear();
            self.notify(MediaEvent::Emptied, vec![]).await;
        }
    }
}

#[async_trait]
impl AudioSink for ElementSink {
    fn volume(&self) -> f64 {
        self.volume
    }

    fn set_volume(&mut self, volume: f64) {
        if volume.is_nan() {
            return;
        }
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn src(&self) -> String {
        self.staged_src.clone()
    }

    fn set_src(&mut self, src: &str) {
        self.staged_src = src.to_string();
        self.element_src = src.to_string();
    }

    async fn play(&mut self) -> Result<(), PlayerError> {
        if self.playing {
            self.pause().await?;
        }

        self.element_src = self.staged_src.clone();
        if self.element_src.is_empty() {
            return Err(PlayerError::sink("The element has no supported source"));
        }

        self.notify(MediaEvent::Play, vec![json!(self.element_src)])
            .await;
        self.playing = true;
        trace!(src = %self.element_src, preload = %self.options.preload, "Element playing");
        self.notify(MediaEvent::Playing, vec![json!(self.element_src)])
            .await;
        Ok(())
    }

    async fn pause(&mut self) -> Result<(), PlayerError> {
        self.clear_element_src().await;
        self.playing = false;
        self.notify(MediaEvent::Pause, vec![]).await;
        Ok(())
    }

    fn can_play_type(&self, media_type: &str) -> String {
        let wanted = normalize_media_type(media_type);
        if wanted.is_empty() {
            return String::new();
        }

        let supported: Vec<String> = self
            .options
            .supported_types
            .iter()
            .map(|t| normalize_media_type(t))
            .collect();

        if supported.iter().any(|t| *t == wanted) {
            return CAN_PLAY_PROBABLY.to_string();
        }
        // Le conteneur est connu, mais pas forcément le codec demandé
        let container = container_of(&wanted);
        if supported.iter().any(|t| container_of(t) == container) {
            return CAN_PLAY_MAYBE.to_string();
        }
        String::new()
    }

    fn graph_connection(
        &mut self,
        context: Arc<dyn GraphContext>,
    ) -> Result<Box<dyn GraphNode>, PlayerError> {
        if self.routed {
            return Err(PlayerError::graph(
                "The element is already connected to an audio graph",
            ));
        }
        self.routed = true;
        debug!(cross_origin = %self.options.cross_origin, "Element routed into audio graph");
        Ok(Box::new(MediaElementNode::new(context)))
    }
}

/// Nœud source issu d'un [`ElementSink`].
pub struct MediaElementNode {
    context: Arc<dyn GraphContext>,
    destination: Option<Destination>,
}

impl MediaElementNode {
    pub fn new(context: Arc<dyn GraphContext>) -> Self {
        Self {
            context,
            destination: None,
        }
    }

    pub fn destination(&self) -> Option<&Destination> {
        self.destination.as_ref()
    }
}

impl GraphNode for MediaElementNode {
    fn connect(&mut self, destination: &Destination) -> Result<(), PlayerError> {
        if self.context.state() == ContextState::Closed {
            return Err(PlayerError::graph(
                "Cannot connect a node of a closed audio context",
            ));
        }
        self.destination = Some(destination.clone());
        Ok(())
    }

    fn context(&self) -> Arc<dyn GraphContext> {
        self.context.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SoftwareContext;
    use std::sync::Mutex;

    fn sink() -> ElementSink {
        ElementSink::new(ElementSinkOptions::default(), None)
    }

    #[test]
    fn test_default_options_follow_embedded_config() {
        let options = ElementSinkOptions::default();
        assert_eq!(options.preload, "none");
        assert_eq!(options.cross_origin, "anonymous");
        assert!(!options.supported_types.is_empty());
    }

    #[test]
    fn test_can_play_type() {
        let sink = sink();
        assert_eq!(sink.can_play_type("audio/ogg; codecs=opus"), "probably");
        assert_eq!(sink.can_play_type("Audio/Ogg;codecs=opus"), "probably");
        assert_eq!(sink.can_play_type("audio/ogg; codecs=flac"), "maybe");
        assert_eq!(sink.can_play_type("video/mp4"), "");
        assert_eq!(sink.can_play_type(""), "");
    }

    #[test]
    fn test_volume_is_clamped() {
        let mut sink = sink();
        sink.set_volume(1.5);
        assert_eq!(sink.volume(), 1.0);
        sink.set_volume(-0.2);
        assert_eq!(sink.volume(), 0.0);
        sink.set_volume(f64::NAN);
        assert_eq!(sink.volume(), 0.0);
    }

    #[tokio::test]
    async fn test_play_requires_a_source() {
        let mut sink = sink();
        assert!(matches!(sink.play().await, Err(PlayerError::Sink(_))));
        assert!(!sink.is_playing());
    }

    #[tokio::test]
    async fn test_pause_clears_element_source_but_keeps_staged_one() {
        let mut sink = sink();
        sink.set_src("http://radio.example/live.mp3");
        sink.play().await.unwrap();
        assert!(sink.is_playing());

        sink.pause().await.unwrap();
        assert!(!sink.is_playing());
        assert_eq!(sink.element_src(), "");
        assert_eq!(sink.src(), "http://radio.example/live.mp3");

        sink.play().await.unwrap();
        assert_eq!(sink.element_src(), "http://radio.example/live.mp3");
    }

    #[tokio::test]
    async fn test_media_events_are_forwarded() {
        let emitter = Emitter::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let recorded = log.clone();
        emitter.subscribe_sync(crate::hooks::WILDCARD_HOOK, move |args| {
            recorded.lock().unwrap().push(args[0].as_str().unwrap_or("").to_string());
            Ok(())
        });

        let mut sink = ElementSink::new(ElementSinkOptions::default(), Some(emitter));
        sink.set_src("http://radio.example/live.mp3");
        sink.play().await.unwrap();
        // Relancer pendant la lecture passe par une pause
        sink.play().await.unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["play", "playing", "emptied", "pause", "play", "playing"]
        );
    }

    #[test]
    fn test_graph_connection_is_created_once() {
        let mut sink = sink();
        let ctx: Arc<dyn GraphContext> = Arc::new(SoftwareContext::default());

        let mut node = sink.graph_connection(ctx.clone()).unwrap();
        node.connect(&ctx.destination()).unwrap();
        assert_eq!(node.context().state(), ContextState::Suspended);

        assert!(matches!(
            sink.graph_connection(ctx),
            Err(PlayerError::Graph(_))
        ));
    }

    #[test]
    fn test_failed_connect_still_consumes_the_routing() {
        let mut sink = sink();
        let ctx = Arc::new(SoftwareContext::default());
        ctx.close();

        let mut node = sink.graph_connection(ctx.clone()).unwrap();
        assert!(node.connect(&ctx.destination()).is_err());

        let reopened: Arc<dyn GraphContext> = Arc::new(SoftwareContext::default());
        assert!(matches!(
            sink.graph_connection(reopened),
            Err(PlayerError::Graph(_))
        ));
    }

    #[test]
    fn test_node_of_closed_context_cannot_connect() {
        let ctx = Arc::new(SoftwareContext::default());
        ctx.close();
        let mut node = MediaElementNode::new(ctx.clone());

        assert!(node.connect(&ctx.destination()).is_err());
        assert!(node.destination().is_none());
    }
}
