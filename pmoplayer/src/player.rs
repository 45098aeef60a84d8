//! Contrôleur de lecture
//!
//! Le [`Player`] possède le sink et le contexte de graphe. Il négocie le flux
//! à lire, branche paresseusement le sink dans le graphe (au plus une fois,
//! et sans jamais faire échouer le chargement), reprend le contexte s'il est
//! suspendu avant de lire, et encadre play/pause par des hooks.
//!
//! Les opérations d'une même instance doivent être appelées séquentiellement :
//! aucune exclusion mutuelle interne n'est fournie et un `play` en cours ne
//! peut pas être annulé.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::emitter::Emitter;
use crate::errors::PlayerError;
use crate::graph::{ContextState, GraphContext, GraphNode};
use crate::hooks::MediaHook;
use crate::negotiation::select_stream;
use crate::options::PlayerOptions;
use crate::sink::AudioSink;
use crate::stream::{StreamDefinition, StreamSet};

pub struct Player {
    // Conservé entre les chargements, indépendamment de ce que rapporte le sink
    volume: f64,
    options: PlayerOptions,
    // Absent tant que le câblage n'a pas réussi : mode dégradé, pas une panne
    audio_node: Option<Box<dyn GraphNode>>,
    audio_context: Arc<dyn GraphContext>,
    audio_sink: Box<dyn AudioSink>,
}

impl Player {
    pub fn new(options: PlayerOptions) -> Self {
        let audio_context = (options.modules.create_context)();
        let sink_emitter = options.media_events.then(|| options.emitter.clone());
        let audio_sink = (options.modules.create_sink)(sink_emitter);

        Self {
            volume: 1.0,
            options,
            audio_node: None,
            audio_context,
            audio_sink,
        }
    }

    /// Alternative à l'import de [`PlayerOptions`].
    pub fn make_player_options() -> PlayerOptions {
        PlayerOptions::default()
    }

    /// Emitter partagé, pour s'abonner aux hooks du player.
    pub fn emitter(&self) -> &Emitter {
        &self.options.emitter
    }

    pub fn options(&self) -> &PlayerOptions {
        &self.options
    }

    /// URL actuellement chargée dans le sink, vide si aucune.
    pub fn src(&self) -> String {
        self.audio_sink.src()
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Borne `volume` à `[0, 1]` et le transmet au sink.
    pub fn set_volume(&mut self, volume: f64) {
        if volume.is_nan() {
            warn!("Ignoring NaN volume");
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        self.audio_sink.set_volume(volume);
        self.volume = volume;
    }

    pub fn has_graph_connection(&self) -> bool {
        self.audio_node.is_some()
    }

    pub fn context_state(&self) -> ContextState {
        self.audio_context.state()
    }

    fn try_create_audio_node(&mut self) {
        if self.audio_node.is_some() {
            return;
        }

        let destination = self.audio_context.destination();
        let wired = self
            .audio_sink
            .graph_connection(self.audio_context.clone())
            .and_then(|mut node| node.connect(&destination).map(|()| node));

        match wired {
            Ok(node) => {
                debug!(destination = %destination.name(), "Sink wired into audio graph");
                self.audio_node = Some(node);
            }
            Err(err) => {
                warn!(error = %err, "Unable to wire sink into audio graph, playing without routing");
                self.audio_node = None;
            }
        }
    }

    async fn resume_context(&mut self, context: Arc<dyn GraphContext>) -> Result<(), PlayerError> {
        // Une station hors ligne en source courante peut bloquer la reprise :
        // on retire la source le temps du resume.
        let staged_src = self.audio_sink.src();
        self.audio_sink.set_src("");
        let resumed = context.resume().await;
        self.audio_sink.set_src(&staged_src);
        self.audio_sink.set_volume(self.volume);

        resumed.map_err(|err| {
            error!(error = %err, "Audio context resume failed");
            PlayerError::ContextResume(err.to_string())
        })
    }

    async fn before_play(&mut self) -> Result<(), PlayerError> {
        // Un contexte créé avant toute interaction utilisateur démarre suspendu
        let suspended = self
            .audio_node
            .as_ref()
            .map(|node| node.context())
            .filter(|context| context.state() == ContextState::Suspended);

        if let Some(context) = suspended {
            debug!("Resuming suspended audio context before play");
            self.resume_context(context).await?;
        }
        Ok(())
    }

    pub async fn play(&mut self) -> Result<(), PlayerError> {
        self.before_play().await?;

        let emitter = self.options.emitter.clone();
        emitter.emit(MediaHook::BeforePlay, vec![]).await;
        self.audio_sink.play().await?;
        info!(src = %self.audio_sink.src(), "Playback started");
        emitter.emit(MediaHook::AfterPlay, vec![]).await;
        Ok(())
    }

    pub async fn pause(&mut self) -> Result<(), PlayerError> {
        let emitter = self.options.emitter.clone();
        emitter.emit(MediaHook::BeforePause, vec![]).await;
        self.audio_sink.pause().await?;
        info!("Playback paused");
        emitter.emit(MediaHook::AfterPause, vec![]).await;
        Ok(())
    }

    /// Charge le meilleur flux lisible parmi `streams`, sans priorité.
    pub async fn load_stream(&mut self, streams: impl Into<StreamSet>) -> Result<(), PlayerError> {
        self.load_stream_with_priority::<&str>(streams, &[]).await
    }

    /// Charge le meilleur flux lisible parmi `streams` selon `priority`.
    ///
    /// Si l'URL retenue est déjà chargée, ni la source ni le graphe ne sont
    /// touchés. En autoplay, les erreurs de `play` sont propagées.
    pub async fn load_stream_with_priority<S: AsRef<str>>(
        &mut self,
        streams: impl Into<StreamSet>,
        priority: &[S],
    ) -> Result<(), PlayerError> {
        let streams: StreamSet = streams.into();
        let stream = self.negotiate(streams.as_slice(), priority)?;

        if self.audio_sink.src() != stream.url {
            info!(url = %stream.url, stream_type = %stream.stream_type, "Loading stream");
            self.audio_sink.set_src(&stream.url);
            self.audio_sink.set_volume(self.volume);
            self.try_create_audio_node();
        } else {
            debug!(url = %stream.url, "Stream already loaded");
        }

        if self.options.auto_play {
            self.play().await?;
        }
        Ok(())
    }

    fn negotiate<S: AsRef<str>>(
        &self,
        streams: &[StreamDefinition],
        priority: &[S],
    ) -> Result<StreamDefinition, PlayerError> {
        let sink = &self.audio_sink;
        select_stream(streams, priority, &self.options.type_map, |media_type| {
            sink.can_play_type(media_type)
        })
        .inspect_err(|err| warn!(error = %err, "Stream negotiation failed"))
    }
}
