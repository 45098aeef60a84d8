//! Collaborateurs espions partagés par les tests d'intégration du player.

#![allow(dead_code)]

use async_trait::async_trait;
use pmoplayer::{
    AudioSink, ContextState, Destination, Emitter, GraphContext, GraphNode, Player, PlayerError,
    PlayerModules, PlayerOptions, StreamDefinition, TypeMap, WILDCARD_HOOK,
};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct Calls {
    pub play: usize,
    pub pause: usize,
    pub resume: usize,
    pub connect: usize,
    pub graph_requests: usize,
    pub set_src: usize,
    pub current_src: String,
    /// Volume courant du sink, remis à 1 à chaque changement de source.
    pub sink_volume: f64,
    pub src_on_resume: Option<String>,
    /// Ordre global : appels du sink et du contexte, hooks émis.
    pub order: Vec<String>,
}

pub type SharedCalls = Arc<Mutex<Calls>>;

pub struct SpyContext {
    state: Mutex<ContextState>,
    fail_resume: bool,
    calls: SharedCalls,
}

#[async_trait]
impl GraphContext for SpyContext {
    fn state(&self) -> ContextState {
        *self.state.lock().unwrap()
    }

    fn destination(&self) -> Destination {
        Destination::new("spy-destination")
    }

    async fn resume(&self) -> Result<(), PlayerError> {
        {
            let mut calls = self.calls.lock().unwrap();
            calls.resume += 1;
            calls.src_on_resume = Some(calls.current_src.clone());
            calls.order.push("resume".to_string());
        }
        if self.fail_resume {
            return Err(PlayerError::graph("resume refused"));
        }
        *self.state.lock().unwrap() = ContextState::Running;
        Ok(())
    }
}

pub struct SpyNode {
    context: Arc<dyn GraphContext>,
    calls: SharedCalls,
}

impl GraphNode for SpyNode {
    fn connect(&mut self, _destination: &Destination) -> Result<(), PlayerError> {
        let mut calls = self.calls.lock().unwrap();
        calls.connect += 1;
        calls.order.push("connect".to_string());
        Ok(())
    }

    fn context(&self) -> Arc<dyn GraphContext> {
        self.context.clone()
    }
}

pub struct SpySink {
    src: String,
    volume: f64,
    graph_failures_left: usize,
    calls: SharedCalls,
}

#[async_trait]
impl AudioSink for SpySink {
    fn volume(&self) -> f64 {
        self.volume
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
        self.calls.lock().unwrap().sink_volume = self.volume;
    }

    fn src(&self) -> String {
        self.src.clone()
    }

    fn set_src(&mut self, src: &str) {
        self.src = src.to_string();
        // Comme un élément réel, le changement de source réinitialise le volume
        self.volume = 1.0;
        let mut calls = self.calls.lock().unwrap();
        calls.set_src += 1;
        calls.current_src = src.to_string();
        calls.sink_volume = 1.0;
    }

    async fn play(&mut self) -> Result<(), PlayerError> {
        let mut calls = self.calls.lock().unwrap();
        calls.play += 1;
        calls.order.push("sink.play".to_string());
        Ok(())
    }

    async fn pause(&mut self) -> Result<(), PlayerError> {
        let mut calls = self.calls.lock().unwrap();
        calls.pause += 1;
        calls.order.push("sink.pause".to_string());
        Ok(())
    }

    fn can_play_type(&self, media_type: &str) -> String {
        if media_type.is_empty() {
            String::new()
        } else {
            "probably".to_string()
        }
    }

    fn graph_connection(
        &mut self,
        context: Arc<dyn GraphContext>,
    ) -> Result<Box<dyn GraphNode>, PlayerError> {
        self.calls.lock().unwrap().graph_requests += 1;
        if self.graph_failures_left > 0 {
            self.graph_failures_left -= 1;
            return Err(PlayerError::graph("element source creation failed"));
        }
        Ok(Box::new(SpyNode {
            context,
            calls: self.calls.clone(),
        }))
    }
}

#[derive(Debug, Clone)]
pub struct TestOptions {
    pub auto_play: bool,
    pub resume_fail: bool,
    pub graph_failures: usize,
    pub context_state: ContextState,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            auto_play: false,
            resume_fail: false,
            graph_failures: 0,
            context_state: ContextState::Running,
        }
    }
}

pub struct TestEntities {
    pub player: Player,
    pub emitter: Emitter,
    pub calls: SharedCalls,
}

impl TestEntities {
    pub fn calls(&self) -> std::sync::MutexGuard<'_, Calls> {
        self.calls.lock().unwrap()
    }

    /// Hooks émis, dans l'ordre, tels que vus par le joker.
    pub fn hooks(&self) -> Vec<String> {
        self.calls()
            .order
            .iter()
            .filter_map(|entry| entry.strip_prefix("hook:").map(str::to_string))
            .collect()
    }
}

pub fn create_test_entities(opts: TestOptions) -> TestEntities {
    let calls: SharedCalls = Arc::new(Mutex::new(Calls {
        sink_volume: 1.0,
        ..Default::default()
    }));

    let sink_calls = calls.clone();
    let graph_failures = opts.graph_failures;
    let context_calls = calls.clone();
    let context_state = opts.context_state;
    let fail_resume = opts.resume_fail;

    let modules = PlayerModules::new(
        move |_emitter| {
            Box::new(SpySink {
                src: String::new(),
                volume: 1.0,
                graph_failures_left: graph_failures,
                calls: sink_calls.clone(),
            }) as Box<dyn AudioSink>
        },
        move || {
            Arc::new(SpyContext {
                state: Mutex::new(context_state),
                fail_resume,
                calls: context_calls.clone(),
            }) as Arc<dyn GraphContext>
        },
    );

    let emitter = Emitter::new();
    let hook_calls = calls.clone();
    emitter.subscribe_sync(WILDCARD_HOOK, move |args| {
        let name = args
            .first()
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        hook_calls.lock().unwrap().order.push(format!("hook:{name}"));
        Ok(())
    });

    let options = PlayerOptions {
        auto_play: opts.auto_play,
        media_events: false,
        type_map: TypeMap::new(),
        modules,
        emitter: emitter.clone(),
    };

    TestEntities {
        player: Player::new(options),
        emitter,
        calls,
    }
}

pub fn opus_stream() -> StreamDefinition {
    StreamDefinition::new("http://url.com/stream.opus", "opus").with_media_type("opus")
}

pub fn mp3_stream() -> StreamDefinition {
    StreamDefinition::new("http://url.com/stream.mp3", "mp3").with_media_type("mp3")
}
