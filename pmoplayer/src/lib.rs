#![doc = r#"
PMOPlayer - Orchestration de lecture d'un flux audio

Cette crate se place entre le code applicatif et deux primitives opaques :
un sink capable de lire un flux adressé par URL ([`AudioSink`]) et un graphe
audio dans lequel la sortie du sink est routée ([`GraphContext`]).

# Architecture

```text
load_stream(streams, priority)
    → négociation (tri + media type + premier flux lisible)
    → changement de source + câblage paresseux du graphe
    → play() : resume du contexte suspendu → beforePlay → sink.play → afterPlay
```

- [`Emitter`] : hub publish/subscribe par nom de hook, avec joker `*` et
  isolation des callbacks défaillants
- [`negotiation`] : fonctions pures de sélection du flux
- [`Player`] : contrôleur de lecture
- [`PlayerOptions`] : câblage par défaut ([`ElementSink`], [`SoftwareContext`])

# Exemple

```no_run
use pmoplayer::{MediaHook, Player, PlayerOptions, StreamDefinition};

#[tokio::main]
async fn main() -> Result<(), pmoplayer::PlayerError> {
    let mut player = Player::new(PlayerOptions::default().with_auto_play(false));

    player.emitter().subscribe_sync(MediaHook::AfterPlay, |_| {
        println!("playing");
        Ok(())
    });

    player
        .load_stream_with_priority(
            vec![
                StreamDefinition::new("http://radio.example/live.mp3", "mp3"),
                StreamDefinition::new("http://radio.example/live.opus", "opus"),
            ],
            &["opus", "mp3"],
        )
        .await?;
    player.play().await
}
```
"#]

pub mod context;
pub mod element;
pub mod emitter;
pub mod errors;
pub mod graph;
pub mod hooks;
pub mod negotiation;
pub mod options;
mod player;
pub mod sink;
pub mod stream;

pub use context::SoftwareContext;
pub use element::{ElementSink, ElementSinkOptions, MediaElementNode};
pub use emitter::{Emitter, HookArgs, Subscription};
pub use errors::PlayerError;
pub use graph::{ContextState, Destination, GraphContext, GraphNode};
pub use hooks::{MediaEvent, MediaHook, WILDCARD_HOOK};
pub use negotiation::{attach_media_type, select_stream, sorted_streams};
pub use options::{ContextFactory, PlayerModules, PlayerOptions, SinkFactory};
pub use player::Player;
pub use sink::AudioSink;
pub use stream::{StreamDefinition, StreamSet, TypeMap};
