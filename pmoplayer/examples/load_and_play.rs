//! Exemple de chargement et de lecture d'un flux
//!
//! Construit un player depuis la configuration globale, s'abonne à tous les
//! hooks via le joker, puis charge la meilleure variante d'un flux.
//!
//! Usage:
//!   cargo run --example load_and_play -- <url_base> [type1,type2,...]
//!
//! Exemple:
//!   RUST_LOG=debug cargo run --example load_and_play -- http://radio.example/live opus,mp3

use pmoconfig::get_config;
use pmoplayer::{Player, PlayerOptions, StreamDefinition, WILDCARD_HOOK};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <url_base> [type1,type2,...]", args[0]);
        std::process::exit(1);
    }

    let base = &args[1];
    let priority: Vec<String> = args
        .get(2)
        .map(|p| p.split(',').map(str::to_string).collect())
        .unwrap_or_default();

    let options = PlayerOptions::from_config(&get_config())?.with_auto_play(false);
    let mut player = Player::new(options);

    player.emitter().subscribe_sync(WILDCARD_HOOK, |args| {
        println!("hook: {}", serde_json::Value::Array(args));
        Ok(())
    });

    // Une variante par type connu de la configuration
    let streams: Vec<StreamDefinition> = ["aac", "mp3", "opus", "oga"]
        .iter()
        .map(|t| StreamDefinition::new(format!("{base}.{t}"), *t))
        .collect();

    player.load_stream_with_priority(streams, &priority).await?;
    println!("Source retenue: {}", player.src());

    player.play().await?;
    println!("Contexte audio: {}", player.context_state());

    player.set_volume(0.5);
    player.pause().await?;

    Ok(())
}
