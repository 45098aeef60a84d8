use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::PlayerError;
use crate::graph::{GraphContext, GraphNode};

/// Primitive de lecture d'un flux unique adressé par URL.
///
/// Le décodage et la sortie effective restent à la charge de
/// l'implémentation ; le player ne fait que piloter la source, le volume et
/// le transport.
#[async_trait]
pub trait AudioSink: Send + Sync {
    fn volume(&self) -> f64;

    /// Les implémentations bornent la valeur à `[0, 1]`.
    fn set_volume(&mut self, volume: f64);

    fn src(&self) -> String;

    fn set_src(&mut self, src: &str);

    async fn play(&mut self) -> Result<(), PlayerError>;

    async fn pause(&mut self) -> Result<(), PlayerError>;

    /// Chaîne de capacité pour `media_type`, vide si le type n'est pas lisible.
    fn can_play_type(&self, media_type: &str) -> String;

    /// Crée la connexion de la sortie du sink dans `context`.
    fn graph_connection(
        &mut self,
        context: Arc<dyn GraphContext>,
    ) -> Result<Box<dyn GraphNode>, PlayerError>;
}
