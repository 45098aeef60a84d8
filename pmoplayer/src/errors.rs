use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayerError {
    #[error("No streams provided when invoking play action")]
    NoStreamsProvided,
    // Porte la liste des types tentés, dans l'ordre négocié
    #[error("Unable to play any of the provided stream types: {}", .0.join(", "))]
    NoPlayableSource(Vec<String>),
    #[error(
        "Unable to resume audio context ({0}). User interaction may be required to initialize audio capabilities"
    )]
    ContextResume(String),
    #[error("Sink Error: {0}")]
    Sink(String),
    #[error("Graph Error: {0}")]
    Graph(String),
    #[error("Configuration Error: {0}")]
    Config(String),
}

impl PlayerError {
    pub fn no_playable_source<'a, I>(types: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        PlayerError::NoPlayableSource(types.into_iter().map(str::to_string).collect())
    }

    pub fn context_resume(message: &str) -> Self {
        PlayerError::ContextResume(message.to_string())
    }

    pub fn sink(message: &str) -> Self {
        PlayerError::Sink(message.to_string())
    }

    pub fn graph(message: &str) -> Self {
        PlayerError::Graph(message.to_string())
    }

    /// Types tentés lors d'un échec de sélection, vide pour les autres erreurs.
    pub fn attempted_types(&self) -> &[String] {
        match self {
            PlayerError::NoPlayableSource(types) => types,
            _ => &[],
        }
    }
}
