use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Table de correspondance `type` → media type complet.
pub type TypeMap = HashMap<String, String>;

/// Un encodage candidat d'une même ressource audio.
///
/// `stream_type` est un tag court de codec/conteneur (`"opus"`, `"mp3"`...),
/// `media_type` un content-type complet, fourni par l'appelant ou déduit de
/// la [`TypeMap`] pendant la négociation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamDefinition {
    pub url: String,
    #[serde(rename = "type")]
    pub stream_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

impl StreamDefinition {
    pub fn new(url: impl Into<String>, stream_type: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            stream_type: stream_type.into(),
            media_type: None,
        }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Media type explicite, vide s'il est absent.
    pub fn media_type(&self) -> &str {
        self.media_type.as_deref().unwrap_or("")
    }
}

/// Ensemble de candidats passé à [`Player::load_stream`](crate::Player::load_stream).
///
/// Une définition seule devient un singleton.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamSet(Vec<StreamDefinition>);

impl StreamSet {
    pub fn as_slice(&self) -> &[StreamDefinition] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<StreamDefinition> for StreamSet {
    fn from(stream: StreamDefinition) -> Self {
        StreamSet(vec![stream])
    }
}

impl From<Vec<StreamDefinition>> for StreamSet {
    fn from(streams: Vec<StreamDefinition>) -> Self {
        StreamSet(streams)
    }
}

impl From<&[StreamDefinition]> for StreamSet {
    fn from(streams: &[StreamDefinition]) -> Self {
        StreamSet(streams.to_vec())
    }
}

impl<const N: usize> From<[StreamDefinition; N]> for StreamSet {
    fn from(streams: [StreamDefinition; N]) -> Self {
        StreamSet(streams.into())
    }
}
