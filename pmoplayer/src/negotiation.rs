//! Négociation du flux à lire
//!
//! Pipeline pur en trois étapes : tri par priorité, annotation du media
//! type, puis sélection du premier candidat que le sink sait lire. Les
//! entrées ne sont jamais modifiées, chaque étape produit de nouvelles
//! valeurs.

use std::collections::HashMap;
use tracing::debug;

use crate::errors::PlayerError;
use crate::stream::{StreamDefinition, TypeMap};

/// Trie les flux selon la liste de priorité.
///
/// Chaque type listé reçoit son rang (1-based) dans `priority`, les types
/// absents un rang commun placé après tous les rangs listés. Le tri est
/// stable : à rang égal, l'ordre d'entrée est conservé. Une liste vide
/// retourne une copie dans l'ordre d'origine.
///
/// Si un type apparaît plusieurs fois dans `priority`, sa dernière position
/// l'emporte.
///
/// Le rang commun vaut `max(streams.len(), priority.len()) + 1`, et non
/// `streams.len() + 1` : avec une liste plus longue que l'entrée, les types
/// listés restent ainsi toujours devant les autres.
pub fn sorted_streams<S: AsRef<str>>(
    streams: &[StreamDefinition],
    priority: &[S],
) -> Vec<StreamDefinition> {
    let mut sorted = streams.to_vec();
    if priority.is_empty() {
        return sorted;
    }

    let ranks: HashMap<&str, usize> = priority
        .iter()
        .enumerate()
        .map(|(i, stream_type)| (stream_type.as_ref(), i + 1))
        .collect();

    // Au-delà de tout rang listé, même si la liste est plus longue que l'entrée
    let unranked = streams.len().max(priority.len()) + 1;

    sorted.sort_by_key(|stream| {
        ranks
            .get(stream.stream_type.as_str())
            .copied()
            .unwrap_or(unranked)
    });
    sorted
}

/// Retourne une copie de `stream` dont le media type est renseigné.
///
/// Un media type explicite non vide est conservé tel quel ; sinon il est
/// cherché dans `type_map`, et vaut `""` pour un type inconnu.
pub fn attach_media_type(stream: &StreamDefinition, type_map: &TypeMap) -> StreamDefinition {
    let media_type = match stream.media_type.as_deref() {
        Some(media_type) if !media_type.is_empty() => media_type.to_string(),
        _ => type_map
            .get(&stream.stream_type)
            .cloned()
            .unwrap_or_default(),
    };

    StreamDefinition {
        media_type: Some(media_type),
        ..stream.clone()
    }
}

/// Trie, annote puis retourne le premier flux lisible.
///
/// `can_play_type` renvoie la chaîne de capacité du sink pour un media type :
/// seule sa vacuité compte ici.
pub fn select_stream<S, F>(
    streams: &[StreamDefinition],
    priority: &[S],
    type_map: &TypeMap,
    can_play_type: F,
) -> Result<StreamDefinition, PlayerError>
where
    S: AsRef<str>,
    F: Fn(&str) -> String,
{
    if streams.is_empty() {
        return Err(PlayerError::NoStreamsProvided);
    }

    let candidates: Vec<StreamDefinition> = sorted_streams(streams, priority)
        .iter()
        .map(|stream| attach_media_type(stream, type_map))
        .collect();

    for candidate in &candidates {
        let capability = can_play_type(candidate.media_type());
        debug!(
            url = %candidate.url,
            stream_type = %candidate.stream_type,
            media_type = %candidate.media_type(),
            capability = %capability,
            "Probing stream candidate"
        );
        if !capability.is_empty() {
            return Ok(candidate.clone());
        }
    }

    Err(PlayerError::no_playable_source(
        candidates.iter().map(|s| s.stream_type.as_str()),
    ))
}
