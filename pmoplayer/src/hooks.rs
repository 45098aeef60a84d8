//! Vocabulaire des hooks émis par le player et des événements de l'élément média.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hook spécial recevant toutes les émissions, préfixées par le nom du hook.
pub const WILDCARD_HOOK: &str = "*";

/// Points du cycle de vie émis par le [`Player`](crate::Player).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaHook {
    BeforePlay,
    BeforePause,
    AfterPlay,
    AfterPause,
    /// Réservé : fait partie du vocabulaire mais n'est pas émis par le player.
    LoadError,
}

impl MediaHook {
    pub const ALL: [MediaHook; 5] = [
        MediaHook::BeforePlay,
        MediaHook::BeforePause,
        MediaHook::AfterPlay,
        MediaHook::AfterPause,
        MediaHook::LoadError,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            MediaHook::BeforePlay => "beforePlay",
            MediaHook::BeforePause => "beforePause",
            MediaHook::AfterPlay => "afterPlay",
            MediaHook::AfterPause => "afterPause",
            MediaHook::LoadError => "loadError",
        }
    }
}

impl AsRef<str> for MediaHook {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for MediaHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Événements natifs d'un élément média, relayés par le sink sur l'emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaEvent {
    Playing,
    Waiting,
    Seeking,
    Seeked,
    Ended,
    LoadedMetadata,
    LoadedData,
    CanPlay,
    CanPlayThrough,
    DurationChange,
    TimeUpdate,
    Play,
    Pause,
    RateChange,
    VolumeChange,
    Suspend,
    Emptied,
    Stalled,
}

impl MediaEvent {
    pub const ALL: [MediaEvent; 18] = [
        MediaEvent::Playing,
        MediaEvent::Waiting,
        MediaEvent::Seeking,
        MediaEvent::Seeked,
        MediaEvent::Ended,
        MediaEvent::LoadedMetadata,
        MediaEvent::LoadedData,
        MediaEvent::CanPlay,
        MediaEvent::CanPlayThrough,
        MediaEvent::DurationChange,
        MediaEvent::TimeUpdate,
        MediaEvent::Play,
        MediaEvent::Pause,
        MediaEvent::RateChange,
        MediaEvent::VolumeChange,
        MediaEvent::Suspend,
        MediaEvent::Emptied,
        MediaEvent::Stalled,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            MediaEvent::Playing => "playing",
            MediaEvent::Waiting => "waiting",
            MediaEvent::Seeking => "seeking",
            MediaEvent::Seeked => "seeked",
            MediaEvent::Ended => "ended",
            MediaEvent::LoadedMetadata => "loadedmetadata",
            MediaEvent::LoadedData => "loadeddata",
            MediaEvent::CanPlay => "canplay",
            MediaEvent::CanPlayThrough => "canplaythrough",
            MediaEvent::DurationChange => "durationchange",
            MediaEvent::TimeUpdate => "timeupdate",
            MediaEvent::Play => "play",
            MediaEvent::Pause => "pause",
            MediaEvent::RateChange => "ratechange",
            MediaEvent::VolumeChange => "volumechange",
            MediaEvent::Suspend => "suspend",
            MediaEvent::Emptied => "emptied",
            MediaEvent::Stalled => "stalled",
        }
    }
}

impl AsRef<str> for MediaEvent {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for MediaEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
