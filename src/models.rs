//! Catalog data model
//!
//! Track records plus the closed genre/mood taxonomy. Genre and mood are
//! stored as lowercase text in the database; unknown values decode to the
//! single `Other` fallback instead of failing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A playable audio item with display metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Track {
    pub id: Uuid,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub genre: Genre,
    pub mood: Mood,
    /// Locator for playable audio content (resolvable by the audio backend)
    pub audio_url: String,
    pub cover_url: Option<String>,
    /// Advisory length in seconds; authoritative duration comes from the
    /// audio backend once metadata loads
    pub duration: Option<f64>,
    pub play_count: i64,
    pub ai_generated: bool,
    pub ai_prompt: Option<String>,
    pub ai_model: Option<String>,
    pub tags: Vec<String>,
    pub bpm: Option<i64>,
    pub musical_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Genre taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Genre {
    #[serde(rename = "lo-fi")]
    LoFi,
    Synthwave,
    Ambient,
    Downtempo,
    Chillhop,
    Cyberpunk,
    Other,
}

impl Genre {
    /// All genres a client may filter or generate by
    pub const ALL: [Genre; 6] = [
        Genre::LoFi,
        Genre::Synthwave,
        Genre::Ambient,
        Genre::Downtempo,
        Genre::Chillhop,
        Genre::Cyberpunk,
    ];

    /// Parse from stored text; unknown values map to `Other`
    pub fn parse(s: &str) -> Genre {
        match s {
            "lo-fi" | "lofi" => Genre::LoFi,
            "synthwave" => Genre::Synthwave,
            "ambient" => Genre::Ambient,
            "downtempo" => Genre::Downtempo,
            "chillhop" => Genre::Chillhop,
            "cyberpunk" => Genre::Cyberpunk,
            _ => Genre::Other,
        }
    }

    /// Parse a client-supplied filter value; rejects unknown strings
    pub fn parse_strict(s: &str) -> Option<Genre> {
        match Genre::parse(s) {
            Genre::Other => None,
            g => Some(g),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::LoFi => "lo-fi",
            Genre::Synthwave => "synthwave",
            Genre::Ambient => "ambient",
            Genre::Downtempo => "downtempo",
            Genre::Chillhop => "chillhop",
            Genre::Cyberpunk => "cyberpunk",
            Genre::Other => "other",
        }
    }

    /// Cover art color theme for this genre
    pub fn theme(&self) -> CoverTheme {
        match self {
            Genre::Synthwave | Genre::Cyberpunk => CoverTheme {
                primary: "#EC4899",
                secondary: "#8B5CF6",
                dark: "#1F2937",
            },
            Genre::Ambient => CoverTheme {
                primary: "#10B981",
                secondary: "#3B82F6",
                dark: "#064E3B",
            },
            Genre::Downtempo => CoverTheme {
                primary: "#F59E0B",
                secondary: "#EF4444",
                dark: "#7C2D12",
            },
            // Lo-fi theme doubles as the fallback for unknown genres
            Genre::LoFi | Genre::Chillhop | Genre::Other => CoverTheme {
                primary: "#8B5CF6",
                secondary: "#3B82F6",
                dark: "#1E293B",
            },
        }
    }
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mood taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Chill,
    Energetic,
    Melancholic,
    Uplifting,
    Dreamy,
    Nostalgic,
    Other,
}

impl Mood {
    pub fn parse(s: &str) -> Mood {
        match s {
            "chill" => Mood::Chill,
            "energetic" => Mood::Energetic,
            "melancholic" => Mood::Melancholic,
            "uplifting" => Mood::Uplifting,
            "dreamy" => Mood::Dreamy,
            "nostalgic" => Mood::Nostalgic,
            _ => Mood::Other,
        }
    }

    pub fn parse_strict(s: &str) -> Option<Mood> {
        match Mood::parse(s) {
            Mood::Other => None,
            m => Some(m),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Chill => "chill",
            Mood::Energetic => "energetic",
            Mood::Melancholic => "melancholic",
            Mood::Uplifting => "uplifting",
            Mood::Dreamy => "dreamy",
            Mood::Nostalgic => "nostalgic",
            Mood::Other => "other",
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Cover art color scheme (radial gradient stops)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverTheme {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub dark: &'static str,
}
