//! Typed view of the static `/data.json` site document.
//!
//! Every field is optional or defaulted: the document is hand-maintained
//! and sections are routinely missing while it is being filled in.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WebsiteData {
    pub profile: Profile,
    pub anime: AnimeData,
    pub gaming: GamingData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Profile {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub socials: Socials,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Socials {
    pub github: Option<String>,
    pub twitter: Option<String>,
    pub discord: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimeData {
    pub stats: Option<AnimeStats>,
    pub top10: Option<Vec<TierAnime>>,
    pub tiers: Option<Vec<TierData>>,
}

impl AnimeData {
    pub fn top10(&self) -> &[TierAnime] {
        self.top10.as_deref().unwrap_or_default()
    }

    pub fn tiers(&self) -> &[TierData] {
        self.tiers.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimeStats {
    pub total_anime: u32,
    pub episodes_watched: u32,
    pub days_watched: f64,
    pub mean_score: Option<f32>,
    pub completed: u32,
    pub watching: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TierAnime {
    pub title: String,
    pub image: Option<String>,
    pub score: Option<f32>,
    pub rank: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TierData {
    pub tier: String,
    pub color: Option<String>,
    pub anime: Vec<TierAnime>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GamingData {
    pub stats: Option<GamingStats>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GamingStats {
    /// Total playtime in minutes.
    pub total_playtime: u64,
    pub games_owned: u32,
    pub achievements: u32,
    pub most_played: Option<String>,
}

impl GamingStats {
    /// Whole hours played.
    pub fn playtime_hours(&self) -> u64 {
        self.total_playtime / 60
    }
}
