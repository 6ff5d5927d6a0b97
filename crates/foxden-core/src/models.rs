pub mod site;
pub mod watching;

pub use site::{AnimeData, AnimeStats, GamingData, GamingStats, Profile, Socials, TierAnime, TierData, WebsiteData};
pub use watching::{WatchingRecord, WatchingUpdate, DEFAULT_SOURCE};
