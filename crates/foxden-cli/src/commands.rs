//! Subcommand implementations.

use std::fmt::Write as _;
use std::path::Path;

use serde_json::Value;

use tracing::{debug, info};

use foxden_api::{HttpStatusSource, PublishClient, SiteClient};
use foxden_core::config::AppConfig;
use foxden_core::models::{WatchingRecord, WatchingUpdate, WebsiteData};
use foxden_runtime::{spawn_poller, ResolverConfig, StatusResolver};

use crate::error::CliError;

/// Fields for `foxden publish`.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct PublishArgs {
    /// Clear the status instead of setting it.
    #[arg(long, conflicts_with_all = ["title", "episode", "season", "progress"])]
    pub stopped: bool,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub episode: Option<u32>,
    #[arg(long)]
    pub season: Option<u32>,
    /// Playback position in percent.
    #[arg(long)]
    pub progress: Option<f64>,
    /// Origin tag; the server defaults it to "cloud".
    #[arg(long)]
    pub source: Option<String>,
}

impl PublishArgs {
    pub fn to_update(&self) -> Result<WatchingUpdate, CliError> {
        if let Some(p) = self.progress {
            if !(0.0..=100.0).contains(&p) {
                return Err(CliError::Usage(format!(
                    "--progress must be between 0 and 100, got {p}"
                )));
            }
        }

        Ok(WatchingUpdate {
            is_watching: !self.stopped,
            title: self.title.clone().map(Value::from),
            episode: self.episode.map(Value::from),
            season: self.season.map(Value::from),
            progress: self.progress.map(Value::from),
            source: self.source.clone().map(Value::from),
        })
    }
}

fn resolver(config: &AppConfig) -> Result<StatusResolver<HttpStatusSource, HttpStatusSource>, CliError> {
    let cloud = HttpStatusSource::cloud(&config.cloud.base_url)?;
    let local = HttpStatusSource::local(&config.local.base_url)?;
    debug!(cloud = %cloud.url(), local = %local.url(), "sources configured");
    Ok(StatusResolver::with_config(
        cloud,
        local,
        ResolverConfig::from(config),
    ))
}

fn print_record(record: &WatchingRecord, json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string(record)?);
    } else {
        println!("{}", record.summary());
    }
    Ok(())
}

pub async fn status(config: &AppConfig, json: bool) -> Result<(), CliError> {
    let mut resolver = resolver(config)?;
    let resolved = resolver.resolve_detailed().await;
    debug!(origin = ?resolved.origin, "resolved once");
    print_record(&resolved.record, json)
}

/// Poll until Ctrl-C, printing every change of status.
pub async fn watch(config: &AppConfig, json: bool) -> Result<(), CliError> {
    let interval = config.poll_interval();
    let mut handle = spawn_poller(resolver(config)?, interval);
    info!(interval_secs = interval.as_secs(), "watching for status changes");

    let mut last: Option<WatchingRecord> = None;
    loop {
        tokio::select! {
            changed = handle.status.changed() => {
                if changed.is_err() {
                    break;
                }
                let record = handle.status.borrow_and_update().clone();
                if is_new_status(last.as_ref(), &record) {
                    print_record(&record, json)?;
                    last = Some(record);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}

/// Timestamps change on every fallback tick, so they are not compared.
fn is_new_status(last: Option<&WatchingRecord>, next: &WatchingRecord) -> bool {
    last.map_or(true, |last| !last.same_status(next))
}

pub async fn publish(config: &AppConfig, args: &PublishArgs, json: bool) -> Result<(), CliError> {
    let update = args.to_update()?;
    let client = PublishClient::new(&config.cloud.base_url, config.cloud.api_key.clone())?;
    let record = client.publish(&update).await?;
    info!(is_watching = record.is_watching, "status published");
    print_record(&record, json)
}

pub async fn site(config: &AppConfig, json: bool) -> Result<(), CliError> {
    let data = SiteClient::new(&config.cloud.base_url)?.fetch().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        print!("{}", site_summary(&data));
    }
    Ok(())
}

pub fn site_summary(data: &WebsiteData) -> String {
    let mut out = String::new();
    let name = data.profile.display_name.as_deref().unwrap_or("(no name)");
    let _ = writeln!(out, "{name}");

    if let Some(stats) = &data.anime.stats {
        let _ = writeln!(
            out,
            "Anime: {} titles, {} episodes, {:.1} days",
            stats.total_anime, stats.episodes_watched, stats.days_watched
        );
        if let Some(score) = stats.mean_score {
            let _ = writeln!(out, "  mean score {score:.2}");
        }
    }
    for (i, anime) in data.anime.top10().iter().enumerate() {
        let _ = writeln!(out, "  {:>2}. {}", anime.rank.unwrap_or(i as u32 + 1), anime.title);
    }

    if let Some(stats) = &data.gaming.stats {
        let _ = writeln!(
            out,
            "Gaming: {} hours across {} games",
            stats.playtime_hours(),
            stats.games_owned
        );
        if let Some(game) = &stats.most_played {
            let _ = writeln!(out, "  most played: {game}");
        }
    }
    out
}

/// Print the config path and the effective values, key redacted.
pub fn show_config(config: &AppConfig) -> Result<(), CliError> {
    let mut shown = config.clone();
    if shown.cloud.api_key.is_some() {
        shown.cloud.api_key = Some("<redacted>".into());
    }
    println!("# {}", AppConfig::config_path().display());
    print!("{}", toml::to_string_pretty(&shown)?);
    Ok(())
}

/// Create the user config file from the built-in defaults.
pub fn init_config() -> Result<(), CliError> {
    let path = AppConfig::config_path();
    write_default_config(&path)?;
    println!("wrote {}", path.display());
    Ok(())
}

/// Flag and environment overrides are never written out.
fn write_default_config(path: &Path) -> Result<(), CliError> {
    if path.exists() {
        return Err(CliError::Usage(format!("{} already exists", path.display())));
    }
    AppConfig::default().save_to(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use foxden_core::models::{AnimeData, AnimeStats, GamingData, GamingStats, Profile, TierAnime};

    use super::*;

    #[test]
    fn test_publish_args_build_update() {
        let args = PublishArgs {
            title: Some("Frieren".into()),
            episode: Some(12),
            progress: Some(42.0),
            ..Default::default()
        };
        let update = args.to_update().unwrap();
        assert!(update.is_watching);
        assert_eq!(update.title, Some(Value::from("Frieren")));
        assert_eq!(update.episode, Some(Value::from(12)));
        assert_eq!(update.season, None);
        assert_eq!(update.source, None);
    }

    #[test]
    fn test_stopped_clears() {
        let args = PublishArgs {
            stopped: true,
            ..Default::default()
        };
        assert!(!args.to_update().unwrap().is_watching);
    }

    #[test]
    fn test_progress_out_of_range() {
        let args = PublishArgs {
            progress: Some(140.0),
            ..Default::default()
        };
        assert!(matches!(args.to_update(), Err(CliError::Usage(_))));
    }

    #[test]
    fn test_is_new_status_ignores_timestamp() {
        let a = WatchingRecord::not_watching_at(Utc::now());
        let b = WatchingRecord::not_watching_at(Utc::now() + chrono::Duration::seconds(5));
        assert!(is_new_status(None, &a));
        assert!(!is_new_status(Some(&a), &b));

        let mut c = b.clone();
        c.is_watching = true;
        c.title = Some("X".into());
        assert!(is_new_status(Some(&b), &c));
    }

    #[test]
    fn test_init_config_writes_defaults_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foxden").join("config.toml");

        write_default_config(&path).unwrap();
        let saved = AppConfig::load_from(&path).unwrap();
        let defaults = AppConfig::default();
        assert_eq!(saved.cloud.base_url, defaults.cloud.base_url);
        assert_eq!(saved.cloud.api_key, None);
        assert_eq!(saved.local.base_url, defaults.local.base_url);

        assert!(matches!(
            write_default_config(&path),
            Err(CliError::Usage(_))
        ));
    }

    #[test]
    fn test_site_summary() {
        let data = WebsiteData {
            profile: Profile {
                display_name: Some("Foxems".into()),
                ..Default::default()
            },
            anime: AnimeData {
                stats: Some(AnimeStats {
                    total_anime: 210,
                    episodes_watched: 3100,
                    days_watched: 52.3,
                    ..Default::default()
                }),
                top10: Some(vec![TierAnime {
                    title: "Frieren".into(),
                    ..Default::default()
                }]),
                tiers: None,
            },
            gaming: GamingData {
                stats: Some(GamingStats {
                    total_playtime: 600,
                    games_owned: 80,
                    ..Default::default()
                }),
            },
        };

        let text = site_summary(&data);
        assert!(text.starts_with("Foxems\n"));
        assert!(text.contains("Anime: 210 titles, 3100 episodes, 52.3 days"));
        assert!(text.contains(" 1. Frieren"));
        assert!(text.contains("Gaming: 10 hours across 80 games"));
    }

    #[test]
    fn test_site_summary_sparse_document() {
        let text = site_summary(&WebsiteData::default());
        assert_eq!(text, "(no name)\n");
    }
}
