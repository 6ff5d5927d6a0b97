//! Multi-source resolution of the displayed watching status.
//!
//! Each tick is strictly sequential:
//!
//! 1. Ask the cloud publisher. If it reports active watching, that wins
//!    and the local companion is not contacted.
//! 2. Otherwise probe the local companion, unless it failed recently
//!    (back-off). The probe has a hard timeout. A successful probe is
//!    returned verbatim.
//! 3. Otherwise report "not watching".
//!
//! The cloud record is only trusted when it confirms watching: it may be
//! stale for up to the store TTL, while the local companion is the
//! freshest source whenever it is reachable.

use std::time::Duration;

use tokio::time::Instant;

use foxden_api::StatusSource;
use foxden_core::config::AppConfig;
use foxden_core::models::WatchingRecord;

/// Hard deadline for a local probe.
pub const LOCAL_TIMEOUT: Duration = Duration::from_secs(2);

/// Cooldown after a failed local probe.
pub const LOCAL_RETRY_INTERVAL: Duration = Duration::from_secs(30);

/// Whether the local companion answered its last probe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LocalAvailability {
    /// Never probed.
    #[default]
    Unknown,
    Available,
    Unavailable,
}

/// Back-off state for the local companion. Lives as long as the resolver.
#[derive(Debug, Clone, Default)]
pub struct ResolverState {
    pub local: LocalAvailability,
    /// Time of the most recent probe, successful or not. `None` until the
    /// first probe.
    pub last_local_check: Option<Instant>,
}

impl ResolverState {
    /// Probe unless the last probe failed less than `retry_interval` ago.
    pub fn should_probe_local(&self, now: Instant, retry_interval: Duration) -> bool {
        if self.local != LocalAvailability::Unavailable {
            return true;
        }
        self.last_local_check
            .map_or(true, |last| now.saturating_duration_since(last) >= retry_interval)
    }

    fn record_probe(&mut self, available: bool, at: Instant) {
        let next = if available {
            LocalAvailability::Available
        } else {
            LocalAvailability::Unavailable
        };

        // Log transitions only; a down companion would otherwise log every tick.
        if next != self.local {
            match next {
                LocalAvailability::Available => tracing::info!("local companion reachable"),
                _ => tracing::info!("local companion unavailable; backing off"),
            }
        }

        self.local = next;
        self.last_local_check = Some(at);
    }
}

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub local_timeout: Duration,
    pub local_retry_interval: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            local_timeout: LOCAL_TIMEOUT,
            local_retry_interval: LOCAL_RETRY_INTERVAL,
        }
    }
}

impl From<&AppConfig> for ResolverConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            local_timeout: config.local_timeout(),
            local_retry_interval: config.local_retry_interval(),
        }
    }
}

/// Where a resolved record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Cloud,
    Local,
    /// Neither source confirmed watching.
    Fallback,
}

#[derive(Debug, Clone)]
pub struct Resolved {
    pub record: WatchingRecord,
    pub origin: Origin,
}

pub struct StatusResolver<C, L> {
    cloud: C,
    local: L,
    config: ResolverConfig,
    state: ResolverState,
}

impl<C: StatusSource, L: StatusSource> StatusResolver<C, L> {
    pub fn new(cloud: C, local: L) -> Self {
        Self::with_config(cloud, local, ResolverConfig::default())
    }

    pub fn with_config(cloud: C, local: L, config: ResolverConfig) -> Self {
        Self {
            cloud,
            local,
            config,
            state: ResolverState::default(),
        }
    }

    pub fn state(&self) -> &ResolverState {
        &self.state
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Run one resolution tick.
    pub async fn resolve(&mut self) -> WatchingRecord {
        self.resolve_detailed().await.record
    }

    /// Run one resolution tick, reporting which source answered.
    pub async fn resolve_detailed(&mut self) -> Resolved {
        match self.cloud.fetch_status().await {
            Ok(record) if record.is_watching => {
                return Resolved {
                    record,
                    origin: Origin::Cloud,
                };
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(source = self.cloud.name(), error = %e, "cloud status unavailable");
            }
        }

        let now = Instant::now();
        if self
            .state
            .should_probe_local(now, self.config.local_retry_interval)
        {
            let probe = tokio::time::timeout(self.config.local_timeout, self.local.fetch_status());
            match probe.await {
                Ok(Ok(record)) => {
                    self.state.record_probe(true, now);
                    return Resolved {
                        record,
                        origin: Origin::Local,
                    };
                }
                Ok(Err(e)) => {
                    tracing::trace!(source = self.local.name(), error = %e, "local probe failed");
                    self.state.record_probe(false, now);
                }
                Err(_) => {
                    tracing::trace!(source = self.local.name(), "local probe timed out");
                    self.state.record_probe(false, now);
                }
            }
        }

        Resolved {
            record: WatchingRecord::not_watching(),
            origin: Origin::Fallback,
        }
    }
}
