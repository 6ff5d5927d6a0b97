//! Client-side resolution of the "now watching" status.
//!
//! [`StatusResolver`] decides, once per tick, which source to trust;
//! [`poller`] re-runs it on a fixed interval and publishes each result.

pub mod poller;
pub mod resolver;

pub use poller::{spawn_poller, PollerHandle};
pub use resolver::{
    LocalAvailability, Origin, Resolved, ResolverConfig, ResolverState, StatusResolver,
};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use foxden_api::StatusSource;
    use foxden_core::models::WatchingRecord;

    #[derive(Debug, thiserror::Error)]
    #[error("source unreachable")]
    pub struct Unreachable;

    struct Inner {
        record: Mutex<Option<WatchingRecord>>,
        delay: Mutex<Duration>,
        calls: AtomicUsize,
    }

    /// Scriptable source. `None` means unreachable.
    #[derive(Clone)]
    pub struct FakeSource {
        name: &'static str,
        inner: Arc<Inner>,
    }

    impl FakeSource {
        pub fn new(name: &'static str, record: Option<WatchingRecord>) -> Self {
            Self {
                name,
                inner: Arc::new(Inner {
                    record: Mutex::new(record),
                    delay: Mutex::new(Duration::ZERO),
                    calls: AtomicUsize::new(0),
                }),
            }
        }

        pub fn down(name: &'static str) -> Self {
            Self::new(name, None)
        }

        pub fn set(&self, record: Option<WatchingRecord>) {
            *self.inner.record.lock().unwrap() = record;
        }

        pub fn set_delay(&self, delay: Duration) {
            *self.inner.delay.lock().unwrap() = delay;
        }

        pub fn calls(&self) -> usize {
            self.inner.calls.load(Ordering::SeqCst)
        }
    }

    impl StatusSource for FakeSource {
        type Error = Unreachable;

        fn name(&self) -> &str {
            self.name
        }

        async fn fetch_status(&self) -> Result<WatchingRecord, Unreachable> {
            self.inner.calls.fetch_add(1, Ordering::SeqCst);
            let delay = *self.inner.delay.lock().unwrap();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let record = self.inner.record.lock().unwrap().clone();
            record.ok_or(Unreachable)
        }
    }

    pub fn watching(title: &str) -> WatchingRecord {
        WatchingRecord {
            is_watching: true,
            title: Some(title.into()),
            ..WatchingRecord::not_watching()
        }
    }
}
