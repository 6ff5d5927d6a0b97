//! HTTP clients for the foxden services.
//!
//! - [`status`]: the cloud publisher and the local companion as [`StatusSource`]s
//! - [`kv`]: REST key-value store backing the publisher
//! - [`publish`]: authenticated status updates
//! - [`site`]: the static site data document

pub mod error;
pub mod kv;
pub mod publish;
pub mod site;
pub mod status;
pub mod traits;

pub use error::ApiError;
pub use kv::KvRestStore;
pub use publish::PublishClient;
pub use site::SiteClient;
pub use status::HttpStatusSource;
pub use traits::StatusSource;

/// Path of the watching status endpoint, relative to a base URL.
pub const NOW_WATCHING_PATH: &str = "api/now-watching";

/// Resolve `path` against `base`, treating `base` as a directory.
pub(crate) fn endpoint(base: &str, path: &str) -> Result<url::Url, ApiError> {
    let mut base = url::Url::parse(base)?;
    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }
    Ok(base.join(path)?)
}

#[cfg(test)]
pub(crate) mod test_support {
    /// Serve `router` on an ephemeral port and return its base URL.
    pub async fn serve(router: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }
}
