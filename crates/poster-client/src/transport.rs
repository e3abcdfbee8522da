//! Metadata API transport.
//!
//! [`MetadataTransport`] is the seam between the retry policy and the
//! network. [`HttpTransport`] is the real implementation; it carries its own
//! retry for transient server statuses underneath the attempt-level retry
//! in the fetcher.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::{PosterConfig, StatusRetryPolicy};
use crate::error::TransportError;
use crate::retry::{Sleeper, TokioSleeper};
use data_loader::MovieId;

/// The only part of the movie details response that is consumed
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MovieDetails {
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl MovieDetails {
    pub fn with_poster(path: impl Into<String>) -> Self {
        Self {
            poster_path: Some(path.into()),
        }
    }

    /// The poster path, if present and non-empty
    pub fn poster(&self) -> Option<&str> {
        self.poster_path.as_deref().filter(|p| !p.is_empty())
    }
}

/// One request for one movie's details
#[async_trait]
pub trait MetadataTransport: Send + Sync {
    async fn movie_details(&self, movie_id: MovieId) -> Result<MovieDetails, TransportError>;
}

/// reqwest-backed transport for `GET {base}/{id}?api_key=..&language=..`
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    language: String,
    status_retry: StatusRetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl HttpTransport {
    /// Build a transport whose client applies `config.timeout` to every request
    pub fn new(config: &PosterConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
            status_retry: config.status_retry.clone(),
            sleeper: Arc::new(TokioSleeper),
        })
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    fn details_url(&self, movie_id: MovieId) -> String {
        format!("{}/{}", self.base_url, movie_id)
    }
}

#[async_trait]
impl MetadataTransport for HttpTransport {
    async fn movie_details(&self, movie_id: MovieId) -> Result<MovieDetails, TransportError> {
        let url = self.details_url(movie_id);
        let mut retries = 0;

        loop {
            let response = self
                .client
                .get(&url)
                .query(&[
                    ("api_key", self.api_key.as_str()),
                    ("language", self.language.as_str()),
                ])
                .send()
                .await?;

            let status = response.status();

            if self.status_retry.is_retryable(status) && retries < self.status_retry.max_retries {
                retries += 1;
                let delay = self.status_retry.backoff_delay(retries);
                debug!(
                    movie_id,
                    status = status.as_u16(),
                    retry = retries,
                    "Transient server error, retrying in {:?}",
                    delay
                );
                self.sleeper.sleep(delay).await;
                continue;
            }

            if !status.is_success() {
                return Err(TransportError::Status(status.as_u16()));
            }

            // Body reads can time out too; `From` checks that before decode
            return response
                .json::<MovieDetails>()
                .await
                .map_err(TransportError::from);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::testing::RecordingSleeper;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport_for(server: &MockServer, sleeper: Arc<RecordingSleeper>) -> HttpTransport {
        let config = PosterConfig::new("test-key").with_api_base_url(server.uri());
        HttpTransport::new(&config).unwrap().with_sleeper(sleeper)
    }

    #[tokio::test]
    async fn test_sends_api_key_and_language() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/550"))
            .and(query_param("api_key", "test-key"))
            .and(query_param("language", "en-US"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": 550, "poster_path": "/fight.jpg"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport_for(&server, Arc::new(RecordingSleeper::default()));
        let details = transport.movie_details(550).await.unwrap();
        assert_eq!(details.poster(), Some("/fight.jpg"));
    }

    #[tokio::test]
    async fn test_retries_transient_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/550"))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/550"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"poster_path": "/p.jpg"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let sleeper = Arc::new(RecordingSleeper::default());
        let transport = transport_for(&server, sleeper.clone());

        let details = transport.movie_details(550).await.unwrap();
        assert_eq!(details.poster(), Some("/p.jpg"));
        assert_eq!(
            sleeper.slept(),
            vec![Duration::from_millis(500), Duration::from_secs(1)]
        );
    }

    #[tokio::test]
    async fn test_gives_up_after_status_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(4)
            .mount(&server)
            .await;

        let transport = transport_for(&server, Arc::new(RecordingSleeper::default()));
        let err = transport.movie_details(1).await.unwrap_err();
        assert_eq!(err, TransportError::Status(500));
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let sleeper = Arc::new(RecordingSleeper::default());
        let transport = transport_for(&server, sleeper.clone());
        let err = transport.movie_details(1).await.unwrap_err();
        assert_eq!(err, TransportError::Status(404));
        assert!(sleeper.slept().is_empty());
    }

    #[tokio::test]
    async fn test_missing_poster_path_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 1})))
            .mount(&server)
            .await;

        let transport = transport_for(&server, Arc::new(RecordingSleeper::default()));
        let details = transport.movie_details(1).await.unwrap();
        assert_eq!(details.poster(), None);
    }

    #[tokio::test]
    async fn test_slow_response_is_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let mut config = PosterConfig::new("k").with_api_base_url(server.uri());
        config.timeout = Duration::from_millis(100);
        let transport = HttpTransport::new(&config).unwrap();

        let err = transport.movie_details(1).await.unwrap_err();
        assert_eq!(err, TransportError::Timeout);
    }

    #[tokio::test]
    async fn test_stalled_body_is_timeout() {
        use crate::error::FailureKind;
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        // Headers and half a body, then nothing
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n{\"poster_path\": \"/p",
                )
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let mut config = PosterConfig::new("k").with_api_base_url(format!("http://{}", addr));
        config.timeout = Duration::from_millis(300);
        let transport = HttpTransport::new(&config).unwrap();

        let err = transport.movie_details(1).await.unwrap_err();
        assert_eq!(err, TransportError::Timeout);
        assert_eq!(FailureKind::classify(&err), FailureKind::Timeout);
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        use crate::error::FailureKind;

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let sleeper = Arc::new(RecordingSleeper::default());
        let transport = transport_for(&server, sleeper.clone());
        let err = transport.movie_details(1).await.unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)), "got {:?}", err);
        assert_eq!(FailureKind::classify(&err), FailureKind::Generic);
        assert!(sleeper.slept().is_empty());
    }

    #[test]
    fn test_empty_poster_path_counts_as_missing() {
        let details = MovieDetails::with_poster("");
        assert_eq!(details.poster(), None);
    }
}
