use crate::config::FetchLimits;
use crate::error::{AnalysisError, Result};
use crate::source::TextSource;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Response, Url};

const USER_AGENT: &str = concat!("wordscan/", env!("CARGO_PKG_VERSION"));

/// Opens remote documents over HTTP(S).
///
/// One pooled client per fetcher; connect and whole-request timeouts come from configuration.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_file_size: u64,
}

impl HttpFetcher {
    pub fn new(limits: FetchLimits) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(limits.connect_timeout)
            .timeout(limits.request_timeout)
            .build()
            .map_err(|err| AnalysisError::internal(format!("Cannot build HTTP client: {err}")))?;
        Ok(Self {
            client,
            max_file_size: limits.max_file_size,
        })
    }

    /// Send the request and check status and declared size; the body is read lazily.
    pub async fn open(&self, url: &Url) -> Result<HttpSource> {
        let location = url.to_string();
        log::debug!("Opening {location}");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| send_error(&location, &err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::invalid_source(
                &location,
                format!("HTTP error code: {} for URL: {location}", status.as_u16()),
            ));
        }

        if let Some(declared) = response.content_length() {
            if declared > self.max_file_size {
                return Err(AnalysisError::SizeExceeded {
                    location,
                    limit: self.max_file_size,
                    observed: declared,
                });
            }
        }

        Ok(HttpSource {
            location,
            response,
            limit: self.max_file_size,
            received: 0,
        })
    }
}

fn send_error(location: &str, err: &reqwest::Error) -> AnalysisError {
    if err.is_timeout() {
        AnalysisError::read_failure(location, format!("timed out: {err}"))
    } else if err.is_connect() {
        AnalysisError::invalid_source(location, format!("Unable to read from URL: {location}"))
    } else {
        AnalysisError::read_failure(location, err.to_string())
    }
}

/// Body of an accepted response, enforcing the byte ceiling as data arrives.
#[derive(Debug)]
pub struct HttpSource {
    location: String,
    response: Response,
    limit: u64,
    received: u64,
}

#[async_trait]
impl TextSource for HttpSource {
    fn location(&self) -> &str {
        &self.location
    }

    async fn next_block(&mut self) -> Result<Option<Bytes>> {
        let block = self.response.chunk().await.map_err(|err| {
            let reason = if err.is_timeout() {
                format!("timed out: {err}")
            } else {
                err.to_string()
            };
            AnalysisError::read_failure(&self.location, reason)
        })?;

        let Some(block) = block else {
            return Ok(None);
        };
        self.received += block.len() as u64;
        if self.received > self.limit {
            return Err(AnalysisError::SizeExceeded {
                location: self.location.clone(),
                limit: self.limit,
                observed: self.received,
            });
        }
        Ok(Some(block))
    }
}
