// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::CrawlerConfig;

/// Status and body of a completed GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Empty unless `status` is 2xx; rejected responses are dropped unread.
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport used by the list and detail fetchers.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue a GET. Transport failures are errors; HTTP error statuses are not.
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// [`HttpClient`] backed by a `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(inner: reqwest::Client) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = self.inner.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Ok(HttpResponse {
                status: status.as_u16(),
                body: String::new(),
            });
        }
        Ok(HttpResponse {
            status: status.as_u16(),
            body: response.text().await?,
        })
    }
}

fn builder(config: &CrawlerConfig) -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
}

/// Client for the course list. Keeps a cookie jar so a rejected request can
/// pick up the session the server hands out and try again.
pub fn create_list_client(config: &CrawlerConfig) -> Result<ReqwestClient> {
    let client = builder(config).cookie_store(true).build()?;
    Ok(ReqwestClient::new(client))
}

/// Client for detail pages. Stateless: no cookie jar.
pub fn create_detail_client(config: &CrawlerConfig) -> Result<ReqwestClient> {
    let client = builder(config).build()?;
    Ok(ReqwestClient::new(client))
}

#[cfg(test)]
pub(crate) mod mock {
    //! Scripted in-process transport for pipeline tests.

    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use super::*;
    use crate::error::AppError;

    /// Replies are consumed per URL in order; the last one repeats.
    #[derive(Default)]
    pub struct MockClient {
        routes: Mutex<HashMap<String, VecDeque<Option<HttpResponse>>>>,
        requests: Mutex<Vec<String>>,
    }

    impl MockClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn reply(self, url: &str, status: u16, body: &str) -> Self {
            self.push(
                url,
                Some(HttpResponse {
                    status,
                    body: body.to_string(),
                }),
            )
        }

        pub fn fail(self, url: &str) -> Self {
            self.push(url, None)
        }

        fn push(self, url: &str, reply: Option<HttpResponse>) -> Self {
            self.routes
                .lock()
                .unwrap()
                .entry(url.to_string())
                .or_default()
                .push_back(reply);
            self
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }

        pub fn count(&self, url: &str) -> usize {
            self.requests().iter().filter(|u| *u == url).count()
        }
    }

    #[async_trait]
    impl HttpClient for MockClient {
        async fn get(&self, url: &str) -> Result<HttpResponse> {
            self.requests.lock().unwrap().push(url.to_string());

            let reply = {
                let mut routes = self.routes.lock().unwrap();
                match routes.get_mut(url) {
                    Some(queue) if queue.len() > 1 => queue.pop_front().flatten(),
                    Some(queue) => queue.front().cloned().flatten(),
                    None => Some(HttpResponse {
                        status: 404,
                        body: String::new(),
                    }),
                }
            };

            reply.ok_or_else(|| {
                AppError::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    format!("connection refused: {url}"),
                ))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_success_covers_2xx_only() {
        let ok = HttpResponse {
            status: 204,
            body: String::new(),
        };
        let redirect = HttpResponse {
            status: 302,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!redirect.is_success());
    }

    #[test]
    fn test_clients_build_from_default_config() {
        let config = CrawlerConfig::default();
        assert!(create_list_client(&config).is_ok());
        assert!(create_detail_client(&config).is_ok());
    }
}
