use crate::config::toml_config::SourcesConfig;
use crate::domain::model::Route;
use crate::domain::ports::Fetcher;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::{Client, Proxy};
use std::time::Duration;

/// reqwest 實作；境外來源走代理用戶端
pub struct HttpFetcher {
    direct: Client,
    proxied: Client,
}

impl HttpFetcher {
    pub fn new(sources: &SourcesConfig) -> Result<Self> {
        let timeout = sources.timeout_seconds.map(Duration::from_secs);

        let mut direct = Client::builder();
        let mut proxied = Client::builder().proxy(Proxy::all(&sources.proxy_url)?);
        if let Some(timeout) = timeout {
            direct = direct.timeout(timeout);
            proxied = proxied.timeout(timeout);
        }

        Ok(Self {
            direct: direct.build()?,
            proxied: proxied.build()?,
        })
    }

    fn client(&self, route: Route) -> &Client {
        match route {
            Route::Direct => &self.direct,
            Route::Proxy => &self.proxied,
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, route: Route) -> Result<String> {
        tracing::debug!("GET {} ({:?})", url, route);

        let response = self
            .client(route)
            .get(url)
            .send()
            .await
            .map_err(|e| EtlError::network(url, e.to_string()))?;

        tracing::debug!("Response status: {}", response.status());

        if !response.status().is_success() {
            return Err(EtlError::network(
                url,
                format!("HTTP status {}", response.status()),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| EtlError::network(url, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn sources(proxy_url: &str) -> SourcesConfig {
        SourcesConfig {
            proxy_url: proxy_url.to_string(),
            timeout_seconds: Some(5),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = MockServer::start();
        let page = server.mock(|when, then| {
            when.method(GET).path("/xk2024/");
            then.status(200)
                .header("Content-Type", "text/html; charset=utf-8")
                .body("<html>浙江</html>");
        });

        let fetcher = HttpFetcher::new(&sources("http://127.0.0.1:4780")).unwrap();
        let body = fetcher
            .fetch(&server.url("/xk2024/"), Route::Direct)
            .await
            .unwrap();

        page.assert();
        assert_eq!(body, "<html>浙江</html>");
    }

    #[tokio::test]
    async fn test_non_success_status_is_network_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing.html");
            then.status(404);
        });

        let fetcher = HttpFetcher::new(&sources("http://127.0.0.1:4780")).unwrap();
        let err = fetcher
            .fetch(&server.url("/missing.html"), Route::Direct)
            .await
            .unwrap_err();

        match err {
            EtlError::NetworkError { url, message } => {
                assert!(url.ends_with("/missing.html"));
                assert!(message.contains("404"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_proxy_is_network_error() {
        let fetcher = HttpFetcher::new(&sources("http://127.0.0.1:1")).unwrap();
        let err = fetcher
            .fetch("http://example.invalid/page", Route::Proxy)
            .await
            .unwrap_err();
        assert!(matches!(err, EtlError::NetworkError { .. }));
    }
}
