use std::time::Duration;

use reqwest::Client;

use crate::error::PreviewError;

pub const USER_AGENT: &str =
    "Mozilla/5.0 (compatible; UnfurlBot/1.0; +https://github.com/unfurl/unfurl-server)";

/// Fetch raw markup for a URL. One attempt, one outbound request, bounded by
/// `timeout`; retry policy belongs to the caller. The URL is assumed to be
/// validated already.
///
/// Timeouts surface as [`PreviewError::Timeout`] so the boundary can emit a
/// distinct status; everything else network-shaped (DNS, connect, non-2xx)
/// is [`PreviewError::Fetch`].
pub async fn fetch_html(client: &Client, url: &str, timeout: Duration) -> Result<String, PreviewError> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                PreviewError::Timeout
            } else {
                tracing::warn!(error = %e, url, "Failed to fetch URL");
                PreviewError::Fetch(e.to_string())
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        tracing::debug!(%status, url, "URL returned non-success status");
        return Err(PreviewError::Fetch(format!("status {status}")));
    }

    response.text().await.map_err(|e| {
        if e.is_timeout() {
            PreviewError::Timeout
        } else {
            PreviewError::Parse(e.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> Client {
        Client::builder().user_agent(USER_AGENT).build().unwrap()
    }

    #[tokio::test]
    async fn returns_body_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let html = fetch_html(
            &client(),
            &format!("{}/page", server.uri()),
            Duration::from_secs(5),
        )
        .await
        .unwrap();
        assert_eq!(html, "<html></html>");
    }

    #[tokio::test]
    async fn non_2xx_status_is_a_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = fetch_html(&client(), &server.uri(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, PreviewError::Fetch(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn connection_failure_is_a_fetch_error() {
        // Nothing listens on this port.
        let err = fetch_html(
            &client(),
            "http://127.0.0.1:1/page",
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PreviewError::Fetch(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn slow_origin_surfaces_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html></html>")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let err = fetch_html(&client(), &server.uri(), Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, PreviewError::Timeout), "got {err:?}");
    }
}
