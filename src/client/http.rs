//! REST client for the remote timer store

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde_json::json;
use tracing::debug;

use crate::{
    error::ClientError,
    state::{Timer, TimerId},
};

use super::TimerClient;

/// Talks to `{base}/timers/...`. Every request is bounded by `timeout`.
#[derive(Debug, Clone)]
pub struct HttpTimerClient {
    base_url: Url,
    http: Client,
}

impl HttpTimerClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ClientError::Transport(format!("Invalid timer API URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Transport(format!("Timer API URL {} cannot be a base", base_url)));
        }

        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, http })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("timers").extend(segments);
        }
        url
    }

    async fn post_action(&self, id: &TimerId, action: &str) -> Result<Timer, ClientError> {
        let url = self.endpoint(&[id.as_str(), action]);
        debug!("POST {}", url);
        let response = self.http.post(url).send().await?;
        read_timer(response).await
    }
}

/// Turn a non-success status into `ClientError::Status`, keeping the body as the message
async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(ClientError::Status { status: status.as_u16(), message })
}

async fn read_timer(response: Response) -> Result<Timer, ClientError> {
    check_status(response)
        .await?
        .json::<Timer>()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}

#[async_trait]
impl TimerClient for HttpTimerClient {
    async fn create(&self, duration_seconds: u32) -> Result<Timer, ClientError> {
        let url = self.endpoint(&[]);
        debug!("POST {} duration={}", url, duration_seconds);
        let response = self
            .http
            .post(url)
            .json(&json!({ "duration": duration_seconds }))
            .send()
            .await?;
        read_timer(response).await
    }

    async fn get(&self, id: &TimerId) -> Result<Timer, ClientError> {
        let response = self.http.get(self.endpoint(&[id.as_str()])).send().await?;
        read_timer(response).await
    }

    async fn start(&self, id: &TimerId) -> Result<Timer, ClientError> {
        self.post_action(id, "start").await
    }

    async fn pause(&self, id: &TimerId) -> Result<Timer, ClientError> {
        self.post_action(id, "pause").await
    }

    async fn resume(&self, id: &TimerId) -> Result<Timer, ClientError> {
        self.post_action(id, "resume").await
    }

    async fn reset(&self, id: &TimerId) -> Result<Timer, ClientError> {
        self.post_action(id, "reset").await
    }

    async fn delete(&self, id: &TimerId) -> Result<(), ClientError> {
        let url = self.endpoint(&[id.as_str()]);
        debug!("DELETE {}", url);
        let response = self.http.delete(url).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TimerStatus;
    use mockito::{Matcher, Server};

    fn timer_body(status: &str, remaining: u32) -> String {
        json!({
            "id": "abc",
            "initialDuration": 60,
            "remainingTime": remaining,
            "status": status,
            "createdAt": "2024-05-01T12:00:00Z",
            "lastResetAt": null
        })
        .to_string()
    }

    fn client(server: &Server) -> HttpTimerClient {
        HttpTimerClient::new(&server.url(), Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn create_posts_duration_and_decodes_timer() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/timers")
            .match_body(Matcher::Json(json!({ "duration": 60 })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(timer_body("idle", 60))
            .create_async()
            .await;

        let timer = client(&server).create(60).await.unwrap();
        assert_eq!(timer.id, TimerId::new("abc"));
        assert_eq!(timer.status, TimerStatus::Idle);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn actions_hit_per_timer_routes() {
        let mut server = Server::new_async().await;
        let pause = server
            .mock("POST", "/timers/abc/pause")
            .with_header("content-type", "application/json")
            .with_body(timer_body("paused", 15))
            .create_async()
            .await;
        let get = server
            .mock("GET", "/timers/abc")
            .with_header("content-type", "application/json")
            .with_body(timer_body("paused", 15))
            .create_async()
            .await;

        let client = client(&server);
        let id = TimerId::new("abc");
        assert_eq!(client.pause(&id).await.unwrap().remaining_seconds, 15);
        assert_eq!(client.get(&id).await.unwrap().status, TimerStatus::Paused);
        pause.assert_async().await;
        get.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_becomes_typed_status_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/timers/missing")
            .with_status(404)
            .with_body("Timer not found")
            .create_async()
            .await;

        let err = client(&server).get(&TimerId::new("missing")).await.unwrap_err();
        assert_eq!(err, ClientError::Status { status: 404, message: "Timer not found".to_string() });
    }

    #[tokio::test]
    async fn garbage_body_is_a_decode_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/timers/abc/start")
            .with_header("content-type", "application/json")
            .with_body("{\"nope\":true}")
            .create_async()
            .await;

        let err = client(&server).start(&TimerId::new("abc")).await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)), "{err:?}");
    }

    #[tokio::test]
    async fn delete_accepts_no_content() {
        let mut server = Server::new_async().await;
        let mock = server.mock("DELETE", "/timers/abc").with_status(204).create_async().await;

        client(&server).delete(&TimerId::new("abc")).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let client = HttpTimerClient::new("http://127.0.0.1:1", Duration::from_millis(200)).unwrap();
        let err = client.get(&TimerId::new("abc")).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)), "{err:?}");
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let client = HttpTimerClient::new("http://localhost:8000/api/", Duration::from_secs(1)).unwrap();
        let url = client.endpoint(&["a b", "reset"]);
        assert_eq!(url.as_str(), "http://localhost:8000/api/timers/a%20b/reset");
    }

    #[test]
    fn rejects_unparseable_base_url() {
        assert!(HttpTimerClient::new("not a url", Duration::from_secs(1)).is_err());
    }
}
