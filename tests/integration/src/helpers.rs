//! Test helpers for integration tests
//!
//! Spawns an in-process server on an ephemeral port, wraps the HTTP calls the
//! tests make, and provides a small gateway client over tokio-tungstenite.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use carpool_api::{create_app, create_app_state};
use carpool_common::AppConfig;
use futures_util::{SinkExt, StreamExt};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// REST routes live under this prefix
pub const API_PREFIX: &str = "/api/v1";

/// How long a test waits for a gateway frame
const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()?).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let state = create_app_state(config).await?;
        let app = create_app(state);

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            _handle: handle,
        })
    }

    /// Server root, used for /health
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.base_url())
    }

    /// Gateway URL carrying the access token in the query
    pub fn gateway_url(&self, token: &str) -> String {
        format!("ws://{}/gateway?access_token={token}", self.addr)
    }

    /// Plain GET against the server root
    pub async fn get_root(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.api_url(path)).send().await?)
    }

    /// Make a GET request with auth token
    pub async fn get_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self
            .client
            .get(self.api_url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    /// Make a POST request with JSON body
    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        Ok(self.client.post(self.api_url(path)).json(body).send().await?)
    }

    /// Make a POST request with auth token
    pub async fn post_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(self
            .client
            .post(self.api_url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    /// POST without a body, for action endpoints
    pub async fn post_auth_empty(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.api_url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    /// Make a PUT request with auth token
    pub async fn put_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(self
            .client
            .put(self.api_url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    /// Make a DELETE request with auth token
    pub async fn delete_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self
            .client
            .delete(self.api_url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    /// Open a gateway session for `token`; the Hello frame is left unread
    pub async fn connect_gateway(&self, token: &str) -> Result<GatewayClient> {
        let (socket, _) = connect_async(self.gateway_url(token))
            .await
            .context("gateway handshake failed")?;
        Ok(GatewayClient { socket })
    }
}

/// Test configuration.
///
/// In-memory storage unless `INTEGRATION_BACKEND=postgres`, in which case the
/// usual environment variables configure the server.
pub fn test_config() -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    match std::env::var("INTEGRATION_BACKEND").as_deref() {
        Ok("postgres") => {
            let mut config =
                AppConfig::from_env().map_err(|e| anyhow::anyhow!("Config error: {e}"))?;
            config.api.port = 0;
            Ok(config)
        }
        _ => Ok(AppConfig::for_memory(0)),
    }
}

/// Client side of one gateway session
pub struct GatewayClient {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl GatewayClient {
    /// Next JSON frame, skipping control frames. Fails on close or timeout.
    pub async fn next_frame(&mut self) -> Result<Value> {
        loop {
            let message = tokio::time::timeout(FRAME_TIMEOUT, self.socket.next())
                .await
                .context("timed out waiting for a gateway frame")?;

            match message {
                Some(Ok(Message::Text(text))) => return Ok(serde_json::from_str(&text)?),
                Some(Ok(Message::Close(frame))) => bail!("gateway closed: {frame:?}"),
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
                None => bail!("gateway stream ended"),
            }
        }
    }

    /// Read frames until a dispatch named `event` arrives and return its data
    pub async fn expect_dispatch(&mut self, event: &str) -> Result<Value> {
        loop {
            let frame = self.next_frame().await?;
            if frame["op"] == 0 && frame["t"] == event {
                return Ok(frame["d"].clone());
            }
        }
    }

    /// Read until the server closes the socket and return the close code
    pub async fn expect_close(&mut self) -> Result<Option<u16>> {
        loop {
            let message = tokio::time::timeout(FRAME_TIMEOUT, self.socket.next())
                .await
                .context("timed out waiting for close")?;

            match message {
                Some(Ok(Message::Close(frame))) => return Ok(frame.map(|f| u16::from(f.code))),
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(None),
            }
        }
    }

    /// Send a JSON frame
    pub async fn send(&mut self, frame: &Value) -> Result<()> {
        self.send_text(frame.to_string()).await
    }

    /// Send raw text, which need not be valid JSON
    pub async fn send_text(&mut self, text: impl Into<String>) -> Result<()> {
        self.socket.send(Message::Text(text.into())).await?;
        Ok(())
    }

    /// Close the session from the client side
    pub async fn close(mut self) -> Result<()> {
        self.socket.close(None).await?;
        // Drain until the server acknowledges
        while let Some(Ok(_)) = self.socket.next().await {}
        Ok(())
    }
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}

/// Assert an error response and return its `error.code`
pub async fn assert_error(response: Response, expected_status: StatusCode) -> Result<String> {
    let body: Value = assert_json(response, expected_status).await?;
    body["error"]["code"]
        .as_str()
        .map(str::to_string)
        .context("error body without a code")
}
