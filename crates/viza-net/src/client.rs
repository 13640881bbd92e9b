//! HTTP Client
//!
//! Async HTTP/1.1 client over `smol` TCP. One connection per request with
//! `Connection: close`; redirects are followed up to a configured limit.

use std::future::Future;
use std::io::Cursor;
use std::time::Duration;

use smol::io::{AsyncReadExt, AsyncWriteExt};
use smol::net::TcpStream;
use smol::Timer;

use crate::http1::{Http1Parser, Http1Request, Http1Response};
use crate::{Fetch, Method, NetError, Request, Response};

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User agent string
    pub user_agent: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Max redirects to follow (0 = disable)
    pub max_redirects: u32,
    /// Headers added to every request unless the request sets them
    pub default_headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("viza-sw/", env!("CARGO_PKG_VERSION")).into(),
            connect_timeout: Duration::from_secs(10),
            max_redirects: 10,
            default_headers: Vec::new(),
        }
    }
}

/// HTTP client builder
pub struct HttpClientBuilder {
    config: ClientConfig,
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    pub fn user_agent(mut self, ua: &str) -> Self {
        self.config.user_agent = ua.to_string();
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn max_redirects(mut self, max: u32) -> Self {
        self.config.max_redirects = max;
        self
    }

    pub fn default_header(mut self, name: &str, value: &str) -> Self {
        self.config.default_headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn build(self) -> HttpClient {
        HttpClient::with_config(self.config)
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP client
#[derive(Debug, Clone)]
pub struct HttpClient {
    config: ClientConfig,
}

impl HttpClient {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send a request, following redirects
    pub async fn send(&self, request: &Request) -> Result<Response, NetError> {
        let mut current = request.clone();
        let mut redirects = 0;

        loop {
            let resp = self.execute(&current).await?;

            if resp.is_redirect() && redirects < self.config.max_redirects {
                if let Some(location) = resp.redirect_location() {
                    let url = current.url.join(location)?;
                    tracing::debug!(from = %current.url, to = %url, status = resp.status, "following redirect");

                    // 307/308 preserve method and body, everything else becomes a GET
                    let (method, body) = if resp.status == 307 || resp.status == 308 {
                        (current.method, current.body.take())
                    } else {
                        (Method::Get, None)
                    };

                    current = Request {
                        method,
                        url,
                        headers: std::mem::take(&mut current.headers),
                        body,
                    };
                    redirects += 1;
                    continue;
                }
            }

            return Ok(resp.into());
        }
    }

    async fn execute(&self, request: &Request) -> Result<Http1Response, NetError> {
        let url = &request.url;
        if url.scheme() != "http" {
            return Err(NetError::InvalidUrl(format!("unsupported scheme: {}", url.scheme())));
        }
        let host = url.host_str()
            .ok_or_else(|| NetError::InvalidUrl(format!("missing host: {}", url)))?;
        let port = url.port_or_known_default().unwrap_or(80);

        tracing::debug!("HTTP {} {}", request.method, url);

        let mut stream = self.connect(host, port).await?;

        let host_header = match url.port() {
            Some(p) => format!("{}:{}", host, p),
            None => host.to_string(),
        };

        let mut wire = Http1Request::from_request(request)
            .default_header("Host", &host_header)
            .default_header("User-Agent", &self.config.user_agent);
        for (name, value) in &self.config.default_headers {
            wire = wire.default_header(name, value);
        }
        wire.headers.retain(|(n, _)| !n.eq_ignore_ascii_case("connection"));
        let wire = wire.header("Connection", "close");

        stream.write_all(&wire.serialize()).await?;
        stream.flush().await?;

        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await?;

        Http1Parser::parse(&mut Cursor::new(raw))
            .map_err(|e| NetError::Network(format!("Parse failed: {}", e)))
    }

    async fn connect(&self, host: &str, port: u16) -> Result<TcpStream, NetError> {
        let timeout = self.config.connect_timeout;
        let connect = async {
            TcpStream::connect((host, port))
                .await
                .map_err(|e| NetError::Network(format!("Connection failed: {}", e)))
        };
        let deadline = async {
            Timer::after(timeout).await;
            Err(NetError::Timeout(timeout))
        };
        smol::future::or(connect, deadline).await
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetch for HttpClient {
    fn fetch(&self, request: &Request) -> impl Future<Output = Result<Response, NetError>> + Send {
        self.send(request)
    }
}
