use crate::error::{LoadError, TransportError};
use crate::models::response::HttpResponse;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use std::error::Error as StdError;
use std::time::Duration;

/// Sends one JSON POST and returns whatever came back.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        headers: HeaderMap,
        body: Vec<u8>,
    ) -> Result<HttpResponse, TransportError>;
}

/// `User-Agent` naming this tool and the host OS.
pub fn user_agent() -> String {
    let info = os_info::get();
    format!(
        "{} {} ({}; {})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        info.os_type(),
        info.version()
    )
}

#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// No timeout unless one is given; reqwest's default applies then.
    pub fn new(timeout: Option<Duration>) -> Result<Self, LoadError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            user_agent().parse::<HeaderValue>().map_err(|_| LoadError::Header {
                name: USER_AGENT.to_string(),
                reason: "user agent is not a valid header value".into(),
            })?,
        );
        let mut builder = Client::builder().default_headers(default_headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

fn transport_error(e: reqwest::Error) -> TransportError {
    TransportError {
        status: e.status().map(|s| s.as_u16()).unwrap_or(0),
        message: e.to_string(),
        source_desc: match e.source() {
            None => "-".to_string(),
            Some(source) => source.to_string(),
        },
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        headers: HeaderMap,
        body: Vec<u8>,
    ) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status().as_u16();
        // header bytes count toward the received size
        let headers_size = response.headers().iter().fold(0, |acc, (name, value)| {
            acc + name.as_str().len() + 2 + value.as_bytes().len() + 2
        });
        let mut stream = response.bytes_stream();
        let mut body_bytes = Vec::new();
        while let Some(item) = stream.next().await {
            let chunk = item.map_err(transport_error)?;
            body_bytes.extend_from_slice(&chunk);
        }
        let size = headers_size + body_bytes.len();
        Ok(HttpResponse {
            status,
            body: String::from_utf8_lossy(&body_bytes).into_owned(),
            size,
        })
    }
}
