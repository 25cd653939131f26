//! HTTP delivery sink
//!
//! Posts webhook payloads with a blocking `reqwest` client. The timeout is
//! applied per request so one hung endpoint cannot stall a batch.

use log::debug;

use crate::core::ports::{DeliveryRequest, DeliveryResponse, DeliverySink, TransportError};

/// Sink posting over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: reqwest::blocking::Client,
}

impl HttpSink {
    /// Build a sink with a fresh client
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("vistoria/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl DeliverySink for HttpSink {
    fn post(&self, request: &DeliveryRequest) -> Result<DeliveryResponse, TransportError> {
        let mut builder = self
            .client
            .post(&request.url)
            .timeout(request.timeout)
            .json(&request.body);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(request.timeout)
            } else {
                TransportError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response.text().unwrap_or_default();
        debug!("POST {} -> {status}", request.url);
        Ok(DeliveryResponse { status, body })
    }
}
