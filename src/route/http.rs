use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use crate::route::client::{RouteTransport, TransportError};
use crate::route::model::{Route, RouteRequest};

/// Posts route requests as JSON to the routing service.
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent("starmap-view/0.1")
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(HttpTransport {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RouteTransport for HttpTransport {
    async fn fetch(&self, request: &RouteRequest) -> Result<Route, TransportError> {
        debug!("POST {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        response
            .json::<Route>()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}
