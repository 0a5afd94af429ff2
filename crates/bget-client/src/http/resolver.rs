//! Gateway-backed allocation resolution.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use bget_core::constants::CONNECT_TIMEOUT;
use bget_core::error::{Error, Result};
use bget_core::storage::{Allocation, AllocationResolver};
use bget_core::ticket::AuthTicket;

use super::engine::HttpAllocation;

/// Resolves allocations through the gateway's JSON API.
pub struct HttpResolver {
    client: reqwest::Client,
    gateway: String,
}

impl HttpResolver {
    /// Create a resolver against the given gateway endpoint.
    pub fn new(gateway: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| Error::Transport {
                message: format!("failed to build http client: {}", e),
            })?;
        Ok(Self {
            client,
            gateway: gateway.into().trim_end_matches('/').to_string(),
        })
    }

    fn allocation_url(&self, allocation_id: &str) -> String {
        format!("{}/v1/allocation/{}", self.gateway, allocation_id)
    }
}

#[async_trait]
impl AllocationResolver for HttpResolver {
    type Handle = HttpAllocation;

    async fn resolve(&self, allocation_id: &str) -> Result<HttpAllocation> {
        if allocation_id.is_empty() {
            return Err(Error::Resolution {
                message: "allocation id is empty".to_string(),
            });
        }

        let url = self.allocation_url(allocation_id);
        debug!(url = %url, "fetching allocation");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Resolution {
                message: format!("gateway request failed: {}", e),
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(Error::AllocationNotFound(allocation_id.to_string()));
            }
            status if !status.is_success() => {
                return Err(Error::Resolution {
                    message: format!("gateway returned {}", status),
                });
            }
            _ => {}
        }

        let allocation: Allocation = response.json().await.map_err(|e| Error::Resolution {
            message: format!("invalid allocation payload: {}", e),
        })?;
        if allocation.blobbers.is_empty() {
            return Err(Error::Resolution {
                message: format!("allocation {} has no blobbers", allocation.id),
            });
        }

        Ok(HttpAllocation::new(allocation, self.client.clone()))
    }

    async fn resolve_auth_ticket(&self, ticket: &AuthTicket) -> Result<HttpAllocation> {
        if ticket.is_expired(unix_now()) {
            return Err(Error::InvalidTicket {
                message: "auth ticket has expired".to_string(),
            });
        }
        self.resolve(ticket.allocation_id()).await
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
