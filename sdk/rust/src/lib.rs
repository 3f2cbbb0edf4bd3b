//! Client SDK for the cache gateway.

mod client;

pub use client::{
    CachedData, ClientError, GatewayClient, HealthStatus, ProcessRequest, ProcessedData,
};
