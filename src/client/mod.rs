//! Remote timer resource clients
//!
//! The engine only sees the `TimerClient` trait. `HttpTimerClient` talks to
//! the real REST store; `InMemoryTimerClient` is an in-process authority whose
//! clock is advanced by hand.

pub mod http;
pub mod memory;

use async_trait::async_trait;

use crate::{
    error::ClientError,
    state::{Timer, TimerId},
};

pub use http::HttpTimerClient;
pub use memory::InMemoryTimerClient;

/// Request/response access to the authoritative timer store
#[async_trait]
pub trait TimerClient: Send + Sync {
    async fn create(&self, duration_seconds: u32) -> Result<Timer, ClientError>;

    /// Snapshot fetch used by polling
    async fn get(&self, id: &TimerId) -> Result<Timer, ClientError>;

    async fn start(&self, id: &TimerId) -> Result<Timer, ClientError>;

    async fn pause(&self, id: &TimerId) -> Result<Timer, ClientError>;

    async fn resume(&self, id: &TimerId) -> Result<Timer, ClientError>;

    async fn reset(&self, id: &TimerId) -> Result<Timer, ClientError>;

    async fn delete(&self, id: &TimerId) -> Result<(), ClientError>;
}
