//! Request and Response models for the sidecar API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{EnqueueRequest, InvalidateRequest, PublishRequest, SetRequest};
pub use responses::{
    BatchResponse, DeleteResponse, EnqueueResponse, ErrorResponse, FlushResponse, GetResponse,
    HealthResponse, InvalidateResponse, PublishResponse, QueryResponse, QueueResponse,
    SetResponse, StatsResponse,
};
