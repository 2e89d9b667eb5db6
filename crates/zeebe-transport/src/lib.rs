//! Gateway abstraction layer for the Zeebe client
//!
//! The SDK never talks to the wire itself. Everything it needs from the
//! orchestration service goes through the [`Gateway`] trait, one async method
//! per RPC, so any generated gRPC client (or a test double) can be plugged in.
//!
//! # Architecture
//!
//! - **Gateway trait**: "invoke RPC(request) → response or error"
//! - **Types**: request/response values exchanged with the gateway

#![deny(unsafe_code)]
#![warn(missing_docs)]
//! - **Error handling**: [`TransportError`] with gRPC-style status [`Code`]s
//! - **Retry classification**: [`DefaultFailureDecision`] for transport errors
//! - **Testing**: [`testing::MockGateway`], an in-memory gateway with scripted replies
//!
//! # Usage
//!
//! ```ignore
//! use zeebe_transport::{Gateway, types::DeployResourceRequest};
//!
//! let gateway: Arc<dyn Gateway> = Arc::new(MyGrpcGateway::connect(addr).await?);
//! let response = gateway.deploy_resource(DeployResourceRequest::default()).await?;
//! ```

pub mod error;
pub mod retry;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{Code, Result, TransportError};
pub use retry::DefaultFailureDecision;
pub use traits::Gateway;
