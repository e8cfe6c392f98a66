// Gateway module for transport - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod client;
mod traits;
mod types;

// Public re-exports - the ONLY way to access transport functionality
pub use client::HttpTransport;
pub use traits::{PushEvent, PushStream, Transport};
pub use types::{MessagePayload, RawInboundMessage};

#[cfg(test)]
pub use traits::MockTransport;
