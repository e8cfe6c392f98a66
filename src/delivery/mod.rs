// Gateway module for delivery - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod channel;
mod sink;

// Public re-exports - the ONLY way to access delivery functionality
pub use channel::{DeliveryChannel, DeliveryHandle};
pub use sink::{ErrorCallback, MessageCallback};
