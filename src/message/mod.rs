// Gateway module for message - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod classifier;
mod normalized;

// Public re-exports - the ONLY way to access message functionality
pub use classifier::classify;
pub use normalized::NormalizedMessage;
