// Gateway module for session - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod manager;
mod state;

// Public re-exports - the ONLY way to access session functionality
pub use manager::SessionManager;
pub use state::{Credential, Session};
