pub mod app;
pub mod constants;
pub mod delivery;
pub mod message;
pub mod runtime;
pub mod session;
pub mod transport;
pub mod utils;

pub use app::Config;
pub use delivery::{DeliveryChannel, DeliveryHandle};
pub use message::{classify, NormalizedMessage};
pub use runtime::{ChatEvent, ConnectionState, Orchestrator};
pub use session::{Credential, Session, SessionManager};
pub use transport::{HttpTransport, RawInboundMessage, Transport};
pub use utils::{init_logger, ChatError, Result};
