/// Constants module to avoid magic numbers in the codebase

// Network Configuration
pub const DEFAULT_BASE_URL: &str = "http://localhost:3100";
pub const DEFAULT_APPLICATION_ID: &str = "default";
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 3;

// Delivery Configuration
pub const PULL_INTERVAL_MS: u64 = 2000;
pub const PUSH_EVENT_BUFFER: usize = 64;

// Message Classification
pub const BOT_AUTHOR_MARKERS: &[&str] = &["bot", "system", "assistant"];
pub const DIRECTION_OUTGOING: &str = "outgoing";
pub const DIRECTION_INCOMING: &str = "incoming";
pub const PAYLOAD_TYPE_TEXT: &str = "text";

// Transcript Copy
pub const WELCOME_MESSAGE_ID: &str = "welcome";
pub const WELCOME_MESSAGE_TEXT: &str =
    "Hello! I'm your assistant. Ask me anything.";
pub const SEND_FAILURE_TEXT: &str =
    "Sorry, I couldn't get a response from the bot. Please try again.";
