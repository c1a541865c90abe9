pub mod password;
pub mod token;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session_token";
