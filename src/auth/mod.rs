//! Authentication module
//!
//! Answers "who is making this request" for the write path. Session issuance
//! (login/logout) belongs to the surrounding platform; this service only
//! resolves an existing session token carried in a cookie.

mod session;

pub use session::SessionUserService;

use hyper::HeaderMap;

/// An authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub email: String,
}

/// Session lookup seam
pub trait UserService: Send + Sync {
    /// The logged-in user behind `headers`, if any
    fn current_user(&self, headers: &HeaderMap) -> Option<User>;
}
