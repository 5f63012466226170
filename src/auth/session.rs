// Cookie session lookup
// Maps the session cookie value to a user email via a static table

use hyper::header::COOKIE;
use hyper::HeaderMap;
use std::collections::HashMap;

use super::{User, UserService};
use crate::config::{AuthConfig, SessionEntry};

pub struct SessionUserService {
    cookie_name: String,
    sessions: HashMap<String, String>,
}

impl SessionUserService {
    pub fn new(cookie_name: impl Into<String>, sessions: HashMap<String, String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            sessions,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        let sessions = config
            .sessions
            .iter()
            .map(|s: &SessionEntry| (s.token.clone(), s.email.clone()))
            .collect();
        Self::new(config.cookie_name.clone(), sessions)
    }

    /// Find our cookie among all `Cookie` headers
    fn session_token<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie_name)
            .map(|(_, value)| value.trim_matches('"'))
            .filter(|value| !value.is_empty())
    }
}

impl UserService for SessionUserService {
    fn current_user(&self, headers: &HeaderMap) -> Option<User> {
        let token = self.session_token(headers)?;
        self.sessions.get(token).map(|email| User {
            email: email.clone(),
        })
    }
}
