//! Transport-free request made of raw header pairs
//!
//! Useful where requests arrive as `(name, value)` pairs rather than as
//! `http::Request`, and in tests.
//!
//! # Example
//!
//! ```
//! use authgate_http_auth::{GatedRequest, HeaderList};
//!
//! let request = HeaderList::new(vec![("authorization".to_string(), "Bearer t".to_string())]);
//! assert_eq!(request.header("Authorization"), Some("Bearer t"));
//! ```

use crate::{AuthContext, GatedRequest};

/// List of `(name, value)` header pairs plus the context the gate attaches
#[derive(Debug, Clone, Default)]
pub struct HeaderList {
    headers: Vec<(String, String)>,
    context: Option<AuthContext>,
}

impl HeaderList {
    pub fn new(headers: Vec<(String, String)>) -> Self {
        Self {
            headers,
            context: None,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.context.as_ref().map(|c| c.user_id.as_str())
    }
}

impl GatedRequest for HeaderList {
    /// Header names compare case-insensitively; the first match wins
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn set_user_id(&mut self, user_id: String) {
        self.context = Some(AuthContext { user_id });
    }
}
