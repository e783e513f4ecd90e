//! Dashboard session context.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Authentication state handed to every view that needs it.
///
/// An absent or `false` flag means the user has to log in first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub authenticated: bool,
}

impl Session {
    pub fn authenticated() -> Self {
        Self { authenticated: true }
    }

    /// Gate for dashboard views.
    pub fn require(&self) -> Result<()> {
        if self.authenticated {
            Ok(())
        } else {
            Err(Error::AuthenticationRequired)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_session_is_locked() {
        assert!(matches!(
            Session::default().require(),
            Err(Error::AuthenticationRequired)
        ));
        assert!(Session::authenticated().require().is_ok());
    }

    #[test]
    fn test_missing_flag_deserializes_as_locked() {
        let session: Session = serde_json::from_str("{}").unwrap();
        assert!(!session.authenticated);
    }
}
