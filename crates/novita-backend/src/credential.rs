/// Which key a backend request is signed with.
///
/// Priority follows what the product routes need: a signed-in user's token
/// (so row-level security sees the user), then the service role key for
/// administrative access, then the public anonymous key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential<'a> {
    /// User access token, sent as the bearer alongside the anonymous `apikey`.
    User(&'a str),
    /// Service role key, sent as both `apikey` and bearer.
    Service,
    /// Anonymous key, sent as both `apikey` and bearer.
    Anonymous,
}

impl<'a> Credential<'a> {
    #[must_use]
    pub fn select(user_token: Option<&'a str>, has_service_key: bool) -> Self {
        match user_token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => Credential::User(token),
            None if has_service_key => Credential::Service,
            None => Credential::Anonymous,
        }
    }

    /// Short label for logs; never includes the secret itself.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Credential::User(_) => "user",
            Credential::Service => "service",
            Credential::Anonymous => "anonymous",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_token_wins_over_service_key() {
        assert_eq!(
            Credential::select(Some("jwt"), true),
            Credential::User("jwt")
        );
    }

    #[test]
    fn service_key_used_without_user_token() {
        assert_eq!(Credential::select(None, true), Credential::Service);
    }

    #[test]
    fn anonymous_is_the_last_resort() {
        assert_eq!(Credential::select(None, false), Credential::Anonymous);
    }

    #[test]
    fn blank_user_token_is_ignored() {
        assert_eq!(Credential::select(Some("  "), false), Credential::Anonymous);
    }

    #[test]
    fn kind_labels_do_not_leak_tokens() {
        assert_eq!(Credential::User("secret-jwt").kind(), "user");
    }
}
