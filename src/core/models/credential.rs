use std::fmt;

pub const SESSION_KEY: &str = "sessionKey";
pub const CF_CLEARANCE: &str = "cf_clearance";

/// Session cookies for claude.ai, as stored in `CLAUDE_SESSION_COOKIE`.
///
/// The string form is a cookie header value: `sessionKey=...; cf_clearance=...`.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredential {
    pub session_key: String,
    /// Cloudflare clearance cookie; without it the bot challenge is likely.
    pub cf_clearance: Option<String>,
    extra: Vec<(String, String)>,
}

impl SessionCredential {
    pub fn new(session_key: impl Into<String>, cf_clearance: Option<String>) -> Self {
        Self {
            session_key: session_key.into(),
            cf_clearance,
            extra: Vec::new(),
        }
    }

    /// Parse a cookie header value. Returns `None` when there is no `sessionKey` pair.
    pub fn parse(cookie: &str) -> Option<Self> {
        let mut session_key = None;
        let mut cf_clearance = None;
        let mut extra = Vec::new();

        for part in cookie.trim().split("; ") {
            let Some((name, value)) = part.split_once('=') else {
                continue;
            };
            let name = name.trim();
            match name {
                SESSION_KEY => session_key = Some(value.to_string()),
                CF_CLEARANCE => cf_clearance = Some(value.to_string()),
                "" => {}
                _ => extra.push((name.to_string(), value.to_string())),
            }
        }

        let session_key = session_key.filter(|k| !k.is_empty())?;
        Some(Self {
            session_key,
            cf_clearance: cf_clearance.filter(|c| !c.is_empty()),
            extra,
        })
    }

    /// Name/value pairs in header order: `sessionKey`, `cf_clearance`, then the rest.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs = vec![(SESSION_KEY, self.session_key.as_str())];
        if let Some(cf) = &self.cf_clearance {
            pairs.push((CF_CLEARANCE, cf.as_str()));
        }
        pairs.extend(self.extra.iter().map(|(n, v)| (n.as_str(), v.as_str())));
        pairs
    }

    pub fn header_value(&self) -> String {
        self.pairs()
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// First characters of the session key, for confirmation output.
    pub fn session_key_preview(&self, len: usize) -> String {
        let prefix: String = self.session_key.chars().take(len).collect();
        format!("{}...", prefix)
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredential")
            .field("session_key", &"[REDACTED]")
            .field("cf_clearance", &self.cf_clearance.as_ref().map(|_| "[REDACTED]"))
            .field("extra", &self.extra.len())
            .finish()
    }
}
