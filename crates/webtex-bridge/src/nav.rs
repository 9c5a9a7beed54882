//! Navigation hook filtering.

/// What to do with an outgoing navigation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDecision {
    /// The URL matched the hook pattern: divert into the host callback
    /// and cancel default navigation.
    Hook,
    /// No match: let the engine navigate as usual.
    PassThrough,
}

/// Matches navigation targets against a host-configured substring.
///
/// Matching is plain case-sensitive containment; no globs, no regex.
/// At most one hook is active per session and replacing it discards the
/// previous one.
#[derive(Debug, Default)]
pub struct NavigationFilter {
    hook: Option<String>,
}

impl NavigationFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or replace the hook pattern. `None` disables hooking.
    pub fn set_hook(&mut self, pattern: Option<String>) {
        self.hook = pattern.filter(|p| !p.is_empty());
    }

    pub fn hook(&self) -> Option<&str> {
        self.hook.as_deref()
    }

    pub fn decide(&self, url: &str) -> NavDecision {
        match &self.hook {
            Some(pattern) if url.contains(pattern.as_str()) => NavDecision::Hook,
            _ => NavDecision::PassThrough,
        }
    }
}
