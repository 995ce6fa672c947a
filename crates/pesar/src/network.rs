//! Network filter: declarative request blocking.
//!
//! A `Blocklist` holds an ordered set of ad/tracking domain glob patterns
//! plus a catch-all keyword rule. Matching requests are forced to fail before
//! they reach the network; keyword matches are destroyed mid-flight. Blocking
//! is best-effort and silent: no error ever surfaces to the caller.

use serde::{Deserialize, Serialize};

/// Ad/tracking domains blocked for the lifetime of every test case.
///
/// Registered before the catch-all keyword rule; order is preserved.
pub const BLOCKED_DOMAINS: [&str; 34] = [
    "**/googlesyndication.com/**",
    "**/googletagmanager.com/**",
    "**/google-analytics.com/**",
    "**/googleadservices.com/**",
    "**/doubleclick.net/**",
    "**/adsystem.com/**",
    "**/ads.yahoo.com/**",
    "**/facebook.com/tr**",
    "**/connect.facebook.net/**",
    "**/outbrain.com/**",
    "**/taboola.com/**",
    "**/amazon-adsystem.com/**",
    "**/media.net/**",
    "**/criteo.com/**",
    "**/adsafeprotected.com/**",
    "**/scorecardresearch.com/**",
    "**/comscore.com/**",
    "**/quantserve.com/**",
    "**/rlcdn.com/**",
    "**/rubiconproject.com/**",
    "**/pubmatic.com/**",
    "**/openx.com/**",
    "**/contextweb.com/**",
    "**/advertising.com/**",
    "**/adsnx.com/**",
    "**/exponential.com/**",
    "**/smartadserver.com/**",
    "**/yieldmo.com/**",
    "**/sharethrough.com/**",
    "**/sonobi.com/**",
    "**/spotxchange.com/**",
    "**/springserve.com/**",
    "**/telaria.com/**",
    "**/undertone.com/**",
];

/// Keywords checked against the lower-cased URL of every other request
pub const AD_KEYWORDS: [&str; 5] = [
    "ads",
    "tracking",
    "analytics",
    "doubleclick",
    "googlesyndication",
];

/// Reasons for aborting a network request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbortReason {
    /// Request failed with a generic network error
    Failed,
    /// Request was aborted mid-flight
    Aborted,
    /// Request was blocked by the client
    BlockedByClient,
}

impl AbortReason {
    /// Get the wire-level error string for this abort reason
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Failed => "net::ERR_FAILED",
            Self::Aborted => "net::ERR_ABORTED",
            Self::BlockedByClient => "net::ERR_BLOCKED_BY_CLIENT",
        }
    }
}

/// Pattern for matching request URLs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrlPattern {
    /// Exact URL match
    Exact(String),
    /// Prefix match
    Prefix(String),
    /// Contains substring
    Contains(String),
    /// Glob pattern (e.g., `**/doubleclick.net/**`)
    Glob(String),
    /// Match any URL
    Any,
}

impl UrlPattern {
    /// Check if a URL matches this pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(pattern) => url == pattern,
            Self::Prefix(pattern) => url.starts_with(pattern),
            Self::Contains(pattern) => url.contains(pattern),
            Self::Glob(pattern) => Self::glob_matches(pattern, url),
            Self::Any => true,
        }
    }

    /// Simple glob matching for URLs
    fn glob_matches(pattern: &str, url: &str) -> bool {
        let parts: Vec<&str> = pattern.split('*').collect();
        if parts.is_empty() {
            return url.is_empty();
        }

        let mut pos = 0;
        for (i, part) in parts.iter().enumerate() {
            if part.is_empty() {
                continue;
            }
            if let Some(found) = url[pos..].find(part) {
                if i == 0 && found != 0 {
                    return false;
                }
                pos += found + part.len();
            } else {
                return false;
            }
        }

        // A trailing * accepts any remainder; otherwise the URL must be
        // fully consumed.
        pattern.ends_with('*') || pos == url.len()
    }
}

/// Outcome of the blocking decision for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockDecision {
    /// A blocked-domain pattern matched: force a network error
    ForceNetworkError,
    /// An ad keyword matched the lower-cased URL: destroy the request
    Destroy,
    /// Let the request through
    Allow,
}

impl BlockDecision {
    /// Whether the request is prevented from reaching the network
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        !matches!(self, Self::Allow)
    }

    /// CDP abort reason for a blocked request
    #[must_use]
    pub const fn abort_reason(&self) -> Option<AbortReason> {
        match self {
            Self::ForceNetworkError => Some(AbortReason::Failed),
            Self::Destroy => Some(AbortReason::Aborted),
            Self::Allow => None,
        }
    }
}

/// Ordered blocked-pattern set plus the catch-all keyword rule.
///
/// Static for the life of a process; never mutated during a test run.
#[derive(Debug, Clone)]
pub struct Blocklist {
    patterns: Vec<UrlPattern>,
    keywords: Vec<String>,
}

impl Default for Blocklist {
    fn default() -> Self {
        Self {
            patterns: BLOCKED_DOMAINS
                .iter()
                .map(|p| UrlPattern::Glob((*p).to_string()))
                .collect(),
            keywords: AD_KEYWORDS.iter().map(|k| (*k).to_string()).collect(),
        }
    }
}

impl Blocklist {
    /// The built-in blocked-pattern set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty blocklist (nothing blocked)
    #[must_use]
    pub fn none() -> Self {
        Self {
            patterns: Vec::new(),
            keywords: Vec::new(),
        }
    }

    /// Registered domain patterns, in registration order
    #[must_use]
    pub fn patterns(&self) -> &[UrlPattern] {
        &self.patterns
    }

    /// Keywords for the catch-all rule
    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Add a domain glob pattern
    pub fn add_pattern(&mut self, pattern: impl Into<String>) {
        self.patterns.push(UrlPattern::Glob(pattern.into()));
    }

    /// Decide the fate of one outbound request.
    ///
    /// Domain patterns are consulted first (registration order), then the
    /// keyword rule against the lower-cased URL.
    #[must_use]
    pub fn decide(&self, url: &str) -> BlockDecision {
        for pattern in &self.patterns {
            if pattern.matches(url) {
                return BlockDecision::ForceNetworkError;
            }
        }

        let lowered = url.to_lowercase();
        if self.keywords.iter().any(|k| lowered.contains(k.as_str())) {
            return BlockDecision::Destroy;
        }

        BlockDecision::Allow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod pattern_tests {
        use super::*;

        #[test]
        fn test_glob_domain_match() {
            let pattern = UrlPattern::Glob("**/doubleclick.net/**".to_string());
            assert!(pattern.matches("https://doubleclick.net/ddm/adj/x"));
            assert!(!pattern.matches("https://example.com/page"));
        }

        #[test]
        fn test_glob_matches_path_segments_exactly() {
            // Same segment semantics as the reference matcher: a subdomain
            // host is a different segment and does not match.
            let pattern = UrlPattern::Glob("**/doubleclick.net/**".to_string());
            assert!(!pattern.matches("https://ad.doubleclick.net/ddm/adj/x"));
        }

        #[test]
        fn test_glob_trailing_wildcard() {
            let pattern = UrlPattern::Glob("**/facebook.com/tr**".to_string());
            assert!(pattern.matches("https://facebook.com/tr?id=1"));
            assert!(!pattern.matches("https://facebook.com/profile"));
        }

        #[test]
        fn test_exact_and_prefix() {
            assert!(UrlPattern::Exact("https://a/b".to_string()).matches("https://a/b"));
            assert!(UrlPattern::Prefix("https://a/".to_string()).matches("https://a/b"));
            assert!(!UrlPattern::Prefix("https://a/".to_string()).matches("http://a/b"));
        }

        #[test]
        fn test_any_matches_everything() {
            assert!(UrlPattern::Any.matches(""));
            assert!(UrlPattern::Any.matches("https://anything"));
        }
    }

    mod decision_tests {
        use super::*;

        #[test]
        fn test_blocked_domain_forces_network_error() {
            let blocklist = Blocklist::new();
            // "taboola" is not in the keyword list, so only the domain rule
            // can block this.
            assert_eq!(
                blocklist.decide("https://taboola.com/recommendations.js"),
                BlockDecision::ForceNetworkError
            );
        }

        #[test]
        fn test_subdomain_falls_through_to_keyword_rule() {
            let blocklist = Blocklist::new();
            // The domain globs match path segments exactly; a subdomain host
            // is caught by the keyword rule instead.
            assert_eq!(
                blocklist.decide("https://pagead2.googlesyndication.com/pagead/js/adsbygoogle.js"),
                BlockDecision::Destroy
            );
        }

        #[test]
        fn test_keyword_destroys_request() {
            let blocklist = Blocklist::new();
            // No domain pattern matches, but the lower-cased URL contains
            // a keyword.
            assert_eq!(
                blocklist.decide("https://cdn.example.com/Tracking/pixel.gif"),
                BlockDecision::Destroy
            );
        }

        #[test]
        fn test_keyword_check_is_case_insensitive() {
            let blocklist = Blocklist::new();
            assert_eq!(
                blocklist.decide("https://example.com/ADS/banner.js"),
                BlockDecision::Destroy
            );
        }

        #[test]
        fn test_clean_request_allowed() {
            let blocklist = Blocklist::new();
            assert_eq!(
                blocklist.decide("https://practice.expandtesting.com/bmi"),
                BlockDecision::Allow
            );
        }

        #[test]
        fn test_domain_rule_wins_over_keyword_rule() {
            let blocklist = Blocklist::new();
            // Matches both a domain pattern and a keyword; the domain rule
            // is registered first.
            assert_eq!(
                blocklist.decide("https://doubleclick.net/r/collect"),
                BlockDecision::ForceNetworkError
            );
        }

        #[test]
        fn test_empty_blocklist_allows_all() {
            let blocklist = Blocklist::none();
            assert_eq!(
                blocklist.decide("https://ad.doubleclick.net/x"),
                BlockDecision::Allow
            );
        }

        #[test]
        fn test_abort_reasons() {
            assert_eq!(
                BlockDecision::ForceNetworkError.abort_reason(),
                Some(AbortReason::Failed)
            );
            assert_eq!(
                BlockDecision::Destroy.abort_reason(),
                Some(AbortReason::Aborted)
            );
            assert_eq!(BlockDecision::Allow.abort_reason(), None);
        }

        #[test]
        fn test_abort_reason_messages() {
            assert_eq!(AbortReason::Failed.message(), "net::ERR_FAILED");
            assert_eq!(
                AbortReason::BlockedByClient.message(),
                "net::ERR_BLOCKED_BY_CLIENT"
            );
        }
    }

    proptest! {
        /// Every URL landing on a blocked domain is never allowed through.
        #[test]
        fn prop_blocked_domains_never_reach_network(path in "[a-z0-9/]{0,20}") {
            let blocklist = Blocklist::new();
            for domain in ["doubleclick.net", "googlesyndication.com", "taboola.com"] {
                let url = format!("https://{domain}/{path}");
                prop_assert!(blocklist.decide(&url).is_blocked());
            }
        }

        /// Decisions are deterministic.
        #[test]
        fn prop_decision_is_stable(url in "[ -~]{0,60}") {
            let blocklist = Blocklist::new();
            prop_assert_eq!(blocklist.decide(&url), blocklist.decide(&url));
        }
    }
}
