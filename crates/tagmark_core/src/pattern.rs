use std::fmt;
use std::str::FromStr;

use url::Url;

/// Browser-style match pattern such as `https://*.example.com/*`.
///
/// - scheme: `*` (http or https), `http` or `https`
/// - host: `*`, `*.domain` (domain and subdomains) or an exact host
/// - path: glob where `*` matches any run of characters, checked against the
///   URL path followed by `?query` when present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlPattern {
    raw: String,
    scheme: SchemeRule,
    host: HostRule,
    path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SchemeRule {
    AnyWeb,
    Exact(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum HostRule {
    Any,
    Domain(String),
    Exact(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("pattern {0:?} is missing '://'")]
    MissingScheme(String),
    #[error("pattern {0:?} has unsupported scheme")]
    UnsupportedScheme(String),
    #[error("pattern {0:?} has an empty or invalid host")]
    InvalidHost(String),
    #[error("pattern {0:?} must have a path starting with '/'")]
    MissingPath(String),
}

impl UrlPattern {
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let trimmed = raw.trim();
        let (scheme, rest) = trimmed
            .split_once("://")
            .ok_or_else(|| PatternError::MissingScheme(raw.to_string()))?;
        let scheme = match scheme {
            "*" => SchemeRule::AnyWeb,
            "http" | "https" => SchemeRule::Exact(scheme.to_string()),
            _ => return Err(PatternError::UnsupportedScheme(raw.to_string())),
        };
        let slash = rest
            .find('/')
            .ok_or_else(|| PatternError::MissingPath(raw.to_string()))?;
        let (host, path) = rest.split_at(slash);
        let host = host.to_ascii_lowercase();
        let host = if host == "*" {
            HostRule::Any
        } else if let Some(domain) = host.strip_prefix("*.") {
            if domain.is_empty() || domain.contains('*') {
                return Err(PatternError::InvalidHost(raw.to_string()));
            }
            HostRule::Domain(domain.to_string())
        } else if host.is_empty() || host.contains('*') {
            return Err(PatternError::InvalidHost(raw.to_string()));
        } else {
            HostRule::Exact(host)
        };

        Ok(Self {
            raw: trimmed.to_string(),
            scheme,
            host,
            path: path.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, url: &str) -> bool {
        Url::parse(url).is_ok_and(|url| self.matches_url(&url))
    }

    pub fn matches_url(&self, url: &Url) -> bool {
        let scheme_ok = match &self.scheme {
            SchemeRule::AnyWeb => matches!(url.scheme(), "http" | "https"),
            SchemeRule::Exact(scheme) => url.scheme() == scheme,
        };
        if !scheme_ok {
            return false;
        }
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        let host_ok = match &self.host {
            HostRule::Any => true,
            HostRule::Domain(domain) => host_in_domain(&host, domain),
            HostRule::Exact(exact) => &host == exact,
        };
        if !host_ok {
            return false;
        }
        let mut target = url.path().to_string();
        if let Some(query) = url.query() {
            target.push('?');
            target.push_str(query);
        }
        glob_match(&self.path, &target)
    }
}

impl FromStr for UrlPattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// True when `url` matches at least one of `patterns`.
pub fn matches_any(patterns: &[UrlPattern], url: &Url) -> bool {
    patterns.iter().any(|pattern| pattern.matches_url(url))
}

/// `host` equals `domain` or is a subdomain of it.
pub fn host_in_domain(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

fn glob_match(pattern: &str, text: &str) -> bool {
    let p = pattern.as_bytes();
    let t = text.as_bytes();
    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<usize> = None;
    let mut resume = 0;

    while ti < t.len() {
        if pi < p.len() && p[pi] == b'*' {
            star = Some(pi);
            pi += 1;
            resume = ti;
        } else if pi < p.len() && p[pi] == t[ti] {
            pi += 1;
            ti += 1;
        } else if let Some(star_at) = star {
            pi = star_at + 1;
            resume += 1;
            ti = resume;
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|&b| b == b'*')
}
