//! Request routing layer: an ordered table of rewrite rules mapping stable
//! client-facing paths to backend paths. Exact rules are listed before
//! wildcard rules so `/api/auth/signin` is never shadowed by `/api/:path*`.
//! The backend host is injected from configuration, which keeps the resolver
//! and session manager on environment-independent paths.

use std::collections::HashMap;

use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `:name` — captures a single path segment.
    Param(String),
    /// `:name*` — captures the remaining path; only valid as the last segment.
    Wildcard(String),
}

#[derive(Clone, Debug)]
struct Rule {
    source: Vec<Segment>,
    target: Vec<Segment>,
}

impl Rule {
    fn new(source: &str, target: &str) -> Self {
        Self {
            source: parse_pattern(source),
            target: parse_pattern(target),
        }
    }

    /// Matches the rule against path segments, returning captured parameters.
    fn matches(&self, segments: &[&str]) -> Option<HashMap<String, String>> {
        let mut params = HashMap::new();
        let mut index = 0;

        for part in &self.source {
            match part {
                Segment::Literal(literal) => {
                    if segments.get(index) != Some(&literal.as_str()) {
                        return None;
                    }
                    index += 1;
                }
                Segment::Param(name) => {
                    let value = segments.get(index)?;
                    params.insert(name.clone(), (*value).to_string());
                    index += 1;
                }
                Segment::Wildcard(name) => {
                    // Zero remaining segments is still a match, like `/api/:path*`
                    // matching `/api`.
                    params.insert(name.clone(), segments[index..].join("/"));
                    return Some(params);
                }
            }
        }

        if index == segments.len() {
            Some(params)
        } else {
            None
        }
    }

    fn render(&self, params: &HashMap<String, String>) -> String {
        let mut rendered = Vec::with_capacity(self.target.len());
        for part in &self.target {
            match part {
                Segment::Literal(literal) => rendered.push(literal.clone()),
                Segment::Param(name) | Segment::Wildcard(name) => {
                    if let Some(value) = params.get(name) {
                        if !value.is_empty() {
                            rendered.push(value.clone());
                        }
                    }
                }
            }
        }
        format!("/{}", rendered.join("/"))
    }
}

fn parse_pattern(pattern: &str) -> Vec<Segment> {
    pattern
        .split('/')
        .filter(|part| !part.is_empty())
        .map(|part| {
            if let Some(name) = part.strip_prefix(':') {
                if let Some(name) = name.strip_suffix('*') {
                    Segment::Wildcard(name.to_string())
                } else {
                    Segment::Param(name.to_string())
                }
            } else {
                Segment::Literal(part.to_string())
            }
        })
        .collect()
}

/// Ordered rewrite table; the first matching rule wins.
#[derive(Clone, Debug)]
pub struct RouteTable {
    base: String,
    rules: Vec<Rule>,
}

impl RouteTable {
    /// Builds the default table for a backend base URL (no trailing slash).
    pub fn new(base: &str) -> Self {
        let mut table = Self {
            base: base.trim_end_matches('/').to_string(),
            rules: Vec::new(),
        };

        // Exact auth endpoints first so they are not shadowed by `/api/:path*`.
        table.push("/api/auth/signin", "/auth/signin");
        table.push("/api/auth/verify", "/auth/verify");
        table.push("/api/auth/forgot", "/auth/forgot");
        table.push("/api/auth/reset-password", "/auth/reset-password");
        table.push("/api/auth/verify-token/:token", "/auth/verify-token/:token");

        // General API passthrough.
        table.push("/api/:path*", "/api/:path*");

        // Auth endpoints that keep their backend path verbatim.
        table.push("/auth/me", "/auth/me");
        table.push("/auth/signup", "/auth/signup");
        table.push("/auth/signout", "/auth/signout");
        table.push("/auth/google/:path*", "/auth/google/:path*");

        table
    }

    /// Appends a rule; later rules only apply when earlier ones do not match.
    pub fn push(&mut self, source: &str, target: &str) {
        self.rules.push(Rule::new(source, target));
    }

    /// Rewrites a client-facing path into a full backend URL. Unmatched
    /// paths are forwarded to the base URL unchanged.
    pub fn rewrite(&self, path: &str) -> String {
        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path, None),
        };
        let segments: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();

        let rewritten = self
            .rules
            .iter()
            .find_map(|rule| rule.matches(&segments).map(|params| rule.render(&params)))
            .unwrap_or_else(|| path.to_string());

        debug!("rewrite {path} -> {rewritten}");

        match query {
            Some(query) => format!("{}{}?{query}", self.base, rewritten),
            None => format!("{}{}", self.base, rewritten),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://backend.local:4000";

    #[test]
    fn exact_rule_beats_wildcard() {
        let table = RouteTable::new(BASE);
        assert_eq!(
            table.rewrite("/api/auth/signin"),
            format!("{BASE}/auth/signin")
        );
    }

    #[test]
    fn wildcard_forwards_api_paths() {
        let table = RouteTable::new(BASE);
        assert_eq!(table.rewrite("/api/jobs/123"), format!("{BASE}/api/jobs/123"));
        assert_eq!(table.rewrite("/api/admin/me"), format!("{BASE}/api/admin/me"));
    }

    #[test]
    fn path_parameter_is_substituted() {
        let table = RouteTable::new(BASE);
        assert_eq!(
            table.rewrite("/api/auth/verify-token/abc123"),
            format!("{BASE}/auth/verify-token/abc123")
        );
    }

    #[test]
    fn auth_endpoints_pass_through() {
        let table = RouteTable::new(BASE);
        assert_eq!(table.rewrite("/auth/me"), format!("{BASE}/auth/me"));
        assert_eq!(table.rewrite("/auth/signup"), format!("{BASE}/auth/signup"));
        assert_eq!(
            table.rewrite("/auth/google/callback"),
            format!("{BASE}/auth/google/callback")
        );
    }

    #[test]
    fn unmatched_path_falls_back_to_base() {
        let table = RouteTable::new(BASE);
        assert_eq!(table.rewrite("/health"), format!("{BASE}/health"));
    }

    #[test]
    fn query_string_is_preserved() {
        let table = RouteTable::new(BASE);
        assert_eq!(
            table.rewrite("/api/jobs?page=2"),
            format!("{BASE}/api/jobs?page=2")
        );
    }

    #[test]
    fn trailing_base_slash_is_trimmed() {
        let table = RouteTable::new("http://backend.local:4000/");
        assert_eq!(table.rewrite("/auth/me"), format!("{BASE}/auth/me"));
    }

    #[test]
    fn param_rule_requires_segment() {
        let table = RouteTable::new(BASE);
        // No token segment: falls through to the `/api/:path*` wildcard.
        assert_eq!(
            table.rewrite("/api/auth/verify-token"),
            format!("{BASE}/api/auth/verify-token")
        );
    }
}
