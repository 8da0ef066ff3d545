//! Route inclusion rules.
//!
//! A route is selected by the first rule that either lists it in `include`, or
//! matches its domain and uri against the rule's wildcard patterns without listing
//! it in `exclude`. The selecting rule's `apply` section travels with the route.

use super::RawRoute;
use crate::config::{RouteApply, RouteRule};
use anyhow::{Context, Result};
use log::debug;
use regex::Regex;

/// A route chosen for documentation together with the rule values to apply
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedRoute {
    pub route: RawRoute,
    pub apply: RouteApply,
}

/// Applies the configured `routes` rules to a route list.
pub struct RouteMatcher {
    rules: Vec<CompiledRule>,
}

struct CompiledRule {
    domains: Vec<Regex>,
    prefixes: Vec<Regex>,
    rule: RouteRule,
}

/// Compiles a `*` wildcard pattern into an anchored regex.
pub fn wildcard(pattern: &str) -> Result<Regex, regex::Error> {
    let escaped: Vec<String> = pattern.split('*').map(regex::escape).collect();
    Regex::new(&format!("^{}$", escaped.join(".*")))
}

impl CompiledRule {
    fn new(rule: &RouteRule) -> Result<Self> {
        let compile = |patterns: &[String]| -> Result<Vec<Regex>> {
            patterns
                .iter()
                .map(|p| wildcard(p).with_context(|| format!("Invalid route pattern: {}", p)))
                .collect()
        };
        Ok(Self {
            domains: compile(&rule.matches.domains)?,
            prefixes: compile(&rule.matches.prefixes)?,
            rule: rule.clone(),
        })
    }

    fn selects(&self, route: &RawRoute) -> bool {
        let key = route.rule_key();
        if self.rule.include.iter().any(|name| name == key) {
            return true;
        }
        if self.rule.exclude.iter().any(|name| name == key) {
            return false;
        }

        let domain = route.domain.as_deref().unwrap_or("");
        let uri = route.uri.trim_start_matches('/');
        self.domains.iter().any(|re| re.is_match(domain))
            && self.prefixes.iter().any(|re| re.is_match(uri))
    }
}

impl RouteMatcher {
    pub fn new(rules: &[RouteRule]) -> Result<Self> {
        Ok(Self {
            rules: rules.iter().map(CompiledRule::new).collect::<Result<_>>()?,
        })
    }

    /// Keeps the routes selected by some rule, in their original order.
    pub fn select(&self, routes: Vec<RawRoute>) -> Vec<MatchedRoute> {
        routes
            .into_iter()
            .filter_map(|route| {
                let rule = self.rules.iter().find(|rule| rule.selects(&route));
                match rule {
                    Some(rule) => Some(MatchedRoute {
                        apply: rule.rule.apply.clone(),
                        route,
                    }),
                    None => {
                        debug!("Route not matched by any rule: {}", route.describe());
                        None
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteMatch;

    fn rule(prefixes: &[&str]) -> RouteRule {
        RouteRule {
            matches: RouteMatch {
                domains: vec!["*".to_string()],
                prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_wildcard() {
        assert!(wildcard("api/*").unwrap().is_match("api/users"));
        assert!(!wildcard("api/*").unwrap().is_match("web/api/users"));
        assert!(wildcard("*").unwrap().is_match(""));
        assert!(wildcard("v1.users").unwrap().is_match("v1.users"));
        assert!(!wildcard("v1.users").unwrap().is_match("v1xusers"));
    }

    #[test]
    fn test_prefix_selection_keeps_order() {
        let matcher = RouteMatcher::new(&[rule(&["api/*"])]).unwrap();
        let routes = vec![
            RawRoute::new("api/users", &["GET"], "U@i"),
            RawRoute::new("home", &["GET"], "H@i"),
            RawRoute::new("/api/orders", &["GET"], "O@i"),
        ];

        let selected = matcher.select(routes);
        let uris: Vec<_> = selected.iter().map(|m| m.route.uri.as_str()).collect();
        assert_eq!(uris, vec!["api/users", "/api/orders"]);
    }

    #[test]
    fn test_include_and_exclude() {
        let mut r = rule(&["api/*"]);
        r.include.push("home".to_string());
        r.exclude.push("api.internal".to_string());
        let matcher = RouteMatcher::new(&[r]).unwrap();

        let mut internal = RawRoute::new("api/internal", &["GET"], "I@i");
        internal.name = Some("api.internal".to_string());
        let routes = vec![RawRoute::new("home", &["GET"], "H@i"), internal];

        let selected = matcher.select(routes);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].route.uri, "home");
    }

    #[test]
    fn test_domain_and_first_rule_wins() {
        let mut admin = rule(&["*"]);
        admin.matches.domains = vec!["admin.*".to_string()];
        admin.apply.headers.insert("X-Admin".to_string(), "1".to_string());
        let mut public = rule(&["*"]);
        public.apply.headers.insert("X-Public".to_string(), "1".to_string());
        let matcher = RouteMatcher::new(&[admin, public]).unwrap();

        let mut on_admin = RawRoute::new("stats", &["GET"], "S@i");
        on_admin.domain = Some("admin.example.com".to_string());
        let plain = RawRoute::new("stats", &["GET"], "S@i");

        let selected = matcher.select(vec![on_admin, plain]);
        assert!(selected[0].apply.headers.contains_key("X-Admin"));
        assert!(selected[1].apply.headers.contains_key("X-Public"));
    }
}
