//! Route table: registration and lookup.
//!
//! # Responsibilities
//! - Validate and store routes in registration order
//! - Reject overlapping pattern/method pairs
//! - Look up the first route matching a request path and method
//!
//! # Design Decisions
//! - Immutable once serving starts (shared via Arc without locks)
//! - O(n) linear scan; first match wins, never the most specific
//! - Failed bulk registration keeps the routes registered before the failure

use std::sync::Arc;

use axum::http::Method;

use crate::error::{RouteError, RouteResult};
use crate::http::Profile;
use crate::routing::handler::{is_exported, HandlerOwner};
use crate::routing::matcher::{MethodSet, PathPattern};
use crate::routing::route::{CheckDeclarations, Route, RouteDefinition, Target};

/// Handler name recorded for the built-in info route.
pub const INFO_HANDLER: &str = "Handler";

/// Result of scanning the table for a request.
#[derive(Debug)]
pub enum Scan<'a> {
    /// Path and method both matched this route.
    Matched(&'a Route),
    /// At least one pattern matched the path, but none accepted the method.
    MethodMismatch,
    /// No pattern matched the path.
    NotFound,
}

/// Ordered collection of registered routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `definition`, resolve its handler on `owner` and append it.
    pub fn register(
        &mut self,
        definition: &RouteDefinition,
        owner: &dyn HandlerOwner,
    ) -> RouteResult<()> {
        if definition.pattern.is_empty() {
            return Err(RouteError::InvalidRouteDefinition("pattern is empty".into()));
        }
        if definition.methods.is_empty() {
            return Err(RouteError::InvalidRouteDefinition(format!(
                "route `{}` declares no methods",
                definition.pattern
            )));
        }
        if definition.handler.is_empty() {
            return Err(RouteError::InvalidRouteDefinition(format!(
                "route `{}` declares no handler",
                definition.pattern
            )));
        }
        if !is_exported(&definition.handler) {
            return Err(RouteError::HandlerNotExported(definition.handler.clone()));
        }

        let pattern =
            PathPattern::new(&definition.pattern).map_err(|source| RouteError::InvalidPattern {
                pattern: definition.pattern.clone(),
                source,
            })?;
        let methods = MethodSet::parse(&definition.methods).map_err(|reason| {
            RouteError::InvalidRouteDefinition(format!("route `{}`: {}", definition.pattern, reason))
        })?;
        self.ensure_unique(&definition.pattern, &methods)?;

        let handler = owner
            .resolve(&definition.handler)
            .ok_or_else(|| RouteError::HandlerNotFound(definition.handler.clone()))?;

        tracing::debug!(
            pattern = %definition.pattern,
            methods = ?definition.methods,
            handler = %definition.handler,
            checks = definition.checks.len(),
            "Route registered"
        );

        self.routes.push(Route {
            pattern,
            methods,
            handler_name: definition.handler.clone(),
            checks: definition.checks.clone(),
            target: Target::Handler(handler),
        });
        Ok(())
    }

    /// Register each definition in order, stopping at the first failure.
    pub fn register_all(
        &mut self,
        definitions: &[RouteDefinition],
        owner: &dyn HandlerOwner,
    ) -> RouteResult<()> {
        for definition in definitions {
            if let Err(e) = self.register(definition, owner) {
                tracing::error!(
                    pattern = %definition.pattern,
                    registered = self.routes.len(),
                    error = %e,
                    "Route registration failed"
                );
                return Err(e);
            }
        }
        Ok(())
    }

    /// Register the built-in `GET` info route serving `profile`.
    pub fn register_info(&mut self, profile: Arc<Profile>) -> RouteResult<()> {
        if profile.url.is_empty() {
            return Err(RouteError::InvalidRouteDefinition("info url is empty".into()));
        }
        let pattern =
            PathPattern::new(&profile.url).map_err(|source| RouteError::InvalidPattern {
                pattern: profile.url.clone(),
                source,
            })?;
        let methods = MethodSet::parse(&["GET"])
            .map_err(RouteError::InvalidRouteDefinition)?;
        self.ensure_unique(&profile.url, &methods)?;

        self.routes.push(Route {
            pattern,
            methods,
            handler_name: INFO_HANDLER.to_string(),
            checks: CheckDeclarations::default(),
            target: Target::Info(profile),
        });
        Ok(())
    }

    fn ensure_unique(&self, pattern: &str, methods: &MethodSet) -> RouteResult<()> {
        for existing in self.routes.iter().filter(|r| r.pattern() == pattern) {
            if let Some(method) = existing.methods().first_shared(methods) {
                return Err(RouteError::DuplicateRoute {
                    pattern: pattern.to_string(),
                    method: method.clone(),
                });
            }
        }
        Ok(())
    }

    /// Find the first route whose pattern matches `path` and accepts `method`.
    pub fn scan(&self, method: &Method, path: &str) -> Scan<'_> {
        let mut found = false;
        for route in &self.routes {
            if !route.pattern.matches(path) {
                continue;
            }
            found = true;
            if route.methods.contains(method) {
                return Scan::Matched(route);
            }
        }
        if found {
            Scan::MethodMismatch
        } else {
            Scan::NotFound
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::handler::HandlerSet;
    use axum::body::Body;
    use axum::http::Request;

    fn owner() -> HandlerSet {
        HandlerSet::new()
            .with("GetItem", |_req: Request<Body>| async { "item" })
            .with("X", |_req: Request<Body>| async { "x" })
            .with("Any", |_req: Request<Body>| async { "any" })
    }

    #[test]
    fn test_register_rejects_empty_fields() {
        let owner = owner();
        let mut table = RouteTable::new();

        let err = table
            .register(&RouteDefinition::new("", &["GET"], "X"), &owner)
            .unwrap_err();
        assert!(matches!(err, RouteError::InvalidRouteDefinition(_)));

        let err = table
            .register(&RouteDefinition::new("/x", &[], "X"), &owner)
            .unwrap_err();
        assert!(matches!(err, RouteError::InvalidRouteDefinition(_)));

        let err = table
            .register(&RouteDefinition::new("/x", &["GET"], ""), &owner)
            .unwrap_err();
        assert!(matches!(err, RouteError::InvalidRouteDefinition(_)));
        assert!(table.is_empty());
    }

    #[test]
    fn test_register_rejects_unexported_and_unknown_handlers() {
        let owner = owner();
        let mut table = RouteTable::new();

        let err = table
            .register(&RouteDefinition::new("/x", &["GET"], "getItem"), &owner)
            .unwrap_err();
        assert!(matches!(err, RouteError::HandlerNotExported(name) if name == "getItem"));

        let err = table
            .register(&RouteDefinition::new("/x", &["GET"], "Missing"), &owner)
            .unwrap_err();
        assert!(matches!(err, RouteError::HandlerNotFound(name) if name == "Missing"));
    }

    #[test]
    fn test_register_rejects_bad_pattern_and_method() {
        let owner = owner();
        let mut table = RouteTable::new();

        let err = table
            .register(&RouteDefinition::new("/x/(", &["GET"], "X"), &owner)
            .unwrap_err();
        assert!(matches!(err, RouteError::InvalidPattern { .. }));

        let err = table
            .register(&RouteDefinition::new("/x", &["G ET"], "X"), &owner)
            .unwrap_err();
        assert!(matches!(err, RouteError::InvalidRouteDefinition(_)));
    }

    #[test]
    fn test_duplicate_iff_methods_intersect() {
        let owner = owner();
        let mut table = RouteTable::new();
        table
            .register(&RouteDefinition::new("/x", &["GET"], "X"), &owner)
            .unwrap();

        let err = table
            .register(&RouteDefinition::new("/x", &["GET", "POST"], "X"), &owner)
            .unwrap_err();
        assert!(matches!(
            err,
            RouteError::DuplicateRoute { ref pattern, ref method } if pattern == "/x" && *method == Method::GET
        ));

        table
            .register(&RouteDefinition::new("/x", &["POST", "PUT"], "Any"), &owner)
            .unwrap();
        table
            .register(&RouteDefinition::new("/y", &["GET"], "X"), &owner)
            .unwrap();
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_register_all_keeps_partial_registration() {
        let owner = owner();
        let mut table = RouteTable::new();
        let defs = vec![
            RouteDefinition::new("/a", &["GET"], "X"),
            RouteDefinition::new("/b", &["GET"], "X"),
            RouteDefinition::new("/a", &["GET"], "Any"),
            RouteDefinition::new("/c", &["GET"], "X"),
        ];

        let err = table.register_all(&defs, &owner).unwrap_err();
        assert!(matches!(err, RouteError::DuplicateRoute { .. }));
        let patterns: Vec<_> = table.iter().map(|r| r.pattern()).collect();
        assert_eq!(patterns, vec!["/a", "/b"]);
    }

    #[test]
    fn test_scan_first_match_wins() {
        let owner = owner();
        let mut table = RouteTable::new();
        table
            .register_all(
                &[
                    RouteDefinition::new("/items/[0-9]+", &["GET"], "GetItem"),
                    RouteDefinition::new("/items/.*", &["GET", "POST"], "Any"),
                ],
                &owner,
            )
            .unwrap();

        match table.scan(&Method::GET, "/items/42") {
            Scan::Matched(route) => assert_eq!(route.handler_name(), "GetItem"),
            other => panic!("unexpected scan result: {:?}", other),
        }
        match table.scan(&Method::POST, "/items/42") {
            Scan::Matched(route) => assert_eq!(route.handler_name(), "Any"),
            other => panic!("unexpected scan result: {:?}", other),
        }
        assert!(matches!(table.scan(&Method::DELETE, "/items/42"), Scan::MethodMismatch));
        assert!(matches!(table.scan(&Method::GET, "/other"), Scan::NotFound));
    }

    #[test]
    fn test_register_info_route() {
        let owner = owner();
        let mut table = RouteTable::new();
        table
            .register(&RouteDefinition::new("/about", &["POST"], "X"), &owner)
            .unwrap();
        table
            .register_info(Arc::new(Profile::new("/about", "1.0.0", "", "test")))
            .unwrap();

        match table.scan(&Method::GET, "/about") {
            Scan::Matched(route) => {
                assert!(route.is_info());
                assert_eq!(route.handler_name(), INFO_HANDLER);
            }
            other => panic!("unexpected scan result: {:?}", other),
        }

        let err = table
            .register_info(Arc::new(Profile::new("/about", "1.0.0", "", "test")))
            .unwrap_err();
        assert!(matches!(err, RouteError::DuplicateRoute { .. }));
    }
}
