//! Route definitions and registered routes.

use std::fmt;
use std::sync::Arc;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::http::Profile;
use crate::routing::handler::BoxedHandler;
use crate::routing::matcher::{MethodSet, PathPattern};

/// A route as declared in configuration.
///
/// ```toml
/// [[routes]]
/// pattern = "/items/[0-9]+"
/// methods = ["GET"]
/// handler = "GetItem"
///
/// [routes.checks]
/// header = ["true"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteDefinition {
    /// Regular expression matched against the whole request path.
    pub pattern: String,

    /// Accepted HTTP methods.
    pub methods: Vec<String>,

    /// Exported name of the handler to invoke.
    pub handler: String,

    /// Checks to run before the handler, in declared order.
    #[serde(default, skip_serializing_if = "CheckDeclarations::is_empty")]
    pub checks: CheckDeclarations,
}

impl RouteDefinition {
    pub fn new(pattern: impl Into<String>, methods: &[&str], handler: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            methods: methods.iter().map(|m| m.to_string()).collect(),
            handler: handler.into(),
            checks: CheckDeclarations::default(),
        }
    }

    /// Declare a check with its arguments.
    pub fn check(mut self, name: impl Into<String>, args: &[&str]) -> Self {
        self.checks
            .push(name, args.iter().map(|a| a.to_string()).collect());
        self
    }
}

/// Ordered mapping of check name to check arguments.
///
/// Deserializes from a table and keeps the order in which entries appear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckDeclarations(Vec<(String, Vec<String>)>);

impl CheckDeclarations {
    /// Append a declaration, replacing the arguments of an existing name in place.
    pub fn push(&mut self, name: impl Into<String>, args: Vec<String>) {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = args,
            None => self.0.push((name, args)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(n, a)| (n.as_str(), a.as_slice()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for CheckDeclarations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, args) in &self.0 {
            map.serialize_entry(name, args)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CheckDeclarations {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DeclarationsVisitor;

        impl<'de> Visitor<'de> for DeclarationsVisitor {
            type Value = CheckDeclarations;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of check names to argument lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut declarations = CheckDeclarations::default();
                while let Some((name, args)) = access.next_entry::<String, Vec<String>>()? {
                    declarations.push(name, args);
                }
                Ok(declarations)
            }
        }

        deserializer.deserialize_map(DeclarationsVisitor)
    }
}

/// What a matched route runs.
#[derive(Debug, Clone)]
pub enum Target {
    /// A handler resolved from the handler owner.
    Handler(BoxedHandler),
    /// The built-in service info endpoint.
    Info(Arc<Profile>),
}

/// A validated, registered route.
#[derive(Debug, Clone)]
pub struct Route {
    pub(crate) pattern: PathPattern,
    pub(crate) methods: MethodSet,
    pub(crate) handler_name: String,
    pub(crate) checks: CheckDeclarations,
    pub(crate) target: Target,
}

impl Route {
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn methods(&self) -> &MethodSet {
        &self.methods
    }

    pub fn handler_name(&self) -> &str {
        &self.handler_name
    }

    pub fn checks(&self) -> &CheckDeclarations {
        &self.checks
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn is_info(&self) -> bool {
        matches!(self.target, Target::Info(_))
    }
}
