//! The deployment a hook runs in, and argument values that are resolved against it.

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::{Connection, IdentityApi};

const STACK_ATTR_TAG: &str = "!stack_attr";

/// The deployment a hook runs in.
///
/// This is the hook's view of the orchestration tool's stack: the connection to use for API calls,
/// and the stack's configuration for resolving deferred argument values.
pub trait DeploymentContext {
    /// The connection type.
    type Api: IdentityApi + ?Sized;

    /// The connection for API calls made on behalf of the stack.
    fn connection(&self) -> &Self::Api;

    /// Look up a stack attribute and return its value as a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the attribute isn't defined or isn't a scalar.
    fn resolve_stack_attr(&self, attr: &StackAttr) -> Result<String, ResolveError>;
}

/// An argument value that is either given literally or deferred until the hook runs.
///
/// Strings of the form `!stack_attr <path>` parse as deferred references; anything else is a
/// literal.
///
/// ```
/// use amplify_config_hook::{Resolvable, StackAttr};
///
/// assert_eq!("My".parse::<Resolvable>(), Ok(Resolvable::literal("My")));
/// assert_eq!(
///     "!stack_attr parameters.Prefix".parse::<Resolvable>(),
///     Ok(Resolvable::StackAttr(StackAttr::new("parameters.Prefix")))
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolvable {
    /// A value used as-is.
    Literal(String),

    /// A reference to an attribute of the current stack.
    StackAttr(StackAttr),
}

impl Resolvable {
    /// Construct a literal value.
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    /// The literal value, or `None` if the value is deferred.
    #[must_use]
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(value) => Some(value),
            Self::StackAttr(_) => None,
        }
    }

    /// Produce the value, resolving a deferred reference against `context`.
    ///
    /// # Errors
    ///
    /// Returns an error if a deferred reference can't be resolved.
    pub fn resolve<C>(&self, context: &C) -> Result<String, ResolveError>
    where
        C: DeploymentContext + ?Sized,
    {
        match self {
            Self::Literal(value) => Ok(value.clone()),
            Self::StackAttr(attr) => {
                let value = context.resolve_stack_attr(attr)?;
                tracing::debug!(%attr, %value, "resolved stack attribute");
                Ok(value)
            }
        }
    }
}

impl FromStr for Resolvable {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(rest) = s.strip_prefix(STACK_ATTR_TAG) else {
            return Ok(Self::literal(s));
        };
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            // e.g. `!stack_attributes`, which is just a string
            return Ok(Self::literal(s));
        }
        let path = rest.trim();
        if path.is_empty() || path.split('.').any(str::is_empty) {
            return Err(ResolveError::InvalidReference(s.to_owned()));
        }
        Ok(Self::StackAttr(StackAttr::new(path)))
    }
}

impl From<&str> for Resolvable {
    fn from(value: &str) -> Self {
        Self::literal(value)
    }
}

impl From<String> for Resolvable {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

/// A dotted path to an attribute of the stack configuration, e.g. `parameters.Prefix`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StackAttr {
    path: String,
}

impl StackAttr {
    /// Construct a reference to the attribute at `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// The dotted attribute path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for StackAttr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{STACK_ATTR_TAG} {}", self.path)
    }
}

/// A [`DeploymentContext`] backed by a stack configuration document.
///
/// The configuration is usually the YAML stack config the orchestration tool deployed, e.g.
///
/// ```yaml
/// template_path: auth.yaml
/// parameters:
///   Prefix: MyApp
/// ```
///
/// against which `!stack_attr parameters.Prefix` resolves to `MyApp`. Sequence elements are
/// addressed by index (`hooks.after_create.0`).
#[derive(Debug)]
pub struct StackContext<A = Connection> {
    connection: A,
    config: serde_yaml::Value,
}

impl<A: IdentityApi> StackContext<A> {
    /// Construct a context from a connection and an already-parsed stack configuration.
    pub fn new(connection: A, config: serde_yaml::Value) -> Self {
        Self { connection, config }
    }

    /// Construct a context with an empty stack configuration.
    ///
    /// Every stack attribute lookup will fail.
    pub fn without_config(connection: A) -> Self {
        Self::new(connection, serde_yaml::Value::Null)
    }

    /// Construct a context by loading the stack configuration at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or isn't valid YAML.
    pub async fn load(connection: A, path: impl AsRef<Path>) -> Result<Self, ResolveError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|error| ResolveError::config(path, error))?;
        let config =
            serde_yaml::from_str(&content).map_err(|error| ResolveError::config(path, error))?;
        tracing::debug!(path = %path.display(), "loaded stack config");

        Ok(Self::new(connection, config))
    }
}

impl<A: IdentityApi> DeploymentContext for StackContext<A> {
    type Api = A;

    fn connection(&self) -> &A {
        &self.connection
    }

    fn resolve_stack_attr(&self, attr: &StackAttr) -> Result<String, ResolveError> {
        let mut value = &self.config;
        for segment in attr.path().split('.') {
            let next = match segment.parse::<usize>() {
                Ok(index) if value.is_sequence() => value.get(index),
                _ => value.get(segment),
            };
            value = next.ok_or_else(|| ResolveError::Missing(attr.clone()))?;
        }

        match value {
            serde_yaml::Value::String(value) => Ok(value.clone()),
            serde_yaml::Value::Number(value) => Ok(value.to_string()),
            serde_yaml::Value::Bool(value) => Ok(value.to_string()),
            _ => Err(ResolveError::NotScalar(attr.clone())),
        }
    }
}

/// An error resolving a deferred argument value.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[allow(clippy::module_name_repetitions)]
pub enum ResolveError {
    /// A `!stack_attr` reference had no usable path.
    #[error("invalid stack attribute reference {0:?}")]
    InvalidReference(String),

    /// The referenced attribute isn't defined.
    #[error("{0} is not defined in the stack config")]
    Missing(StackAttr),

    /// The referenced attribute is a mapping, sequence or null.
    #[error("{0} does not refer to a string, number or boolean")]
    NotScalar(StackAttr),

    /// The stack configuration couldn't be loaded.
    #[error("unable to load stack config {}: {error}", path.display())]
    Config {
        /// The stack config file.
        path: PathBuf,
        /// What went wrong.
        error: String,
    },
}

impl ResolveError {
    fn config(path: &Path, error: impl fmt::Display) -> Self {
        Self::Config {
            path: path.to_owned(),
            error: error.to_string(),
        }
    }
}
