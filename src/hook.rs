//! The `amplify_config_generate` hook: runs after the Cognito stack is deployed and writes the
//! client configuration to a file.

use std::{
    collections::BTreeMap,
    io::{self, Write as _},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;

use crate::{
    assembly::{AssemblyError, ConfigBuilder},
    context::{DeploymentContext, ResolveError, Resolvable},
    document::{OutputFormat, UnknownFormat},
};

/// Argument naming the prefix resources are located by.
pub const PREFIX: &str = "prefix";

/// Argument naming the output file.
pub const AMPLIFY_CONFIG: &str = "amplify_config";

/// Argument naming the output format, `json` (default) or `dart`.
pub const FORMAT: &str = "format";

/// Named hook arguments, as given in the orchestration tool's configuration.
pub type HookArguments = BTreeMap<String, Resolvable>;

/// The `amplify_config` argument for writing to `path`.
///
/// # Errors
///
/// Returns an error if `path` isn't valid UTF-8, since hook arguments are strings.
pub fn output_path(path: &Path) -> Result<Resolvable, ArgumentError> {
    path.to_str()
        .map(Resolvable::literal)
        .ok_or(ArgumentError::NotUtf8(AMPLIFY_CONFIG))
}

/// Generates an Amplify configuration file for a deployed stack.
///
/// # Example
///
/// ```no_run
/// # #[tokio::main] async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use amplify_config_hook::{
///     hook::{AmplifyConfigHook, HookArguments, AMPLIFY_CONFIG, FORMAT, PREFIX},
///     Connection, Resolvable, StackContext,
/// };
///
/// let arguments = HookArguments::from([
///     (PREFIX.to_string(), "!stack_attr parameters.Prefix".parse::<Resolvable>()?),
///     (AMPLIFY_CONFIG.to_string(), "lib/amplifyconfiguration.dart".into()),
///     (FORMAT.to_string(), "dart".into()),
/// ]);
/// let hook = AmplifyConfigHook::new(arguments);
/// hook.validate()?;
///
/// let connection = Connection::builder().build().await?;
/// let context = StackContext::load(connection, "config/dev/auth.yaml").await?;
/// hook.run(&context).await?;
/// # Ok(()) }
/// ```
#[derive(Clone, Debug)]
pub struct AmplifyConfigHook {
    arguments: HookArguments,
}

impl AmplifyConfigHook {
    /// The name the hook is registered under.
    pub const NAME: &'static str = "amplify_config_generate";

    /// Construct the hook with its arguments.
    #[must_use]
    pub fn new(arguments: HookArguments) -> Self {
        Self { arguments }
    }

    /// Check the arguments without resolving deferred values or touching the network.
    ///
    /// Unknown arguments are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if `prefix` or `amplify_config` is missing or empty, if `amplify_config`
    /// or `format` isn't a literal, or if `format` isn't a known format.
    pub fn validate(&self) -> Result<ValidatedArguments, ArgumentError> {
        let prefix = match self.arguments.get(PREFIX) {
            None => return Err(ArgumentError::Missing(PREFIX)),
            Some(prefix) if prefix.as_literal() == Some("") => {
                return Err(ArgumentError::Missing(PREFIX));
            }
            Some(prefix) => prefix.clone(),
        };

        let amplify_config = match self.literal(AMPLIFY_CONFIG)? {
            None | Some("") => return Err(ArgumentError::Missing(AMPLIFY_CONFIG)),
            Some(path) => PathBuf::from(path),
        };

        let format = self
            .literal(FORMAT)?
            .map(str::parse::<OutputFormat>)
            .transpose()?
            .unwrap_or_default();

        Ok(ValidatedArguments {
            prefix,
            amplify_config,
            format,
        })
    }

    /// Generate the configuration and write it to the `amplify_config` path.
    ///
    /// Arguments are validated before any API call. The file is only written once the whole
    /// configuration has been assembled, and replaces any existing file.
    ///
    /// # Errors
    ///
    /// See [`HookError`].
    pub async fn run<C>(&self, context: &C) -> Result<PathBuf, HookError>
    where
        C: DeploymentContext + ?Sized,
    {
        let arguments = self.validate()?;

        let prefix = arguments.prefix.resolve(context)?;
        if prefix.is_empty() {
            return Err(ArgumentError::Missing(PREFIX).into());
        }
        tracing::info!(
            hook = Self::NAME,
            %prefix,
            format = %arguments.format,
            "generating Amplify configuration"
        );

        let config = ConfigBuilder::new(context.connection(), &prefix)
            .build()
            .await?;
        let content = config
            .render(arguments.format)
            .map_err(HookError::Serialize)?;

        write_replacing(&arguments.amplify_config, &content)
            .await
            .map_err(|error| HookError::Write {
                path: arguments.amplify_config.clone(),
                error,
            })?;
        tracing::info!(path = %arguments.amplify_config.display(), "wrote Amplify configuration");

        Ok(arguments.amplify_config)
    }

    fn literal(&self, name: &'static str) -> Result<Option<&str>, ArgumentError> {
        self.arguments
            .get(name)
            .map(|value| value.as_literal().ok_or(ArgumentError::NotLiteral(name)))
            .transpose()
    }
}

/// Hook arguments after validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedArguments {
    /// The name prefix, possibly still deferred.
    pub prefix: Resolvable,

    /// Where to write the configuration.
    pub amplify_config: PathBuf,

    /// How to write the configuration.
    pub format: OutputFormat,
}

// Write to a uniquely named sibling temporary file and rename it over `path`, so that `path` is
// never left half-written.
async fn write_replacing(path: &Path, content: &str) -> io::Result<()> {
    if path.file_name().is_none() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "path has no file name",
        ));
    }
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_owned(),
        _ => PathBuf::from("."),
    };
    let path = path.to_owned();
    let content = content.to_owned();

    tokio::task::spawn_blocking(move || {
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(content.as_bytes())?;
        file.persist(path).map_err(|error| error.error)?;
        Ok::<_, io::Error>(())
    })
    .await
    .map_err(|error| io::Error::new(io::ErrorKind::Other, error))?
}

/// An invalid hook argument.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[allow(clippy::module_name_repetitions)]
pub enum ArgumentError {
    /// A required argument is missing or empty.
    #[error("hook argument {0:?} is required")]
    Missing(&'static str),

    /// An argument that must be given literally was deferred.
    #[error("hook argument {0:?} must be a literal value")]
    NotLiteral(&'static str),

    /// A path argument isn't valid UTF-8.
    #[error("hook argument {0:?} must be valid UTF-8")]
    NotUtf8(&'static str),

    /// The `format` argument isn't a known format.
    #[error("invalid hook argument \"format\": {0}")]
    Format(String),
}

impl From<UnknownFormat> for ArgumentError {
    fn from(error: UnknownFormat) -> Self {
        Self::Format(error.to_string())
    }
}

/// An error that caused a hook run to fail.
///
/// No file is written when a run fails.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::module_name_repetitions)]
pub enum HookError {
    /// The hook arguments are invalid.
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    /// The prefix couldn't be resolved.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A Cognito lookup failed.
    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    /// The configuration couldn't be serialized.
    #[error("failed to serialize Amplify configuration")]
    Serialize(#[source] serde_json::Error),

    /// The output file couldn't be written.
    #[error("failed to write {}", path.display())]
    Write {
        /// The output file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        error: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assembly::Lookup,
        context::{StackAttr, StackContext},
        testing::FakeCognito,
        AmplifyConfiguration,
    };

    fn arguments(pairs: &[(&str, &str)]) -> HookArguments {
        pairs
            .iter()
            .map(|&(name, value)| (name.to_string(), value.parse::<Resolvable>().unwrap()))
            .collect()
    }

    fn context() -> StackContext<FakeCognito> {
        let config = serde_yaml::from_str("parameters:\n  Prefix: My\n  Empty: ''\n").unwrap();
        StackContext::new(FakeCognito::scenario(), config)
    }

    #[test]
    fn validates_defaults() {
        let hook = AmplifyConfigHook::new(arguments(&[
            ("prefix", "My"),
            ("amplify_config", "out/amplifyconfiguration.json"),
            ("unrelated", "ignored"),
        ]));

        assert_eq!(
            hook.validate(),
            Ok(ValidatedArguments {
                prefix: Resolvable::literal("My"),
                amplify_config: PathBuf::from("out/amplifyconfiguration.json"),
                format: OutputFormat::Json,
            })
        );
    }

    #[test]
    fn requires_prefix_and_output_path() {
        let missing_prefix = AmplifyConfigHook::new(arguments(&[("amplify_config", "a.json")]));
        assert_eq!(
            missing_prefix.validate(),
            Err(ArgumentError::Missing(PREFIX))
        );

        let empty_prefix =
            AmplifyConfigHook::new(arguments(&[("prefix", ""), ("amplify_config", "a.json")]));
        assert_eq!(empty_prefix.validate(), Err(ArgumentError::Missing(PREFIX)));

        let missing_path = AmplifyConfigHook::new(arguments(&[("prefix", "My")]));
        assert_eq!(
            missing_path.validate(),
            Err(ArgumentError::Missing(AMPLIFY_CONFIG))
        );
    }

    #[test]
    fn rejects_unknown_format() {
        let hook = AmplifyConfigHook::new(arguments(&[
            ("prefix", "My"),
            ("amplify_config", "a.xml"),
            ("format", "xml"),
        ]));

        let error = hook.validate().unwrap_err();

        assert_eq!(
            error.to_string(),
            "invalid hook argument \"format\": unknown output format \"xml\"; expected \"json\" or \"dart\""
        );
    }

    #[test]
    fn output_path_must_be_literal() {
        let hook = AmplifyConfigHook::new(arguments(&[
            ("prefix", "My"),
            ("amplify_config", "!stack_attr parameters.Output"),
        ]));

        assert_eq!(
            hook.validate(),
            Err(ArgumentError::NotLiteral(AMPLIFY_CONFIG))
        );
    }

    #[test]
    fn output_path_is_kept_exactly() {
        let path = Path::new("out/amplifyconfiguration.json");

        assert_eq!(
            output_path(path),
            Ok(Resolvable::literal("out/amplifyconfiguration.json"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_output_path_is_rejected() {
        use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OsStr::from_bytes(b"amplify\xff.json"));

        assert_eq!(
            output_path(&path),
            Err(ArgumentError::NotUtf8(AMPLIFY_CONFIG))
        );
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn invalid_arguments_fail_before_any_api_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("amplifyconfiguration.xml");
        let context = context();
        let hook = AmplifyConfigHook::new(arguments(&[
            ("prefix", "My"),
            ("amplify_config", path.to_str().unwrap()),
            ("format", "xml"),
        ]));

        let error = hook.run(&context).await.unwrap_err();

        assert!(matches!(error, HookError::Argument(ArgumentError::Format(_))));
        assert!(context.connection().calls().is_empty());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("amplifyconfiguration.json");
        let hook = AmplifyConfigHook::new(arguments(&[
            ("prefix", "My"),
            ("amplify_config", path.to_str().unwrap()),
        ]));

        let written = hook.run(&context()).await.unwrap();

        assert_eq!(written, path);
        let content = std::fs::read_to_string(&path).unwrap();
        let config: AmplifyConfiguration = serde_json::from_str(&content).unwrap();
        let plugin = config.auth.plugins.aws_cognito_auth_plugin;
        assert_eq!(plugin.cognito_user_pool.default.pool_id, "us-east-1_MyPool");
        assert_eq!(
            plugin.credentials_provider.cognito_identity.default.pool_id,
            "us-east-1:my-identity"
        );
        assert_eq!(plugin.auth.default.oauth.app_client_id, "my-client");
        assert_eq!(plugin.auth.default.oauth.scopes, ["email"]);
        assert_eq!(
            plugin.auth.default.oauth.web_domain,
            "My-user-pool-domain.auth.us-east-1.amazoncognito.com"
        );
    }

    #[tokio::test]
    async fn dart_output_wraps_the_json_output() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("amplifyconfiguration.json");
        let dart_path = dir.path().join("amplifyconfiguration.dart");
        let context = context();

        AmplifyConfigHook::new(arguments(&[
            ("prefix", "My"),
            ("amplify_config", json_path.to_str().unwrap()),
            ("format", "json"),
        ]))
        .run(&context)
        .await
        .unwrap();
        AmplifyConfigHook::new(arguments(&[
            ("prefix", "My"),
            ("amplify_config", dart_path.to_str().unwrap()),
            ("format", "dart"),
        ]))
        .run(&context)
        .await
        .unwrap();

        let json = std::fs::read_to_string(&json_path).unwrap();
        let dart = std::fs::read_to_string(&dart_path).unwrap();
        assert_eq!(dart, format!("const amplifyconfig = '''\n{json}\n''';"));
    }

    #[tokio::test]
    async fn resolves_deferred_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("amplifyconfiguration.json");
        let context = context();
        let hook = AmplifyConfigHook::new(arguments(&[
            ("prefix", "!stack_attr parameters.Prefix"),
            ("amplify_config", path.to_str().unwrap()),
        ]));

        hook.run(&context).await.unwrap();

        assert_eq!(
            context.connection().calls()[0..2],
            ["ListUserPools 60", "DescribeUserPool us-east-1_MyPool"]
        );
    }

    #[tokio::test]
    async fn unresolvable_prefix_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("amplifyconfiguration.json");
        let context = context();
        let hook = AmplifyConfigHook::new(arguments(&[
            ("prefix", "!stack_attr parameters.Missing"),
            ("amplify_config", path.to_str().unwrap()),
        ]));

        let error = hook.run(&context).await.unwrap_err();

        assert!(matches!(
            error,
            HookError::Resolve(ResolveError::Missing(ref attr)) if *attr == StackAttr::new("parameters.Missing")
        ));
        assert!(context.connection().calls().is_empty());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn prefix_resolving_to_empty_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let context = context();
        let hook = AmplifyConfigHook::new(arguments(&[
            ("prefix", "!stack_attr parameters.Empty"),
            ("amplify_config", dir.path().join("a.json").to_str().unwrap()),
        ]));

        let error = hook.run(&context).await.unwrap_err();

        assert!(matches!(error, HookError::Argument(ArgumentError::Missing(PREFIX))));
    }

    #[tokio::test]
    async fn missing_user_pool_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("amplifyconfiguration.json");
        let hook = AmplifyConfigHook::new(arguments(&[
            ("prefix", "Nope"),
            ("amplify_config", path.to_str().unwrap()),
        ]));

        let error = hook.run(&context()).await.unwrap_err();

        assert!(matches!(
            error,
            HookError::Assembly(AssemblyError::NotFound {
                lookup: Lookup::UserPool,
                ..
            })
        ));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn failed_run_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("amplifyconfiguration.json");
        std::fs::write(&path, "previous").unwrap();
        let mut fake = FakeCognito::scenario();
        fake.fail_on("DescribeIdentityPool");
        let context = StackContext::without_config(fake);
        let hook = AmplifyConfigHook::new(arguments(&[
            ("prefix", "My"),
            ("amplify_config", path.to_str().unwrap()),
        ]));

        let error = hook.run(&context).await.unwrap_err();

        assert!(matches!(error, HookError::Assembly(AssemblyError::Api { .. })));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous");
    }

    #[tokio::test]
    async fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("amplifyconfiguration.json");
        std::fs::write(&path, "previous").unwrap();
        let hook = AmplifyConfigHook::new(arguments(&[
            ("prefix", "My"),
            ("amplify_config", path.to_str().unwrap()),
        ]));

        hook.run(&context()).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with('{'));
        let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[tokio::test]
    async fn leaves_unrelated_dot_files_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("amplifyconfiguration.json");
        let neighbour = dir.path().join(".amplifyconfiguration.json.tmp");
        std::fs::write(&neighbour, "mine").unwrap();
        let hook = AmplifyConfigHook::new(arguments(&[
            ("prefix", "My"),
            ("amplify_config", path.to_str().unwrap()),
        ]));

        hook.run(&context()).await.unwrap();

        assert_eq!(std::fs::read_to_string(&neighbour).unwrap(), "mine");
        assert!(path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("amplifyconfiguration.json");
        let hook = AmplifyConfigHook::new(arguments(&[
            ("prefix", "My"),
            ("amplify_config", path.to_str().unwrap()),
        ]));

        let error = hook.run(&context()).await.unwrap_err();

        assert!(matches!(error, HookError::Write { .. }));
        assert!(error.to_string().starts_with("failed to write "));
    }
}
