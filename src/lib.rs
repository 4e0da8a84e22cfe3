#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs, clippy::pedantic)]

//! Amplify client configuration from deployed Cognito resources.
//!
//! Once a user pool, its app client and hosted UI domain, and an identity pool have been deployed,
//! this crate looks them up by name prefix and writes the `amplifyconfiguration` document that
//! Amplify client libraries read.
//!
//! See [`generate`] for the main entrypoint to the crate, and [`hook::AmplifyConfigHook`] for
//! running as a deployment hook with deferred arguments.
//!
//! ```no_run
//! # #[tokio::main] async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use amplify_config_hook::OutputFormat;
//!
//! amplify_config_hook::generate("MyApp", "amplifyconfiguration.json", OutputFormat::Json).await?;
//! # Ok(()) }
//! ```

mod assembly;
mod builder;
mod cognito_identity;
mod cognito_idp;
mod connection;
mod context;
pub mod document;
pub mod hook;
mod region;
#[cfg(test)]
mod testing;

use std::path::{Path, PathBuf};

pub use crate::{
    assembly::{
        assemble, web_domain, AssemblyError, ConfigBuilder, Lookup, HOSTED_UI_SUFFIX, MAX_RESULTS,
    },
    builder::{ConnectionBuilder, ConnectionError},
    cognito_identity::{IdentityPool, IdentityPoolSummary},
    cognito_idp::{
        UserPool, UserPoolClient, UserPoolClientSummary, UserPoolDomain, UserPoolSummary,
    },
    connection::{ApiError, Connection, IdentityApi},
    context::{DeploymentContext, ResolveError, Resolvable, StackAttr, StackContext},
    document::{AmplifyConfiguration, OutputFormat, UnknownFormat},
    hook::{AmplifyConfigHook, ArgumentError, HookArguments, HookError},
    region::Region,
};

/// Generate an Amplify configuration for the resources named with `prefix` and write it to
/// `amplify_config`.
///
/// The AWS region and credentials are resolved the usual way (`AWS_REGION`, `AWS_PROFILE`,
/// shared config, ...). For explicit connection settings or deferred arguments see
/// [`ConnectionBuilder`] and [`AmplifyConfigHook`].
///
/// # Errors
///
/// An error is returned if the arguments are invalid (including an output path that isn't valid
/// UTF-8), if no region is configured, if any of the
/// resources can't be found, or if the file can't be written. Nothing is written on error.
pub async fn generate(
    prefix: &str,
    amplify_config: impl AsRef<Path>,
    format: OutputFormat,
) -> Result<PathBuf, Error> {
    let hook = AmplifyConfigHook::new(HookArguments::from([
        (hook::PREFIX.to_owned(), Resolvable::literal(prefix)),
        (
            hook::AMPLIFY_CONFIG.to_owned(),
            hook::output_path(amplify_config.as_ref()).map_err(HookError::from)?,
        ),
        (hook::FORMAT.to_owned(), Resolvable::literal(format.to_string())),
    ]));
    hook.validate().map_err(HookError::from)?;

    let connection = Connection::builder().build().await?;
    let path = hook.run(&StackContext::without_config(connection)).await?;
    Ok(path)
}

/// An error indicating either misconfiguration or a failed hook run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The connection couldn't be configured.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// The deployment context couldn't be loaded.
    #[error(transparent)]
    Context(#[from] ResolveError),

    /// The hook run failed.
    #[error(transparent)]
    Hook(#[from] HookError),
}
