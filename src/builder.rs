use aws_config::BehaviorVersion;

use crate::{Connection, Region};

/// Builder for [`Connection`].
///
/// Everything the connection needs is passed in explicitly. Settings that aren't given fall back
/// to the AWS SDK's usual resolution (`AWS_REGION`, `AWS_PROFILE`, shared config and credentials
/// files, instance metadata, ...).
///
/// # Example
///
/// ```no_run
/// # #[tokio::main] async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use amplify_config_hook::{Connection, Region};
///
/// let connection = Connection::builder()
///     .region(Region::new("eu-west-1"))
///     .profile("deploy")
///     .build()
///     .await?;
/// # Ok(()) }
/// ```
#[allow(clippy::module_name_repetitions)]
#[derive(Clone, Debug, Default)]
pub struct ConnectionBuilder {
    region: Option<Region>,
    profile: Option<String>,
    endpoint_url: Option<String>,
}

impl ConnectionBuilder {
    /// Construct a [`Connection`] builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the region.
    ///
    /// The region is also written into the generated configuration.
    #[must_use]
    pub fn region(self, region: Region) -> Self {
        Self {
            region: Some(region),
            ..self
        }
    }

    /// Set the named profile used to load credentials and defaults from AWS shared config.
    #[must_use]
    pub fn profile(self, name: impl Into<String>) -> Self {
        Self {
            profile: Some(name.into()),
            ..self
        }
    }

    /// Send all requests to the given endpoint, e.g. a local Cognito emulator.
    #[must_use]
    pub fn endpoint_url(self, url: impl Into<String>) -> Self {
        Self {
            endpoint_url: Some(url.into()),
            ..self
        }
    }

    /// Build a [`Connection`] with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no region was given and none could be resolved from the environment.
    pub async fn build(self) -> Result<Connection, ConnectionError> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = self.region {
            loader = loader.region(region.0);
        }
        if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(endpoint_url) = &self.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        let sdk_config = loader.load().await;

        let region = sdk_config
            .region()
            .cloned()
            .map(Region::from)
            .ok_or(ConnectionError::MissingRegion)?;
        tracing::debug!(%region, profile = ?self.profile, "loaded AWS configuration");

        Ok(Connection::build(region, &sdk_config))
    }
}

/// An error indicating missing or invalid connection configuration.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::module_name_repetitions)]
pub enum ConnectionError {
    /// No region was configured.
    #[error("no AWS region configured; pass one explicitly or set AWS_REGION")]
    MissingRegion,
}
