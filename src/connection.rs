use std::fmt;

use aws_config::SdkConfig;
use futures::future::BoxFuture;

use crate::{
    cognito_identity::{self, IdentityPool, IdentityPoolSummary},
    cognito_idp::{
        self, UserPool, UserPoolClient, UserPoolClientSummary, UserPoolDomain, UserPoolSummary,
    },
    ConnectionBuilder, Region,
};

/// The read-only Cognito surface consumed when assembling a configuration.
///
/// [`Connection`] implements this against AWS. The trait exists so that the assembly pipeline can
/// run against any source of records, such as an in-memory fake in tests:
///
/// ```
/// use amplify_config_hook::{ApiError, IdentityApi, Region, UserPoolSummary};
/// # use amplify_config_hook::*;
/// # use futures::future::{self, BoxFuture};
///
/// struct Empty(Region);
///
/// impl IdentityApi for Empty {
///     fn region(&self) -> &Region {
///         &self.0
///     }
///
///     fn list_user_pools(&self, _: i32) -> BoxFuture<'_, Result<Vec<UserPoolSummary>, ApiError>> {
///         Box::pin(future::ready(Ok(vec![])))
///     }
///     # fn describe_user_pool(&self, _: &str) -> BoxFuture<'_, Result<UserPool, ApiError>> { unimplemented!() }
///     # fn list_user_pool_clients(&self, _: &str, _: i32) -> BoxFuture<'_, Result<Vec<UserPoolClientSummary>, ApiError>> { unimplemented!() }
///     # fn describe_user_pool_client(&self, _: &str, _: &str) -> BoxFuture<'_, Result<UserPoolClient, ApiError>> { unimplemented!() }
///     # fn describe_user_pool_domain(&self, _: &str) -> BoxFuture<'_, Result<Option<UserPoolDomain>, ApiError>> { unimplemented!() }
///     # fn list_identity_pools(&self, _: i32) -> BoxFuture<'_, Result<Vec<IdentityPoolSummary>, ApiError>> { unimplemented!() }
///     # fn describe_identity_pool(&self, _: &str) -> BoxFuture<'_, Result<IdentityPool, ApiError>> { unimplemented!() }
///     // ...
/// }
/// ```
pub trait IdentityApi: Send + Sync {
    /// The region the connection operates in.
    fn region(&self) -> &Region;

    /// List up to `max_results` user pools.
    fn list_user_pools(
        &self,
        max_results: i32,
    ) -> BoxFuture<'_, Result<Vec<UserPoolSummary>, ApiError>>;

    /// Describe a single user pool.
    fn describe_user_pool(&self, user_pool_id: &str) -> BoxFuture<'_, Result<UserPool, ApiError>>;

    /// List up to `max_results` app clients of a user pool.
    fn list_user_pool_clients(
        &self,
        user_pool_id: &str,
        max_results: i32,
    ) -> BoxFuture<'_, Result<Vec<UserPoolClientSummary>, ApiError>>;

    /// Describe a single app client.
    fn describe_user_pool_client(
        &self,
        user_pool_id: &str,
        client_id: &str,
    ) -> BoxFuture<'_, Result<UserPoolClient, ApiError>>;

    /// Describe a hosted UI domain by its exact name, returning `None` if it doesn't exist.
    fn describe_user_pool_domain(
        &self,
        domain: &str,
    ) -> BoxFuture<'_, Result<Option<UserPoolDomain>, ApiError>>;

    /// List up to `max_results` identity pools.
    fn list_identity_pools(
        &self,
        max_results: i32,
    ) -> BoxFuture<'_, Result<Vec<IdentityPoolSummary>, ApiError>>;

    /// Describe a single identity pool.
    fn describe_identity_pool(
        &self,
        identity_pool_id: &str,
    ) -> BoxFuture<'_, Result<IdentityPool, ApiError>>;
}

/// A connection to the Cognito APIs of one region.
///
/// Use [`Connection::builder`] to configure the region, profile or endpoint.
pub struct Connection {
    region: Region,
    cognito_idp_client: cognito_idp::Client,
    cognito_identity_client: cognito_identity::Client,
}

impl Connection {
    /// Construct a builder for a connection.
    #[must_use]
    pub fn builder() -> ConnectionBuilder {
        ConnectionBuilder::default()
    }

    pub(crate) fn build(region: Region, sdk_config: &SdkConfig) -> Self {
        Self {
            region,
            cognito_idp_client: cognito_idp::Client::new(sdk_config),
            cognito_identity_client: cognito_identity::Client::new(sdk_config),
        }
    }
}

impl IdentityApi for Connection {
    fn region(&self) -> &Region {
        &self.region
    }

    fn list_user_pools(
        &self,
        max_results: i32,
    ) -> BoxFuture<'_, Result<Vec<UserPoolSummary>, ApiError>> {
        self.cognito_idp_client.list_user_pools(max_results)
    }

    fn describe_user_pool(&self, user_pool_id: &str) -> BoxFuture<'_, Result<UserPool, ApiError>> {
        self.cognito_idp_client.describe_user_pool(user_pool_id)
    }

    fn list_user_pool_clients(
        &self,
        user_pool_id: &str,
        max_results: i32,
    ) -> BoxFuture<'_, Result<Vec<UserPoolClientSummary>, ApiError>> {
        self.cognito_idp_client
            .list_user_pool_clients(user_pool_id, max_results)
    }

    fn describe_user_pool_client(
        &self,
        user_pool_id: &str,
        client_id: &str,
    ) -> BoxFuture<'_, Result<UserPoolClient, ApiError>> {
        self.cognito_idp_client
            .describe_user_pool_client(user_pool_id, client_id)
    }

    fn describe_user_pool_domain(
        &self,
        domain: &str,
    ) -> BoxFuture<'_, Result<Option<UserPoolDomain>, ApiError>> {
        self.cognito_idp_client.describe_user_pool_domain(domain)
    }

    fn list_identity_pools(
        &self,
        max_results: i32,
    ) -> BoxFuture<'_, Result<Vec<IdentityPoolSummary>, ApiError>> {
        self.cognito_identity_client.list_identity_pools(max_results)
    }

    fn describe_identity_pool(
        &self,
        identity_pool_id: &str,
    ) -> BoxFuture<'_, Result<IdentityPool, ApiError>> {
        self.cognito_identity_client
            .describe_identity_pool(identity_pool_id)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Connection")
            .field("region", &self.region)
            .field("cognito_idp_client", &self.cognito_idp_client)
            .field("cognito_identity_client", &self.cognito_identity_client)
            .finish()
    }
}

/// An error returned by, or a malformed response from, a Cognito API call.
///
/// This could be due to missing permissions, throttling, or a network issue. The error message
/// should be sufficient to aid end-user debugging.
#[derive(Debug, thiserror::Error)]
#[error("Cognito API error: {0}")]
pub struct ApiError(String);

impl ApiError {
    /// Construct an error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<&'static str> for ApiError {
    fn from(message: &'static str) -> Self {
        Self::new(message)
    }
}
