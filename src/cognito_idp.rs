//! Cleaned up Cognito user pools API.

use std::fmt;

use aws_config::SdkConfig;
use aws_sdk_cognitoidentityprovider::{error::DisplayErrorContext, operation, types};
use futures::future::BoxFuture;

use crate::ApiError;

pub(crate) struct Client {
    inner: aws_sdk_cognitoidentityprovider::Client,
}

impl Client {
    pub(crate) fn new(config: &SdkConfig) -> Self {
        Self {
            inner: aws_sdk_cognitoidentityprovider::Client::new(config),
        }
    }

    pub(crate) fn list_user_pools(
        &self,
        max_results: i32,
    ) -> BoxFuture<'static, Result<Vec<UserPoolSummary>, ApiError>> {
        let request = self.inner.list_user_pools().max_results(max_results);
        Box::pin(async move {
            let res = request
                .send()
                .await
                .map_err(|error| ApiError::new(DisplayErrorContext(error).to_string()))?;
            res.user_pools
                .unwrap_or_default()
                .into_iter()
                .map(UserPoolSummary::try_from)
                .collect::<Result<Vec<_>, _>>()
        })
    }

    pub(crate) fn describe_user_pool(
        &self,
        user_pool_id: &str,
    ) -> BoxFuture<'static, Result<UserPool, ApiError>> {
        let request = self.inner.describe_user_pool().user_pool_id(user_pool_id);
        Box::pin(async move {
            request
                .send()
                .await
                .map_err(|error| ApiError::new(DisplayErrorContext(error).to_string()))
                .and_then(UserPool::try_from)
        })
    }

    pub(crate) fn list_user_pool_clients(
        &self,
        user_pool_id: &str,
        max_results: i32,
    ) -> BoxFuture<'static, Result<Vec<UserPoolClientSummary>, ApiError>> {
        let request = self
            .inner
            .list_user_pool_clients()
            .user_pool_id(user_pool_id)
            .max_results(max_results);
        Box::pin(async move {
            let res = request
                .send()
                .await
                .map_err(|error| ApiError::new(DisplayErrorContext(error).to_string()))?;
            res.user_pool_clients
                .unwrap_or_default()
                .into_iter()
                .map(UserPoolClientSummary::try_from)
                .collect::<Result<Vec<_>, _>>()
        })
    }

    pub(crate) fn describe_user_pool_client(
        &self,
        user_pool_id: &str,
        client_id: &str,
    ) -> BoxFuture<'static, Result<UserPoolClient, ApiError>> {
        let request = self
            .inner
            .describe_user_pool_client()
            .user_pool_id(user_pool_id)
            .client_id(client_id);
        Box::pin(async move {
            request
                .send()
                .await
                .map_err(|error| ApiError::new(DisplayErrorContext(error).to_string()))
                .and_then(UserPoolClient::try_from)
        })
    }

    pub(crate) fn describe_user_pool_domain(
        &self,
        domain: &str,
    ) -> BoxFuture<'static, Result<Option<UserPoolDomain>, ApiError>> {
        let request = self.inner.describe_user_pool_domain().domain(domain);
        Box::pin(async move {
            let res = request
                .send()
                .await
                .map_err(|error| ApiError::new(DisplayErrorContext(error).to_string()))?;
            UserPoolDomain::from_description(res.domain_description)
        })
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

macro_rules! invalid_res {
    ($op:literal, $msg:literal) => {
        concat!("invalid ", $op, " response: ", $msg)
    };
}

/// A user pool as it appears in a `ListUserPools` listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserPoolSummary {
    /// The user pool ID.
    pub id: String,

    /// The user pool's display name.
    pub name: String,
}

impl TryFrom<types::UserPoolDescriptionType> for UserPoolSummary {
    type Error = ApiError;

    fn try_from(pool: types::UserPoolDescriptionType) -> Result<Self, Self::Error> {
        Ok(Self {
            id: pool.id.ok_or(invalid_res!("ListUserPools", "missing id"))?,
            name: pool.name.ok_or(invalid_res!("ListUserPools", "missing name"))?,
        })
    }
}

/// A described user pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserPool {
    /// The user pool ID.
    pub id: String,

    /// The user pool's display name.
    pub name: String,

    /// The multi-factor authentication setting, e.g. `OFF`, `ON` or `OPTIONAL`.
    pub mfa_configuration: String,
}

impl TryFrom<operation::describe_user_pool::DescribeUserPoolOutput> for UserPool {
    type Error = ApiError;

    fn try_from(
        res: operation::describe_user_pool::DescribeUserPoolOutput,
    ) -> Result<Self, Self::Error> {
        let pool = res
            .user_pool
            .ok_or(invalid_res!("DescribeUserPool", "missing user_pool"))?;
        Ok(Self {
            id: pool.id.ok_or(invalid_res!("DescribeUserPool", "missing id"))?,
            name: pool.name.unwrap_or_default(),
            mfa_configuration: pool
                .mfa_configuration
                .map(|mfa| mfa.as_str().to_owned())
                .ok_or(invalid_res!("DescribeUserPool", "missing mfa_configuration"))?,
        })
    }
}

/// An app client as it appears in a `ListUserPoolClients` listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserPoolClientSummary {
    /// The app client ID.
    pub client_id: String,

    /// The app client's name, if any.
    pub client_name: Option<String>,
}

impl TryFrom<types::UserPoolClientDescription> for UserPoolClientSummary {
    type Error = ApiError;

    fn try_from(client: types::UserPoolClientDescription) -> Result<Self, Self::Error> {
        Ok(Self {
            client_id: client.client_id.ok_or(invalid_res!(
                "ListUserPoolClients",
                "missing client_id"
            ))?,
            client_name: client.client_name,
        })
    }
}

/// A described app client.
///
/// Absent URL and scope lists are normalised to empty lists.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserPoolClient {
    /// The app client ID.
    pub client_id: String,

    /// The user pool the client is registered with.
    pub user_pool_id: String,

    /// Allowed sign-in redirect URLs, in registration order.
    pub callback_urls: Vec<String>,

    /// Allowed sign-out redirect URLs, in registration order.
    pub logout_urls: Vec<String>,

    /// OAuth scopes the client may request.
    pub allowed_oauth_scopes: Vec<String>,
}

impl TryFrom<operation::describe_user_pool_client::DescribeUserPoolClientOutput>
    for UserPoolClient
{
    type Error = ApiError;

    fn try_from(
        res: operation::describe_user_pool_client::DescribeUserPoolClientOutput,
    ) -> Result<Self, Self::Error> {
        let client = res.user_pool_client.ok_or(invalid_res!(
            "DescribeUserPoolClient",
            "missing user_pool_client"
        ))?;
        Ok(Self {
            client_id: client.client_id.ok_or(invalid_res!(
                "DescribeUserPoolClient",
                "missing client_id"
            ))?,
            user_pool_id: client.user_pool_id.unwrap_or_default(),
            callback_urls: client.callback_urls.unwrap_or_default(),
            logout_urls: client.logout_urls.unwrap_or_default(),
            allowed_oauth_scopes: client.allowed_o_auth_scopes.unwrap_or_default(),
        })
    }
}

/// A described hosted UI domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserPoolDomain {
    /// The domain prefix, i.e. the part before `.auth.<region>.amazoncognito.com`.
    pub domain: String,

    /// The user pool the domain is bound to.
    pub user_pool_id: String,
}

impl UserPoolDomain {
    // Cognito answers `DescribeUserPoolDomain` for an unknown domain with an empty description
    // rather than an error.
    fn from_description(
        description: Option<types::DomainDescriptionType>,
    ) -> Result<Option<Self>, ApiError> {
        let Some(description) = description else {
            return Ok(None);
        };
        match description.domain {
            None => Ok(None),
            Some(domain) => Ok(Some(Self {
                domain,
                user_pool_id: description.user_pool_id.ok_or(invalid_res!(
                    "DescribeUserPoolDomain",
                    "missing user_pool_id"
                ))?,
            })),
        }
    }
}
