//! Cleaned up Cognito identity pools API.

use std::fmt;

use aws_config::SdkConfig;
use aws_sdk_cognitoidentity::{error::DisplayErrorContext, operation, types};
use futures::future::BoxFuture;

use crate::ApiError;

pub(crate) struct Client {
    inner: aws_sdk_cognitoidentity::Client,
}

impl Client {
    pub(crate) fn new(config: &SdkConfig) -> Self {
        Self {
            inner: aws_sdk_cognitoidentity::Client::new(config),
        }
    }

    pub(crate) fn list_identity_pools(
        &self,
        max_results: i32,
    ) -> BoxFuture<'static, Result<Vec<IdentityPoolSummary>, ApiError>> {
        let request = self.inner.list_identity_pools().max_results(max_results);
        Box::pin(async move {
            let res = request
                .send()
                .await
                .map_err(|error| ApiError::new(DisplayErrorContext(error).to_string()))?;
            res.identity_pools
                .unwrap_or_default()
                .into_iter()
                .map(IdentityPoolSummary::try_from)
                .collect::<Result<Vec<_>, _>>()
        })
    }

    pub(crate) fn describe_identity_pool(
        &self,
        identity_pool_id: &str,
    ) -> BoxFuture<'static, Result<IdentityPool, ApiError>> {
        let request = self
            .inner
            .describe_identity_pool()
            .identity_pool_id(identity_pool_id);
        Box::pin(async move {
            request
                .send()
                .await
                .map(IdentityPool::from)
                .map_err(|error| ApiError::new(DisplayErrorContext(error).to_string()))
        })
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

/// An identity pool as it appears in a `ListIdentityPools` listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityPoolSummary {
    /// The identity pool ID, e.g. `us-east-1:0000-...`.
    pub id: String,

    /// The identity pool's display name.
    pub name: String,
}

impl TryFrom<types::IdentityPoolShortDescription> for IdentityPoolSummary {
    type Error = ApiError;

    fn try_from(pool: types::IdentityPoolShortDescription) -> Result<Self, Self::Error> {
        macro_rules! invalid_res {
            ($msg:literal) => {
                concat!("invalid ListIdentityPools response: ", $msg)
            };
        }

        Ok(Self {
            id: pool
                .identity_pool_id
                .ok_or(invalid_res!("missing identity_pool_id"))?,
            name: pool
                .identity_pool_name
                .ok_or(invalid_res!("missing identity_pool_name"))?,
        })
    }
}

/// A described identity pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityPool {
    /// The identity pool ID.
    pub id: String,

    /// The identity pool's display name.
    pub name: String,
}

impl From<operation::describe_identity_pool::DescribeIdentityPoolOutput> for IdentityPool {
    fn from(res: operation::describe_identity_pool::DescribeIdentityPoolOutput) -> Self {
        Self {
            id: res.identity_pool_id,
            name: res.identity_pool_name,
        }
    }
}
