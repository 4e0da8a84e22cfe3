//! In-memory [`IdentityApi`] for tests.

use std::sync::Mutex;

use futures::future::{self, BoxFuture};

use crate::{
    ApiError, IdentityApi, IdentityPool, IdentityPoolSummary, Region, UserPool, UserPoolClient,
    UserPoolClientSummary, UserPoolDomain, UserPoolSummary,
};

#[derive(Debug)]
pub(crate) struct FakeCognito {
    region: Region,
    pub(crate) user_pools: Vec<UserPool>,
    pub(crate) clients: Vec<UserPoolClient>,
    pub(crate) domains: Vec<UserPoolDomain>,
    pub(crate) identity_pools: Vec<IdentityPool>,
    failing: Option<&'static str>,
    calls: Mutex<Vec<String>>,
}

impl FakeCognito {
    pub(crate) fn new(region: &'static str) -> Self {
        Self {
            region: Region::new(region),
            user_pools: Vec::new(),
            clients: Vec::new(),
            domains: Vec::new(),
            identity_pools: Vec::new(),
            failing: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A `My` deployment next to an unrelated `Other` one, with the `Other` resources listed
    /// first.
    pub(crate) fn scenario() -> Self {
        let mut fake = Self::new("us-east-1");
        fake.add_user_pool("us-east-1_OtherPool", "OtherUserPool", "ON");
        fake.add_user_pool("us-east-1_MyPool", "MyUserPool", "OFF");
        fake.add_client(UserPoolClient {
            client_id: "other-client".to_string(),
            user_pool_id: "us-east-1_OtherPool".to_string(),
            ..UserPoolClient::default()
        });
        fake.add_client(UserPoolClient {
            client_id: "my-client".to_string(),
            user_pool_id: "us-east-1_MyPool".to_string(),
            callback_urls: vec!["https://a".to_string()],
            logout_urls: vec!["https://b".to_string()],
            allowed_oauth_scopes: vec!["email".to_string()],
        });
        fake.domains.push(UserPoolDomain {
            domain: "My-user-pool-domain".to_string(),
            user_pool_id: "us-east-1_MyPool".to_string(),
        });
        fake.identity_pools.push(IdentityPool {
            id: "us-east-1:other-identity".to_string(),
            name: "OtherIdentityPool".to_string(),
        });
        fake.identity_pools.push(IdentityPool {
            id: "us-east-1:my-identity".to_string(),
            name: "MyIdentityPool".to_string(),
        });
        fake
    }

    pub(crate) fn add_user_pool(&mut self, id: &str, name: &str, mfa_configuration: &str) {
        self.user_pools.push(UserPool {
            id: id.to_string(),
            name: name.to_string(),
            mfa_configuration: mfa_configuration.to_string(),
        });
    }

    pub(crate) fn add_client(&mut self, client: UserPoolClient) {
        self.clients.push(client);
    }

    /// Make every call to `operation` fail.
    pub(crate) fn fail_on(&mut self, operation: &'static str) {
        self.failing = Some(operation);
    }

    /// Calls made so far, as `"<Operation> <args...>"`.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn call<T: Send + 'static>(
        &self,
        operation: &'static str,
        args: &[&str],
        respond: impl FnOnce() -> Result<T, ApiError>,
    ) -> BoxFuture<'_, Result<T, ApiError>> {
        let mut call = operation.to_string();
        for arg in args {
            call.push(' ');
            call.push_str(arg);
        }
        self.calls.lock().unwrap().push(call);

        let result = if self.failing == Some(operation) {
            Err(ApiError::new(format!(
                "ThrottlingException: {operation} rate exceeded"
            )))
        } else {
            respond()
        };
        Box::pin(future::ready(result))
    }
}

fn not_found(what: &str) -> ApiError {
    ApiError::new(format!("ResourceNotFoundException: {what} does not exist"))
}

impl IdentityApi for FakeCognito {
    fn region(&self) -> &Region {
        &self.region
    }

    fn list_user_pools(
        &self,
        max_results: i32,
    ) -> BoxFuture<'_, Result<Vec<UserPoolSummary>, ApiError>> {
        let max_results = max_results.to_string();
        self.call("ListUserPools", &[max_results.as_str()], || {
            Ok(self
                .user_pools
                .iter()
                .map(|pool| UserPoolSummary {
                    id: pool.id.clone(),
                    name: pool.name.clone(),
                })
                .collect())
        })
    }

    fn describe_user_pool(&self, user_pool_id: &str) -> BoxFuture<'_, Result<UserPool, ApiError>> {
        self.call("DescribeUserPool", &[user_pool_id], || {
            self.user_pools
                .iter()
                .find(|pool| pool.id == user_pool_id)
                .cloned()
                .ok_or_else(|| not_found(user_pool_id))
        })
    }

    fn list_user_pool_clients(
        &self,
        user_pool_id: &str,
        max_results: i32,
    ) -> BoxFuture<'_, Result<Vec<UserPoolClientSummary>, ApiError>> {
        let max_results = max_results.to_string();
        self.call(
            "ListUserPoolClients",
            &[user_pool_id, max_results.as_str()],
            || {
                Ok(self
                    .clients
                    .iter()
                    .filter(|client| client.user_pool_id == user_pool_id)
                    .map(|client| UserPoolClientSummary {
                        client_id: client.client_id.clone(),
                        client_name: None,
                    })
                    .collect())
            },
        )
    }

    fn describe_user_pool_client(
        &self,
        user_pool_id: &str,
        client_id: &str,
    ) -> BoxFuture<'_, Result<UserPoolClient, ApiError>> {
        self.call("DescribeUserPoolClient", &[user_pool_id, client_id], || {
            self.clients
                .iter()
                .find(|client| client.user_pool_id == user_pool_id && client.client_id == client_id)
                .cloned()
                .ok_or_else(|| not_found(client_id))
        })
    }

    fn describe_user_pool_domain(
        &self,
        domain: &str,
    ) -> BoxFuture<'_, Result<Option<UserPoolDomain>, ApiError>> {
        self.call("DescribeUserPoolDomain", &[domain], || {
            Ok(self
                .domains
                .iter()
                .find(|candidate| candidate.domain == domain)
                .cloned())
        })
    }

    fn list_identity_pools(
        &self,
        max_results: i32,
    ) -> BoxFuture<'_, Result<Vec<IdentityPoolSummary>, ApiError>> {
        let max_results = max_results.to_string();
        self.call("ListIdentityPools", &[max_results.as_str()], || {
            Ok(self
                .identity_pools
                .iter()
                .map(|pool| IdentityPoolSummary {
                    id: pool.id.clone(),
                    name: pool.name.clone(),
                })
                .collect())
        })
    }

    fn describe_identity_pool(
        &self,
        identity_pool_id: &str,
    ) -> BoxFuture<'_, Result<IdentityPool, ApiError>> {
        self.call("DescribeIdentityPool", &[identity_pool_id], || {
            self.identity_pools
                .iter()
                .find(|pool| pool.id == identity_pool_id)
                .cloned()
                .ok_or_else(|| not_found(identity_pool_id))
        })
    }
}
