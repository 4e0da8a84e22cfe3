//! Assembles an [`AmplifyConfiguration`] from the Cognito resources matching a name prefix.

use std::fmt;

use crate::{
    document::{
        AmplifyConfiguration, Auth, AuthDefault, AwsCognitoAuthPlugin, CognitoIdentity,
        CognitoUserPool, CredentialsProvider, IdentityManager, OAuth, PasswordProtectionSettings,
        Plugins,
    },
    ApiError, IdentityApi, IdentityPool, Region, UserPool, UserPoolClient, UserPoolDomain,
};

/// Page size for every listing. Only the first page is searched.
pub const MAX_RESULTS: i32 = 60;

/// Suffix of Cognito hosted UI domains, after `<domain>.auth.<region>.`.
pub const HOSTED_UI_SUFFIX: &str = "amazoncognito.com";

const USER_AGENT: &str = "aws-amplify-cli/2.0";
const VERSION: &str = "1.0";
const PLUGIN_USER_AGENT: &str = "aws-amplify-cli/0.1.0";
const PLUGIN_VERSION: &str = "0.1.0";

// Not discoverable through the Cognito APIs. Amplify clients expect these values.
const AUTHENTICATION_FLOW_TYPE: &str = "USER_SRP_AUTH";
const MFA_TYPES: &[&str] = &["SMS"];
const SIGNUP_ATTRIBUTES: &[&str] = &["EMAIL", "NAME"];
const VERIFICATION_MECHANISMS: &[&str] = &["EMAIL"];
const PASSWORD_POLICY_MIN_LENGTH: u32 = 8;

/// Builds an Amplify configuration by querying Cognito.
///
/// The user pool, hosted UI domain and identity pool are located by `prefix`. The app client is
/// the first one registered with the user pool.
///
/// # Example
///
/// ```no_run
/// # #[tokio::main] async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use amplify_config_hook::{ConfigBuilder, Connection};
///
/// let connection = Connection::builder().build().await?;
/// let config = ConfigBuilder::new(&connection, "My").build().await?;
/// println!("{}", config.to_json()?);
/// # Ok(()) }
/// ```
#[derive(Debug)]
pub struct ConfigBuilder<'a, A: ?Sized> {
    api: &'a A,
    prefix: &'a str,
}

impl<'a, A> ConfigBuilder<'a, A>
where
    A: IdentityApi + ?Sized,
{
    /// Construct a builder that locates resources whose names start with `prefix`.
    pub fn new(api: &'a A, prefix: &'a str) -> Self {
        Self { api, prefix }
    }

    /// Describe the first user pool whose name starts with the prefix.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::NotFound`] if no user pool matches, or [`AssemblyError::Api`] if a
    /// Cognito call fails.
    pub async fn fetch_user_pool(&self) -> Result<UserPool, AssemblyError> {
        let lookup = Lookup::UserPool;
        let listing = self
            .api
            .list_user_pools(MAX_RESULTS)
            .await
            .map_err(|error| AssemblyError::api(lookup, error))?;
        let summary = first_with_prefix(listing, self.prefix, |pool| pool.name.as_str(), lookup)?;
        tracing::debug!(id = %summary.id, name = %summary.name, "selected user pool");

        self.api
            .describe_user_pool(&summary.id)
            .await
            .map_err(|error| AssemblyError::api(lookup, error))
    }

    /// Describe the first app client registered with the given user pool.
    ///
    /// Clients are not filtered by name.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::NotFound`] if the user pool has no clients, or
    /// [`AssemblyError::Api`] if a Cognito call fails.
    pub async fn fetch_user_pool_client(
        &self,
        user_pool_id: &str,
    ) -> Result<UserPoolClient, AssemblyError> {
        let lookup = Lookup::UserPoolClient;
        let listing = self
            .api
            .list_user_pool_clients(user_pool_id, MAX_RESULTS)
            .await
            .map_err(|error| AssemblyError::api(lookup, error))?;
        if listing.len() > 1 {
            tracing::warn!(
                user_pool_id,
                clients = listing.len(),
                "user pool has more than one app client; using the first"
            );
        }
        let summary = listing
            .into_iter()
            .next()
            .ok_or_else(|| AssemblyError::not_found(lookup, user_pool_id))?;
        tracing::debug!(client_id = %summary.client_id, "selected app client");

        self.api
            .describe_user_pool_client(user_pool_id, &summary.client_id)
            .await
            .map_err(|error| AssemblyError::api(lookup, error))
    }

    /// Describe the hosted UI domain named `<prefix>-user-pool-domain`.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::NotFound`] if there's no such domain, or [`AssemblyError::Api`] if
    /// the Cognito call fails.
    pub async fn fetch_user_pool_domain(&self) -> Result<UserPoolDomain, AssemblyError> {
        let lookup = Lookup::UserPoolDomain;
        let name = domain_name(self.prefix);
        let domain = self
            .api
            .describe_user_pool_domain(&name)
            .await
            .map_err(|error| AssemblyError::api(lookup, error))?
            .ok_or_else(|| AssemblyError::not_found(lookup, &name))?;
        tracing::debug!(domain = %domain.domain, "selected user pool domain");
        Ok(domain)
    }

    /// Describe the first identity pool whose name starts with the prefix.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::NotFound`] if no identity pool matches, or [`AssemblyError::Api`]
    /// if a Cognito call fails.
    pub async fn fetch_identity_pool(&self) -> Result<IdentityPool, AssemblyError> {
        let lookup = Lookup::IdentityPool;
        let listing = self
            .api
            .list_identity_pools(MAX_RESULTS)
            .await
            .map_err(|error| AssemblyError::api(lookup, error))?;
        let summary = first_with_prefix(listing, self.prefix, |pool| pool.name.as_str(), lookup)?;
        tracing::debug!(id = %summary.id, name = %summary.name, "selected identity pool");

        self.api
            .describe_identity_pool(&summary.id)
            .await
            .map_err(|error| AssemblyError::api(lookup, error))
    }

    /// Locate every resource and assemble the configuration.
    ///
    /// Lookups run one after another and the first failure aborts the build.
    ///
    /// # Errors
    ///
    /// Returns the first [`AssemblyError`] encountered.
    pub async fn build(&self) -> Result<AmplifyConfiguration, AssemblyError> {
        let user_pool = self.fetch_user_pool().await?;
        let client = self.fetch_user_pool_client(&user_pool.id).await?;
        let domain = self.fetch_user_pool_domain().await?;
        let identity_pool = self.fetch_identity_pool().await?;

        Ok(assemble(
            &user_pool,
            &client,
            &domain,
            &identity_pool,
            self.api.region(),
        ))
    }
}

/// Combine located resources into an Amplify configuration.
#[must_use]
pub fn assemble(
    user_pool: &UserPool,
    client: &UserPoolClient,
    domain: &UserPoolDomain,
    identity_pool: &IdentityPool,
    region: &Region,
) -> AmplifyConfiguration {
    let region = region.to_string();

    let oauth = OAuth {
        web_domain: web_domain(&domain.domain, &region),
        app_client_id: client.client_id.clone(),
        sign_in_redirect_uri: client.callback_urls.join(","),
        sign_out_redirect_uri: client.logout_urls.join(","),
        scopes: client.allowed_oauth_scopes.clone(),
    };

    let auth = AuthDefault {
        oauth,
        authentication_flow_type: AUTHENTICATION_FLOW_TYPE.to_owned(),
        social_providers: Vec::new(),
        username_attributes: Vec::new(),
        signup_attributes: to_strings(SIGNUP_ATTRIBUTES),
        password_protection_settings: PasswordProtectionSettings {
            password_policy_min_length: PASSWORD_POLICY_MIN_LENGTH,
            password_policy_characters: Vec::new(),
        },
        mfa_configuration: user_pool.mfa_configuration.clone(),
        mfa_types: to_strings(MFA_TYPES),
        verification_mechanisms: to_strings(VERIFICATION_MECHANISMS),
    };

    let plugin = AwsCognitoAuthPlugin {
        user_agent: PLUGIN_USER_AGENT.to_owned(),
        version: PLUGIN_VERSION.to_owned(),
        identity_manager: IdentityManager::default().into(),
        credentials_provider: CredentialsProvider {
            cognito_identity: CognitoIdentity {
                pool_id: identity_pool.id.clone(),
                region: region.clone(),
            }
            .into(),
        },
        cognito_user_pool: CognitoUserPool {
            pool_id: user_pool.id.clone(),
            app_client_id: client.client_id.clone(),
            region,
        }
        .into(),
        auth: auth.into(),
    };

    AmplifyConfiguration {
        user_agent: USER_AGENT.to_owned(),
        version: VERSION.to_owned(),
        auth: Auth {
            plugins: Plugins {
                aws_cognito_auth_plugin: plugin,
            },
        },
    }
}

/// The publicly reachable hosted UI domain.
#[must_use]
pub fn web_domain(domain: &str, region: &str) -> String {
    format!("{domain}.auth.{region}.{HOSTED_UI_SUFFIX}")
}

fn domain_name(prefix: &str) -> String {
    format!("{prefix}-user-pool-domain")
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|&value| value.to_owned()).collect()
}

fn first_with_prefix<T>(
    items: Vec<T>,
    prefix: &str,
    name: impl Fn(&T) -> &str,
    lookup: Lookup,
) -> Result<T, AssemblyError> {
    let mut matches = items
        .into_iter()
        .filter(|item| name(item).starts_with(prefix));
    let first = matches
        .next()
        .ok_or_else(|| AssemblyError::not_found(lookup, prefix))?;

    let others = matches.count();
    if others > 0 {
        tracing::warn!(%lookup, prefix, others, "prefix matched more than one resource; using the first");
    }
    Ok(first)
}

/// The resource a lookup was searching for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup {
    /// The user pool, by name prefix.
    UserPool,

    /// The app client of the user pool.
    UserPoolClient,

    /// The hosted UI domain, by exact name.
    UserPoolDomain,

    /// The identity pool, by name prefix.
    IdentityPool,
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::UserPool => "user pool",
            Self::UserPoolClient => "user pool client",
            Self::UserPoolDomain => "user pool domain",
            Self::IdentityPool => "identity pool",
        })
    }
}

/// An error that occurred while assembling the configuration.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::module_name_repetitions)]
pub enum AssemblyError {
    /// A lookup matched no resource.
    ///
    /// `key` is what was searched for: the name prefix, the user pool ID for app clients, or the
    /// exact domain name.
    #[error("no {lookup} found for {key:?}")]
    NotFound {
        /// The failed lookup.
        lookup: Lookup,
        /// What was searched for.
        key: String,
    },

    /// A Cognito call failed during a lookup.
    #[error("failed to look up {lookup}: {error}")]
    Api {
        /// The failed lookup.
        lookup: Lookup,
        /// The underlying error.
        error: ApiError,
    },
}

impl AssemblyError {
    fn not_found(lookup: Lookup, key: &str) -> Self {
        Self::NotFound {
            lookup,
            key: key.to_owned(),
        }
    }

    fn api(lookup: Lookup, error: ApiError) -> Self {
        Self::Api { lookup, error }
    }
}
