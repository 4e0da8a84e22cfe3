//! The Amplify configuration document and its textual forms.
//!
//! Field names and field order are consumed by the Amplify client libraries and must not change.

#![allow(missing_docs)]

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The root of an `amplifyconfiguration` document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmplifyConfiguration {
    #[serde(rename = "UserAgent")]
    pub user_agent: String,

    #[serde(rename = "Version")]
    pub version: String,

    pub auth: Auth,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auth {
    pub plugins: Plugins,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plugins {
    #[serde(rename = "awsCognitoAuthPlugin")]
    pub aws_cognito_auth_plugin: AwsCognitoAuthPlugin,
}

/// Settings for the Cognito auth plugin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AwsCognitoAuthPlugin {
    pub user_agent: String,
    pub version: String,
    pub identity_manager: DefaultEntry<IdentityManager>,
    pub credentials_provider: CredentialsProvider,
    pub cognito_user_pool: DefaultEntry<CognitoUserPool>,
    pub auth: DefaultEntry<AuthDefault>,
}

/// A section keyed by the `Default` configuration name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultEntry<T> {
    #[serde(rename = "Default")]
    pub default: T,
}

impl<T> From<T> for DefaultEntry<T> {
    fn from(default: T) -> Self {
        Self { default }
    }
}

/// Always an empty object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityManager {}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CredentialsProvider {
    pub cognito_identity: DefaultEntry<CognitoIdentity>,
}

/// The identity pool that vends AWS credentials.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CognitoIdentity {
    pub pool_id: String,
    pub region: String,
}

/// The user pool and app client users sign in with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CognitoUserPool {
    pub pool_id: String,
    pub app_client_id: String,
    pub region: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthDefault {
    #[serde(rename = "OAuth")]
    pub oauth: OAuth,
    pub authentication_flow_type: String,
    pub social_providers: Vec<String>,
    pub username_attributes: Vec<String>,
    pub signup_attributes: Vec<String>,
    pub password_protection_settings: PasswordProtectionSettings,
    pub mfa_configuration: String,
    pub mfa_types: Vec<String>,
    pub verification_mechanisms: Vec<String>,
}

/// Hosted UI settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth {
    #[serde(rename = "WebDomain")]
    pub web_domain: String,

    #[serde(rename = "AppClientId")]
    pub app_client_id: String,

    /// Comma-separated callback URLs.
    #[serde(rename = "SignInRedirectURI")]
    pub sign_in_redirect_uri: String,

    /// Comma-separated logout URLs.
    #[serde(rename = "SignOutRedirectURI")]
    pub sign_out_redirect_uri: String,

    #[serde(rename = "Scopes")]
    pub scopes: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordProtectionSettings {
    pub password_policy_min_length: u32,
    pub password_policy_characters: Vec<String>,
}

impl AmplifyConfiguration {
    /// Serialize the document as JSON indented with four spaces.
    ///
    /// Field order is fixed by the type definitions, so the output is stable for equal documents.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;

        // serde_json only ever writes valid UTF-8
        String::from_utf8(buf).map_err(<serde_json::Error as serde::ser::Error>::custom)
    }

    /// Render the document in the given output format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render(&self, format: OutputFormat) -> Result<String, serde_json::Error> {
        let json = self.to_json()?;
        Ok(match format {
            OutputFormat::Json => json,
            OutputFormat::Dart => format!("const amplifyconfig = '''\n{json}\n''';"),
        })
    }
}

/// The textual form the document is written in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// A plain JSON document, e.g. `amplifyconfiguration.json`.
    #[default]
    Json,

    /// A Dart source file declaring `const amplifyconfig`, e.g. `amplifyconfiguration.dart`.
    Dart,
}

impl FromStr for OutputFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "dart" => Ok(Self::Dart),
            other => Err(UnknownFormat(other.to_owned())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Dart => "dart",
        })
    }
}

/// An unrecognised output format name.
#[derive(Debug, thiserror::Error)]
#[error("unknown output format {0:?}; expected \"json\" or \"dart\"")]
pub struct UnknownFormat(String);
