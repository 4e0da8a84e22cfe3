// A wrapper around the SDK region type to avoid exposing it in the API.

use std::{borrow::Cow, fmt};

use aws_sdk_cognitoidentityprovider::config::Region as SdkRegion;

/// An AWS region.
///
/// The region is part of the generated document (`Region` fields and the hosted UI domain), so
/// it is carried explicitly by every [`IdentityApi`](crate::IdentityApi) implementation.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct Region(pub(crate) SdkRegion);

impl Region {
    /// Construct a new `Region` for the given string.
    pub fn new(region: impl Into<Cow<'static, str>>) -> Self {
        Self(SdkRegion::new(region))
    }
}

impl AsRef<str> for Region {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

impl From<SdkRegion> for Region {
    fn from(region: SdkRegion) -> Self {
        Self(region)
    }
}

impl std::str::FromStr for Region {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s.to_owned()))
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}
