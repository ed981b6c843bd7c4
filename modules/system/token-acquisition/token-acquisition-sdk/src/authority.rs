//! Identity-provider authorities.
//!
//! An [`Authority`] is a tagged variant over the provider family. Each
//! variant carries only the fields that are meaningful for that family, so
//! the multi-cloud flag exists on [`DirectoryAuthority`] alone.

use std::fmt;

use url::Url;

use crate::error::TokenAcquisitionError;

const B2C_PATH_SEGMENT: &str = "tfp";
const ADFS_PATH_SEGMENT: &str = "adfs";

/// Provider family of an [`Authority`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorityKind {
    Directory,
    B2C,
    Adfs,
}

impl fmt::Display for AuthorityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Directory => "directory",
            Self::B2C => "b2c",
            Self::Adfs => "adfs",
        };
        f.write_str(name)
    }
}

/// Canonical identity-provider tenant/endpoint descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authority {
    /// Directory tenant, e.g. `https://login.microsoftonline.com/common`.
    Directory(DirectoryAuthority),
    /// Policy-based tenant, e.g. `https://login.example.com/tfp/contoso.onmicrosoft.com/B2C_1_signin`.
    B2C(B2CAuthority),
    /// Federation server, e.g. `https://sts.contoso.com/adfs`.
    Adfs(AdfsAuthority),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryAuthority {
    uri: Url,
    tenant: String,
    multiple_clouds_supported: bool,
}

impl DirectoryAuthority {
    #[must_use]
    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    #[must_use]
    pub fn multiple_clouds_supported(&self) -> bool {
        self.multiple_clouds_supported
    }

    /// Returns a copy with the multi-cloud flag set.
    #[must_use]
    pub fn with_multiple_clouds_supported(self, supported: bool) -> Self {
        Self {
            multiple_clouds_supported: supported,
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct B2CAuthority {
    uri: Url,
    tenant: String,
    policy: String,
}

impl B2CAuthority {
    #[must_use]
    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    #[must_use]
    pub fn policy(&self) -> &str {
        &self.policy
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdfsAuthority {
    uri: Url,
}

impl Authority {
    /// Parses an authority URL.
    ///
    /// The canonical form keeps scheme, lowercase host, explicit non-default
    /// port and the non-empty path segments; a trailing slash is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`TokenAcquisitionError::InvalidAuthority`] if the URL cannot
    /// be parsed, is not `https`, carries credentials, a query or a fragment,
    /// or its path matches no provider family.
    pub fn parse(raw: &str) -> Result<Self, TokenAcquisitionError> {
        let invalid = |reason: &str| TokenAcquisitionError::invalid_authority(raw, reason);

        let url = Url::parse(raw.trim()).map_err(|e| invalid(&e.to_string()))?;
        if url.scheme() != "https" {
            return Err(invalid("authority must use the https scheme"));
        }
        let Some(host) = url.host_str() else {
            return Err(invalid("authority has no host"));
        };
        if !url.username().is_empty() || url.password().is_some() {
            return Err(invalid("authority must not carry credentials"));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("authority must not carry a query or fragment"));
        }

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();
        let uri = Url::parse(&format!("https://{host}{port}/{}", segments.join("/")))
            .map_err(|e| invalid(&e.to_string()))?;

        match segments.as_slice() {
            [] => Err(invalid("authority has no tenant segment")),
            [first, tenant, policy] if first.eq_ignore_ascii_case(B2C_PATH_SEGMENT) => {
                Ok(Self::B2C(B2CAuthority {
                    uri,
                    tenant: (*tenant).to_owned(),
                    policy: (*policy).to_owned(),
                }))
            }
            [first, ..] if first.eq_ignore_ascii_case(B2C_PATH_SEGMENT) => Err(invalid(
                "b2c authority must be of the form /tfp/<tenant>/<policy>",
            )),
            [first] if first.eq_ignore_ascii_case(ADFS_PATH_SEGMENT) => {
                Ok(Self::Adfs(AdfsAuthority { uri }))
            }
            [tenant] => Ok(Self::Directory(DirectoryAuthority {
                uri,
                tenant: (*tenant).to_owned(),
                multiple_clouds_supported: false,
            })),
            _ => Err(invalid("authority path matches no known provider")),
        }
    }

    #[must_use]
    pub fn kind(&self) -> AuthorityKind {
        match self {
            Self::Directory(_) => AuthorityKind::Directory,
            Self::B2C(_) => AuthorityKind::B2C,
            Self::Adfs(_) => AuthorityKind::Adfs,
        }
    }

    /// Canonical authority URI.
    #[must_use]
    pub fn uri(&self) -> &Url {
        match self {
            Self::Directory(a) => &a.uri,
            Self::B2C(a) => &a.uri,
            Self::Adfs(a) => &a.uri,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.uri().as_str()
    }

    /// Tenant segment, absent for ADFS.
    #[must_use]
    pub fn tenant(&self) -> Option<&str> {
        match self {
            Self::Directory(a) => Some(a.tenant()),
            Self::B2C(a) => Some(a.tenant()),
            Self::Adfs(_) => None,
        }
    }

    /// Host of the authority, used as the account environment.
    #[must_use]
    pub fn environment(&self) -> &str {
        self.uri().host_str().unwrap_or_default()
    }

    /// Always `false` outside the directory family.
    #[must_use]
    pub fn multiple_clouds_supported(&self) -> bool {
        match self {
            Self::Directory(a) => a.multiple_clouds_supported(),
            Self::B2C(_) | Self::Adfs(_) => false,
        }
    }

    #[must_use]
    pub fn authorization_endpoint(&self) -> Url {
        self.endpoint("authorize")
    }

    #[must_use]
    pub fn token_endpoint(&self) -> Url {
        self.endpoint("token")
    }

    fn endpoint(&self, leaf: &str) -> Url {
        let mut url = self.uri().clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            match self {
                Self::Adfs(_) => segments.extend(["oauth2", leaf]),
                Self::Directory(_) | Self::B2C(_) => segments.extend(["oauth2", "v2.0", leaf]),
            };
        }
        url
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
