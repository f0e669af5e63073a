//! User identity, role, and profile types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors returned by the profile constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileValidationError {
    /// User id was missing or blank once trimmed.
    #[error("user id must not be empty")]
    EmptyId,
    /// User id contained surrounding whitespace.
    #[error("user id must not contain surrounding whitespace")]
    InvalidId,
    /// Email was blank or not shaped like an address.
    #[error("email must contain a local part and a domain")]
    InvalidEmail,
    /// Display name was blank.
    #[error("name must not be empty")]
    EmptyName,
}

/// Stable user identifier as issued by the backend.
///
/// The backend owns the id format, so this stays an opaque validated string
/// rather than assuming any particular encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ProfileValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    fn from_owned(id: String) -> Result<Self, ProfileValidationError> {
        if id.is_empty() {
            return Err(ProfileValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(ProfileValidationError::InvalidId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = ProfileValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Account role as assigned by the backend.
///
/// `Pending` is the transient role of a new OAuth user who has not yet picked
/// buyer or seller; it grants no capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
    Admin,
    Pending,
}

impl Role {
    /// Capability names granted to this role.
    #[must_use]
    pub fn permissions(self) -> &'static [&'static str] {
        match self {
            Self::Admin => &[
                "shop",
                "manage_products",
                "manage_orders",
                "manage_users",
                "view_analytics",
            ],
            Self::Seller => &["shop", "manage_products", "view_analytics"],
            Self::Buyer => &["shop"],
            Self::Pending => &[],
        }
    }

    /// Whether this role grants the named capability.
    #[must_use]
    pub fn has_permission(self, permission: &str) -> bool {
        self.permissions().contains(&permission)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Buyer => "buyer",
            Self::Seller => "seller",
            Self::Admin => "admin",
            Self::Pending => "pending",
        };
        f.write_str(label)
    }
}

/// Authenticated user profile.
///
/// ## Invariants
/// - `id` is non-empty without surrounding whitespace.
/// - `email` contains a local part and a domain.
/// - `name` is non-empty once trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "UserProfileDto", into = "UserProfileDto")]
pub struct UserProfile {
    id: UserId,
    role: Role,
    email: String,
    name: String,
}

impl UserProfile {
    /// Build a profile from validated parts.
    pub fn new(
        id: UserId,
        role: Role,
        email: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, ProfileValidationError> {
        let email = email.into();
        if !is_plausible_email(&email) {
            return Err(ProfileValidationError::InvalidEmail);
        }
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ProfileValidationError::EmptyName);
        }
        Ok(Self {
            id,
            role,
            email,
            name,
        })
    }

    /// Stable user identifier.
    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Account role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Contact email address.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Copy of this profile with a different role.
    ///
    /// Only the role-selection flow for `Pending` accounts may use this; the
    /// session store enforces that restriction.
    #[must_use]
    pub(crate) fn with_role(&self, role: Role) -> Self {
        Self {
            role,
            ..self.clone()
        }
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserProfileDto {
    id: String,
    role: Role,
    email: String,
    name: String,
}

impl From<UserProfile> for UserProfileDto {
    fn from(value: UserProfile) -> Self {
        let UserProfile {
            id,
            role,
            email,
            name,
        } = value;
        Self {
            id: id.into(),
            role,
            email,
            name,
        }
    }
}

impl TryFrom<UserProfileDto> for UserProfile {
    type Error = ProfileValidationError;

    fn try_from(value: UserProfileDto) -> Result<Self, Self::Error> {
        let UserProfileDto {
            id,
            role,
            email,
            name,
        } = value;
        UserProfile::new(UserId::new(id)?, role, email, name)
    }
}
