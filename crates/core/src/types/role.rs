//! Account-level and store-level roles.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Account-level role attached to a user.
///
/// Stored and serialized as the variant name (`"Admin"`, `"StoreOwner"`,
/// `"Clerk"`). Users without an explicit role default to [`Role::StoreOwner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    /// Full access to every store.
    Admin,
    /// Can create stores and manage the ones they own.
    #[default]
    StoreOwner,
    /// Can only work in stores they have been granted access to.
    Clerk,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "Admin"),
            Self::StoreOwner => write!(f, "StoreOwner"),
            Self::Clerk => write!(f, "Clerk"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Self::Admin),
            "StoreOwner" => Ok(Self::StoreOwner),
            "Clerk" => Ok(Self::Clerk),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Role a user holds within one specific store.
///
/// Owners hold this implicitly for their own stores; access grants carry it
/// explicitly for everyone else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StoreRole {
    /// Store owner.
    Owner,
    /// Granted collaborator.
    #[default]
    Clerk,
}

impl fmt::Display for StoreRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner => write!(f, "Owner"),
            Self::Clerk => write!(f, "Clerk"),
        }
    }
}

impl std::str::FromStr for StoreRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Owner" => Ok(Self::Owner),
            "Clerk" => Ok(Self::Clerk),
            _ => Err(format!("invalid store role: {s}")),
        }
    }
}

// SQLx support (with postgres feature)

#[cfg(feature = "postgres")]
macro_rules! impl_text_sqlx {
    ($name:ident) => {
        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                s.parse().map_err(Into::into)
            }
        }

        impl sqlx::Encode<'_, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.to_string(), buf)
            }
        }
    };
}

#[cfg(feature = "postgres")]
impl_text_sqlx!(Role);

#[cfg(feature = "postgres")]
impl_text_sqlx!(StoreRole);
