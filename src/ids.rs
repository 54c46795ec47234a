//! Opaque resource identifiers.
//!
//! Every resource kind gets its own newtype over the server-assigned string,
//! so a [`JobId`] can never be passed where a [`GrantId`] is expected.
//! On the wire they are plain strings (`#[serde(transparent)]`).

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! resource_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

resource_id!(
    /// Identifier of a compute job.
    JobId
);
resource_id!(
    /// Identifier of an access grant.
    GrantId
);
resource_id!(
    /// Identifier of a platform identity (user or app principal).
    IdentityId
);
resource_id!(
    /// Identifier of a stored document.
    DocumentId
);
resource_id!(
    /// Identifier of the consent a grant was issued under.
    ConsentId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = JobId::new("J8yNbPQbRk");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""J8yNbPQbRk""#);

        let parsed: GrantId = serde_json::from_str(r#""Gxyz""#).unwrap();
        assert_eq!(parsed.as_str(), "Gxyz");
    }

    #[test]
    fn display_is_the_raw_id() {
        assert_eq!(IdentityId::from("I123").to_string(), "I123");
    }
}
