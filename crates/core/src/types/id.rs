//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. IDs are backed by
//! `String` because the remote document store assigns opaque string keys.

use chrono::Utc;
use rand::Rng;
use rand::distr::Alphanumeric;

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>` and `From<&str>` implementations
///
/// # Example
///
/// ```rust
/// # use studyhub_core::define_id;
/// define_id!(UserId);
/// define_id!(DocumentId);
///
/// let user_id = UserId::new("u-1");
/// let doc_id = DocumentId::new("u-1");
///
/// // These are different types, so this won't compile:
/// // let _: UserId = doc_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(PrincipalId);
define_id!(CourseId);
define_id!(ResourceId);

/// Length of the random suffix in generated IDs.
const ID_SUFFIX_LEN: usize = 9;

impl CourseId {
    /// Generate a fresh course ID.
    ///
    /// Course IDs are assigned client-side before the create call reaches
    /// the store: a millisecond timestamp joined to a short random
    /// alphanumeric suffix, e.g. `1717430400000_x4k9qht2z`.
    #[must_use]
    pub fn generate() -> Self {
        let suffix: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(ID_SUFFIX_LEN)
            .map(|b| char::from(b.to_ascii_lowercase()))
            .collect();
        Self(format!("{}_{}", Utc::now().timestamp_millis(), suffix))
    }
}

impl ResourceId {
    /// Generate a fresh resource ID using the same composite shape as
    /// [`CourseId::generate`].
    #[must_use]
    pub fn generate() -> Self {
        let CourseId(inner) = CourseId::generate();
        Self(inner)
    }
}
