//! Newtype IDs for the site's tables.
//!
//! Every table keyed by a serial integer gets its own ID type so a customer
//! ID can never be passed where a campaign ID is expected.

/// Define a type-safe `i32` ID wrapper.
///
/// The generated type is `Copy`, serializes as a bare number, parses from a
/// string (for path segments and CLI arguments), and implements the `sqlx`
/// `Type`/`Encode`/`Decode` traits when the `postgres` feature is enabled.
///
/// # Example
///
/// ```rust
/// # use pss_core::define_id;
/// define_id!(NoteId);
/// define_id!(TagId);
///
/// let note = NoteId::new(7);
/// assert_eq!(note.as_i32(), 7);
/// assert_eq!("7".parse::<NoteId>().ok(), Some(note));
/// // let _: TagId = note; // does not compile
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Wrap a raw database key.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// The raw database key.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<i32>().map(Self)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                <i32 as ::sqlx::Decode<::sqlx::Postgres>>::decode(value).map(Self)
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::core::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <i32 as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

define_id!(UserId);
define_id!(CustomerId);
define_id!(CampaignId);
define_id!(TouchpointId);
define_id!(InteractionId);
define_id!(SaleId);
define_id!(FinancialId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_from_path_segment() {
        assert_eq!("42".parse::<CustomerId>().unwrap(), CustomerId::new(42));
        assert_eq!(" 9 ".parse::<UserId>().unwrap(), UserId::new(9));
        assert!("abc".parse::<CustomerId>().is_err());
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&CampaignId::new(3)).unwrap();
        assert_eq!(json, "3");
        let back: CampaignId = serde_json::from_str("3").unwrap();
        assert_eq!(back.as_i32(), 3);
    }

    #[test]
    fn test_ordering_follows_raw_value() {
        let mut ids = vec![SaleId::new(5), SaleId::new(1), SaleId::new(3)];
        ids.sort();
        assert_eq!(ids, vec![SaleId::new(1), SaleId::new(3), SaleId::new(5)]);
    }
}
