//! Macros for reducing boilerplate when defining records
//!
//! These macros generate the repetitive trait implementations needed for
//! each record type listed by a view.

/// Complete macro to create a record type with its `Record` implementation
///
/// Every field type must implement [`FieldKind`](crate::core::field::FieldKind).
///
/// # Example
///
/// ```rust
/// use tabula::prelude::*;
///
/// impl_record!(
///     User,
///     "users",
///     ["name", "email"],
///     {
///         name: String,
///         email: String,
///         blocked: bool,
///     }
/// );
///
/// let mut user = User::new("John Doe".to_string(), "john@example.com".to_string(), false);
/// assert_eq!(user.field_value("name"), Some(FieldValue::from("John Doe")));
/// assert!(user.set_field("blocked", FieldValue::Boolean(true)));
/// assert!(user.blocked);
/// ```
#[macro_export]
macro_rules! impl_record {
    (
        $type:ident,
        $resource:expr,
        [ $( $search_field:expr ),* $(,)? ],
        {
            $( $field:ident : $field_type:ty ),* $(,)?
        }
    ) => {
        #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        pub struct $type {
            /// Unique identifier for this record
            pub id: $crate::core::record::RecordId,
            $( pub $field : $field_type ),*
        }

        impl $crate::core::record::Record for $type {
            fn resource_name() -> &'static str {
                $resource
            }

            fn searchable_fields() -> &'static [&'static str] {
                &[ $( $search_field ),* ]
            }

            fn id(&self) -> &$crate::core::record::RecordId {
                &self.id
            }

            fn field_value(&self, field: &str) -> Option<$crate::core::field::FieldValue> {
                match field {
                    "id" => Some($crate::core::field::FieldValue::String(self.id.to_string())),
                    $(
                        stringify!($field) => Some(
                            $crate::core::field::FieldKind::to_field_value(&self.$field)
                        ),
                    )*
                    _ => None,
                }
            }

            fn set_field(&mut self, field: &str, value: $crate::core::field::FieldValue) -> bool {
                match field {
                    $(
                        stringify!($field) => {
                            match <$field_type as $crate::core::field::FieldKind>::from_field_value(value) {
                                Some(v) => {
                                    self.$field = v;
                                    true
                                }
                                None => false,
                            }
                        }
                    )*
                    _ => {
                        let _ = value;
                        false
                    }
                }
            }
        }

        impl $type {
            /// Create a new record with a freshly generated id
            #[allow(clippy::too_many_arguments)]
            pub fn new( $( $field: $field_type ),* ) -> Self {
                Self {
                    id: $crate::core::record::RecordId::generate(),
                    $( $field ),*
                }
            }
        }
    };
}
