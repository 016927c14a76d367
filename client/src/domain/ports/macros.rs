//! Helper macro for declaring port error enums with ergonomic constructors.
//!
//! Each variant gets a snake-case constructor. String fields accept anything
//! convertible with `Into`, so call sites can pass `&str` or `String`.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[doc = "Build the `" $variant "` variant."]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            #[doc = "Build the `" $variant "` variant."]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum SamplePortError {
            Unavailable => "store unavailable",
            Io { message: String } => "io failed: {message}",
            Status { status: u16, body: String } => "status {status}: {body}",
        }
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(
            SamplePortError::unavailable().to_string(),
            "store unavailable"
        );
    }

    #[test]
    fn string_fields_accept_borrowed_input() {
        let err = SamplePortError::io("disk full");
        assert_eq!(err, SamplePortError::Io { message: "disk full".to_owned() });
    }

    #[test]
    fn mixed_fields_keep_their_types() {
        let err = SamplePortError::status(401_u16, "nope");
        assert_eq!(err.to_string(), "status 401: nope");
    }
}
