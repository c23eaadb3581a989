//! Error macros for tootmirror

/// Macro for creating invalid value errors
#[macro_export]
macro_rules! bail_invalid {
    ($context:expr, $value:expr) => {
        return Err($crate::error::MirrorError::invalid_value($context, $value))
    };
}

/// Macro for creating missing value errors
#[macro_export]
macro_rules! bail_missing {
    ($context:expr) => {
        return Err($crate::error::MirrorError::missing($context))
    };
}

/// Macro for creating unsupported errors
#[macro_export]
macro_rules! bail_unsupported {
    ($context:expr, $value:expr, $supported:expr) => {
        return Err($crate::error::MirrorError::unsupported(
            $context, $value, $supported,
        ))
    };
}
