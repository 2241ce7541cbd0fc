//! Crate-internal logging macros.
//!
//! Logging is only compiled in behind the `log` feature. Routing every call through these
//! wrappers keeps the feature gate out of the call sites.

macro_rules! info {
    ($($tokens:tt)*) => {
        #[cfg(feature = "log")]
        {
            ::log::info!($($tokens)*)
        }
    }
}

// Renamed at export to avoid a conflict with the builtin attribute also named `warn`.
macro_rules! _warn {
    ($($tokens:tt)*) => {
        #[cfg(feature = "log")]
        {
            ::log::warn!($($tokens)*)
        }
    }
}

pub(crate) use _warn as warn;
pub(crate) use info;
