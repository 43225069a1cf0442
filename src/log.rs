//! Logging facade: `defmt` when enabled, nothing otherwise.

#[cfg(feature = "defmt")]
pub(crate) use defmt::{debug, info, warn};

#[cfg(not(feature = "defmt"))]
mod noop {
    macro_rules! debug {
        ( $( $x:expr ),* ) => {};
    }
    pub(crate) use debug;
    macro_rules! info {
        ( $( $x:expr ),* ) => {};
    }
    pub(crate) use info;
    macro_rules! warner {
        ( $( $x:expr ),* ) => {};
    }
    pub(crate) use warner as warn;
}

#[cfg(not(feature = "defmt"))]
pub(crate) use noop::{debug, info, warn};
