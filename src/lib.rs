pub mod osc;

#[cfg(feature = "native")]
pub mod audio;
#[cfg(feature = "native")]
pub mod input;
#[cfg(feature = "native")]
pub mod runtime;
