mod native;
pub use native::{start, NativeOsc};
