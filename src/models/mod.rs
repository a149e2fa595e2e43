pub mod common;
pub mod generation;
pub mod pipeline;
pub mod style;

pub use common::*;
pub use generation::*;
pub use pipeline::*;
pub use style::*;
