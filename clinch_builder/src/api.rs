mod convert;
mod core;
mod parameter;
mod settings;

pub use self::core::*;
pub use convert::*;
pub use parameter::*;
pub use settings::*;

#[cfg(test)]
pub(crate) use convert::test::Colour;
