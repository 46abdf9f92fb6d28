mod base;
mod middleware;
mod result;

pub use base::*;
pub use middleware::*;
pub use result::*;
