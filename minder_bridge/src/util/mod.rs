mod ask;
mod sync;

pub use ask::*;
pub(crate) use sync::lock;
