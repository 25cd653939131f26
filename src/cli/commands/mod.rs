//! Command implementations

mod export;
mod init;
mod queue;
#[cfg(feature = "server")]
mod serve;
mod validate;
mod webhook;

pub use export::export;
pub use init::init;
pub use queue::queue;
#[cfg(feature = "server")]
pub use serve::serve;
pub use validate::validate;
pub use webhook::webhook;
