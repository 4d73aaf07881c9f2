//! Request-scoped services shared by the upload and read handlers

pub mod locks;
pub mod owner_gate;
pub mod resolver;

pub use locks::{VideoLockGuard, VideoLocks};
pub use owner_gate::OwnerGate;
pub use resolver::ReferenceResolver;
