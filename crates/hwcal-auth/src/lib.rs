//! Authentication for the admin view: the provider capability, the
//! password-grant client that implements it, and the session guard the
//! views consume.

pub mod guard;
pub mod memory;
pub mod password;
pub mod provider;
pub mod storage;

pub use guard::SessionGuard;
pub use memory::MemoryAuth;
pub use password::PasswordAuth;
pub use provider::{AuthChange, AuthEvent, AuthProvider, Session, User};
pub use storage::SessionStorage;
