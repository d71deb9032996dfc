//! Authentication session: durable storage, the store, and the route guard.
//!
//! The store is an explicitly owned object. Construct it once with
//! [`SessionStore::initialize`], share it through an `Arc`, and hand it to
//! the route guard and the transport.

pub mod guard;
pub mod storage;
pub mod store;

pub use guard::{GuardPolicy, GuardRejection, RouteGuard};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, TOKEN_KEY, USER_KEY};
pub use store::{Session, SessionEvent, SessionStore};
