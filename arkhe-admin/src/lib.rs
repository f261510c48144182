//! # Arkhe Admin
//!
//! User and role administration for Arkhe, with every mutation gated by the
//! [`arkhe_rbac::AuthorizationEngine`].
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐
//! │ UserService  │   │ RoleService  │
//! └──────┬───────┘   └──────┬───────┘
//!        │ decide_*         │ decide_*
//!        ▼                  ▼
//! ┌─────────────────────────────────┐
//! │      AuthorizationEngine        │
//! └─────────────────────────────────┘
//!        │ allowed                  │
//!        ▼                          ▼
//! ┌──────────────┐          ┌──────────────┐
//! │ UserStore /  │          │   EventBus   │
//! │ RoleStore    │          │ (AdminEvent) │
//! └──────────────┘          └──────────────┘
//! ```
//!
//! Each operation runs in the same order: policy check, payload validation,
//! storage, then event publication. A denied operation never touches
//! storage.
//!
//! ## Error Codes
//!
//! [`AdminError::error_code`] returns the deny reason code for policy
//! failures (`ROOT_ONLY`, `SELF_DELETION`, ...) and a generic code for the
//! rest, with [`AdminError::status_code`] giving the HTTP status to use.

pub mod dto;
pub mod error;
mod notify;
pub mod roles;
pub mod store;
pub mod users;

pub use dto::{RoleDto, UserDto, MAX_FIELD_LEN};
pub use error::{AdminError, AdminResult};
pub use roles::RoleService;
pub use store::{MemoryRoleStore, MemoryUserStore, RoleStore, UserRecord, UserStore};
pub use users::UserService;
