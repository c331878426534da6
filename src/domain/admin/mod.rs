//! Back-office accounts and role rules.

mod admin_user;

pub use admin_user::{
    ensure_not_last_administrator, last_administrator, AdminUser, MAX_ADMIN_NAME_LEN,
};
