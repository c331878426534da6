//! Admin user handlers: login, bootstrap and account management.

mod bootstrap;
mod log_in;
mod manage;

pub use bootstrap::{BootstrapAdminCommand, BootstrapAdminHandler};
pub use log_in::{LogInAdminCommand, LogInAdminHandler, LogInAdminResult};
pub use manage::{
    CreateAdminUserCommand, CreateAdminUserHandler, DeleteAdminUserCommand,
    DeleteAdminUserHandler, ListAdminUsersHandler, UpdateAdminUserCommand, UpdateAdminUserHandler,
};
