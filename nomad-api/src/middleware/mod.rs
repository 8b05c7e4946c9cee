pub mod auth;

pub use auth::{employee_auth_middleware, manager_auth_middleware, EmployeeClaims};
