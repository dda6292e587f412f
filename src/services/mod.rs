pub mod dto;
pub mod employee_service;
pub mod error;
pub mod role_service;
pub mod transaction;
pub mod validation;

pub use employee_service::EmployeeService;
pub use error::{ErrorKind, ServiceError};
pub use role_service::RoleService;
