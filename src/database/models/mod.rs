pub mod employee;
pub mod role;

pub use employee::Employee;
pub use role::Role;
