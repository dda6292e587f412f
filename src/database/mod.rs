pub mod manager;
pub mod memory;
pub mod models;
pub mod ports;
pub mod postgres;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use ports::{EmployeeRepository, EmployeeTransaction, HealthCheck, RoleRepository};
pub use postgres::PgStore;
