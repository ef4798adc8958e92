//! Infrastructure adapters for the Rolegate application ports.

#![forbid(unsafe_code)]

mod in_memory_rbac_repository;
mod in_memory_user_directory;
mod postgres_rbac_repository;
mod postgres_user_directory;
mod tracing_event_publisher;

pub use in_memory_rbac_repository::InMemoryRbacRepository;
pub use in_memory_user_directory::InMemoryUserDirectory;
pub use postgres_rbac_repository::PostgresRbacRepository;
pub use postgres_user_directory::PostgresUserDirectory;
pub use tracing_event_publisher::TracingEventPublisher;
