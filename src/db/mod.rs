//! Persistence layer.
//!
//! `Repository` is the data-access seam; `DbOperations` implements it on
//! Postgres and `InMemoryRepository` on process memory.

pub mod memory;
pub mod models;
pub mod operations;
pub mod repository;

pub use memory::InMemoryRepository;
pub use models::{Account, NewAccount, NewTodo, Page, Role, Todo, TodoChanges};
pub use operations::DbOperations;
pub use repository::Repository;
