pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::InMemoryTodoStore;
pub use postgres::PgTodoStore;
pub use store::TodoStore;
