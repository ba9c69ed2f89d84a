pub mod memory;
pub mod postgres;

pub use memory::InMemorySessionStore;
pub use memory::InMemoryUserStore;
pub use postgres::PostgresSessionStore;
pub use postgres::PostgresUserStore;
