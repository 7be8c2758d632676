mod memory;
mod postgres;

pub use memory::InMemoryAccountRepository;
pub use postgres::PostgresAccountRepository;
