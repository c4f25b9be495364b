mod schema;
mod store;

pub use schema::init_db;
pub use store::SqliteStore;
