mod memory;
mod model;
mod repo;
mod store;

pub use memory::MemoryUserStore;
pub use model::{NewUser, Role, User, UserUpdate};
pub use repo::PgUserStore;
pub use store::{StoreError, UserStore};
