//! Validated input forms accepted by the services.

pub mod order;
pub mod pagination;
pub mod user;

pub use order::{OrderCreate, OrderGetForClient, OrdersGetForClient};
pub use pagination::{ASC, DESC, PageState, Pagination, PaginationError};
pub use user::{UserCreate, UserUpdate, UsersGetByBio};
