//! Domain entities.

mod order;
pub mod topics;
mod user;

use jiff::Timestamp;

pub use order::{CreatedOrder, Order, OrdersPage};
pub use user::{CreatedUser, User, user_cache_key};

/// `now` cut to the millisecond precision every datastore persists, so an
/// entity held in memory equals the one read back from storage.
pub fn truncate_to_millis(now: Timestamp) -> Timestamp {
    Timestamp::from_millisecond(now.as_millisecond()).unwrap_or(now)
}
