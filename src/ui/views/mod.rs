mod order_detail;
mod orders;
mod products;
mod revenue;
mod session_expired;
mod users;

pub use order_detail::OrderDetailView;
pub use orders::OrderListView;
pub use products::ProductListView;
pub use revenue::RevenueView;
pub use session_expired::SessionExpiredView;
pub use users::UserListView;
