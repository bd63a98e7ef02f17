//! HTTP API handlers for the archive read API

pub mod executive_orders;
pub mod health;

pub use executive_orders::{executive_order_routes, ExecutiveOrderView};
pub use health::health_routes;
