//! Routers: common health/version routes and the declared workflow routes.

mod common;
mod workflow;

pub use common::common_routes;
pub use workflow::workflow_routes;
