// CV documents: data model, draft storage, advisory validation and section health.

pub mod completeness;
pub mod handlers;
pub mod models;
pub mod store;
pub mod validation;
