//! Services over the resolved model: statement execution, list queries, input validation.

mod crud;
mod hydrate;
mod query;
mod validation;

pub use crud::CrudService;
pub use hydrate::hydrate;
pub use query::TableQuery;
pub use validation::RequestValidator;
