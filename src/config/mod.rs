pub mod types;
pub mod features;
pub mod loader;
pub mod validator;
pub mod resolved;

pub use types::*;
pub use features::*;
pub use loader::*;
pub use validator::*;
pub use resolved::*;
