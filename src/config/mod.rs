pub mod env;
pub mod forms;
pub mod loader;
pub mod types;
pub mod validator;

pub use env::*;
pub use forms::*;
pub use loader::*;
pub use types::*;
pub use validator::*;
