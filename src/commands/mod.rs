//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod models;
pub mod objref;
pub mod top;
pub mod utils;

// Re-export main command functions
pub use models::{ObjrefArgs, TopArgs};
pub use objref::{execute_objref, validate_args};
pub use top::execute_top;
pub use utils::display_version;
