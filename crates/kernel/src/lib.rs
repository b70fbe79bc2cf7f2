pub mod module;
pub mod registry;
pub mod settings;

pub use booklib_db::Migration;
pub use module::{InitCtx, Module};
pub use registry::ModuleRegistry;
