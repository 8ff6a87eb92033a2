pub mod error;
pub mod json_loader;
pub mod research;
pub mod types;
pub mod util;
