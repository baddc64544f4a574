pub mod file;
pub mod metadata;
pub mod upload;

pub use file::*;
pub use metadata::*;
pub use upload::*;
