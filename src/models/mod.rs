mod file;
mod post;
mod series;

pub use file::*;
pub use post::*;
pub use series::*;
