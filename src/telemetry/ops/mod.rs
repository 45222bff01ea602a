pub mod media;
pub mod process;
pub mod results;
