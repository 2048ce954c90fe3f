pub mod archive;
pub mod library;
