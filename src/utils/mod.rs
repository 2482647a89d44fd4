pub mod counter;
pub mod encoding;
pub mod files;
pub mod threadpool;
