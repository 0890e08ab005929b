pub mod date;
pub mod file;
