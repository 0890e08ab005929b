pub mod api;
pub mod board;
mod extract;
mod form;
