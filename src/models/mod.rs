pub mod board;
pub mod page;
pub mod response;
