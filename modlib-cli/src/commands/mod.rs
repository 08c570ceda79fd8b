pub mod common;
pub mod contexts;
pub mod extract;
pub mod find;
pub mod info;
pub mod resolve;
