mod not_found;
pub mod paste;

pub use not_found::not_found_handler;
