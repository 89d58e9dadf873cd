pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Daemon, Get, Health, Init, Put, Version};
