pub mod assembler;
pub mod errors;
pub mod locking;
pub mod models;
pub mod resolver;
pub mod services;
