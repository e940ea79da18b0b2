pub mod errors;
pub mod logger;
