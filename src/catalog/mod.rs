pub mod proxy;
pub mod transport;
