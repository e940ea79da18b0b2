pub mod deck;
pub mod render;
pub mod state;
pub mod videos;
