pub mod card;
pub mod http_response;
pub mod settings;
