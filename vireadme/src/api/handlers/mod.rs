pub mod extract;
pub mod health;
pub mod languages;

pub use extract::extract_text;
pub use health::health_check;
pub use languages::supported_languages;
