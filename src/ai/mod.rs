pub mod ollama;
pub mod providers;
