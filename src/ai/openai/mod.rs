pub mod client;
pub mod edit;
pub mod types;

pub use client::OpenAiHttpClient;
pub use edit::OpenAiImageEditClient;
