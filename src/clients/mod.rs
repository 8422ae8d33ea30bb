pub mod llm_client;
pub mod news_client;

pub use llm_client::GenerativeClient;
pub use news_client::NewsClient;
