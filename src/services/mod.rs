pub mod article_service;
pub mod opponent;
pub mod quiz_service;
pub mod referee;
pub mod result_store;

pub use article_service::ArticleService;
pub use opponent::OpponentSimulator;
pub use quiz_service::QuizService;
pub use referee::RoundReferee;
pub use result_store::{MatchRecord, ResultStore, RoundRecord, Statistics};
