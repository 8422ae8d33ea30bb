pub mod article;
pub mod game;
pub mod quiz;

pub use article::Article;
pub use game::{Buzzer, Difficulty, MatchState, MatchSummary, OutcomeKind, RoundOutcome, Winner};
pub use quiz::{ChoiceLabel, QuizItem};
