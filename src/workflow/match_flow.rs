//! 回合编排 - 流程层
//!
//! 定义"一个回合"的完整处理流程：
//! 取记事 → 生成题目 → 固定 AI 延迟 → 出题 → 判定
//!
//! - 不持有对局状态（状态在 MatchSession）
//! - 只依赖业务能力（services）
//! - 出题失败原样上报调用方，由玩家决定是否重新出题

use rand::Rng;
use tracing::{info, warn};

use crate::error::AppResult;
use crate::models::RoundOutcome;
use crate::services::{ArticleService, OpponentSimulator, QuizService};
use crate::workflow::match_session::{MatchSession, PendingRound};

/// 回合编排流程
pub struct MatchFlow {
    articles: ArticleService,
    quiz: QuizService,
    opponent: OpponentSimulator,
}

impl MatchFlow {
    /// 创建新的回合编排流程
    pub fn new(articles: ArticleService, quiz: QuizService) -> Self {
        Self {
            articles,
            quiz,
            opponent: OpponentSimulator::new(),
        }
    }

    /// 为当前回合出题
    ///
    /// 取记事（永不失败）→ 生成题目（失败上报）→
    /// 在出题时刻固定 AI 抢答延迟与思考台词。
    pub async fn issue_question<'a>(
        &self,
        session: &'a mut MatchSession,
        rng: &mut impl Rng,
    ) -> AppResult<&'a PendingRound> {
        let article = self.articles.fetch_article(rng).await;
        info!(
            "🔍 出题素材: {} ({})",
            article.title, article.url
        );

        let quiz = match self.quiz.compile(&article).await {
            Ok(quiz) => quiz,
            Err(e) => {
                warn!("⚠️ 出题失败: {}", e);
                return Err(e);
            }
        };

        let difficulty = session.state().difficulty;
        let opponent_latency = self.opponent.sample_latency(difficulty, rng);
        let thinking_message = self.opponent.thinking_message(difficulty, rng).to_string();

        session.issue_round(quiz, opponent_latency, thinking_message)
    }

    /// 判定一个回合
    ///
    /// 没有待回答题目时先出一题再判定（同一回合内 AI 延迟不变）。
    pub async fn play_round(
        &self,
        session: &mut MatchSession,
        player_latency: f64,
        player_answer: Option<&str>,
        rng: &mut impl Rng,
    ) -> AppResult<RoundOutcome> {
        if session.pending().is_none() {
            self.issue_question(session, rng).await?;
        }
        session.play_round(player_latency, player_answer, rng)
    }
}
