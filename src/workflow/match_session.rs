//! 对局会话 - 流程层
//!
//! 持有一场对局的全部可变状态（比分、回合计数、待回答题目），
//! 状态只通过这里的方法变更，不存在任何隐式的全局会话存储。
//!
//! 回合状态机：出题（issue_round，AI 延迟在此刻固定）→
//! 判定（play_round）→ 记分并推进回合；打满回合数后只可 finalize。

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{debug, info};

use crate::error::{AppError, AppResult, GameError};
use crate::models::{Difficulty, MatchState, MatchSummary, QuizItem, RoundOutcome};
use crate::services::RoundReferee;

/// 待回答的回合
///
/// AI 的抢答延迟在出题时刻固定，使得与玩家延迟的比较有明确定义。
#[derive(Debug)]
pub struct PendingRound {
    /// 本回合题目
    pub quiz: QuizItem,
    /// AI 抢答延迟（秒）
    pub opponent_latency: f64,
    /// 出题时展示的 AI 思考台词
    pub thinking_message: String,
}

/// 对局会话
pub struct MatchSession {
    state: MatchState,
    pending: Option<PendingRound>,
    referee: RoundReferee,
}

impl MatchSession {
    /// 开始新对局
    pub fn start(difficulty: Difficulty, total_rounds: u32) -> AppResult<Self> {
        if total_rounds == 0 {
            return Err(AppError::Game(GameError::InvalidRoundCount {
                value: total_rounds,
            }));
        }

        info!("对局开始: 难度 {} / 全 {} 回合", difficulty, total_rounds);

        Ok(Self {
            state: MatchState::new(difficulty, total_rounds, Utc::now()),
            pending: None,
            referee: RoundReferee::new(),
        })
    }

    /// 当前对局状态（只读）
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// 当前待回答的回合（只读）
    pub fn pending(&self) -> Option<&PendingRound> {
        self.pending.as_ref()
    }

    /// 发出新一回合的题目
    ///
    /// 对局已结束返回 `NoActiveRound`，已有待回答题目返回 `RoundInProgress`。
    pub fn issue_round(
        &mut self,
        quiz: QuizItem,
        opponent_latency: f64,
        thinking_message: String,
    ) -> AppResult<&PendingRound> {
        if self.state.is_complete() {
            return Err(AppError::Game(GameError::NoActiveRound));
        }
        if self.pending.is_some() {
            return Err(AppError::Game(GameError::RoundInProgress));
        }

        debug!(
            "第 {} 回合出题: AI 延迟 {:.2}秒",
            self.state.round_index + 1,
            opponent_latency
        );

        Ok(self.pending.insert(PendingRound {
            quiz,
            opponent_latency,
            thinking_message,
        }))
    }

    /// 判定当前回合
    ///
    /// 没有待回答题目时返回 `NoActiveRound`（未 start 的会话不存在，
    /// 打满回合后 issue_round 已被拒绝，两种情况都落在这里）。
    /// 判定成功后记分、记入回合日志并推进回合计数。
    pub fn play_round(
        &mut self,
        player_latency: f64,
        player_answer: Option<&str>,
        rng: &mut impl Rng,
    ) -> AppResult<RoundOutcome> {
        let Some(pending) = self.pending.as_ref() else {
            return Err(AppError::Game(GameError::NoActiveRound));
        };

        let outcome = self.referee.adjudicate(
            &pending.quiz,
            self.state.difficulty,
            player_latency,
            pending.opponent_latency,
            player_answer,
            rng,
        )?;

        self.pending = None;
        self.state.apply(outcome.clone());

        info!(
            "第 {}/{} 回合结束: {} (比分 玩家 {} - AI {})",
            self.state.round_index,
            self.state.total_rounds,
            outcome.kind().as_str(),
            self.state.player_score,
            self.state.opponent_score
        );

        Ok(outcome)
    }

    /// 对局是否已打满全部回合
    pub fn is_complete(&self) -> bool {
        self.state.is_complete()
    }

    /// 结束对局并产出总结
    ///
    /// 未打满回合返回 `MatchNotFinished`。
    pub fn finalize(&self, now: DateTime<Utc>) -> AppResult<MatchSummary> {
        if !self.state.is_complete() {
            return Err(AppError::Game(GameError::MatchNotFinished {
                round_index: self.state.round_index,
                total_rounds: self.state.total_rounds,
            }));
        }

        let duration_secs =
            (now - self.state.started_at).num_milliseconds() as f64 / 1000.0;

        Ok(MatchSummary {
            player_score: self.state.player_score,
            opponent_score: self.state.opponent_score,
            total_rounds: self.state.total_rounds,
            difficulty: self.state.difficulty,
            winner: self.state.leader(),
            duration_secs,
            finished_at: now,
        })
    }
}
