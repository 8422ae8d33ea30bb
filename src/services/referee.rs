//! 回合裁判 - 业务能力层
//!
//! 只负责"单回合判定"能力，不持有任何回合间状态
//!
//! ## 判定规则（单次原子决策，无可观测的中间状态）
//! 1. 玩家延迟严格小于 AI 延迟 → 玩家抢答，按规范化后的标签比对正解；
//! 2. 其余（含延迟相等）→ AI 抢答，按档位正解率抽取回答正误。
//!    延迟相等判给 AI 是刻意保留的既定裁决。
//!
//! 判定前先校验输入：负数或非有限的延迟属于契约违规，
//! 直接返回校验错误，不做静默修正。

use rand::Rng;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::{Buzzer, Difficulty, QuizItem, RoundOutcome};
use crate::services::opponent::OpponentSimulator;

/// 回合裁判
pub struct RoundReferee {
    opponent: OpponentSimulator,
}

impl RoundReferee {
    /// 创建新的回合裁判
    pub fn new() -> Self {
        Self {
            opponent: OpponentSimulator::new(),
        }
    }

    /// 判定一个回合
    ///
    /// # 参数
    /// - `quiz`: 本回合题目（只读）
    /// - `difficulty`: AI 难度档位
    /// - `player_latency`: 玩家抢答延迟（秒，未回答用哨兵值 999.0）
    /// - `opponent_latency`: AI 抢答延迟（秒，出题时已固定）
    /// - `player_answer`: 玩家提交的答案标签（未提交为 None）
    ///
    /// # 返回
    /// 返回回合结果；比分由调用方按结果更新。
    pub fn adjudicate(
        &self,
        quiz: &QuizItem,
        difficulty: Difficulty,
        player_latency: f64,
        opponent_latency: f64,
        player_answer: Option<&str>,
        rng: &mut impl Rng,
    ) -> AppResult<RoundOutcome> {
        validate_latency("player_latency", player_latency)?;
        validate_latency("opponent_latency", opponent_latency)?;

        debug!(
            "判定开始: 玩家 {:.2}秒 vs AI {:.2}秒",
            player_latency, opponent_latency
        );

        if player_latency < opponent_latency {
            // 玩家抢答：标签规范化后精确比对
            let normalized = player_answer.unwrap_or("").trim().to_uppercase();
            let correct = normalized == quiz.answer.name();

            Ok(RoundOutcome {
                winner: Buzzer::Player,
                correct,
                opponent_message: self.opponent.still_thinking_message().to_string(),
                player_answer: player_answer.map(|s| s.to_string()),
            })
        } else {
            // AI 抢答（延迟相等也判给 AI）
            let correct = self.opponent.decide_correctness(difficulty, rng);

            Ok(RoundOutcome {
                winner: Buzzer::Opponent,
                correct,
                opponent_message: self.opponent.thinking_message(difficulty, rng).to_string(),
                player_answer: None,
            })
        }
    }
}

impl Default for RoundReferee {
    fn default() -> Self {
        Self::new()
    }
}

/// 延迟值校验：必须为有限非负数
fn validate_latency(which: &'static str, value: f64) -> AppResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::invalid_latency(which, value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameError;
    use crate::models::{Article, ChoiceLabel};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn quiz() -> QuizItem {
        QuizItem {
            question: "問題文？".to_string(),
            choice_a: "一".to_string(),
            choice_b: "二".to_string(),
            choice_c: "三".to_string(),
            choice_d: "四".to_string(),
            answer: ChoiceLabel::A,
            explanation: "解説".to_string(),
            article: Article::new("記事", "https://example.com", "本文"),
        }
    }

    #[test]
    fn test_player_first_correct_answer() {
        let referee = RoundReferee::new();
        let mut rng = StdRng::seed_from_u64(1);

        let outcome = referee
            .adjudicate(&quiz(), Difficulty::Normal, 1.0, 5.0, Some("A"), &mut rng)
            .expect("判定应成功");

        assert_eq!(outcome.winner, Buzzer::Player);
        assert!(outcome.correct);
        assert_eq!(outcome.opponent_message, "まだ考えていたのに...");
    }

    #[test]
    fn test_answer_matching_ignores_case_and_whitespace() {
        let referee = RoundReferee::new();
        let mut rng = StdRng::seed_from_u64(1);

        let outcome = referee
            .adjudicate(&quiz(), Difficulty::Normal, 1.0, 5.0, Some(" a "), &mut rng)
            .expect("判定应成功");

        assert!(outcome.correct);
    }

    #[test]
    fn test_player_first_wrong_or_missing_answer() {
        let referee = RoundReferee::new();
        let mut rng = StdRng::seed_from_u64(1);

        let wrong = referee
            .adjudicate(&quiz(), Difficulty::Normal, 1.0, 5.0, Some("B"), &mut rng)
            .expect("判定应成功");
        assert_eq!(wrong.winner, Buzzer::Player);
        assert!(!wrong.correct);

        let missing = referee
            .adjudicate(&quiz(), Difficulty::Normal, 1.0, 5.0, None, &mut rng)
            .expect("判定应成功");
        assert_eq!(missing.winner, Buzzer::Player);
        assert!(!missing.correct);
    }

    /// 延迟相等判给 AI —— 既定裁决，行为保持原样
    #[test]
    fn test_tie_goes_to_opponent() {
        let referee = RoundReferee::new();
        let mut rng = StdRng::seed_from_u64(1);

        let outcome = referee
            .adjudicate(&quiz(), Difficulty::Normal, 7.5, 7.5, Some("A"), &mut rng)
            .expect("判定应成功");

        assert_eq!(outcome.winner, Buzzer::Opponent);
        assert_eq!(outcome.player_answer, None);
    }

    #[test]
    fn test_sentinel_latency_loses_to_opponent() {
        let referee = RoundReferee::new();
        let mut rng = StdRng::seed_from_u64(1);

        let outcome = referee
            .adjudicate(&quiz(), Difficulty::Weak, 999.0, 12.0, None, &mut rng)
            .expect("判定应成功");

        assert_eq!(outcome.winner, Buzzer::Opponent);
    }

    /// 判定是输入的纯函数：同样输入反复调用结果一致
    #[test]
    fn test_adjudication_is_deterministic_for_player_branch() {
        let referee = RoundReferee::new();
        let quiz = quiz();

        let mut first = None;
        for _ in 0..10 {
            let mut rng = StdRng::seed_from_u64(99);
            let outcome = referee
                .adjudicate(&quiz, Difficulty::Strong, 2.0, 6.5, Some("A"), &mut rng)
                .expect("判定应成功");
            if let Some(prev) = &first {
                assert_eq!(prev, &outcome);
            } else {
                first = Some(outcome);
            }
        }
    }

    #[test]
    fn test_opponent_branch_deterministic_under_seeded_rng() {
        let referee = RoundReferee::new();
        let quiz = quiz();

        let mut rng_a = StdRng::seed_from_u64(5);
        let mut rng_b = StdRng::seed_from_u64(5);
        let outcome_a = referee
            .adjudicate(&quiz, Difficulty::Weak, 10.0, 9.0, None, &mut rng_a)
            .expect("判定应成功");
        let outcome_b = referee
            .adjudicate(&quiz, Difficulty::Weak, 10.0, 9.0, None, &mut rng_b)
            .expect("判定应成功");

        assert_eq!(outcome_a, outcome_b);
    }

    #[test]
    fn test_negative_or_non_finite_latency_rejected() {
        let referee = RoundReferee::new();
        let quiz = quiz();
        let mut rng = StdRng::seed_from_u64(1);

        for (player, opponent) in [(-1.0, 5.0), (1.0, -0.5), (f64::NAN, 5.0), (1.0, f64::INFINITY)]
        {
            let result =
                referee.adjudicate(&quiz, Difficulty::Normal, player, opponent, None, &mut rng);
            assert!(
                matches!(result, Err(AppError::Game(GameError::InvalidLatency { .. }))),
                "延迟 ({}, {}) 应被拒绝",
                player,
                opponent
            );
        }
    }
}
