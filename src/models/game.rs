use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// AI 对手难度枚举
///
/// 每档绑定固定的 (正解率, 抢答延迟区间)，进程级静态配置，永不变更。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// 强: 95% 正解率，反应 6-8 秒
    Strong,
    /// 普通: 80% 正解率，反应 8-11 秒
    Normal,
    /// 弱: 60% 正解率，反应 10-15 秒
    Weak,
}

impl Difficulty {
    /// 全部难度档位
    pub const ALL: [Difficulty; 3] = [Difficulty::Strong, Difficulty::Normal, Difficulty::Weak];

    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Strong => "strong",
            Difficulty::Normal => "normal",
            Difficulty::Weak => "weak",
        }
    }

    /// 从字符串解析难度
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "strong" => Some(Difficulty::Strong),
            "normal" => Some(Difficulty::Normal),
            "weak" => Some(Difficulty::Weak),
            _ => None,
        }
    }

    /// AI 回答的正解概率
    pub fn correct_rate(self) -> f64 {
        match self {
            Difficulty::Strong => 0.95,
            Difficulty::Normal => 0.80,
            Difficulty::Weak => 0.60,
        }
    }

    /// AI 抢答延迟区间 [min, max]（秒）
    pub fn latency_range(self) -> (f64, f64) {
        match self {
            Difficulty::Strong => (6.0, 8.0),
            Difficulty::Normal => (8.0, 11.0),
            Difficulty::Weak => (10.0, 15.0),
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 抢答胜者
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Buzzer {
    /// 玩家先按
    Player,
    /// AI 先按
    Opponent,
}

/// 对局胜者
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Player,
    Opponent,
    Draw,
}

impl Winner {
    pub fn name(self) -> &'static str {
        match self {
            Winner::Player => "player",
            Winner::Opponent => "opponent",
            Winner::Draw => "draw",
        }
    }
}

impl std::fmt::Display for Winner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 回合结果种别
///
/// 与存储记录中的 result_type 字符串一一对应。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// 玩家抢答且正解
    Correct,
    /// 玩家抢答但不正解
    Wrong,
    /// AI 抢答且正解
    AiCorrect,
    /// AI 抢答但不正解
    AiWrong,
}

impl OutcomeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeKind::Correct => "correct",
            OutcomeKind::Wrong => "wrong",
            OutcomeKind::AiCorrect => "ai_correct",
            OutcomeKind::AiWrong => "ai_wrong",
        }
    }
}

/// 单回合判定结果
///
/// 由裁判一次性产出，随回合消亡。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    /// 谁先按下抢答器
    pub winner: Buzzer,
    /// 抢答方是否答对
    pub correct: bool,
    /// AI 的台词（纯演出，不影响计分）
    pub opponent_message: String,
    /// 玩家提交的答案（规范化前的原文，AI 抢答时为 None）
    pub player_answer: Option<String>,
}

impl RoundOutcome {
    /// 结果种别
    pub fn kind(&self) -> OutcomeKind {
        match (self.winner, self.correct) {
            (Buzzer::Player, true) => OutcomeKind::Correct,
            (Buzzer::Player, false) => OutcomeKind::Wrong,
            (Buzzer::Opponent, true) => OutcomeKind::AiCorrect,
            (Buzzer::Opponent, false) => OutcomeKind::AiWrong,
        }
    }
}

/// 对局状态
///
/// 单一会话独占，只由 MatchSession 在回合判定后变更；
/// round_index == total_rounds 之后只读。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchState {
    /// 难度档位
    pub difficulty: Difficulty,
    /// 玩家得分
    pub player_score: u32,
    /// AI 得分
    pub opponent_score: u32,
    /// 已完成的回合数
    pub round_index: u32,
    /// 回合总数
    pub total_rounds: u32,
    /// 对局开始时刻
    pub started_at: DateTime<Utc>,
    /// 各回合结果（按顺序）
    pub rounds: Vec<RoundOutcome>,
}

impl MatchState {
    /// 创建新的对局状态
    pub fn new(difficulty: Difficulty, total_rounds: u32, started_at: DateTime<Utc>) -> Self {
        Self {
            difficulty,
            player_score: 0,
            opponent_score: 0,
            round_index: 0,
            total_rounds,
            started_at,
            rounds: Vec::new(),
        }
    }

    /// 对局是否已打满全部回合
    pub fn is_complete(&self) -> bool {
        self.round_index >= self.total_rounds
    }

    /// 记录一个回合结果并更新比分
    pub fn apply(&mut self, outcome: RoundOutcome) {
        if outcome.correct {
            match outcome.winner {
                Buzzer::Player => self.player_score += 1,
                Buzzer::Opponent => self.opponent_score += 1,
            }
        }
        self.rounds.push(outcome);
        self.round_index += 1;
    }

    /// 按当前比分计算胜者
    pub fn leader(&self) -> Winner {
        if self.player_score > self.opponent_score {
            Winner::Player
        } else if self.opponent_score > self.player_score {
            Winner::Opponent
        } else {
            Winner::Draw
        }
    }
}

/// 对局总结
///
/// 对局结束后生成的不可变记录，交给结果存储。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSummary {
    /// 玩家得分
    pub player_score: u32,
    /// AI 得分
    pub opponent_score: u32,
    /// 回合总数
    pub total_rounds: u32,
    /// 难度档位
    pub difficulty: Difficulty,
    /// 胜者
    pub winner: Winner,
    /// 对局耗时（秒）
    pub duration_secs: f64,
    /// 结束时刻
    pub finished_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_from_str() {
        assert_eq!(Difficulty::from_str("strong"), Some(Difficulty::Strong));
        assert_eq!(Difficulty::from_str(" Normal "), Some(Difficulty::Normal));
        assert_eq!(Difficulty::from_str("WEAK"), Some(Difficulty::Weak));
        assert_eq!(Difficulty::from_str("hard"), None);
    }

    #[test]
    fn test_difficulty_table_matches_tiers() {
        assert_eq!(Difficulty::Strong.correct_rate(), 0.95);
        assert_eq!(Difficulty::Normal.correct_rate(), 0.80);
        assert_eq!(Difficulty::Weak.correct_rate(), 0.60);
        assert_eq!(Difficulty::Strong.latency_range(), (6.0, 8.0));
        assert_eq!(Difficulty::Normal.latency_range(), (8.0, 11.0));
        assert_eq!(Difficulty::Weak.latency_range(), (10.0, 15.0));
    }

    #[test]
    fn test_outcome_kind_mapping() {
        let outcome = RoundOutcome {
            winner: Buzzer::Player,
            correct: true,
            opponent_message: String::new(),
            player_answer: Some("A".to_string()),
        };
        assert_eq!(outcome.kind(), OutcomeKind::Correct);
        assert_eq!(outcome.kind().as_str(), "correct");

        let outcome = RoundOutcome {
            winner: Buzzer::Opponent,
            correct: false,
            opponent_message: String::new(),
            player_answer: None,
        };
        assert_eq!(outcome.kind(), OutcomeKind::AiWrong);
    }

    #[test]
    fn test_apply_updates_score_only_on_correct() {
        let started = Utc::now();
        let mut state = MatchState::new(Difficulty::Normal, 5, started);

        state.apply(RoundOutcome {
            winner: Buzzer::Player,
            correct: true,
            opponent_message: String::new(),
            player_answer: Some("A".to_string()),
        });
        state.apply(RoundOutcome {
            winner: Buzzer::Opponent,
            correct: false,
            opponent_message: String::new(),
            player_answer: None,
        });

        assert_eq!(state.player_score, 1);
        assert_eq!(state.opponent_score, 0);
        assert_eq!(state.round_index, 2);
        assert_eq!(state.rounds.len(), 2);
        assert!(!state.is_complete());
    }

    #[test]
    fn test_leader_comparison() {
        let mut state = MatchState::new(Difficulty::Weak, 1, Utc::now());
        assert_eq!(state.leader(), Winner::Draw);
        state.player_score = 3;
        state.opponent_score = 1;
        assert_eq!(state.leader(), Winner::Player);
        state.opponent_score = 4;
        assert_eq!(state.leader(), Winner::Opponent);
    }
}
