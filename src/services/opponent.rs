//! AI 对手模拟 - 业务能力层
//!
//! 只负责"按难度产出抢答延迟 / 回答正误 / 台词"三项能力，不关心流程
//!
//! 三个函数都是 (难度, 随机源) 的纯函数，调用之间互不记忆。
//! 随机源由调用方注入，测试时传入固定种子即可复现。

use rand::Rng;

use crate::models::Difficulty;

/// 强档位的思考台词
const STRONG_MESSAGES: [&str; 3] = [
    "高精度で解析中...",
    "過去の記事と詳細な照合を実施中...",
    "複数のデータベースを並列検索中...",
];

/// 普通档位的思考台词
const NORMAL_MESSAGES: [&str; 3] = ["データを分析中...", "関連記事を確認中...", "情報を検索中..."];

/// 弱档位的思考台词
const WEAK_MESSAGES: [&str; 3] = [
    "なんとか思い出そうとしています...",
    "記事を読み返しています...",
    "ゆっくり考え中...",
];

/// 玩家抢先时 AI 的台词（与档位无关）
const STILL_THINKING_MESSAGE: &str = "まだ考えていたのに...";

/// AI 对手模拟器
pub struct OpponentSimulator;

impl OpponentSimulator {
    /// 创建新的对手模拟器
    pub fn new() -> Self {
        Self
    }

    /// 按难度抽取抢答延迟（秒）
    ///
    /// 在档位的 [min, max] 闭区间内均匀分布。
    pub fn sample_latency(&self, difficulty: Difficulty, rng: &mut impl Rng) -> f64 {
        let (min, max) = difficulty.latency_range();
        rng.gen_range(min..=max)
    }

    /// 按难度决定 AI 回答是否正确
    ///
    /// 以档位正解率为概率独立抽取，回合之间无记忆。
    pub fn decide_correctness(&self, difficulty: Difficulty, rng: &mut impl Rng) -> bool {
        rng.gen::<f64>() < difficulty.correct_rate()
    }

    /// 按难度随机选取一条思考台词（纯演出，不影响计分）
    pub fn thinking_message(&self, difficulty: Difficulty, rng: &mut impl Rng) -> &'static str {
        let messages: &[&'static str] = match difficulty {
            Difficulty::Strong => &STRONG_MESSAGES,
            Difficulty::Normal => &NORMAL_MESSAGES,
            Difficulty::Weak => &WEAK_MESSAGES,
        };
        messages[rng.gen_range(0..messages.len())]
    }

    /// 玩家抢先时的台词
    pub fn still_thinking_message(&self) -> &'static str {
        STILL_THINKING_MESSAGE
    }
}

impl Default for OpponentSimulator {
    fn default() -> Self {
        Self::new()
    }
}
