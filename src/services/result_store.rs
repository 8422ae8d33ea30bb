//! 结果存储服务 - 业务能力层
//!
//! 只负责"尽力保存对局/回合记录、汇总历史统计"能力，不关心流程
//!
//! ## 存储契约
//! 追加型 JSON Lines 文件存储。写入为尽力而为：成功返回记录 ID，
//! 任何失败只记日志并返回 None，绝不向调用方抛错，也绝不回滚
//! 内存中已定下的比分。未配置存储目录时读写两侧都优雅退化：
//! 写入返回 None，统计返回全零默认值。

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, StoreError};
use crate::models::{Difficulty, MatchSummary, OutcomeKind, QuizItem, RoundOutcome, Winner};

/// 对局记录文件名
const MATCH_FILE: &str = "match_results.jsonl";

/// 回合记录文件名
const ROUND_FILE: &str = "round_results.jsonl";

/// 对局记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: String,
    pub player_score: u32,
    pub opponent_score: u32,
    pub total_rounds: u32,
    pub difficulty: Difficulty,
    pub winner: Winner,
    pub duration_secs: f64,
    pub timestamp: DateTime<Utc>,
}

/// 回合记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundRecord {
    pub id: String,
    pub question: String,
    pub article_title: String,
    pub article_url: String,
    pub correct_answer: String,
    pub player_answer: Option<String>,
    pub player_time: f64,
    pub ai_time: f64,
    pub result_type: OutcomeKind,
    pub difficulty: Difficulty,
    pub timestamp: DateTime<Utc>,
}

/// 各难度档位的对局数分布
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TierDistribution {
    pub strong: u32,
    pub normal: u32,
    pub weak: u32,
}

/// 历史统计
///
/// 存储缺失时所有字段保持零值默认。
#[derive(Debug, Clone, Default, Serialize)]
pub struct Statistics {
    pub total_games: u32,
    pub player_wins: u32,
    pub opponent_wins: u32,
    pub draws: u32,
    pub average_player_score: f64,
    pub average_opponent_score: f64,
    /// 玩家胜率（百分比）
    pub win_rate: f64,
    pub difficulty_distribution: TierDistribution,
}

/// 结果存储服务
pub struct ResultStore {
    dir: Option<PathBuf>,
    counter: AtomicU64,
}

impl ResultStore {
    /// 创建新的结果存储服务
    ///
    /// 配置的目录为空字符串时存储被禁用。
    pub fn new(config: &Config) -> Self {
        let dir = if config.results_dir.is_empty() {
            debug!("结果存储未配置，读写均退化为默认值");
            None
        } else {
            Some(PathBuf::from(&config.results_dir))
        };
        Self {
            dir,
            counter: AtomicU64::new(0),
        }
    }

    /// 使用自定义目录创建
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            counter: AtomicU64::new(0),
        }
    }

    /// 是否已配置存储
    pub fn is_configured(&self) -> bool {
        self.dir.is_some()
    }

    /// 保存对局总结
    ///
    /// # 返回
    /// 成功返回记录 ID，失败返回 None（失败只记日志）。
    pub fn record_match(&self, summary: &MatchSummary) -> Option<String> {
        let record = MatchRecord {
            id: self.next_id(),
            player_score: summary.player_score,
            opponent_score: summary.opponent_score,
            total_rounds: summary.total_rounds,
            difficulty: summary.difficulty,
            winner: summary.winner,
            duration_secs: summary.duration_secs,
            timestamp: summary.finished_at,
        };

        match self.try_append(MATCH_FILE, &record) {
            Ok(()) => {
                info!("✓ 对局结果已保存 (ID: {})", record.id);
                Some(record.id)
            }
            Err(AppError::Store(StoreError::NotConfigured)) => None,
            Err(e) => {
                warn!("对局结果保存失败 - {}", e);
                None
            }
        }
    }

    /// 保存单回合记录
    ///
    /// # 返回
    /// 成功返回记录 ID，失败返回 None（失败只记日志）。
    pub fn record_round(
        &self,
        quiz: &QuizItem,
        outcome: &RoundOutcome,
        player_latency: f64,
        opponent_latency: f64,
        difficulty: Difficulty,
    ) -> Option<String> {
        let record = RoundRecord {
            id: self.next_id(),
            question: quiz.question.clone(),
            article_title: quiz.article.title.clone(),
            article_url: quiz.article.url.clone(),
            correct_answer: quiz.answer.name().to_string(),
            player_answer: outcome.player_answer.clone(),
            player_time: player_latency,
            ai_time: opponent_latency,
            result_type: outcome.kind(),
            difficulty,
            timestamp: Utc::now(),
        };

        match self.try_append(ROUND_FILE, &record) {
            Ok(()) => {
                debug!("✓ 回合记录已保存 (ID: {})", record.id);
                Some(record.id)
            }
            Err(AppError::Store(StoreError::NotConfigured)) => None,
            Err(e) => {
                warn!("回合记录保存失败 - {}", e);
                None
            }
        }
    }

    /// 取最近的对局记录（新的在前）
    ///
    /// 读取失败与未配置一样返回空列表。
    pub fn recent_matches(&self, limit: usize) -> Vec<MatchRecord> {
        match self.read_match_records() {
            Ok(mut records) => {
                records.reverse();
                records.truncate(limit);
                records
            }
            Err(AppError::Store(StoreError::NotConfigured)) => Vec::new(),
            Err(e) => {
                warn!("对局记录读取失败 - {}", e);
                Vec::new()
            }
        }
    }

    /// 汇总历史统计
    ///
    /// 存储缺失、不可读或未配置时返回全零默认值。
    pub fn statistics(&self) -> Statistics {
        let records = match self.read_match_records() {
            Ok(records) => records,
            Err(AppError::Store(StoreError::NotConfigured)) => return Statistics::default(),
            Err(e) => {
                warn!("统计读取失败 - {}", e);
                return Statistics::default();
            }
        };

        if records.is_empty() {
            return Statistics::default();
        }

        let mut stats = Statistics {
            total_games: records.len() as u32,
            ..Statistics::default()
        };
        let mut player_total = 0u64;
        let mut opponent_total = 0u64;

        for record in &records {
            match record.winner {
                Winner::Player => stats.player_wins += 1,
                Winner::Opponent => stats.opponent_wins += 1,
                Winner::Draw => stats.draws += 1,
            }
            player_total += u64::from(record.player_score);
            opponent_total += u64::from(record.opponent_score);
            match record.difficulty {
                Difficulty::Strong => stats.difficulty_distribution.strong += 1,
                Difficulty::Normal => stats.difficulty_distribution.normal += 1,
                Difficulty::Weak => stats.difficulty_distribution.weak += 1,
            }
        }

        let total = f64::from(stats.total_games);
        stats.average_player_score = round2(player_total as f64 / total);
        stats.average_opponent_score = round2(opponent_total as f64 / total);
        stats.win_rate = round1(f64::from(stats.player_wins) / total * 100.0);

        stats
    }

    /// 生成记录 ID
    fn next_id(&self) -> String {
        format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            self.counter.fetch_add(1, Ordering::Relaxed)
        )
    }

    /// 追加一条 JSON 行
    fn try_append(&self, file_name: &str, record: &impl Serialize) -> AppResult<()> {
        let Some(dir) = &self.dir else {
            return Err(AppError::Store(StoreError::NotConfigured));
        };

        let path = dir.join(file_name);
        let line = serde_json::to_string(record).map_err(|e| {
            AppError::Store(StoreError::WriteFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })
        })?;

        fs::create_dir_all(dir).map_err(|e| {
            AppError::Store(StoreError::WriteFailed {
                path: dir.display().to_string(),
                source: Box::new(e),
            })
        })?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                AppError::Store(StoreError::WriteFailed {
                    path: path.display().to_string(),
                    source: Box::new(e),
                })
            })?;

        writeln!(file, "{}", line).map_err(|e| {
            AppError::Store(StoreError::WriteFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })
        })?;

        Ok(())
    }

    /// 读取全部对局记录（按追加顺序）
    fn read_match_records(&self) -> AppResult<Vec<MatchRecord>> {
        let Some(dir) = &self.dir else {
            return Err(AppError::Store(StoreError::NotConfigured));
        };

        let path = dir.join(MATCH_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let text = fs::read_to_string(&path).map_err(|e| {
            AppError::Store(StoreError::ReadFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })
        })?;

        let mut records = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<MatchRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => warn!("跳过无法解析的记录行: {}", e),
            }
        }

        Ok(records)
    }
}

/// 四舍五入到两位小数
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 四舍五入到一位小数
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Article, Buzzer, ChoiceLabel};

    fn summary(winner: Winner, player: u32, opponent: u32, difficulty: Difficulty) -> MatchSummary {
        MatchSummary {
            player_score: player,
            opponent_score: opponent,
            total_rounds: 5,
            difficulty,
            winner,
            duration_secs: 60.0,
            finished_at: Utc::now(),
        }
    }

    fn temp_store(tag: &str) -> (ResultStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!(
            "news_quiz_battle_store_{}_{}",
            std::process::id(),
            tag
        ));
        let _ = fs::remove_dir_all(&dir);
        (ResultStore::with_dir(&dir), dir)
    }

    #[test]
    fn test_unconfigured_store_degrades_gracefully() {
        let config = Config {
            results_dir: String::new(),
            ..Config::default()
        };
        let store = ResultStore::new(&config);

        assert!(!store.is_configured());
        assert!(store
            .record_match(&summary(Winner::Player, 4, 1, Difficulty::Normal))
            .is_none());
        assert!(store.recent_matches(10).is_empty());

        let stats = store.statistics();
        assert_eq!(stats.total_games, 0);
        assert_eq!(stats.player_wins, 0);
        assert_eq!(stats.win_rate, 0.0);
        assert_eq!(stats.difficulty_distribution, TierDistribution::default());
    }

    #[test]
    fn test_record_and_statistics_roundtrip() {
        let (store, dir) = temp_store("stats");

        assert!(store
            .record_match(&summary(Winner::Player, 4, 1, Difficulty::Normal))
            .is_some());
        assert!(store
            .record_match(&summary(Winner::Draw, 2, 2, Difficulty::Weak))
            .is_some());
        assert!(store
            .record_match(&summary(Winner::Opponent, 1, 3, Difficulty::Normal))
            .is_some());

        let stats = store.statistics();
        assert_eq!(stats.total_games, 3);
        assert_eq!(stats.player_wins, 1);
        assert_eq!(stats.opponent_wins, 1);
        assert_eq!(stats.draws, 1);
        assert_eq!(stats.average_player_score, 2.33);
        assert_eq!(stats.average_opponent_score, 2.0);
        assert_eq!(stats.win_rate, 33.3);
        assert_eq!(stats.difficulty_distribution.normal, 2);
        assert_eq!(stats.difficulty_distribution.weak, 1);

        let recent = store.recent_matches(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].winner, Winner::Opponent);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_record_round_returns_id() {
        let (store, dir) = temp_store("round");

        let quiz = QuizItem {
            question: "問題？".to_string(),
            choice_a: "一".to_string(),
            choice_b: "二".to_string(),
            choice_c: "三".to_string(),
            choice_d: "四".to_string(),
            answer: ChoiceLabel::B,
            explanation: "解説".to_string(),
            article: Article::new("記事", "https://example.com", "本文"),
        };
        let outcome = RoundOutcome {
            winner: Buzzer::Player,
            correct: false,
            opponent_message: "まだ考えていたのに...".to_string(),
            player_answer: Some("C".to_string()),
        };

        let id = store.record_round(&quiz, &outcome, 2.5, 8.0, Difficulty::Normal);
        assert!(id.is_some());

        let _ = fs::remove_dir_all(dir);
    }
}
