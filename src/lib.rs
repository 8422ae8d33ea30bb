//! # News Quiz Battle
//!
//! ニュース記事から生成した4択クイズで AI と早押し対決するゲーム
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Clients）
//! - `clients/` - 持有外部连接，只暴露能力
//! - `GenerativeClient` - 生成后端传输（候选模型探测初始化）
//! - `NewsClient` - 新闻页面抓取
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个回合的素材
//! - `ArticleService` - 记事取得能力（抓取失败回退内置库，永不失败）
//! - `QuizService` - 记事 → 四择题目能力（解析 + 校验）
//! - `OpponentSimulator` - AI 延迟 / 正误 / 台词抽取能力
//! - `RoundReferee` - 单回合判定能力（纯函数）
//! - `ResultStore` - 尽力而为的结果存储与历史统计能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一场对局"的状态与"一个回合"的流程
//! - `MatchSession` - 对局状态机（出题 → 判定 → 记分）
//! - `MatchFlow` - 回合编排（取材 → 出题 → 判定）
//!
//! ### ④ 编排层（App）
//! - `app` - 终端表现层胶水，只做输入输出

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use clients::{GenerativeClient, NewsClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{
    Article, Buzzer, ChoiceLabel, Difficulty, MatchState, MatchSummary, OutcomeKind, QuizItem,
    RoundOutcome, Winner,
};
pub use services::{ArticleService, OpponentSimulator, QuizService, ResultStore, RoundReferee};
pub use workflow::{MatchFlow, MatchSession, PendingRound};
