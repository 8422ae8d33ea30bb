//! 应用主结构 - 编排层
//!
//! 终端版的表现层胶水：初始化各服务，驱动一场对局的回合循环。
//! 游戏决策全部在 workflow / services，这里只做输入输出。

use std::time::Instant;

use anyhow::Result;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{error, info};

use crate::clients::GenerativeClient;
use crate::config::Config;
use crate::models::{Buzzer, Difficulty, MatchSummary, QuizItem, Winner};
use crate::services::{ArticleService, QuizService, ResultStore, Statistics};
use crate::utils::logging;
use crate::workflow::{MatchFlow, MatchSession};

/// 玩家未回答时的哨兵延迟（秒）
const NO_ANSWER_LATENCY: f64 = 999.0;

type InputLines = Lines<BufReader<Stdin>>;

/// 应用主结构
pub struct App {
    config: Config,
    flow: MatchFlow,
    store: ResultStore,
}

impl App {
    /// 初始化应用
    ///
    /// 生成后端按候选模型列表探测初始化，全部失败则启动失败。
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::init_match_log_file(&config.match_log_file)?;
        log_startup(&config);

        let client = GenerativeClient::initialize(&config).await?;
        let articles = ArticleService::new(&config)?;
        let quiz = QuizService::new(client, &config);
        let flow = MatchFlow::new(articles, quiz);
        let store = ResultStore::new(&config);

        Ok(Self {
            config,
            flow,
            store,
        })
    }

    /// 运行一场对局
    pub async fn run(&self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        let difficulty = ask_difficulty(&mut lines).await?;
        let mut session = MatchSession::start(difficulty, self.config.default_total_rounds)?;
        let mut rng = StdRng::from_entropy();

        while !session.is_complete() {
            if session.pending().is_none() {
                match self.flow.issue_question(&mut session, &mut rng).await {
                    Ok(_) => {}
                    Err(e) if e.is_quiz_failure() => {
                        error!("❌ 出题失败: {}", e);
                        println!("\nクイズの生成に失敗しました。");
                        if ask_retry(&mut lines).await? {
                            continue;
                        }
                        println!("ゲームを中断します。");
                        return Ok(());
                    }
                    Err(e) => return Err(e.into()),
                }
            }

            // 判定会消耗待回答题目，先把展示与存档所需的数据取出来
            let (quiz, opponent_latency, thinking_message) = match session.pending() {
                Some(pending) => (
                    pending.quiz.clone(),
                    pending.opponent_latency,
                    pending.thinking_message.clone(),
                ),
                None => continue,
            };

            print_question(
                &quiz,
                &thinking_message,
                session.state().round_index + 1,
                session.state().total_rounds,
            );

            println!("答えの選択肢 (A-D) を入力してください。Enter のみで回答放棄:");
            let started = Instant::now();
            let input = lines.next_line().await?.unwrap_or_default();
            let answer = input.trim().to_string();

            let (player_latency, player_answer) = if answer.is_empty() {
                (NO_ANSWER_LATENCY, None)
            } else {
                (started.elapsed().as_secs_f64(), Some(answer.as_str()))
            };

            let outcome = session.play_round(player_latency, player_answer, &mut rng)?;

            print_outcome(outcome.winner, outcome.correct, &outcome.opponent_message, &quiz);
            println!(
                "現在のスコア: プレイヤー {} - {} AI\n",
                session.state().player_score,
                session.state().opponent_score
            );

            // 存档为尽力而为，失败不影响对局
            self.store.record_round(
                &quiz,
                &outcome,
                player_latency,
                opponent_latency,
                difficulty,
            );
        }

        let summary = session.finalize(Utc::now())?;
        print_summary(&summary);
        self.store.record_match(&summary);
        print_statistics(&self.store.statistics());

        Ok(())
    }
}

/// 询问 AI 难度
async fn ask_difficulty(lines: &mut InputLines) -> Result<Difficulty> {
    loop {
        println!("AIレベルを選んでください [strong / normal / weak] (Enter = normal):");
        let input = lines.next_line().await?.unwrap_or_default();
        let input = input.trim();

        if input.is_empty() {
            return Ok(Difficulty::Normal);
        }
        if let Some(difficulty) = Difficulty::from_str(input) {
            return Ok(difficulty);
        }
        println!("'{}' は無効です。", input);
    }
}

/// 询问是否重新出题
async fn ask_retry(lines: &mut InputLines) -> Result<bool> {
    println!("もう一度クイズを生成しますか？ (y/n):");
    let input = lines.next_line().await?.unwrap_or_default();
    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}

// ========== 画面输出辅助函数 ==========

fn log_startup(config: &Config) {
    let results_dir = if config.results_dir.is_empty() {
        "无"
    } else {
        config.results_dir.as_str()
    };
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - ニュース早押しクイズバトル");
    info!(
        "📊 回合数: {} / 结果存储: {}",
        config.default_total_rounds, results_dir
    );
    info!("{}", "=".repeat(60));
}

fn print_question(quiz: &QuizItem, thinking_message: &str, round: u32, total: u32) {
    println!("\n{}", "=".repeat(60));
    println!("第 {} / {} 問", round, total);
    println!("{}", "=".repeat(60));
    println!("出典: {} ({})", quiz.article.title, quiz.article.url);
    println!("\nQ. {}\n", quiz.question);
    for (label, text) in quiz.choices() {
        println!("  {}: {}", label, text);
    }
    println!("\n🤖 AI: {}", thinking_message);
}

fn print_outcome(winner: Buzzer, correct: bool, opponent_message: &str, quiz: &QuizItem) {
    match (winner, correct) {
        (Buzzer::Player, true) => println!("\n✨ 早押し成功！ 🎉 正解！"),
        (Buzzer::Player, false) => println!("\n✨ 早押し成功！ ❌ 不正解..."),
        (Buzzer::Opponent, true) => println!("\n🤖 AIが早押し成功！ 🎯 AIが正解！"),
        (Buzzer::Opponent, false) => println!("\n🤖 AIが早押し成功！ 😅 AIが不正解！"),
    }
    println!("🤖 AI: {}", opponent_message);
    println!(
        "正解: {} ({})\n解説: {}",
        quiz.answer,
        quiz.choice(quiz.answer),
        quiz.explanation
    );
}

fn print_summary(summary: &MatchSummary) {
    println!("\n{}", "=".repeat(60));
    println!("🏁 ゲーム終了！");
    println!("{}", "=".repeat(60));
    println!(
        "最終スコア: プレイヤー {} - {} AI (難易度: {})",
        summary.player_score, summary.opponent_score, summary.difficulty
    );
    let result_line = match summary.winner {
        Winner::Player => "🎉 あなたの勝ち！",
        Winner::Opponent => "🤖 AIの勝ち！",
        Winner::Draw => "🤝 引き分け！",
    };
    println!("{} (所要時間: {:.1}秒)", result_line, summary.duration_secs);
}

fn print_statistics(stats: &Statistics) {
    if stats.total_games == 0 {
        return;
    }
    println!("\n--- これまでの戦績 ---");
    println!(
        "総対戦数: {} / 勝ち: {} / 負け: {} / 引き分け: {}",
        stats.total_games, stats.player_wins, stats.opponent_wins, stats.draws
    );
    println!(
        "勝率: {:.1}% / 平均スコア: {:.2} - {:.2}",
        stats.win_rate, stats.average_player_score, stats.average_opponent_score
    );
}
