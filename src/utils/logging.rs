//! 日志工具模块
//!
//! 提供日志初始化与格式化辅助函数

use anyhow::Result;
use std::fs;

/// 初始化 tracing 日志
///
/// 过滤级别由 RUST_LOG 控制，缺省为 info。
/// 重复调用安全（测试中可多次触发）。
pub fn init() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 初始化对局日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_match_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n対戦ログ - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("短い", 10), "短い");
        assert_eq!(truncate_text("あいうえおかきくけこ", 5), "あいうえお...");
    }
}
