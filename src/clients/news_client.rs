//! 新闻页面客户端
//!
//! 只负责"按 URL 取回原始 HTML"这一能力，
//! 结构化字段的抽取属于记事服务。

use std::time::Duration;

use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult, FetchError};

/// 抓取时使用的浏览器 User-Agent
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// 新闻页面客户端
pub struct NewsClient {
    client: reqwest::Client,
    referer: String,
}

impl NewsClient {
    /// 创建新的页面客户端
    ///
    /// 超时在客户端级别统一设置，超时与网络错误同样作为普通错误返回。
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            referer: "https://news.yahoo.co.jp/".to_string(),
        })
    }

    /// 取回页面原始 HTML
    pub async fn fetch_page(&self, url: &str) -> AppResult<String> {
        debug!("访问页面: {}", url);

        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::REFERER, &self.referer)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Fetch(FetchError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }));
        }

        let markup = response.text().await?;
        debug!("页面取得成功: {} 字符", markup.chars().count());

        Ok(markup)
    }
}
