//! 记事服务 - 业务能力层
//!
//! 只负责"提供一篇出题素材记事"能力，不关心流程
//!
//! ## 失败掩盖契约
//! `fetch_article` 永不失败：在线抓取的任何一步出错
//! （网络错误、超时、页面结构变化、正文为空）都会回退到
//! 内置记事库随机选取。下游永远不需要知道记事来自网络还是内置库。

use rand::Rng;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::clients::NewsClient;
use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError, FetchError};
use crate::models::Article;

/// 内置回退记事库（构建时嵌入）
const FALLBACK_POOL_TOML: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/fallback_articles.toml"));

/// 回退记事库的 TOML 结构
#[derive(Debug, Deserialize)]
struct FallbackPool {
    articles: Vec<Article>,
}

/// 记事服务
///
/// 职责：
/// - 从新闻一览页抓取一篇记事（一览 → 记事页 → 全文页 → 正文抽取）
/// - 抓取失败时回退到内置记事库
/// - 只产出单篇 Article，不关心流程顺序
pub struct ArticleService {
    news: NewsClient,
    topics_url: String,
    max_chars: usize,
    fallback_pool: Vec<Article>,
    href_re: Regex,
    gotocontent_re: Regex,
    title_re: Regex,
    para_re: Regex,
    tag_re: Regex,
}

impl ArticleService {
    /// 创建新的记事服务
    pub fn new(config: &Config) -> AppResult<Self> {
        let pool: FallbackPool = toml::from_str(FALLBACK_POOL_TOML)?;
        if pool.articles.is_empty() {
            return Err(AppError::Config(ConfigError::FallbackPoolInvalid {
                source: "记事库为空".into(),
            }));
        }

        Ok(Self {
            news: NewsClient::new(config)?,
            topics_url: config.news_topics_url.clone(),
            max_chars: config.prompt_max_chars,
            fallback_pool: pool.articles,
            href_re: compile(r#"<a\s+[^>]*href="([^"]+)""#)?,
            gotocontent_re: compile(r#"<a[^>]*data-ual-gotocontent="true"[^>]*>"#)?,
            title_re: compile(r"<h1[^>]*>([^<]+)</h1>")?,
            para_re: compile(r"(?s)<(?:p|h2)[^>]*>(.*?)</(?:p|h2)>")?,
            tag_re: compile(r"<[^>]+>")?,
        })
    }

    /// 取得一篇出题素材记事（永不失败）
    pub async fn fetch_article(&self, rng: &mut impl Rng) -> Article {
        match self.fetch_live(rng).await {
            Ok(article) => {
                info!("✓ 记事取得成功: {}", article.title);
                article
            }
            Err(e) => {
                warn!("记事取得失败: {} - 使用内置记事", e);
                self.fallback_article(rng)
            }
        }
    }

    /// 从内置记事库随机选取一篇
    pub fn fallback_article(&self, rng: &mut impl Rng) -> Article {
        let index = rng.gen_range(0..self.fallback_pool.len());
        self.fallback_pool[index].clone()
    }

    /// 在线抓取：一览页 → 随机记事 → 全文页 → 正文
    async fn fetch_live(&self, rng: &mut impl Rng) -> AppResult<Article> {
        let markup = self.news.fetch_page(&self.topics_url).await?;

        let links = self.extract_feed_links(&markup);
        if links.is_empty() {
            return Err(AppError::Fetch(FetchError::MarkupNotFound {
                what: "newsFeed_list",
            }));
        }
        debug!("取得记事链接 {} 件", links.len());

        let picked = &links[rng.gen_range(0..links.len())];
        let article_url = absolutize(&self.topics_url, picked);

        let article_markup = self.news.fetch_page(&article_url).await?;
        let full_href = self
            .extract_full_article_link(&article_markup)
            .ok_or(AppError::Fetch(FetchError::MarkupNotFound {
                what: "data-ual-gotocontent",
            }))?;
        let full_url = absolutize(&article_url, &full_href);

        let full_markup = self.news.fetch_page(&full_url).await?;
        let content = self
            .extract_body_text(&full_markup)
            .ok_or(AppError::Fetch(FetchError::MarkupNotFound {
                what: "article_body",
            }))?;
        if content.is_empty() {
            return Err(AppError::Fetch(FetchError::EmptyBody { url: full_url }));
        }

        let title = self
            .extract_title(&full_markup)
            .unwrap_or_else(|| "タイトルなし".to_string());

        let article = Article::new(title, full_url, content);
        Ok(Article {
            content: article.clipped_content(self.max_chars),
            ..article
        })
    }

    /// 从一览页标记中抽取记事链接
    fn extract_feed_links(&self, markup: &str) -> Vec<String> {
        let Some(start) = markup.find("newsFeed_list") else {
            return Vec::new();
        };
        let section = &markup[start..];
        let end = section.find("</ul>").unwrap_or(section.len());
        let section = &section[..end];

        self.href_re
            .captures_iter(section)
            .map(|caps| caps[1].to_string())
            .collect()
    }

    /// 从记事页中找到"记事全文"链接
    fn extract_full_article_link(&self, markup: &str) -> Option<String> {
        let tag = self.gotocontent_re.find(markup)?;
        self.href_re
            .captures(tag.as_str())
            .map(|caps| caps[1].to_string())
    }

    /// 从全文页中抽取记事标题
    fn extract_title(&self, markup: &str) -> Option<String> {
        self.title_re
            .captures(markup)
            .map(|caps| caps[1].trim().to_string())
            .filter(|title| !title.is_empty())
    }

    /// 从全文页中抽取正文段落并拼接
    fn extract_body_text(&self, markup: &str) -> Option<String> {
        let start = markup.find("article_body")?;
        let section = &markup[start..];
        let end = section.find("</article>").unwrap_or(section.len());
        let section = &section[..end];

        let paragraphs: Vec<String> = self
            .para_re
            .captures_iter(section)
            .map(|caps| self.tag_re.replace_all(&caps[1], "").trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();

        Some(paragraphs.join(" "))
    }
}

/// 编译正则（失败包装为应用错误）
fn compile(pattern: &str) -> AppResult<Regex> {
    Regex::new(pattern).map_err(|e| AppError::Other(format!("正则编译失败: {}", e)))
}

/// 相对 URL 转绝对 URL
fn absolutize(base: &str, href: &str) -> String {
    if href.starts_with("http") {
        return href.to_string();
    }
    let origin = match base.find("://") {
        Some(i) => match base[i + 3..].find('/') {
            Some(j) => &base[..i + 3 + j],
            None => base,
        },
        None => base,
    };
    if href.starts_with('/') {
        format!("{}{}", origin, href)
    } else {
        format!("{}/{}", origin, href)
    }
}
