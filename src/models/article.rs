use serde::{Deserialize, Serialize};

/// 新闻记事
///
/// 一局出题的素材，取得后不再变更，生命周期为一个回合。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// 记事标题
    pub title: String,
    /// 记事来源 URL
    pub url: String,
    /// 记事正文
    pub content: String,
}

impl Article {
    /// 创建新的记事
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: content.into(),
        }
    }

    /// 按字符数截断正文
    ///
    /// 用于在发送提示词之前限制正文长度（截断发生在发送前，
    /// 而不是收到失败后）。
    pub fn clipped_content(&self, max_chars: usize) -> String {
        if self.content.chars().count() > max_chars {
            self.content.chars().take(max_chars).collect()
        } else {
            self.content.clone()
        }
    }
}
