use serde::{Deserialize, Serialize};

use crate::models::article::Article;

/// 选项标签枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChoiceLabel {
    A,
    B,
    C,
    D,
}

impl ChoiceLabel {
    /// 全部标签，按显示顺序
    pub const ALL: [ChoiceLabel; 4] = [
        ChoiceLabel::A,
        ChoiceLabel::B,
        ChoiceLabel::C,
        ChoiceLabel::D,
    ];

    /// 获取标签名称
    pub fn name(self) -> &'static str {
        match self {
            ChoiceLabel::A => "A",
            ChoiceLabel::B => "B",
            ChoiceLabel::C => "C",
            ChoiceLabel::D => "D",
        }
    }

    /// 从字符串解析标签
    ///
    /// 去除首尾空白并忽略大小写，超出 A-D 范围返回 None。
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "A" => Some(ChoiceLabel::A),
            "B" => Some(ChoiceLabel::B),
            "C" => Some(ChoiceLabel::C),
            "D" => Some(ChoiceLabel::D),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChoiceLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 四择题目
///
/// 由出题服务生成，裁判只读消费，回合结束后即丢弃。
/// 不变式：四个选项齐全且非空，answer 在 A-D 范围内
/// （由 QuizService 的校验保证）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizItem {
    /// 问题文
    pub question: String,
    /// 选项 A
    pub choice_a: String,
    /// 选项 B
    pub choice_b: String,
    /// 选项 C
    pub choice_c: String,
    /// 选项 D
    pub choice_d: String,
    /// 正解标签
    pub answer: ChoiceLabel,
    /// 解说文
    pub explanation: String,
    /// 出题素材记事
    pub article: Article,
}

impl QuizItem {
    /// 按标签取选项文本
    pub fn choice(&self, label: ChoiceLabel) -> &str {
        match label {
            ChoiceLabel::A => &self.choice_a,
            ChoiceLabel::B => &self.choice_b,
            ChoiceLabel::C => &self.choice_c,
            ChoiceLabel::D => &self.choice_d,
        }
    }

    /// 按显示顺序遍历 (标签, 选项文本)
    pub fn choices(&self) -> impl Iterator<Item = (ChoiceLabel, &str)> {
        ChoiceLabel::ALL
            .into_iter()
            .map(move |label| (label, self.choice(label)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_label_case_insensitive() {
        assert_eq!(ChoiceLabel::parse("a"), Some(ChoiceLabel::A));
        assert_eq!(ChoiceLabel::parse(" B "), Some(ChoiceLabel::B));
        assert_eq!(ChoiceLabel::parse("d"), Some(ChoiceLabel::D));
    }

    #[test]
    fn test_parse_label_rejects_out_of_range() {
        assert_eq!(ChoiceLabel::parse("E"), None);
        assert_eq!(ChoiceLabel::parse("AB"), None);
        assert_eq!(ChoiceLabel::parse(""), None);
        assert_eq!(ChoiceLabel::parse("1"), None);
    }
}
