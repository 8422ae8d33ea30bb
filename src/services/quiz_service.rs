//! 出题服务 - 业务能力层
//!
//! 只负责"记事 → 四择题目"能力，不关心流程
//!
//! ## 解析文法
//! 后端返回自由文本，按行解析。识别七个行前缀
//! （`Question:` `A:` `B:` `C:` `D:` `Answer:` `Explanation:`），
//! 未识别的行一律忽略（容忍后端附加的说明文），同一标签以首次出现为准。
//! 解析后统一校验：七个字段齐全非空，Answer 在 A-D 范围内
//! （忽略大小写，规范化为大写）。校验失败不自动重试，直接上报调用方。

use tracing::{debug, warn};

use crate::clients::GenerativeClient;
use crate::config::Config;
use crate::error::{AppError, AppResult, QuizError};
use crate::models::{Article, ChoiceLabel, QuizItem};

/// 出题服务
pub struct QuizService {
    client: GenerativeClient,
    prompt_max_chars: usize,
}

impl QuizService {
    /// 创建新的出题服务
    pub fn new(client: GenerativeClient, config: &Config) -> Self {
        Self {
            client,
            prompt_max_chars: config.prompt_max_chars,
        }
    }

    /// 当前使用的模型名
    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    /// 从记事生成一道四择题目
    ///
    /// 后端传输层失败（超时、配额、连接错误）映射为
    /// `QuizError::BackendUnavailable`；内容缺失映射为
    /// `QuizError::IncompleteGeneration`。两者都是回合级失败。
    pub async fn compile(&self, article: &Article) -> AppResult<QuizItem> {
        // 截断发生在发送之前
        let prompt = build_prompt(&article.clipped_content(self.prompt_max_chars));

        let response = match self.client.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("出题后端调用失败: {}", e);
                return Err(AppError::backend_unavailable(e));
            }
        };

        debug!("后端返回 {} 字符", response.chars().count());

        let draft = QuizDraft::parse(&response);
        let quiz = draft.into_quiz(article.clone())?;

        debug!("出题成功: {}", quiz.question);
        Ok(quiz)
    }
}

/// 出题提示词（固定模板）
fn build_prompt(text: &str) -> String {
    format!(
        r#"
以下の文章から時事ネタの4択クイズを作成してください。
以下のフォーマットで出力してください：

Question: （ここに問題文）
A: （選択肢A）
B: （選択肢B）
C: （選択肢C）
D: （選択肢D）
Answer: （正解の選択肢A、B、C、Dのいずれか）
Explanation: （ここに解説）

文章:
{}
"#,
        text
    )
}

/// 解析中间体
///
/// 七个字段全部可缺，完整性在 `into_quiz` 统一校验。
#[derive(Debug, Default)]
struct QuizDraft {
    question: Option<String>,
    choice_a: Option<String>,
    choice_b: Option<String>,
    choice_c: Option<String>,
    choice_d: Option<String>,
    answer: Option<String>,
    explanation: Option<String>,
}

impl QuizDraft {
    /// 按行解析后端回复
    fn parse(text: &str) -> Self {
        let mut draft = Self::default();

        for line in text.lines() {
            let line = line.trim();
            if let Some(rest) = line.strip_prefix("Question:") {
                set_first(&mut draft.question, rest);
            } else if let Some(rest) = line.strip_prefix("Answer:") {
                set_first(&mut draft.answer, rest);
            } else if let Some(rest) = line.strip_prefix("Explanation:") {
                set_first(&mut draft.explanation, rest);
            } else if let Some(rest) = line.strip_prefix("A:") {
                set_first(&mut draft.choice_a, rest);
            } else if let Some(rest) = line.strip_prefix("B:") {
                set_first(&mut draft.choice_b, rest);
            } else if let Some(rest) = line.strip_prefix("C:") {
                set_first(&mut draft.choice_c, rest);
            } else if let Some(rest) = line.strip_prefix("D:") {
                set_first(&mut draft.choice_d, rest);
            }
            // 其余行忽略
        }

        draft
    }

    /// 完整性与标签校验，通过则产出题目
    fn into_quiz(self, article: Article) -> AppResult<QuizItem> {
        let mut missing = Vec::new();
        check_field(&self.question, "Question", &mut missing);
        check_field(&self.choice_a, "A", &mut missing);
        check_field(&self.choice_b, "B", &mut missing);
        check_field(&self.choice_c, "C", &mut missing);
        check_field(&self.choice_d, "D", &mut missing);
        check_field(&self.answer, "Answer", &mut missing);
        check_field(&self.explanation, "Explanation", &mut missing);

        if !missing.is_empty() {
            warn!("生成内容不完整，缺少: {}", missing.join(", "));
            return Err(AppError::incomplete_generation(missing));
        }

        // 上面已确认七个字段全部存在且非空
        let raw_answer = self.answer.unwrap_or_default();
        let answer = match ChoiceLabel::parse(&raw_answer) {
            Some(label) => label,
            None => {
                warn!("Answer 标签无效: '{}'", raw_answer);
                return Err(AppError::Quiz(QuizError::InvalidAnswerLabel {
                    raw: raw_answer,
                }));
            }
        };

        Ok(QuizItem {
            question: self.question.unwrap_or_default(),
            choice_a: self.choice_a.unwrap_or_default(),
            choice_b: self.choice_b.unwrap_or_default(),
            choice_c: self.choice_c.unwrap_or_default(),
            choice_d: self.choice_d.unwrap_or_default(),
            answer,
            explanation: self.explanation.unwrap_or_default(),
            article,
        })
    }
}

/// 同一标签以首次出现为准
fn set_first(slot: &mut Option<String>, raw: &str) {
    if slot.is_none() {
        *slot = Some(raw.trim().to_string());
    }
}

/// 字段缺失或为空时记入缺失列表
fn check_field(slot: &Option<String>, tag: &'static str, missing: &mut Vec<&'static str>) {
    match slot {
        Some(value) if !value.trim().is_empty() => {}
        _ => missing.push(tag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article() -> Article {
        Article::new("テスト記事", "https://example.com/news", "本文テキスト")
    }

    const WELL_FORMED: &str = "\
Question: 日銀が発表した政策金利の引き上げ幅は？
A: 0.1%
B: 0.5%
C: 1.0%
D: 2.0%
Answer: A
Explanation: 記事によると引き上げ幅は0.1%で、2年ぶりの利上げとなる。";

    #[test]
    fn test_parse_well_formed_reply() {
        let quiz = QuizDraft::parse(WELL_FORMED)
            .into_quiz(article())
            .expect("完整回复应能通过校验");

        assert_eq!(quiz.question, "日銀が発表した政策金利の引き上げ幅は？");
        assert_eq!(quiz.choice_a, "0.1%");
        assert_eq!(quiz.choice_d, "2.0%");
        assert_eq!(quiz.answer, ChoiceLabel::A);
        assert!(quiz.explanation.starts_with("記事によると"));
    }

    #[test]
    fn test_parse_ignores_unknown_lines() {
        let reply = format!(
            "わかりました。以下がクイズです。\n\n{}\n\n以上です。ご確認ください。",
            WELL_FORMED
        );
        let quiz = QuizDraft::parse(&reply).into_quiz(article());
        assert!(quiz.is_ok());
    }

    #[test]
    fn test_parse_first_occurrence_wins() {
        let reply = format!("{}\nQuestion: 二つ目の問題？\nAnswer: B", WELL_FORMED);
        let quiz = QuizDraft::parse(&reply)
            .into_quiz(article())
            .expect("校验应通过");
        assert_eq!(quiz.question, "日銀が発表した政策金利の引き上げ幅は？");
        assert_eq!(quiz.answer, ChoiceLabel::A);
    }

    #[test]
    fn test_missing_answer_is_incomplete() {
        // Question と選択肢だけで Answer 行が無い
        let reply = "\
Question: 問題文？
A: 一
B: 二
C: 三
D: 四
Explanation: 解説";
        let result = QuizDraft::parse(reply).into_quiz(article());
        match result {
            Err(AppError::Quiz(QuizError::IncompleteGeneration { missing })) => {
                assert_eq!(missing, vec!["Answer"]);
            }
            other => panic!("应为 IncompleteGeneration，实际: {:?}", other),
        }
    }

    #[test]
    fn test_empty_choice_is_incomplete() {
        let reply = "\
Question: 問題文？
A: 一
B:
C: 三
D: 四
Answer: A
Explanation: 解説";
        let result = QuizDraft::parse(reply).into_quiz(article());
        match result {
            Err(AppError::Quiz(QuizError::IncompleteGeneration { missing })) => {
                assert_eq!(missing, vec!["B"]);
            }
            other => panic!("应为 IncompleteGeneration，实际: {:?}", other),
        }
    }

    #[test]
    fn test_answer_label_normalized_to_uppercase() {
        let reply = WELL_FORMED.replace("Answer: A", "Answer: a");
        let quiz = QuizDraft::parse(&reply)
            .into_quiz(article())
            .expect("小写标签应被规范化");
        assert_eq!(quiz.answer, ChoiceLabel::A);
    }

    #[test]
    fn test_answer_label_out_of_range_rejected() {
        let reply = WELL_FORMED.replace("Answer: A", "Answer: E");
        let result = QuizDraft::parse(&reply).into_quiz(article());
        assert!(matches!(
            result,
            Err(AppError::Quiz(QuizError::InvalidAnswerLabel { .. }))
        ));
    }

    #[test]
    fn test_build_prompt_embeds_text_and_tags() {
        let prompt = build_prompt("記事本文");
        assert!(prompt.contains("記事本文"));
        assert!(prompt.contains("Question:"));
        assert!(prompt.contains("Explanation:"));
    }
}
