//! 生成后端客户端
//!
//! 封装与 OpenAI 兼容端点的全部传输逻辑。
//! 提示词的构造和响应的解析属于出题服务，这里只负责收发。
//!
//! ## 模型选择
//! 启动时按配置的候选列表顺序逐个探测，第一个探测成功的模型胜出；
//! 全部失败则初始化失败，程序不应继续。

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError, LlmError};

/// 探测请求使用的极小回复长度
const PROBE_MAX_TOKENS: u32 = 1;

/// 正式生成请求的回复长度上限
const GENERATE_MAX_TOKENS: u32 = 1024;

/// 生成后端客户端
pub struct GenerativeClient {
    client: Client<OpenAIConfig>,
    model_name: String,
    timeout_secs: u64,
}

impl GenerativeClient {
    /// 按候选模型列表初始化客户端
    ///
    /// 逐个发送探测请求，第一个成功的模型被采用并记录日志；
    /// 候选全部失败返回 `LlmError::NoUsableModel`（启动级致命错误）。
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        if config.llm_api_key.is_empty() {
            return Err(AppError::Config(ConfigError::MissingApiKey {
                var_name: "GEMINI_API_KEY",
            }));
        }

        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);
        let client = Client::with_config(openai_config);

        for model_name in &config.llm_model_candidates {
            match send_chat(
                &client,
                model_name,
                "ping",
                PROBE_MAX_TOKENS,
                config.llm_timeout_secs,
            )
            .await
            {
                Ok(_) => {
                    info!("✓ 使用模型 '{}'", model_name);
                    return Ok(Self {
                        client,
                        model_name: model_name.clone(),
                        timeout_secs: config.llm_timeout_secs,
                    });
                }
                Err(e) => {
                    warn!("模型 '{}' 初始化失败: {}", model_name, e);
                }
            }
        }

        Err(AppError::Llm(LlmError::NoUsableModel {
            tried: config.llm_model_candidates.clone(),
        }))
    }

    /// 当前使用的模型名
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// 发送提示词并返回纯文本回复
    pub async fn generate(&self, prompt: &str) -> AppResult<String> {
        send_chat(
            &self.client,
            &self.model_name,
            prompt,
            GENERATE_MAX_TOKENS,
            self.timeout_secs,
        )
        .await
    }
}

/// 发送单条用户消息并提取回复内容
async fn send_chat(
    client: &Client<OpenAIConfig>,
    model_name: &str,
    user_message: &str,
    max_tokens: u32,
    timeout_secs: u64,
) -> AppResult<String> {
    debug!("调用 LLM API，模型: {}", model_name);
    debug!("用户消息长度: {} 字符", user_message.chars().count());

    let user_msg = ChatCompletionRequestUserMessageArgs::default()
        .content(user_message)
        .build()
        .map_err(|e| AppError::llm_api_failed(model_name, e))?;

    let request = CreateChatCompletionRequestArgs::default()
        .model(model_name)
        .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
        .temperature(0.3)
        .max_tokens(max_tokens)
        .build()
        .map_err(|e| AppError::llm_api_failed(model_name, e))?;

    let call = client.chat().create(request);
    let response = match tokio::time::timeout(Duration::from_secs(timeout_secs), call).await {
        Ok(result) => result.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            AppError::llm_api_failed(model_name, e)
        })?,
        Err(_) => {
            warn!("LLM API 调用超时 ({}秒)", timeout_secs);
            return Err(AppError::Llm(LlmError::Timeout {
                model: model_name.to_string(),
                seconds: timeout_secs,
            }));
        }
    };

    debug!("LLM API 调用成功");

    let content = response
        .choices
        .first()
        .ok_or_else(|| {
            AppError::Llm(LlmError::EmptyResponse {
                model: model_name.to_string(),
            })
        })?
        .message
        .content
        .clone()
        .ok_or_else(|| {
            AppError::Llm(LlmError::EmptyContent {
                model: model_name.to_string(),
            })
        })?;

    Ok(content.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    /// 测试候选模型探测与真实调用
    ///
    /// 运行方式：
    /// ```bash
    /// GEMINI_API_KEY=... cargo test test_initialize_and_generate -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_initialize_and_generate() {
        let _ = tracing_subscriber::fmt::try_init();

        let config = Config::from_env();
        let client = GenerativeClient::initialize(&config)
            .await
            .expect("候选模型应至少有一个可用");

        println!("使用模型: {}", client.model_name());

        let response = client.generate("1+1=?").await.expect("调用应成功");
        println!("LLM 响应: {}", response);
        assert!(!response.is_empty());
    }

    #[tokio::test]
    async fn test_initialize_requires_api_key() {
        let config = Config {
            llm_api_key: String::new(),
            ..Config::default()
        };

        let result = GenerativeClient::initialize(&config).await;
        assert!(matches!(
            result,
            Err(AppError::Config(ConfigError::MissingApiKey { .. }))
        ));
    }
}
