use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 记事获取错误
    Fetch(FetchError),
    /// LLM 服务错误
    Llm(LlmError),
    /// 出题错误
    Quiz(QuizError),
    /// 对局逻辑错误
    Game(GameError),
    /// 结果存储错误
    Store(StoreError),
    /// 配置错误
    Config(ConfigError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Fetch(e) => write!(f, "记事获取错误: {}", e),
            AppError::Llm(e) => write!(f, "LLM错误: {}", e),
            AppError::Quiz(e) => write!(f, "出题错误: {}", e),
            AppError::Game(e) => write!(f, "对局错误: {}", e),
            AppError::Store(e) => write!(f, "存储错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Fetch(e) => Some(e),
            AppError::Llm(e) => Some(e),
            AppError::Quiz(e) => Some(e),
            AppError::Game(e) => Some(e),
            AppError::Store(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 记事获取错误
///
/// 只在 ArticleService 内部流转，对外一律用回退记事掩盖。
#[derive(Debug)]
pub enum FetchError {
    /// 网络请求失败
    RequestFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 响应状态码异常
    BadStatus {
        url: String,
        status: u16,
    },
    /// 页面缺少预期的标记结构
    MarkupNotFound {
        what: &'static str,
    },
    /// 记事正文为空
    EmptyBody {
        url: String,
    },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::RequestFailed { url, source } => {
                write!(f, "请求失败 ({}): {}", url, source)
            }
            FetchError::BadStatus { url, status } => {
                write!(f, "响应状态异常 ({}): HTTP {}", url, status)
            }
            FetchError::MarkupNotFound { what } => {
                write!(f, "页面中未找到预期结构: {}", what)
            }
            FetchError::EmptyBody { url } => write!(f, "记事正文为空: {}", url),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::RequestFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// LLM 服务错误
#[derive(Debug)]
pub enum LlmError {
    /// API 调用失败
    ApiCallFailed {
        model: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 调用超时
    Timeout {
        model: String,
        seconds: u64,
    },
    /// 返回结果为空
    EmptyResponse {
        model: String,
    },
    /// 返回内容为空
    EmptyContent {
        model: String,
    },
    /// 候选模型全部不可用
    NoUsableModel {
        tried: Vec<String>,
    },
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::ApiCallFailed { model, source } => {
                write!(f, "LLM API调用失败 (模型: {}): {}", model, source)
            }
            LlmError::Timeout { model, seconds } => {
                write!(f, "LLM API调用超时 (模型: {}, {}秒)", model, seconds)
            }
            LlmError::EmptyResponse { model } => {
                write!(f, "LLM返回结果为空 (模型: {})", model)
            }
            LlmError::EmptyContent { model } => {
                write!(f, "LLM返回内容为空 (模型: {})", model)
            }
            LlmError::NoUsableModel { tried } => {
                write!(f, "候选模型全部初始化失败: {}", tried.join(", "))
            }
        }
    }
}

impl std::error::Error for LlmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LlmError::ApiCallFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 出题错误
///
/// 题目生成流水线的回合级失败，玩家可选择重新出题。
#[derive(Debug)]
pub enum QuizError {
    /// 生成后端不可用（传输失败、超时、配额）
    BackendUnavailable {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 生成内容不完整（缺少标签或字段为空）
    IncompleteGeneration {
        missing: Vec<&'static str>,
    },
    /// Answer 标签不在 A-D 范围内
    InvalidAnswerLabel {
        raw: String,
    },
}

impl fmt::Display for QuizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizError::BackendUnavailable { source } => {
                write!(f, "生成后端不可用: {}", source)
            }
            QuizError::IncompleteGeneration { missing } => {
                write!(f, "生成内容不完整，缺少字段: {}", missing.join(", "))
            }
            QuizError::InvalidAnswerLabel { raw } => {
                write!(f, "Answer 标签无效: '{}' (应为 A/B/C/D)", raw)
            }
        }
    }
}

impl std::error::Error for QuizError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QuizError::BackendUnavailable { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 对局逻辑错误
///
/// 判定输入的契约违规，对当前回合致命，需记录日志。
#[derive(Debug)]
pub enum GameError {
    /// 没有进行中的回合
    NoActiveRound,
    /// 已有待回答的题目
    RoundInProgress,
    /// 对局尚未结束
    MatchNotFinished {
        round_index: u32,
        total_rounds: u32,
    },
    /// 延迟值非法（负数或非有限值）
    InvalidLatency {
        which: &'static str,
        value: f64,
    },
    /// 回合总数非法
    InvalidRoundCount {
        value: u32,
    },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::NoActiveRound => write!(f, "没有进行中的回合"),
            GameError::RoundInProgress => write!(f, "已有待回答的题目"),
            GameError::MatchNotFinished {
                round_index,
                total_rounds,
            } => {
                write!(f, "对局尚未结束 ({}/{})", round_index, total_rounds)
            }
            GameError::InvalidLatency { which, value } => {
                write!(f, "延迟值非法 ({}: {})", which, value)
            }
            GameError::InvalidRoundCount { value } => {
                write!(f, "回合总数非法: {}", value)
            }
        }
    }
}

impl std::error::Error for GameError {}

/// 结果存储错误
///
/// 只在 ResultStore 内部流转，写入失败一律吞掉。
#[derive(Debug)]
pub enum StoreError {
    /// 未配置存储目录
    NotConfigured,
    /// 写入失败
    WriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 读取失败
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotConfigured => write!(f, "结果存储未配置"),
            StoreError::WriteFailed { path, source } => {
                write!(f, "写入结果失败 ({}): {}", path, source)
            }
            StoreError::ReadFailed { path, source } => {
                write!(f, "读取结果失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::WriteFailed { source, .. } | StoreError::ReadFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 缺少 API Key
    MissingApiKey {
        var_name: &'static str,
    },
    /// 环境变量解析失败
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 内置回退记事库无效
    FallbackPoolInvalid {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingApiKey { var_name } => {
                write!(f, "缺少必需的环境变量 {}", var_name)
            }
            ConfigError::EnvVarParseFailed {
                var_name,
                value,
                expected_type,
            } => {
                write!(
                    f,
                    "环境变量 {} 解析失败: 值 '{}' 无法转换为 {}",
                    var_name, value, expected_type
                )
            }
            ConfigError::FallbackPoolInvalid { source } => {
                write!(f, "回退记事库解析失败: {}", source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::FallbackPoolInvalid { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

// ========== 从常见错误类型转换 ==========

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string()).unwrap_or_default();
        AppError::Fetch(FetchError::RequestFailed {
            url,
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Store(StoreError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(ConfigError::FallbackPoolInvalid {
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Store(StoreError::WriteFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建后端不可用错误
    pub fn backend_unavailable(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Quiz(QuizError::BackendUnavailable {
            source: Box::new(source),
        })
    }

    /// 创建生成内容不完整错误
    pub fn incomplete_generation(missing: Vec<&'static str>) -> Self {
        AppError::Quiz(QuizError::IncompleteGeneration { missing })
    }

    /// 创建 LLM API 调用错误
    pub fn llm_api_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        })
    }

    /// 创建延迟值非法错误
    pub fn invalid_latency(which: &'static str, value: f64) -> Self {
        AppError::Game(GameError::InvalidLatency { which, value })
    }

    /// 是否为回合级的出题失败（可由玩家选择重新出题）
    pub fn is_quiz_failure(&self) -> bool {
        matches!(self, AppError::Quiz(_))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
