/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    /// 候选模型列表，启动时按顺序探测，第一个可用的胜出
    pub llm_model_candidates: Vec<String>,
    /// LLM 单次调用超时（秒）
    pub llm_timeout_secs: u64,
    // --- 记事获取配置 ---
    /// 新闻一览页 URL
    pub news_topics_url: String,
    /// HTTP 请求超时（秒）
    pub fetch_timeout_secs: u64,
    /// 提示词中记事正文的最大字符数
    pub prompt_max_chars: usize,
    // --- 对局配置 ---
    /// 默认回合总数
    pub default_total_rounds: u32,
    // --- 结果存储配置 ---
    /// 结果存储目录，留空则禁用存储
    pub results_dir: String,
    // --- 日志配置 ---
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 对局日志文件
    pub match_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai"
                .to_string(),
            llm_model_candidates: vec![
                "gemini-1.5-flash".to_string(),
                "gemini-1.5-pro".to_string(),
                "gemini-pro".to_string(),
                "gemini-1.0-pro".to_string(),
            ],
            llm_timeout_secs: 30,
            news_topics_url: "https://news.yahoo.co.jp/topics/business".to_string(),
            fetch_timeout_secs: 10,
            prompt_max_chars: 2000,
            default_total_rounds: 5,
            results_dir: "results".to_string(),
            verbose_logging: false,
            match_log_file: "match_log.txt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            llm_api_key: std::env::var("GEMINI_API_KEY")
                .or_else(|_| std::env::var("LLM_API_KEY"))
                .unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_candidates: std::env::var("LLM_MODEL_CANDIDATES")
                .ok()
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .filter(|v: &Vec<String>| !v.is_empty())
                .unwrap_or(default.llm_model_candidates),
            llm_timeout_secs: std::env::var("LLM_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_timeout_secs),
            news_topics_url: std::env::var("NEWS_TOPICS_URL").unwrap_or(default.news_topics_url),
            fetch_timeout_secs: std::env::var("FETCH_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.fetch_timeout_secs),
            prompt_max_chars: std::env::var("PROMPT_MAX_CHARS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.prompt_max_chars),
            default_total_rounds: std::env::var("TOTAL_ROUNDS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.default_total_rounds),
            results_dir: std::env::var("RESULTS_DIR").unwrap_or(default.results_dir),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            match_log_file: std::env::var("MATCH_LOG_FILE").unwrap_or(default.match_log_file),
        }
    }
}
