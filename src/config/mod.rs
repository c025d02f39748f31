use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use crate::i18n::TargetLanguage;

/// LLM Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum LLMProvider {
    #[serde(rename = "openai")]
    #[default]
    OpenAI,
    #[serde(rename = "moonshot")]
    Moonshot,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "mistral")]
    Mistral,
    #[serde(rename = "openrouter")]
    OpenRouter,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "gemini")]
    Gemini,
    #[serde(rename = "ollama")]
    Ollama,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::Moonshot => write!(f, "moonshot"),
            LLMProvider::DeepSeek => write!(f, "deepseek"),
            LLMProvider::Mistral => write!(f, "mistral"),
            LLMProvider::OpenRouter => write!(f, "openrouter"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
            LLMProvider::Gemini => write!(f, "gemini"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(LLMProvider::OpenAI),
            "moonshot" => Ok(LLMProvider::Moonshot),
            "deepseek" => Ok(LLMProvider::DeepSeek),
            "mistral" => Ok(LLMProvider::Mistral),
            "openrouter" => Ok(LLMProvider::OpenRouter),
            "anthropic" => Ok(LLMProvider::Anthropic),
            "gemini" => Ok(LLMProvider::Gemini),
            "ollama" => Ok(LLMProvider::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// 检索Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum SearchProvider {
    #[serde(rename = "tavily")]
    #[default]
    Tavily,
    #[serde(rename = "exa")]
    Exa,
}

impl std::fmt::Display for SearchProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchProvider::Tavily => write!(f, "tavily"),
            SearchProvider::Exa => write!(f, "exa"),
        }
    }
}

impl std::str::FromStr for SearchProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tavily" => Ok(SearchProvider::Tavily),
            "exa" => Ok(SearchProvider::Exa),
            _ => Err(format!("Unknown search provider: {}", s)),
        }
    }
}

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Config {
    /// 研究主题（通常由命令行提供）
    pub topic: Option<String>,

    /// 报告输出路径
    pub output_path: PathBuf,

    /// 内部工作目录路径 (.quill)
    pub internal_path: PathBuf,

    /// 报告目标语言
    pub target_language: TargetLanguage,

    /// 报告规划与迭代预算配置
    pub report: ReportConfig,

    /// LLM模型配置
    pub llm: LLMConfig,

    /// 证据检索配置
    pub search: SearchConfig,

    /// 运行检查点配置
    pub checkpoint: CheckpointConfig,

    /// LLM响应缓存配置
    pub cache: CacheConfig,

    /// 强制重新生成（读缓存时视为未命中）
    pub force_regenerate: bool,

    /// 跳过人工确认闸口，规划完成后直接执行
    pub auto_approve: bool,

    /// 是否启用详细日志
    pub verbose: bool,
}

/// 报告结构模板，注入规划指令
pub const DEFAULT_REPORT_STRUCTURE: &str = r#"报告应遵循如下结构组织章节：

1. 引言（无需调研）
   - 简要介绍主题背景与报告范围

2. 主体章节（需要调研）
   - 每个章节聚焦主题的一个子方向，由检索证据支撑

3. 结论（无需调研）
   - 用一个列表或表格提炼主体章节的核心结论
   - 给出简明的总结"#;

/// 报告规划与各分支迭代预算
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ReportConfig {
    /// 报告结构模板，指导规划阶段的章节划分
    pub report_structure: String,

    /// 每次查询生成产出的检索查询数量
    pub number_of_queries: usize,

    /// 单章节最大检索深度，限定调研循环次数
    pub max_search_depth: u32,

    /// 单章节最大修订次数
    pub max_revisions: u32,

    /// 质量评估通过阈值（0-100），低于该分数且预算未耗尽时触发修订
    pub revision_threshold: u32,

    /// 是否同时导出HTML版报告
    pub export_html: bool,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    /// LLM Provider类型
    pub provider: LLMProvider,

    /// LLM API KEY
    pub api_key: String,

    /// LLM API基地址
    pub api_base_url: String,

    /// 高能效模型，优先用于Quill引擎的常规推理任务
    pub model_efficient: String,

    /// 高质量模型，优先用于Quill引擎的复杂推理任务，以及作为efficient失效情况下的兜底
    pub model_powerful: String,

    /// 最大tokens
    pub max_tokens: u32,

    /// 温度
    pub temperature: f64,

    /// 重试次数
    pub retry_attempts: u32,

    /// 重试间隔（毫秒）
    pub retry_delay_ms: u64,

    /// 超时时间（秒）
    pub timeout_seconds: u64,

    /// 章节分支的最大并行度
    pub max_parallels: usize,
}

/// 证据检索配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// 检索Provider类型
    pub provider: SearchProvider,

    /// 检索API KEY
    pub api_key: String,

    /// 检索API基地址，留空时使用Provider的官方端点
    pub api_base_url: String,

    /// 单次查询返回的最大结果数
    pub max_results: usize,

    /// 单次检索请求的超时时间（秒）
    pub timeout_seconds: u64,

    /// 检索失败的重试次数
    pub retry_attempts: u32,

    /// 检索重试间隔（毫秒），实际等待带随机抖动
    pub retry_delay_ms: u64,

    /// 是否在证据中包含来源的原始正文
    pub include_raw_content: bool,

    /// 本地知识库目录，未配置时知识库路由直接回退Web
    pub knowledge_base_path: Option<PathBuf>,

    /// 知识库文件匹配模式
    pub kb_include_patterns: Vec<String>,
}

/// 运行检查点配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CheckpointConfig {
    /// 检查点存储目录
    pub checkpoint_dir: PathBuf,
}

/// LLM响应缓存配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    /// 是否启用缓存
    pub enabled: bool,

    /// 缓存目录
    pub cache_dir: PathBuf,

    /// 缓存过期时间（小时）
    pub expire_hours: u64,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            topic: None,
            output_path: PathBuf::from("./quill.reports"),
            internal_path: PathBuf::from("./.quill"),
            target_language: TargetLanguage::default(),
            report: ReportConfig::default(),
            llm: LLMConfig::default(),
            search: SearchConfig::default(),
            checkpoint: CheckpointConfig::default(),
            cache: CacheConfig::default(),
            force_regenerate: false,
            auto_approve: false,
            verbose: false,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            report_structure: DEFAULT_REPORT_STRUCTURE.to_string(),
            number_of_queries: 2,
            max_search_depth: 2,
            max_revisions: 3,
            revision_threshold: 85,
            export_html: true,
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::default(),
            api_key: std::env::var("QUILL_LLM_API_KEY").unwrap_or_default(),
            api_base_url: String::from("https://api-inference.modelscope.cn/v1"),
            model_efficient: String::from("Qwen/Qwen3-Next-80B-A3B-Instruct"),
            model_powerful: String::from("Qwen/Qwen3-235B-A22B-Instruct-2507"),
            max_tokens: 131072,
            temperature: 0.1,
            retry_attempts: 5,
            retry_delay_ms: 5000,
            timeout_seconds: 300,
            max_parallels: 3,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: SearchProvider::default(),
            api_key: std::env::var("QUILL_SEARCH_API_KEY").unwrap_or_default(),
            api_base_url: String::new(),
            max_results: 5,
            timeout_seconds: 30,
            retry_attempts: 3,
            retry_delay_ms: 1000,
            include_raw_content: false,
            knowledge_base_path: None,
            kb_include_patterns: vec!["**/*.md".to_string(), "**/*.txt".to_string()],
        }
    }
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: PathBuf::from(".quill/runs"),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cache_dir: PathBuf::from(".quill/cache"),
            expire_hours: 8760,
        }
    }
}
