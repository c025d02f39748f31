use crate::config::{Config, LLMProvider, SearchProvider};
use crate::i18n::TargetLanguage;
use clap::Parser;
use std::path::PathBuf;

/// Quill (deepresearch-rs) - 由Rust与AI驱动的深度研究报告引擎
#[derive(Parser, Debug)]
#[command(name = "Quill (deepresearch-rs)")]
#[command(
    about = "AI-based deep research report engine, It can plan report sections from a topic, research them concurrently with web evidence, and compile a final report with deduplicated citations."
)]
#[command(author = "Sopaco")]
#[command(version)]
pub struct Args {
    /// 研究主题，启动新一轮报告工作流
    #[arg(short, long)]
    pub topic: Option<String>,

    /// 报告输出路径
    #[arg(short, long)]
    pub output_path: Option<PathBuf>,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 恢复挂起的运行，取值为启动时打印的run_id
    #[arg(long, value_name = "RUN_ID")]
    pub resume: Option<String>,

    /// 恢复时确认规划，继续执行后续阶段
    #[arg(long, requires = "resume", conflicts_with = "feedback")]
    pub approve: bool,

    /// 恢复时提交规划反馈，触发重新规划
    #[arg(long, requires = "resume", value_name = "TEXT")]
    pub feedback: Option<String>,

    /// 列出所有运行检查点
    #[arg(long)]
    pub list_runs: bool,

    /// 跳过人工确认闸口，规划完成后直接执行
    #[arg(long)]
    pub auto_approve: bool,

    /// 是否启用详细日志
    #[arg(short, long)]
    pub verbose: bool,

    /// 高能效模型，优先用于Quill引擎的常规推理任务
    #[arg(long)]
    pub model_efficient: Option<String>,

    /// 高质量模型，优先用于Quill引擎的复杂推理任务，以及作为efficient失效情况下的兜底
    #[arg(long)]
    pub model_powerful: Option<String>,

    /// LLM API基地址
    #[arg(long)]
    pub llm_api_base_url: Option<String>,

    /// LLM API KEY
    #[arg(long)]
    pub llm_api_key: Option<String>,

    /// 最大tokens数
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// 温度参数
    #[arg(long)]
    pub temperature: Option<f64>,

    /// 章节分支的最大并行度
    #[arg(long)]
    pub max_parallels: Option<usize>,

    /// LLM Provider (openai, moonshot, deepseek, mistral, openrouter, anthropic, gemini, ollama)
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// 检索Provider (tavily, exa)
    #[arg(long)]
    pub search_provider: Option<String>,

    /// 检索API KEY
    #[arg(long)]
    pub search_api_key: Option<String>,

    /// 本地知识库目录，配置后调研分支可路由到知识库检索
    #[arg(long)]
    pub knowledge_base: Option<PathBuf>,

    /// 每次查询生成产出的检索查询数量
    #[arg(long)]
    pub number_of_queries: Option<usize>,

    /// 单章节最大检索深度
    #[arg(long)]
    pub max_search_depth: Option<u32>,

    /// 单章节最大修订次数
    #[arg(long)]
    pub max_revisions: Option<u32>,

    /// 质量评估通过阈值（0-100）
    #[arg(long)]
    pub revision_threshold: Option<u32>,

    /// 目标语言 (zh, en, ja, ko, de, fr, ru)
    #[arg(long)]
    pub target_language: Option<String>,

    /// 是否禁用HTML版报告导出
    #[arg(long)]
    pub no_html: bool,

    /// 是否禁用缓存
    #[arg(long)]
    pub no_cache: bool,

    /// 强制重新生成（清除缓存）
    #[arg(long)]
    pub force_regenerate: bool,
}

impl Args {
    /// 将CLI参数转换为配置
    pub fn into_config(self) -> Config {
        let mut config = if let Some(config_path) = &self.config {
            // 如果显式指定了配置文件路径，从该路径加载
            Config::from_file(config_path).unwrap_or_else(|e| {
                eprintln!(
                    "⚠️ 警告: 无法读取配置文件 {:?} ({:#})，使用默认配置",
                    config_path, e
                );
                Config::default()
            })
        } else {
            // 如果没有显式指定配置文件，尝试从默认位置加载
            let default_config_path = std::env::current_dir()
                .unwrap_or_else(|_| std::path::PathBuf::from("."))
                .join("quill.toml");

            if default_config_path.exists() {
                Config::from_file(&default_config_path).unwrap_or_else(|e| {
                    eprintln!(
                        "⚠️ 警告: 无法读取默认配置文件 {:?} ({:#})，使用默认配置",
                        default_config_path, e
                    );
                    Config::default()
                })
            } else {
                // 默认配置文件不存在，使用默认值
                Config::default()
            }
        };

        // 覆盖配置文件中的设置
        if let Some(topic) = self.topic {
            config.topic = Some(topic);
        }
        if let Some(output_path) = self.output_path {
            config.output_path = output_path;
        }

        // 覆盖LLM配置
        if let Some(provider_str) = self.llm_provider {
            if let Ok(provider) = provider_str.parse::<LLMProvider>() {
                config.llm.provider = provider;
            } else {
                eprintln!(
                    "⚠️ 警告: 未知的provider: {}，使用默认provider",
                    provider_str
                );
            }
        }
        if let Some(llm_api_base_url) = self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url;
        }
        if let Some(llm_api_key) = self.llm_api_key {
            config.llm.api_key = llm_api_key;
        }
        if let Some(model_efficient) = self.model_efficient {
            config.llm.model_efficient = model_efficient;
        }
        if let Some(model_powerful) = self.model_powerful {
            config.llm.model_powerful = model_powerful;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.llm.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
        }
        if let Some(max_parallels) = self.max_parallels {
            config.llm.max_parallels = max_parallels;
        }

        // 覆盖检索配置
        if let Some(provider_str) = self.search_provider {
            if let Ok(provider) = provider_str.parse::<SearchProvider>() {
                config.search.provider = provider;
            } else {
                eprintln!(
                    "⚠️ 警告: 未知的检索provider: {}，使用默认provider",
                    provider_str
                );
            }
        }
        if let Some(search_api_key) = self.search_api_key {
            config.search.api_key = search_api_key;
        }
        if let Some(knowledge_base) = self.knowledge_base {
            config.search.knowledge_base_path = Some(knowledge_base);
        }

        // 覆盖迭代预算配置
        if let Some(number_of_queries) = self.number_of_queries {
            config.report.number_of_queries = number_of_queries;
        }
        if let Some(max_search_depth) = self.max_search_depth {
            config.report.max_search_depth = max_search_depth;
        }
        if let Some(max_revisions) = self.max_revisions {
            config.report.max_revisions = max_revisions;
        }
        if let Some(revision_threshold) = self.revision_threshold {
            config.report.revision_threshold = revision_threshold;
        }
        if self.no_html {
            config.report.export_html = false;
        }

        // 目标语言配置
        if let Some(target_language_str) = self.target_language {
            if let Ok(target_language) = target_language_str.parse::<TargetLanguage>() {
                config.target_language = target_language;
            } else {
                eprintln!(
                    "⚠️ 警告: 未知的目标语言: {}，使用默认语言 (中文)",
                    target_language_str
                );
            }
        }

        // 缓存配置
        if self.no_cache {
            config.cache.enabled = false;
        }

        // 其他配置
        config.force_regenerate = self.force_regenerate;
        if self.auto_approve {
            config.auto_approve = true;
        }
        config.verbose = self.verbose;

        config
    }
}
