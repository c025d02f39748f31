//! 证据检索服务 - 统一联网检索与本地知识库两条来源

pub mod knowledge;
pub mod web;

use anyhow::Result;
use std::collections::HashSet;

use crate::config::SearchConfig;
use crate::types::report::{SearchSource, SourceDocument};
use knowledge::KnowledgeBase;
use web::WebSearchClient;

/// 证据检索服务
pub struct RetrievalService {
    config: SearchConfig,
    web: WebSearchClient,
    knowledge: Option<KnowledgeBase>,
}

impl RetrievalService {
    pub fn new(config: SearchConfig) -> Result<Self> {
        let web = WebSearchClient::new(config.clone())?;
        let knowledge = config
            .knowledge_base_path
            .as_ref()
            .map(|path| KnowledgeBase::new(path.clone(), &config.kb_include_patterns));
        Ok(Self {
            config,
            web,
            knowledge,
        })
    }

    /// 按路由结果检索证据
    ///
    /// 知识库没有命中时回退联网检索，调研分支不因知识库为空而失败。
    pub async fn retrieve(
        &self,
        source: SearchSource,
        queries: &[String],
    ) -> Result<Vec<SourceDocument>> {
        match source {
            SearchSource::KnowledgeBase => {
                if let Some(kb) = &self.knowledge {
                    let documents = kb.search(queries, self.config.max_results)?;
                    if !documents.is_empty() {
                        return Ok(documents);
                    }
                    println!("📚 知识库没有命中文档，回退联网检索");
                } else {
                    println!("📚 未配置知识库目录，回退联网检索");
                }
                self.web.search_many(queries).await
            }
            SearchSource::Web => self.web.search_many(queries).await,
        }
    }

    /// 是否在证据中附带来源原文
    pub fn include_raw_content(&self) -> bool {
        self.config.include_raw_content
    }

    /// 是否配置了本地知识库
    pub fn knowledge_base_available(&self) -> bool {
        self.knowledge.is_some()
    }
}

/// 把检索结果格式化为供撰写使用的证据文本
///
/// 相同定位符的文档只保留第一次出现的那份，顺序保持首次出现顺序。
pub fn format_sources(
    documents: &[SourceDocument],
    max_chars_per_source: usize,
    include_raw_content: bool,
) -> String {
    let mut seen = HashSet::new();
    let mut formatted = String::from("参考来源:\n\n");
    for doc in documents {
        if !seen.insert(doc.url.clone()) {
            continue;
        }
        formatted.push_str(&format!("来源: {}\n===\n", doc.title));
        formatted.push_str(&format!("URL: {}\n===\n", doc.url));
        formatted.push_str(&format!(
            "摘要: {}\n===\n",
            truncate_chars(&doc.content, max_chars_per_source)
        ));
        if include_raw_content {
            let raw = doc.raw_content.clone().unwrap_or_default();
            formatted.push_str(&format!(
                "原文: {}\n\n",
                truncate_chars(&raw, max_chars_per_source)
            ));
        } else {
            formatted.push('\n');
        }
    }
    formatted.trim_end().to_string()
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{}... [已截断]", truncated)
}

// Include tests
#[cfg(test)]
mod tests;
