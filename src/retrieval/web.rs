//! 联网检索客户端，支持Tavily与Exa两种搜索服务

use anyhow::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{SearchConfig, SearchProvider};
use crate::types::report::SourceDocument;

const TAVILY_API_URL: &str = "https://api.tavily.com/search";
const EXA_API_URL: &str = "https://api.exa.ai/search";

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    include_raw_content: bool,
    search_depth: &'a str,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    raw_content: Option<String>,
    #[serde(default)]
    score: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaRequest<'a> {
    query: &'a str,
    num_results: usize,
    #[serde(rename = "type")]
    search_type: &'a str,
    contents: ExaContents,
}

#[derive(Debug, Serialize)]
struct ExaContents {
    text: ExaTextConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaTextConfig {
    max_characters: usize,
}

#[derive(Debug, Deserialize)]
struct ExaResponse {
    #[serde(default)]
    results: Vec<ExaResult>,
}

#[derive(Debug, Deserialize)]
struct ExaResult {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    score: Option<f64>,
}

/// 联网检索客户端
///
/// 每条查询独立重试，退避间隔随尝试次数增长并叠加随机抖动，
/// 避免并发分支在同一时刻集中重试。
pub struct WebSearchClient {
    http: reqwest::Client,
    config: SearchConfig,
}

impl WebSearchClient {
    pub fn new(config: SearchConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("无法构建HTTP客户端")?;
        Ok(Self { http, config })
    }

    /// 接口地址，配置留空时使用服务商默认地址
    fn endpoint(&self) -> &str {
        if !self.config.api_base_url.is_empty() {
            return &self.config.api_base_url;
        }
        match self.config.provider {
            SearchProvider::Tavily => TAVILY_API_URL,
            SearchProvider::Exa => EXA_API_URL,
        }
    }

    /// 并发执行一组查询并汇总全部结果
    pub async fn search_many(&self, queries: &[String]) -> Result<Vec<SourceDocument>> {
        let tasks = queries.iter().map(|query| self.search_with_retry(query));
        let grouped = futures::future::try_join_all(tasks).await?;
        Ok(grouped.into_iter().flatten().collect())
    }

    /// 单条查询，带重试与抖动退避
    async fn search_with_retry(&self, query: &str) -> Result<Vec<SourceDocument>> {
        let max_retries = self.config.retry_attempts.max(1);
        let mut retries = 0;

        loop {
            match self.search_once(query).await {
                Ok(result) => return Ok(result),
                Err(err) => {
                    retries += 1;
                    eprintln!(
                        "❌ 联网检索出错，重试中 (第 {} / {}次尝试): {}",
                        retries, max_retries, err
                    );
                    if retries >= max_retries {
                        return Err(err);
                    }
                    let jitter = rand::rng().random_range(0..=self.config.retry_delay_ms / 2);
                    let delay = self.config.retry_delay_ms * retries as u64 + jitter;
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
            }
        }
    }

    async fn search_once(&self, query: &str) -> Result<Vec<SourceDocument>> {
        match self.config.provider {
            SearchProvider::Tavily => self.search_tavily(query).await,
            SearchProvider::Exa => self.search_exa(query).await,
        }
    }

    async fn search_tavily(&self, query: &str) -> Result<Vec<SourceDocument>> {
        let request = TavilyRequest {
            api_key: &self.config.api_key,
            query,
            max_results: self.config.max_results,
            include_raw_content: self.config.include_raw_content,
            search_depth: "basic",
        };

        let response = self
            .http
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .context("Tavily请求发送失败")?
            .error_for_status()
            .context("Tavily返回错误状态")?;

        let parsed = response
            .json::<TavilyResponse>()
            .await
            .context("Tavily响应解析失败")?;

        Ok(parsed
            .results
            .into_iter()
            .map(|r| SourceDocument {
                title: r.title,
                url: r.url,
                content: r.content,
                raw_content: r.raw_content,
                score: r.score,
            })
            .collect())
    }

    async fn search_exa(&self, query: &str) -> Result<Vec<SourceDocument>> {
        let request = ExaRequest {
            query,
            num_results: self.config.max_results,
            search_type: "auto",
            contents: ExaContents {
                text: ExaTextConfig {
                    max_characters: 8000,
                },
            },
        };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .context("Exa请求发送失败")?
            .error_for_status()
            .context("Exa返回错误状态")?;

        let parsed = response
            .json::<ExaResponse>()
            .await
            .context("Exa响应解析失败")?;

        Ok(parsed
            .results
            .into_iter()
            .map(|r| SourceDocument {
                title: r.title,
                url: r.url,
                content: r.text.clone().unwrap_or_default(),
                raw_content: r.text,
                score: r.score,
            })
            .collect())
    }
}
