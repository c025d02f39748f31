//! Agent执行入口 - 统一缓存与LLM调用

use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::generator::context::GeneratorContext;

/// Agent执行参数
pub struct AgentExecuteParams {
    /// 系统提示词
    pub prompt_sys: String,
    /// 用户提示词
    pub prompt_user: String,
    /// 缓存类目，同类调用共享一个缓存目录
    pub cache_scope: String,
    /// 日志标签
    pub log_tag: String,
}

impl AgentExecuteParams {
    fn cache_key(&self) -> String {
        format!("{}\n---\n{}", self.prompt_sys, self.prompt_user)
    }
}

/// 结构化提取，命中缓存时跳过LLM调用
///
/// `force_regenerate`只屏蔽缓存读取，新结果仍会写回缓存。
pub async fn extract<T>(context: &GeneratorContext, params: AgentExecuteParams) -> Result<T>
where
    T: JsonSchema + for<'a> Deserialize<'a> + Serialize + Send + Sync + 'static,
{
    let cache_key = params.cache_key();

    if !context.config.force_regenerate {
        let cache = context.cache_manager.read().await;
        if let Some(cached) = cache.get::<T>(&params.cache_scope, &cache_key).await? {
            println!("   💾 [{}] 命中缓存，跳过LLM调用", params.log_tag);
            return Ok(cached);
        }
    }

    if context.config.verbose {
        println!(
            "   🤖 [{}] 调用LLM结构化提取，提示词共 {} 字符",
            params.log_tag,
            params.prompt_sys.chars().count() + params.prompt_user.chars().count()
        );
    }

    let result: T = context
        .llm_client
        .extract::<T>(&params.prompt_sys, &params.prompt_user)
        .await?;

    let cache = context.cache_manager.read().await;
    if let Err(e) = cache.set(&params.cache_scope, &cache_key, &result).await {
        eprintln!("⚠️ [{}] 写入缓存失败: {}", params.log_tag, e);
    }

    Ok(result)
}

/// 自由文本生成，命中缓存时跳过LLM调用
pub async fn prompt(context: &GeneratorContext, params: AgentExecuteParams) -> Result<String> {
    let cache_key = params.cache_key();

    if !context.config.force_regenerate {
        let cache = context.cache_manager.read().await;
        if let Some(cached) = cache
            .get::<String>(&params.cache_scope, &cache_key)
            .await?
        {
            println!("   💾 [{}] 命中缓存，跳过LLM调用", params.log_tag);
            return Ok(cached);
        }
    }

    if context.config.verbose {
        println!(
            "   🤖 [{}] 调用LLM文本生成，提示词共 {} 字符",
            params.log_tag,
            params.prompt_sys.chars().count() + params.prompt_user.chars().count()
        );
    }

    let result = context
        .llm_client
        .prompt(&params.prompt_sys, &params.prompt_user)
        .await?;

    let cache = context.cache_manager.read().await;
    if let Err(e) = cache.set(&params.cache_scope, &cache_key, &result).await {
        eprintln!("⚠️ [{}] 写入缓存失败: {}", params.log_tag, e);
    }

    Ok(result)
}
