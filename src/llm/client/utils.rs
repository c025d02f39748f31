use crate::config::LLMConfig;

/// 根据提示词体量挑选合适的模型
///
/// 短提示词优先使用高性价比模型，并以强力模型作为兜底；
/// 超长提示词直接交给强力模型处理。
pub fn evaluate_befitting_model(
    llm_config: &LLMConfig,
    system_prompt: &str,
    user_prompt: &str,
) -> (String, Option<String>) {
    if system_prompt.len() + user_prompt.len() <= 32 * 1024 {
        return (
            llm_config.model_efficient.clone(),
            Some(llm_config.model_powerful.clone()),
        );
    }
    (llm_config.model_powerful.clone(), None)
}
