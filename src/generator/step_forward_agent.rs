use anyhow::{Result, anyhow};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::generator::agent_executor::{AgentExecuteParams, extract, prompt};
use crate::generator::context::GeneratorContext;

/// LLM调用方式配置
#[derive(Debug, Clone, PartialEq)]
pub enum LLMCallMode {
    /// 使用extract方法，返回特定要求的结构化数据
    Extract,
    /// 使用prompt方法，返回泛化推理文本
    Prompt,
}

/// Prompt模板配置
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// 系统提示词
    pub system_prompt: String,
    /// 开头的说明性指令
    pub opening_instruction: String,
    /// 结尾的强调性指令
    pub closing_instruction: String,
    /// LLM调用方式
    pub llm_call_mode: LLMCallMode,
}

/// 极简Agent trait - 大幅简化agent实现
///
/// 每次调用携带一份类型化负载（章节、查询、证据等分支私有数据），
/// 由`format_payload`渲染进用户提示词。并发分支之间不共享可变输入，
/// 执行结果除返回外还会按`memory_key`落一份诊断快照。
#[async_trait]
pub trait StepForwardAgent: Send + Sync {
    /// Agent的输出类型 - 必须支持JSON序列化
    type Output: JsonSchema + for<'a> Deserialize<'a> + Serialize + Send + Sync + 'static;

    /// Agent的输入负载，由调用方按分支组装
    type Payload: Send + Sync;

    /// Agent类型标识
    fn agent_type(&self) -> String;

    /// 诊断快照所属的Memory作用域
    fn memory_scope_key(&self) -> String;

    /// Prompt模板配置
    fn prompt_template(&self) -> PromptTemplate;

    /// 把输入负载渲染为提示词正文
    fn format_payload(&self, payload: &Self::Payload) -> String;

    /// 诊断快照的存储键，并发分支需重写以免互相覆盖
    fn memory_key(&self, _payload: &Self::Payload) -> String {
        self.agent_type()
    }

    /// 默认实现的execute方法 - 完全标准化
    async fn execute(
        &self,
        context: &GeneratorContext,
        payload: &Self::Payload,
    ) -> Result<Self::Output> {
        // 1. 使用标准模板构建prompt，并根据目标语言调整
        let mut template = self.prompt_template();
        let language_instruction = context.config.target_language.prompt_instruction();
        template.system_prompt = format!("{}\n\n{}", template.system_prompt, language_instruction);

        let mut user_prompt = String::new();
        user_prompt.push_str(&template.opening_instruction);
        user_prompt.push_str("\n\n");
        user_prompt.push_str(&self.format_payload(payload));
        if !template.closing_instruction.is_empty() {
            user_prompt.push_str("\n\n");
            user_prompt.push_str(&template.closing_instruction);
        }

        // 2. 根据配置选择LLM调用方式
        let params = AgentExecuteParams {
            prompt_sys: template.system_prompt.clone(),
            prompt_user: user_prompt,
            cache_scope: format!("{}/{}", self.memory_scope_key(), self.agent_type()),
            log_tag: self.agent_type().to_string(),
        };

        let result_value = match template.llm_call_mode {
            LLMCallMode::Extract => {
                let result: Self::Output = extract(context, params).await?;
                serde_json::to_value(&result)?
            }
            LLMCallMode::Prompt => {
                let result_text: String = prompt(context, params).await?;
                serde_json::to_value(&result_text)?
            }
        };

        // 3. 存储诊断快照
        context
            .store_to_memory(
                &self.memory_scope_key(),
                &self.memory_key(payload),
                result_value.clone(),
            )
            .await?;

        // 4. 还原为类型化结果
        if let Ok(typed_result) = serde_json::from_value::<Self::Output>(result_value) {
            println!("✅ Sub-Agent [{}]执行完成", self.agent_type());
            Ok(typed_result)
        } else {
            Err(anyhow!("Sub-Agent [{}]输出结构不合法", self.agent_type()))
        }
    }
}
