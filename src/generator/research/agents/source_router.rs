use crate::generator::research::memory::MemoryScope;
use crate::generator::research::types::AgentType;
use crate::generator::step_forward_agent::{LLMCallMode, PromptTemplate, StepForwardAgent};
use crate::types::report::RouteDecision;

/// 检索来源路由的输入负载
pub struct SourceRouterPayload {
    pub topic: String,
    pub section_name: String,
    pub queries: Vec<String>,
}

/// 检索来源路由智能体
///
/// 对每轮检索查询做一次二选一判断: 联网检索还是本地知识库。
/// 只在配置了知识库时调用；路由失败由调用方兜底为联网检索。
#[derive(Default)]
pub struct SourceRouter;

impl StepForwardAgent for SourceRouter {
    type Output = RouteDecision;
    type Payload = SourceRouterPayload;

    fn agent_type(&self) -> String {
        AgentType::SourceRouter.to_string()
    }

    fn memory_scope_key(&self) -> String {
        MemoryScope::SECTION_RESEARCH.to_string()
    }

    fn memory_key(&self, payload: &SourceRouterPayload) -> String {
        format!("{}:{}", self.agent_type(), payload.section_name)
    }

    fn prompt_template(&self) -> PromptTemplate {
        PromptTemplate {
            system_prompt: r#"你是一名检索调度专家，负责为一组检索查询选择最合适的信息来源。

## 两种来源
- web: 实时联网检索，适合公开资料、时效性内容、行业动态、最新版本信息
- knowledge_base: 本地知识库，适合内部沉淀文档、私有项目资料、相对静态的领域知识

## 判断标准
1. 查询指向公开互联网信息或强调时效性时，选择 web
2. 查询明显指向内部资料、既有文档沉淀时，选择 knowledge_base
3. 两种来源难分高下或把握不足时，一律选择 web"#
                .to_string(),

            opening_instruction: "请为以下章节的检索查询选择信息来源：".to_string(),

            closing_instruction: "## 输出要求\n给出来源选择(source)与一句话理由(reason)。".to_string(),

            llm_call_mode: LLMCallMode::Extract,
        }
    }

    fn format_payload(&self, payload: &SourceRouterPayload) -> String {
        let queries = payload
            .queries
            .iter()
            .map(|q| format!("- {}", q))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "## 报告主题\n{}\n\n## 目标章节\n{}\n\n## 检索查询\n{}",
            payload.topic, payload.section_name, queries,
        )
    }
}
