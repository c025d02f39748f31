use chrono::Utc;

use crate::generator::planner::memory::MemoryScope;
use crate::generator::planner::types::AgentType;
use crate::generator::step_forward_agent::{LLMCallMode, PromptTemplate, StepForwardAgent};
use crate::types::report::SearchQueries;

/// 规划查询生成的输入负载
pub struct PlanQueryPayload {
    pub topic: String,
    pub report_structure: String,
    pub number_of_queries: usize,
}

/// 规划查询生成智能体
///
/// 在规划章节结构之前，先产出一组检索查询用于收集规划素材。
#[derive(Default)]
pub struct PlanQueryGenerator;

impl StepForwardAgent for PlanQueryGenerator {
    type Output = SearchQueries;
    type Payload = PlanQueryPayload;

    fn agent_type(&self) -> String {
        AgentType::PlanQueryGenerator.to_string()
    }

    fn memory_scope_key(&self) -> String {
        MemoryScope::REPORT_PLANNING.to_string()
    }

    fn prompt_template(&self) -> PromptTemplate {
        PromptTemplate {
            system_prompt: r#"你是一名资深研究策划，负责在撰写报告前收集规划素材。

## 核心职责
1. 理解研究主题的内涵与外延
2. 对照报告结构要求，识别规划章节时需要的背景信息
3. 产出一组高质量检索查询，用于收集这些背景信息

## 查询要求
- 每条查询必须与研究主题直接相关
- 查询之间互补，共同覆盖报告结构要求的各个侧面
- 查询足够具体，能命中高质量、权威的信息来源
- 时效敏感的主题应在查询中体现最新的时间范围"#
                .to_string(),

            opening_instruction: "基于以下研究主题与报告结构，生成用于收集规划素材的检索查询："
                .to_string(),

            closing_instruction: r#"## 输出要求
1. 严格生成指定数量的查询，不多不少
2. 每条查询是一句可直接提交搜索引擎的完整语句
3. 不要输出查询以外的任何解释内容"#
                .to_string(),

            llm_call_mode: LLMCallMode::Extract,
        }
    }

    fn format_payload(&self, payload: &PlanQueryPayload) -> String {
        format!(
            "## 研究主题\n{}\n\n## 报告结构\n{}\n\n## 查询数量\n{}\n\n## 当前日期\n{}",
            payload.topic,
            payload.report_structure,
            payload.number_of_queries,
            Utc::now().format("%Y-%m-%d"),
        )
    }
}
