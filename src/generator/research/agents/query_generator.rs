use chrono::Utc;

use crate::generator::research::memory::MemoryScope;
use crate::generator::research::types::AgentType;
use crate::generator::step_forward_agent::{LLMCallMode, PromptTemplate, StepForwardAgent};
use crate::types::report::SearchQueries;

/// 章节查询生成的输入负载
pub struct QueryGeneratorPayload {
    pub topic: String,
    pub section_name: String,
    pub section_description: String,
    pub number_of_queries: usize,
}

/// 章节查询生成智能体
///
/// 为单个调研章节生成首轮检索查询。后续轮次的查询来自评级智能体的
/// 补充查询，不再经过本智能体。
#[derive(Default)]
pub struct QueryGenerator;

impl StepForwardAgent for QueryGenerator {
    type Output = SearchQueries;
    type Payload = QueryGeneratorPayload;

    fn agent_type(&self) -> String {
        AgentType::QueryGenerator.to_string()
    }

    fn memory_scope_key(&self) -> String {
        MemoryScope::SECTION_RESEARCH.to_string()
    }

    fn memory_key(&self, payload: &QueryGeneratorPayload) -> String {
        format!("{}:{}", self.agent_type(), payload.section_name)
    }

    fn prompt_template(&self) -> PromptTemplate {
        PromptTemplate {
            system_prompt: r#"你是一名专业的技术调研专家，负责为报告章节生成精准的检索查询。

## 查询设计原则
1. 覆盖章节内容范围的不同侧面（核心特性、实际应用、技术架构、生态对比等）
2. 使用与主题相关的具体技术术语，避免空泛措辞
3. 时效敏感的内容结合当前日期限定资料范围（如在查询中带上年份）
4. 官方文档与实践案例并重，兼顾权威性与可落地性

## 查询质量要求
- 足够具体，避免命中泛泛而谈的结果
- 足够技术化，能获取实现层面的细节信息
- 彼此互补，共同覆盖章节内容范围的全部要点"#
                .to_string(),

            opening_instruction: "基于以下报告主题与目标章节，生成该章节的检索查询：".to_string(),

            closing_instruction: r#"## 输出要求
1. 严格生成指定数量的查询
2. 每条查询是一句可直接提交搜索引擎的完整语句
3. 不要输出查询以外的任何解释内容"#
                .to_string(),

            llm_call_mode: LLMCallMode::Extract,
        }
    }

    fn format_payload(&self, payload: &QueryGeneratorPayload) -> String {
        format!(
            "## 报告主题\n{}\n\n## 目标章节\n{}\n\n## 章节内容范围\n{}\n\n## 查询数量\n{}\n\n## 当前日期\n{}",
            payload.topic,
            payload.section_name,
            payload.section_description,
            payload.number_of_queries,
            Utc::now().format("%Y-%m-%d"),
        )
    }
}
