use crate::generator::research::memory::MemoryScope;
use crate::generator::research::types::AgentType;
use crate::generator::step_forward_agent::{LLMCallMode, PromptTemplate, StepForwardAgent};
use crate::types::report::SectionGrade;

/// 章节评级的输入负载
pub struct SectionGraderPayload {
    pub topic: String,
    pub section_name: String,
    pub section_description: String,
    pub content: String,
    pub number_of_follow_up_queries: usize,
}

/// 章节评级智能体
///
/// 判断当前稿件是否覆盖了章节的内容范围。未通过时给出定向的补充
/// 检索查询，供下一轮调研填补缺口。
#[derive(Default)]
pub struct SectionGrader;

impl StepForwardAgent for SectionGrader {
    type Output = SectionGrade;
    type Payload = SectionGraderPayload;

    fn agent_type(&self) -> String {
        AgentType::SectionGrader.to_string()
    }

    fn memory_scope_key(&self) -> String {
        MemoryScope::SECTION_RESEARCH.to_string()
    }

    fn memory_key(&self, payload: &SectionGraderPayload) -> String {
        format!("{}:{}", self.agent_type(), payload.section_name)
    }

    fn prompt_template(&self) -> PromptTemplate {
        PromptTemplate {
            system_prompt: r#"你是一名严格的技术编辑，负责评审报告章节的调研完成度。

## 评审标准
1. 稿件是否完整覆盖章节内容范围中列出的要点
2. 关键论断是否有检索证据支撑（带有引用标记）
3. 技术信息是否具体，而不是停留在概念层面

## 评级规则
- 全部标准达标，评级为 pass
- 存在内容缺口，评级为 fail，并针对缺口生成补充检索查询
- 补充查询必须指向缺失的具体信息，不要重复已覆盖的内容"#
                .to_string(),

            opening_instruction: "请评审以下章节稿件的调研完成度：".to_string(),

            closing_instruction: r#"## 输出要求
1. 给出评级(grade): pass 或 fail
2. 评级为 fail 时，生成指定数量的补充检索查询(follow_up_queries)
3. 评级为 pass 时，follow_up_queries 返回空列表"#
                .to_string(),

            llm_call_mode: LLMCallMode::Extract,
        }
    }

    fn format_payload(&self, payload: &SectionGraderPayload) -> String {
        format!(
            "## 报告主题\n{}\n\n## 目标章节\n{}\n\n## 章节内容范围\n{}\n\n## 当前稿件\n{}\n\n## 补充查询数量\n{}",
            payload.topic,
            payload.section_name,
            payload.section_description,
            payload.content,
            payload.number_of_follow_up_queries,
        )
    }
}
