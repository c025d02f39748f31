use crate::generator::compose::memory::MemoryScope;
use crate::generator::compose::types::AgentType;
use crate::generator::step_forward_agent::{LLMCallMode, PromptTemplate, StepForwardAgent};

/// 收尾章节撰写的输入负载
pub struct FinalSectionPayload {
    pub topic: String,
    pub section_name: String,
    pub section_description: String,
    /// 全部调研章节按规划顺序汇总的上下文
    pub research_context: String,
}

/// 收尾章节撰写智能体
///
/// 引言、结论这类不需要独立调研的章节在全部调研章节完成后撰写，
/// 以调研成稿为素材做提炼归纳，不产出引用标记与参考来源块。
#[derive(Default)]
pub struct FinalSectionEditor;

impl StepForwardAgent for FinalSectionEditor {
    type Output = String;
    type Payload = FinalSectionPayload;

    fn agent_type(&self) -> String {
        AgentType::FinalSectionEditor.to_string()
    }

    fn memory_scope_key(&self) -> String {
        MemoryScope::FINAL_COMPOSITION.to_string()
    }

    fn memory_key(&self, payload: &FinalSectionPayload) -> String {
        format!("{}:{}", self.agent_type(), payload.section_name)
    }

    fn prompt_template(&self) -> PromptTemplate {
        PromptTemplate {
            system_prompt: r#"你是一名资深的技术报告主笔，负责撰写报告的收尾类章节（引言、结论、总结等）。

## 撰写指南
1. 收尾章节的素材是报告的调研章节成稿，不引入调研材料之外的新事实
2. 引言类章节: 点明主题价值，预告报告的章节脉络，篇幅 100-200 字
3. 结论类章节: 提炼各调研章节的核心发现，给出整体判断，必要时用
   Markdown 表格归纳对比，篇幅 200-400 字
4. 不使用引用标记，不输出参考来源块

## 行文风格
- 使用 Markdown 格式，以 ## 级别的章节标题开头
- 语言凝练，观点明确，避免复述调研章节的细节"#
                .to_string(),

            opening_instruction: "基于以下调研成稿，撰写指定的收尾章节：".to_string(),

            closing_instruction: "## 输出要求\n直接输出章节的 Markdown 正文，不要输出任何正文以外的说明。"
                .to_string(),

            llm_call_mode: LLMCallMode::Prompt,
        }
    }

    fn format_payload(&self, payload: &FinalSectionPayload) -> String {
        format!(
            "## 报告主题\n{}\n\n## 目标章节\n{}\n\n## 章节内容范围\n{}\n\n## 调研成稿\n{}",
            payload.topic, payload.section_name, payload.section_description, payload.research_context,
        )
    }
}
