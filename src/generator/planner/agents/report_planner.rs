use crate::generator::planner::memory::MemoryScope;
use crate::generator::planner::types::AgentType;
use crate::generator::step_forward_agent::{LLMCallMode, PromptTemplate, StepForwardAgent};
use crate::types::report::SectionPlan;

/// 章节结构规划的输入负载
pub struct ReportPlannerPayload {
    pub topic: String,
    pub report_structure: String,
    /// 规划素材（已格式化的检索证据）
    pub evidence: String,
    /// 人工反馈，仅在反馈式恢复后的重新规划中出现
    pub feedback: Option<String>,
}

/// 章节结构规划智能体
#[derive(Default)]
pub struct ReportPlanner;

impl StepForwardAgent for ReportPlanner {
    type Output = SectionPlan;
    type Payload = ReportPlannerPayload;

    fn agent_type(&self) -> String {
        AgentType::ReportPlanner.to_string()
    }

    fn memory_scope_key(&self) -> String {
        MemoryScope::REPORT_PLANNING.to_string()
    }

    fn prompt_template(&self) -> PromptTemplate {
        PromptTemplate {
            system_prompt: r#"你是一名专业的报告总编辑，负责为研究报告规划章节结构。

## 核心职责
1. 紧扣研究主题与报告结构要求，产出一份紧凑、聚焦的章节规划
2. 为每个章节给出清晰的内容范围说明，章节之间不重叠、无凑数内容
3. 判断每个章节是否需要调研：
   - 主体章节需要检索外部证据支撑，标记为需要调研
   - 引言、结论、总结类章节基于已完成的调研内容撰写，标记为不需要调研

## 规划原则
- 章节名称必须彼此不同，且能独立概括该章节的内容
- 章节顺序就是最终报告的呈现顺序
- 报告结构要求中已指定的部分必须体现在规划中
- 规划素材用于帮助你切分主题，不要把素材原文写进规划"#
                .to_string(),

            opening_instruction: "基于以下研究主题、报告结构与规划素材，生成报告的章节规划："
                .to_string(),

            closing_instruction: r#"## 输出要求
1. 每个章节包含: 名称(name)、内容范围说明(description)、是否需要调研(requires_research)
2. 规划整体紧凑聚焦，杜绝内容交叉的冗余章节
3. 提交前自查: 章节名称无重复、顺序符合行文逻辑、需要调研的标记准确"#
                .to_string(),

            llm_call_mode: LLMCallMode::Extract,
        }
    }

    fn format_payload(&self, payload: &ReportPlannerPayload) -> String {
        let mut prompt = format!(
            "## 研究主题\n{}\n\n## 报告结构\n{}\n\n## 规划素材\n{}",
            payload.topic, payload.report_structure, payload.evidence,
        );

        if let Some(feedback) = &payload.feedback {
            prompt.push_str(&format!(
                "\n\n## 人工反馈\n上一版规划未获通过，请在新规划中落实以下反馈:\n{}",
                feedback
            ));
        }

        prompt
    }
}
