use crate::generator::quality::memory::MemoryScope;
use crate::generator::quality::types::AgentType;
use crate::generator::step_forward_agent::{LLMCallMode, PromptTemplate, StepForwardAgent};
use crate::types::report::ContentEvaluation;

/// 内容质量评估的输入负载
pub struct ContentEvaluatorPayload {
    pub topic: String,
    pub section_name: String,
    pub section_description: String,
    pub content: String,
}

/// 内容质量评估智能体
///
/// 调研评级之后的第二道、更细粒度的质量关卡，输出百分制评分与
/// 具体的优缺点诊断。评估结果无法解析时由调用方退回中性兜底评估。
#[derive(Default)]
pub struct ContentEvaluator;

impl StepForwardAgent for ContentEvaluator {
    type Output = ContentEvaluation;
    type Payload = ContentEvaluatorPayload;

    fn agent_type(&self) -> String {
        AgentType::ContentEvaluator.to_string()
    }

    fn memory_scope_key(&self) -> String {
        MemoryScope::QUALITY_REVIEW.to_string()
    }

    fn memory_key(&self, payload: &ContentEvaluatorPayload) -> String {
        format!("{}:{}", self.agent_type(), payload.section_name)
    }

    fn prompt_template(&self) -> PromptTemplate {
        PromptTemplate {
            system_prompt: r#"你是一名资深的内容质量评审专家，负责对报告章节做百分制质量评估。

## 评估维度
1. **完整性**: 是否覆盖章节内容范围的全部要点
2. **准确性**: 技术论述是否正确，引用是否支撑论断
3. **深度**: 是否给出实现层面的细节，而不是停留在概念罗列
4. **结构**: 标题层级与段落组织是否清晰
5. **引用规范**: 引用标记与参考来源块是否一一对应

## 评分规则
- 综合得分为 0-100 的整数，85 分以上代表可以直接收录
- 优点、不足、改进建议各自独立成条，内容具体可执行
- 发现内容范围中应有但稿件缺失的要点时，逐条列入缺失内容"#
                .to_string(),

            opening_instruction: "请评估以下报告章节的内容质量：".to_string(),

            closing_instruction: r#"## 输出要求
1. 综合得分(total_score)为 0-100 的整数
2. 优点(strengths)、不足(weaknesses)、建议(suggestions)、缺失内容(missing_content)均为字符串列表
3. 总体评价(overall_assessment)用两三句话概括稿件水平"#
                .to_string(),

            llm_call_mode: LLMCallMode::Extract,
        }
    }

    fn format_payload(&self, payload: &ContentEvaluatorPayload) -> String {
        format!(
            "## 报告主题\n{}\n\n## 目标章节\n{}\n\n## 章节内容范围\n{}\n\n## 章节稿件\n{}",
            payload.topic, payload.section_name, payload.section_description, payload.content,
        )
    }
}
