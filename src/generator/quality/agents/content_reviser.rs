use crate::generator::quality::memory::MemoryScope;
use crate::generator::quality::types::AgentType;
use crate::generator::step_forward_agent::{LLMCallMode, PromptTemplate, StepForwardAgent};
use crate::types::report::ContentEvaluation;

/// 内容修订的输入负载
pub struct ContentReviserPayload {
    pub topic: String,
    pub section_name: String,
    pub section_description: String,
    pub content: String,
    pub evaluation: ContentEvaluation,
    /// 调研阶段末轮的格式化证据
    pub evidence: String,
}

/// 内容修订智能体
///
/// 依据评估意见与调研证据改写章节正文。修订稿必须保持引用标记与
/// 参考来源块的格式约定，否则编译阶段无法统一重编号。
#[derive(Default)]
pub struct ContentReviser;

impl StepForwardAgent for ContentReviser {
    type Output = String;
    type Payload = ContentReviserPayload;

    fn agent_type(&self) -> String {
        AgentType::ContentReviser.to_string()
    }

    fn memory_scope_key(&self) -> String {
        MemoryScope::QUALITY_REVIEW.to_string()
    }

    fn memory_key(&self, payload: &ContentReviserPayload) -> String {
        format!("{}:{}", self.agent_type(), payload.section_name)
    }

    fn prompt_template(&self) -> PromptTemplate {
        PromptTemplate {
            system_prompt: r#"你是一名专业的技术报告修订专家，负责按评估意见改写报告章节。

## 修订指南
1. 逐条落实评估意见中的不足与改进建议，补齐列出的缺失内容
2. 保留评估意见认可的优点部分，不做无谓的推倒重写
3. 新增论断必须来自调研证据，并带上 [1]、[2] 形式的引用标记
4. 不得引入证据中不存在的事实

## 格式约束（必须严格遵守）
- 修订稿仍以 ## 级别的章节标题开头
- 正文结束后保留参考来源块，格式为:

### 参考来源
[1]: https://example.com/source-url

每行一条，编号与正文引用标记一一对应，冒号后只写来源定位符。"#
                .to_string(),

            opening_instruction: "请依据评估意见修订以下章节稿件：".to_string(),

            closing_instruction: r#"## 输出要求
1. 直接输出修订后的完整章节 Markdown，不要输出修订说明
2. 修订稿正文篇幅与原稿相当，质量优先于篇幅"#
                .to_string(),

            llm_call_mode: LLMCallMode::Prompt,
        }
    }

    fn format_payload(&self, payload: &ContentReviserPayload) -> String {
        format!(
            "## 报告主题\n{}\n\n## 目标章节\n{}\n\n## 章节内容范围\n{}\n\n## 当前稿件\n{}\n\n## 评估意见\n{}\n\n## 调研证据\n{}",
            payload.topic,
            payload.section_name,
            payload.section_description,
            payload.content,
            format_evaluation(&payload.evaluation),
            payload.evidence,
        )
    }
}

/// 把结构化评估渲染为修订提示词中的意见清单
fn format_evaluation(evaluation: &ContentEvaluation) -> String {
    let mut text = format!(
        "综合得分: {}\n总体评价: {}",
        evaluation.total_score, evaluation.overall_assessment
    );

    text.push_str(&format_item_list("优点（保留）", &evaluation.strengths));
    text.push_str(&format_item_list("不足（修复）", &evaluation.weaknesses));
    text.push_str(&format_item_list("改进建议", &evaluation.suggestions));
    text.push_str(&format_item_list("缺失内容（补齐）", &evaluation.missing_content));
    text
}

fn format_item_list(title: &str, items: &[String]) -> String {
    if items.is_empty() {
        return String::new();
    }

    let bullets = items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n");
    format!("\n\n### {}\n{}", title, bullets)
}
