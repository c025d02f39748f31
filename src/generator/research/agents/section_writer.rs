use crate::generator::research::memory::MemoryScope;
use crate::generator::research::types::AgentType;
use crate::generator::step_forward_agent::{LLMCallMode, PromptTemplate, StepForwardAgent};

/// 章节撰写的输入负载
pub struct SectionWriterPayload {
    pub topic: String,
    pub section_name: String,
    pub section_description: String,
    /// 本轮检索得到的格式化证据
    pub evidence: String,
    /// 既有正文，非首轮撰写时用于增量改写
    pub existing_content: Option<String>,
}

/// 章节撰写智能体
///
/// 首轮基于证据从零成稿；后续轮次把新证据融合进既有正文。
/// 输出必须以固定格式的参考来源块收尾，供编译阶段统一去重重编号。
#[derive(Default)]
pub struct SectionWriter;

impl StepForwardAgent for SectionWriter {
    type Output = String;
    type Payload = SectionWriterPayload;

    fn agent_type(&self) -> String {
        AgentType::SectionWriter.to_string()
    }

    fn memory_scope_key(&self) -> String {
        MemoryScope::SECTION_RESEARCH.to_string()
    }

    fn memory_key(&self, payload: &SectionWriterPayload) -> String {
        format!("{}:{}", self.agent_type(), payload.section_name)
    }

    fn prompt_template(&self) -> PromptTemplate {
        PromptTemplate {
            system_prompt: r#"你是一名专业的技术报告撰稿人，负责撰写研究报告中的一个章节。

## 撰写指南
1. 若没有提供既有正文，完全基于检索证据从零撰写
2. 若提供了既有正文，将新证据融合改写成一份连贯的新稿，而不是在旧稿后面追加
3. 论断必须有证据支撑，在正文中使用 [1]、[2] 形式的引用标记
4. 技术细节准确，不得编造证据中不存在的事实

## 行文风格
- 使用 Markdown 格式，以 ## 级别的章节标题开头
- 结构清晰，重点突出，避免空洞铺垫
- 正文篇幅控制在 300-500 字，信息密度优先

## 引用格式（必须严格遵守）
正文结束后另起一行，按如下格式列出全部引用来源:

### 参考来源
[1]: https://example.com/first-source
[2]: https://example.com/second-source

每行一条，方括号编号与正文中的引用标记一一对应，冒号后只写来源定位符，
不要附加标题或说明文字。"#
                .to_string(),

            opening_instruction: "基于以下材料撰写章节正文：".to_string(),

            closing_instruction: r#"## 输出要求
1. 直接输出章节的 Markdown 正文，不要输出任何正文以外的说明
2. 每条证据定位符只在参考来源块中出现一次
3. 正文中出现的每个引用标记都能在参考来源块中找到对应条目"#
                .to_string(),

            llm_call_mode: LLMCallMode::Prompt,
        }
    }

    fn format_payload(&self, payload: &SectionWriterPayload) -> String {
        let mut prompt = format!(
            "## 报告主题\n{}\n\n## 目标章节\n{}\n\n## 章节内容范围\n{}",
            payload.topic, payload.section_name, payload.section_description,
        );

        if let Some(existing) = &payload.existing_content {
            prompt.push_str(&format!(
                "\n\n## 既有正文（请与新证据融合改写）\n{}",
                existing
            ));
        }

        prompt.push_str(&format!("\n\n## 检索证据\n{}", payload.evidence));
        prompt
    }
}
