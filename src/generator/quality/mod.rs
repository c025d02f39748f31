use anyhow::{Context, Result};

use crate::config::ReportConfig;
use crate::generator::context::GeneratorContext;
use crate::generator::quality::agents::content_evaluator::{
    ContentEvaluator, ContentEvaluatorPayload,
};
use crate::generator::quality::agents::content_reviser::{ContentReviser, ContentReviserPayload};
use crate::generator::step_forward_agent::StepForwardAgent;
use crate::types::report::{ContentEvaluation, Section};

mod agents;
pub mod memory;
pub mod types;


/// 质量精修循环
///
/// 调研收束后的第二道质量关卡: 评估打分，得分低于修订门槛且修订预算
/// 未耗尽时，依据评估意见与调研证据改写正文后重新评估。修订次数受
/// max_revisions 硬性封顶，与得分走势无关。收束时最后一次评估结果
/// 挂在章节上随运行状态持久化。
pub async fn refine_section(
    context: &GeneratorContext,
    topic: &str,
    mut section: Section,
    evidence: &str,
) -> Result<Section> {
    let report_config = &context.config.report;
    let mut revision_count: u32 = 0;

    loop {
        let evaluation = evaluate_content(context, topic, &section).await;
        let score = evaluation.total_score;
        section.evaluation = Some(evaluation.clone());

        if !needs_revision(score, revision_count, report_config) {
            if score >= report_config.revision_threshold {
                println!("✅ [{}] 质量评估 {} 分，达到门槛", section.name, score);
            } else {
                println!("⚠️ [{}] 修订预算已用完，以 {} 分收束", section.name, score);
            }
            return Ok(section);
        }

        revision_count += 1;
        println!(
            "🔄 [{}] 质量评估 {} 分低于门槛 {}，开始第 {} 次修订",
            section.name, score, report_config.revision_threshold, revision_count
        );

        let reviser = ContentReviser::default();
        section.content = reviser
            .execute(
                context,
                &ContentReviserPayload {
                    topic: topic.to_string(),
                    section_name: section.name.clone(),
                    section_description: section.description.clone(),
                    content: section.content.clone(),
                    evaluation,
                    evidence: evidence.to_string(),
                },
            )
            .await
            .with_context(|| format!("章节《{}》修订失败", section.name))?;
    }
}

/// 评估章节内容质量
///
/// 解析失败即兜底: 评估服务出错或输出结构不合法时退回固定的中性
/// 评估并记录告警，绝不让评估环节的故障终止运行。
async fn evaluate_content(
    context: &GeneratorContext,
    topic: &str,
    section: &Section,
) -> ContentEvaluation {
    let evaluator = ContentEvaluator::default();
    let result = evaluator
        .execute(
            context,
            &ContentEvaluatorPayload {
                topic: topic.to_string(),
                section_name: section.name.clone(),
                section_description: section.description.clone(),
                content: section.content.clone(),
            },
        )
        .await;

    match result {
        Ok(mut evaluation) => {
            // 模型偶尔给出超出百分制的得分
            evaluation.total_score = evaluation.total_score.min(100);
            evaluation
        }
        Err(e) => {
            eprintln!("⚠️ [{}] 质量评估不可用，采用中性兜底评估: {}", section.name, e);
            ContentEvaluation::fallback()
        }
    }
}

/// 修订判定: 得分低于修订门槛且修订预算未耗尽
pub fn needs_revision(score: u32, revision_count: u32, config: &ReportConfig) -> bool {
    score < config.revision_threshold && revision_count < config.max_revisions
}
