use std::collections::HashSet;

use anyhow::{Context, Result};

use crate::error::ReportError;
use crate::generator::context::GeneratorContext;
use crate::generator::planner::agents::plan_query_generator::{
    PlanQueryGenerator, PlanQueryPayload,
};
use crate::generator::planner::agents::report_planner::{ReportPlanner, ReportPlannerPayload};
use crate::generator::step_forward_agent::StepForwardAgent;
use crate::retrieval::format_sources;
use crate::types::report::{RunState, SearchSource, SectionPlan};

mod agents;
pub mod memory;
pub mod types;

// Include tests
#[cfg(test)]
mod tests;

/// 规划素材中单条来源的最大字符数
const PLAN_SOURCE_CHARS: usize = 4000;

/// 执行报告规划阶段
///
/// 流程: 生成规划查询 → 联网收集规划素材 → 产出章节结构 → 校验后写回运行状态。
/// 反馈式恢复时运行状态携带人工反馈，规划会在新一轮中落实反馈内容。
pub async fn generate_report_plan(context: &GeneratorContext, state: &mut RunState) -> Result<()> {
    println!("\n📋 开始规划报告《{}》的章节结构...", state.topic);

    let report_config = &context.config.report;

    // 1. 生成规划用检索查询
    let query_generator = PlanQueryGenerator::default();
    let queries = query_generator
        .execute(
            context,
            &PlanQueryPayload {
                topic: state.topic.clone(),
                report_structure: report_config.report_structure.clone(),
                number_of_queries: report_config.number_of_queries,
            },
        )
        .await
        .context("规划查询生成失败")?;

    // 2. 收集规划素材
    println!("🌐 检索规划素材，共 {} 条查询", queries.queries.len());
    let documents = context
        .retrieval
        .retrieve(SearchSource::Web, &queries.queries)
        .await
        .context("规划素材检索失败")?;
    let evidence = format_sources(&documents, PLAN_SOURCE_CHARS, false);

    // 3. 产出章节结构
    let planner = ReportPlanner::default();
    let plan = planner
        .execute(
            context,
            &ReportPlannerPayload {
                topic: state.topic.clone(),
                report_structure: report_config.report_structure.clone(),
                evidence,
                feedback: state.feedback.clone(),
            },
        )
        .await
        .context("章节结构规划失败")?;

    validate_plan(&plan)?;

    let research_count = plan.sections.iter().filter(|s| s.requires_research).count();
    println!(
        "✅ 规划完成: 共 {} 个章节，其中 {} 个需要调研",
        plan.sections.len(),
        research_count
    );

    state.set_plan(plan.sections);
    Ok(())
}

/// 校验规划产物：至少一个章节，章节名非空且运行内唯一
pub fn validate_plan(plan: &SectionPlan) -> Result<(), ReportError> {
    if plan.sections.is_empty() {
        return Err(ReportError::Planning {
            reason: "规划结果不包含任何章节".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for section in &plan.sections {
        let name = section.name.trim();
        if name.is_empty() {
            return Err(ReportError::Planning {
                reason: "规划结果存在名称为空的章节".to_string(),
            });
        }
        if !seen.insert(name.to_string()) {
            return Err(ReportError::Planning {
                reason: format!("规划结果存在重名章节: {}", name),
            });
        }
    }

    Ok(())
}
