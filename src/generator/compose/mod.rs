use std::collections::HashMap;

use anyhow::{Context, Result};

use crate::error::WorkflowStage;
use crate::generator::compose::agents::final_section_editor::{
    FinalSectionEditor, FinalSectionPayload,
};
use crate::generator::context::GeneratorContext;
use crate::generator::research::collect_branch_results;
use crate::generator::step_forward_agent::StepForwardAgent;
use crate::types::report::{RunState, Section};
use crate::utils::section_formatter::SectionFormatter;
use crate::utils::threads::do_parallel_with_limit;

mod agents;
pub mod compiler;
pub mod memory;
pub mod types;

// Include tests
#[cfg(test)]
mod tests;

pub use compiler::ReportCompiler;

/// 执行收尾撰写阶段
///
/// 进入本阶段即意味着调研屏障已经越过: 所有调研分支都已结束且成果
/// 并入累加器。先把调研成稿按规划顺序汇总为上下文，再并发撰写全部
/// 收尾章节。
pub async fn execute(context: &GeneratorContext, state: &mut RunState) -> Result<()> {
    state.research_context = gather_research_context(state);

    let final_sections = state.final_sections();
    if final_sections.is_empty() {
        println!("📋 规划中没有收尾章节，跳过收尾撰写阶段");
        return Ok(());
    }

    let max_parallels = context.config.llm.max_parallels;
    println!(
        "\n🖊️ 开始并发撰写 {} 个收尾章节 (并发上限: {})",
        final_sections.len(),
        max_parallels
    );

    let mut futures = Vec::new();
    for section in final_sections {
        let branch_context = context.clone();
        let topic = state.topic.clone();
        let research_context = state.research_context.clone();
        futures.push(Box::pin(async move {
            let name = section.name.clone();
            let result =
                write_final_section(&branch_context, &topic, &research_context, section).await;
            (name, result)
        }));
    }

    let results = do_parallel_with_limit(futures, max_parallels).await;
    let completed = collect_branch_results(WorkflowStage::FinalComposition, results)?;

    state.append_completed(completed);
    Ok(())
}

/// 单个收尾章节的撰写分支
async fn write_final_section(
    context: &GeneratorContext,
    topic: &str,
    research_context: &str,
    mut section: Section,
) -> Result<Section> {
    let editor = FinalSectionEditor::default();
    section.content = editor
        .execute(
            context,
            &FinalSectionPayload {
                topic: topic.to_string(),
                section_name: section.name.clone(),
                section_description: section.description.clone(),
                research_context: research_context.to_string(),
            },
        )
        .await
        .with_context(|| format!("收尾章节《{}》撰写失败", section.name))?;
    Ok(section)
}

/// 汇总屏障产物: 已完成的调研章节按规划顺序拼成收尾撰写的上下文
///
/// 以规划顺序而不是分支完成顺序遍历，保证上下文内容与分支调度无关。
pub fn gather_research_context(state: &RunState) -> String {
    let completed: HashMap<&str, &Section> = state
        .completed_sections
        .iter()
        .map(|section| (section.name.as_str(), section))
        .collect();

    let ordered: Vec<Section> = state
        .sections
        .iter()
        .filter(|section| section.requires_research)
        .filter_map(|section| completed.get(section.name.as_str()).map(|&found| found.clone()))
        .collect();

    SectionFormatter::format(&ordered)
}
