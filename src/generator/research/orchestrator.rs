use anyhow::{Context, Result};

use crate::error::{ReportError, WorkflowStage};
use crate::generator::context::GeneratorContext;
use crate::generator::quality;
use crate::generator::research::agents::query_generator::{QueryGenerator, QueryGeneratorPayload};
use crate::generator::research::agents::section_grader::{SectionGrader, SectionGraderPayload};
use crate::generator::research::agents::section_writer::{SectionWriter, SectionWriterPayload};
use crate::generator::research::agents::source_router::{SourceRouter, SourceRouterPayload};
use crate::generator::step_forward_agent::StepForwardAgent;
use crate::retrieval::format_sources;
use crate::types::report::{Grade, RunState, SearchSource, Section, SectionGrade};
use crate::utils::threads::do_parallel_with_limit;

/// 章节证据中单条来源的最大字符数
const SECTION_SOURCE_CHARS: usize = 20000;

/// 章节调研编排器
///
/// 对每个需要调研的章节并发执行「调研子图 + 质量精修」分支。
/// 所有分支结束后统一汇总: 全部成功才并入完成章节累加器，任一分支
/// 失败则丢弃全部分支产物并让整个运行失败。
#[derive(Default)]
pub struct ResearchOrchestrator;

impl ResearchOrchestrator {
    pub async fn execute(&self, context: &GeneratorContext, state: &mut RunState) -> Result<()> {
        let research_sections = state.research_sections();
        if research_sections.is_empty() {
            println!("📋 规划中没有需要调研的章节，跳过调研阶段");
            return Ok(());
        }

        let max_parallels = context.config.llm.max_parallels;
        println!(
            "\n🔍 开始并发调研 {} 个章节 (并发上限: {})",
            research_sections.len(),
            max_parallels
        );

        let mut futures = Vec::new();
        for section in research_sections {
            let branch_context = context.clone();
            let topic = state.topic.clone();
            futures.push(Box::pin(async move {
                let name = section.name.clone();
                let result = run_research_branch(&branch_context, &topic, section).await;
                (name, result)
            }));
        }

        let results = do_parallel_with_limit(futures, max_parallels).await;
        let completed = collect_branch_results(WorkflowStage::SectionResearch, results)?;

        state.append_completed(completed);
        Ok(())
    }
}

/// 单个调研分支: 调研子图收束后进入质量精修循环
///
/// 末轮检索证据随章节一起传给精修循环，修订时据此改写而不是凭空发挥。
async fn run_research_branch(
    context: &GeneratorContext,
    topic: &str,
    section: Section,
) -> Result<Section> {
    let (researched, evidence) = research_section(context, topic, section).await?;
    quality::refine_section(context, topic, researched, &evidence).await
}

/// 单章节调研子图
///
/// 状态流转: 生成查询 → 路由来源 → 检索 → 撰写 → 评级。评级未通过时
/// 携带补充查询回到路由步骤；评级通过或检索迭代预算耗尽后收束。
/// 最多执行 max_search_depth + 1 轮检索撰写。返回收束后的章节与末轮
/// 格式化证据。
pub async fn research_section(
    context: &GeneratorContext,
    topic: &str,
    mut section: Section,
) -> Result<(Section, String)> {
    let report_config = &context.config.report;
    let max_search_depth = report_config.max_search_depth;

    let query_generator = QueryGenerator::default();
    let initial = query_generator
        .execute(
            context,
            &QueryGeneratorPayload {
                topic: topic.to_string(),
                section_name: section.name.clone(),
                section_description: section.description.clone(),
                number_of_queries: report_config.number_of_queries,
            },
        )
        .await
        .with_context(|| format!("章节《{}》检索查询生成失败", section.name))?;
    let mut queries = initial.queries;

    let mut search_iterations: u32 = 0;
    loop {
        let source = route_source(context, topic, &section, &queries).await;

        println!(
            "🔍 [{}] 第 {} 轮检索 ({})，共 {} 条查询",
            section.name,
            search_iterations + 1,
            source,
            queries.len()
        );
        let documents = context
            .retrieval
            .retrieve(source, &queries)
            .await
            .with_context(|| format!("章节《{}》证据检索失败", section.name))?;
        let evidence = format_sources(
            &documents,
            SECTION_SOURCE_CHARS,
            context.retrieval.include_raw_content(),
        );

        let writer = SectionWriter::default();
        let existing_content = (!section.content.is_empty()).then(|| section.content.clone());
        section.content = writer
            .execute(
                context,
                &SectionWriterPayload {
                    topic: topic.to_string(),
                    section_name: section.name.clone(),
                    section_description: section.description.clone(),
                    evidence: evidence.clone(),
                    existing_content,
                },
            )
            .await
            .with_context(|| format!("章节《{}》撰写失败", section.name))?;

        let grader = SectionGrader::default();
        let grade = grader
            .execute(
                context,
                &SectionGraderPayload {
                    topic: topic.to_string(),
                    section_name: section.name.clone(),
                    section_description: section.description.clone(),
                    content: section.content.clone(),
                    number_of_follow_up_queries: report_config.number_of_queries,
                },
            )
            .await
            .with_context(|| format!("章节《{}》评级失败", section.name))?;

        if !should_continue_research(&grade, search_iterations, max_search_depth) {
            if grade.grade == Grade::Pass {
                println!("✅ [{}] 调研评级通过", section.name);
            } else {
                println!("⚠️ [{}] 检索迭代预算已用完，以当前稿件收束", section.name);
            }
            return Ok((section, evidence));
        }

        search_iterations += 1;
        queries = next_queries(grade.follow_up_queries, queries);
        println!(
            "🔄 [{}] 评级未通过，携带 {} 条补充查询进入第 {} 轮",
            section.name,
            queries.len(),
            search_iterations + 1
        );
    }
}

/// 路由本轮检索的信息来源
///
/// 未配置知识库时不做判断直接走联网检索；路由判断自身失败时兜底为
/// 联网检索，绝不因路由让调研分支失败。
async fn route_source(
    context: &GeneratorContext,
    topic: &str,
    section: &Section,
    queries: &[String],
) -> SearchSource {
    if !context.retrieval.knowledge_base_available() {
        return SearchSource::Web;
    }

    let router = SourceRouter::default();
    let decision = router
        .execute(
            context,
            &SourceRouterPayload {
                topic: topic.to_string(),
                section_name: section.name.clone(),
                queries: queries.to_vec(),
            },
        )
        .await;

    match decision {
        Ok(decision) => {
            println!(
                "🌐 [{}] 来源路由: {} ({})",
                section.name, decision.source, decision.reason
            );
            decision.source
        }
        Err(e) => {
            eprintln!("⚠️ [{}] 来源路由失败，默认联网检索: {}", section.name, e);
            SearchSource::Web
        }
    }
}

/// 评级后的续跑判定
///
/// 评级通过立即停止；未通过时只要检索迭代预算未耗尽就继续。
/// search_iterations 统计的是已经发生的回跳次数。
pub fn should_continue_research(
    grade: &SectionGrade,
    search_iterations: u32,
    max_search_depth: u32,
) -> bool {
    if grade.grade == Grade::Pass {
        return false;
    }
    search_iterations < max_search_depth
}

/// 下一轮检索使用的查询
///
/// 优先使用评级给出的补充查询；补充查询为空时沿用本轮查询再试一次。
pub fn next_queries(follow_up: Vec<String>, current: Vec<String>) -> Vec<String> {
    let cleaned: Vec<String> = follow_up
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .collect();
    if cleaned.is_empty() { current } else { cleaned }
}

/// 汇总并发分支的结果
///
/// 逐个记录成败后统一裁决: 出现任何失败都丢弃全部分支产物，把第一个
/// 失败包装为携带阶段与章节信息的错误上抛；全部成功才返回完成章节。
pub fn collect_branch_results(
    stage: WorkflowStage,
    results: Vec<(String, Result<Section>)>,
) -> Result<Vec<Section>> {
    let mut completed = Vec::new();
    let mut first_failure: Option<(String, anyhow::Error)> = None;

    for (name, result) in results {
        match result {
            Ok(section) => {
                println!("✅ [{}] 章节《{}》处理完成", stage, name);
                completed.push(section);
            }
            Err(error) => {
                eprintln!("❌ [{}] 章节《{}》处理失败: {:#}", stage, name, error);
                if first_failure.is_none() {
                    first_failure = Some((name, error));
                }
            }
        }
    }

    if let Some((section, source)) = first_failure {
        return Err(ReportError::section_failed(stage, section, source).into());
    }

    Ok(completed)
}
