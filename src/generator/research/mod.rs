use anyhow::Result;

use crate::generator::context::GeneratorContext;
use crate::types::report::RunState;

pub mod agents;
pub mod memory;
pub mod orchestrator;
pub mod types;

// Include tests
#[cfg(test)]
mod tests;

pub use orchestrator::{ResearchOrchestrator, collect_branch_results};

/// 执行章节调研阶段
///
/// 需要调研的章节各自跑一条并发分支，本函数返回时所有分支都已结束，
/// 完成章节已全部并入运行状态（屏障语义，供收尾撰写阶段消费）。
pub async fn execute(context: &GeneratorContext, state: &mut RunState) -> Result<()> {
    let orchestrator = ResearchOrchestrator;
    orchestrator.execute(context, state).await
}
