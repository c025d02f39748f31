use crate::config::Config;
use crate::error::ReportError;
use crate::generator::compose;
use crate::generator::compose::ReportCompiler;
use crate::generator::context::GeneratorContext;
use crate::generator::outlet;
use crate::generator::planner;
use crate::generator::research;
use crate::types::report::{GateDecision, RunOutcome, RunState, RunStatus};

use anyhow::{Result, bail};
use std::collections::HashMap;
use std::time::Duration;

/// 时间跟踪作用域
pub struct TimingScope {
    start_time: Option<std::time::Instant>,
    phase_start_times: HashMap<String, std::time::Instant>,
    phase_durations: HashMap<String, Duration>,
}

impl Default for TimingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingScope {
    pub fn new() -> Self {
        Self {
            start_time: Some(std::time::Instant::now()),
            phase_start_times: HashMap::new(),
            phase_durations: HashMap::new(),
        }
    }

    /// 开始一个新的阶段计时
    pub fn start_phase(&mut self, phase_name: &str) {
        self.phase_start_times
            .insert(phase_name.to_string(), std::time::Instant::now());
    }

    /// 结束一个阶段的计时
    pub fn end_phase(&mut self, phase_name: &str) -> Option<Duration> {
        if let Some(start_time) = self.phase_start_times.remove(phase_name) {
            let duration = start_time.elapsed();
            self.phase_durations
                .insert(phase_name.to_string(), duration);
            Some(duration)
        } else {
            None
        }
    }

    /// 获取总执行时间
    pub fn get_total_duration(&self) -> Option<Duration> {
        self.start_time.map(|start| start.elapsed())
    }

    /// 获取所有阶段的执行时间
    pub fn get_phase_durations(&self) -> &HashMap<String, Duration> {
        &self.phase_durations
    }

    /// 获取格式化的执行时间报告，阶段按固定顺序排列
    pub fn generate_timing_report(&self) -> String {
        let mut report = String::new();

        if let Some(total_duration) = self.get_total_duration() {
            report.push_str(&format!(
                "总执行时间: {:.2}秒\n",
                total_duration.as_secs_f64()
            ));
        }

        if !self.phase_durations.is_empty() {
            report.push_str("\n各阶段执行时间:\n");
            for phase in TimingKeys::get_all_phase_keys() {
                if let Some(duration) = self.phase_durations.get(phase) {
                    report.push_str(&format!("- {}: {:.3}秒\n", phase, duration.as_secs_f64()));
                }
            }
        }

        report
    }
}

/// 时间跟踪常量
pub struct TimingKeys;

impl TimingKeys {
    pub const PLANNING: &'static str = "planning";
    pub const SECTION_RESEARCH: &'static str = "section_research";
    pub const FINAL_COMPOSITION: &'static str = "final_composition";
    pub const COMPILATION: &'static str = "compilation";
    pub const OUTPUT: &'static str = "output";

    /// 获取所有阶段的键列表
    pub fn get_all_phase_keys() -> Vec<&'static str> {
        vec![
            Self::PLANNING,
            Self::SECTION_RESEARCH,
            Self::FINAL_COMPOSITION,
            Self::COMPILATION,
            Self::OUTPUT,
        ]
    }
}

/// 启动报告工作流
///
/// 固定管线: 规划 → 人工闸口 → 并发调研 → 汇总 → 收尾撰写 → 编译落盘。
/// 未开启自动确认时在闸口挂起: 运行状态持久化为检查点后返回调用方，
/// 后续由 `resume` 携带确认信号或规划反馈继续。
pub async fn launch(config: &Config) -> Result<RunOutcome> {
    let Some(topic) = config.topic.clone() else {
        bail!("缺少研究主题，无法启动报告工作流");
    };

    let context = GeneratorContext::new(config.clone())?;

    // 启动时检查模型连接
    context.llm_client.check_connection().await?;

    let mut state = RunState::new(topic);
    println!(
        "🚀 启动报告工作流《{}》(run_id: {}, 目标语言: {})",
        state.topic,
        state.run_id,
        config.target_language.display_name()
    );

    let mut timing = TimingScope::new();
    timing.start_phase(TimingKeys::PLANNING);
    if let Err(e) = planner::generate_report_plan(&context, &mut state).await {
        return fail_run(&context, &mut state, e).await;
    }
    timing.end_phase(TimingKeys::PLANNING);

    if config.auto_approve {
        println!("🤖 已开启自动确认，跳过人工闸口");
        println!("{}", plan_summary(&state));
        // 自动确认同样落一份规划检查点，失败后可凭 run_id 追查
        context.checkpoints.save(&state).await?;
        execute_approved(&context, state, timing).await
    } else {
        suspend_for_approval(&context, &state).await
    }
}

/// 从检查点恢复挂起的运行
///
/// 恢复信号: 布尔 true 表示确认规划，字符串表示规划反馈。反馈会触发
/// 重新规划并再次在闸口挂起（除非开启了自动确认）。
pub async fn resume(
    config: &Config,
    run_id: &str,
    payload: &serde_json::Value,
) -> Result<RunOutcome> {
    let context = GeneratorContext::new(config.clone())?;

    let Some(mut state) = context.checkpoints.load(run_id).await? else {
        return Err(ReportError::CheckpointMissing {
            run_id: run_id.to_string(),
        }
        .into());
    };

    // 信号不合法属于调用方违反契约，直接失败不重试
    let decision = GateDecision::from_value(payload)?;

    match decision {
        GateDecision::Approve => {
            // 已完成的运行确认恢复时直接返回归档报告，不重新执行
            if state.status == RunStatus::Completed {
                println!("✅ 运行 {} 已经完成，直接返回归档报告", run_id);
                return Ok(RunOutcome::Completed {
                    run_id: state.run_id.clone(),
                    final_report: state.final_report.clone(),
                });
            }

            context.llm_client.check_connection().await?;
            println!("✅ 运行 {} 已确认，继续执行", run_id);
            // 失败中断的运行可能携带上次执行的部分产物，重跑前清空
            if state.status == RunStatus::Failed {
                state.reset_progress();
            }
            execute_approved(&context, state, TimingScope::new()).await
        }
        GateDecision::Revise(feedback) => {
            context.llm_client.check_connection().await?;
            println!("🔄 收到规划反馈，重新规划: {}", feedback);
            state.apply_feedback(feedback);
            context
                .clear_memory_scope(planner::memory::MemoryScope::REPORT_PLANNING)
                .await;

            let mut timing = TimingScope::new();
            timing.start_phase(TimingKeys::PLANNING);
            if let Err(e) = planner::generate_report_plan(&context, &mut state).await {
                return fail_run(&context, &mut state, e).await;
            }
            timing.end_phase(TimingKeys::PLANNING);

            if config.auto_approve {
                println!("🤖 已开启自动确认，直接执行修订后的规划");
                println!("{}", plan_summary(&state));
                context.checkpoints.save(&state).await?;
                execute_approved(&context, state, timing).await
            } else {
                suspend_for_approval(&context, &state).await
            }
        }
    }
}

/// 闸口放行后的主体流程: 调研 → 收尾撰写 → 编译 → 落盘
async fn execute_approved(
    context: &GeneratorContext,
    mut state: RunState,
    mut timing: TimingScope,
) -> Result<RunOutcome> {
    state.mark_in_progress();

    timing.start_phase(TimingKeys::SECTION_RESEARCH);
    if let Err(e) = research::execute(context, &mut state).await {
        return fail_run(context, &mut state, e).await;
    }
    timing.end_phase(TimingKeys::SECTION_RESEARCH);

    timing.start_phase(TimingKeys::FINAL_COMPOSITION);
    if let Err(e) = compose::execute(context, &mut state).await {
        return fail_run(context, &mut state, e).await;
    }
    timing.end_phase(TimingKeys::FINAL_COMPOSITION);

    timing.start_phase(TimingKeys::COMPILATION);
    let report = match ReportCompiler::compile(&state.sections, &state.completed_sections) {
        Ok(report) => report,
        Err(e) => return fail_run(context, &mut state, e.into()).await,
    };
    timing.end_phase(TimingKeys::COMPILATION);

    state.mark_completed(report);

    timing.start_phase(TimingKeys::OUTPUT);
    if let Err(e) = outlet::save(context, &state).await {
        return fail_run(context, &mut state, e).await;
    }
    timing.end_phase(TimingKeys::OUTPUT);

    // 终态检查点，list-runs 能看到完成记录
    context.checkpoints.save(&state).await?;

    println!("\n✅ 报告工作流完成《{}》", state.topic);
    println!("{}", timing.generate_timing_report());
    println!(
        "📋 运行期诊断数据: {} 条智能体产物快照",
        context.memory.read().await.entry_count()
    );

    Ok(RunOutcome::Completed {
        run_id: state.run_id.clone(),
        final_report: state.final_report.clone(),
    })
}

/// 在人工闸口挂起: 持久化检查点后把控制权交还调用方
async fn suspend_for_approval(
    context: &GeneratorContext,
    state: &RunState,
) -> Result<RunOutcome> {
    context.checkpoints.save(state).await?;

    println!("\n⏸️ 运行已挂起，等待人工确认 (run_id: {})", state.run_id);
    println!("{}", plan_summary(state));
    println!("💡 确认规划: deepresearch-rs --resume {} --approve", state.run_id);
    println!(
        "💡 修订规划: deepresearch-rs --resume {} --feedback \"你的意见\"",
        state.run_id
    );

    Ok(RunOutcome::AwaitingApproval {
        run_id: state.run_id.clone(),
    })
}

/// 规划章节的人读预览
pub fn plan_summary(state: &RunState) -> String {
    let mut summary = String::from("规划章节预览:\n");
    for (index, section) in state.sections.iter().enumerate() {
        let marker = if section.requires_research {
            "🔍"
        } else {
            "🖊️"
        };
        summary.push_str(&format!(
            "  {}. {} {} — {}\n",
            index + 1,
            marker,
            section.name,
            section.description
        ));
    }
    summary
}

/// 统一的失败出口: 标记失败并把终态写回检查点后上抛原始错误
async fn fail_run(
    context: &GeneratorContext,
    state: &mut RunState,
    error: anyhow::Error,
) -> Result<RunOutcome> {
    eprintln!("❌ 报告工作流失败: {:#}", error);
    state.mark_failed(&error);
    if let Err(save_err) = context.checkpoints.save(state).await {
        eprintln!("⚠️ 失败状态写入检查点失败: {:#}", save_err);
    }
    Err(error)
}
