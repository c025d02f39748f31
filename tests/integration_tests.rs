use deepresearch_rs::checkpoint::CheckpointManager;
use deepresearch_rs::config::{CheckpointConfig, Config};
use deepresearch_rs::error::ReportError;
use deepresearch_rs::generator::compose::ReportCompiler;
use deepresearch_rs::generator::context::GeneratorContext;
use deepresearch_rs::generator::outlet;
use deepresearch_rs::generator::outlet::DiskOutlet;
use deepresearch_rs::resume;
use deepresearch_rs::types::report::{RunState, RunStatus, Section};
use std::fs;
use tempfile::TempDir;

/// 创建一个指向临时目录的测试配置
fn create_test_config(temp_dir: &TempDir) -> Config {
    Config {
        topic: Some("Rust异步运行时".to_string()),
        output_path: temp_dir.path().join("reports"),
        internal_path: temp_dir.path().join(".quill"),
        checkpoint: CheckpointConfig {
            checkpoint_dir: temp_dir.path().join(".quill/runs"),
        },
        ..Default::default()
    }
}

/// 构造一份调研完成、等待编译的运行状态
fn create_completed_run() -> RunState {
    let mut state = RunState::new("Rust异步运行时");
    state.set_plan(vec![
        Section::new("引言", "介绍主题背景", false),
        Section::new("架构", "运行时整体架构", true),
        Section::new("性能", "性能特征与基准", true),
        Section::new("结论", "总结核心结论", false),
    ]);

    // 完成章节故意乱序追加，编译结果只取决于规划顺序
    let mut perf = Section::new("性能", "性能特征与基准", true);
    perf.content = "性能依赖零拷贝 [1]，并参考官方基准 [2]。\n\n### 参考来源\n[1]: https://example.com/shared\n[2]: https://example.com/bench".to_string();

    let mut conclusion = Section::new("结论", "总结核心结论", false);
    conclusion.content = "| 维度 | 结论 |\n| --- | --- |\n| 架构 | 事件循环驱动 |".to_string();

    let mut arch = Section::new("架构", "运行时整体架构", true);
    arch.content =
        "架构围绕事件循环组织 [1]。\n\n### 参考来源\n[1]: https://example.com/shared".to_string();

    let mut intro = Section::new("引言", "介绍主题背景", false);
    intro.content = "本报告概述异步运行时的设计与性能。".to_string();

    state.append_completed(vec![perf, conclusion]);
    state.append_completed(vec![arch, intro]);
    state
}

#[tokio::test]
async fn test_checkpoint_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(&temp_dir);
    let manager = CheckpointManager::new(config.checkpoint.clone());

    let mut state = RunState::new("量子计算");
    state.set_plan(vec![Section::new("引言", "背景", false)]);
    manager.save(&state).await.unwrap();

    let loaded = manager.load(&state.run_id).await.unwrap().unwrap();
    assert_eq!(loaded.run_id, state.run_id);
    assert_eq!(loaded.topic, "量子计算");
    assert_eq!(loaded.status, RunStatus::AwaitingApproval);
    assert_eq!(loaded.sections.len(), 1);
    assert_eq!(loaded.sections[0].name, "引言");

    // 未留档的运行返回None
    assert!(manager.load("nonexistent").await.unwrap().is_none());
}

#[tokio::test]
async fn test_checkpoint_list_newest_first() {
    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(&temp_dir);
    let manager = CheckpointManager::new(config.checkpoint.clone());

    let older = RunState::new("较早的运行");
    let mut newer = RunState::new("较新的运行");
    newer.updated_at = older.updated_at + chrono::Duration::seconds(60);

    manager.save(&older).await.unwrap();
    manager.save(&newer).await.unwrap();

    let runs = manager.list().await.unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].topic, "较新的运行");
    assert_eq!(runs[1].topic, "较早的运行");
}

#[tokio::test]
async fn test_compile_and_save_artifacts() {
    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(&temp_dir);
    let context = GeneratorContext::new(config).unwrap();

    let mut state = create_completed_run();
    let report = ReportCompiler::compile(&state.sections, &state.completed_sections).unwrap();

    // 正文按规划顺序拼接，与追加顺序无关
    let intro_pos = report.find("本报告概述异步运行时").unwrap();
    let arch_pos = report.find("架构围绕事件循环").unwrap();
    let perf_pos = report.find("性能依赖零拷贝").unwrap();
    assert!(intro_pos < arch_pos);
    assert!(arch_pos < perf_pos);

    // 共享来源全局去重，参考区只留一条
    assert!(report.contains("## 参考来源"));
    assert_eq!(report.matches("https://example.com/shared").count(), 1);
    assert_eq!(report.matches("https://example.com/bench").count(), 1);

    state.mark_completed(report.clone());
    outlet::save(&context, &state).await.unwrap();

    let run_dir = DiskOutlet::run_dir(&context, &state);
    let saved_report = fs::read_to_string(run_dir.join("report.md")).unwrap();
    assert_eq!(saved_report, report);

    // 默认导出网页版
    let html = fs::read_to_string(run_dir.join("report.html")).unwrap();
    assert!(html.contains("<table>"));

    // 运行状态快照可反序列化且为完成态
    let snapshot = fs::read_to_string(run_dir.join("run.json")).unwrap();
    let restored: RunState = serde_json::from_str(&snapshot).unwrap();
    assert_eq!(restored.status, RunStatus::Completed);
    assert_eq!(restored.final_report, report);
}

#[tokio::test]
async fn test_resume_unknown_run_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(&temp_dir);

    let result = resume(&config, "no-such-run", &serde_json::json!(true)).await;

    let error = result.unwrap_err().downcast::<ReportError>().unwrap();
    assert!(matches!(error, ReportError::CheckpointMissing { .. }));
}

#[tokio::test]
async fn test_recompile_is_idempotent() {
    let state = create_completed_run();
    let first = ReportCompiler::compile(&state.sections, &state.completed_sections).unwrap();
    let second = ReportCompiler::compile(&state.sections, &state.completed_sections).unwrap();
    assert_eq!(first, second);
}
