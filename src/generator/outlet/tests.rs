#[cfg(test)]
mod tests {
    use std::fs;
    use tempfile::TempDir;

    use crate::config::Config;
    use crate::generator::context::GeneratorContext;
    use crate::generator::outlet::{DiskOutlet, Outlet, render_html};
    use crate::types::report::RunState;

    fn create_test_context(temp_dir: &TempDir) -> GeneratorContext {
        let config = Config {
            output_path: temp_dir.path().join("reports"),
            internal_path: temp_dir.path().join(".quill"),
            ..Default::default()
        };
        GeneratorContext::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_disk_outlet_writes_report_artifacts() {
        let temp_dir = TempDir::new().unwrap();
        let context = create_test_context(&temp_dir);

        let mut state = RunState::new("异步运行时对比");
        state.mark_completed(
            "## 引言\n正文内容 [1]。\n\n## 参考来源\n\n[1]: https://example.com\n".to_string(),
        );

        let outlet = DiskOutlet;
        outlet.save(&context, &state).await.unwrap();

        let run_dir = temp_dir.path().join("reports").join(&state.run_id);
        let report = fs::read_to_string(run_dir.join("report.md")).unwrap();
        assert!(report.contains("## 引言"));

        let html = fs::read_to_string(run_dir.join("report.html")).unwrap();
        assert!(html.contains("<h2>"));
        assert!(html.contains("异步运行时对比"));

        let snapshot = fs::read_to_string(run_dir.join("run.json")).unwrap();
        assert!(snapshot.contains("completed"));
    }

    #[tokio::test]
    async fn test_disk_outlet_overwrites_previous_run_output() {
        let temp_dir = TempDir::new().unwrap();
        let context = create_test_context(&temp_dir);

        let mut state = RunState::new("重复保存");
        state.mark_completed("## 正文\n新版内容。".to_string());

        // 同一 run_id 的旧产物应被整体替换
        let run_dir = temp_dir.path().join("reports").join(&state.run_id);
        fs::create_dir_all(&run_dir).unwrap();
        fs::write(run_dir.join("stale.txt"), "旧文件").unwrap();

        let outlet = DiskOutlet;
        outlet.save(&context, &state).await.unwrap();

        assert!(!run_dir.join("stale.txt").exists());
        assert!(run_dir.join("report.md").exists());
    }

    #[test]
    fn test_render_html_wraps_gfm_body() {
        let html = render_html("主题", "# 标题\n\n| A | B |\n|---|---|\n| 1 | 2 |").unwrap();
        assert!(html.contains("<title>主题</title>"));
        assert!(html.contains("<table>"));
        assert!(html.contains("<h1>标题</h1>"));
    }
}
