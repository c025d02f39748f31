use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::PathBuf;

use crate::generator::context::GeneratorContext;
use crate::types::report::RunState;

// Include tests
#[cfg(test)]
mod tests;

/// 保存编译产物
pub async fn save(context: &GeneratorContext, state: &RunState) -> Result<()> {
    let outlet = DiskOutlet;
    outlet.save(context, state).await
}

pub trait Outlet {
    async fn save(&self, context: &GeneratorContext, state: &RunState) -> Result<()>;
}

/// 磁盘出口
///
/// 每次运行落在输出目录下以 run_id 命名的独立子目录里: Markdown 报告、
/// 可选的网页版渲染，以及终态运行状态快照。
pub struct DiskOutlet;

impl DiskOutlet {
    /// 本次运行的输出目录
    pub fn run_dir(context: &GeneratorContext, state: &RunState) -> PathBuf {
        context.config.output_path.join(&state.run_id)
    }
}

impl Outlet for DiskOutlet {
    async fn save(&self, context: &GeneratorContext, state: &RunState) -> Result<()> {
        println!("\n💾 报告存储中...");

        let run_dir = Self::run_dir(context, state);
        if run_dir.exists() {
            fs::remove_dir_all(&run_dir)
                .with_context(|| format!("清理旧输出目录失败: {}", run_dir.display()))?;
        }
        fs::create_dir_all(&run_dir)
            .with_context(|| format!("创建输出目录失败: {}", run_dir.display()))?;

        let report_path = run_dir.join("report.md");
        fs::write(&report_path, &state.final_report)
            .with_context(|| format!("写入报告失败: {}", report_path.display()))?;
        println!("💾 已保存报告: {}", report_path.display());

        if context.config.report.export_html {
            match render_html(&state.topic, &state.final_report) {
                Ok(html) => {
                    let html_path = run_dir.join("report.html");
                    fs::write(&html_path, html)
                        .with_context(|| format!("写入网页版失败: {}", html_path.display()))?;
                    println!("💾 已保存网页版: {}", html_path.display());
                }
                Err(e) => {
                    eprintln!("⚠️ 网页版渲染失败: {}", e);
                    eprintln!("💡 这不影响 Markdown 报告的产出");
                }
            }
        }

        let snapshot_path = run_dir.join("run.json");
        let snapshot = serde_json::to_string_pretty(state).context("序列化运行状态失败")?;
        fs::write(&snapshot_path, snapshot)
            .with_context(|| format!("写入运行状态快照失败: {}", snapshot_path.display()))?;

        println!("💾 报告保存完成，输出目录: {}", run_dir.display());
        Ok(())
    }
}

/// 把 Markdown 报告渲染为自包含的单页 HTML
pub fn render_html(topic: &str, markdown_text: &str) -> Result<String> {
    let body = markdown::to_html_with_options(markdown_text, &markdown::Options::gfm())
        .map_err(|e| anyhow!("Markdown 渲染失败: {}", e))?;

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="zh">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
body {{ max-width: 860px; margin: 2rem auto; padding: 0 1rem; font-family: -apple-system, "Segoe UI", "PingFang SC", "Microsoft YaHei", sans-serif; line-height: 1.7; color: #24292f; }}
h1, h2, h3 {{ border-bottom: 1px solid #d0d7de; padding-bottom: .3rem; }}
table {{ border-collapse: collapse; }}
th, td {{ border: 1px solid #d0d7de; padding: .4rem .8rem; }}
code {{ background: #f6f8fa; padding: .1rem .3rem; border-radius: 4px; }}
blockquote {{ color: #57606a; border-left: 4px solid #d0d7de; margin: 0; padding-left: 1rem; }}
</style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = topic,
        body = body,
    ))
}
