use crate::generator::workflow::{launch, resume};
use anyhow::{Result, bail};
use clap::Parser;

mod cache;
mod checkpoint;
mod cli;
mod config;
mod error;
mod generator;
mod i18n;
mod llm;
mod memory;
mod retrieval;
mod types;
mod utils;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();

    let list_runs = args.list_runs;
    let resume_run = args.resume.clone();
    let approve = args.approve;
    let feedback = args.feedback.clone();
    let config = args.into_config();

    if list_runs {
        return print_runs(&config).await;
    }

    if let Some(run_id) = resume_run {
        let payload = match feedback {
            Some(feedback) => serde_json::Value::String(feedback),
            None if approve => serde_json::Value::Bool(true),
            None => bail!("恢复运行需要提供 --approve 或 --feedback"),
        };
        resume(&config, &run_id, &payload).await?;
        return Ok(());
    }

    launch(&config).await?;
    Ok(())
}

/// 打印全部运行检查点
async fn print_runs(config: &config::Config) -> Result<()> {
    let manager = checkpoint::CheckpointManager::new(config.checkpoint.clone());
    let runs = manager.list().await?;

    if runs.is_empty() {
        println!("📋 暂无运行检查点");
        return Ok(());
    }

    println!("📋 运行检查点（按更新时间倒序）:");
    for state in runs {
        println!(
            "  {} | {} | {} | {}",
            state.run_id,
            state.status,
            state.updated_at.format("%Y-%m-%d %H:%M:%S"),
            state.topic
        );
    }
    Ok(())
}
