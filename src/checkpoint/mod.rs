use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::fs;

use crate::config::CheckpointConfig;
use crate::types::report::RunState;

/// 检查点管理器
///
/// 每次运行的完整状态以`<run_id>.json`落盘在检查点目录下。
/// 人工审批前挂起的运行、执行中的运行和已完成的运行都会留档，
/// 供`--resume`与`--list-runs`使用。
pub struct CheckpointManager {
    config: CheckpointConfig,
}

impl CheckpointManager {
    pub fn new(config: CheckpointConfig) -> Self {
        Self { config }
    }

    /// 检查点文件路径
    fn checkpoint_path(&self, run_id: &str) -> PathBuf {
        self.config.checkpoint_dir.join(format!("{}.json", run_id))
    }

    /// 保存运行状态快照
    pub async fn save(&self, state: &RunState) -> Result<()> {
        let path = self.checkpoint_path(&state.run_id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("无法创建检查点目录")?;
        }

        let content = serde_json::to_string_pretty(state).context("运行状态序列化失败")?;
        fs::write(&path, content)
            .await
            .with_context(|| format!("无法写入检查点文件: {}", path.display()))?;
        Ok(())
    }

    /// 加载指定运行的状态快照，不存在时返回None
    pub async fn load(&self, run_id: &str) -> Result<Option<RunState>> {
        let path = self.checkpoint_path(run_id);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("无法读取检查点文件: {}", path.display()))?;
        let state = serde_json::from_str::<RunState>(&content)
            .with_context(|| format!("检查点文件格式不合法: {}", path.display()))?;
        Ok(Some(state))
    }

    /// 列出全部已留档的运行，按更新时间倒序
    pub async fn list(&self) -> Result<Vec<RunState>> {
        let dir = &self.config.checkpoint_dir;
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut states = Vec::new();
        let mut entries = fs::read_dir(dir)
            .await
            .with_context(|| format!("无法读取检查点目录: {}", dir.display()))?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let content = match fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) => {
                    eprintln!("⚠️ 跳过无法读取的检查点 {}: {}", path.display(), e);
                    continue;
                }
            };
            match serde_json::from_str::<RunState>(&content) {
                Ok(state) => states.push(state),
                Err(e) => {
                    eprintln!("⚠️ 跳过格式不合法的检查点 {}: {}", path.display(), e);
                }
            }
        }

        states.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(states)
    }
}
