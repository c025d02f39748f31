use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Memory元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryMetadata {
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub entry_count: usize,
}

impl Default for MemoryMetadata {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMetadata {
    pub fn new() -> Self {
        Self {
            created_at: Utc::now(),
            last_updated: Utc::now(),
            entry_count: 0,
        }
    }
}

/// 运行期诊断数据管理器
///
/// 各阶段把中间产物按`作用域:键`写入，便于调试与端到端追溯。
/// 持久化一律走检查点，Memory只服务当前进程。
#[derive(Debug)]
pub struct Memory {
    data: HashMap<String, Value>,
    metadata: MemoryMetadata,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            metadata: MemoryMetadata::new(),
        }
    }

    /// 存储数据到指定作用域和键
    pub fn store<T>(&mut self, scope: &str, key: &str, data: T) -> Result<()>
    where
        T: Serialize,
    {
        let full_key = format!("{}:{}", scope, key);
        let serialized = serde_json::to_value(data)?;

        self.data.insert(full_key, serialized);
        self.metadata.entry_count = self.data.len();
        self.metadata.last_updated = Utc::now();
        Ok(())
    }

    /// 从指定作用域和键获取数据
    pub fn get<T>(&self, scope: &str, key: &str) -> Option<T>
    where
        T: for<'a> Deserialize<'a>,
    {
        let full_key = format!("{}:{}", scope, key);
        self.data
            .get(&full_key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// 列出指定作用域的所有键
    pub fn list_keys(&self, scope: &str) -> Vec<String> {
        let prefix = format!("{}:", scope);
        self.data
            .keys()
            .filter(|key| key.starts_with(&prefix))
            .map(|key| key[prefix.len()..].to_string())
            .collect()
    }

    /// 检查是否存在指定数据
    pub fn has_data(&self, scope: &str, key: &str) -> bool {
        let full_key = format!("{}:{}", scope, key);
        self.data.contains_key(&full_key)
    }

    /// 当前存储的记录条数
    pub fn entry_count(&self) -> usize {
        self.metadata.entry_count
    }

    /// 清空指定作用域的全部数据
    ///
    /// 反馈式恢复会重新规划，上一轮的阶段产物需要整体作废。
    pub fn clear_scope(&mut self, scope: &str) {
        let prefix = format!("{}:", scope);
        self.data.retain(|key, _| !key.starts_with(&prefix));
        self.metadata.entry_count = self.data.len();
        self.metadata.last_updated = Utc::now();
    }
}
