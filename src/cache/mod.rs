use anyhow::Result;
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;

use crate::config::CacheConfig;

/// 缓存管理器
///
/// 以prompt的MD5哈希为键，把LLM调用结果落盘为JSON文件，
/// 相同的prompt在有效期内直接复用缓存结果。
pub struct CacheManager {
    config: CacheConfig,
}

/// 缓存条目
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub data: T,
    pub timestamp: u64,
    /// prompt的MD5哈希值，用于缓存键的生成和验证
    pub prompt_hash: String,
}

impl CacheManager {
    pub fn new(config: CacheConfig) -> Self {
        Self { config }
    }

    /// 生成prompt的MD5哈希
    pub fn hash_prompt(&self, prompt: &str) -> String {
        let mut hasher = Md5::new();
        hasher.update(prompt.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// 获取缓存文件路径
    fn get_cache_path(&self, category: &str, hash: &str) -> PathBuf {
        self.config
            .cache_dir
            .join(category)
            .join(format!("{}.json", hash))
    }

    /// 检查缓存是否过期
    fn is_expired(&self, timestamp: u64) -> bool {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let expire_seconds = self.config.expire_hours * 3600;
        now.saturating_sub(timestamp) > expire_seconds
    }

    /// 获取缓存
    pub async fn get<T>(&self, category: &str, prompt: &str) -> Result<Option<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        if !self.config.enabled {
            return Ok(None);
        }

        let hash = self.hash_prompt(prompt);
        let cache_path = self.get_cache_path(category, &hash);

        if !cache_path.exists() {
            return Ok(None);
        }

        match fs::read_to_string(&cache_path).await {
            Ok(content) => match serde_json::from_str::<CacheEntry<T>>(&content) {
                Ok(entry) => {
                    if self.is_expired(entry.timestamp) {
                        // 删除过期缓存
                        let _ = fs::remove_file(&cache_path).await;
                        return Ok(None);
                    }
                    Ok(Some(entry.data))
                }
                Err(e) => {
                    eprintln!("⚠️ 缓存条目反序列化失败，按未命中处理: {}", e);
                    Ok(None)
                }
            },
            Err(e) => {
                eprintln!("⚠️ 缓存文件读取失败，按未命中处理: {}", e);
                Ok(None)
            }
        }
    }

    /// 写入缓存
    pub async fn set<T>(&self, category: &str, prompt: &str, data: T) -> Result<()>
    where
        T: Serialize,
    {
        if !self.config.enabled {
            return Ok(());
        }

        let hash = self.hash_prompt(prompt);
        let cache_path = self.get_cache_path(category, &hash);

        // 确保目录存在
        if let Some(parent) = cache_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let entry = CacheEntry {
            data,
            timestamp,
            prompt_hash: hash,
        };

        let content = serde_json::to_string_pretty(&entry)?;
        fs::write(&cache_path, content).await?;
        Ok(())
    }
}
