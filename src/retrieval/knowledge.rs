//! 本地知识库检索

use anyhow::Result;
use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::types::report::SourceDocument;

/// 知识库单篇文档纳入证据的最大字符数
const MAX_DOCUMENT_CHARS: usize = 4000;

/// 本地知识库
///
/// 把目录下匹配模式的文本文件作为语料，按词频做相关性打分。
/// 命中文档的定位符使用`file://`路径，与联网来源走同一套引用去重。
pub struct KnowledgeBase {
    root: PathBuf,
    patterns: Vec<Pattern>,
}

impl KnowledgeBase {
    pub fn new(root: impl Into<PathBuf>, include_patterns: &[String]) -> Self {
        let patterns = include_patterns
            .iter()
            .filter_map(|raw| match Pattern::new(raw) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    eprintln!("⚠️ 知识库匹配模式不合法，已跳过 {}: {}", raw, e);
                    None
                }
            })
            .collect();
        Self {
            root: root.into(),
            patterns,
        }
    }

    /// 检索知识库，返回按相关性排序的前`max_results`篇文档
    ///
    /// 目录不存在或没有任何命中时返回空列表，由调用方决定是否回退联网检索。
    pub fn search(&self, queries: &[String], max_results: usize) -> Result<Vec<SourceDocument>> {
        if !self.root.exists() {
            println!("📚 知识库目录不存在: {}", self.root.display());
            return Ok(Vec::new());
        }

        let terms = query_terms(queries);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored = Vec::new();
        for entry in WalkDir::new(&self.root) {
            // 遍历出错的条目与不可读文件同等对待: 跳过，不让整次检索失败
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    eprintln!("⚠️ 知识库目录遍历出错，已跳过: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if !self.matches(path) {
                continue;
            }
            // 跳过二进制或不可读文件
            let content = match std::fs::read_to_string(path) {
                Ok(content) => content,
                Err(_) => continue,
            };
            let score = relevance_score(&content, &terms);
            if score > 0.0 {
                scored.push((score, path.to_path_buf(), content));
            }
        }

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(max_results);

        Ok(scored
            .into_iter()
            .map(|(score, path, content)| {
                let title = path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string());
                let truncated: String = content.chars().take(MAX_DOCUMENT_CHARS).collect();
                SourceDocument {
                    title,
                    url: format!("file://{}", path.display()),
                    content: truncated,
                    raw_content: None,
                    score: Some(score),
                }
            })
            .collect())
    }

    /// 相对路径是否匹配任一包含模式
    fn matches(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        self.patterns
            .iter()
            .any(|pattern| pattern.matches_path(relative))
    }
}

/// 把查询语句拆成去重后的小写检索词
///
/// 空格分词覆盖西文查询；整条查询同时作为短语词保留，
/// 保证不含空格的中文查询也能参与匹配。
fn query_terms(queries: &[String]) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for query in queries {
        let phrase = query.trim().to_lowercase();
        if phrase.chars().count() >= 2 && !terms.contains(&phrase) {
            terms.push(phrase);
        }
        for term in query.split_whitespace() {
            let term = term.to_lowercase();
            if term.chars().count() < 2 || terms.contains(&term) {
                continue;
            }
            terms.push(term);
        }
    }
    terms
}

/// 词频相关性打分：命中词的出现次数按文档长度开方归一
fn relevance_score(content: &str, terms: &[String]) -> f64 {
    let haystack = content.to_lowercase();
    let mut hits = 0usize;
    for term in terms {
        hits += haystack.matches(term.as_str()).count();
    }
    if hits == 0 {
        return 0.0;
    }
    let length_norm = (haystack.chars().count().max(1) as f64).sqrt();
    hits as f64 / length_norm
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_doc(dir: &TempDir, name: &str, content: &str) {
        std::fs::write(dir.path().join(name), content).unwrap();
    }

    #[test]
    fn test_search_ranks_relevant_documents_first() {
        let temp_dir = TempDir::new().unwrap();
        write_doc(
            &temp_dir,
            "tokio.md",
            "tokio tokio tokio 是一个异步运行时，支持多线程调度。",
        );
        write_doc(&temp_dir, "cooking.md", "今天的晚餐食谱：西红柿炒鸡蛋。");

        let kb = KnowledgeBase::new(temp_dir.path(), &["**/*.md".to_string()]);
        let docs = kb.search(&["tokio 调度".to_string()], 5).unwrap();

        assert!(!docs.is_empty());
        assert!(docs[0].url.ends_with("tokio.md"));
        assert!(docs[0].url.starts_with("file://"));
    }

    #[test]
    fn test_search_respects_include_patterns() {
        let temp_dir = TempDir::new().unwrap();
        write_doc(&temp_dir, "notes.md", "tokio 运行时笔记");
        write_doc(&temp_dir, "notes.bin", "tokio 运行时笔记");

        let kb = KnowledgeBase::new(temp_dir.path(), &["**/*.md".to_string()]);
        let docs = kb.search(&["tokio".to_string()], 5).unwrap();

        assert_eq!(docs.len(), 1);
        assert!(docs[0].url.ends_with("notes.md"));
    }

    #[test]
    fn test_search_missing_directory_returns_empty() {
        let temp_dir = TempDir::new().unwrap();
        let kb = KnowledgeBase::new(
            temp_dir.path().join("not-there"),
            &["**/*.md".to_string()],
        );
        let docs = kb.search(&["tokio".to_string()], 5).unwrap();
        assert!(docs.is_empty());
    }

    #[test]
    fn test_search_no_hits_returns_empty() {
        let temp_dir = TempDir::new().unwrap();
        write_doc(&temp_dir, "unrelated.md", "完全无关的内容");

        let kb = KnowledgeBase::new(temp_dir.path(), &["**/*.md".to_string()]);
        let docs = kb.search(&["quantum entanglement".to_string()], 5).unwrap();
        assert!(docs.is_empty());
    }

    #[test]
    fn test_search_skips_unreadable_subdirectories() {
        let temp_dir = TempDir::new().unwrap();
        write_doc(&temp_dir, "tokio.md", "tokio 异步运行时");

        let locked = temp_dir.path().join("locked");
        std::fs::create_dir(&locked).unwrap();
        std::fs::write(locked.join("secret.md"), "tokio 内部文档").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();
        }

        // 子目录不可读也不能让整次检索失败，可读文档照常命中
        let kb = KnowledgeBase::new(temp_dir.path(), &["**/*.md".to_string()]);
        let docs = kb.search(&["tokio".to_string()], 5).unwrap();
        assert!(docs.iter().any(|doc| doc.url.ends_with("tokio.md")));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    #[test]
    fn test_max_results_truncation() {
        let temp_dir = TempDir::new().unwrap();
        for i in 0..5 {
            write_doc(&temp_dir, &format!("doc{}.md", i), "rust 并发模型介绍");
        }

        let kb = KnowledgeBase::new(temp_dir.path(), &["**/*.md".to_string()]);
        let docs = kb.search(&["rust".to_string()], 2).unwrap();
        assert_eq!(docs.len(), 2);
    }
}
