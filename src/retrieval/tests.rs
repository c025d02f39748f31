#[cfg(test)]
mod tests {
    use crate::config::SearchConfig;
    use crate::retrieval::{RetrievalService, format_sources};
    use crate::types::report::{SearchSource, SourceDocument};
    use tempfile::TempDir;

    fn doc(title: &str, url: &str, content: &str) -> SourceDocument {
        SourceDocument {
            title: title.to_string(),
            url: url.to_string(),
            content: content.to_string(),
            raw_content: Some(format!("{} 的完整原文", title)),
            score: None,
        }
    }

    #[test]
    fn test_format_sources_dedups_by_url_first_seen() {
        let documents = vec![
            doc("Tokio官方文档", "https://tokio.rs", "调度器介绍"),
            doc("Tokio镜像", "https://tokio.rs", "重复定位符，应被丢弃"),
            doc("async-std文档", "https://async.rs", "另一套运行时"),
        ];

        let formatted = format_sources(&documents, 1000, false);

        assert_eq!(formatted.matches("https://tokio.rs").count(), 1);
        assert!(formatted.contains("调度器介绍"));
        assert!(!formatted.contains("重复定位符"));
        // 首次出现顺序保持不变
        let tokio_pos = formatted.find("https://tokio.rs").unwrap();
        let async_pos = formatted.find("https://async.rs").unwrap();
        assert!(tokio_pos < async_pos);
    }

    #[test]
    fn test_format_sources_truncates_long_content() {
        let long_content = "辰".repeat(500);
        let documents = vec![doc("长文", "https://example.com", &long_content)];

        let formatted = format_sources(&documents, 100, false);

        assert!(formatted.contains("... [已截断]"));
        assert!(!formatted.contains(&long_content));
    }

    #[test]
    fn test_format_sources_raw_content_toggle() {
        let documents = vec![doc("来源A", "https://a.example.com", "摘要A")];

        let without_raw = format_sources(&documents, 1000, false);
        assert!(!without_raw.contains("原文:"));

        let with_raw = format_sources(&documents, 1000, true);
        assert!(with_raw.contains("原文: 来源A 的完整原文"));
    }

    #[test]
    fn test_format_sources_empty_input() {
        let formatted = format_sources(&[], 1000, false);
        assert_eq!(formatted, "参考来源:");
    }

    /// 起一个只接一次请求的本地检索服务，返回固定的JSON响应
    async fn spawn_search_stub(body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            // 读到请求头结束即可，body内容无关紧要
            let mut received = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap_or(0);
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
                if received.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });

        endpoint
    }

    #[tokio::test]
    async fn test_knowledge_base_miss_falls_back_to_web() {
        // 知识库目录存在但没有任何命中，检索透明回退联网来源
        let kb_dir = TempDir::new().unwrap();
        let endpoint = spawn_search_stub(
            r#"{"results":[{"title":"Tokio官方文档","url":"https://tokio.rs","content":"调度器介绍"}]}"#,
        )
        .await;

        let config = SearchConfig {
            knowledge_base_path: Some(kb_dir.path().to_path_buf()),
            api_base_url: endpoint,
            retry_attempts: 1,
            ..SearchConfig::default()
        };
        let service = RetrievalService::new(config).unwrap();

        let documents = service
            .retrieve(SearchSource::KnowledgeBase, &["tokio 调度".to_string()])
            .await
            .unwrap();

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].url, "https://tokio.rs");
        assert_eq!(documents[0].content, "调度器介绍");
    }

    #[tokio::test]
    async fn test_retrieve_prefers_knowledge_base_hits() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("tokio.md"),
            "tokio 是 rust 生态的异步运行时，采用工作窃取调度。",
        )
        .unwrap();

        let config = SearchConfig {
            knowledge_base_path: Some(temp_dir.path().to_path_buf()),
            // 接口地址留空也不会被触达：知识库有命中时不回退联网
            ..SearchConfig::default()
        };
        let service = RetrievalService::new(config).unwrap();

        let documents = service
            .retrieve(SearchSource::KnowledgeBase, &["tokio 调度".to_string()])
            .await
            .unwrap();

        assert_eq!(documents.len(), 1);
        assert!(documents[0].url.starts_with("file://"));
        assert!(documents[0].url.ends_with("tokio.md"));
    }
}
