#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use crate::error::{ReportError, WorkflowStage};
    use crate::generator::research::agents::query_generator::{
        QueryGenerator, QueryGeneratorPayload,
    };
    use crate::generator::research::agents::section_writer::{
        SectionWriter, SectionWriterPayload,
    };
    use crate::generator::research::orchestrator::{
        collect_branch_results, next_queries, should_continue_research,
    };
    use crate::generator::step_forward_agent::StepForwardAgent;
    use crate::types::report::{Grade, Section, SectionGrade};

    fn pass_grade() -> SectionGrade {
        SectionGrade {
            grade: Grade::Pass,
            follow_up_queries: vec![],
        }
    }

    fn fail_grade() -> SectionGrade {
        SectionGrade {
            grade: Grade::Fail,
            follow_up_queries: vec!["补充查询".to_string()],
        }
    }

    fn section(name: &str) -> Section {
        Section::new(name, format!("{}的内容范围", name), true)
    }

    #[test]
    fn test_research_stops_on_pass() {
        // 评级通过立即收束，与剩余预算无关
        assert!(!should_continue_research(&pass_grade(), 0, 2));
        assert!(!should_continue_research(&pass_grade(), 1, 2));
    }

    #[test]
    fn test_research_continues_on_fail_within_budget() {
        assert!(should_continue_research(&fail_grade(), 0, 2));
        assert!(should_continue_research(&fail_grade(), 1, 2));
    }

    #[test]
    fn test_research_stops_when_budget_exhausted() {
        assert!(!should_continue_research(&fail_grade(), 2, 2));
        assert!(!should_continue_research(&fail_grade(), 5, 2));
    }

    #[test]
    fn test_zero_depth_still_allows_one_round() {
        // max_search_depth = 0 时只跑一轮，评级结果不影响收束
        assert!(!should_continue_research(&fail_grade(), 0, 0));
    }

    #[test]
    fn test_worst_case_round_count_is_depth_plus_one() {
        // 评级永远不通过时，检索撰写轮数恰好是 max_search_depth + 1
        for depth in 0..=3u32 {
            let mut iterations = 0u32;
            let mut rounds = 0u32;
            loop {
                rounds += 1;
                if !should_continue_research(&fail_grade(), iterations, depth) {
                    break;
                }
                iterations += 1;
            }
            assert_eq!(rounds, depth + 1);
            assert!(iterations <= depth);
        }
    }

    #[test]
    fn test_next_queries_prefers_follow_ups() {
        let next = next_queries(
            vec!["缺口查询A".to_string(), "缺口查询B".to_string()],
            vec!["旧查询".to_string()],
        );
        assert_eq!(next, vec!["缺口查询A", "缺口查询B"]);
    }

    #[test]
    fn test_next_queries_falls_back_when_follow_ups_blank() {
        let next = next_queries(
            vec!["  ".to_string(), String::new()],
            vec!["旧查询".to_string()],
        );
        assert_eq!(next, vec!["旧查询"]);
    }

    #[test]
    fn test_collect_branch_results_merges_all_successes() {
        let results = vec![
            ("背景".to_string(), Ok(section("背景"))),
            ("原理".to_string(), Ok(section("原理"))),
            ("实践".to_string(), Ok(section("实践"))),
        ];

        let completed =
            collect_branch_results(WorkflowStage::SectionResearch, results).unwrap();
        let names: Vec<&str> = completed.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["背景", "原理", "实践"]);
    }

    #[test]
    fn test_collect_branch_results_fails_run_on_any_branch_failure() {
        // 任一分支失败时丢弃全部产物，错误携带失败章节与所处阶段
        let results = vec![
            ("背景".to_string(), Ok(section("背景"))),
            ("原理".to_string(), Err(anyhow!("检索超时"))),
            ("实践".to_string(), Ok(section("实践"))),
        ];

        let err = collect_branch_results(WorkflowStage::SectionResearch, results).unwrap_err();
        match err.downcast::<ReportError>() {
            Ok(ReportError::SectionFailed { stage, section, .. }) => {
                assert_eq!(stage, WorkflowStage::SectionResearch);
                assert_eq!(section, "原理");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_query_generator_memory_keys_are_section_scoped() {
        // 并发分支各自落盘诊断快照，键里必须带上章节名避免互相覆盖
        let agent = QueryGenerator::default();
        let payload_a = QueryGeneratorPayload {
            topic: "主题".to_string(),
            section_name: "背景".to_string(),
            section_description: "背景描述".to_string(),
            number_of_queries: 2,
        };
        let payload_b = QueryGeneratorPayload {
            topic: "主题".to_string(),
            section_name: "原理".to_string(),
            section_description: "原理描述".to_string(),
            number_of_queries: 2,
        };

        let key_a = agent.memory_key(&payload_a);
        let key_b = agent.memory_key(&payload_b);
        assert_ne!(key_a, key_b);
        assert!(key_a.contains("背景"));
        assert!(key_b.contains("原理"));
    }

    #[test]
    fn test_section_writer_payload_marks_refinement_rounds() {
        let agent = SectionWriter::default();
        let mut payload = SectionWriterPayload {
            topic: "主题".to_string(),
            section_name: "原理".to_string(),
            section_description: "原理描述".to_string(),
            evidence: "参考来源:".to_string(),
            existing_content: None,
        };

        let first_round = agent.format_payload(&payload);
        assert!(!first_round.contains("既有正文"));

        payload.existing_content = Some("## 原理\n初稿内容".to_string());
        let refinement = agent.format_payload(&payload);
        assert!(refinement.contains("既有正文"));
        assert!(refinement.contains("初稿内容"));
    }
}
