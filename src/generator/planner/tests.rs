#[cfg(test)]
mod tests {
    use crate::error::ReportError;
    use crate::generator::planner::agents::plan_query_generator::{
        PlanQueryGenerator, PlanQueryPayload,
    };
    use crate::generator::planner::agents::report_planner::{ReportPlanner, ReportPlannerPayload};
    use crate::generator::planner::validate_plan;
    use crate::generator::step_forward_agent::StepForwardAgent;
    use crate::types::report::{Section, SectionPlan};

    fn plan_of(names: &[&str]) -> SectionPlan {
        SectionPlan {
            sections: names
                .iter()
                .map(|name| Section::new(*name, format!("{}的内容范围", name), true))
                .collect(),
        }
    }

    #[test]
    fn test_validate_plan_accepts_unique_sections() {
        let plan = plan_of(&["引言", "技术原理", "结论"]);
        assert!(validate_plan(&plan).is_ok());
    }

    #[test]
    fn test_validate_plan_rejects_empty_plan() {
        let plan = SectionPlan { sections: vec![] };
        let err = validate_plan(&plan).unwrap_err();
        assert!(matches!(err, ReportError::Planning { .. }));
    }

    #[test]
    fn test_validate_plan_rejects_duplicate_names() {
        let plan = plan_of(&["背景", "技术原理", "背景"]);
        let err = validate_plan(&plan).unwrap_err();
        match err {
            ReportError::Planning { reason } => assert!(reason.contains("背景")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_validate_plan_rejects_blank_name() {
        let plan = SectionPlan {
            sections: vec![
                Section::new("引言", "开篇", false),
                Section::new("   ", "空白名称", true),
            ],
        };
        let err = validate_plan(&plan).unwrap_err();
        assert!(matches!(err, ReportError::Planning { .. }));
    }

    #[test]
    fn test_validate_plan_treats_padded_names_as_duplicates() {
        let plan = SectionPlan {
            sections: vec![
                Section::new("结论", "收尾", false),
                Section::new(" 结论 ", "带空白的同名章节", false),
            ],
        };
        assert!(validate_plan(&plan).is_err());
    }

    #[test]
    fn test_plan_query_payload_formatting() {
        let agent = PlanQueryGenerator::default();
        let payload = PlanQueryPayload {
            topic: "Rust异步运行时对比".to_string(),
            report_structure: "## 报告结构\n1. 引言".to_string(),
            number_of_queries: 3,
        };

        let prompt = agent.format_payload(&payload);
        assert!(prompt.contains("Rust异步运行时对比"));
        assert!(prompt.contains("## 查询数量\n3"));
        // 查询生成带入当前日期，便于模型收敛到最新资料
        assert!(prompt.contains("## 当前日期"));
    }

    #[test]
    fn test_report_planner_payload_includes_feedback_only_when_present() {
        let agent = ReportPlanner::default();
        let mut payload = ReportPlannerPayload {
            topic: "边缘计算安全".to_string(),
            report_structure: "## 报告结构".to_string(),
            evidence: "参考来源:".to_string(),
            feedback: None,
        };

        let without = agent.format_payload(&payload);
        assert!(!without.contains("人工反馈"));

        payload.feedback = Some("请增加供应链攻击的章节".to_string());
        let with = agent.format_payload(&payload);
        assert!(with.contains("## 人工反馈"));
        assert!(with.contains("请增加供应链攻击的章节"));
    }
}
