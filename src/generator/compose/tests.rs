#[cfg(test)]
mod tests {
    use crate::error::ReportError;
    use crate::generator::compose::compiler::ReportCompiler;
    use crate::generator::compose::gather_research_context;
    use crate::types::report::{RunState, Section};

    fn completed_section(name: &str, requires_research: bool, content: &str) -> Section {
        let mut section = Section::new(name, format!("{}的内容范围", name), requires_research);
        section.content = content.to_string();
        section
    }

    fn sample_plan() -> Vec<Section> {
        vec![
            Section::new("引言", "开篇", false),
            Section::new("技术原理", "主体", true),
            Section::new("结论", "收尾", false),
        ]
    }

    fn sample_completed() -> Vec<Section> {
        vec![
            completed_section(
                "技术原理",
                true,
                "## 技术原理\n调度器 [1] 与反应器 [2] 协同工作。\n\n### 参考来源\n[1]: https://docs.example.com/scheduler\n[2]: https://docs.example.com/reactor",
            ),
            completed_section("引言", false, "## 引言\n本报告梳理异步运行时的关键设计。"),
            completed_section(
                "结论",
                false,
                "## 结论\n调度性能是核心结论 [1]。\n\n### 参考来源\n[1]: https://docs.example.com/scheduler",
            ),
        ]
    }

    #[test]
    fn test_compile_preserves_plan_order() {
        let report = ReportCompiler::compile(&sample_plan(), &sample_completed()).unwrap();

        let intro = report.find("## 引言").unwrap();
        let body = report.find("## 技术原理").unwrap();
        let conclusion = report.find("## 结论").unwrap();
        assert!(intro < body && body < conclusion);
    }

    #[test]
    fn test_compile_is_append_order_independent() {
        let planned = sample_plan();
        let forward = ReportCompiler::compile(&planned, &sample_completed()).unwrap();

        let mut reversed_completed = sample_completed();
        reversed_completed.reverse();
        let reversed = ReportCompiler::compile(&planned, &reversed_completed).unwrap();

        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_compile_deduplicates_shared_sources() {
        // 两个章节以不同的局部编号引用同一来源，编译后只留一条参考条目，
        // 两处正文标记指向同一个新编号
        let planned = vec![
            Section::new("论点", "A", true),
            Section::new("佐证", "B", true),
        ];
        let completed = vec![
            completed_section(
                "论点",
                true,
                "## 论点\n核心论断 [1]。\n\n### 参考来源\n[1]: https://shared.example.com/paper",
            ),
            completed_section(
                "佐证",
                true,
                "## 佐证\n实验数据 [2]，另见 [1]。\n\n### 参考来源\n[1]: https://unique.example.com/doc\n[2]: https://shared.example.com/paper",
            ),
        ];

        let report = ReportCompiler::compile(&planned, &completed).unwrap();

        assert_eq!(report.matches("https://shared.example.com/paper").count(), 1);
        assert!(report.contains("核心论断 [1]"));
        assert!(report.contains("实验数据 [1]，另见 [2]"));
        assert!(report.contains("[1]: https://shared.example.com/paper"));
        assert!(report.contains("[2]: https://unique.example.com/doc"));
    }

    #[test]
    fn test_compile_is_idempotent() {
        let first = ReportCompiler::compile(&sample_plan(), &sample_completed()).unwrap();

        let replanned = vec![Section::new("全文", "再编译", true)];
        let recompleted = vec![completed_section("全文", true, &first)];
        let second = ReportCompiler::compile(&replanned, &recompleted).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_compile_fails_on_missing_section() {
        let planned = sample_plan();
        let completed = vec![sample_completed().remove(1)];

        let err = ReportCompiler::compile(&planned, &completed).unwrap_err();
        match err {
            ReportError::MissingSection { section } => assert_eq!(section, "技术原理"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_compile_without_references_appends_no_reference_block() {
        let planned = vec![Section::new("引言", "开篇", false)];
        let completed = vec![completed_section("引言", false, "## 引言\n无引用内容。")];

        let report = ReportCompiler::compile(&planned, &completed).unwrap();
        assert_eq!(report, "## 引言\n无引用内容。");
        assert!(!report.contains("## 参考来源"));
    }

    #[test]
    fn test_compile_keeps_markers_without_definitions() {
        // 找不到对应参考定义的标记不做猜测性改写
        let planned = vec![Section::new("正文", "主体", true)];
        let completed = vec![completed_section("正文", true, "## 正文\n如 [7] 所述。")];

        let report = ReportCompiler::compile(&planned, &completed).unwrap();
        assert!(report.contains("如 [7] 所述"));
    }

    #[test]
    fn test_compile_drops_unparseable_source_lines() {
        let planned = vec![Section::new("正文", "主体", true)];
        let completed = vec![completed_section(
            "正文",
            true,
            "## 正文\n论述 [1]。\n\n### 参考来源\n[1]: https://ok.example.com\n- 一条不合格式的来源行",
        )];

        let report = ReportCompiler::compile(&planned, &completed).unwrap();
        assert!(report.contains("[1]: https://ok.example.com"));
        assert!(!report.contains("不合格式"));
    }

    #[test]
    fn test_compile_handles_english_sources_heading() {
        let planned = vec![Section::new("正文", "主体", true)];
        let completed = vec![completed_section(
            "正文",
            true,
            "## 正文\nclaim [1].\n\n### Sources\n[1]: https://en.example.com/ref",
        )];

        let report = ReportCompiler::compile(&planned, &completed).unwrap();
        assert!(!report.contains("### Sources"));
        assert!(report.contains("## 参考来源"));
        assert!(report.contains("[1]: https://en.example.com/ref"));
    }

    #[test]
    fn test_gather_research_context_uses_plan_order() {
        let mut state = RunState::new("异步运行时对比");
        state.set_plan(vec![
            Section::new("引言", "开篇", false),
            Section::new("背景", "背景介绍", true),
            Section::new("原理", "工作原理", true),
            Section::new("结论", "收尾", false),
        ]);

        // 分支完成顺序与规划顺序相反
        state.append_completed(vec![
            completed_section("原理", true, "原理成稿内容"),
            completed_section("背景", true, "背景成稿内容"),
        ]);

        let context = gather_research_context(&state);
        let background = context.find("背景成稿内容").unwrap();
        let principle = context.find("原理成稿内容").unwrap();
        assert!(background < principle);
        assert!(!context.contains("引言"));
        assert!(!context.contains("结论"));
    }
}
