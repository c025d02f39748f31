//! 章节内容格式化工具

use crate::types::report::Section;

/// 把章节列表渲染为结构化上下文文本
///
/// 收尾章节的撰写与修订都以该格式消费已完成的调研内容。
pub struct SectionFormatter;

impl SectionFormatter {
    pub fn format(sections: &[Section]) -> String {
        sections
            .iter()
            .enumerate()
            .map(|(idx, section)| {
                let divider = "=".repeat(60);
                format!(
                    "{divider}\n章节 {no}: {name}\n{divider}\n内容范围:\n{description}\n是否需要调研:\n{requires}\n\n正文:\n{content}\n",
                    divider = divider,
                    no = idx + 1,
                    name = section.name,
                    description = section.description,
                    requires = if section.requires_research { "是" } else { "否" },
                    content = if section.content.is_empty() {
                        "[尚未撰写]"
                    } else {
                        section.content.as_str()
                    },
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_keeps_order_and_marks_unwritten() {
        let mut first = Section::new("背景", "介绍研究背景", true);
        first.content = "背景正文。".to_string();
        let second = Section::new("结论", "总结研究发现", false);

        let formatted = SectionFormatter::format(&[first, second]);

        let background_pos = formatted.find("章节 1: 背景").unwrap();
        let conclusion_pos = formatted.find("章节 2: 结论").unwrap();
        assert!(background_pos < conclusion_pos);
        assert!(formatted.contains("背景正文。"));
        assert!(formatted.contains("[尚未撰写]"));
        assert!(formatted.contains("是否需要调研:\n是"));
    }

    #[test]
    fn test_format_empty_list() {
        assert_eq!(SectionFormatter::format(&[]), "");
    }
}
