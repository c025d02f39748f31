use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ReportError;
use crate::types::report::Section;

/// 参考来源定义行: `[n]: 定位符`
static REFERENCE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(\d+)\]:\s*(.+?)\s*$").unwrap());

/// 参考来源块的标题行，兼容撰写提示词约定之外的常见写法
static REFERENCE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{2,4}\s*(参考来源|Sources|References)\s*$").unwrap());

/// 正文中的引用标记: `[n]`
static CITATION_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[(\d+)\]").unwrap());

/// 报告编译器
///
/// 把独立产出的完成章节按规划顺序拼装成单篇报告: 重关联 → 解析并剥离
/// 各章节的局部参考块 → 按定位符全局去重 → 重写正文引用标记 → 追加
/// 统一的参考来源块。整个过程是纯函数，完成章节以任何到达顺序传入都
/// 得到字节一致的产物，对编译产物再编译一次结果不变。
pub struct ReportCompiler;

impl ReportCompiler {
    /// 编译最终报告
    ///
    /// planned 给出章节顺序，completed 提供各章节的成稿。规划中的章节
    /// 在完成集里找不到同名成稿时编译失败。
    pub fn compile(planned: &[Section], completed: &[Section]) -> Result<String, ReportError> {
        let by_name: HashMap<&str, &Section> = completed
            .iter()
            .map(|section| (section.name.as_str(), section))
            .collect();

        // 全局参考表: 定位符按首次出现顺序编号
        let mut ordered_locators: Vec<String> = Vec::new();
        let mut locator_index: HashMap<String, usize> = HashMap::new();
        let mut bodies: Vec<String> = Vec::new();

        for section in planned {
            let finished = by_name.get(section.name.as_str()).ok_or_else(|| {
                ReportError::MissingSection {
                    section: section.name.clone(),
                }
            })?;

            let (body, references) = split_references(&finished.content);

            let mut mapping: HashMap<usize, usize> = HashMap::new();
            for (old_index, locator) in references {
                let new_index = *locator_index.entry(locator.clone()).or_insert_with(|| {
                    ordered_locators.push(locator);
                    ordered_locators.len()
                });
                mapping.insert(old_index, new_index);
            }

            bodies.push(rewrite_markers(&body, &mapping));
        }

        let mut report = bodies.join("\n\n");
        if !ordered_locators.is_empty() {
            report.push_str("\n\n## 参考来源\n\n");
            for (index, locator) in ordered_locators.iter().enumerate() {
                report.push_str(&format!("[{}]: {}\n", index + 1, locator));
            }
        }

        Ok(report)
    }
}

/// 剥离章节尾部的参考来源块
///
/// 优先按标题行切分，标题之后只认 `[n]: 定位符` 格式的定义行，其余
/// 行随参考块一起丢弃；没有标题时从末尾回扫裸定义行。返回去掉参考块
/// 的正文与按书写顺序排列的 (旧编号, 定位符) 列表。
fn split_references(content: &str) -> (String, Vec<(usize, String)>) {
    let lines: Vec<&str> = content.lines().collect();

    if let Some(heading_at) = lines
        .iter()
        .rposition(|line| REFERENCE_HEADING.is_match(line.trim()))
    {
        let mut references = Vec::new();
        for line in &lines[heading_at + 1..] {
            if let Some(caps) = REFERENCE_LINE.captures(line.trim()) {
                if let Ok(old_index) = caps[1].parse::<usize>() {
                    references.push((old_index, caps[2].to_string()));
                }
            }
        }
        let body = lines[..heading_at].join("\n").trim_end().to_string();
        return (body, references);
    }

    let mut cursor = lines.len();
    let mut reversed = Vec::new();
    while cursor > 0 {
        let line = lines[cursor - 1].trim();
        if line.is_empty() {
            cursor -= 1;
            continue;
        }
        let Some(caps) = REFERENCE_LINE.captures(line) else {
            break;
        };
        let Ok(old_index) = caps[1].parse::<usize>() else {
            break;
        };
        reversed.push((old_index, caps[2].to_string()));
        cursor -= 1;
    }

    reversed.reverse();
    let body = lines[..cursor].join("\n").trim_end().to_string();
    (body, reversed)
}

/// 按映射重写正文中的引用标记
///
/// 没有对应参考定义的标记原样保留，不做猜测性改写。
fn rewrite_markers(body: &str, mapping: &HashMap<usize, usize>) -> String {
    CITATION_MARKER
        .replace_all(body, |caps: &regex::Captures| {
            match caps[1].parse::<usize>().ok().and_then(|old| mapping.get(&old)) {
                Some(new_index) => format!("[{}]", new_index),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
