use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ReportError;

/// 报告章节
///
/// 规划阶段由模型产出 name/description/requires_research 三个字段，
/// content 与 evaluation 由后续的章节分支独占写入。
#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct Section {
    /// 章节名称，运行内唯一
    pub name: String,
    /// 章节的内容范围说明
    pub description: String,
    /// 是否需要联网/知识库调研
    pub requires_research: bool,
    /// 章节正文（Markdown）
    #[schemars(skip)]
    #[serde(default)]
    pub content: String,
    /// 质量评估结果
    #[schemars(skip)]
    #[serde(default)]
    pub evaluation: Option<ContentEvaluation>,
}

impl Section {
    pub fn new(name: impl Into<String>, description: impl Into<String>, requires_research: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            requires_research,
            content: String::new(),
            evaluation: None,
        }
    }
}

/// 规划阶段的结构化产出：有序章节列表
#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct SectionPlan {
    /// 按最终报告顺序排列的章节
    pub sections: Vec<Section>,
}

/// 查询生成的结构化产出
#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct SearchQueries {
    /// 检索查询语句列表
    pub queries: Vec<String>,
}

/// 检索来源类型
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SearchSource {
    Web,
    KnowledgeBase,
}

impl std::fmt::Display for SearchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchSource::Web => write!(f, "web"),
            SearchSource::KnowledgeBase => write!(f, "knowledge_base"),
        }
    }
}

/// 来源路由的结构化产出
#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct RouteDecision {
    /// 选定的检索来源
    pub source: SearchSource,
    /// 路由理由
    pub reason: String,
}

/// 章节评级结果
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Pass,
    Fail,
}

/// 调研评级的结构化产出
#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct SectionGrade {
    /// 是否通过调研评级
    pub grade: Grade,
    /// 未通过时的补充检索查询
    #[serde(default)]
    pub follow_up_queries: Vec<String>,
}

/// 内容质量评估
#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct ContentEvaluation {
    /// 综合得分，0-100
    pub total_score: u32,
    /// 内容优点
    pub strengths: Vec<String>,
    /// 内容不足
    pub weaknesses: Vec<String>,
    /// 改进建议
    pub suggestions: Vec<String>,
    /// 缺失的内容点
    #[serde(default)]
    pub missing_content: Vec<String>,
    /// 总体评价
    pub overall_assessment: String,
}

impl ContentEvaluation {
    /// 评估结果无法解析时的兜底中性评估
    pub fn fallback() -> Self {
        Self {
            total_score: 70,
            strengths: vec!["内容已成稿，结构基本完整".to_string()],
            weaknesses: vec!["自动评估不可用，未能给出针对性诊断".to_string()],
            suggestions: vec!["补充关键论据与数据来源，增强论证深度".to_string()],
            missing_content: vec![],
            overall_assessment: "评估服务输出无法解析，按中性评分处理".to_string(),
        }
    }
}

/// 检索到的单条证据来源
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SourceDocument {
    /// 来源标题
    pub title: String,
    /// 来源定位符（URL 或 file:// 路径）
    pub url: String,
    /// 摘要内容
    pub content: String,
    /// 原始正文（可选，受配置控制）
    #[serde(default)]
    pub raw_content: Option<String>,
    /// 检索相关性分数
    #[serde(default)]
    pub score: Option<f64>,
}

/// 运行状态机
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// 已规划，等待人工确认
    AwaitingApproval,
    /// 已确认，阶段执行中
    InProgress,
    /// 报告已编译并落盘
    Completed,
    /// 某阶段失败终止
    Failed,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RunStatus::AwaitingApproval => "awaiting_approval",
            RunStatus::InProgress => "in_progress",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// 贯穿工作流的运行聚合状态，也是检查点持久化的载体
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RunState {
    /// 运行标识
    pub run_id: String,
    /// 研究主题，创建后不再变更
    pub topic: String,
    /// 人工反馈（仅在反馈式恢复后出现）
    #[serde(default)]
    pub feedback: Option<String>,
    /// 规划产出的有序章节列表
    #[serde(default)]
    pub sections: Vec<Section>,
    /// 完成章节累加器，只允许追加，合并与到达顺序无关
    #[serde(default)]
    pub completed_sections: Vec<Section>,
    /// 调研章节汇总后的上下文，供收尾章节撰写使用
    #[serde(default)]
    pub research_context: String,
    /// 编译完成的最终报告
    #[serde(default)]
    pub final_report: String,
    pub status: RunStatus,
    /// 失败时的错误摘要
    #[serde(default)]
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RunState {
    pub fn new(topic: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            topic: topic.into(),
            feedback: None,
            sections: Vec::new(),
            completed_sections: Vec::new(),
            research_context: String::new(),
            final_report: String::new(),
            status: RunStatus::AwaitingApproval,
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// 绑定规划产出的章节列表
    pub fn set_plan(&mut self, sections: Vec<Section>) {
        self.sections = sections;
        self.touch();
    }

    /// 追加一批完成章节。累加器只增不减，与追加顺序无关
    pub fn append_completed(&mut self, sections: Vec<Section>) {
        self.completed_sections.extend(sections);
        self.touch();
    }

    /// 需要调研的章节（保持规划顺序）
    pub fn research_sections(&self) -> Vec<Section> {
        self.sections
            .iter()
            .filter(|s| s.requires_research)
            .cloned()
            .collect()
    }

    /// 不需要调研的收尾章节（保持规划顺序）
    pub fn final_sections(&self) -> Vec<Section> {
        self.sections
            .iter()
            .filter(|s| !s.requires_research)
            .cloned()
            .collect()
    }

    /// 反馈式恢复：绑定反馈并清空上一轮规划的所有产物
    pub fn apply_feedback(&mut self, feedback: impl Into<String>) {
        self.feedback = Some(feedback.into());
        self.sections.clear();
        self.completed_sections.clear();
        self.research_context.clear();
        self.final_report.clear();
        self.status = RunStatus::AwaitingApproval;
        self.touch();
    }

    /// 重跑前清空上次执行遗留的派生产物，保留已确认的规划
    ///
    /// 失败中断的运行恢复时走这里，避免旧的完成章节与新一轮产物混在一起。
    pub fn reset_progress(&mut self) {
        self.completed_sections.clear();
        self.research_context.clear();
        self.final_report.clear();
        self.last_error = None;
        self.touch();
    }

    pub fn mark_in_progress(&mut self) {
        self.status = RunStatus::InProgress;
        self.touch();
    }

    pub fn mark_completed(&mut self, final_report: String) {
        self.final_report = final_report;
        self.status = RunStatus::Completed;
        self.touch();
    }

    pub fn mark_failed(&mut self, error: &anyhow::Error) {
        self.status = RunStatus::Failed;
        self.last_error = Some(format!("{:#}", error));
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// 工作流入口的返回值：要么编译完成，要么在人工闸口挂起
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Completed { run_id: String, final_report: String },
    AwaitingApproval { run_id: String },
}

/// 人工闸口的恢复决策
///
/// 恢复信号在边界上以 JSON 值表示：布尔 true 表示确认，字符串表示
/// 规划反馈，其余一律视为调用方违反契约。
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    Approve,
    Revise(String),
}

impl GateDecision {
    pub fn from_value(payload: &serde_json::Value) -> Result<Self, ReportError> {
        match payload {
            serde_json::Value::Bool(true) => Ok(GateDecision::Approve),
            serde_json::Value::String(feedback) => Ok(GateDecision::Revise(feedback.clone())),
            other => Err(ReportError::ResumeContract {
                payload: other.to_string(),
            }),
        }
    }
}
