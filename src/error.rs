use thiserror::Error;

/// 工作流阶段标识，用于失败时定位出错环节
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStage {
    Planning,
    SectionResearch,
    FinalComposition,
    Compilation,
}

impl std::fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WorkflowStage::Planning => "报告规划",
            WorkflowStage::SectionResearch => "章节调研",
            WorkflowStage::FinalComposition => "收尾撰写",
            WorkflowStage::Compilation => "报告编译",
        };
        write!(f, "{}", name)
    }
}

/// 报告工作流错误分类
///
/// 规划与编译错误是致命的，直接终止整个运行；章节分支内部的生成/检索错误
/// 在分支自身的迭代预算内重试，预算耗尽后包装为 `SectionFailed` 上抛。
#[derive(Debug, Error)]
pub enum ReportError {
    /// 规划产出的章节列表结构非法，不做自动修复
    #[error("规划阶段失败: {reason}")]
    Planning { reason: String },

    /// 某个章节分支在预算耗尽后仍然失败
    #[error("[{stage}] 章节《{section}》处理失败")]
    SectionFailed {
        stage: WorkflowStage,
        section: String,
        #[source]
        source: anyhow::Error,
    },

    /// 编译时发现规划章节缺少对应的完成内容
    #[error("报告编译失败: 章节《{section}》缺少已完成的内容")]
    MissingSection { section: String },

    /// 恢复信号既不是布尔 true 也不是反馈字符串
    #[error("恢复信号不合法，期望 true 或反馈文本，实际收到: {payload}")]
    ResumeContract { payload: String },

    /// 检查点不存在，无法恢复
    #[error("未找到运行 {run_id} 的检查点，无法恢复")]
    CheckpointMissing { run_id: String },
}

impl ReportError {
    /// 将分支内部错误包装为携带阶段与章节信息的分支失败
    pub fn section_failed(
        stage: WorkflowStage,
        section: impl Into<String>,
        source: anyhow::Error,
    ) -> Self {
        ReportError::SectionFailed {
            stage,
            section: section.into(),
            source,
        }
    }
}
