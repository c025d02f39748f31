use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// 智能体类型枚举
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentType {
    PlanQueryGenerator,
    ReportPlanner,
}

impl Display for AgentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            AgentType::PlanQueryGenerator => "规划查询生成",
            AgentType::ReportPlanner => "章节结构规划",
        };
        write!(f, "{}", str)
    }
}
