use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// 智能体类型枚举
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentType {
    FinalSectionEditor,
}

impl Display for AgentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            AgentType::FinalSectionEditor => "收尾章节撰写",
        };
        write!(f, "{}", str)
    }
}
