use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// 智能体类型枚举
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentType {
    ContentEvaluator,
    ContentReviser,
}

impl Display for AgentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            AgentType::ContentEvaluator => "内容质量评估",
            AgentType::ContentReviser => "内容修订",
        };
        write!(f, "{}", str)
    }
}
