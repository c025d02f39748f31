use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// 智能体类型枚举
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentType {
    QueryGenerator,
    SourceRouter,
    SectionWriter,
    SectionGrader,
}

impl Display for AgentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            AgentType::QueryGenerator => "章节查询生成",
            AgentType::SourceRouter => "检索来源路由",
            AgentType::SectionWriter => "章节撰写",
            AgentType::SectionGrader => "章节评级",
        };
        write!(f, "{}", str)
    }
}
