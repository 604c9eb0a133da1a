//! Agent运行时抽象 - 将流水线编排与具体模型Provider解耦

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::llm::events::{AgentRun, ChatTurn};

/// 模型档位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    /// 高能效模型，用于常规推理任务
    Efficient,
    /// 高质量模型，用于复杂推理任务（如深度调研）
    Powerful,
}

/// 预置工具类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    InsertInternalLink,
    AddClientMention,
    PlaceClientLink,
    SuggestImage,
    RequestLink,
    SuggestUrl,
    WebSearch,
}

impl ToolKind {
    /// 工具在事件流中的名称
    pub fn tool_name(&self) -> &'static str {
        match self {
            ToolKind::InsertInternalLink => "insert_internal_link",
            ToolKind::AddClientMention => "add_client_mention",
            ToolKind::PlaceClientLink => "place_client_link",
            ToolKind::SuggestImage => "suggest_image",
            ToolKind::RequestLink => "request_link",
            ToolKind::SuggestUrl => "suggest_url",
            ToolKind::WebSearch => "web_search",
        }
    }
}

/// Agent定义 - 纯配置，不携带可变状态
///
/// 每次调用前重新构建，Provider侧的运行时对象不会跨并发运行复用。
#[derive(Debug, Clone)]
pub struct AgentDefinition {
    /// Agent名称，用于日志与mock路由
    pub name: &'static str,
    /// 模型档位
    pub tier: ModelTier,
    /// 系统提示词
    pub instructions: String,
    /// 本次运行挂载的工具
    pub tools: Vec<ToolKind>,
}

impl AgentDefinition {
    pub fn new(name: &'static str, tier: ModelTier, instructions: String) -> Self {
        Self {
            name,
            tier,
            instructions,
            tools: Vec::new(),
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolKind>) -> Self {
        self.tools = tools;
        self
    }
}

/// Agent运行时 - 流水线阶段执行器依赖的唯一模型访问入口
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// 单轮结构化输出：返回符合给定JSON Schema的值
    ///
    /// 调用方负责把返回值反序列化为自己的类型；schema不匹配视为错误。
    async fn extract(
        &self,
        agent: &AgentDefinition,
        user_prompt: &str,
        output_schema: &Value,
    ) -> Result<Value>;

    /// 携带会话历史运行工具型agent，返回本次运行的事件序列
    ///
    /// `history`为此前各轮的完整会话记录，多轮refinement依赖它。
    async fn run(
        &self,
        agent: &AgentDefinition,
        user_prompt: &str,
        history: &[ChatTurn],
    ) -> Result<AgentRun>;
}
