//! LLM Provider支持模块

use anyhow::Result;
use rig::{
    agent::{Agent, AgentBuilder, AgentBuilderSimple},
    client::CompletionClient,
    completion::{Message, Prompt, PromptError},
    providers::gemini::completion::gemini_api_types::{AdditionalParameters, GenerationConfig},
};

use crate::config::{LLMConfig, LLMProvider};
use crate::llm::runtime::ToolKind;
use crate::llm::tools::{
    AgentToolAddClientMention, AgentToolInsertInternalLink, AgentToolPlaceClientLink,
    AgentToolRequestLink, AgentToolSuggestImage, AgentToolSuggestUrl, AgentToolWebSearch, EditSink,
};

/// 一次agent运行要挂载的工具集合
///
/// 编辑类工具共享同一个sink，调用参数按发生顺序写入其中。
#[derive(Debug, Clone)]
pub struct WeaverToolset {
    pub kinds: Vec<ToolKind>,
    pub sink: EditSink,
}

impl WeaverToolset {
    pub fn new(kinds: Vec<ToolKind>) -> Self {
        Self {
            kinds,
            sink: EditSink::new(),
        }
    }
}

/// 将首个工具挂载到AgentBuilder，使其进入AgentBuilderSimple状态
fn attach_first_tool<M>(
    builder: AgentBuilder<M>,
    kind: &ToolKind,
    toolset: &WeaverToolset,
) -> AgentBuilderSimple<M>
where
    M: rig::completion::CompletionModel,
{
    match kind {
        ToolKind::InsertInternalLink => {
            builder.tool(AgentToolInsertInternalLink::new(toolset.sink.clone()))
        }
        ToolKind::AddClientMention => {
            builder.tool(AgentToolAddClientMention::new(toolset.sink.clone()))
        }
        ToolKind::PlaceClientLink => {
            builder.tool(AgentToolPlaceClientLink::new(toolset.sink.clone()))
        }
        ToolKind::SuggestImage => {
            builder.tool(AgentToolSuggestImage::new(toolset.sink.clone()))
        }
        ToolKind::RequestLink => builder.tool(AgentToolRequestLink::new(toolset.sink.clone())),
        ToolKind::SuggestUrl => builder.tool(AgentToolSuggestUrl::new(toolset.sink.clone())),
        ToolKind::WebSearch => builder.tool(AgentToolWebSearch::new()),
    }
}

/// 将后续工具挂载到已处于AgentBuilderSimple状态的builder
fn attach_next_tool<M>(
    builder: AgentBuilderSimple<M>,
    kind: &ToolKind,
    toolset: &WeaverToolset,
) -> AgentBuilderSimple<M>
where
    M: rig::completion::CompletionModel,
{
    match kind {
        ToolKind::InsertInternalLink => {
            builder.tool(AgentToolInsertInternalLink::new(toolset.sink.clone()))
        }
        ToolKind::AddClientMention => {
            builder.tool(AgentToolAddClientMention::new(toolset.sink.clone()))
        }
        ToolKind::PlaceClientLink => {
            builder.tool(AgentToolPlaceClientLink::new(toolset.sink.clone()))
        }
        ToolKind::SuggestImage => {
            builder.tool(AgentToolSuggestImage::new(toolset.sink.clone()))
        }
        ToolKind::RequestLink => builder.tool(AgentToolRequestLink::new(toolset.sink.clone())),
        ToolKind::SuggestUrl => builder.tool(AgentToolSuggestUrl::new(toolset.sink.clone())),
        ToolKind::WebSearch => builder.tool(AgentToolWebSearch::new()),
    }
}

/// 将工具集合挂载到AgentBuilder并构建出最终的Agent
fn build_with_tools<M>(builder: AgentBuilder<M>, toolset: Option<&WeaverToolset>) -> Agent<M>
where
    M: rig::completion::CompletionModel,
{
    let toolset = match toolset {
        Some(toolset) => toolset,
        None => return builder.build(),
    };
    match toolset.kinds.split_first() {
        None => builder.build(),
        Some((first, rest)) => {
            let mut simple = attach_first_tool(builder, first, toolset);
            for kind in rest {
                simple = attach_next_tool(simple, kind, toolset);
            }
            simple.build()
        }
    }
}

/// 统一的Provider客户端枚举
#[derive(Clone)]
pub enum ProviderClient {
    OpenAI(rig::providers::openai::Client),
    Moonshot(rig::providers::moonshot::Client),
    DeepSeek(rig::providers::deepseek::Client),
    Mistral(rig::providers::mistral::Client),
    OpenRouter(rig::providers::openrouter::Client),
    Anthropic(rig::providers::anthropic::Client),
    Gemini(rig::providers::gemini::Client),
    Ollama(rig::providers::ollama::Client),
}

impl ProviderClient {
    /// 根据配置创建相应的provider客户端
    pub fn new(config: &LLMConfig) -> Result<Self> {
        match config.provider {
            LLMProvider::OpenAI => {
                let client = rig::providers::openai::Client::builder(&config.api_key)
                    .base_url(&config.api_base_url)
                    .build();
                Ok(ProviderClient::OpenAI(client))
            }
            LLMProvider::Moonshot => {
                let client = rig::providers::moonshot::Client::builder(&config.api_key)
                    .base_url(&config.api_base_url)
                    .build();
                Ok(ProviderClient::Moonshot(client))
            }
            LLMProvider::DeepSeek => {
                let client = rig::providers::deepseek::Client::builder(&config.api_key)
                    .base_url(&config.api_base_url)
                    .build();
                Ok(ProviderClient::DeepSeek(client))
            }
            LLMProvider::Mistral => {
                let client = rig::providers::mistral::Client::builder(&config.api_key).build();
                Ok(ProviderClient::Mistral(client))
            }
            LLMProvider::OpenRouter => {
                let client = rig::providers::openrouter::Client::builder(&config.api_key).build();
                Ok(ProviderClient::OpenRouter(client))
            }
            LLMProvider::Anthropic => {
                let client =
                    rig::providers::anthropic::ClientBuilder::new(&config.api_key).build()?;
                Ok(ProviderClient::Anthropic(client))
            }
            LLMProvider::Gemini => {
                let client = rig::providers::gemini::Client::builder(&config.api_key).build()?;
                Ok(ProviderClient::Gemini(client))
            }
            LLMProvider::Ollama => {
                let client = rig::providers::ollama::Client::builder().build();
                Ok(ProviderClient::Ollama(client))
            }
        }
    }

    /// 创建Agent，按需挂载工具集合
    pub fn create_agent(
        &self,
        model: &str,
        system_prompt: &str,
        config: &LLMConfig,
        toolset: Option<&WeaverToolset>,
    ) -> ProviderAgent {
        match self {
            ProviderClient::OpenAI(client) => {
                let builder = client
                    .completion_model(model)
                    .completions_api()
                    .into_agent_builder()
                    .preamble(system_prompt)
                    .max_tokens(config.max_tokens.into())
                    .temperature(config.temperature);
                ProviderAgent::OpenAI(build_with_tools(builder, toolset))
            }
            ProviderClient::Moonshot(client) => {
                let builder = client
                    .agent(model)
                    .preamble(system_prompt)
                    .max_tokens(config.max_tokens.into())
                    .temperature(config.temperature);
                ProviderAgent::Moonshot(build_with_tools(builder, toolset))
            }
            ProviderClient::DeepSeek(client) => {
                let builder = client
                    .agent(model)
                    .preamble(system_prompt)
                    .max_tokens(config.max_tokens.into())
                    .temperature(config.temperature);
                ProviderAgent::DeepSeek(build_with_tools(builder, toolset))
            }
            ProviderClient::Mistral(client) => {
                let builder = client
                    .agent(model)
                    .preamble(system_prompt)
                    .temperature(config.temperature);
                ProviderAgent::Mistral(build_with_tools(builder, toolset))
            }
            ProviderClient::OpenRouter(client) => {
                let builder = client
                    .agent(model)
                    .preamble(system_prompt)
                    .temperature(config.temperature);
                ProviderAgent::OpenRouter(build_with_tools(builder, toolset))
            }
            ProviderClient::Anthropic(client) => {
                let builder = client
                    .agent(model)
                    .preamble(system_prompt)
                    .max_tokens(config.max_tokens.into())
                    .temperature(config.temperature);
                ProviderAgent::Anthropic(build_with_tools(builder, toolset))
            }
            ProviderClient::Gemini(client) => {
                let gen_cfg = GenerationConfig::default();
                let cfg = AdditionalParameters::default().with_config(gen_cfg);

                let builder = client
                    .agent(model)
                    .preamble(system_prompt)
                    .max_tokens(config.max_tokens.into())
                    .temperature(config.temperature)
                    .additional_params(serde_json::to_value(cfg).unwrap());
                ProviderAgent::Gemini(build_with_tools(builder, toolset))
            }
            ProviderClient::Ollama(client) => {
                let builder = client
                    .agent(model)
                    .preamble(system_prompt)
                    .max_tokens(config.max_tokens.into())
                    .temperature(config.temperature);
                ProviderAgent::Ollama(build_with_tools(builder, toolset))
            }
        }
    }
}

/// 统一的Agent枚举
pub enum ProviderAgent {
    OpenAI(Agent<rig::providers::openai::CompletionModel>),
    Mistral(Agent<rig::providers::mistral::CompletionModel>),
    OpenRouter(Agent<rig::providers::openrouter::CompletionModel>),
    Anthropic(Agent<rig::providers::anthropic::completion::CompletionModel>),
    Gemini(Agent<rig::providers::gemini::completion::CompletionModel>),
    Moonshot(Agent<rig::providers::moonshot::CompletionModel>),
    DeepSeek(Agent<rig::providers::deepseek::CompletionModel>),
    Ollama(Agent<rig::providers::ollama::CompletionModel<reqwest::Client>>),
}

impl ProviderAgent {
    /// 执行单轮prompt
    pub async fn prompt(&self, prompt: &str) -> Result<String> {
        match self {
            ProviderAgent::OpenAI(agent) => agent.prompt(prompt).await.map_err(|e| e.into()),
            ProviderAgent::Moonshot(agent) => agent.prompt(prompt).await.map_err(|e| e.into()),
            ProviderAgent::DeepSeek(agent) => agent.prompt(prompt).await.map_err(|e| e.into()),
            ProviderAgent::Mistral(agent) => agent.prompt(prompt).await.map_err(|e| e.into()),
            ProviderAgent::OpenRouter(agent) => agent.prompt(prompt).await.map_err(|e| e.into()),
            ProviderAgent::Anthropic(agent) => agent.prompt(prompt).await.map_err(|e| e.into()),
            ProviderAgent::Gemini(agent) => agent.prompt(prompt).await.map_err(|e| e.into()),
            ProviderAgent::Ollama(agent) => agent.prompt(prompt).await.map_err(|e| e.into()),
        }
    }

    /// 携带会话历史执行多轮对话
    ///
    /// rig会把本轮的用户输入与助手回复追加进`history`。
    pub async fn chat(
        &self,
        prompt: &str,
        history: &mut Vec<Message>,
        max_iterations: usize,
    ) -> Result<String, PromptError> {
        match self {
            ProviderAgent::OpenAI(agent) => {
                agent
                    .prompt(prompt)
                    .with_history(history)
                    .multi_turn(max_iterations)
                    .await
            }
            ProviderAgent::Moonshot(agent) => {
                agent
                    .prompt(prompt)
                    .with_history(history)
                    .multi_turn(max_iterations)
                    .await
            }
            ProviderAgent::DeepSeek(agent) => {
                agent
                    .prompt(prompt)
                    .with_history(history)
                    .multi_turn(max_iterations)
                    .await
            }
            ProviderAgent::Mistral(agent) => {
                agent
                    .prompt(prompt)
                    .with_history(history)
                    .multi_turn(max_iterations)
                    .await
            }
            ProviderAgent::OpenRouter(agent) => {
                agent
                    .prompt(prompt)
                    .with_history(history)
                    .multi_turn(max_iterations)
                    .await
            }
            ProviderAgent::Anthropic(agent) => {
                agent
                    .prompt(prompt)
                    .with_history(history)
                    .multi_turn(max_iterations)
                    .await
            }
            ProviderAgent::Gemini(agent) => {
                agent
                    .prompt(prompt)
                    .with_history(history)
                    .multi_turn(max_iterations)
                    .await
            }
            ProviderAgent::Ollama(agent) => {
                agent
                    .prompt(prompt)
                    .with_history(history)
                    .multi_turn(max_iterations)
                    .await
            }
        }
    }
}
