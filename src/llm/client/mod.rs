//! LLM客户端 - 提供统一的LLM服务接口

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use rig::completion::Message;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

use crate::config::Config;
use crate::llm::events::{AgentEvent, AgentRun, ChatTurn, Role};
use crate::llm::runtime::{AgentDefinition, AgentRuntime, ModelTier};

pub mod providers;
pub mod utils;

use providers::{ProviderClient, WeaverToolset};
use utils::{befitting_model, parse_json_payload};

/// 工具型agent单次运行的最大工具迭代轮数
const MAX_TOOL_ITERATIONS: usize = 12;

/// LLM客户端 - 提供统一的LLM服务接口
#[derive(Clone)]
pub struct LLMClient {
    config: Config,
    client: ProviderClient,
}

impl LLMClient {
    /// 创建新的LLM客户端
    pub fn new(config: Config) -> Result<Self> {
        let client = ProviderClient::new(&config.llm)?;
        Ok(Self { client, config })
    }

    /// 检查模型连接和功能是否正常
    pub async fn check_connection(&self) -> Result<()> {
        println!("🔄 正在检查模型连接...");
        let model = self.config.llm.model_efficient.clone();
        let agent = self
            .client
            .create_agent(&model, "You are a helpful assistant.", &self.config.llm, None);

        match self.with_timeout(agent.prompt("Hello")).await {
            Ok(_) => {
                println!("✅ 模型连接正常");
                Ok(())
            }
            Err(e) => {
                eprintln!("❌ 模型连接失败: {}", e);
                Err(e)
            }
        }
    }

    /// 通用重试逻辑，用于处理异步操作的重试机制
    async fn retry_with_backoff<T, F, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, anyhow::Error>>,
    {
        let llm_config = &self.config.llm;
        let max_retries = llm_config.retry_attempts;
        let retry_delay_ms = llm_config.retry_delay_ms;
        let mut retries = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(err) => {
                    retries += 1;
                    eprintln!(
                        "❌ 调用模型服务出错，重试中 (第 {} / {}次尝试): {}",
                        retries, max_retries, err
                    );
                    if retries >= max_retries {
                        return Err(err);
                    }
                    tokio::time::sleep(Duration::from_millis(retry_delay_ms)).await;
                }
            }
        }
    }

    /// 超时保护：超时按单次调用失败处理
    async fn with_timeout<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        let timeout_seconds = self.config.llm.timeout_seconds;
        match tokio::time::timeout(Duration::from_secs(timeout_seconds), fut).await {
            Ok(result) => result,
            Err(_) => Err(anyhow!("调用模型服务超时（{}秒）", timeout_seconds)),
        }
    }

    /// 构建结构化输出的系统提示词
    fn structured_system_prompt(instructions: &str, output_schema: &Value) -> String {
        format!(
            "{}\n\n## 输出要求\n只输出一个JSON对象，不要输出任何其他内容。JSON必须符合以下Schema：\n```json\n{}\n```",
            instructions,
            serde_json::to_string_pretty(output_schema).unwrap_or_default()
        )
    }
}

#[async_trait]
impl AgentRuntime for LLMClient {
    /// 数据提取：单轮调用，要求模型返回符合Schema的JSON
    async fn extract(
        &self,
        agent: &AgentDefinition,
        user_prompt: &str,
        output_schema: &Value,
    ) -> Result<Value> {
        let model = befitting_model(&self.config.llm, agent.tier);
        let system_prompt = Self::structured_system_prompt(&agent.instructions, output_schema);

        let attempt = self
            .retry_with_backoff(|| async {
                // Provider侧的运行时对象不跨运行复用，每次尝试重新构建
                let provider_agent =
                    self.client
                        .create_agent(&model, &system_prompt, &self.config.llm, None);
                let response = self.with_timeout(provider_agent.prompt(user_prompt)).await?;
                if self.config.verbose {
                    println!("   💬 [{}] 原始回复: {}", agent.name, response);
                }
                parse_json_payload(&response)
            })
            .await;

        match attempt {
            Ok(value) => Ok(value),
            Err(e) if agent.tier == ModelTier::Efficient => {
                // 高能效模型多次失败后，使用高质量模型兜底
                let fallover_model = befitting_model(&self.config.llm, ModelTier::Powerful);
                eprintln!(
                    "❌ 调用模型服务出错，尝试 {} 次均失败，尝试使用备选模型{}...{}",
                    self.config.llm.retry_attempts, fallover_model, e
                );
                let user_prompt_with_fixer = format!(
                    "{}\n\n**注意事项**此前我调用大模型过程时存在错误，错误信息为“{}”，你注意你这一次要规避这个错误",
                    user_prompt, e
                );
                let provider_agent = self.client.create_agent(
                    &fallover_model,
                    &system_prompt,
                    &self.config.llm,
                    None,
                );
                let response = self
                    .with_timeout(provider_agent.prompt(&user_prompt_with_fixer))
                    .await?;
                parse_json_payload(&response)
            }
            Err(e) => {
                eprintln!(
                    "❌ 调用模型服务出错，尝试 {} 次均失败...{}",
                    self.config.llm.retry_attempts, e
                );
                Err(e)
            }
        }
    }

    /// 携带会话历史运行工具型agent，收集事件序列
    async fn run(
        &self,
        agent: &AgentDefinition,
        user_prompt: &str,
        history: &[ChatTurn],
    ) -> Result<AgentRun> {
        let model = befitting_model(&self.config.llm, agent.tier);

        self.retry_with_backoff(|| async {
            // 每次尝试重新构建agent与sink，避免跨尝试残留调用记录
            let toolset = WeaverToolset::new(agent.tools.clone());
            let provider_agent = self.client.create_agent(
                &model,
                &agent.instructions,
                &self.config.llm,
                Some(&toolset),
            );

            let mut chat_history: Vec<Message> = history
                .iter()
                .map(|turn| match turn.role {
                    Role::User => Message::user(turn.text.clone()),
                    Role::Assistant => Message::assistant(turn.text.clone()),
                })
                .collect();

            let reply = self
                .with_timeout(async {
                    provider_agent
                        .chat(user_prompt, &mut chat_history, MAX_TOOL_ITERATIONS)
                        .await
                        .map_err(|e| anyhow!("agent运行失败: {}", e))
                })
                .await?;

            let mut events: Vec<AgentEvent> = toolset
                .sink
                .drain()
                .into_iter()
                .map(|call| AgentEvent::ToolCalled {
                    name: call.tool.to_string(),
                    arguments: call.arguments,
                })
                .collect();
            if self.config.verbose {
                println!(
                    "   💬 [{}] 工具调用 {} 次，回复 {} 字符",
                    agent.name,
                    events.len(),
                    reply.chars().count()
                );
            }
            if !reply.trim().is_empty() {
                events.push(AgentEvent::MessageOutput { text: reply });
            }

            Ok(AgentRun::new(events))
        })
        .await
    }
}
