use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

/// LLM Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum LLMProvider {
    #[serde(rename = "openai")]
    #[default]
    OpenAI,
    #[serde(rename = "moonshot")]
    Moonshot,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "mistral")]
    Mistral,
    #[serde(rename = "openrouter")]
    OpenRouter,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "gemini")]
    Gemini,
    #[serde(rename = "ollama")]
    Ollama,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::Moonshot => write!(f, "moonshot"),
            LLMProvider::DeepSeek => write!(f, "deepseek"),
            LLMProvider::Mistral => write!(f, "mistral"),
            LLMProvider::OpenRouter => write!(f, "openrouter"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
            LLMProvider::Gemini => write!(f, "gemini"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(LLMProvider::OpenAI),
            "moonshot" => Ok(LLMProvider::Moonshot),
            "deepseek" => Ok(LLMProvider::DeepSeek),
            "mistral" => Ok(LLMProvider::Mistral),
            "openrouter" => Ok(LLMProvider::OpenRouter),
            "anthropic" => Ok(LLMProvider::Anthropic),
            "gemini" => Ok(LLMProvider::Gemini),
            "ollama" => Ok(LLMProvider::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// 编排任务类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum PipelineKind {
    /// 链接编排流水线（三阶段）
    #[serde(rename = "links")]
    #[default]
    Links,
    /// 大纲生成流水线（triage → clarify → research）
    #[serde(rename = "outline")]
    Outline,
}

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// 要执行的流水线
    pub pipeline: PipelineKind,

    /// 文章稿件路径（links流水线的输入）
    pub article_path: Option<PathBuf>,

    /// 大纲生成的主题描述（outline流水线的输入）
    pub outline_prompt: Option<String>,

    /// 客户名称
    pub client_name: String,

    /// 客户目标链接
    pub client_url: String,

    /// 期望的锚文本（为空时由agent自行决定）
    pub anchor_text: Option<String>,

    /// 客座文章发布站点域名
    pub site_domain: String,

    /// 目标关键词
    pub target_keyword: Option<String>,

    /// 所属工作流标识（外部系统的关联键）
    pub parent_workflow_id: Option<String>,

    /// 要恢复的会话标识（从首个未完成阶段继续）
    pub resume_session_id: Option<String>,

    /// 编排结果输出路径
    pub output_path: Option<PathBuf>,

    /// LLM模型配置
    pub llm: LLMConfig,

    /// 会话存储配置
    pub store: StoreConfig,

    /// 是否启用详细日志
    pub verbose: bool,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LLMConfig {
    /// LLM Provider类型
    pub provider: LLMProvider,

    /// LLM API KEY
    pub api_key: String,

    /// LLM API基地址
    pub api_base_url: String,

    /// 高能效模型，优先用于Weaver引擎的常规推理任务
    pub model_efficient: String,

    /// 高质量模型，优先用于Weaver引擎的复杂推理任务（如深度调研）
    pub model_powerful: String,

    /// 最大tokens
    pub max_tokens: u32,

    /// 温度
    pub temperature: f64,

    /// 重试次数
    pub retry_attempts: u32,

    /// 重试间隔（毫秒）
    pub retry_delay_ms: u64,

    /// 单次agent调用超时时间（秒）
    pub timeout_seconds: u64,

    /// 禁用预置工具（研究agent不再挂载web_search）
    pub disable_preset_tools: bool,
}

/// 会话存储配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StoreConfig {
    /// 是否持久化会话到磁盘
    pub persist: bool,

    /// 会话存储目录
    pub store_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pipeline: PipelineKind::default(),
            article_path: None,
            outline_prompt: None,
            client_name: String::new(),
            client_url: String::new(),
            anchor_text: None,
            site_domain: String::new(),
            target_keyword: None,
            parent_workflow_id: None,
            resume_session_id: None,
            output_path: None,
            llm: LLMConfig::default(),
            store: StoreConfig::default(),
            verbose: false,
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::default(),
            api_key: std::env::var("LLM_API_KEY").unwrap_or_default(),
            api_base_url: "https://api.openai.com/v1".to_string(),
            model_efficient: "gpt-4o-mini".to_string(),
            model_powerful: "gpt-4o".to_string(),
            max_tokens: 131072,
            temperature: 0.1,
            retry_attempts: 3,
            retry_delay_ms: 1000,
            timeout_seconds: 300,
            disable_preset_tools: false,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            persist: true,
            store_dir: PathBuf::from(".weaver/sessions"),
        }
    }
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// 校验当前配置能否驱动所选流水线
    pub fn validate(&self) -> Result<()> {
        // 恢复已有会话时，输入来自持久化的会话快照
        if self.resume_session_id.is_some() {
            return Ok(());
        }

        match self.pipeline {
            PipelineKind::Links => {
                if self.article_path.is_none() {
                    anyhow::bail!("links流水线需要指定文章稿件路径 (--article)");
                }
                if self.client_name.trim().is_empty() || self.client_url.trim().is_empty() {
                    anyhow::bail!("links流水线需要指定客户名称与客户链接");
                }
            }
            PipelineKind::Outline => {
                if self
                    .outline_prompt
                    .as_deref()
                    .is_none_or(|p| p.trim().is_empty())
                {
                    anyhow::bail!("outline流水线需要指定主题描述 (--outline)");
                }
            }
        }
        Ok(())
    }
}

// Include tests
#[cfg(test)]
mod tests;
