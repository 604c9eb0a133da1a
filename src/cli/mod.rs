use crate::config::{Config, LLMProvider, PipelineKind};
use clap::Parser;
use std::path::PathBuf;

/// LinkWeaver-RS - 由Rust与AI驱动的客座文章链接编排引擎
#[derive(Parser, Debug)]
#[command(name = "Weaver (linkweaver-rs)")]
#[command(
    about = "AI-based multi-phase agent orchestration engine for guest-post link building. It weaves internal links, client mentions and client links into article drafts, and drives clarification-aware deep-research outline generation."
)]
#[command(author = "Sopaco")]
#[command(version)]
pub struct Args {
    /// 文章稿件路径（links流水线）
    #[arg(short, long)]
    pub article: Option<PathBuf>,

    /// 大纲生成的主题描述（outline流水线）
    #[arg(long)]
    pub outline: Option<String>,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 客户名称
    #[arg(long)]
    pub client_name: Option<String>,

    /// 客户目标链接
    #[arg(long)]
    pub client_url: Option<String>,

    /// 期望的锚文本
    #[arg(long)]
    pub anchor_text: Option<String>,

    /// 客座文章发布站点域名
    #[arg(long)]
    pub site: Option<String>,

    /// 目标关键词
    #[arg(long)]
    pub keyword: Option<String>,

    /// 所属工作流标识
    #[arg(long)]
    pub parent_id: Option<String>,

    /// 编排结果输出路径
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 会话存储目录
    #[arg(long)]
    pub store_dir: Option<PathBuf>,

    /// 不持久化会话（仅内存运行，无法跨进程恢复）
    #[arg(long)]
    pub no_persist: bool,

    /// 恢复指定会话并从首个未完成阶段继续
    #[arg(long)]
    pub resume: Option<String>,

    /// 是否启用详细日志
    #[arg(short, long)]
    pub verbose: bool,

    /// 高能效模型，优先用于Weaver引擎的常规推理任务
    #[arg(long)]
    pub model_efficient: Option<String>,

    /// 高质量模型，优先用于Weaver引擎的复杂推理任务
    #[arg(long)]
    pub model_powerful: Option<String>,

    /// LLM API基地址
    #[arg(long)]
    pub llm_api_base_url: Option<String>,

    /// LLM API KEY
    #[arg(long)]
    pub llm_api_key: Option<String>,

    /// 最大tokens数
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// 温度参数
    #[arg(long)]
    pub temperature: Option<f64>,

    /// 单次agent调用超时时间（秒）
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// LLM Provider (openai, mistral, openrouter, anthropic, deepseek)
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// 禁用预置工具（研究agent不再挂载web_search）
    #[arg(long, default_value = "false", action = clap::ArgAction::SetTrue)]
    pub disable_preset_tools: bool,
}

impl Args {
    /// 将CLI参数转换为配置
    pub fn into_config(self) -> Config {
        let mut config = if let Some(config_path) = &self.config {
            // 如果显式指定了配置文件路径，从该路径加载
            Config::from_file(config_path).unwrap_or_else(|_| {
                panic!("⚠️ 警告: 无法读取配置文件 {:?}", config_path)
            })
        } else {
            // 如果没有显式指定配置文件，尝试从默认位置加载
            let default_config_path = std::env::current_dir()
                .unwrap_or_else(|_| std::path::PathBuf::from("."))
                .join("weaver.toml");

            if default_config_path.exists() {
                Config::from_file(&default_config_path).unwrap_or_else(|_| {
                    panic!(
                        "⚠️ 警告: 无法读取默认配置文件 {:?}",
                        default_config_path
                    )
                })
            } else {
                // 默认配置文件不存在，使用默认值
                Config::default()
            }
        };

        // 覆盖配置文件中的设置
        if let Some(article) = self.article {
            config.article_path = Some(article);
            config.pipeline = PipelineKind::Links;
        }
        if let Some(outline) = self.outline {
            config.outline_prompt = Some(outline);
            config.pipeline = PipelineKind::Outline;
        }
        if let Some(client_name) = self.client_name {
            config.client_name = client_name;
        }
        if let Some(client_url) = self.client_url {
            config.client_url = client_url;
        }
        if let Some(anchor_text) = self.anchor_text {
            config.anchor_text = Some(anchor_text);
        }
        if let Some(site) = self.site {
            config.site_domain = site;
        }
        if let Some(keyword) = self.keyword {
            config.target_keyword = Some(keyword);
        }
        if let Some(parent_id) = self.parent_id {
            config.parent_workflow_id = Some(parent_id);
        }
        if let Some(resume) = self.resume {
            config.resume_session_id = Some(resume);
        }
        if let Some(output) = self.output {
            config.output_path = Some(output);
        }
        if let Some(store_dir) = self.store_dir {
            config.store.store_dir = store_dir;
        }
        if self.no_persist {
            config.store.persist = false;
        }
        if self.verbose {
            config.verbose = true;
        }

        // LLM相关覆盖
        if let Some(model) = self.model_efficient {
            config.llm.model_efficient = model;
        }
        if let Some(model) = self.model_powerful {
            config.llm.model_powerful = model;
        }
        if let Some(base_url) = self.llm_api_base_url {
            config.llm.api_base_url = base_url;
        }
        if let Some(api_key) = self.llm_api_key {
            config.llm.api_key = api_key;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.llm.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
        }
        if let Some(timeout) = self.timeout_seconds {
            config.llm.timeout_seconds = timeout;
        }
        if let Some(provider) = self.llm_provider {
            if let Ok(provider) = provider.parse::<LLMProvider>() {
                config.llm.provider = provider;
            } else {
                eprintln!("⚠️ 警告: 未知的LLM Provider \"{}\"，保持原有配置", provider);
            }
        }
        if self.disable_preset_tools {
            config.llm.disable_preset_tools = true;
        }

        config
    }
}

// Include tests
#[cfg(test)]
mod tests;
