//! 网络检索工具 - 供深度调研agent使用

use rig::tool::Tool;
use serde::{Deserialize, Serialize};

/// 网络检索工具
#[derive(Debug, Clone)]
pub struct AgentToolWebSearch {
    client: reqwest::Client,
}

/// 检索参数
#[derive(Debug, Deserialize)]
pub struct WebSearchArgs {
    pub query: String,
    pub limit: Option<usize>,
}

/// 单条检索结果
#[derive(Debug, Serialize)]
pub struct WebSearchHit {
    pub title: String,
    pub url: String,
}

/// 检索结果
#[derive(Debug, Serialize, Default)]
pub struct WebSearchResult {
    pub hits: Vec<WebSearchHit>,
}

/// 检索工具错误
#[derive(Debug)]
pub struct WebSearchError(String);

impl std::fmt::Display for WebSearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Web search error: {}", self.0)
    }
}

impl std::error::Error for WebSearchError {}

impl Default for AgentToolWebSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentToolWebSearch {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    async fn search(&self, args: &WebSearchArgs) -> Result<WebSearchResult, WebSearchError> {
        let limit = args.limit.unwrap_or(5).min(10);

        // Wikipedia OpenSearch返回 [query, [titles], [descriptions], [urls]]
        let response = self
            .client
            .get("https://en.wikipedia.org/w/api.php")
            .query(&[
                ("action", "opensearch"),
                ("search", args.query.as_str()),
                ("limit", &limit.to_string()),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(|e| WebSearchError(e.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|e| WebSearchError(e.to_string()))?;
        let payload: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| WebSearchError(e.to_string()))?;

        let titles = payload
            .get(1)
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        let urls = payload
            .get(3)
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        let hits = titles
            .iter()
            .zip(urls.iter())
            .filter_map(|(title, url)| {
                Some(WebSearchHit {
                    title: title.as_str()?.to_string(),
                    url: url.as_str()?.to_string(),
                })
            })
            .collect();

        Ok(WebSearchResult { hits })
    }
}

impl Tool for AgentToolWebSearch {
    const NAME: &'static str = "web_search";

    type Error = WebSearchError;
    type Args = WebSearchArgs;
    type Output = WebSearchResult;

    async fn definition(&self, _prompt: String) -> rig::completion::ToolDefinition {
        rig::completion::ToolDefinition {
            name: Self::NAME.to_string(),
            description: "检索公开资料，返回标题与URL列表。用于为调研结论补充可引用的来源。".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "检索关键词"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "返回条数上限（默认5，最大10）"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        println!("   🔧 tool called...web_search@{}", args.query);
        self.search(&args).await
    }
}
