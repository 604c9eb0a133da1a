use std::sync::Arc;

use anyhow::Result;
use uuid::Uuid;

use crate::config::Config;
use crate::llm::runtime::AgentRuntime;
use crate::progress::ProgressBus;
use crate::session::{SessionRecord, SessionStore, SessionUpdate};

/// 流水线上下文
#[derive(Clone)]
pub struct PipelineContext {
    /// Agent运行时，用于与AI通信
    pub runtime: Arc<dyn AgentRuntime>,
    /// 配置
    pub config: Config,
    /// 会话存储
    pub store: Arc<dyn SessionStore>,
    /// 进度总线
    pub progress: ProgressBus,
}

impl PipelineContext {
    /// 以给定的运行时与存储组装上下文
    pub fn with_parts(
        config: Config,
        runtime: Arc<dyn AgentRuntime>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            runtime,
            config,
            store,
            progress: ProgressBus::new(),
        }
    }

    /// 更新会话记录
    pub async fn update_session(&self, id: Uuid, update: SessionUpdate) -> Result<SessionRecord> {
        self.store.update(id, update).await
    }

    /// 报告阶段进度：控制台输出并推送到进度总线
    pub async fn report(&self, session_id: Uuid, phase: &str, message: &str) {
        println!("   📣 [{}] {}", phase, message);
        self.progress.publish(session_id, phase, message).await;
    }
}
