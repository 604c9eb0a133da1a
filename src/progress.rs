//! 进度推送 - 按会话注入式pub/sub
//!
//! 总线只负责"为会话X注册/注销一个进度通道"和"向该通道推送事件"，
//! 不关心事件如何传输到最终订阅方。通道生命周期与会话绑定，
//! 会话终止时注销，避免进程级状态无界增长。

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

/// 单个会话通道的缓冲容量
const CHANNEL_CAPACITY: usize = 64;

/// 一条进度事件
#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    pub session_id: Uuid,
    pub phase: String,
    pub message: String,
}

/// 进度总线
#[derive(Clone, Default)]
pub struct ProgressBus {
    channels: Arc<RwLock<HashMap<Uuid, broadcast::Sender<ProgressEvent>>>>,
}

impl ProgressBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 订阅指定会话的进度事件，必要时建立通道
    pub async fn subscribe(&self, session_id: Uuid) -> broadcast::Receiver<ProgressEvent> {
        let mut channels = self.channels.write().await;
        channels
            .entry(session_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// 向会话通道推送事件；无订阅方时为no-op
    pub async fn publish(&self, session_id: Uuid, phase: &str, message: impl Into<String>) {
        let channels = self.channels.read().await;
        if let Some(sender) = channels.get(&session_id) {
            // 所有接收端都已断开时send会失败，忽略即可
            let _ = sender.send(ProgressEvent {
                session_id,
                phase: phase.to_string(),
                message: message.into(),
            });
        }
    }

    /// 注销会话通道
    pub async fn unsubscribe(&self, session_id: Uuid) {
        let mut channels = self.channels.write().await;
        channels.remove(&session_id);
    }

    /// 当前保有通道的会话数
    pub async fn active_channels(&self) -> usize {
        self.channels.read().await.len()
    }
}
