use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};

use crate::config::{Config, PipelineKind};
use crate::llm::LLMClient;
use crate::pipeline::context::PipelineContext;
use crate::pipeline::types::{LinkOrchestrationResult, OrchestrationInput, OutlineInput};
use crate::pipeline::{links, outline};
use crate::session::{FileSessionStore, MemorySessionStore, SessionStore};

/// 启动编排工作流
pub async fn launch(config: &Config) -> Result<()> {
    config.validate()?;

    let llm_client = LLMClient::new(config.clone())?;

    // 启动时检查模型连接
    llm_client.check_connection().await?;

    let store: Arc<dyn SessionStore> = if config.store.persist {
        Arc::new(FileSessionStore::new(config.store.store_dir.clone()))
    } else {
        Arc::new(MemorySessionStore::new())
    };
    let context = PipelineContext::with_parts(config.clone(), Arc::new(llm_client), store);

    // 恢复模式优先于新建
    if let Some(resume_id) = &config.resume_session_id {
        let session_id = resume_id
            .parse::<uuid::Uuid>()
            .context("无效的会话标识")?;
        let result = links::resume_session(&context, session_id).await?;
        return finish_links(config, &result);
    }

    match config.pipeline {
        PipelineKind::Links => {
            let article_path = config
                .article_path
                .as_ref()
                .ok_or_else(|| anyhow!("未指定文章稿件路径"))?;
            let article = tokio::fs::read_to_string(article_path)
                .await
                .context(format!("无法读取文章稿件: {:?}", article_path))?;

            let input = OrchestrationInput {
                article,
                client_name: config.client_name.clone(),
                client_url: config.client_url.clone(),
                anchor_text: config.anchor_text.clone(),
                site_domain: config.site_domain.clone(),
                target_keyword: config.target_keyword.clone(),
                parent_workflow_id: config.parent_workflow_id.clone(),
            };

            let result = links::orchestrate(&context, input).await;
            finish_links(config, &result)
        }
        PipelineKind::Outline => {
            let prompt = config
                .outline_prompt
                .clone()
                .ok_or_else(|| anyhow!("未指定大纲生成主题"))?;
            let input = OutlineInput {
                prompt,
                parent_workflow_id: config.parent_workflow_id.clone(),
            };

            let started = outline::start(&context, input).await?;
            if started.needs_clarification {
                // CLI场景下就地收集澄清答案并恢复
                println!("❓ 需要补充以下信息：");
                let mut answers = Vec::new();
                for question in &started.questions {
                    print!("   {} > ", question);
                    std::io::stdout().flush()?;
                    let mut answer = String::new();
                    std::io::stdin().read_line(&mut answer)?;
                    answers.push(answer.trim().to_string());
                }

                let result =
                    outline::continue_with_answers(&context, started.session_id, &answers).await?;
                finish_outline(config, &result.outline, &result.citations)
            } else {
                let outline_text = started
                    .outline
                    .ok_or_else(|| anyhow!("大纲生成返回了空结果"))?;
                finish_outline(config, &outline_text, &started.citations)
            }
        }
    }
}

/// 输出链接编排结果
fn finish_links(config: &Config, result: &LinkOrchestrationResult) -> Result<()> {
    if !result.success {
        anyhow::bail!(
            "链接编排未成功: {}",
            result.error.as_deref().unwrap_or("未知错误")
        );
    }

    println!("📊 编排摘要：");
    println!(
        "   - 站内链接: {} 条",
        result.modifications.internal_links.len()
    );
    println!(
        "   - 品牌提及: {} 条",
        result.modifications.client_mentions.len()
    );
    println!(
        "   - 客户链接: {}",
        if result.modifications.client_link.is_some() {
            "已放置"
        } else {
            "未放置"
        }
    );
    println!("   - 配图建议: {} 条", result.modifications.images.len());
    println!("   - 互链请求: {} 条", result.link_requests.len());
    if let Some(url) = &result.url_suggestion {
        println!("   - 建议URL: /{}", url.url_slug);
    }

    if let Some(output_path) = &config.output_path {
        std::fs::write(output_path, &result.final_article)
            .context(format!("无法写入输出文件: {:?}", output_path))?;
        println!("📄 最终文章已写入 {:?}", output_path);
    }

    Ok(())
}

/// 输出大纲生成结果
fn finish_outline(config: &Config, outline_text: &str, citations: &[String]) -> Result<()> {
    if let Some(output_path) = &config.output_path {
        std::fs::write(output_path, outline_text)
            .context(format!("无法写入输出文件: {:?}", output_path))?;
        println!("📄 大纲已写入 {:?}", output_path);
    } else {
        println!("{}", outline_text);
    }

    if !citations.is_empty() {
        println!("📚 引用来源 {} 条", citations.len());
    }

    Ok(())
}

// Include tests
#[cfg(test)]
mod tests;
