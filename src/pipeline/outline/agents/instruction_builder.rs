//! 指令构建agent - 把主题与澄清答案汇编成调研指令

use crate::llm::runtime::{AgentDefinition, ModelTier};

pub const AGENT_NAME: &str = "outline-instruction";

pub fn agent() -> AgentDefinition {
    let instructions = r#"你是一个调研指令撰写员，负责把大纲生成请求（以及调用方补充的澄清答案）汇编成一份交给深度调研agent的完整研究指令。

指令应包含：
1. 明确的主题陈述与边界
2. 目标受众与内容角度
3. 期望的大纲深度（章节层级、每节要点数）
4. 需要调研佐证的关键问题清单

把所有已知信息消化进指令，调研agent只会看到这份指令。"#
        .to_string();

    AgentDefinition::new(AGENT_NAME, ModelTier::Efficient, instructions)
}

pub fn user_prompt(topic: &str, answers: Option<&[String]>) -> String {
    let mut prompt = format!("## 大纲生成请求\n{}\n", topic);
    if let Some(answers) = answers
        && !answers.is_empty()
    {
        prompt.push_str("\n## 调用方补充的澄清答案\n");
        for (index, answer) in answers.iter().enumerate() {
            prompt.push_str(&format!("{}. {}\n", index + 1, answer));
        }
    }
    prompt.push_str("\n请产出完整的研究指令。");
    prompt
}
