//! Built-in agent definitions.

use ar_protocol::AgentConfig;

/// Configuration given to an agent appended by the editor.
///
/// `position` is the zero-based index the agent will occupy; the name is
/// numbered from one.
pub fn new_agent(position: usize) -> AgentConfig {
    AgentConfig {
        name: format!("New Agent {}", position + 1),
        description: "Custom analysis agent".to_string(),
        system_prompt: "You are a helpful specialized assistant.".to_string(),
        user_prompt: "Analyze the following text:".to_string(),
        model: "gpt-4o-mini".to_string(),
        temperature: 0.7,
        top_p: 0.9,
        max_tokens: 1000,
    }
}

/// The pipeline a session starts with when no configuration supplies one.
pub fn default_agents() -> Vec<AgentConfig> {
    vec![
        AgentConfig {
            name: "申請資料提取器".to_string(),
            description: "進行繁體中文摘要".to_string(),
            system_prompt: "你是一位醫療器材法規專家。根據提供的文件，進行繁體中文摘要。\n\
                - 識別：廠商名稱、地址、品名、類別、證書編號、日期、機構\n\
                - 標註不確定項目，保留原文引用\n\
                - 以結構化格式輸出（表格或JSON）"
                .to_string(),
            user_prompt: "根據提供的文件，進行繁體中文摘要，並建立包含20個關鍵項目的表格。"
                .to_string(),
            model: "claude-3-5-sonnet-20240620".to_string(),
            temperature: 0.0,
            top_p: 0.9,
            max_tokens: 6000,
        },
        AgentConfig {
            name: "合約資料分析師".to_string(),
            description: "合約資料分析師".to_string(),
            system_prompt: "合約資料分析師，請確認合約中包含以下內容，請摘要合約內容。\n\
                - 委託者及受託者之名稱及地址\n\
                - 委託製造之合意：委託者義務、受託者義務"
                .to_string(),
            user_prompt: "請確認合約中包含以下內容，請摘要合約內容。".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            top_p: 0.9,
            max_tokens: 1200,
        },
        AgentConfig {
            name: "藥物交互作用分析器".to_string(),
            description: "識別藥物-藥物、藥物-食物交互作用".to_string(),
            system_prompt: "你是臨床藥學專家，專注於交互作用分析。\n\
                - 識別：藥物-藥物、藥物-食物、藥物-疾病交互作用"
                .to_string(),
            user_prompt: "請分析以下文件的藥物交互作用：".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            top_p: 0.9,
            max_tokens: 1200,
        },
        AgentConfig {
            name: "綜合報告生成器".to_string(),
            description: "整合所有分析結果生成完整報告".to_string(),
            system_prompt: "你是FDA文件整合專家。\n\
                - 彙整：前述所有代理的分析結果\n\
                - 生成：結構化完整報告"
                .to_string(),
            user_prompt: "請整合以下所有分析結果生成綜合報告：".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.4,
            top_p: 0.95,
            max_tokens: 2000,
        },
    ]
}
