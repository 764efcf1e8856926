//! Prompt fragments used when an agent executes a task.

use serde_json::Value;

/// System prompt describing who the agent is.
pub fn role_playing(role: &str, goal: &str, backstory: &str) -> String {
    format!(
        "You are {}. {}\nYour personal goal is: {}",
        role.trim(),
        backstory.trim(),
        goal.trim()
    )
}

/// User prompt for a task, with the JSON format instructions when the task
/// expects structured output.
pub fn task_prompt(description: &str, expected_output: &str, schema: Option<&Value>) -> String {
    let mut prompt = format!(
        "{}\n\nThis is the expected criteria for your final answer: {}\n\
         you MUST return the actual complete content as the final answer, not a summary.",
        description.trim(),
        expected_output.trim()
    );

    if let Some(schema) = schema {
        prompt.push_str(&format!(
            "\n\nEnsure your final answer contains only the content in the following format: {}\n\n\
             Ensure the final output does not include any code block markers like ```json or ```python.",
            schema
        ));
    }
    prompt
}

/// Context from earlier tasks, appended to the task prompt.
pub fn with_context(task_prompt: &str, context: Option<&str>) -> String {
    match context {
        Some(ctx) if !ctx.trim().is_empty() => format!(
            "{}\n\nThis is the context you're working with:\n{}",
            task_prompt, ctx
        ),
        _ => task_prompt.to_string(),
    }
}

/// Follow-up message after an answer failed schema validation.
pub fn format_correction(error: &str, schema: &Value) -> String {
    format!(
        "Your previous answer could not be used: {}\n\
         Reply again with only a JSON object matching this schema: {}",
        error, schema
    )
}
