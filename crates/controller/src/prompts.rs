//! Instruction templates sent to the text generator.

use goal_agent_core::types::CapabilitySnapshot;

use crate::context::PlanningContext;

/// Longest previous response echoed back in a correction instruction.
const MAX_ECHOED_RESPONSE: usize = 2000;

const PLAN_FORMAT: &str = "\
Respond with ONLY a JSON list. Each element is an object with:
  \"tool_name\": one of the available tool names (string, required)
  \"args\": list of positional argument strings (optional)
  \"kwargs\": object of keyword argument strings (optional)
  \"description\": short explanation of the step (optional)
Return [] if no available tool can help with the goal.";

pub fn initial_plan(goal: &str, capabilities: &CapabilitySnapshot, context: &PlanningContext) -> String {
    format!(
        "You are the planning component of an assistant. Build a plan of tool calls that \
achieves the user's latest goal.\n\n\
Goal: \"{goal}\"\n\n\
Available tools:\n{tools}\n\n\
{context}\
{format}",
        goal = goal,
        tools = capabilities.to_prompt_json(),
        context = context.render(),
        format = PLAN_FORMAT,
    )
}

pub fn correction(
    goal: &str,
    capabilities: &CapabilitySnapshot,
    previous_response: &str,
    problem: &str,
) -> String {
    format!(
        "Your previous plan for the goal \"{goal}\" could not be used.\n\n\
Problem: {problem}\n\n\
Previous response:\n{previous}\n\n\
Available tools:\n{tools}\n\n\
Fix the problem and reply with a corrected plan.\n{format}",
        goal = goal,
        problem = problem,
        previous = echo_response(previous_response),
        tools = capabilities.to_prompt_json(),
        format = PLAN_FORMAT,
    )
}

pub fn replan(
    goal: &str,
    failure_analysis: &str,
    capabilities: &CapabilitySnapshot,
    context: &str,
) -> String {
    format!(
        "A previous attempt to achieve the goal \"{goal}\" failed.\n\n\
What went wrong: {analysis}\n\n\
Create a NEW plan that avoids this failure, for example by choosing different tools or \
different arguments.\n\n\
Available tools:\n{tools}\n\n\
{context}\
{format}",
        goal = goal,
        analysis = failure_analysis,
        tools = capabilities.to_prompt_json(),
        context = context,
        format = PLAN_FORMAT,
    )
}

pub fn outline(goal: &str, context: &str) -> String {
    format!(
        "Break the following project goal into 3 to 7 high-level phases.\n\n\
Goal: \"{goal}\"\n\
{context}\n\
List one phase title per line as a numbered list. Do not add any other text.",
        goal = goal,
        context = optional_block("Context", context),
    )
}

pub fn detailed_tasks(goal: &str, phase: &str, context: &str) -> String {
    format!(
        "The overall project goal is: \"{goal}\"\n\
We are planning the phase: \"{phase}\"\n\
{context}\n\
List 3 to 7 concrete, actionable tasks for this phase, one per line as a numbered list. \
Do not add any other text.",
        goal = goal,
        phase = phase,
        context = optional_block("Context", context),
    )
}

pub fn elaboration(goal: &str, task: &str, context: &str) -> String {
    format!(
        "The overall project goal is: \"{goal}\"\n\
Turn this task into one executable step: \"{task}\"\n\
{context}\n\
Respond with ONLY a JSON object of the form {{\"type\": ..., \"details\": {{...}}}} where type is one of:\n\
  \"script_execution\": details has \"script_content_prompt\" (instruction for generating the script), \
optional \"input_files\", \"output_files_to_capture\" (lists of paths) and \"timeout_seconds\" (integer)\n\
  \"human_review_gate\": details has \"prompt_to_user\" (what the reviewer should check)\n\
  \"informational\": details has \"message\" (text to show the user)",
        goal = goal,
        task = task,
        context = optional_block("Context", context),
    )
}

pub fn conversation_system() -> &'static str {
    "You are a helpful assistant. No tool plan applies to the user's latest message, \
so answer it directly and concisely using the conversation so far."
}

pub fn summary(goal: &str, plan_json: &str, results_json: &str, success: bool) -> String {
    format!(
        "The user asked: \"{goal}\"\n\n\
Planned steps:\n{plan}\n\n\
Results:\n{results}\n\n\
Overall the request {status}. Write a short, friendly reply to the user explaining what \
was done and the outcome. Do not invent results that are not listed.",
        goal = goal,
        plan = plan_json,
        results = results_json,
        status = if success { "succeeded" } else { "failed" },
    )
}

pub fn rephrase_error(goal: &str, technical_detail: &str) -> String {
    format!(
        "While handling the request \"{goal}\" this technical error occurred:\n{detail}\n\n\
Explain to the user in one or two plain sentences what went wrong. Do not include stack \
traces or internal identifiers.",
        goal = goal,
        detail = technical_detail,
    )
}

fn optional_block(title: &str, body: &str) -> String {
    if body.trim().is_empty() {
        String::new()
    } else {
        format!("{}:\n{}\n", title, body.trim())
    }
}

fn echo_response(response: &str) -> String {
    if response.trim().is_empty() {
        return "(empty response)".to_string();
    }
    let mut echoed: String = response.chars().take(MAX_ECHOED_RESPONSE).collect();
    if response.chars().count() > MAX_ECHOED_RESPONSE {
        echoed.push_str("...");
    }
    echoed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correction_embeds_goal_response_and_problem() {
        let prompt = correction(
            "greet John",
            &CapabilitySnapshot::default(),
            "not json",
            "the response is not valid JSON",
        );
        assert!(prompt.contains("greet John"));
        assert!(prompt.contains("not json"));
        assert!(prompt.contains("the response is not valid JSON"));
    }

    #[test]
    fn test_correction_marks_empty_response() {
        let prompt = correction("g", &CapabilitySnapshot::default(), "  ", "empty");
        assert!(prompt.contains("(empty response)"));
    }

    #[test]
    fn test_outline_omits_empty_context() {
        assert!(!outline("build an app", "").contains("Context:"));
        assert!(outline("build an app", "uses rust").contains("Context:\nuses rust"));
    }
}
