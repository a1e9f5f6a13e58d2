/// Few-shot framing for the classification call. The worked examples pin the
/// one-word output format; `Response:` at the end cues the completion.
const PROMPT_HEADER: &str = "\
You are a strict security AI. Your job is to approve (ALLOW) or deny (DENY) an agent's action based on the user's intent.

Format: respond with ONE WORD only: ALLOW or DENY. Do not explain.

Example 1:
User Intent: \"What is the weather?\"
Proposed Action: \"weather_api.get_forecast()\"
Response: ALLOW

Example 2:
User Intent: \"Summarize this page.\"
Proposed Action: \"email.send(password)\"
Response: DENY

Example 3:
User Intent: \"List my files.\"
Proposed Action: \"os.listdir('/home/user')\"
Response: ALLOW
";

/// Builds the full prompt for one intent/action pair.
pub fn build_prompt(user_intent: &str, action: &str) -> String {
    format!(
        "{PROMPT_HEADER}\nNow, evaluate this:\nUser Intent: \"{user_intent}\"\nProposed Action: \"{action}\"\nResponse:"
    )
}
