//! Recover model identities from a built synthesis prompt.
//!
//! Every response in a user prompt starts with a line of the form
//! `=== {model_name} ({model_id}) ===`. The id is taken from the last
//! parenthesised group so names containing parentheses still parse. Tag
//! lines never carry leading whitespace, which is how the template keeps
//! tag-shaped response content from parsing.

/// Identity tag of one response section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelTag {
    pub name: String,
    pub id: String,
}

/// Parse one tag line, `None` if the line is not a tag.
pub fn parse_model_tag(line: &str) -> Option<ModelTag> {
    let inner = line
        .trim_end()
        .strip_prefix("=== ")?
        .strip_suffix(" ===")?
        .strip_suffix(')')?;
    let open = inner.rfind(" (")?;
    let name = &inner[..open];
    let id = &inner[open + 2..];
    if id.is_empty() {
        return None;
    }
    Some(ModelTag {
        name: name.to_string(),
        id: id.to_string(),
    })
}

/// All identity tags in prompt order.
pub fn extract_model_tags(prompt: &str) -> Vec<ModelTag> {
    prompt.lines().filter_map(parse_model_tag).collect()
}

/// Model ids of all identity tags in prompt order.
pub fn extract_model_ids(prompt: &str) -> Vec<String> {
    extract_model_tags(prompt).into_iter().map(|t| t.id).collect()
}
