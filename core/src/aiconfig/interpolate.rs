//! Mustache-style interpolation of AI config messages

use crate::error::Result;
use crate::llm::LlmMessage;
use handlebars::Handlebars;

use super::types::EvaluationContext;

/// Renders `{{variable}}` placeholders in message contents.
///
/// The evaluation context is exposed as `ldctx`, so `{{ldctx.key}}` resolves
/// to the context key. Missing variables render as empty strings.
pub struct MessageInterpolator {
    registry: Handlebars<'static>,
}

impl MessageInterpolator {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        Self { registry }
    }

    pub fn render(
        &self,
        messages: Vec<LlmMessage>,
        context: &EvaluationContext,
        variables: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Vec<LlmMessage>> {
        let mut data = variables.clone();
        data.insert("ldctx".to_string(), serde_json::to_value(context)?);
        let data = serde_json::Value::Object(data);

        messages
            .into_iter()
            .map(|message| {
                if !message.content.contains("{{") {
                    return Ok(message);
                }
                let content = self.registry.render_template(&message.content, &data)?;
                Ok(LlmMessage {
                    role: message.role,
                    content,
                })
            })
            .collect()
    }
}

impl Default for MessageInterpolator {
    fn default() -> Self {
        Self::new()
    }
}
