//! MessageStep - Text sent to the user that expects no reply.

use std::fmt;
use std::sync::Arc;

use super::StepError;
use crate::domain::form::field::ActivePredicate;
use crate::domain::form::{render, FormPrompt, MessageGenerator};
use crate::domain::foundation::FormData;

/// Where a message's text comes from.
#[derive(Clone)]
pub enum MessageSource {
    /// A template; `{name}` is replaced by the described value of field `name`.
    Pattern(String),
    Generated(Arc<dyn MessageGenerator>),
}

impl fmt::Debug for MessageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageSource::Pattern(pattern) => f.debug_tuple("Pattern").field(pattern).finish(),
            MessageSource::Generated(_) => f.write_str("Generated"),
        }
    }
}

/// Informational text that expects no reply.
#[derive(Clone)]
pub struct MessageStep {
    name: String,
    source: MessageSource,
    active: Option<ActivePredicate>,
    dependencies: Vec<String>,
    generated: Option<FormPrompt>,
}

impl fmt::Debug for MessageStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageStep")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

impl MessageStep {
    pub fn new(
        name: impl Into<String>,
        source: MessageSource,
        active: Option<ActivePredicate>,
        dependencies: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            source,
            active,
            dependencies,
            generated: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn is_active(&self, data: &FormData) -> bool {
        self.active.as_ref().map_or(true, |active| active(data))
    }

    pub async fn define(&mut self, data: &FormData) -> Result<bool, StepError> {
        if let MessageSource::Generated(generator) = &self.source {
            self.generated = Some(generator.generate(data).await?);
        }
        Ok(true)
    }

    pub fn start(&self, values: &[(String, String)]) -> FormPrompt {
        match (&self.source, &self.generated) {
            (MessageSource::Pattern(pattern), _) => {
                let args: Vec<(&str, &str)> = values
                    .iter()
                    .map(|(name, value)| (name.as_str(), value.as_str()))
                    .collect();
                FormPrompt::new(render(pattern, &args))
            }
            (MessageSource::Generated(_), Some(prompt)) => prompt.clone(),
            (MessageSource::Generated(_), None) => FormPrompt::default(),
        }
    }
}
