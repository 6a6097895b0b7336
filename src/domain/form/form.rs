//! Form definition: an ordered list of steps plus the vocabulary they share.

use std::collections::HashMap;
use std::sync::Arc;

use super::configuration::{FormConfiguration, FormOptions};
use super::errors::FormBuildError;
use super::field::{ActivePredicate, Field, FieldBuilder};
use super::hooks::MessageGenerator;
use crate::domain::foundation::{FieldValue, FormData, ValidationError};
use crate::domain::recognition::{EnumChoice, EnumerationOptions, MatchValue, RecognizeEnumeration};
use crate::domain::step::{
    confirm_next, ConfirmStep, FieldStep, MessageSource, MessageStep, Step, NAVIGATION_STEP,
};

enum StepEntry {
    Field(FieldBuilder),
    Confirm {
        pattern: String,
        active: Option<ActivePredicate>,
        dependencies: Option<Vec<String>>,
    },
    Message {
        source: MessageSource,
        active: Option<ActivePredicate>,
        dependencies: Vec<String>,
    },
}

/// Declares the steps of a form in order.
pub struct FormBuilder {
    configuration: FormConfiguration,
    options: FormOptions,
    entries: Vec<StepEntry>,
}

impl Default for FormBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FormBuilder {
    pub fn new() -> Self {
        Self {
            configuration: FormConfiguration::default(),
            options: FormOptions::default(),
            entries: Vec::new(),
        }
    }

    pub fn with_configuration(mut self, configuration: FormConfiguration) -> Self {
        self.configuration = configuration;
        self
    }

    pub fn with_options(mut self, options: FormOptions) -> Self {
        self.options = options;
        self
    }

    pub fn field(mut self, field: FieldBuilder) -> Self {
        self.entries.push(StepEntry::Field(field));
        self
    }

    /// Confirms every field declared before it.
    pub fn confirm(mut self, pattern: impl Into<String>) -> Self {
        self.entries.push(StepEntry::Confirm {
            pattern: pattern.into(),
            active: None,
            dependencies: None,
        });
        self
    }

    pub fn confirm_when<S: Into<String>>(
        mut self,
        pattern: impl Into<String>,
        active: impl Fn(&FormData) -> bool + Send + Sync + 'static,
        dependencies: impl IntoIterator<Item = S>,
    ) -> Self {
        self.entries.push(StepEntry::Confirm {
            pattern: pattern.into(),
            active: Some(Arc::new(active)),
            dependencies: Some(dependencies.into_iter().map(Into::into).collect()),
        });
        self
    }

    pub fn message(mut self, pattern: impl Into<String>) -> Self {
        self.entries.push(StepEntry::Message {
            source: MessageSource::Pattern(pattern.into()),
            active: None,
            dependencies: Vec::new(),
        });
        self
    }

    pub fn message_when(
        mut self,
        pattern: impl Into<String>,
        active: impl Fn(&FormData) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.entries.push(StepEntry::Message {
            source: MessageSource::Pattern(pattern.into()),
            active: Some(Arc::new(active)),
            dependencies: Vec::new(),
        });
        self
    }

    pub fn message_generated(mut self, generator: Arc<dyn MessageGenerator>) -> Self {
        self.entries.push(StepEntry::Message {
            source: MessageSource::Generated(generator),
            active: None,
            dependencies: Vec::new(),
        });
        self
    }

    pub fn build(self) -> Result<Form, FormBuildError> {
        let configuration = Arc::new(self.configuration);
        let mut steps: Vec<Step> = Vec::with_capacity(self.entries.len());
        let mut confirmations = 0;
        let mut messages = 0;

        for entry in self.entries {
            let step = match entry {
                StepEntry::Field(builder) => Step::Field(FieldStep::new(builder.build(configuration.clone())?)),
                StepEntry::Confirm {
                    pattern,
                    active,
                    dependencies,
                } => {
                    confirmations += 1;
                    let dependencies = dependencies.unwrap_or_else(|| {
                        steps
                            .iter()
                            .filter(|step| matches!(step, Step::Field(_)))
                            .map(|step| step.name().to_string())
                            .collect()
                    });
                    let mut builder = FieldBuilder::bool(format!("confirmation{}", confirmations))
                        .description("confirmation");
                    for dependency in &dependencies {
                        builder = builder.depends_on(dependency.clone());
                    }
                    if let Some(active) = active {
                        builder = builder.active_when(move |data| active(data));
                    }
                    let field = builder
                        .next_with(move |value, _| {
                            confirm_next(
                                value.and_then(FieldValue::as_bool).unwrap_or(false),
                                &dependencies,
                            )
                        })
                        .build(configuration.clone())?;
                    Step::Confirm(ConfirmStep::new(field, pattern))
                }
                StepEntry::Message {
                    source,
                    active,
                    dependencies,
                } => {
                    messages += 1;
                    Step::Message(MessageStep::new(
                        format!("message{}", messages),
                        source,
                        active,
                        dependencies,
                    ))
                }
            };
            steps.push(step);
        }

        Form::new(steps, configuration, self.options)
    }
}

/// An immutable, shareable form definition.
#[derive(Debug)]
pub struct Form {
    steps: Vec<Step>,
    index: HashMap<String, usize>,
    configuration: Arc<FormConfiguration>,
    options: FormOptions,
    commands: RecognizeEnumeration,
}

impl Form {
    pub fn builder() -> FormBuilder {
        FormBuilder::new()
    }

    fn new(
        steps: Vec<Step>,
        configuration: Arc<FormConfiguration>,
        options: FormOptions,
    ) -> Result<Self, FormBuildError> {
        let mut index = HashMap::new();
        for (position, step) in steps.iter().enumerate() {
            if step.name() == NAVIGATION_STEP || index.insert(step.name().to_string(), position).is_some() {
                return Err(ValidationError::duplicate("step", step.name()).into());
            }
        }
        for step in &steps {
            if let Some(missing) = step.dependencies().iter().find(|d| !index.contains_key(*d)) {
                return Err(FormBuildError::UnknownDependency {
                    step: step.name().to_string(),
                    dependency: missing.clone(),
                });
            }
        }
        let commands = command_recognizer(&steps, configuration.clone())?;
        Ok(Self {
            steps,
            index,
            configuration,
            options,
            commands,
        })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.step_index(name)
            .and_then(|index| self.steps[index].field())
    }

    pub fn configuration(&self) -> &Arc<FormConfiguration> {
        &self.configuration
    }

    pub fn options(&self) -> FormOptions {
        self.options
    }

    /// Recognizer for built-in commands and field names.
    pub fn commands(&self) -> &RecognizeEnumeration {
        &self.commands
    }
}

fn command_recognizer(
    steps: &[Step],
    configuration: Arc<FormConfiguration>,
) -> Result<RecognizeEnumeration, FormBuildError> {
    let mut choices: Vec<EnumChoice> = configuration
        .all_commands()
        .into_iter()
        .map(|(command, description)| {
            EnumChoice::new(
                MatchValue::Command(command),
                description.description,
                description.terms,
            )
        })
        .collect();
    choices.extend(steps.iter().filter_map(|step| match step {
        Step::Field(field_step) => {
            let field = field_step.field();
            Some(EnumChoice::new(
                MatchValue::Step(field.name().to_string()),
                field.description(),
                field.terms().to_vec(),
            ))
        }
        _ => None,
    }));
    RecognizeEnumeration::new(choices, EnumerationOptions::default(), configuration).map_err(
        |source| FormBuildError::InvalidTerm {
            field: "commands".to_string(),
            source,
        },
    )
}
