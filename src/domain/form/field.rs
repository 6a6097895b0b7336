//! Field definitions: one value slot of a form and how to fill it.
//!
//! Fields are declared with a [`FieldBuilder`] and compiled into a [`Field`]
//! once at form-build time, which is also when enumeration regexes are
//! compiled. Fields with a [`FieldDefiner`] are rebuilt from their declared
//! builder every time they are activated.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::configuration::{FormConfiguration, TemplateUsage};
use super::errors::FormBuildError;
use super::hooks::{FieldDefiner, FieldValidator, HookError, ValidateResult};
use super::next_step::NextStep;
use super::prompt::{render, FormPrompt};
use crate::domain::foundation::{FieldValue, FormData, ValidationError};
use crate::domain::recognition::language::{camel_case, generate_terms};
use crate::domain::recognition::{
    EnumChoice, EnumerationOptions, MatchValue, PrimitiveKind, Recognize, RecognizeEnumeration,
    RecognizePrimitive,
};

/// Longest phrase generated automatically from a description.
const MAX_GENERATED_PHRASE: usize = 3;

pub type ActivePredicate = Arc<dyn Fn(&FormData) -> bool + Send + Sync>;
pub type NextFn = Arc<dyn Fn(Option<&FieldValue>, &FormData) -> NextStep + Send + Sync>;

/// The type of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Bool,
    Text,
    Integer,
    Double,
    DateTime,
    Enumeration,
}

/// When to tell the user about words that were not understood.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackOptions {
    /// Only when unmatched non-noise words remain.
    #[default]
    Auto,
    Always,
    Never,
}

/// One legal value of an enumerated field.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub value: FieldValue,
    pub description: String,
    /// Regex fragments; generated from the description when empty.
    pub terms: Vec<String>,
}

impl Choice {
    pub fn new(value: impl Into<FieldValue>, description: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            description: description.into(),
            terms: Vec::new(),
        }
    }

    /// A text choice described by its own name split on case changes.
    pub fn named(name: &str) -> Self {
        Self::new(name, camel_case(name))
    }

    pub fn with_terms<S: Into<String>>(mut self, terms: impl IntoIterator<Item = S>) -> Self {
        self.terms = terms.into_iter().map(Into::into).collect();
        self
    }
}

/// Declarative description of a field.
#[derive(Clone)]
pub struct FieldBuilder {
    name: String,
    kind: FieldKind,
    description: Option<String>,
    terms: Vec<String>,
    optional: bool,
    nullable: bool,
    multiple: bool,
    allow_numbers: bool,
    min: Option<f64>,
    max: Option<f64>,
    choices: Vec<Choice>,
    prompt: Option<String>,
    templates: BTreeMap<TemplateUsage, String>,
    feedback: FeedbackOptions,
    dependencies: Vec<String>,
    active: Option<ActivePredicate>,
    validator: Option<Arc<dyn FieldValidator>>,
    next: Option<NextFn>,
    definer: Option<Arc<dyn FieldDefiner>>,
}

impl fmt::Debug for FieldBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldBuilder")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("optional", &self.optional)
            .field("multiple", &self.multiple)
            .field("choices", &self.choices.len())
            .finish_non_exhaustive()
    }
}

impl FieldBuilder {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: None,
            terms: Vec::new(),
            optional: false,
            nullable: true,
            multiple: false,
            allow_numbers: true,
            min: None,
            max: None,
            choices: Vec::new(),
            prompt: None,
            templates: BTreeMap::new(),
            feedback: FeedbackOptions::Auto,
            dependencies: Vec::new(),
            active: None,
            validator: None,
            next: None,
            definer: None,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Bool)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    pub fn double(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Double)
    }

    pub fn date_time(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::DateTime)
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Enumeration)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Regex fragments naming the field itself.
    pub fn terms<S: Into<String>>(mut self, terms: impl IntoIterator<Item = S>) -> Self {
        self.terms = terms.into_iter().map(Into::into).collect();
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn allow_numbers(mut self, allow: bool) -> Self {
        self.allow_numbers = allow;
        self
    }

    pub fn limits(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }

    pub fn choices(mut self, choices: impl IntoIterator<Item = Choice>) -> Self {
        self.choices.extend(choices);
        self
    }

    /// Drops all declared choices, typically from a definer.
    pub fn clear_choices(mut self) -> Self {
        self.choices.clear();
        self
    }

    pub fn prompt(mut self, pattern: impl Into<String>) -> Self {
        self.prompt = Some(pattern.into());
        self
    }

    pub fn template(mut self, usage: TemplateUsage, pattern: impl Into<String>) -> Self {
        self.templates.insert(usage, pattern.into());
        self
    }

    pub fn feedback(mut self, feedback: FeedbackOptions) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn depends_on(mut self, step: impl Into<String>) -> Self {
        self.dependencies.push(step.into());
        self
    }

    pub fn active_when(mut self, predicate: impl Fn(&FormData) -> bool + Send + Sync + 'static) -> Self {
        self.active = Some(Arc::new(predicate));
        self
    }

    pub fn validate_with(mut self, validator: Arc<dyn FieldValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn next_with(
        mut self,
        next: impl Fn(Option<&FieldValue>, &FormData) -> NextStep + Send + Sync + 'static,
    ) -> Self {
        self.next = Some(Arc::new(next));
        self
    }

    pub fn define_with(mut self, definer: Arc<dyn FieldDefiner>) -> Self {
        self.definer = Some(definer);
        self
    }

    pub(crate) fn dependency_names(&self) -> &[String] {
        &self.dependencies
    }

    /// Compiles the declaration into a usable field.
    pub fn build(self, configuration: Arc<FormConfiguration>) -> Result<Field, FormBuildError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::empty_field("name").into());
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(ValidationError::invalid_limits(&self.name, min, max).into());
            }
        }
        if self.optional && !self.nullable && self.kind != FieldKind::Enumeration {
            return Err(FormBuildError::OptionalNotNullable(self.name));
        }
        if self.kind == FieldKind::Enumeration && self.choices.is_empty() && self.definer.is_none() {
            return Err(FormBuildError::NoChoices(self.name));
        }

        let description = self
            .description
            .clone()
            .unwrap_or_else(|| camel_case(&self.name));
        let terms = if self.terms.is_empty() {
            generate_terms(&description, MAX_GENERATED_PHRASE)
        } else {
            self.terms.clone()
        };
        let choices: Vec<Choice> = self
            .choices
            .iter()
            .cloned()
            .map(|mut choice| {
                if choice.terms.is_empty() {
                    choice.terms = generate_terms(&choice.description, MAX_GENERATED_PHRASE);
                }
                choice
            })
            .collect();

        let invalid_term = |source| FormBuildError::InvalidTerm {
            field: self.name.clone(),
            source,
        };
        let recognizer: Arc<dyn Recognize> = match self.kind {
            FieldKind::Enumeration => Arc::new(
                RecognizeEnumeration::new(
                    choices
                        .iter()
                        .map(|choice| {
                            EnumChoice::new(
                                MatchValue::Value(choice.value.clone()),
                                choice.description.clone(),
                                choice.terms.clone(),
                            )
                        })
                        .collect(),
                    EnumerationOptions {
                        allow_numbers: self.allow_numbers,
                        optional: self.optional,
                        multiple: self.multiple,
                        field_terms: terms.clone(),
                    },
                    configuration.clone(),
                )
                .map_err(invalid_term)?,
            ),
            kind => {
                let primitive = match kind {
                    FieldKind::Bool => PrimitiveKind::Bool,
                    FieldKind::Integer => PrimitiveKind::Integer {
                        min: self.min.map(|min| min.ceil() as i64),
                        max: self.max.map(|max| max.floor() as i64),
                    },
                    FieldKind::Double => PrimitiveKind::Double {
                        min: self.min,
                        max: self.max,
                    },
                    FieldKind::DateTime => PrimitiveKind::DateTime,
                    _ => PrimitiveKind::Text,
                };
                Arc::new(
                    RecognizePrimitive::new(primitive, self.optional, configuration.clone())
                        .map_err(invalid_term)?,
                )
            }
        };

        Ok(Field {
            declared: self.clone(),
            definition: self,
            description,
            terms,
            choices,
            recognizer,
            configuration,
        })
    }
}

/// A compiled field: definition plus recognizer.
#[derive(Clone)]
pub struct Field {
    /// Effective definition, possibly rewritten by a definer.
    definition: FieldBuilder,
    /// Definition as first declared; what the definer starts from.
    declared: FieldBuilder,
    description: String,
    terms: Vec<String>,
    choices: Vec<Choice>,
    recognizer: Arc<dyn Recognize>,
    configuration: Arc<FormConfiguration>,
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.definition.name)
            .field("kind", &self.definition.kind)
            .field("description", &self.description)
            .field("recognizer", &self.recognizer)
            .finish_non_exhaustive()
    }
}

impl Field {
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn kind(&self) -> FieldKind {
        self.definition.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn is_optional(&self) -> bool {
        self.definition.optional
    }

    pub fn is_nullable(&self) -> bool {
        self.definition.nullable
    }

    pub fn allows_multiple(&self) -> bool {
        self.definition.multiple
    }

    pub fn allow_numbers(&self) -> bool {
        self.definition.allow_numbers
    }

    pub fn feedback(&self) -> FeedbackOptions {
        self.definition.feedback
    }

    pub fn dependencies(&self) -> &[String] {
        &self.definition.dependencies
    }

    pub fn limits(&self) -> (Option<f64>, Option<f64>) {
        (self.definition.min, self.definition.max)
    }

    pub fn recognizer(&self) -> &dyn Recognize {
        self.recognizer.as_ref()
    }

    pub fn configuration(&self) -> &Arc<FormConfiguration> {
        &self.configuration
    }

    pub fn has_definer(&self) -> bool {
        self.definition.definer.is_some()
    }

    pub fn is_active(&self, data: &FormData) -> bool {
        self.definition.active.as_ref().map_or(true, |active| active(data))
    }

    pub fn value<'a>(&self, data: &'a FormData) -> Option<&'a FieldValue> {
        data.get(&self.definition.name)
    }

    pub fn set_value(&self, data: &mut FormData, value: FieldValue) {
        data.set(self.definition.name.clone(), value);
    }

    pub fn set_unknown(&self, data: &mut FormData) {
        data.unset(&self.definition.name);
    }

    pub fn is_unknown(&self, data: &FormData) -> bool {
        data.is_unknown(&self.definition.name)
    }

    /// True unless a numeric value falls outside the declared limits.
    pub fn within_limits(&self, value: &FieldValue) -> bool {
        match value.as_f64() {
            Some(number) => {
                self.definition.min.map_or(true, |min| number >= min)
                    && self.definition.max.map_or(true, |max| number <= max)
            }
            None => true,
        }
    }

    pub async fn validate(
        &self,
        data: &FormData,
        value: Option<&FieldValue>,
    ) -> Result<ValidateResult, HookError> {
        match &self.definition.validator {
            Some(validator) => validator.validate(data, value).await,
            None => Ok(ValidateResult::valid()),
        }
    }

    pub fn next(&self, value: Option<&FieldValue>, data: &FormData) -> NextStep {
        self.definition
            .next
            .as_ref()
            .map_or(NextStep::Next, |next| next(value, data))
    }

    /// Rebuilds the field from its declaration through the definer.
    ///
    /// Returns `None` when the definer deactivates the field for this pass.
    pub async fn redefine(&self, data: &FormData) -> Result<Option<Field>, FieldDefineError> {
        let Some(definer) = &self.declared.definer else {
            return Ok(Some(self.clone()));
        };
        let Some(builder) = definer.define(data, self.declared.clone()).await? else {
            return Ok(None);
        };
        let mut field = builder.build(self.configuration.clone())?;
        field.declared = self.declared.clone();
        Ok(Some(field))
    }

    pub fn template(&self, usage: TemplateUsage) -> &str {
        self.definition
            .templates
            .get(&usage)
            .map(String::as_str)
            .unwrap_or_else(|| self.configuration.template(usage))
    }

    pub fn describe(&self, value: &MatchValue) -> String {
        self.recognizer.value_description(value)
    }

    /// Description of the current value, or the "unspecified" label.
    pub fn describe_current(&self, data: &FormData) -> String {
        match self.value(data) {
            Some(value) => self.describe(&MatchValue::Value(value.clone())),
            None => self.template(TemplateUsage::Unspecified).to_string(),
        }
    }

    /// Arguments shared by every template rendered for this field.
    pub fn prompt_args(&self, data: &FormData) -> Vec<(String, String)> {
        let mut args: Vec<(String, String)> = Vec::with_capacity(data.len() + 4);
        let current = self
            .value(data)
            .map(|value| {
                format!(
                    " ({}: {})",
                    self.template(TemplateUsage::CurrentChoice).to_lowercase(),
                    self.describe(&MatchValue::Value(value.clone()))
                )
            })
            .unwrap_or_default();
        args.push(("field".to_string(), self.description.to_lowercase()));
        args.push((
            "choices".to_string(),
            self.configuration
                .list(&self.recognizer.value_descriptions()),
        ));
        args.push(("current".to_string(), current));
        args.push(("value".to_string(), self.describe_current(data)));
        args.extend(
            data.iter()
                .map(|(name, value)| (name.clone(), value.to_string())),
        );
        args
    }

    /// Renders `pattern` with this field's arguments plus `extra`.
    pub fn render(&self, pattern: &str, data: &FormData, extra: &[(&str, &str)]) -> String {
        let args = self.prompt_args(data);
        let mut pairs: Vec<(&str, &str)> = extra.to_vec();
        pairs.extend(args.iter().map(|(key, value)| (key.as_str(), value.as_str())));
        render(pattern, &pairs)
    }

    fn default_prompt_usage(&self) -> TemplateUsage {
        match self.definition.kind {
            FieldKind::Bool => TemplateUsage::Bool,
            FieldKind::Text => TemplateUsage::String,
            FieldKind::Integer => TemplateUsage::Integer,
            FieldKind::Double => TemplateUsage::Double,
            FieldKind::DateTime => TemplateUsage::DateTime,
            FieldKind::Enumeration if self.definition.multiple => TemplateUsage::EnumSelectMany,
            FieldKind::Enumeration => TemplateUsage::EnumSelectOne,
        }
    }

    /// The prompt asking for this field's value.
    pub fn prompt(&self, data: &FormData) -> FormPrompt {
        let pattern = match &self.definition.prompt {
            Some(pattern) => pattern.as_str(),
            None => self.template(self.default_prompt_usage()),
        };
        FormPrompt::new(self.render(pattern, data, &[])).with_buttons(self.recognizer.buttons())
    }
}

/// Failure while redefining a field.
#[derive(Debug, thiserror::Error)]
pub enum FieldDefineError {
    #[error(transparent)]
    Hook(#[from] HookError),

    #[error(transparent)]
    Build(#[from] FormBuildError),
}
