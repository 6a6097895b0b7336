//! Console demo: order a pizza through a conversational form.
//!
//! Arguments of the form `Field=text` pre-fill answers, e.g.
//! `formflow Size=large "Toppings=ham and olives"`.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use formflow::adapters::{ConsoleChannel, FileFormStore, InMemoryFormStore};
use formflow::application::{
    EntityInput, FormDialog, ProcessTurnCommand, ProcessTurnHandler, ProcessTurnResult,
};
use formflow::config::{AppConfig, StorageBackend};
use formflow::domain::form::{
    Choice, FieldBuilder, Form, FormBuildError, FormConfiguration, FormOptions, HookError,
    ValidateFn, ValidateResult,
};
use formflow::domain::foundation::{ConversationId, FieldValue, FormData};
use formflow::ports::{CompletionHandler, FormStateStore};

fn pizza_form(
    configuration: FormConfiguration,
    options: FormOptions,
) -> Result<Form, FormBuildError> {
    let no_pineapple = ValidateFn(|_: &FormData, value: Option<&FieldValue>| {
        let has_pineapple = value
            .cloned()
            .map(FieldValue::into_items)
            .unwrap_or_default()
            .iter()
            .any(|item| item.as_text() == Some("Pineapple"));
        if has_pineapple {
            ValidateResult::invalid("Sorry, we are out of pineapple.")
        } else {
            ValidateResult::valid()
        }
    });

    Form::builder()
        .with_configuration(configuration)
        .with_options(options)
        .message("Welcome to the pizza bot! Type \"help\" at any time.")
        .field(
            FieldBuilder::enumeration("Size")
                .choices(["Large", "Medium", "Small"].map(Choice::named)),
        )
        .field(
            FieldBuilder::enumeration("Kind")
                .description("kind of pizza")
                .choices([
                    Choice::named("Margherita"),
                    Choice::named("Chicken Alfredo"),
                    Choice::named("BBQ Chicken"),
                    Choice::named("Veggie"),
                ]),
        )
        .field(
            FieldBuilder::enumeration("Toppings")
                .multiple()
                .optional()
                .choices(["Ham", "Olives", "Mushrooms", "Pineapple"].map(Choice::named))
                .validate_with(Arc::new(no_pineapple)),
        )
        .field(FieldBuilder::integer("Count").description("number of pizzas").limits(1.0, 10.0))
        .field(FieldBuilder::text("Name"))
        .confirm("Is this your order?\n{*}")
        .message("Thanks {Name}, your order is on its way!")
        .build()
}

/// Logs the finished order.
struct OrderPlaced;

#[async_trait]
impl CompletionHandler for OrderPlaced {
    async fn on_completion(&self, data: &FormData) -> Result<(), HookError> {
        let fields: Vec<String> = data.iter().map(|(name, value)| format!("{name}={value}")).collect();
        info!(order = %fields.join(", "), "Order placed");
        Ok(())
    }
}

fn entities_from_args() -> Vec<EntityInput> {
    std::env::args()
        .skip(1)
        .filter_map(|arg| {
            let (step, text) = arg.split_once('=')?;
            Some(EntityInput::new(step.trim(), text.trim()))
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    config.logging.init()?;

    let store: Arc<dyn FormStateStore> = match config.storage.backend {
        StorageBackend::Memory => Arc::new(InMemoryFormStore::new()),
        StorageBackend::File => Arc::new(FileFormStore::new(&config.storage.path)),
    };
    let form = Arc::new(pizza_form(config.form.clone(), config.options)?);
    let dialog = FormDialog::new(form, Arc::new(ConsoleChannel::stdout()))
        .with_completion(Arc::new(OrderPlaced));
    let handler = ProcessTurnHandler::new(Arc::new(dialog), store);

    let conversation_id = ConversationId::new();
    info!(%conversation_id, "Conversation started");

    let mut command = ProcessTurnCommand {
        conversation_id,
        text: None,
        entities: entities_from_args(),
        data: FormData::new(),
    };
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match handler.handle(command).await? {
            ProcessTurnResult::AwaitingInput { .. } => {}
            ProcessTurnResult::Completed { .. } => break,
            ProcessTurnResult::Canceled(canceled) => {
                info!(step = %canceled.last_step, reason = ?canceled.reason, "Order canceled");
                break;
            }
        }
        let Some(line) = lines.next_line().await? else {
            break;
        };
        command = ProcessTurnCommand::message(conversation_id, line);
    }
    Ok(())
}
