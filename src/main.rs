use std::io::{self, BufRead, Write};
use std::marker::PhantomData;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, Instrument};

use storefront_actions::action_framework::{ActionRequest, ActionResult, FormData, Resource};
use storefront_actions::app_system::{load_settings, setup_tracing, AdminSystem, Settings};
use storefront_actions::controller::storefront::CHECKOUT_PATH;
use storefront_actions::controller::{ActionController, Confirm, Control, EditSession, ResourceView};
use storefront_actions::domain::{Product, Transaction, User};
use storefront_actions::error::ActionError;
use storefront_actions::notifications::{Level, NotificationCenter};
use storefront_actions::validation::AccountForm;

#[derive(Parser)]
#[command(name = "storefront-admin")]
#[command(about = "Admin actions against a storefront REST API")]
#[command(version)]
struct Cli {
    #[arg(long, global = true, help = "API base URL (overrides storefront.toml and APP__BASE_URL)")]
    base_url: Option<String>,

    #[arg(long, global = true, help = "Delay before the list refresh, in milliseconds")]
    refresh_delay_ms: Option<u64>,

    #[arg(long, short = 'y', global = true, help = "Answer yes to delete and purchase confirmations")]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Product catalogue management")]
    Product {
        #[command(subcommand)]
        cmd: ProductCommands,
    },

    #[command(about = "User account management")]
    User {
        #[command(subcommand)]
        cmd: UserCommands,
    },

    #[command(about = "Payment transactions")]
    Transaction {
        #[command(subcommand)]
        cmd: TransactionCommands,
    },

    #[command(about = "Buy a product from the storefront after confirmation")]
    Purchase { product_id: i64 },

    #[command(about = "Submit the storefront login form")]
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },

    #[command(about = "Submit the storefront registration form")]
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        #[arg(long, help = "Accept the terms of use")]
        accept_terms: bool,
    },
}

#[derive(Subcommand)]
enum ProductCommands {
    #[command(about = "Load a product into the edit form and print it")]
    Show { id: i64 },

    #[command(about = "Create a product from --field key=value pairs")]
    Create {
        #[arg(long = "field", short = 'f', value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },

    #[command(about = "Load a product, apply --field overrides, and save it")]
    Update {
        id: i64,
        #[arg(long = "field", short = 'f', value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },

    #[command(about = "Delete a product after confirmation")]
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum UserCommands {
    #[command(about = "Load a user and print it")]
    Show { id: i64 },

    #[command(about = "Activate an inactive user or deactivate an active one")]
    ToggleStatus { id: i64 },
}

#[derive(Subcommand)]
enum TransactionCommands {
    #[command(about = "Load a transaction and print it")]
    Show { id: i64 },
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))
}

/// Edit form and list rendered on the terminal.
struct TerminalView<T: Resource> {
    form: FormData,
    overrides: FormData,
    _kind: PhantomData<T>,
}

impl<T: Resource> TerminalView<T> {
    fn new(overrides: FormData) -> Self {
        Self {
            form: FormData::new(),
            overrides,
            _kind: PhantomData,
        }
    }
}

impl<T: Resource> ResourceView<T> for TerminalView<T> {
    fn render(&mut self, record: &T) {
        self.form = record.to_form();
        match serde_json::to_string_pretty(record) {
            Ok(json) => println!("{json}"),
            Err(_) => println!("{record:?}"),
        }
    }

    fn read_form(&self) -> FormData {
        let mut form = self.form.clone();
        for (key, value) in self.overrides.iter() {
            form.insert(key, value);
        }
        form
    }

    fn reset_form(&mut self) {
        self.form = FormData::new();
    }

    fn reveal(&mut self) {}

    fn hide(&mut self) {}

    fn remove_row(&mut self, id: &T::Id) -> bool {
        println!("{} {id} removed", T::KIND);
        true
    }

    fn refresh(&mut self) {
        println!("{} list is out of date; reload it to see the change", T::KIND);
    }
}

/// Asks on stdin unless confirmations were pre-approved.
struct StdinConfirm {
    assume_yes: bool,
}

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{prompt}\n[s/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "s" | "sim" | "y" | "yes")
    }
}

fn controller<T: Resource>(
    client: &storefront_actions::action_framework::ResourceClient<T>,
    notifications: &NotificationCenter,
    settings: &Settings,
    assume_yes: bool,
    overrides: FormData,
) -> ActionController<T, TerminalView<T>> {
    ActionController::new(
        client.clone(),
        TerminalView::new(overrides),
        notifications.clone(),
        StdinConfirm { assume_yes },
    )
    .with_refresh_delay(settings.refresh_delay())
}

fn print_notifications(notifications: &NotificationCenter) {
    for notification in notifications.drain() {
        match notification.level {
            Level::Error | Level::Warning => eprintln!("{}", notification.text),
            Level::Success | Level::Info => println!("{}", notification.text),
        }
    }
}

/// Maps a settled action to an exit status. Local refusals were already explained.
fn exit_code(result: Result<ActionResult, ActionError>) -> ExitCode {
    match result {
        Ok(result) if result.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(ActionError::UserAborted) => {
            println!("Operação cancelada.");
            ExitCode::SUCCESS
        }
        Err(ActionError::Validation(_)) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, system: &AdminSystem, settings: &Settings, assume_yes: bool) -> ExitCode {
    let notifications = &system.notifications;

    let result = match command {
        Commands::Product { cmd } => {
            let overrides: FormData = match &cmd {
                ProductCommands::Create { fields } | ProductCommands::Update { fields, .. } => {
                    fields.iter().cloned().collect()
                }
                _ => FormData::new(),
            };
            let products = controller(&system.product_client, notifications, settings, assume_yes, overrides);
            let mut session = EditSession::<Product>::new();

            match cmd {
                ProductCommands::Show { id } => products.open_editor(&Control::new("Editar"), &mut session, id).await,
                ProductCommands::Create { .. } => {
                    products.open_blank(&mut session);
                    products.save(&Control::new("Salvar"), &mut session).await
                }
                ProductCommands::Update { id, .. } => {
                    let save = Control::new("Salvar");
                    match products.open_editor(&Control::new("Editar"), &mut session, id).await {
                        Ok(loaded) if loaded.is_success() => products.save(&save, &mut session).await,
                        other => other,
                    }
                }
                ProductCommands::Delete { id } => {
                    let request = match system.product_client.fetch(id).await {
                        Ok(product) => ActionRequest::<Product>::delete(id).map(|r| r.with_display_name(product.name)),
                        Err(_) => ActionRequest::<Product>::delete(id),
                    };
                    match request {
                        Ok(request) => products.trigger(&Control::new("Deletar"), request).await,
                        Err(err) => Err(err),
                    }
                }
            }
        }
        Commands::User { cmd } => {
            let users = controller(&system.user_client, notifications, settings, assume_yes, FormData::new());
            match cmd {
                UserCommands::Show { id } => match ActionRequest::<User>::read(id) {
                    Ok(request) => users.trigger(&Control::new("Ver"), request).await,
                    Err(err) => Err(err),
                },
                UserCommands::ToggleStatus { id } => match system.user_client.fetch(id).await {
                    Ok(user) => {
                        info!(user = %user.display_name(), active = user.is_active, "Toggling user status");
                        match ActionRequest::<User>::toggle_status(id, user.is_active) {
                            Ok(request) => users.trigger(&Control::new("Alternar status"), request).await,
                            Err(err) => Err(err),
                        }
                    }
                    Err(err) => Err(err),
                },
            }
        }
        Commands::Transaction { cmd } => {
            let transactions =
                controller(&system.transaction_client, notifications, settings, assume_yes, FormData::new());
            match cmd {
                TransactionCommands::Show { id } => match ActionRequest::<Transaction>::read(id) {
                    Ok(request) => transactions.trigger(&Control::new("Ver"), request).await,
                    Err(err) => Err(err),
                },
            }
        }
        Commands::Purchase { product_id } => {
            let shop = system.storefront(StdinConfirm { assume_yes });
            let result = shop.purchase(&Control::new("Comprar"), product_id).await;
            if matches!(&result, Ok(done) if done.is_success()) {
                println!("Continue em {CHECKOUT_PATH}");
            }
            result
        }
        Commands::Login { username, password } => {
            let form = AccountForm::Login { username, password };
            system.account_forms.submit(&Control::new("Entrar"), &form).await
        }
        Commands::Register {
            username,
            email,
            password,
            confirm_password,
            accept_terms,
        } => {
            let form = AccountForm::Register {
                username,
                email,
                password,
                confirm_password,
                accept_terms,
            };
            system.account_forms.submit(&Control::new("Criar conta"), &form).await
        }
    };

    print_notifications(notifications);
    exit_code(result)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    setup_tracing();
    let cli = Cli::parse();

    let mut settings = load_settings().context("failed to load settings")?;
    if let Some(base_url) = cli.base_url {
        settings.base_url = base_url;
    }
    if let Some(delay) = cli.refresh_delay_ms {
        settings.refresh_delay_ms = delay;
    }

    info!(base_url = %settings.base_url, "Starting storefront admin");
    let system = AdminSystem::new(&settings)?;

    let span = tracing::info_span!("command");
    let code = run(cli.command, &system, &settings, cli.yes).instrument(span).await;

    system.shutdown().await?;
    Ok(code)
}
