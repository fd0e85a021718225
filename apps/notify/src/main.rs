//! Notify
//!
//! Sends one business event to every member of a team, writing activities
//! to Postgres and emails through Resend.

use clap::{Parser, Subcommand};
use core_config::database::DatabaseConfig;
use core_config::email::EmailConfig;
use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::{Environment, FromEnv};
use domain_notifications::{
    EmailProvider, MockEmailProvider, NotificationServiceConfig, Notifications,
    PgNotificationStore, ResendProvider, handlers,
};
use eyre::{Result, WrapErr};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

mod send;

use send::{SendArgs, parse_header};

#[derive(Parser)]
#[command(name = "notify")]
#[command(about = "Dispatch team notifications")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch one event to a team
    Send {
        /// Notification type tag, e.g. invoice_paid
        #[arg(short = 't', long = "type")]
        notification_type: String,

        /// Team id
        #[arg(long)]
        team: Uuid,

        /// Event payload as JSON, or @path to read it from a file
        #[arg(short, long)]
        payload: String,

        /// Also send emails
        #[arg(long)]
        send_email: bool,

        /// Priority for every activity (1-10)
        #[arg(long)]
        priority: Option<u8>,

        /// Sender override
        #[arg(long)]
        from: Option<String>,

        /// Reply-to override
        #[arg(long)]
        reply_to: Option<String>,

        /// Extra email header, NAME=VALUE. Repeatable.
        #[arg(long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,

        /// Render emails but do not hand them to the provider
        #[arg(long)]
        dry_run: bool,
    },

    /// List notification types, their defaults and settings channels
    Types,

    /// Apply pending database migrations
    Migrate,
}

async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(&config.url);
    options.max_connections(config.max_connections);

    Database::connect(options)
        .await
        .wrap_err("Database connection failed")
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let environment = Environment::from_env();
    init_tracing(&environment);

    let cli = Cli::parse();

    match cli.command {
        Commands::Send {
            notification_type,
            team,
            payload,
            send_email,
            priority,
            from,
            reply_to,
            headers,
            dry_run,
        } => {
            let args = SendArgs {
                notification_type,
                team_id: team,
                payload,
                send_email,
                priority,
                from,
                reply_to,
                headers,
            };
            let payload = args.load_payload()?;
            let options = args.options();

            let db = connect(&DatabaseConfig::from_env()?).await?;
            let store = Arc::new(PgNotificationStore::new(db));

            let mock = Arc::new(MockEmailProvider::new());
            let provider: Arc<dyn EmailProvider>;
            let config;
            if dry_run {
                provider = mock.clone();
                config = NotificationServiceConfig::default();
            } else {
                let email = EmailConfig::from_env()?;
                provider = Arc::new(ResendProvider::new(&email));
                config = NotificationServiceConfig::from_email_config(&email);
            }

            let notifications = Notifications::new(store, provider, config)?;
            let result = notifications
                .create(&args.notification_type, args.team_id, payload, options)
                .await
                .wrap_err_with(|| format!("Failed to dispatch {}", args.notification_type))?;

            println!("{}", serde_json::to_string_pretty(&result)?);

            if dry_run {
                for email in mock.sent_emails().await {
                    info!(to = %email.to, subject = %email.subject, "Would send email");
                }
            }
        }

        Commands::Types => {
            for handler in handlers::all() {
                let channels = handler
                    .channels
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                println!(
                    "{:<32} priority={:<2} email={:<5} settings={:<5} channels={}",
                    handler.notification_type.to_string(),
                    handler.default_priority,
                    handler.supports_email,
                    handler.show_in_settings,
                    channels
                );
            }
        }

        Commands::Migrate => {
            let db = connect(&DatabaseConfig::from_env()?).await?;
            info!("Running migrations");
            Migrator::up(&db, None)
                .await
                .wrap_err("Migration failed")?;
            info!("Migrations complete");
        }
    }

    Ok(())
}
