use chrono::Utc;
use clap::{Parser, Subcommand};

use mindcare_api::bootstrap::{self, BootstrapOutcome};
use mindcare_api::config::AppConfig;
use mindcare_api::database::store::CredentialStore;
use mindcare_api::database::PgCredentialStore;

/// Operational tasks for the mindcare API
#[derive(Parser)]
#[command(name = "mindcare", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the default super-admin if it does not exist
    Bootstrap,
    /// Show status and lockout details for an admin account
    CheckAdmin { email: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    let store = PgCredentialStore::connect(&config.database).await?;
    store.ensure_schema().await?;

    match cli.command {
        Command::Bootstrap => {
            let outcome = bootstrap::ensure_default_admin(
                &store,
                &config.bootstrap,
                config.security.bcrypt_cost,
            )
            .await?;
            match outcome {
                BootstrapOutcome::Created(admin) => {
                    println!("created default admin {} ({})", admin.email, admin.id);
                }
                BootstrapOutcome::Existing(admin) => {
                    println!("default admin already exists: {} ({})", admin.email, admin.id);
                }
            }
        }
        Command::CheckAdmin { email } => {
            match store.find_admin_by_email(&email).await? {
                Some(admin) => {
                    let now = Utc::now();
                    println!("id:             {}", admin.id);
                    println!("email:          {}", admin.email);
                    println!("username:       {}", admin.username);
                    println!("role:           {}", admin.role);
                    println!("active:         {}", admin.is_active);
                    println!("login attempts: {}", admin.login_attempts);
                    println!("locked:         {}", admin.is_locked(now));
                    if let Some(until) = admin.locked_until {
                        println!("locked until:   {}", until);
                    }
                    if let Some(last) = admin.last_login_at {
                        println!("last login:     {}", last);
                    }
                }
                None => {
                    eprintln!("no admin account for {}", email);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
