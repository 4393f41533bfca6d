use std::io::Read;
use std::path::PathBuf;

use clap::Args;
use renovia::accounts::{AccountError, NewUser, Role};
use renovia::app::AppContext;
use renovia::config::{AdminSeed, AppConfig};
use renovia::error::AppError;
use renovia::store::Database;
use renovia::telemetry;
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Args, Debug, Default)]
pub(crate) struct SeedArgs {
    /// CSV file with `name,email,password,role` columns to import as accounts
    #[arg(long)]
    pub(crate) users_csv: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct UserRow {
    name: String,
    email: String,
    password: String,
    #[serde(default)]
    role: Option<String>,
}

/// Parses the account import file. Rows without a role become agents.
pub(crate) fn read_users<R: Read>(reader: R) -> Result<Vec<NewUser>, AppError> {
    let mut table = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut users = Vec::new();

    for (index, row) in table.deserialize::<UserRow>().enumerate() {
        let line = index + 2;
        let row = row.map_err(|err| AppError::Input(format!("users csv line {line}: {err}")))?;
        let role = match row.role.as_deref().filter(|r| !r.is_empty()) {
            Some(raw) => raw
                .parse::<Role>()
                .map_err(|err| AppError::Input(format!("users csv line {line}: {err}")))?,
            None => Role::User,
        };
        users.push(NewUser {
            name: row.name,
            email: row.email,
            password: row.password,
            role,
        });
    }

    Ok(users)
}

pub(crate) async fn run_seed(args: SeedArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let users = match &args.users_csv {
        Some(path) => {
            let file = std::fs::File::open(path)?;
            read_users(file)?
        }
        None => Vec::new(),
    };

    let database = Database::connect(&config.database).await?;
    let ctx = AppContext::new(database.stores(), &config.auth, config.subsidy);

    let outcome = seed_accounts(&ctx, config.bootstrap_admin.as_ref(), users).await;
    database.shutdown().await;
    let (created, skipped) = outcome?;
    info!(created, skipped, "account import finished");
    Ok(())
}

/// Bootstrap administrator first, then the imported rows.
async fn seed_accounts(
    ctx: &AppContext,
    admin: Option<&AdminSeed>,
    users: Vec<NewUser>,
) -> Result<(usize, usize), AppError> {
    match admin {
        Some(seed) => {
            if ctx.accounts.ensure_admin(seed).await? {
                info!(email = %seed.email, "administrator created");
            } else {
                info!(email = %seed.email, "administrator already present");
            }
        }
        None if users.is_empty() => {
            warn!("nothing to seed: set APP_ADMIN_EMAIL/APP_ADMIN_PASSWORD or pass --users-csv");
        }
        None => {}
    }
    import_users(ctx, users).await
}

async fn import_users(ctx: &AppContext, users: Vec<NewUser>) -> Result<(usize, usize), AppError> {
    let (mut created, mut skipped) = (0, 0);
    for user in users {
        let email = user.email.clone();
        match ctx.accounts.create(user).await {
            Ok(account) => {
                created += 1;
                info!(email = %account.email, role = account.role.label(), "account imported");
            }
            Err(AccountError::EmailTaken) => {
                skipped += 1;
                info!(%email, "account already exists, skipping");
            }
            Err(AccountError::InvalidInput(reason)) => {
                skipped += 1;
                warn!(%email, %reason, "invalid account row, skipping");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok((created, skipped))
}
