//! Admin command - bootstrap administrator accounts.
//!
//! ```bash
//! ADMIN_PASSWORD=... order-eat admin create --email root@ordereat.vn
//! ```

use validator::ValidateEmail;

use crate::cli::args::{AdminAction, AdminArgs};
use crate::config::Config;
use crate::domain::UserRole;
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, Persistence};
use crate::services::{create_account, Registration};

/// Execute the admin command
pub async fn execute(args: AdminArgs, config: Config) -> AppResult<()> {
    match args.action {
        AdminAction::Create {
            email,
            password,
            name,
        } => create_admin(&config, email, password, name).await,
    }
}

async fn create_admin(
    config: &Config,
    email: String,
    password: String,
    name: String,
) -> AppResult<()> {
    if !email.validate_email() {
        return Err(AppError::validation("Invalid email format"));
    }

    let db = Database::connect(config).await?;
    let uow = Persistence::new(db.get_connection());

    let user = create_account(
        &uow,
        Registration {
            email,
            password,
            name,
            phone: None,
            address: None,
        },
        UserRole::Admin,
    )
    .await?;

    println!("Created admin {} ({})", user.email, user.id);
    Ok(())
}
