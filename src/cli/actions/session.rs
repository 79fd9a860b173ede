use anyhow::Result;

use crate::api::ApiClient;
use crate::cli::actions::Action;
use crate::config::AppConfig;
use crate::session::{Credentials, Role, SessionManager, SnapshotStore};

/// Handle a session action
pub async fn handle(action: Action, config: &AppConfig) -> Result<()> {
    config.validate()?;

    let api = ApiClient::new(config)?;
    let store = SnapshotStore::new(&config.snapshot_dir);
    let manager = SessionManager::new(api, store);

    match action {
        Action::Whoami => {
            manager.refresh().await;
            match manager.current().identity {
                Some(identity) => println!("{}", serde_json::to_string_pretty(&identity)?),
                None => println!("anonymous"),
            }
        }
        Action::Login {
            role,
            username_or_email,
            password,
        } => {
            let credentials = Credentials {
                username_or_email,
                password,
            };
            let identity = match role {
                Role::User => manager.signin_user(&credentials).await?,
                Role::Employer => manager.signin_employer(&credentials).await?,
                Role::Admin => manager.signin_admin(&credentials).await?,
            };
            println!("signed in as {} ({})", identity.name, identity.role);
        }
        Action::Signup {
            name,
            email,
            password,
        } => {
            let receipt = manager.signup(&name, &email, &password).await?;
            println!("{}", receipt.message);
        }
        Action::Logout => {
            manager.signout().await;
            println!("signed out");
        }
        Action::Forgot { email } => {
            println!("{}", manager.forgot_password(&email).await?);
        }
        Action::ResetPassword { token, password } => {
            if !manager.validate_reset_token(&token).await {
                anyhow::bail!("Reset token is invalid or expired");
            }
            println!("{}", manager.reset_password(&token, &password).await?);
        }
        Action::VerifyEmail { token } => {
            let outcome = manager.verify_email(&token).await?;
            println!("{}", outcome.message);
            if let Some(identity) = outcome.identity {
                println!("signed in as {} ({})", identity.name, identity.role);
            }
        }
    }

    Ok(())
}
