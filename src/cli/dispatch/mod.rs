use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;

use crate::cli::actions::Action;
use crate::session::Role;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    // Closure to return subcommand matches
    let sub_m = |subcommand| -> Result<&clap::ArgMatches> {
        matches
            .subcommand_matches(subcommand)
            .context("arguments not found")
    };

    let required = |matches: &clap::ArgMatches, name: &str| -> Result<String> {
        matches
            .get_one::<String>(name)
            .map(String::to_string)
            .ok_or_else(|| anyhow!("missing required argument: {name}"))
    };

    match matches.subcommand_name() {
        Some("whoami") => Ok(Action::Whoami),
        Some("login") => {
            let matches = sub_m("login")?;
            let role = required(matches, "role")?
                .parse::<Role>()
                .map_err(|err| anyhow!(err))?;
            Ok(Action::Login {
                role,
                username_or_email: required(matches, "username")?,
                password: SecretString::from(required(matches, "password")?),
            })
        }
        Some("signup") => {
            let matches = sub_m("signup")?;
            Ok(Action::Signup {
                name: required(matches, "name")?,
                email: required(matches, "email")?,
                password: SecretString::from(required(matches, "password")?),
            })
        }
        Some("logout") => Ok(Action::Logout),
        Some("forgot") => {
            let matches = sub_m("forgot")?;
            Ok(Action::Forgot {
                email: required(matches, "email")?,
            })
        }
        Some("reset-password") => {
            let matches = sub_m("reset-password")?;
            Ok(Action::ResetPassword {
                token: required(matches, "token")?,
                password: SecretString::from(required(matches, "password")?),
            })
        }
        Some("verify-email") => {
            let matches = sub_m("verify-email")?;
            Ok(Action::VerifyEmail {
                token: required(matches, "token")?,
            })
        }
        _ => Err(anyhow!("no command provided")),
    }
}
