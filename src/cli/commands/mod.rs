use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ArgAction, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

fn password_arg() -> Arg {
    Arg::new("password")
        .long("password")
        .help("Password (prefer ARKWORK_PASSWORD over the flag)")
        .env("ARKWORK_PASSWORD")
        .hide_env_values(true)
        .required(true)
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("arkwork-session")
        .about("ArkWork job platform session client")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .help("Backend base URL")
                .default_value("http://localhost:4000")
                .env("ARKWORK_API_BASE_URL")
                .global(true),
        )
        .arg(
            Arg::new("snapshot-dir")
                .long("snapshot-dir")
                .help("Directory holding the session snapshot slot")
                .env("ARKWORK_SNAPSHOT_DIR")
                .global(true),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("ARKWORK_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(validator_log_level()),
        )
        .subcommand(Command::new("whoami").about("Resolve and print the current identity"))
        .subcommand(
            Command::new("login")
                .about("Sign in and establish a session")
                .arg(
                    Arg::new("role")
                        .long("role")
                        .help("Account role to sign in as")
                        .default_value("user")
                        .value_parser(["user", "employer", "admin"]),
                )
                .arg(
                    Arg::new("username")
                        .help("Username or email")
                        .required(true),
                )
                .arg(password_arg()),
        )
        .subcommand(
            Command::new("signup")
                .about("Register a new user account")
                .arg(
                    Arg::new("name")
                        .long("name")
                        .help("Display name")
                        .required(true),
                )
                .arg(Arg::new("email").help("Email address").required(true))
                .arg(password_arg()),
        )
        .subcommand(Command::new("logout").about("Sign out and clear the cached session"))
        .subcommand(
            Command::new("forgot")
                .about("Request a password-reset email")
                .arg(Arg::new("email").help("Email address").required(true)),
        )
        .subcommand(
            Command::new("reset-password")
                .about("Set a new password using a reset token")
                .arg(Arg::new("token").help("Reset token").required(true))
                .arg(password_arg()),
        )
        .subcommand(
            Command::new("verify-email")
                .about("Verify an email address with a token")
                .arg(Arg::new("token").help("Verification token").required(true)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "arkwork-session");
        assert_eq!(
            command.get_about().unwrap().to_string(),
            "ArkWork job platform session client"
        );
        assert_eq!(
            command.get_version().unwrap().to_string(),
            env!("CARGO_PKG_VERSION")
        );
    }

    #[test]
    fn test_login_args() {
        let command = new();
        let matches = command.get_matches_from(vec![
            "arkwork-session",
            "--api-url",
            "https://api.arkwork.dev",
            "login",
            "--role",
            "employer",
            "jobs@corp.example",
            "--password",
            "hunter2",
        ]);

        assert_eq!(
            matches.get_one::<String>("api-url").map(String::as_str),
            Some("https://api.arkwork.dev")
        );
        let (name, sub) = matches.subcommand().expect("subcommand");
        assert_eq!(name, "login");
        assert_eq!(
            sub.get_one::<String>("role").map(String::as_str),
            Some("employer")
        );
        assert_eq!(
            sub.get_one::<String>("username").map(String::as_str),
            Some("jobs@corp.example")
        );
    }

    #[test]
    fn test_login_rejects_unknown_role() {
        let command = new();
        let result = command.try_get_matches_from(vec![
            "arkwork-session",
            "login",
            "--role",
            "superuser",
            "jane",
            "--password",
            "pw",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_env_fallbacks() {
        temp_env::with_vars(
            [
                ("ARKWORK_API_BASE_URL", Some("https://api.arkwork.dev")),
                ("ARKWORK_PASSWORD", Some("hunter2")),
                ("ARKWORK_LOG_LEVEL", Some("info")),
            ],
            || {
                let command = new();
                let matches =
                    command.get_matches_from(vec!["arkwork-session", "login", "jane@x.com"]);

                assert_eq!(
                    matches.get_one::<String>("api-url").map(String::as_str),
                    Some("https://api.arkwork.dev")
                );
                assert_eq!(matches.get_one::<u8>("verbosity").copied(), Some(2));
                let (_, sub) = matches.subcommand().expect("subcommand");
                assert_eq!(
                    sub.get_one::<String>("password").map(String::as_str),
                    Some("hunter2")
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("ARKWORK_LOG_LEVEL", Some(level))], || {
                let command = new();
                let matches = command.get_matches_from(vec!["arkwork-session", "whoami"]);
                assert_eq!(
                    matches.get_one::<u8>("verbosity").copied(),
                    Some(index as u8)
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, _) in levels.iter().enumerate() {
            temp_env::with_vars([("ARKWORK_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["arkwork-session".to_string()];
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }
                args.push("whoami".to_string());

                let command = new();
                let matches = command.get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>("verbosity").copied(),
                    Some(index as u8)
                );
            });
        }
    }
}
