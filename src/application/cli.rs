use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::Arg;
use clap::Command;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use dialoguer::Password;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::services::Credentials;
use crate::infrastructure::backends::AuthBackend;
use crate::infrastructure::backends::ChatsBackend;

fn subcommand_login() -> Command {
    return Command::new("login")
        .about("Authenticates against the backend and stores the access token.");
}

fn subcommand_logout() -> Command {
    return Command::new("logout").about("Clears stored credentials.");
}

fn subcommand_sessions() -> Command {
    return Command::new("sessions")
        .about("Lists chat sessions for the configured case, most recent first.");
}

fn subcommand_config() -> Command {
    return Command::new("config").about("Creates a default config file.");
}

pub fn build() -> Command {
    return Command::new("kantuta")
        .about("Terminal client for the Kantuta legal case-management AI. Chat with the agent backend, with per-case sessions and retrieval citations.")
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(false)
        .subcommand(subcommand_login())
        .subcommand(subcommand_logout())
        .subcommand(subcommand_sessions())
        .subcommand(subcommand_config())
        .arg(
            Arg::new("config-file")
                .short('c')
                .long("config-file")
                .env("KANTUTA_CONFIG_FILE")
                .num_args(1)
                .help(format!(
                    "Path to configuration file. [default: {}]",
                    Config::default(ConfigKey::ConfigFile)
                )),
        )
        .arg(
            Arg::new("api-url")
                .short('u')
                .long("api-url")
                .env("KANTUTA_API_URL")
                .num_args(1)
                .help("Base URL of the Kantuta backend API. [default: http://localhost:8000]"),
        )
        .arg(
            Arg::new("caso-id")
                .long("caso-id")
                .env("KANTUTA_CASO_ID")
                .num_args(1)
                .help("Case whose chat sessions are listed by /sessions and the sessions subcommand."),
        )
        .arg(
            Arg::new("request-timeout")
                .long("request-timeout")
                .env("KANTUTA_REQUEST_TIMEOUT")
                .num_args(1)
                .help("Timeout in milliseconds for non-streaming API requests. [default: 10000]"),
        )
        .arg(
            Arg::new("session-id")
                .short('s')
                .long("session-id")
                .env("KANTUTA_SESSION_ID")
                .num_args(1)
                .help("Chat session to resume. When unset, a transient general conversation thread is used."),
        )
        .arg(
            Arg::new("thread-id")
                .long("thread-id")
                .env("KANTUTA_THREAD_ID")
                .num_args(1)
                .help("Conversation thread for general chat. Generated per run when unset."),
        )
        .arg(
            Arg::new("username")
                .long("username")
                .env("KANTUTA_USERNAME")
                .num_args(1)
                .help("Your name displayed next to your messages."),
        );
}

async fn login() -> Result<()> {
    let username: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Usuario")
        .interact_text()?;
    let password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Contraseña")
        .interact()?;

    let auth = AuthBackend::from_config().login(&username, &password).await?;
    Credentials::default().save(&auth).await?;

    if let Some(user) = &auth.user {
        println!("Hola {nombre}, sesión iniciada.", nombre = user.nombre);
    }

    return Ok(());
}

async fn print_sessions_list() -> Result<()> {
    let caso_id = Config::get(ConfigKey::CasoID);
    if caso_id.is_empty() {
        bail!("No caso-id configured. Pass --caso-id or set it in the config file.");
    }

    let auth = Credentials::default().load().await?;
    let mut sessions = ChatsBackend::from_config(auth)
        .list_for_caso(caso_id.parse::<i64>()?)
        .await?;
    sessions.reverse();

    if sessions.is_empty() {
        println!("No hay sesiones para este caso todavía.");
    } else {
        let formatted = sessions
            .iter()
            .map(|session| {
                return session.describe();
            })
            .collect::<Vec<String>>();
        println!("{}", formatted.join("\n"));
    }

    return Ok(());
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if !config_file_path.parent().unwrap().exists() {
        fs::create_dir_all(config_file_path.parent().unwrap()).await?;
    }

    let mut file = fs::File::create(config_file_path.clone()).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    let config_path_display = config_file_path.as_os_str().to_str().unwrap();
    println!("Created default config file at {config_path_display}");
    return Ok(());
}

/// Returns true when the chat loop should start, false when a subcommand
/// handled the run entirely.
pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();
    Config::load(vec![&matches]).await?;

    // The general thread is scoped to this run, like a browser tab session.
    if Config::get(ConfigKey::ThreadID).is_empty() {
        Config::set(ConfigKey::ThreadID, &uuid::Uuid::new_v4().to_string());
    }

    match matches.subcommand() {
        Some(("login", _)) => {
            login().await?;
            return Ok(false);
        }
        Some(("logout", _)) => {
            Credentials::default().clear().await?;
            println!("Sesión cerrada.");
            return Ok(false);
        }
        Some(("sessions", _)) => {
            print_sessions_list().await?;
            return Ok(false);
        }
        Some(("config", _)) => {
            create_config_file().await?;
            return Ok(false);
        }
        _ => {
            return Ok(true);
        }
    }
}
