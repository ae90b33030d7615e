//! Session command handlers.

use secrecy::SecretString;
use serde::Serialize;

use catalog_core::AuthState;

use crate::cli::{AuthArgs, AuthCommand, GlobalOpts};
use crate::config::Connection;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct SessionView {
    profile: String,
    api_url: String,
    state: AuthState,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<serde_json::Value>,
}

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

pub async fn handle(conn: &Connection, args: AuthArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let catalog = &conn.catalog;
    match args.command {
        AuthCommand::Login { username } => {
            let username = match username {
                Some(u) => u,
                None => match catalog_config::resolve_username(&conn.profile, &conn.profile_name) {
                    Ok(u) => u,
                    Err(_) => dialoguer::Input::new()
                        .with_prompt("Username")
                        .interact_text()
                        .map_err(prompt_err)?,
                },
            };
            let password = match catalog_config::resolve_password(&conn.profile, &conn.profile_name)
            {
                Ok(pw) => pw,
                Err(_) => SecretString::from(
                    rpassword::prompt_password("Password: ").map_err(prompt_err)?,
                ),
            };

            catalog.sign_in(&username, &password).await?;
            output::status(global, &format!("Signed in as {username}"));
            Ok(())
        }

        AuthCommand::Logout => {
            catalog.logout().await;
            output::status(global, "Signed out");
            Ok(())
        }

        AuthCommand::Status => {
            let view = SessionView {
                profile: conn.profile_name.clone(),
                api_url: conn.profile.api_url.clone(),
                state: catalog.auth_state(),
                user: catalog.session().user(),
            };
            let out = output::render_single(
                &global.output,
                &view,
                |v| {
                    let who = v
                        .user
                        .as_ref()
                        .and_then(|u| u.get("username").or_else(|| u.get("name")))
                        .and_then(serde_json::Value::as_str)
                        .map(|name| format!(" as {name}"))
                        .unwrap_or_default();
                    format!("Profile:  {}\nAPI:      {}\nSession:  {}{who}", v.profile, v.api_url, v.state)
                },
                |v| v.state.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
