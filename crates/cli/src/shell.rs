//! Interactive session shell
//!
//! One shell is one client session, the way one browser tab is: the cookie
//! jar lives as long as the process and the cached session is shared
//! through the data directory.

use anyhow::{Result, anyhow};
use portal_session::{
    LoginRequest, Location, Navigator, PasswordChangeRequest, Portal, Session, SignupRequest,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

const HELP: &str = "\
Commands:
  login <email>                  log in (prompts for the password)
  signup <name> <email> <phone>  create an account (prompts for the password)
  logout                         end the session
  check | whoami                 confirm the session with the server
  refresh                        renew the session cookie
  password                       change the password
  goto <path>                    navigate, subject to the route guard
  status                         show the session and current location
  history                        list committed navigations
  help                           show this help
  quit | exit                    leave the shell";

/// One parsed shell line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Login { email: String },
    Signup { name: String, email: String, phone: String },
    Logout,
    Check,
    Refresh,
    Password,
    Goto { path: String },
    Status,
    History,
    Help,
    Quit,
    Empty,
}

impl ShellCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(Self::Empty);
        };
        let args: Vec<&str> = words.collect();

        let command = match (verb, args.as_slice()) {
            ("login", [email]) => Self::Login {
                email: (*email).to_string(),
            },
            ("signup", [name, email, phone]) => Self::Signup {
                name: (*name).to_string(),
                email: (*email).to_string(),
                phone: (*phone).to_string(),
            },
            ("logout", []) => Self::Logout,
            ("check" | "whoami", []) => Self::Check,
            ("refresh", []) => Self::Refresh,
            ("password", []) => Self::Password,
            ("goto", [path]) => Self::Goto {
                path: (*path).to_string(),
            },
            ("status", []) => Self::Status,
            ("history", []) => Self::History,
            ("help" | "?", []) => Self::Help,
            ("quit" | "exit", []) => Self::Quit,
            (
                "login" | "signup" | "logout" | "check" | "whoami" | "refresh" | "password"
                | "goto" | "status" | "history" | "help" | "?" | "quit" | "exit",
                _,
            ) => return Err(format!("wrong arguments for '{verb}', try 'help'")),
            _ => return Err(format!("unknown command '{verb}', try 'help'")),
        };
        Ok(command)
    }
}

/// Render the session for display
pub fn describe_session(session: &Session) -> String {
    let mut out = match session.user() {
        Some(user) => format!(
            "signed in as {} ({}, role {})",
            user.masked_name, user.email, user.role
        ),
        None => "signed out".to_string(),
    };
    if let Some(error) = session.last_error() {
        out.push_str(&format!("\nlast error: {error}"));
    }
    out
}

pub struct Shell {
    portal: Portal,
}

impl Shell {
    pub const fn new(portal: Portal) -> Self {
        Self { portal }
    }

    /// Open the app at its home page, then read commands until EOF or quit
    pub async fn run(self) -> Result<()> {
        let home = self.portal.store.routes().home_path.clone();
        let landed = self.portal.router.navigate(&self.portal.store, home.as_str()).await;
        println!("{}", describe_session(&self.portal.store.session()));
        println!("at {landed}");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        loop {
            stdout.write_all(b"portal> ").await?;
            stdout.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            match ShellCommand::parse(&line) {
                Ok(ShellCommand::Quit) => break,
                Ok(command) => {
                    if let Err(err) = self.execute(command).await {
                        println!("error: {err}");
                    }
                }
                Err(message) => println!("{message}"),
            }

            if let Some(landed) = self.portal.settle().await {
                println!("at {landed}");
            }
        }

        Ok(())
    }

    async fn execute(&self, command: ShellCommand) -> Result<()> {
        debug!(?command, "shell command");
        let store = &self.portal.store;

        match command {
            ShellCommand::Login { email } => {
                let password = prompt_secret("Password: ").await?;
                let user = store.login(LoginRequest::new(email, password)).await?;
                println!("welcome, {}", user.masked_name);
            }
            ShellCommand::Signup { name, email, phone } => {
                let password = prompt_secret("Password: ").await?;
                let fields = SignupRequest {
                    name,
                    email,
                    password,
                    phone,
                    ..SignupRequest::default()
                };
                let user = store.signup(fields).await?;
                println!("account created for {}", user.email);
            }
            ShellCommand::Logout => {
                store.logout().await;
                println!("signed out");
            }
            ShellCommand::Check => {
                let user = store.check_auth().await?;
                println!("signed in as {} ({})", user.masked_name, user.email);
            }
            ShellCommand::Refresh => {
                store.refresh_token().await?;
                println!("session refreshed");
            }
            ShellCommand::Password => {
                let request = PasswordChangeRequest {
                    current_password: prompt_secret("Current password: ").await?,
                    new_password: prompt_secret("New password: ").await?,
                    confirm_password: prompt_secret("Confirm new password: ").await?,
                };
                store.change_password(request).await?;
                println!("password changed");
            }
            ShellCommand::Goto { path } => {
                let landed = self
                    .portal
                    .router
                    .navigate(store, Location::parse(&path))
                    .await;
                println!("at {landed}");
            }
            ShellCommand::Status => {
                println!("{}", describe_session(&store.session()));
                println!("at {}", self.portal.router.current());
            }
            ShellCommand::History => {
                for location in self.portal.router.history() {
                    println!("  {location}");
                }
            }
            ShellCommand::Help => println!("{HELP}"),
            ShellCommand::Quit | ShellCommand::Empty => {}
        }

        Ok(())
    }
}

async fn prompt_secret(prompt: &'static str) -> Result<String> {
    tokio::task::spawn_blocking(move || rpassword::prompt_password(prompt))
        .await
        .map_err(|e| anyhow!("password prompt failed: {e}"))?
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            ShellCommand::parse("login a@b.com"),
            Ok(ShellCommand::Login {
                email: "a@b.com".to_string()
            })
        );
        assert_eq!(
            ShellCommand::parse("  goto   /reports?tab=2 "),
            Ok(ShellCommand::Goto {
                path: "/reports?tab=2".to_string()
            })
        );
        assert_eq!(ShellCommand::parse("whoami"), Ok(ShellCommand::Check));
        assert_eq!(ShellCommand::parse("exit"), Ok(ShellCommand::Quit));
        assert_eq!(ShellCommand::parse(""), Ok(ShellCommand::Empty));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(ShellCommand::parse("login").unwrap_err().contains("wrong arguments"));
        assert!(ShellCommand::parse("signup kim").is_err());
        assert!(ShellCommand::parse("dance").unwrap_err().contains("unknown command"));
    }

    #[test]
    fn test_describe_signed_out_session() {
        assert_eq!(describe_session(&Session::default()), "signed out");
    }
}
