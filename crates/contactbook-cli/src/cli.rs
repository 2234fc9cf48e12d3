//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// contactbook - manage a file-backed contact list
#[derive(Parser, Debug)]
#[command(
    name = "contactbook",
    version,
    about = "Manage a file-backed contact list",
    after_help = CLI_AFTER_HELP
)]
pub struct Cli {
    /// Config file (default: $CONTACTBOOK_CONFIG, then ./contactbook.toml)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Backing file, overriding the configured data_file
    #[arg(long, value_name = "PATH", global = true)]
    pub data: Option<PathBuf>,

    /// Override a config field (repeatable)
    #[arg(
        long = "set",
        value_name = "KEY=VALUE",
        value_parser = parse_pair,
        global = true
    )]
    pub overrides: Vec<(String, String)>,

    /// Print records as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Create an empty backing file if none exists
    Init,
    /// List contacts, optionally filtered by a substring of any field
    List { query: Option<String> },
    /// Show one contact
    Show {
        #[arg(allow_negative_numbers = true)]
        id: i64,
    },
    /// Add a contact from FIELD=VALUE pairs (first, last, phone, email)
    Add {
        #[arg(value_name = "FIELD=VALUE", value_parser = parse_pair)]
        fields: Vec<(String, String)>,
    },
    /// Change fields of an existing contact
    Edit {
        #[arg(allow_negative_numbers = true)]
        id: i64,
        #[arg(value_name = "FIELD=VALUE", value_parser = parse_pair)]
        fields: Vec<(String, String)>,
    },
    /// Delete a contact
    Delete {
        #[arg(allow_negative_numbers = true)]
        id: i64,
    },
    /// Print resolved config fields (all, or the one named)
    Config { field: Option<String> },
    /// Report whether an email is free (ignoring contact --exclude)
    CheckEmail {
        email: String,
        #[arg(long, value_name = "ID", default_value_t = 0)]
        exclude: i64,
    },
}

impl Command {
    /// Commands that rewrite the backing file and so take the lock.
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            Command::Init | Command::Add { .. } | Command::Edit { .. } | Command::Delete { .. }
        )
    }
}

const CLI_AFTER_HELP: &str = "\
EXIT STATUS:
  0  success
  1  internal error (unreadable or unwritable backing file, bad config)
  2  contact not found
  3  submitted fields failed validation

EXAMPLES:
  contactbook init
  contactbook add first=Ada last=Lovelace phone=555-0100 email=ada@x.io
  contactbook list love
  contactbook edit 1 phone=555-0199";

fn parse_pair(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("contactbook").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            parse_pair("email=a=b@x.io").unwrap(),
            ("email".to_string(), "a=b@x.io".to_string())
        );
        assert_eq!(
            parse_pair("phone=").unwrap(),
            ("phone".to_string(), String::new())
        );
        assert!(parse_pair("phone").is_err());
    }

    #[test]
    fn test_add_collects_fields() {
        let cli = parse(&["add", "first=Ada", "last=Lovelace"]);
        assert_eq!(
            cli.command,
            Command::Add {
                fields: vec![
                    ("first".to_string(), "Ada".to_string()),
                    ("last".to_string(), "Lovelace".to_string()),
                ]
            }
        );
        assert!(cli.command.mutates());
    }

    #[test]
    fn test_negative_id_is_accepted() {
        let cli = parse(&["show", "-3"]);
        assert_eq!(cli.command, Command::Show { id: -3 });
        assert!(!cli.command.mutates());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["list", "ada", "--json", "--set", "log_level=debug"]);
        assert!(cli.json);
        assert_eq!(
            cli.overrides,
            vec![("log_level".to_string(), "debug".to_string())]
        );
        assert_eq!(
            cli.command,
            Command::List {
                query: Some("ada".to_string())
            }
        );
    }

    #[test]
    fn test_check_email_default_exclude() {
        let cli = parse(&["check-email", "ada@x.io"]);
        assert_eq!(
            cli.command,
            Command::CheckEmail {
                email: "ada@x.io".to_string(),
                exclude: 0
            }
        );
    }

    #[test]
    fn test_config_command() {
        let cli = parse(&["config", "data_file"]);
        assert_eq!(
            cli.command,
            Command::Config {
                field: Some("data_file".to_string())
            }
        );
        assert!(!cli.command.mutates());
    }

    #[test]
    fn test_bad_pair_is_rejected() {
        assert!(Cli::try_parse_from(["contactbook", "add", "first"]).is_err());
    }
}
