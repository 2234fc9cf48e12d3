// contactbook-cli: command-line front end for the contact store
// Argument parsing, lock handling, exit status mapping

mod cli;
mod output;

use clap::Parser;
use cli::{Cli, Command};
use contactbook_core::safe_io::{FileLock, atomic_write};
use contactbook_core::{
    Config, ConfigError, ContactForm, FieldErrors, RecordStore, StoreError, Submission,
};
use output::{OutputHandler, format_field_errors};
use std::io;
use std::process::ExitCode;

const EXIT_INTERNAL: u8 = 1;
const EXIT_NOT_FOUND: u8 = 2;
const EXIT_INVALID: u8 = 3;

/// Why a command did not succeed, grouped by how the user is told.
enum Failure {
    NotFound(i64),
    Invalid(FieldErrors),
    Internal(Box<dyn std::error::Error>),
}

impl From<StoreError> for Failure {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Failure::NotFound(id),
            other => Failure::Internal(Box::new(other)),
        }
    }
}

impl From<io::Error> for Failure {
    fn from(err: io::Error) -> Self {
        Failure::Internal(Box::new(err))
    }
}

fn resolve_config(cli: &Cli) -> Result<Config, ConfigError> {
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_overrides_from_pairs(&cli.overrides)?;
    if let Some(data) = &cli.data {
        config.data_file = data.clone();
    }
    Ok(config)
}

fn init_logging(config: &Config) {
    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .format_timestamp(None)
    .init();
}

fn lock(config: &Config) -> io::Result<FileLock> {
    let path = config.lock_path();
    if let Some(held) = FileLock::try_acquire(&path)? {
        return Ok(held);
    }
    log::info!("waiting for lock {}", path.display());
    FileLock::acquire(&path)
}

fn open(config: &Config) -> Result<RecordStore, Failure> {
    Ok(RecordStore::open(&config.data_file)?)
}

fn submission_result(submission: Submission, out: &OutputHandler) -> Result<(), Failure> {
    match submission {
        Submission::Accepted(record) => {
            out.record(&record)?;
            Ok(())
        }
        Submission::Rejected(form) => Err(Failure::Invalid(form.errors)),
    }
}

fn run(cli: &Cli, config: &Config) -> Result<(), Failure> {
    let out = OutputHandler::new(cli.json);
    let _lock = if cli.command.mutates() {
        Some(lock(config)?)
    } else {
        None
    };

    match &cli.command {
        Command::Init => {
            if config.data_file.exists() {
                out.message(&format!("{} already exists", config.data_file.display()))?;
            } else {
                atomic_write(&config.data_file, b"[]\n")?;
                out.message(&format!("created {}", config.data_file.display()))?;
            }
        }
        Command::List { query } => out.records(&open(config)?.get_all(query.as_deref()))?,
        Command::Show { id } => {
            if *id < 1 {
                return Err(Failure::NotFound(*id));
            }
            out.record(&open(config)?.get(*id)?)?;
        }
        Command::Add { fields } => {
            let store = open(config)?;
            let form = ContactForm::decode(fields.iter().map(|(k, v)| (k, v.clone())));
            submission_result(store.submit_new(form)?, &out)?;
        }
        Command::Edit { id, fields } => {
            if *id < 1 {
                return Err(Failure::NotFound(*id));
            }
            let store = open(config)?;
            let mut form = ContactForm::from_record(&store.get(*id)?);
            form.apply(fields.iter().map(|(k, v)| (k, v.clone())));
            submission_result(store.submit_edit(*id, form)?, &out)?;
        }
        Command::Delete { id } => {
            if *id < 1 {
                return Err(Failure::NotFound(*id));
            }
            open(config)?.delete(*id)?;
            out.message(&format!("deleted {}", id))?;
        }
        Command::Config { field: Some(field) } => match config.get_field(field) {
            Some(value) => out.message(&value)?,
            None => {
                return Err(Failure::Internal(Box::new(ConfigError::UnknownField(
                    field.clone(),
                ))));
            }
        },
        Command::Config { field: None } => {
            for field in Config::list_fields() {
                let value = config.get_field(field).unwrap_or_default();
                out.message(&format!("{} = {}", field, value))?;
            }
        }
        Command::CheckEmail { email, exclude } => {
            let unique = open(config)?.email_unique(email, *exclude);
            out.message(&unique.to_string())?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("contactbook: {}", e);
            return ExitCode::from(EXIT_INTERNAL);
        }
    };
    init_logging(&config);

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Failure::NotFound(id)) => {
            eprintln!("contact {} not found", id);
            ExitCode::from(EXIT_NOT_FOUND)
        }
        Err(Failure::Invalid(errors)) => {
            eprintln!("{}", format_field_errors(&errors));
            ExitCode::from(EXIT_INVALID)
        }
        Err(Failure::Internal(e)) => {
            log::error!("{}", e);
            eprintln!("contactbook: internal error");
            ExitCode::from(EXIT_INTERNAL)
        }
    }
}
