//! CLI argument parsing with clap.

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::Parser;

use crate::credentials::Credentials;
use crate::error::AdapterError;

/// Generate one image from a text prompt and report the result as JSON on stdout.
///
/// Flags are only recognized before the first positional argument; from there
/// on every token, including ones that start with `-`, is taken verbatim.
#[derive(Parser, Debug)]
#[command(name = "dreamgen", version, about)]
pub struct Cli {
    /// ACCESS_KEY SECRET_KEY PROMPT OUTPUT_DIR, in that order. Any further
    /// arguments are ignored.
    #[arg(value_name = "ARG", trailing_var_arg = true)]
    pub args: Vec<String>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Verbose logging on stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Everything one generation run needs from the command line.
#[derive(Debug)]
pub struct Invocation {
    /// Credentials to configure the client with.
    pub credentials: Credentials,
    /// Prompt text.
    pub prompt: String,
    /// Output directory.
    pub output_dir: PathBuf,
}

impl Cli {
    /// Collect the four required positional arguments.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::MissingArguments`] if any of them is absent.
    pub fn invocation(&self) -> Result<Invocation, AdapterError> {
        match self.args.as_slice() {
            [ak, sk, prompt, dir, ..] => Ok(Invocation {
                credentials: Credentials::new(ak.clone(), sk.clone()),
                prompt: prompt.clone(),
                output_dir: PathBuf::from(dir),
            }),
            _ => Err(AdapterError::MissingArguments),
        }
    }
}

/// Whether a clap error is really a request for help or version output.
#[must_use]
pub fn is_informational(error: &clap::Error) -> bool {
    matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
}

/// Convert a clap parse failure into a usage error.
#[must_use]
pub fn usage_error(error: &clap::Error) -> AdapterError {
    match error.kind() {
        ErrorKind::MissingRequiredArgument | ErrorKind::TooFewValues => {
            AdapterError::MissingArguments
        }
        _ => {
            let rendered = error.to_string();
            let first_line = rendered.lines().next().unwrap_or_default();
            let message = first_line.strip_prefix("error: ").unwrap_or(first_line).trim();
            AdapterError::InvalidArguments(message.to_string())
        }
    }
}
