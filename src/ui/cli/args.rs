// Wed Jan 21 2026 - Alex

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "quickjs-bridge")]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Evaluate JavaScript against bound host objects", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true, default_value = "info")]
    pub log_level: String,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// JSON bridge configuration
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long = "json", global = true)]
    pub json_output: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate a script and print its translated result
    Eval(EvalArgs),
    /// Encode a script file for `exec`
    Compile(CompileArgs),
    /// Run a file produced by `compile`
    Exec(ExecArgs),
    /// List the builtin host objects
    Objects,
}

#[derive(Parser, Debug)]
pub struct EvalArgs {
    /// Script source
    pub script: Option<String>,

    #[arg(short, long)]
    pub file: Option<PathBuf>,

    #[arg(long)]
    pub no_builtins: bool,
}

#[derive(Parser, Debug)]
pub struct CompileArgs {
    #[arg(short, long)]
    pub input: PathBuf,

    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Parser, Debug)]
pub struct ExecArgs {
    #[arg(short, long)]
    pub input: PathBuf,

    #[arg(long)]
    pub no_builtins: bool,
}

impl EvalArgs {
    pub fn validate(&self) -> Result<(), String> {
        match (&self.script, &self.file) {
            (None, None) => Err("Either a script or --file must be specified".to_string()),
            (Some(_), Some(_)) => Err("Cannot specify both a script and --file".to_string()),
            (_, Some(file)) if !file.exists() => Err(format!("Script file does not exist: {:?}", file)),
            _ => Ok(()),
        }
    }
}

impl CompileArgs {
    pub fn validate(&self) -> Result<(), String> {
        if !self.input.exists() {
            return Err(format!("Input file does not exist: {:?}", self.input));
        }
        Ok(())
    }
}

impl ExecArgs {
    pub fn validate(&self) -> Result<(), String> {
        if !self.input.exists() {
            return Err(format!("Input file does not exist: {:?}", self.input));
        }
        Ok(())
    }
}
