// Wed Jan 21 2026 - Alex

use super::args::{Args, Command, CompileArgs, EvalArgs, ExecArgs};
use crate::bridge::{register_builtins, BuiltinObjects, QuickJsBridge, TranslatedValue};
use crate::config::BridgeConfig;
use crate::ui::{print_info, print_success};
use colored::Colorize;

pub struct CommandHandler;

impl CommandHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(&self, args: Args) -> anyhow::Result<()> {
        self.setup_logging(&args)?;

        let config = match &args.config {
            Some(path) => BridgeConfig::load(path)?,
            None => BridgeConfig::default(),
        };

        match &args.command {
            Command::Eval(eval_args) => self.handle_eval(&args, config, eval_args),
            Command::Compile(compile_args) => self.handle_compile(&args, config, compile_args),
            Command::Exec(exec_args) => self.handle_exec(&args, config, exec_args),
            Command::Objects => self.handle_objects(),
        }
    }

    fn setup_logging(&self, args: &Args) -> anyhow::Result<()> {
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            _ => log::LevelFilter::Info,
        };

        env_logger::Builder::new()
            .filter_level(if args.quiet { log::LevelFilter::Error } else { level })
            .format_timestamp(None)
            .try_init()?;

        Ok(())
    }

    fn open_bridge(&self, config: BridgeConfig, builtins: bool) -> anyhow::Result<QuickJsBridge> {
        config.validate().map_err(|e| anyhow::anyhow!(e))?;
        let mut bridge = QuickJsBridge::with_config(config)?;
        if builtins {
            register_builtins(&mut bridge);
        }
        Ok(bridge)
    }

    fn handle_eval(&self, args: &Args, config: BridgeConfig, eval_args: &EvalArgs) -> anyhow::Result<()> {
        eval_args.validate().map_err(|e| anyhow::anyhow!(e))?;

        let mut bridge = self.open_bridge(config, !eval_args.no_builtins)?;
        let result = match (&eval_args.script, &eval_args.file) {
            (Some(script), _) => bridge.evaluate(script)?,
            (None, Some(file)) => {
                let source = std::fs::read_to_string(file)?;
                bridge.evaluate_named(&source, &file.display().to_string())?
            }
            (None, None) => unreachable!("validated above"),
        };
        bridge.close();

        self.report(args, &result)
    }

    fn handle_compile(&self, args: &Args, config: BridgeConfig, compile_args: &CompileArgs) -> anyhow::Result<()> {
        compile_args.validate().map_err(|e| anyhow::anyhow!(e))?;

        let source = std::fs::read_to_string(&compile_args.input)?;
        let bridge = self.open_bridge(config, false)?;
        let bytecode = bridge.compile(&source, &compile_args.input.display().to_string());
        std::fs::write(&compile_args.output, &bytecode)?;

        if !args.quiet {
            print_success(&format!(
                "Wrote {} bytes to {:?}",
                bytecode.len(),
                compile_args.output
            ));
        }
        Ok(())
    }

    fn handle_exec(&self, args: &Args, config: BridgeConfig, exec_args: &ExecArgs) -> anyhow::Result<()> {
        exec_args.validate().map_err(|e| anyhow::anyhow!(e))?;

        let bytecode = std::fs::read(&exec_args.input)?;
        let mut bridge = self.open_bridge(config, !exec_args.no_builtins)?;
        let result = bridge.execute(&bytecode)?;
        bridge.close();

        self.report(args, &result)
    }

    fn handle_objects(&self) -> anyhow::Result<()> {
        print_info("Builtin host objects:");
        for (name, description) in BuiltinObjects::list() {
            println!("  {:<14} {}", name.cyan(), description);
        }
        Ok(())
    }

    fn report(&self, args: &Args, result: &TranslatedValue) -> anyhow::Result<()> {
        if args.json_output {
            println!("{}", result.to_json());
        } else if !args.quiet {
            println!("{} {} {}", "[+]".green(), result.type_name().dimmed(), result);
        } else {
            println!("{}", result);
        }

        match result.error_message() {
            Some(message) => Err(anyhow::anyhow!("script failed: {}", message)),
            None => Ok(()),
        }
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}
