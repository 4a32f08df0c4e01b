use clap::Parser;
use luacurses::core::config::{self, CliOverrides, ResolvedConfig, ScreenOptions};
use luacurses::lua::{preload, terminal_module};
use mlua::Lua;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::{self, File};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "luacurses", about = "Run a Lua script with the libcurses terminal module")]
struct Args {
    /// Lua script to run
    script: PathBuf,

    /// Arguments passed to the script in the global `arg` table
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    script_args: Vec<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,

    /// Log file; the terminal itself belongs to the script
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Config file to use instead of ~/.luacurses/config.toml
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let loaded = match &args.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    };
    let file_config = match loaded {
        Ok(c) => c,
        Err(e) => {
            eprintln!("luacurses: {e}");
            return ExitCode::FAILURE;
        }
    };
    let cli = CliOverrides {
        log_level: args.log_level.clone(),
        log_file: args.log_file.clone(),
    };
    let resolved = config::resolve(&file_config, &cli);

    init_logger(&resolved);
    install_panic_hook();

    log::info!("Running {}", args.script.display());

    // The Lua state, and every screen it holds, is gone by the time we print.
    match run_script(&args, resolved.screen) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Script failed: {}", e);
            eprintln!("luacurses: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logger(config: &ResolvedConfig) {
    if config.log_level == LevelFilter::Off {
        return;
    }
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create(&config.log_file) {
        let _ = WriteLogger::init(config.log_level, log_config, log_file);
    }
}

/// Gives the terminal back before the panic message is printed.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        default_hook(info);
    }));
}

fn run_script(args: &Args, options: ScreenOptions) -> mlua::Result<()> {
    let source = fs::read_to_string(&args.script).map_err(mlua::Error::external)?;

    let lua = Lua::new();
    preload(&lua, terminal_module(&lua, options)?)?;

    let arg = lua.create_table()?;
    arg.set(0, args.script.display().to_string())?;
    for (i, value) in args.script_args.iter().enumerate() {
        arg.set(i + 1, value.as_str())?;
    }
    lua.globals().set("arg", arg)?;

    lua.load(source.as_str())
        .set_name(format!("@{}", args.script.display()))
        .exec()
}
