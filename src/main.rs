use argh::FromArgs;
use minishell::{Control, Interpreter};
use std::io;

#[derive(FromArgs)]
/// A small interactive shell with quoting and output redirection.
struct Args {
    #[argh(option, short = 'c')]
    /// run a single command line and exit
    command: Option<String>,

    #[argh(option, default = "String::from(\"$ \")")]
    /// prompt shown before each line
    prompt: String,

    #[argh(switch, short = 'v')]
    /// log tokenizing and dispatch decisions to stderr
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args: Args = argh::from_env();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let mut shell = Interpreter::default();
    log::debug!("registry: {:?}", shell.registry());

    let code = match args.command {
        Some(line) => {
            match shell.run_line(&line, &mut io::stdout().lock(), &mut io::stderr().lock())? {
                Control::Exit(code) => code,
                Control::Continue => 0,
            }
        }
        None => shell.repl(&args.prompt)?,
    };

    std::process::exit(code)
}
