use ckks_keygen::cli::{self, Invocation};
use ckks_keygen::{CkksEngine, KeygenConfigBuilder, Lifecycle};
use console::style;
use env_logger::Env;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = match cli::parse(std::env::args_os()) {
        Ok(Invocation::Run(cli)) => cli,
        Ok(Invocation::Help(text)) => {
            print!("{text}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprint!("{e}");
            return ExitCode::from(1);
        }
    };

    let result = KeygenConfigBuilder::new()
        .set_dir(&cli.dir)
        .build()
        .and_then(|config| {
            Lifecycle::new(CkksEngine, &config).run_with(&mut rand::thread_rng(), |_| {
                println!("{} Input Serialization Check Passed", style("[OK]").green());
            })
        });

    match result {
        Ok(_) => {
            println!("{} Output Serialization Check Passed", style("[OK]").green());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{} {e}", style("[ERROR]").red());
            ExitCode::from(1)
        }
    }
}
