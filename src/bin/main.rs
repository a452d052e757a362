use std::env;

use rlox::Lox;

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();

    let mut args = env::args().skip(1).collect::<Vec<_>>();

    let mut lox = Lox::new();
    match args.len() {
        0 => lox.run_prompt(),
        1 => {
            let filename = args.pop().unwrap();
            lox.run_file(&filename)?;

            // The runtime code wins if both somehow apply.
            if lox.had_runtime_error() {
                std::process::exit(70);
            }
            if lox.had_error() {
                std::process::exit(65);
            }

            Ok(())
        }
        _ => {
            println!("Usage: rlox [script]");
            std::process::exit(64);
        }
    }
}
