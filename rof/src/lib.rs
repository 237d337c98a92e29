pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;

use error::Error;

/// Reports the outcome of a command and exits accordingly.
///
/// Usage problems are printed to stdout and are not failures. Anything else
/// prints its cause chain to stderr and exits with status 1.
pub fn exit_with(result: error::Result<()>) {
    match result {
        Ok(()) => {}
        Err(Error::Usage(message)) => {
            if !message.is_empty() {
                println!("{}", message);
            }
        }
        Err(e) => {
            eprintln!("{:?}", anyhow::Error::new(e));
            std::process::exit(1);
        }
    }
}
