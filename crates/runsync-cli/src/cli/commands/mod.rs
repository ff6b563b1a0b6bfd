use super::args::*;

pub mod classify;
pub mod publish;

use crate::exit_codes::EXIT_SUCCESS;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Publish(args) => publish::run(args).await,
        Command::Classify(args) => Ok(classify::run(&args)),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(EXIT_SUCCESS)
        }
    }
}
