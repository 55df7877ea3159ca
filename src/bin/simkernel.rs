use clap::Parser;
use simkernel::cli::{dispatch, Cli};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    match dispatch(cli).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("simkernel: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}
