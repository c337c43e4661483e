use clap::Parser;
use tco_cli::cli::Cli;
use tco_cli::error::AppError;
use tco_core::CoreError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tco_cli::init_tracing(cli.verbose);

    match tco_cli::run(cli).await {
        Ok(()) => Ok(()),
        Err(AppError::Core(CoreError::Validation(errors))) => {
            eprintln!("The form is not valid:");
            eprint!("{}", tco_cli::output::render_errors(&errors));
            anyhow::bail!("{} field(s) need attention", errors.len())
        }
        Err(e) if e.is_user_error() => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
        Err(e) => Err(e.into()),
    }
}
