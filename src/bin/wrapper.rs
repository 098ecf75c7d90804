//! exwrap-wrapper - installs the attached application, or launches the
//! installed one.

use exwrap::ExwrapError;
use exwrap::runtime::{self, Outcome, RuntimeContext};
use std::process;

async fn run() -> Result<Outcome, ExwrapError> {
    let ctx = RuntimeContext::from_env()?;
    Ok(runtime::run(&ctx).await?)
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let exit_code = match run().await {
        Ok(Outcome::Installed(dir)) => {
            log::debug!("Installed into {}", dir.display());
            0
        }
        Ok(Outcome::Launched) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };

    process::exit(exit_code);
}
