//! exwrap - package an application directory into a self-installing executable.

use exwrap::cli::{self, Args};
use std::process;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse_args();
    let exit_code = match cli::run(&args).await {
        Ok(artifact) => {
            println!("{}", artifact.path.display());
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };

    process::exit(exit_code);
}
