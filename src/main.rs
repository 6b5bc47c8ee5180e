use clap::Parser;

use enrollment_dashboard::Cli;

#[actix_web::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = enrollment_dashboard::run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
