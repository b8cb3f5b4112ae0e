use colored::Colorize;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(err) = model_seeder::cli::main().await {
        eprintln!("{}", err.to_string().red());
        std::process::exit(1);
    }
}
