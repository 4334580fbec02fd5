use filemon::cli;

#[tokio::main]
async fn main() {
    // Parse cli and handle clap errors
    let options = cli::parse_from_args();

    // Override the default log_level if there is a greater verbosity flag
    filemon::init_logger(options.override_log_level);

    // The producer is blocked in a read of the kernel stream: exit without
    // waiting for it.
    match filemon::monitor::run_filemon(&options).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            cli::report_error(&e);
            std::process::exit(1);
        }
    }
}
