mod config;
mod http;
mod ip;
mod notify;
mod services;
mod updater;

use std::process::ExitCode;

use notify::{Notifier, Push};

fn main() -> ExitCode {
    notify::init_logging();

    // Nothing is pushed before the configuration is known.
    let startup = Notifier::log_only();

    if let Err(e) = http::check_version() {
        startup.error(&e, Push::Never);
        return ExitCode::FAILURE;
    }

    let dir = config::config_dir();
    let inputs = match config::load(&dir) {
        Ok(inputs) => inputs,
        Err(e) => {
            startup.error(&e.to_string(), Push::Never);
            return ExitCode::FAILURE;
        }
    };

    log::debug!(
        "ip-updater v{} started with {} host entries from {}",
        env!("CARGO_PKG_VERSION"),
        inputs.hosts.len(),
        dir.display()
    );

    let client = http::Client::new(&inputs.config.user_agent);
    let notifier = Notifier::from_config(&inputs.config, client.clone());
    let source = ip::HttpSource::ipinfo(client.clone());
    let mut provider = services::cloudflare::Service::new(client);

    let result = updater::run(
        &inputs.hosts,
        &source,
        &mut provider,
        &notifier,
        inputs.config.push_up_to_date,
    );

    // Per-host failures are reported but do not fail the run.
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
