use chrono::Local;

use daybook::app::{App, Outcome};
use daybook::client::Client;
use daybook::config::Config;
use daybook::confirm::StdinPrompter;
use daybook::llm::OllamaBackend;


#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            env_logger::init();
            log::error!("{}", err);
            std::process::exit(1);
        },
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level.as_str())).init();

    log::info!("Starting daybook");
    match run(&config).await {
        Ok(Outcome::Published(report)) => {
            if report.is_success() == false {
                log::warn!("Some events were not added, see the previous log lines for more info.");
            }
            log::info!("Script execution completed");
        },
        Ok(_) => log::info!("Nothing was added to the calendar"),
        Err(err) => {
            log::error!("An error occurred: {}", err);
            std::process::exit(1);
        },
    }
}

async fn run(config: &Config) -> Result<Outcome, Box<dyn std::error::Error>> {
    let client = Client::new(config.caldav_url.as_str(), &config.username, &config.password, &config.calendar_name)?;
    let model = OllamaBackend::new(config.ollama_url.clone(), &config.ollama_model);

    let mut app = App::new(config, model, client);
    let outcome = app.run(&mut StdinPrompter, Local::now().date_naive()).await?;
    Ok(outcome)
}
