use weather_backdrop::BackdropConfig;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match BackdropConfig::load(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(2);
        }
    };

    log::info!("Starting weather backdrop: {}", config.initial_condition());

    if let Err(e) = weather_backdrop::run(config) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
