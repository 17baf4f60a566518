use barrier_bot::bot::Bot;
use barrier_bot::config::Config;
use barrier_bot::debug_logger::DebugLogger;
use barrier_bot::handler;
use log::info;
use rocket::fairing::AdHoc;
use rocket::launch;
use std::env;

#[launch]
async fn rocket() -> _ {
    // Lots of web hosting services expect you to bind to the port specified by the `PORT`
    // environment variable. However, Rocket looks at the `ROCKET_PORT` environment variable.
    // If we find a value for `PORT`, we set `ROCKET_PORT` to that value.
    if let Ok(port) = env::var("PORT") {
        env::set_var("ROCKET_PORT", &port);
    }

    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    info!("Starting barrier-bot server...");

    // Load configuration once at startup
    let config = Config::load_or_default();
    let logger = DebugLogger::new(config.debug.enabled, &config.debug.log_file_path).await;
    let bot = Bot::with_logger(config, logger);
    info!("Serving agent '{}'", bot.agent_name());

    handler::build_rocket(bot).attach(AdHoc::on_response("Server ID Middleware", |_, res| {
        Box::pin(async move {
            res.set_raw_header("Server", "barrier-bot");
        })
    }))
}
