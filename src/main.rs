#![deny(warnings)]

mod config;
mod errors;
mod logging;
mod web;

use errors::Error;
type Result<T> = std::result::Result<T, Error>;

#[tokio::main]
async fn main() {
    use logging::*;

    let log = DEFAULT.new(o!("function" => "main"));
    info!(log, "Starting up");

    let frontend = config::frontend();
    info!(log, "Frontend configuration resolved";
        "api_base_path" => frontend.api_base_path.as_str(),
        "react_app_mode" => frontend.react_app_mode.as_str()
    );

    web::run(frontend).await
}
