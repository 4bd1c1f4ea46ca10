use cpu_api_demos::{config::Config, exit_err, scenario};
use cpu_api_lib::process;

fn main() {
    let config = Config::parse();
    if let Err(e) = scenario::run(&config) {
        exit_err!(e, "{}", config.scenario);
    }
    process::exit(0);
}
