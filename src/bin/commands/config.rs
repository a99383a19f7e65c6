use super::print_json;
use lgview::{LgviewConfig, OutputFormat};
use serde_json::json;

pub fn run(config: &LgviewConfig, output_format: OutputFormat) {
    if output_format.is_json() {
        print_json(
            &json!({
                "config_file": LgviewConfig::config_file_path(),
                "api_url": config.api_url,
                "show_lg": config.show_lg,
                "show_peerapp": config.show_peerapp,
                "default_api_limit": config.default_api_limit,
                "max_api_limit": config.max_api_limit,
                "surface_load_errors": config.surface_load_errors,
                "lg_poll_interval_ms": config.lg_poll_interval_ms,
                "lg_max_wait_secs": config.lg_max_wait_secs,
                "routes": config.routes(),
            }),
            output_format,
        );
        return;
    }

    println!("Config File:          {}", LgviewConfig::config_file_path());
    println!("{}", config.summary());
}
