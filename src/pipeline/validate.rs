// src/pipeline/validate.rs

use crate::error::Result;
use crate::models::Config;
use crate::utils::log;

/// Validate configuration and report gaps that only limit functionality.
pub fn run_validate(config: &Config) -> Result<()> {
    log::header("Konfiguration prüfen");

    match config.validate() {
        Ok(()) => {
            log::line("Konfiguration ist gültig");
            log::sub_item(&format!("User-Agent: {}", config.http.user_agent));
            log::sub_item(&format!("Timeout: {}s", config.http.timeout_secs));
            log::sub_item(&format!(
                "Scraper-Dienst: {}",
                config.swisspost.scraper_service().unwrap_or("deaktiviert")
            ));
            log::sub_item(&format!(
                "Listener: {}:{}",
                config.server.host, config.server.port
            ));
            log::sub_item(&format!(
                "Demo-Daten: {}",
                if config.tracking.allow_demo_fallback {
                    "erlaubt"
                } else {
                    "deaktiviert"
                }
            ));

            for warning in config.warnings() {
                log::warn_line(&warning);
            }
            Ok(())
        }
        Err(e) => {
            ::log::error!("Config validation failed: {}", e);
            Err(e)
        }
    }
}
