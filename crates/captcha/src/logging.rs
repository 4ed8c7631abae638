use crate::config::CaptchaConfig;

pub fn setup_logging(config: &CaptchaConfig) {
    common::setup_logging(config.environment.clone());
}
