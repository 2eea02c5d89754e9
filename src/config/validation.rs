use crate::config::types::{CatalogConfig, Config, FansConfig, FetchConfig, SelectorConfig};
use crate::crawler::PageTemplate;
use crate::ConfigError;
use scraper::Selector;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetch_config(&config.fetch)?;
    validate_catalog_config(&config.catalog)?;
    validate_fans_config(&config.fans)?;
    validate_selectors(&config.selectors)?;
    Ok(())
}

/// Validates fetch session settings
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    for (name, value) in [
        ("fetch_timeout_ms", config.fetch_timeout_ms),
        ("content_wait_timeout_ms", config.content_wait_timeout_ms),
        ("poll_interval_ms", config.poll_interval_ms),
    ] {
        if value == 0 {
            return Err(ConfigError::Validation(format!(
                "{} must be greater than 0",
                name
            )));
        }
    }

    Ok(())
}

/// Validates the catalog page range and listing template
fn validate_catalog_config(config: &CatalogConfig) -> Result<(), ConfigError> {
    PageTemplate::new(&config.url_template)?.check_listing()?;

    if config.page_start < 1 {
        return Err(ConfigError::Validation(format!(
            "page_start must be >= 1, got {}",
            config.page_start
        )));
    }

    if config.page_start > config.page_end {
        return Err(ConfigError::Validation(format!(
            "page_start ({}) must not exceed page_end ({})",
            config.page_start, config.page_end
        )));
    }

    if config.expected_items < 1 {
        return Err(ConfigError::Validation(
            "expected_items must be >= 1".to_string(),
        ));
    }

    if config.output_path.is_empty() {
        return Err(ConfigError::Validation(
            "catalog output_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the fan crawl window and paths
fn validate_fans_config(config: &FansConfig) -> Result<(), ConfigError> {
    PageTemplate::new(&config.url_template)?.check_per_entity()?;

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.recycle_every < 1 {
        return Err(ConfigError::Validation(format!(
            "recycle_every must be >= 1, got {}",
            config.recycle_every
        )));
    }

    for (name, marker) in [
        ("start_marker", &config.start_marker),
        ("stop_marker", &config.stop_marker),
    ] {
        if matches!(marker, Some(m) if m.is_empty()) {
            return Err(ConfigError::Validation(format!(
                "{} cannot be empty when set",
                name
            )));
        }
    }

    if config.catalog_path.is_empty() {
        return Err(ConfigError::Validation(
            "catalog_path cannot be empty".to_string(),
        ));
    }

    if config.output_path.is_empty() {
        return Err(ConfigError::Validation(
            "fans output_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates that every selector parses and every attribute name is set
fn validate_selectors(config: &SelectorConfig) -> Result<(), ConfigError> {
    for selector in [
        &config.catalog_item,
        &config.catalog_name,
        &config.catalog_poster,
        &config.catalog_link,
        &config.fan_item,
        &config.fan_avatar,
    ] {
        validate_selector(selector)?;
    }

    for (name, value) in [
        ("catalog_name_attr", &config.catalog_name_attr),
        ("catalog_rating_attr", &config.catalog_rating_attr),
        ("slug_marker", &config.slug_marker),
    ] {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}

fn validate_selector(selector: &str) -> Result<(), ConfigError> {
    if selector.trim().is_empty() {
        return Err(ConfigError::InvalidSelector(
            "selector cannot be empty".to_string(),
        ));
    }

    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))
}
