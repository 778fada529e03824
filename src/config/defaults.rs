//! Default value functions for configuration.

use std::net::SocketAddr;

pub fn default_bot_name() -> String {
    "blep-bot".to_string()
}

pub fn default_gateway_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 7878))
}

pub fn default_data_dir() -> String {
    "data".to_string()
}

pub fn default_tags_file() -> String {
    "tags.json".to_string()
}

pub fn default_timezones_file() -> String {
    "timezones.json".to_string()
}
