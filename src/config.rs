use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    /// Serve the offline world when a Gemini call fails instead of reporting it.
    pub offline_fallback: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let host = non_empty("LEARNSCAPE_HOST")
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));

        let port = non_empty("LEARNSCAPE_PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);

        let gemini_api_key = non_empty("GEMINI_API_KEY").or_else(|| non_empty("API_KEY"));

        let gemini_model =
            non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

        let offline_fallback = non_empty("LEARNSCAPE_OFFLINE_FALLBACK")
            .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            host,
            port,
            gemini_api_key,
            gemini_model,
            offline_fallback,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
