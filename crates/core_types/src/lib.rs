use std::env;

pub type ChunkIndex = u64;

pub const DEFAULT_STYLE_ATTR: &str = "data-styled";
pub const DEFAULT_VERSION_ATTR: &str = "data-styled-version";
pub const SHEETSTREAM_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const ENV_STYLE_ATTR: &str = "SHEETSTREAM_ATTR";
pub const ENV_NONCE: &str = "SHEETSTREAM_NONCE";

/// Names and values of the identifying attributes carried by every emitted
/// `<style>` tag. Renaming the marker leaves the version attribute alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleAttrs {
    pub marker: String,
    pub version_attr: String,
    pub version: String,
}

impl StyleAttrs {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            version_attr: DEFAULT_VERSION_ATTR.to_string(),
            version: SHEETSTREAM_VERSION.to_string(),
        }
    }

    /// Marker name from `SHEETSTREAM_ATTR`, falling back to `data-styled`.
    pub fn from_env() -> Self {
        Self::from_override(env::var(ENV_STYLE_ATTR).ok().as_deref())
    }

    pub fn from_override(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(marker) if !marker.is_empty() => Self::new(marker),
            _ => Self::default(),
        }
    }

    pub fn with_version_attr(mut self, name: impl Into<String>) -> Self {
        self.version_attr = name.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

impl Default for StyleAttrs {
    fn default() -> Self {
        Self::new(DEFAULT_STYLE_ATTR)
    }
}

/// Where the engine believes it is running, plus the CSP nonce to stamp on
/// emitted markup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderEnvironment {
    pub is_server: bool,
    pub is_browser: bool,
    pub nonce: Option<String>,
}

impl RenderEnvironment {
    pub fn server() -> Self {
        Self {
            is_server: true,
            is_browser: false,
            nonce: None,
        }
    }

    pub fn browser() -> Self {
        Self {
            is_server: false,
            is_browser: true,
            nonce: None,
        }
    }

    /// `wasm32-unknown-unknown` is treated as the browser; everything else is a
    /// server. The nonce is read from `SHEETSTREAM_NONCE`.
    pub fn detect() -> Self {
        let is_browser = cfg!(all(target_arch = "wasm32", target_os = "unknown"));
        let env = if is_browser {
            Self::browser()
        } else {
            Self::server()
        };
        match env::var(ENV_NONCE) {
            Ok(nonce) => env.with_nonce(nonce),
            Err(_) => env,
        }
    }

    /// Empty nonces are dropped so they never render as `nonce=""`.
    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        let nonce = nonce.into();
        self.nonce = if nonce.is_empty() { None } else { Some(nonce) };
        self
    }

    pub fn nonce(&self) -> Option<&str> {
        self.nonce.as_deref()
    }

    pub fn supports_streaming(&self) -> bool {
        self.is_server && !self.is_browser
    }
}

impl Default for RenderEnvironment {
    fn default() -> Self {
        Self::server()
    }
}
