//! Ambient client state consumed when building a payload.
//!
//! A browser tracker reads `location`, `navigator`, `document` and `screen`
//! directly. Here those reads go through the [`Environment`] trait so the
//! host decides where page context comes from.

use url::Url;

use crate::error::ReporterError;

/// Raw value of one do-not-track source.
///
/// Browsers expose the signal as a string (`"1"`, `"0"`, `"yes"`,
/// `"unspecified"`) on some paths and as a boolean on others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DoNotTrack {
    Text(String),
    Flag(bool),
}

impl DoNotTrack {
    /// Whether the source carries a value at all (`a || b || c` semantics).
    fn is_set(&self) -> bool {
        match self {
            DoNotTrack::Text(s) => !s.is_empty(),
            DoNotTrack::Flag(b) => *b,
        }
    }

    fn is_opt_out(&self) -> bool {
        match self {
            DoNotTrack::Text(s) => s == "1" || s == "yes",
            DoNotTrack::Flag(b) => *b,
        }
    }
}

/// Returns true when the first set signal among `signals` is an opt-out.
pub fn do_not_track_enabled(signals: &[Option<DoNotTrack>]) -> bool {
    signals
        .iter()
        .flatten()
        .find(|signal| signal.is_set())
        .map(DoNotTrack::is_opt_out)
        .unwrap_or(false)
}

pub trait Environment: Send + Sync {
    /// Current page path, e.g. `/pricing`
    fn pathname(&self) -> String;
    /// Query string including the leading `?`, or empty
    fn search(&self) -> String;
    /// Fragment including the leading `#`, or empty
    fn hash(&self) -> String;
    fn hostname(&self) -> String;
    fn language(&self) -> String;
    fn referrer(&self) -> Option<String>;
    fn screen_width(&self) -> u32;
    fn screen_height(&self) -> u32;
    fn title(&self) -> String;
    /// The three conventional do-not-track lookups, in precedence order.
    fn do_not_track_signals(&self) -> [Option<DoNotTrack>; 3];
    fn user_agent(&self) -> Option<String> {
        None
    }
}

/// Fixed-value environment. Used for server-side reporting and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticEnvironment {
    pub pathname: String,
    pub search: String,
    pub hash: String,
    pub hostname: String,
    pub language: String,
    pub referrer: Option<String>,
    pub screen_width: u32,
    pub screen_height: u32,
    pub title: String,
    pub do_not_track: [Option<DoNotTrack>; 3],
    pub user_agent: Option<String>,
}

impl StaticEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill path, search, hash and hostname from a full page URL.
    pub fn from_url(page_url: &str) -> Result<Self, ReporterError> {
        Self::new().page_url(page_url)
    }

    pub fn page_url(mut self, page_url: &str) -> Result<Self, ReporterError> {
        let parsed = Url::parse(page_url)?;
        self.pathname = parsed.path().to_string();
        self.search = parsed
            .query()
            .filter(|q| !q.is_empty())
            .map(|q| format!("?{}", q))
            .unwrap_or_default();
        self.hash = parsed
            .fragment()
            .filter(|f| !f.is_empty())
            .map(|f| format!("#{}", f))
            .unwrap_or_default();
        self.hostname = parsed.host_str().unwrap_or_default().to_string();
        Ok(self)
    }

    pub fn pathname(mut self, value: impl Into<String>) -> Self {
        self.pathname = value.into();
        self
    }

    pub fn search(mut self, value: impl Into<String>) -> Self {
        self.search = value.into();
        self
    }

    pub fn hash(mut self, value: impl Into<String>) -> Self {
        self.hash = value.into();
        self
    }

    pub fn hostname(mut self, value: impl Into<String>) -> Self {
        self.hostname = value.into();
        self
    }

    pub fn language(mut self, value: impl Into<String>) -> Self {
        self.language = value.into();
        self
    }

    pub fn referrer(mut self, value: impl Into<String>) -> Self {
        self.referrer = Some(value.into());
        self
    }

    pub fn screen(mut self, width: u32, height: u32) -> Self {
        self.screen_width = width;
        self.screen_height = height;
        self
    }

    pub fn title(mut self, value: impl Into<String>) -> Self {
        self.title = value.into();
        self
    }

    pub fn do_not_track(mut self, signals: [Option<DoNotTrack>; 3]) -> Self {
        self.do_not_track = signals;
        self
    }

    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.user_agent = Some(value.into());
        self
    }
}

impl Environment for StaticEnvironment {
    fn pathname(&self) -> String {
        self.pathname.clone()
    }

    fn search(&self) -> String {
        self.search.clone()
    }

    fn hash(&self) -> String {
        self.hash.clone()
    }

    fn hostname(&self) -> String {
        self.hostname.clone()
    }

    fn language(&self) -> String {
        self.language.clone()
    }

    fn referrer(&self) -> Option<String> {
        self.referrer.clone()
    }

    fn screen_width(&self) -> u32 {
        self.screen_width
    }

    fn screen_height(&self) -> u32 {
        self.screen_height
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn do_not_track_signals(&self) -> [Option<DoNotTrack>; 3] {
        self.do_not_track.clone()
    }

    fn user_agent(&self) -> Option<String> {
        self.user_agent.clone()
    }
}
