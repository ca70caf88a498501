//! Minification stage.

use minify_html::Cfg;

use crate::config::MinifyConfig;
use crate::error::MinifyError;

/// A text-to-text minification pass.
pub trait Minifier: Send + Sync {
    fn minify(&self, text: &str) -> Result<String, MinifyError>;
}

/// HTML minifier with optional inline CSS and JS minification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HtmlMinifier {
    enabled: bool,
    minify_css: bool,
    minify_js: bool,
    keep_comments: bool,
    keep_closing_tags: bool,
}

impl Default for HtmlMinifier {
    fn default() -> Self {
        Self::from_config(&MinifyConfig::default())
    }
}

impl HtmlMinifier {
    /// Map the per-language switches onto one minifier.
    ///
    /// `html.minify` gates the whole stage. `removeComments` and
    /// `keepClosingTags` are read from the HTML options.
    pub fn from_config(config: &MinifyConfig) -> Self {
        Self {
            enabled: config.html.minify,
            minify_css: config.css.minify,
            minify_js: config.javascript.minify,
            keep_comments: !config.html.flag("removeComments", true),
            keep_closing_tags: config.html.flag("keepClosingTags", false),
        }
    }

    /// A minifier that returns its input unchanged.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn cfg(&self) -> Cfg {
        let mut cfg = Cfg::new();
        cfg.minify_css = self.minify_css;
        cfg.minify_js = self.minify_js;
        cfg.keep_comments = self.keep_comments;
        cfg.keep_closing_tags = self.keep_closing_tags;
        cfg
    }
}

impl Minifier for HtmlMinifier {
    fn minify(&self, text: &str) -> Result<String, MinifyError> {
        if !self.enabled {
            return Ok(text.to_string());
        }
        let out = minify_html::minify(text.as_bytes(), &self.cfg());
        Ok(String::from_utf8(out)?)
    }
}
