//! Query module
//!
//! GAQL templates and the date window they are rendered against.
//!
//! # Overview
//!
//! - `Report` - one variant per report, selecting its `QueryTemplate`
//! - `DateWindow` - `[today - lookback, today]`, recomputed per invocation
//! - `QueryTemplate::render` - pure function of (config, today)

mod templates;
mod window;

pub use templates::{QueryTemplate, Report};
pub use window::{date_literal, DateWindow, WindowStart};

use crate::config::TapConfig;
use crate::error::Result;
use crate::template::{self, TemplateContext};
use chrono::NaiveDate;

impl QueryTemplate {
    /// The window this template would be rendered with
    pub fn window_for(&self, config: &TapConfig, today: NaiveDate) -> Result<Option<DateWindow>> {
        self.window
            .map(|start| DateWindow::resolve(start, config, today))
            .transpose()
    }

    /// Render the final query text
    ///
    /// Rendering is cheap and never cached: two calls on different days
    /// yield different windows.
    pub fn render(&self, config: &TapConfig, today: NaiveDate) -> Result<String> {
        let mut ctx = TemplateContext::with_config(config.template_values());
        if let Some(window) = self.window_for(config, today)? {
            ctx.set_var("start_date", window.start_literal());
            ctx.set_var("end_date", window.end_literal());
        }

        let rendered = template::render(self.text, &ctx)?;
        Ok(template::collapse_whitespace(&rendered))
    }
}
