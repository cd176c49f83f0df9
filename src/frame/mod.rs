//! Farcaster vNext frame markup.
//!
//! A frame is an HTML document whose meta tags name an image and up to four
//! buttons. Images are configured artwork; the formatted statistics travel in
//! the description and the document body.

use anyhow::{Context, Result};
use minijinja::{Environment, context};
use serde::Serialize;
use tracing::error;

use crate::config::FrameConfig;

pub mod share;
pub mod views;

pub const MAX_BUTTONS: usize = 4;

const FRAME_TEMPLATE_NAME: &str = "frame.html";
const FRAME_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{{ title }}</title>
<meta property="og:title" content="{{ title }}">
<meta property="og:image" content="{{ image }}">
<meta property="og:description" content="{{ summary }}">
<meta property="fc:frame" content="vNext">
<meta property="fc:frame:image" content="{{ image }}">
<meta property="fc:frame:image:aspect_ratio" content="{{ aspect_ratio }}">
<meta property="fc:frame:post_url" content="{{ post_url }}">
{%- for button in buttons %}
<meta property="fc:frame:button:{{ loop.index }}" content="{{ button.label }}">
<meta property="fc:frame:button:{{ loop.index }}:action" content="{{ button.action }}">
<meta property="fc:frame:button:{{ loop.index }}:target" content="{{ button.target }}">
{%- endfor %}
</head>
<body>
{%- if avatar %}
<img src="{{ avatar }}" alt="avatar" width="64" height="64">
{%- endif %}
<h1>{{ heading }}</h1>
{%- for line in lines %}
<p>{{ line }}</p>
{%- endfor %}
</body>
</html>
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonAction {
    /// Posts the frame action back to `target`.
    Post,
    /// Opens `target` in the client.
    Link,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameButton {
    pub label: String,
    pub action: ButtonAction,
    pub target: String,
}

impl FrameButton {
    pub fn post(label: &str, target: String) -> Self {
        Self {
            label: label.to_string(),
            action: ButtonAction::Post,
            target,
        }
    }

    pub fn link(label: &str, target: String) -> Self {
        Self {
            label: label.to_string(),
            action: ButtonAction::Link,
            target,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameView {
    pub image: String,
    /// Profile picture shown above the heading.
    pub avatar: Option<String>,
    pub heading: String,
    pub lines: Vec<String>,
    pub buttons: Vec<FrameButton>,
}

impl FrameView {
    pub fn summary(&self) -> String {
        if self.lines.is_empty() {
            self.heading.clone()
        } else {
            self.lines.join(" | ")
        }
    }
}

pub struct FrameRenderer {
    env: Environment<'static>,
    title: String,
    aspect_ratio: String,
    post_url: String,
    fallback: String,
}

impl FrameRenderer {
    pub fn new(config: &FrameConfig) -> Result<Self> {
        let mut env = Environment::new();
        env.add_template(FRAME_TEMPLATE_NAME, FRAME_TEMPLATE)
            .context("Failed to compile frame template")?;
        let mut renderer = Self {
            env,
            title: config.title.clone(),
            aspect_ratio: config.image_aspect_ratio.clone(),
            post_url: config.route_url("check"),
            fallback: String::new(),
        };
        renderer.fallback = renderer
            .render(&views::render_error(config))
            .context("Failed to prerender fallback frame")?;
        Ok(renderer)
    }

    /// Renders `view`, serving the prerendered error frame when that fails.
    pub fn render_or_fallback(&self, view: &FrameView) -> String {
        match self.render(view) {
            Ok(html) => html,
            Err(err) => {
                error!("Frame render failed: {err:#}");
                self.fallback.clone()
            }
        }
    }

    pub fn render(&self, view: &FrameView) -> Result<String> {
        assert!(!view.buttons.is_empty(), "A frame needs at least one button");
        assert!(
            view.buttons.len() <= MAX_BUTTONS,
            "Frames support at most {MAX_BUTTONS} buttons"
        );

        let template = self
            .env
            .get_template(FRAME_TEMPLATE_NAME)
            .context("Frame template missing")?;
        template
            .render(context! {
                title => &self.title,
                aspect_ratio => &self.aspect_ratio,
                post_url => &self.post_url,
                image => &view.image,
                avatar => &view.avatar,
                heading => &view.heading,
                summary => view.summary(),
                lines => &view.lines,
                buttons => &view.buttons,
            })
            .context("Failed to render frame")
    }
}
