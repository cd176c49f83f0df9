use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

use crate::config::FrameConfig;
use crate::frame::FrameRenderer;
use crate::frame::share::ShareLinks;
use crate::upstream::StatsClient;

#[derive(Clone)]
pub struct AppState {
    pub stats: StatsClient,
    pub frames: Arc<FrameState>,
    pub start_time: Instant,
}

/// Everything the frame routes need besides the lookup itself.
pub struct FrameState {
    pub config: FrameConfig,
    pub renderer: FrameRenderer,
    pub links: ShareLinks,
}

impl AppState {
    pub fn new(stats: StatsClient, frame_config: FrameConfig) -> Result<Self> {
        let renderer = FrameRenderer::new(&frame_config)?;
        let links = ShareLinks::new(&frame_config)?;
        Ok(Self {
            stats,
            frames: Arc::new(FrameState {
                config: frame_config,
                renderer,
                links,
            }),
            start_time: Instant::now(),
        })
    }
}
