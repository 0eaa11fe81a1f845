//! Serve command implementation

use super::build_registry;
use crate::api::{self, AppState};
use crate::config::Config;
use crate::depth::Instrument;
use clap::Args;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (overrides server.port)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Start monitoring an instrument at startup, as ID or ID:SEGMENT
    #[arg(short, long, value_name = "ID[:SEGMENT]")]
    pub watch: Vec<String>,
}

impl ServeArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut server = config.server.clone();
        if let Some(host) = &self.host {
            server.host = host.clone();
        }
        if let Some(port) = self.port {
            server.port = port;
        }

        let registry = build_registry(config)?;

        for entry in &self.watch {
            let instrument = Instrument::parse_with_default(entry, config.monitor.default_segment)?;
            registry
                .start(instrument, config.monitor.default_interval())
                .await?;
        }

        api::serve(&server, AppState::new(registry, config.monitor.clone())).await
    }
}
