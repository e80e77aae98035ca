use clap::Parser;

use crate::config::AppConfig;

/// Command-line overrides, applied on top of the environment.
#[derive(Debug, Default, Parser)]
#[command(name = "todo-api")]
#[command(about = "Multi-user todo tracking API")]
#[command(version)]
pub struct Cli {
    #[arg(long, help = "Address to bind (overrides HOST)")]
    pub host: Option<String>,

    #[arg(long, help = "Port to listen on (overrides PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "PostgreSQL connection URL (overrides DATABASE_URL)")]
    pub database_url: Option<String>,
}

impl Cli {
    pub fn apply(self, config: &mut AppConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = self.database_url {
            config.database.url = Some(url);
        }
    }
}
