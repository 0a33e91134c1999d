use clap::Parser;

#[derive(Debug, Parser)]
pub struct Args {
    #[arg(long, env = "REGISTRY_LISTEN_ADDR", default_value = "0.0.0.0:18090")]
    pub listen_addr: String,

    /// Hosted database endpoint, e.g. postgres://user@db.example.net:5432/hivemesh
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    #[arg(long, env = "DATABASE_PASSWORD", hide_env_values = true)]
    pub database_password: String,
}
