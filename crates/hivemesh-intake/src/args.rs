use clap::Parser;

#[derive(Debug, Parser)]
pub struct Args {
    #[arg(long, env = "INTAKE_LISTEN_ADDR", default_value = "0.0.0.0:18091")]
    pub listen_addr: String,
}
