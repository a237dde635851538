//! Command-line client for the countdown server.
//!
//! Writes the requested value as one line, then prints every response
//! line until the server closes the connection. No retry, no timeout.

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

/// Command-line arguments for the countdown client
#[derive(Parser, Debug)]
#[command(name = "countdown-client")]
#[command(about = "Request a countdown from a countdown server", long_about = None)]
struct Args {
    /// Starting integer for the countdown
    value: i64,

    /// Server hostname or IP
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Server port (5000 = sequential default, 5001 = pooled default)
    #[arg(short, long, default_value_t = 5000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let stream = TcpStream::connect((args.host.as_str(), args.port)).await?;
    let (reader, mut writer) = stream.into_split();

    writer.write_all(format!("{}\n", args.value).as_bytes()).await?;

    let mut lines = BufReader::new(reader).lines();
    while let Some(line) = lines.next_line().await? {
        println!("{line}");
    }

    Ok(())
}
