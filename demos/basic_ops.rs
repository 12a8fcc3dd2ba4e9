//! Basic example: connect to a share and exercise the file operations.
//!
//! # Prerequisites
//!
//! - `smbclient` on the PATH
//! - A reachable share with write access
//!
//! # Usage
//!
//! ```bash
//! cargo run --example basic_ops -- --host 192.168.1.10 --share public --user guest
//! ```

use std::env;
use std::time::Duration;

use smbsession::ClientBuilder;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (set RUST_LOG=trace to see the raw session I/O)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    println!("Connecting to //{}/{}...", args.host, args.share);

    let mut builder = ClientBuilder::new(&args.host)
        .share(&args.share)
        .username(&args.user)
        .port(args.port)
        .connection_timeout(Duration::from_secs(args.timeout));

    if let Some(password) = &args.password {
        builder = builder.password(password);
    }

    let mut client = builder.connect().await?;
    println!("Connected, current directory: {}", client.current_dir());

    println!("\nUploading demo.txt...");
    let response = client.put_content(b"hello from smbsession", "demo.txt").await?;
    if response.is_failure() {
        eprintln!("Upload failed: {}", response.message);
    }

    println!("\nListing share root:");
    println!("{}", "-".repeat(50));
    for (name, entry) in client.ls("*").await? {
        println!("{:>10}  {:?}  {}", entry.size.unwrap_or(0), entry.kind, name);
    }
    println!("{}", "-".repeat(50));

    println!("\nDownloading demo.txt to /tmp/smbsession-demo.txt...");
    let response = client.get("demo.txt", "/tmp/smbsession-demo.txt").await?;
    println!("get: {}", if response.is_success() { "ok" } else { "failed" });

    println!("\nDeleting demo.txt...");
    let response = client.del("demo.txt").await?;
    println!("del: {}", if response.is_success() { "ok" } else { "failed" });

    client.close().await?;
    println!("Done!");

    Ok(())
}

/// Simple argument parser (avoiding external dependencies)
struct Args {
    host: String,
    share: String,
    user: String,
    password: Option<String>,
    port: u16,
    timeout: u64,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut host = "127.0.0.1".to_string();
        let mut share = "public".to_string();
        let mut user = "guest".to_string();
        let mut password = None;
        let mut port = 445u16;
        let mut timeout = 30u64;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--host" | "-h" => {
                    i += 1;
                    if i < args.len() {
                        host = args[i].clone();
                    }
                }
                "--share" | "-s" => {
                    i += 1;
                    if i < args.len() {
                        share = args[i].clone();
                    }
                }
                "--user" | "-u" => {
                    i += 1;
                    if i < args.len() {
                        user = args[i].clone();
                    }
                }
                "--password" | "-P" => {
                    i += 1;
                    if i < args.len() {
                        password = Some(args[i].clone());
                    }
                }
                "--port" | "-p" => {
                    i += 1;
                    if i < args.len() {
                        port = args[i].parse().unwrap_or(445);
                    }
                }
                "--timeout" | "-t" => {
                    i += 1;
                    if i < args.len() {
                        timeout = args[i].parse().unwrap_or(30);
                    }
                }
                "--help" => {
                    Self::print_help();
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                }
            }
            i += 1;
        }

        Self {
            host,
            share,
            user,
            password,
            port,
            timeout,
        }
    }

    fn print_help() {
        println!(
            r#"smbsession basic_ops example

USAGE:
    cargo run --example basic_ops -- [OPTIONS]

OPTIONS:
    -h, --host <HOST>        Target host [default: 127.0.0.1]
    -s, --share <SHARE>      Share name [default: public]
    -u, --user <USER>        Account name [default: guest]
    -P, --password <PASS>    Password (omitted: --no-pass)
    -p, --port <PORT>        SMB port [default: 445]
    -t, --timeout <SECS>     Connection timeout [default: 30]
    --help                   Print this help message
"#
        );
    }
}
