//! Pagecraft CLI
//!
//! Builds the demo page and either writes it to disk or serves it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use markup::{attrs, Attributes, Document, Node, TagOptions, DEFAULT_TITLE};
use server::{DocumentServer, ServerConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pagecraft", version, about = "Build or serve a declarative HTML page")]
struct Cli {
    /// Document title
    #[arg(long, global = true, default_value = DEFAULT_TITLE)]
    title: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write index.html into a directory
    Build {
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Serve the page on a single route
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
}

fn demo_document(title: &str) -> Document {
    let mut doc = Document::with_title(title);

    doc.set_style(".mystyle", [("color", "green")]);

    doc.span(TagOptions::from("colored text").attr("style", "color: red"));
    doc.span(TagOptions::from("colored text").attributes(attrs([("class", "mystyle")])));
    doc.div(vec![
        Node::new("span", Attributes::new(), "div el 1"),
        Node::new("span", Attributes::new(), "div el 2"),
    ]);
    doc.hr(TagOptions::new());
    doc.button(TagOptions::from("click me").attr("onclick", "alert(1)"));

    doc
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let document = demo_document(&cli.title);

    match cli.command {
        Command::Build { out_dir } => {
            let path = document
                .build(&out_dir)
                .with_context(|| format!("writing page into {}", out_dir.display()))?;
            println!("Wrote {}", path.display());
        }
        Command::Serve { host, port } => {
            let config = ServerConfig {
                host,
                port,
                ..ServerConfig::default()
            };
            let bound = DocumentServer::new(document, config).bind().await?;
            println!("Serving on http://{}", bound.local_addr()?);

            bound
                .run_until(async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::error!("Failed to listen for ctrl-c: {}", e);
                    }
                })
                .await?;
        }
    }

    Ok(())
}
