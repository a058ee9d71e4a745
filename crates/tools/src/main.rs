use std::env;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use detail::{RemoteServices, ServiceConfig};
use scene::picking::{DEFAULT_PICKING_HEIGHT, DEFAULT_PICKING_WIDTH};
use tools::{ReqwestHttp, country_table, detail_request, pick_uv, run_detail};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Offline checks for the country globe")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every country in a TopoJSON file as JSON
    Inspect {
        /// TopoJSON file (e.g. countries-110m.json)
        topology: PathBuf,

        /// Object holding the country geometries
        #[arg(long, default_value = "countries")]
        object: String,
    },

    /// Look up the country under a sphere texture coordinate
    Pick {
        topology: PathBuf,

        /// Horizontal coordinate, 0 at lon -180
        u: f64,

        /// Vertical coordinate, 0 at the south pole
        v: f64,

        #[arg(long, default_value = "countries")]
        object: String,

        /// Picking raster size as WIDTHxHEIGHT
        #[arg(long, value_parser = parse_size)]
        size: Option<(u32, u32)>,
    },

    /// Fetch metadata, weather and summary for one country
    Detail {
        /// Country name as it appears in the topology
        name: String,

        /// Country code to fall back on when the name lookup fails
        #[arg(long)]
        code: Option<String>,

        /// Topology used to resolve the code and centroid
        #[arg(long)]
        topology: Option<PathBuf>,

        #[arg(long, default_value = "countries")]
        object: String,
    },
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let w: u32 = w.trim().parse().map_err(|e| format!("width: {e}"))?;
    let h: u32 = h.trim().parse().map_err(|e| format!("height: {e}"))?;
    if w == 0 || h == 0 {
        return Err("size must be non-zero".to_string());
    }
    Ok((w, h))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match args.command {
        Command::Inspect { topology, object } => {
            let payload = tokio::fs::read_to_string(&topology).await?;
            let rows = country_table(&payload, &object)?;
            info!("{} countries in {topology:?}", rows.len());
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Command::Pick {
            topology,
            u,
            v,
            object,
            size,
        } => {
            let payload = tokio::fs::read_to_string(&topology).await?;
            let (w, h) = size.unwrap_or((DEFAULT_PICKING_WIDTH, DEFAULT_PICKING_HEIGHT));
            let hit = pick_uv(&payload, &object, [u, v], w, h)?;
            println!("{}", serde_json::to_string_pretty(&hit)?);
        }
        Command::Detail {
            name,
            code,
            topology,
            object,
        } => {
            let paths = match topology {
                Some(path) => {
                    let payload = tokio::fs::read_to_string(&path).await?;
                    formats::country_paths_from_topojson(&payload, &object)?
                }
                None => Vec::new(),
            };
            let config = ServiceConfig {
                ai_api_key: env::var("GEMINI_API_KEY").ok(),
                ..ServiceConfig::default()
            };
            if config.ai_api_key.is_none() {
                info!("GEMINI_API_KEY not set, summary will use the fallback text");
            }
            let services = RemoteServices::new(ReqwestHttp::new(reqwest::Client::new()), config);
            let (selected, request) = detail_request(&name, code.as_deref(), &paths);
            let snapshot = run_detail(&services, selected, &request).await;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Args, Command, parse_size};
    use clap::Parser;

    #[test]
    fn size_parses_both_cases() {
        assert_eq!(parse_size("2048x1024"), Ok((2048, 1024)));
        assert_eq!(parse_size("64X32"), Ok((64, 32)));
        assert!(parse_size("0x10").is_err());
        assert!(parse_size("64").is_err());
    }

    #[test]
    fn pick_args_parse() {
        let args = Args::try_parse_from([
            "globe-tools",
            "pick",
            "world.json",
            "0.6",
            "0.5",
            "--size",
            "720x360",
        ])
        .expect("parse");
        match args.command {
            Command::Pick { u, v, size, object, .. } => {
                assert_eq!((u, v), (0.6, 0.5));
                assert_eq!(size, Some((720, 360)));
                assert_eq!(object, "countries");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn detail_code_is_optional() {
        let args = Args::try_parse_from(["globe-tools", "detail", "France"]).expect("parse");
        assert!(matches!(
            args.command,
            Command::Detail { code: None, topology: None, .. }
        ));
    }
}
