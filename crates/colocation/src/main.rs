use clap::{Parser, Subcommand, ValueEnum};
use colocation_core::{default_strategy_set, load_file, Node, NodeDescriptor, StrategySet};
use colocation_resolver::{validate_strategy_set, StrategyResolver};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "colocation", about = "Resolve per-node colocation strategies")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the default strategy set
    Defaults {
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        output: OutputFormat,
    },
    /// Validate a strategy set file
    Validate {
        /// Strategy set file (.yaml, .yml or .json)
        #[arg(long, env = "COLOCATION_CONFIG")]
        config: PathBuf,
    },
    /// Resolve the effective strategy for a node
    Resolve {
        /// Strategy set file (.yaml, .yml or .json)
        #[arg(long, env = "COLOCATION_CONFIG")]
        config: PathBuf,
        /// Node manifest to take labels from
        #[arg(long, conflicts_with = "label")]
        node: Option<PathBuf>,
        /// Node label as key=value, may be repeated
        #[arg(long, value_parser = parse_label)]
        label: Vec<(String, String)>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        output: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

fn main() -> miette::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Defaults { output } => print_value(&default_strategy_set(), output),
        Commands::Validate { config } => run_validate(&config),
        Commands::Resolve {
            config,
            node,
            label,
            output,
        } => run_resolve(&config, node.as_deref(), label, output),
    }
}

/// Load a strategy set and reject it if it does not validate
fn load_strategy_set(path: &Path) -> miette::Result<StrategySet> {
    let set: StrategySet = load_file(path)?;
    validate_strategy_set(&set)?;
    Ok(set)
}

fn run_validate(config: &Path) -> miette::Result<()> {
    let set = load_strategy_set(config)?;
    info!(
        "Strategy set {} is valid ({} node scopes)",
        config.display(),
        set.node_configs.len()
    );
    Ok(())
}

fn run_resolve(
    config: &Path,
    node: Option<&Path>,
    labels: Vec<(String, String)>,
    output: OutputFormat,
) -> miette::Result<()> {
    let set = load_strategy_set(config)?;
    let descriptor = node_descriptor(node, labels)?;

    let resolution = StrategyResolver::new().resolve(&set, &descriptor);

    for skipped in &resolution.skipped {
        warn!(
            "Node scope {} ({}) skipped: {}",
            skipped.index,
            skipped.name.as_deref().unwrap_or("unnamed"),
            skipped.reason
        );
    }

    match resolution.applied {
        Some(index) => info!("Node {} matched node scope {}", descriptor, index),
        None => info!("Node {} uses the base strategy", descriptor),
    }

    print_value(&resolution.strategy, output)
}

/// Take node labels from a manifest if one is given, else from `--label`
fn node_descriptor(
    node: Option<&Path>,
    labels: Vec<(String, String)>,
) -> miette::Result<NodeDescriptor> {
    match node {
        Some(path) => {
            let node: Node = load_file(path)?;
            Ok(NodeDescriptor::from(&node))
        }
        None => Ok(NodeDescriptor::new(
            labels.into_iter().collect::<BTreeMap<_, _>>(),
        )),
    }
}

fn print_value<T: serde::Serialize>(value: &T, output: OutputFormat) -> miette::Result<()> {
    let rendered = match output {
        OutputFormat::Yaml => colocation_core::to_yaml(value)?,
        OutputFormat::Json => colocation_core::to_json_pretty(value)?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

/// Parse a `key=value` label argument
fn parse_label(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("label key is empty in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_label() {
        assert_eq!(
            parse_label("zone=us-east").unwrap(),
            ("zone".to_string(), "us-east".to_string())
        );
        assert_eq!(
            parse_label("gpu=").unwrap(),
            ("gpu".to_string(), String::new())
        );
        assert!(parse_label("zone").is_err());
        assert!(parse_label("=us-east").is_err());
    }

    #[test]
    fn test_cli_parses_resolve() {
        let cli = Cli::try_parse_from([
            "colocation",
            "resolve",
            "--config",
            "colocation.yaml",
            "--label",
            "zone=us-east",
            "--label",
            "pool=batch",
            "--output",
            "json",
        ])
        .unwrap();

        match cli.command {
            Commands::Resolve { label, output, node, .. } => {
                assert_eq!(label.len(), 2);
                assert_eq!(output, OutputFormat::Json);
                assert!(node.is_none());
            }
            _ => panic!("expected resolve command"),
        }
    }

    #[test]
    fn test_load_strategy_set_rejects_invalid() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(
            br#"
cpuReclaimThresholdPercent: 60
nodeConfigs:
  - nodeSelector:
      matchLabels:
        zone: us-east
"#,
        )
        .unwrap();

        assert!(load_strategy_set(file.path()).is_err());
    }

    #[test]
    fn test_load_strategy_set_valid() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(
            br#"
cpuReclaimThresholdPercent: 60
nodeConfigs:
  - nodeSelector:
      matchLabels:
        zone: us-east
    cpuReclaimThresholdPercent: 80
"#,
        )
        .unwrap();

        let set = load_strategy_set(file.path()).unwrap();
        let node = NodeDescriptor::default().with_label("zone", "us-east");
        let resolution = StrategyResolver::new().resolve(&set, &node);
        assert_eq!(resolution.strategy.cpu_reclaim_threshold_percent, Some(80));
    }

    #[test]
    fn test_resolve_from_node_manifest() {
        let mut config = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        config
            .write_all(
                br#"
enable: false
cpuReclaimThresholdPercent: 60
nodeConfigs:
  - name: batch-east
    nodeSelector:
      matchLabels:
        zone: us-east
    enable: true
    cpuReclaimThresholdPercent: 80
"#,
            )
            .unwrap();

        let mut manifest = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        manifest
            .write_all(
                br#"
apiVersion: v1
kind: Node
metadata:
  name: node-1
  labels:
    zone: us-east
    pool: batch
"#,
            )
            .unwrap();

        let set = load_strategy_set(config.path()).unwrap();
        let descriptor = node_descriptor(Some(manifest.path()), Vec::new()).unwrap();
        assert_eq!(descriptor.get("zone"), Some("us-east"));
        assert_eq!(descriptor.get("pool"), Some("batch"));

        let resolution = StrategyResolver::new().resolve(&set, &descriptor);
        assert_eq!(resolution.applied, Some(0));
        assert_eq!(resolution.strategy.enable, Some(true));
        assert_eq!(resolution.strategy.cpu_reclaim_threshold_percent, Some(80));

        let from_labels =
            node_descriptor(None, vec![("zone".to_string(), "us-west".to_string())]).unwrap();
        assert!(!StrategyResolver::new().resolve(&set, &from_labels).is_matched());
    }
}
