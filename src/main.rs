use clap::{Parser, Subcommand};
use color_eyre::eyre::WrapErr;
use color_eyre::Report;
use paxi_exp::util::Input;
use paxi_exp::{config, hosts, tput};
use std::fs;
use std::path::{Path, PathBuf};

/// Helpers to manage the paxi environment and experiments.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Make experiment configs from a hosts file and a base config.
    Config {
        /// Base config to build the variants from.
        #[arg(long, value_name = "JSON", default_value = "config.json")]
        config: PathBuf,
        /// Hosts file to create replicas from.
        #[arg(
            short = 'H',
            long,
            value_name = "JSON",
            default_value = "hosts.json"
        )]
        hosts: PathBuf,
        /// Directory to write the configs to.
        #[arg(short, long, value_name = "DIR", default_value = "configs")]
        outdir: PathBuf,
        /// Conflict percentages.
        #[arg(
            long = "conflict",
            value_name = "PCT",
            default_values_t = vec![50_i64]
        )]
        conflicts: Vec<i64>,
        /// Remove all prior configs from the directory first.
        #[arg(short = 'C', long)]
        clean: bool,
        /// Number of replicas in the quorum.
        #[arg(value_name = "N", default_values_t = vec![3_usize])]
        sizes: Vec<usize>,
    },
    /// Compute throughput from latency measurements.
    Tput {
        /// Latency files output by the client benchmark.
        #[arg(value_name = "FILE", required = true)]
        latency: Vec<PathBuf>,
    },
}

fn main() -> Result<(), Report> {
    // init logging
    tracing_subscriber::fmt::init();

    match Cli::parse().command {
        Command::Config {
            config,
            hosts,
            outdir,
            conflicts,
            clean,
            sizes,
        } => make_configs(config, hosts, outdir, &sizes, &conflicts, clean),
        Command::Tput { latency } => print_tput(&latency),
    }
}

fn make_configs(
    config: PathBuf,
    hosts_file: PathBuf,
    outdir: PathBuf,
    sizes: &[usize],
    conflicts: &[i64],
    clean: bool,
) -> Result<(), Report> {
    let base = Input::Path(config).read().wrap_err("read base config")?;
    let registry = Input::Path(hosts_file).read().wrap_err("read hosts")?;

    let hosts = hosts::load(&registry)?;
    let grouping = hosts::group_by_region(&hosts);
    let region_ids = hosts::sorted_region_ids(&grouping);
    tracing::debug!(
        "{} hosts across {} regions",
        hosts.len(),
        region_ids.len()
    );

    fs::create_dir_all(&outdir).wrap_err("create output directory")?;
    if clean {
        clean_configs(&outdir)?;
    }

    let generated =
        config::generate(&base, &grouping, &region_ids, sizes, conflicts)?;
    for config in generated {
        let path = outdir.join(config.file_name());
        let file = fs::File::create(&path).wrap_err("create config file")?;
        let buf = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(buf, config.config())
            .wrap_err("write config file")?;
        tracing::info!("wrote {}", path.display());
    }
    Ok(())
}

// removes prior config-*.json files, leaving anything else in place
fn clean_configs(outdir: &Path) -> Result<(), Report> {
    for entry in fs::read_dir(outdir).wrap_err("list output directory")? {
        let path = entry.wrap_err("list output directory")?.path();
        let name = match path.file_name().and_then(|name| name.to_str()) {
            Some(name) => name,
            None => continue,
        };
        if name.starts_with("config-") && name.ends_with(".json") {
            fs::remove_file(&path).wrap_err("remove prior config")?;
            tracing::debug!("removed {}", path.display());
        }
    }
    Ok(())
}

fn print_tput(latency: &[PathBuf]) -> Result<(), Report> {
    let mut rows = Vec::with_capacity(latency.len());
    for path in latency {
        rows.push(tput::from_file(path)?);
    }
    println!("{}", tput::table(&tput::ranked(rows)));
    Ok(())
}
