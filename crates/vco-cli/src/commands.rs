use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use colored::Colorize;
use serde_json::json;
use tracing::info;
use vco_object::{ObjectPool, PoolConfig};
use vco_pack::{PackingConfig, PackingData};
use vco_store::{InMemoryObjectStore, ObjectKind, ObjectStore, StoredObject};
use vco_types::{ObjectId, ObjectType};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::TablePerf(args) => cmd_table_perf(args, &cli.format),
        Command::PackGraph(args) => cmd_pack_graph(args, &cli.format),
    }
}

fn read_config(path: &std::path::Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Max and mean probe distance over `ids`.
fn probe_stats(pool: &ObjectPool, ids: &[ObjectId]) -> (usize, f64) {
    let mut max = 0;
    let mut total = 0;
    for id in ids {
        let d = pool.probe_distance(id).unwrap_or(0);
        max = max.max(d);
        total += d;
    }
    let mean = if ids.is_empty() {
        0.0
    } else {
        total as f64 / ids.len() as f64
    };
    (max, mean)
}

fn cmd_table_perf(args: TablePerfArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => PoolConfig::from_toml_str(&read_config(path)?)?,
        None => PoolConfig::default(),
    };
    let mut pool = ObjectPool::new(config);
    let ids: Vec<ObjectId> = (0..args.count)
        .map(|n| ObjectId::from_bytes(&n.to_le_bytes()))
        .collect();

    let start = Instant::now();
    for id in &ids {
        pool.lookup_unknown_object(id)?;
    }
    let insert_time = start.elapsed();
    let (insert_max, insert_mean) = probe_stats(&pool, &ids);

    let start = Instant::now();
    let mut hits = 0u64;
    for _ in 0..args.rounds {
        for id in &ids {
            if pool.lookup_object(id).is_some() {
                hits += 1;
            }
        }
    }
    let lookup_time = start.elapsed();
    let (lookup_max, lookup_mean) = probe_stats(&pool, &ids);
    info!(records = pool.len(), hits, "table-perf finished");

    match format {
        OutputFormat::Json => {
            let report = json!({
                "records": pool.len(),
                "capacity": pool.table_capacity(),
                "insert_ms": insert_time.as_secs_f64() * 1e3,
                "lookup_ms": lookup_time.as_secs_f64() * 1e3,
                "hits": hits,
                "probe_after_insert": { "max": insert_max, "mean": insert_mean },
                "probe_after_lookups": { "max": lookup_max, "mean": lookup_mean },
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            println!("{} {} records", "✓".green().bold(), pool.len().to_string().bold());
            println!(
                "  Table: {} buckets, load {:.2}",
                pool.table_capacity(),
                pool.len() as f64 / pool.table_capacity().max(1) as f64
            );
            println!("  Insert: {:.1} ms", insert_time.as_secs_f64() * 1e3);
            println!(
                "  Lookups: {} hits in {} rounds, {:.1} ms",
                hits,
                args.rounds,
                lookup_time.as_secs_f64() * 1e3
            );
            println!(
                "  Probe after insert:  max {}, mean {:.3}",
                insert_max.to_string().yellow(),
                insert_mean
            );
            println!(
                "  Probe after lookups: max {}, mean {:.3}",
                lookup_max.to_string().yellow(),
                lookup_mean
            );
        }
    }
    Ok(())
}

fn cmd_pack_graph(args: PackGraphArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => PackingConfig::from_toml_str(&read_config(path)?)?,
        None => PackingConfig::default(),
    };
    if let Some(bits) = args.size_bits {
        config.size_bits = bits;
    }
    config.validate()?;
    let chain = args.chain.max(1);

    // Sizes sweep up to twice the inline limit so some spill.
    let limit = config.size_limit();
    let span = (2 * limit).min(1 << 16).max(2);

    let store = Arc::new(InMemoryObjectStore::new());
    let mut pack = PackingData::new(store.clone(), config.clone())?;
    let mut spilled = 0usize;
    for n in 0..args.objects {
        let len = (n as u64 * 7919) % span;
        let mut data = vec![0u8; len as usize];
        data.extend_from_slice(&(n as u64).to_le_bytes());
        let id = store.write(&StoredObject::new(ObjectKind::Blob, data))?;
        let size = store.object_size(&id)?.unwrap_or(0);

        let pos = pack.add(id, ObjectType::Blob);
        pack.set_size(pos, size)?;
        if size >= limit {
            spilled += 1;
        }
        if pos % chain != 0 {
            pack.set_delta(pos, Some(pos - 1))?;
            pack.set_delta_child(pos - 1, Some(pos))?;
            pack.set_delta_size(pos, size / 2)?;
        }
    }

    let depths: Vec<usize> = (0..pack.len()).map(|pos| pack.delta_depth(pos)).collect();
    let max_depth = depths.iter().copied().max().unwrap_or(0);
    let deltas = depths.iter().filter(|d| **d > 0).count();
    info!(entries = pack.len(), deltas, "pack-graph finished");

    match format {
        OutputFormat::Json => {
            let report = json!({
                "entries": pack.len(),
                "capacity": pack.capacity(),
                "deltas": deltas,
                "max_depth": max_depth,
                "size_limit": limit,
                "spilled_sizes": spilled,
                "delta_size_array": pack.has_delta_size_array(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            println!(
                "{} {} entries ({} slots)",
                "✓".green().bold(),
                pack.len().to_string().bold(),
                pack.capacity()
            );
            println!("  Deltas: {}, max chain depth {}", deltas, max_depth.to_string().yellow());
            println!(
                "  Sizes: {} of {} above the inline limit {}",
                spilled.to_string().yellow(),
                pack.len(),
                limit
            );
            let side = if pack.has_delta_size_array() {
                "allocated".cyan()
            } else {
                "not needed".dimmed()
            };
            println!("  Delta size array: {side}");
        }
    }
    Ok(())
}
