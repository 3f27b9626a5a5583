use std::{fs, io::Cursor, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use common::{
    catalog::{find_material, Printer, BASELINE_MATERIAL},
    units::format_volume,
};
use itertools::Itertools;
use nalgebra::Vector2;
use provenance::{
    frame::compute_display_offset,
    geometry::{compute_mass, BoundingBox},
    mesh::load_mesh,
    tree::{NodeId, DEFAULT_INFILL},
};
use tracing::{level_filters::LevelFilter, warn};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

use args::{Args, Command, PartArgs};
use splitter::app::{config::Config, NodeSummary, Session};

mod args;

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = filter::Targets::new()
        .with_default(LevelFilter::OFF)
        .with_target("splitter", level)
        .with_target("provenance", level)
        .with_target("remote_split", level);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match args.config.or_else(Config::config_dir) {
        Some(dir) => Config::load_or_default(&dir),
        None => {
            warn!("No config directory found, using defaults");
            Config::default()
        }
    };

    match args.command {
        Command::Inspect { mesh, part } => inspect(&config, &mesh, &part),
        Command::Split {
            mesh,
            generations,
            axis,
            server,
            printer,
            add_keys,
            analyze,
            timeout,
            part,
        } => {
            let mut config = config;
            config.server = server.or(config.server);
            config.add_keys |= add_keys;
            if let Some(printer) = printer {
                config.default_printer = printer;
            }

            let options = SplitOptions {
                generations,
                axis: axis.as_deref(),
                analyze,
                timeout: Duration::from_secs(timeout),
            };
            split(config, &mesh, &options, &part)
        }
        Command::Printers { remote } => printers(config, remote),
    }
}

fn inspect(config: &Config, path: &Path, part: &PartArgs) -> Result<()> {
    let format = extension(path);
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mesh = load_mesh(Cursor::new(data), &format)?;
    let Some(bounds) = mesh.bounds() else {
        bail!("{} has no vertices", path.display());
    };

    let unit = part.unit.unwrap_or(config.volume_unit);
    let material = part.material.as_deref().unwrap_or(BASELINE_MATERIAL);
    let infill = part.infill.unwrap_or(DEFAULT_INFILL as i32).clamp(0, 100) as u8;
    let volume = mesh.volume();

    println!(
        "Loaded `{}`. {{ vert: {}, face: {} }}",
        path.display(),
        mesh.vertex_count(),
        mesh.face_count()
    );
    print_bounds(&bounds);
    let offset = compute_display_offset(&bounds);
    println!(" \\ Display offset: ({:.2}, {:.2}, {:.2})", offset.x, offset.y, offset.z);
    println!(" \\ Volume: {} {}", format_volume(volume, unit), unit.suffix());

    match find_material(&config.materials, material) {
        Some(material) => println!(
            " \\ Mass: {:.2} g ({} at {infill}% infill)",
            compute_mass(volume, material.density, infill),
            material.name
        ),
        None => println!(" \\ Mass: unknown material `{material}`"),
    }

    Ok(())
}

struct SplitOptions<'a> {
    generations: u32,
    axis: Option<&'a str>,
    analyze: bool,
    timeout: Duration,
}

fn split(config: Config, path: &Path, options: &SplitOptions, part: &PartArgs) -> Result<()> {
    let timeout = options.timeout;
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|x| x.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".into());

    let unit = part.unit.unwrap_or(config.volume_unit);
    let mut session = Session::from_config(config)?;
    session.config.volume_unit = unit;

    let root = session.load_model(&name, data)?;
    if let Some(material) = &part.material {
        session.set_material(root, material)?;
    }
    if let Some(infill) = part.infill {
        session.set_infill(root, infill)?;
    }
    wait(&mut session, timeout)?;

    for generation in 0..options.generations {
        let open = session
            .registry()
            .leaves(root)
            .into_iter()
            .filter(|&id| session.registry().get(id).is_some_and(|x| x.is_synchronized()))
            .collect::<Vec<_>>();
        if open.is_empty() {
            warn!("No synchronized parts left to split");
            break;
        }

        println!("Generation {}: splitting {}", generation + 1, open.iter().join(", "));
        for id in open {
            if let Err(err) = session.request_split_plane(id, options.axis) {
                warn!("Can not split {id}: {err}");
                continue;
            }
            wait(&mut session, timeout)?;

            if let Some(plane) = session.displayed_split_plane(id) {
                let (p, n) = (plane.position, plane.normal);
                println!(
                    " \\ {id} cut along {} at ({:.2}, {:.2}, {:.2}), normal ({:.2}, {:.2}, {:.2})",
                    plane.axis, p.x, p.y, p.z, n.x, n.y, n.z
                );
            }

            if let Err(err) = session.commit_split(id) {
                warn!("Can not split {id}: {err}");
                continue;
            }
            wait(&mut session, timeout)?;
        }
    }

    if options.analyze {
        let leaves = session.registry().leaves(root);
        for id in leaves {
            if let Err(err) = session.analyze_failure(id) {
                warn!("Can not analyze {id}: {err}");
                continue;
            }
            wait(&mut session, timeout)?;
        }
    }

    print_tree(&session, root)?;

    let notices = session.notices();
    if !notices.is_empty() {
        println!();
        for notice in notices {
            println!("{notice}");
        }
    }

    Ok(())
}

fn printers(config: Config, remote: bool) -> Result<()> {
    let list = if remote {
        let mut session = Session::from_config(config)?;
        session.refresh_printers();
        wait(&mut session, Duration::from_secs(60))?;
        session.printers().to_vec()
    } else {
        config.printers
    };

    for printer in list {
        print_printer(&printer);
    }

    Ok(())
}

fn print_tree(session: &Session, root: NodeId) -> Result<()> {
    let registry = session.registry();
    let layout = session.layout();

    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        let summary = session.node_summary(id)?;
        let depth = registry.depth(id).unwrap_or_default();
        let position = layout.get(&id).copied().unwrap_or_else(Vector2::zeros);

        let mass = summary
            .mass
            .map(|x| format!("{x:.2} g"))
            .unwrap_or_else(|| "?".into());
        println!(
            "{}{} {} [{}] {}, {mass}, {} @ ({:.0}, {:.0})",
            "  ".repeat(depth),
            summary.id,
            summary.name,
            summary.state,
            summary.volume_display,
            if summary.synchronized { "synced" } else { "local" },
            position.x,
            position.y
        );

        if let Some(risk) = failure_risk(&summary) {
            println!("{}  \\ {risk}", "  ".repeat(depth));
        }

        if let Some(node) = registry.get(id) {
            stack.extend(node.children().iter().rev());
        }
    }

    Ok(())
}

fn failure_risk(summary: &NodeSummary) -> Option<String> {
    let score = summary.risk_score?;
    Some(match summary.worst_severity {
        Some(severity) => format!("Failure risk {score}%, worst issue {severity:?}"),
        None => format!("Failure risk {score}%, no issues"),
    })
}

fn print_bounds(bounds: &BoundingBox) {
    let size = bounds.extent();
    println!(
        " \\ Bounds: ({:.2}, {:.2}, {:.2}) to ({:.2}, {:.2}, {:.2}), size {:.2} × {:.2} × {:.2}",
        bounds.min.x,
        bounds.min.y,
        bounds.min.z,
        bounds.max.x,
        bounds.max.y,
        bounds.max.z,
        size.x,
        size.y,
        size.z
    );
}

fn print_printer(printer: &Printer) {
    let bed = printer.bed_size;
    println!("{} ({})", printer.name, printer.id);
    println!(" \\ Bed: {} × {} × {} mm", bed.x, bed.y, bed.z);
    println!(
        " \\ Materials: {}",
        printer.supported_materials.iter().join(", ")
    );
}

fn wait(session: &mut Session, timeout: Duration) -> Result<()> {
    if !session.wait_idle(timeout) {
        bail!("Timed out waiting for the split service");
    }
    Ok(())
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|x| x.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}
