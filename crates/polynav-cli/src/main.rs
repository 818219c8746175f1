//! CLI utility for inspecting polygon navigation meshes and running queries

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use glam::Vec3;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

use polynav::{reduce, GraphPath, NavMesh, NavMeshConfig, Status};

/// A CLI utility for polygon navigation mesh pathfinding
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a summary of a navigation mesh
    Inspect {
        /// Input mesh file (JSON)
        #[clap(long, value_parser)]
        mesh: PathBuf,

        /// Optional navigation config file (JSON)
        #[clap(long, value_parser)]
        config: Option<PathBuf>,
    },
    /// Find a path on a navigation mesh
    FindPath {
        /// Input mesh file (JSON)
        #[clap(long, value_parser)]
        mesh: PathBuf,

        /// Start position (x,y,z)
        #[clap(long, value_parser = parse_vector)]
        start: Vec3,

        /// End position (x,y,z)
        #[clap(long, value_parser = parse_vector)]
        end: Vec3,

        /// Follow the surface height along the path
        #[clap(long)]
        height: bool,

        /// Output path file
        #[clap(long, value_parser)]
        output: Option<PathBuf>,

        /// Optional navigation config file (JSON)
        #[clap(long, value_parser)]
        config: Option<PathBuf>,
    },
    /// Sample random walkable points
    RandomPoint {
        /// Input mesh file (JSON)
        #[clap(long, value_parser)]
        mesh: PathBuf,

        /// Center of the sampling ring (x,y,z); anywhere on the map if omitted
        #[clap(long, value_parser = parse_vector)]
        center: Option<Vec3>,

        /// Outer radius of the sampling ring
        #[clap(long, default_value = "10.0")]
        radius: f32,

        /// Inner radius of the sampling ring
        #[clap(long, default_value = "0.0")]
        min_distance: f32,

        /// Number of points to print
        #[clap(long, default_value = "1")]
        count: usize,

        /// Seed for reproducible sampling
        #[clap(long)]
        seed: Option<u64>,

        /// Optional navigation config file (JSON)
        #[clap(long, value_parser)]
        config: Option<PathBuf>,
    },
}

/// Parse a comma-separated vector
fn parse_vector(s: &str) -> Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err(format!(
            "Vector must have 3 components, got {}",
            parts.len()
        ));
    }

    let x = parts[0].trim().parse::<f32>().map_err(|e| e.to_string())?;
    let y = parts[1].trim().parse::<f32>().map_err(|e| e.to_string())?;
    let z = parts[2].trim().parse::<f32>().map_err(|e| e.to_string())?;

    Ok(Vec3::new(x, y, z))
}

/// Initialize logging, `RUST_LOG` overrides the default filter
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(false).init();
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    match args.command {
        Commands::Inspect { mesh, config } => inspect(&mesh, config.as_deref()),
        Commands::FindPath {
            mesh,
            start,
            end,
            height,
            output,
            config,
        } => find_path(
            &mesh,
            start,
            end,
            height,
            output.as_deref(),
            config.as_deref(),
        ),
        Commands::RandomPoint {
            mesh,
            center,
            radius,
            min_distance,
            count,
            seed,
            config,
        } => random_point(
            &mesh,
            center,
            radius,
            min_distance,
            count,
            seed,
            config.as_deref(),
        ),
    }
}

/// Load the navigation config, falling back to the defaults
fn load_config(path: Option<&Path>) -> Result<NavMeshConfig> {
    let Some(path) = path else {
        return Ok(NavMeshConfig::default());
    };

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    NavMeshConfig::from_json_str(&json)
        .map_err(|e| anyhow!("Invalid config {}: {}", path.display(), e))
}

fn load_mesh(mesh_path: &Path, config: Option<&Path>) -> Result<NavMesh> {
    let config = load_config(config)?;

    println!("Loading navigation mesh from {}...", mesh_path.display());
    let nav_mesh = NavMesh::load_from_json(mesh_path, config)
        .map_err(|e| anyhow!("Failed to load navigation mesh: {}", e))?;
    println!(
        "Loaded map {}: {} polygons, {} connections",
        nav_mesh.map_id(),
        nav_mesh.graph().polygon_count(),
        nav_mesh.graph().connection_count()
    );

    Ok(nav_mesh)
}

/// Print a summary of a navigation mesh
fn inspect(mesh_path: &Path, config: Option<&Path>) -> Result<()> {
    let nav_mesh = load_mesh(mesh_path, config)?;
    let graph = nav_mesh.graph();

    println!("Map size: {} x {}", nav_mesh.width(), nav_mesh.height());
    println!("Three dimensional: {}", nav_mesh.is_three_dimensional());
    println!("Heuristic scale: {}", graph.heuristic_scale());
    println!("BVH depth: {}", nav_mesh.spatial_index().depth());

    let isolated = graph
        .polygons()
        .iter()
        .filter(|polygon| polygon.connections().is_empty())
        .count();
    println!("Polygons without neighbours: {}", isolated);

    if let Err(e) = graph.check_symmetry() {
        log::warn!("Adjacency is not symmetric: {}", e);
    }

    let config_json = serde_json::to_string_pretty(nav_mesh.config())
        .context("Failed to serialize config")?;
    println!("Config:\n{}", config_json);

    Ok(())
}

/// Find a path on a navigation mesh
fn find_path(
    mesh_path: &Path,
    start: Vec3,
    end: Vec3,
    height: bool,
    output: Option<&Path>,
    config: Option<&Path>,
) -> Result<()> {
    let nav_mesh = load_mesh(mesh_path, config)?;

    println!("Finding path from {:?} to {:?}...", start, end);

    let mut path = GraphPath::new();
    let status = nav_mesh.query_graph_path(&start, &end, &mut path);
    if status.is_failure() {
        return Err(anyhow!("Failed to find path: {}", status));
    }
    if status == Status::Success {
        println!("Found path with {} polygons", path.polygons().len());
    } else {
        println!("Start and end share a polygon");
    }

    let metrics = nav_mesh.last_search_metrics();
    log::debug!(
        "Search visited {} nodes, {} open list additions",
        metrics.visited_nodes,
        metrics.open_list_additions
    );

    let waypoints = reduce(&path, height).into_vec();
    println!("Generated straight path with {} waypoints", waypoints.len());

    // Output the path
    if let Some(output_path) = output {
        println!("Saving path to {}...", output_path.display());

        let mut file = File::create(output_path)
            .with_context(|| format!("Failed to create output file: {}", output_path.display()))?;

        writeln!(file, "# Path from {:?} to {:?}", start, end)?;
        writeln!(file, "# {} waypoints", waypoints.len())?;

        for waypoint in &waypoints {
            writeln!(file, "{},{},{}", waypoint.x, waypoint.y, waypoint.z)?;
        }
    } else {
        println!("Path:");
        for (i, waypoint) in waypoints.iter().enumerate() {
            println!("{}: {},{},{}", i, waypoint.x, waypoint.y, waypoint.z);
        }
    }

    Ok(())
}

/// Sample random walkable points
fn random_point(
    mesh_path: &Path,
    center: Option<Vec3>,
    radius: f32,
    min_distance: f32,
    count: usize,
    seed: Option<u64>,
    config: Option<&Path>,
) -> Result<()> {
    let nav_mesh = load_mesh(mesh_path, config)?;
    let mut rng = match seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };

    let points = match center {
        Some(center) => {
            let mut points =
                nav_mesh.get_random_points_in_radius_with_rng(&center, radius, min_distance, &mut rng);
            points.truncate(count);
            points
        }
        None => (0..count)
            .map(|_| nav_mesh.get_random_point_in_map_with_rng(&mut rng))
            .collect(),
    };

    if points.is_empty() {
        return Err(anyhow!("No walkable point found"));
    }

    for (i, point) in points.iter().enumerate() {
        println!("{}: {},{},{}", i, point.x, point.y, point.z);
    }

    Ok(())
}
