//! Demo binary wiring `spider-pisdf`/`spider-core`/`spider-platform`/
//! `spider-runtime` together for the end-to-end scenarios worked through by
//! the specification: static homogeneous rates, up/down-sampling with a
//! self-loop delay, dynamic parameters, cross-cluster mapping and the
//! fork/fork optimizer pass. Not a general graph-authoring CLI: there is no
//! YAML graph format here, every scenario builds its `GraphRepository`
//! directly against the library API, the way a host application embedding
//! this runtime would.

use clap::{Parser, Subcommand};
use spider_core::{allocate_fifos, optimize, schedule, SrGraph, SrVertexKind};
use spider_pisdf::{Graph, GraphRepository, VertexKind};
use spider_platform::{Cluster, ClusterIx, InterClusterBus, MemoryBus, Pe, PeRole, Platform, ZeroCost};
use spider_runtime::{ConstantParamKernel, IdentityKernel, Kernel, KernelRegistry, Runtime};
use spider_types::config::RuntimeConfig;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "spider")]
#[command(about = "Spider 2.0 dataflow runtime demo", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Static homogeneous rates: one producer feeding one consumer 1:1.
    Homogeneous,
    /// Up-sampling: a producer's output fans out through a synthesized fork.
    Upsample,
    /// Down-sampling through a self-loop delay (init/end vertex pair).
    SelfLoopDelay,
    /// A config actor resolving a DYNAMIC parameter that gates a later rate.
    DynamicParam,
    /// Two clusters linked by a bus, forcing a cross-cluster SEND/RECEIVE pair.
    CrossCluster,
    /// A chain of two forks feeding the same widths, merged by the optimizer.
    ForkFork,
    /// Runs every scenario above in sequence.
    All,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Homogeneous => run_homogeneous().await?,
        Commands::Upsample => run_upsample().await?,
        Commands::SelfLoopDelay => run_self_loop_delay().await?,
        Commands::DynamicParam => run_dynamic_param().await?,
        Commands::CrossCluster => run_cross_cluster().await?,
        Commands::ForkFork => run_fork_fork().await?,
        Commands::All => {
            run_homogeneous().await?;
            run_upsample().await?;
            run_self_loop_delay().await?;
            run_dynamic_param().await?;
            run_cross_cluster().await?;
            run_fork_fork().await?;
        }
    }
    Ok(())
}

/// A single worker PE, acting as its own LRT, inside one cluster.
fn single_pe_platform() -> Platform {
    let mut platform = Platform::new();
    let mut cluster = Cluster::new(ClusterIx(0), "cluster0", 1 << 20);
    cluster.add_pe(Pe::new(0, 0, 0, "pe0", PeRole::Lrt));
    platform.add_cluster(cluster);
    platform
}

fn kernels_with(entries: impl IntoIterator<Item = (&'static str, Arc<dyn Kernel>)>) -> KernelRegistry {
    let mut registry = KernelRegistry::new();
    for (name, kernel) in entries {
        registry.register(name, kernel);
    }
    registry
}

async fn drive_one_iteration(platform: Platform, mut repo: GraphRepository, kernels: KernelRegistry) -> anyhow::Result<()> {
    let mut runtime = Runtime::spawn(platform, RuntimeConfig::default(), kernels);
    let report = runtime.run_iteration(&mut repo).await?;
    println!("  iteration clean: {}", report.is_clean());
    for failure in &report.failures {
        println!("  failure: task {:?} on {:?}: {}", failure.task, failure.lrt, failure.message);
    }
    runtime.shutdown().await;
    Ok(())
}

async fn run_homogeneous() -> anyhow::Result<()> {
    println!("== homogeneous rates ==");
    let mut repo = GraphRepository::new();
    let root = repo.insert_with(|id| {
        let mut g = Graph::new(id, "homogeneous");
        let producer = g.add_vertex("producer", VertexKind::Normal { kernel: "produce".into() }, 0, 1);
        let consumer = g.add_vertex("consumer", VertexKind::Normal { kernel: "consume".into() }, 1, 0);
        g.add_edge(producer, 0, "4", consumer, 0, "4").expect("homogeneous edge");
        g
    });
    repo.set_root(root);

    let kernels = kernels_with([
        ("produce", Arc::new(IdentityKernel) as Arc<dyn Kernel>),
        ("consume", Arc::new(IdentityKernel) as Arc<dyn Kernel>),
    ]);
    drive_one_iteration(single_pe_platform(), repo, kernels).await
}

async fn run_upsample() -> anyhow::Result<()> {
    println!("== up-sampling (fork synthesized) ==");
    let mut repo = GraphRepository::new();
    let root = repo.insert_with(|id| {
        let mut g = Graph::new(id, "upsample");
        let producer = g.add_vertex("producer", VertexKind::Normal { kernel: "produce".into() }, 0, 1);
        let consumer = g.add_vertex("consumer", VertexKind::Normal { kernel: "consume".into() }, 1, 0);
        // producer fires once at rate 8, consumer fires twice at rate 4: a fork is synthesized.
        g.add_edge(producer, 0, "8", consumer, 0, "4").expect("upsample edge");
        g
    });
    repo.set_root(root);

    let kernels = kernels_with([
        ("produce", Arc::new(IdentityKernel) as Arc<dyn Kernel>),
        ("consume", Arc::new(IdentityKernel) as Arc<dyn Kernel>),
    ]);
    drive_one_iteration(single_pe_platform(), repo, kernels).await
}

async fn run_self_loop_delay() -> anyhow::Result<()> {
    println!("== self-loop with delay (init/end) ==");
    let mut repo = GraphRepository::new();
    let root = repo.insert_with(|id| {
        let mut g = Graph::new(id, "self_loop");
        let accumulator = g.add_vertex("accumulator", VertexKind::Normal { kernel: "accumulate".into() }, 1, 1);
        let edge = g.add_edge(accumulator, 0, "4", accumulator, 0, "4").expect("self-loop edge");
        g.add_delay(edge, "4", true).expect("delay large enough for one firing");
        g
    });
    repo.set_root(root);

    let kernels = kernels_with([("accumulate", Arc::new(IdentityKernel) as Arc<dyn Kernel>)]);
    drive_one_iteration(single_pe_platform(), repo, kernels).await
}

async fn run_dynamic_param() -> anyhow::Result<()> {
    println!("== dynamic parameter feedback ==");
    let mut repo = GraphRepository::new();
    let root = repo.insert_with(|id| {
        let mut g = Graph::new(id, "dynamic_param");
        g.add_dynamic_param("n").expect("declare dynamic param n");
        g.add_vertex("size_config", VertexKind::Config { kernel: "n".into() }, 0, 0);
        let producer = g.add_vertex("producer", VertexKind::Normal { kernel: "produce".into() }, 0, 1);
        let consumer = g.add_vertex("consumer", VertexKind::Normal { kernel: "consume".into() }, 1, 0);
        g.add_edge(producer, 0, "n", consumer, 0, "n").expect("dynamic-rate edge");
        g
    });
    repo.set_root(root);

    let kernels = kernels_with([
        ("n", Arc::new(ConstantParamKernel { values: vec![4] }) as Arc<dyn Kernel>),
        ("produce", Arc::new(IdentityKernel) as Arc<dyn Kernel>),
        ("consume", Arc::new(IdentityKernel) as Arc<dyn Kernel>),
    ]);
    drive_one_iteration(single_pe_platform(), repo, kernels).await
}

fn two_cluster_platform() -> Platform {
    let mut platform = Platform::new();
    let mut c0 = Cluster::new(ClusterIx(0), "cluster0", 1 << 20);
    c0.add_pe(Pe::new(0, 0, 0, "pe0", PeRole::Lrt));
    let mut c1 = Cluster::new(ClusterIx(1), "cluster1", 1 << 20);
    c1.add_pe(Pe::new(0, 1, 0, "pe1", PeRole::Lrt));
    let ix0 = platform.add_cluster(c0);
    let ix1 = platform.add_cluster(c1);
    platform.add_inter_cluster_bus(
        ix0,
        ix1,
        InterClusterBus { a_to_b: MemoryBus::uniform(ZeroCost), b_to_a: MemoryBus::uniform(ZeroCost) },
    );
    platform
}

async fn run_cross_cluster() -> anyhow::Result<()> {
    println!("== cross-cluster mapping (SEND/RECEIVE synthesized) ==");
    let mut repo = GraphRepository::new();
    let root = repo.insert_with(|id| {
        let mut g = Graph::new(id, "cross_cluster");
        let producer = g.add_vertex("producer", VertexKind::Normal { kernel: "produce".into() }, 0, 1);
        let consumer = g.add_vertex("consumer", VertexKind::Normal { kernel: "consume".into() }, 1, 0);
        g.add_edge(producer, 0, "4", consumer, 0, "4").expect("cross-cluster edge");
        g
    });
    repo.set_root(root);

    let kernels = kernels_with([
        ("produce", Arc::new(IdentityKernel) as Arc<dyn Kernel>),
        ("consume", Arc::new(IdentityKernel) as Arc<dyn Kernel>),
    ]);
    drive_one_iteration(two_cluster_platform(), repo, kernels).await
}

async fn run_fork_fork() -> anyhow::Result<()> {
    println!("== fork/fork optimizer merge ==");
    // A fork feeding a second fork is a pattern single-rate expansion itself
    // produces for a three-way uneven split; built directly here, as the
    // scheduler and allocator only ever see an already-expanded graph.
    let mut sr = SrGraph::new();
    let a = sr.add_vertex("a", SrVertexKind::Normal { kernel: "produce".into() });
    let fork1 = sr.add_vertex("f1", SrVertexKind::Fork);
    let fork2 = sr.add_vertex("f2", SrVertexKind::Fork);
    let x = sr.add_vertex("x", SrVertexKind::Normal { kernel: "consume".into() });
    let y = sr.add_vertex("y", SrVertexKind::Normal { kernel: "consume".into() });
    let z = sr.add_vertex("z", SrVertexKind::Normal { kernel: "consume".into() });
    sr.connect(a, fork1, 12);
    sr.connect(fork1, fork2, 8);
    sr.connect(fork1, x, 4);
    sr.connect(fork2, y, 4);
    sr.connect(fork2, z, 4);

    let before = sr.vertices().count();
    let passes = optimize(&mut sr);
    let forks = sr.vertices().filter(|v| matches!(v.kind(), SrVertexKind::Fork)).count();
    println!("  vertices before optimize: {before}, passes applied: {passes}, vertices after: {}, forks remaining: {forks}", sr.vertices().count());

    let platform = single_pe_platform();
    let schedule_result = schedule(&sr, &platform, &RuntimeConfig::default())?;
    let plan = allocate_fifos(&sr, &schedule_result)?;
    println!("  tasks committed: {}", schedule_result.tasks_in_order().count());
    for edge in sr.edges() {
        if let Some(fifo) = plan.fifo_for_edge(edge.id()) {
            println!("  edge {:?} -> fifo {:?}: {} bytes, {:?}", edge.id(), fifo.id(), fifo.size(), fifo.attribute());
        }
    }
    Ok(())
}
