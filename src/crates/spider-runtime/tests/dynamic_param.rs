//! Scenario 4: dynamic parameter. A CONFIG actor sets `N`; a downstream
//! producer/consumer pair's rate is the expression `N`. The config-only
//! pre-pass runs first, the GRT receives the parameter value back from the
//! config actor's kernel, and the full iteration then expands with that
//! concrete rate.

use spider_pisdf::{Graph, GraphRepository, VertexKind};
use spider_platform::{Cluster, ClusterIx, Pe, PeRole, Platform};
use spider_runtime::{ConstantParamKernel, IdentityKernel, Kernel, KernelRegistry, Runtime};
use spider_types::config::RuntimeConfig;
use std::sync::Arc;

fn single_lrt_platform() -> Platform {
    let mut platform = Platform::new();
    let mut cluster = Cluster::new(ClusterIx(0), "c0", 1 << 20);
    cluster.add_pe(Pe::new(0, 0, 0, "pe0", PeRole::Lrt));
    platform.add_cluster(cluster);
    platform
}

#[tokio::test]
async fn config_actor_feeds_back_a_dynamic_rate() {
    let mut repo = GraphRepository::new();
    let root = repo.insert_with(|id| {
        let mut g = Graph::new(id, "dynamic_param");
        g.add_dynamic_param("n").unwrap();
        g.add_vertex("size_config", VertexKind::Config { kernel: "n".into() }, 0, 0);
        let f = g.add_vertex("f", VertexKind::Normal { kernel: "produce".into() }, 0, 1);
        let g_vertex = g.add_vertex("g", VertexKind::Normal { kernel: "consume".into() }, 1, 0);
        g.add_edge(f, 0, "n", g_vertex, 0, "n").unwrap();
        g
    });
    repo.set_root(root);

    let mut kernels = KernelRegistry::new();
    kernels.register("n", Arc::new(ConstantParamKernel { values: vec![5] }) as Arc<dyn Kernel>);
    kernels.register("produce", Arc::new(IdentityKernel) as Arc<dyn Kernel>);
    kernels.register("consume", Arc::new(IdentityKernel) as Arc<dyn Kernel>);

    let mut runtime = Runtime::spawn(single_lrt_platform(), RuntimeConfig::default(), kernels);
    let report = runtime.run_iteration(&mut repo).await.unwrap();
    assert!(report.is_clean());

    let graph = repo.get(repo.root().unwrap()).unwrap();
    let n = graph.params().get_by_name("n").unwrap();
    assert_eq!(n.value(), Some(5));

    runtime.shutdown().await;
}

/// Without the config-only pre-pass the DYNAMIC parameter is never resolved
/// and expansion of the full graph fails trying to evaluate the `n` rate
/// expression; the pre-pass is therefore load-bearing, not an optimization.
#[tokio::test]
async fn expansion_fails_before_the_config_pre_pass_runs() {
    let mut repo = GraphRepository::new();
    let root = repo.insert_with(|id| {
        let mut g = Graph::new(id, "dynamic_param_unfed");
        g.add_dynamic_param("n").unwrap();
        let f = g.add_vertex("f", VertexKind::Normal { kernel: "produce".into() }, 0, 1);
        let g_vertex = g.add_vertex("g", VertexKind::Normal { kernel: "consume".into() }, 1, 0);
        g.add_edge(f, 0, "n", g_vertex, 0, "n").unwrap();
        g
    });
    repo.set_root(root);

    assert!(spider_core::expand(&mut repo).is_err());
}
