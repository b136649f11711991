// Scenario Definitions: congestion, idle, bottleneck, drain and degradation runs
// Zero engine changes: all scenario logic is in setup/event closures

use netflow_engine::NetworkSimulator;

// ─── Scenario Configuration ─────────────────────────────────────────────────

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    pub category: &'static str,
    pub ticks: u64,
    pub criteria: PassCriteria,
    /// Pre-run setup (rates, capacities)
    pub setup: Option<Box<dyn Fn(&mut NetworkSimulator) + Send + Sync>>,
    /// Mid-simulation events (e.g., degrade a link at tick 100)
    pub mid_event: Option<Box<dyn Fn(&mut NetworkSimulator, u64) + Send + Sync>>,
}

/// Scenario-specific expectations on top of the per-tick invariants
/// (link load, queue bound, conservation) that every run must hold.
#[derive(Default)]
pub struct PassCriteria {
    pub max_loss_rate: Option<f64>,
    pub min_delivery_rate: Option<f64>,
    pub require_zero_drops: bool,
    /// Nothing may be generated at all.
    pub require_idle: bool,
    /// No packet may remain in flight or queued at the end.
    pub require_drained: bool,
}

// ─── Setup Helpers ──────────────────────────────────────────────────────────

fn silence_all(sim: &mut NetworkSimulator) {
    for id in ["A", "B", "C", "D", "E"] {
        sim.set_node_rate(id, 0.0);
    }
}

fn widen_all_links(sim: &mut NetworkSimulator, capacity: u32) {
    for id in ["A-B", "A-C", "B-C", "B-D", "C-D", "C-E", "D-E"] {
        sim.set_link_capacity(id, capacity);
    }
}

// ─── Scenario Registry ──────────────────────────────────────────────────────

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "BASELINE_CONGESTION",
            label: "Baseline: default rates",
            category: "congestion",
            ticks: 300,
            criteria: PassCriteria::default(),
            setup: None,
            mid_event: None,
        },
        Scenario {
            name: "IDLE_NETWORK",
            label: "Idle: all rates zero",
            category: "baseline",
            ticks: 100,
            criteria: PassCriteria { require_idle: true, require_drained: true, ..Default::default() },
            setup: Some(Box::new(silence_all)),
            mid_event: None,
        },
        Scenario {
            name: "SINGLE_SOURCE_BOTTLENECK",
            label: "Bottleneck: A=4, A-B cap 2",
            category: "congestion",
            ticks: 200,
            criteria: PassCriteria { min_delivery_rate: Some(0.5), ..Default::default() },
            setup: Some(Box::new(|sim: &mut NetworkSimulator| {
                silence_all(sim);
                sim.set_node_rate("A", 4.0);
                sim.set_link_capacity("A-B", 2);
            })),
            mid_event: None,
        },
        Scenario {
            name: "UNSATURATED_DRAIN",
            label: "Unsaturated: A=4, wide links",
            category: "delivery",
            ticks: 260,
            criteria: PassCriteria {
                require_zero_drops: true,
                require_drained: true,
                min_delivery_rate: Some(1.0),
                ..Default::default()
            },
            setup: Some(Box::new(|sim: &mut NetworkSimulator| {
                silence_all(sim);
                widen_all_links(sim, 1000);
                sim.set_node_rate("A", 4.0);
            })),
            mid_event: Some(Box::new(|sim: &mut NetworkSimulator, tick: u64| {
                if tick == 200 {
                    sim.set_node_rate("A", 0.0);
                }
            })),
        },
        Scenario {
            name: "TRAFFIC_SURGE",
            label: "Surge: rates double at t=100",
            category: "congestion",
            ticks: 300,
            criteria: PassCriteria::default(),
            setup: None,
            mid_event: Some(Box::new(|sim: &mut NetworkSimulator, tick: u64| {
                if tick == 100 {
                    for (id, rate) in [("A", 30.0), ("B", 16.0), ("C", 20.0), ("D", 16.0), ("E", 24.0)] {
                        sim.set_node_rate(id, rate);
                    }
                }
            })),
        },
        Scenario {
            name: "LINK_DEGRADATION",
            label: "Degrade: B-D, C-E to 1 at t=100",
            category: "congestion",
            ticks: 300,
            criteria: PassCriteria::default(),
            setup: None,
            mid_event: Some(Box::new(|sim: &mut NetworkSimulator, tick: u64| {
                if tick == 100 {
                    sim.set_link_capacity("B-D", 1);
                    sim.set_link_capacity("C-E", 1);
                }
            })),
        },
        Scenario {
            name: "LOAD_SHED_RECOVERY",
            label: "Recovery: traffic stops at t=150",
            category: "delivery",
            ticks: 400,
            criteria: PassCriteria { require_drained: true, ..Default::default() },
            setup: None,
            mid_event: Some(Box::new(|sim: &mut NetworkSimulator, tick: u64| {
                if tick == 150 {
                    silence_all(sim);
                }
            })),
        },
        Scenario {
            name: "LIGHT_LOAD",
            label: "Light: uniform rate 1",
            category: "delivery",
            ticks: 300,
            criteria: PassCriteria { max_loss_rate: Some(0.01), ..Default::default() },
            setup: Some(Box::new(|sim: &mut NetworkSimulator| {
                for id in ["A", "B", "C", "D", "E"] {
                    sim.set_node_rate(id, 1.0);
                }
            })),
            mid_event: None,
        },
    ]
}
