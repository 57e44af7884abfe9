use std::{ path::PathBuf, rc::Rc };
use ndarray as nd;
use serde::Deserialize;
use tracing_subscriber::{ fmt, prelude::*, EnvFilter };
use sparse_lindblad::{
    mkdir,
    write_npz,
    hilbert::{ HilbertSpace, LocalHilbert },
    lindblad::TransverseIsing,
    operator::{ Connections, Operator },
};

const DEFAULT_SITES: usize = 3;
const DEFAULT_MODEL: TransverseIsing
    = TransverseIsing { h: 1.0, j: 0.5, gamma: 0.1, pbc: false };

/// Contents of an optional TOML parameter file:
/// ```toml
/// sites = 3
///
/// [model]
/// h = 1.0
/// j = 0.5
/// gamma = 0.1
/// pbc = false
/// ```
#[derive(Clone, Debug, Deserialize)]
struct Config {
    #[serde(default = "default_sites")]
    sites: usize,
    #[serde(default = "default_model")]
    model: TransverseIsing,
}

fn default_sites() -> usize { DEFAULT_SITES }

fn default_model() -> TransverseIsing { DEFAULT_MODEL }

impl Default for Config {
    fn default() -> Self {
        Self { sites: DEFAULT_SITES, model: DEFAULT_MODEL }
    }
}

fn load_config() -> anyhow::Result<Config> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&text)?;
            tracing::info!(%path, ?config, "loaded parameters");
            Ok(config)
        },
        None => Ok(Config::default()),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_target(true))
        .init();

    let outdir = PathBuf::from("output");
    mkdir!(outdir);

    let Config { sites, model } = load_config()?;
    let hilbert = Rc::new(LocalHilbert::spin_half(sites));
    let lind = model.lindbladian(Rc::clone(&hilbert))?;

    // all spins up on both sides, i.e. the element ρ[↑↑…, ↑↑…]
    let v: Vec<f64> = vec![1.0; lind.hilbert_doubled().size()];
    let mut conns = Connections::new();
    lind.find_conn(&v, &mut conns)?;
    tracing::info!(
        sites,
        n_jump_ops = lind.jump_operators().len(),
        n_conns = conns.len(),
        "enumerated connections of the all-up configuration"
    );

    let liouvillian: nd::Array2<_> = lind.to_dense()?;
    let hnh: nd::Array2<_> = lind.effective().hnh().to_dense()?;
    write_npz!(
        outdir.join("dissipative_ising.npz"),
        arrays: {
            "liouvillian" => &liouvillian,
            "hnh" => &hnh,
            "sites" => &nd::array![hilbert.size() as u32],
            "params" => &nd::array![model.h, model.j, model.gamma],
        }
    );

    println!("done");
    Ok(())
}
