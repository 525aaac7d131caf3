//! an executable for spectral embedding of graphs given by their dense adjacency matrices in csv files
//! example usage:
//! embed --csv "graph.csv" --out "graph" ase --dim 4 --algo truncated
//! embed --csv "g1.csv" --csv "g2.csv" --csv "g3.csv" --out "pop" mase --nbelbows 2 --scaled
//! embed --csv "dist.csv" mds --dim 2 --precomputed
//!
//! ase, mase or mds are the different algorithms, see related docs.
//! If --dim is not given the dimension is chosen by elbow search on the singular values.
//! Results are dumped in csv files prefixed by the --out argument (default "embedding").
//! Logging is driven by RUST_LOG.

use anyhow::anyhow;
use clap::{arg, Arg, ArgMatches, Command};
use ndarray::{Array2, Axis};

use std::path::{Path, PathBuf};

use spectembed::io::csv::{array_to_csv, matrix_from_csv, spectrum_to_csv};
use spectembed::prelude::*;

// decodes an optional argument, returns default if absent
fn parse_arg<T: std::str::FromStr>(matches: &ArgMatches, name: &str, default: T) -> anyhow::Result<T> {
    match matches.value_of(name) {
        Some(str) => str
            .parse::<T>()
            .map_err(|_| anyhow!("error parsing {}, got {}", name, str)),
        None => Ok(default),
    }
}

// dim and nbelbows, shared by all subcommands
fn parse_dim_args(matches: &ArgMatches) -> anyhow::Result<(Option<usize>, usize)> {
    let dim = match matches.value_of("dim") {
        Some(str) => Some(
            str.parse::<usize>()
                .map_err(|_| anyhow!("error parsing dim, got {}", str))?,
        ),
        None => None,
    };
    let nb_elbows = parse_arg(matches, "nbelbows", DEFAULT_NB_ELBOWS)?;
    Ok((dim, nb_elbows))
}

fn parse_svd_args(matches: &ArgMatches) -> anyhow::Result<SvdParams> {
    log::debug!("in parse_svd_args");
    let (dim, nb_elbows) = parse_dim_args(matches)?;
    let nb_iter = parse_arg(matches, "nbiter", DEFAULT_NB_ITER)?;
    let algorithm = match matches.value_of("algo") {
        Some(str) => str.parse::<SvdAlgorithm>()?,
        None => SvdAlgorithm::default(),
    };
    let params = SvdParams::new(dim, nb_elbows, algorithm, nb_iter)?;
    log::info!("svd parameters : {:?}", params);
    Ok(params)
}

fn output_path(prefix: &str, suffix: &str) -> PathBuf {
    PathBuf::from(format!("{}_{}.csv", prefix, suffix))
}

fn load_single(fnames: &[String]) -> anyhow::Result<Array2<f64>> {
    if fnames.len() != 1 {
        return Err(anyhow!("expecting exactly one csv file, got {}", fnames.len()));
    }
    matrix_from_csv::<f64>(Path::new(&fnames[0]))
}

fn run_ase(fnames: &[String], out: &str, matches: &ArgMatches) -> anyhow::Result<()> {
    let params = AseParams::from_svd_params(parse_svd_args(matches)?, !matches.is_present("nolcc"));
    let mat = load_single(fnames)?;
    let fit = params.embed(&mat.view())?;
    log::info!("ase : dimension {}", fit.get_n_components());
    array_to_csv(&output_path(out, "left"), &fit.get_latent_left().view())?;
    if let Some(right) = fit.get_latent_right() {
        array_to_csv(&output_path(out, "right"), &right.view())?;
    }
    spectrum_to_csv(&output_path(out, "spectrum"), &fit.get_singular_values().to_vec())?;
    Ok(())
}

fn run_mase(fnames: &[String], out: &str, matches: &ArgMatches) -> anyhow::Result<()> {
    let params = MaseParams::from_svd_params(
        parse_svd_args(matches)?,
        matches.is_present("scaled"),
        !matches.is_present("nolcc"),
    );
    let graphs = fnames
        .iter()
        .map(|f| matrix_from_csv::<f64>(Path::new(f)))
        .collect::<anyhow::Result<Vec<Array2<f64>>>>()?;
    let graphs = GraphCollection::from_vec(&graphs)?;
    let fit = params.embed(&graphs)?;
    log::info!("mase : dimension {}, undirected {}", fit.get_n_components(), fit.is_undirected());
    array_to_csv(&output_path(out, "left"), &fit.get_latent_left().view())?;
    if let Some(right) = fit.get_latent_right() {
        array_to_csv(&output_path(out, "right"), &right.view())?;
    }
    for (i, scores) in fit.get_scores().axis_iter(Axis(0)).enumerate() {
        array_to_csv(&output_path(out, &format!("scores_{}", i)), &scores)?;
    }
    spectrum_to_csv(&output_path(out, "spectrum"), &fit.get_singular_values().to_vec())?;
    Ok(())
}

fn run_mds(fnames: &[String], out: &str, matches: &ArgMatches) -> anyhow::Result<()> {
    let (dim, nb_elbows) = parse_dim_args(matches)?;
    let dissimilarity = if matches.is_present("precomputed") {
        Dissimilarity::Precomputed
    } else {
        Dissimilarity::Euclidean
    };
    let params = MdsParams::new(dim, nb_elbows, dissimilarity)?;
    let data = load_single(fnames)?;
    let fit = params.embed(&data.into_dyn())?;
    log::info!("mds : dimension {}", fit.get_n_components());
    array_to_csv(&output_path(out, "embedding"), &fit.get_embedding().view())?;
    spectrum_to_csv(&output_path(out, "spectrum"), &fit.get_singular_values().to_vec())?;
    Ok(())
}

// arguments shared by the 3 subcommands
fn dim_args() -> [Arg<'static>; 2] {
    [
        arg!(-d --dim <dim> "the embedding dimension, chosen by elbow search if absent").required(false),
        arg!(--nbelbows <nbelbows> "number of elbows searched, default 2").required(false),
    ]
}

// solver choice, mds picks its solver from the dimension
fn solver_args() -> [Arg<'static>; 2] {
    [
        arg!(--algo <algo> "svd algorithm : full, truncated or randomized (default)").required(false),
        arg!(--nbiter <nbiter> "power iterations of randomized svd, default 5").required(false),
    ]
}

pub fn main() {
    //
    env_logger::Builder::from_default_env().init();
    log::info!("logger initialized");
    //
    let matches = Command::new("embed")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("csvfile")
                .long("csv")
                .takes_value(true)
                .multiple_occurrences(true)
                .required(true)
                .help("csv file of a dense adjacency matrix, repeat for mase"),
        )
        .arg(
            Arg::new("out")
                .long("out")
                .takes_value(true)
                .required(false)
                .help("prefix of output files, default \"embedding\""),
        )
        .subcommand(
            Command::new("ase")
                .args(&dim_args())
                .args(&solver_args())
                .arg(Arg::new("nolcc").long("nolcc").help("skip connectivity check")),
        )
        .subcommand(
            Command::new("mase")
                .args(&dim_args())
                .args(&solver_args())
                .arg(Arg::new("scaled").long("scaled").help("scale graph bases by their singular values"))
                .arg(Arg::new("nolcc").long("nolcc").help("skip connectivity check")),
        )
        .subcommand(
            Command::new("mds")
                .args(&dim_args())
                .arg(
                    Arg::new("precomputed")
                        .long("precomputed")
                        .help("input is a symmetric dissimilarity matrix, default is samples in rows"),
                ),
        )
        .get_matches();
    //
    let fnames: Vec<String> = match matches.values_of("csvfile") {
        Some(values) => values.map(String::from).collect(),
        None => Vec::new(),
    };
    log::info!("input files : {:?}", fnames);
    let out = matches.value_of("out").unwrap_or("embedding");
    //
    let res = match matches.subcommand() {
        Some(("ase", sub_m)) => run_ase(&fnames, out, sub_m),
        Some(("mase", sub_m)) => run_mase(&fnames, out, sub_m),
        Some(("mds", sub_m)) => run_mds(&fnames, out, sub_m),
        _ => Err(anyhow!("expected subcommand ase, mase or mds")),
    };
    if let Err(e) = res {
        log::error!("embed failed : {:?}", e);
        println!("embed failed : {}", e);
        std::process::exit(1);
    }
} // end of main
