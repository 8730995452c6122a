use clap::Parser;

use mdd_xp::diagram::Diagram;
use mdd_xp::explain::{Explainer, FeatureOrder, XpConfig};
use mdd_xp::mdd::Mdd;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Diagram in `.mdd` format.
    #[arg(value_name = "FILE", default_value = "demos/data/tennis.mdd")]
    path: String,

    /// Instance to explain, e.g. `0,1,1`. All points of the feature space are explained when omitted.
    #[clap(long, value_name = "VALUES", value_delimiter = ',')]
    instance: Option<Vec<usize>>,

    /// Order of features during minimization: `asc`, `desc`, or a permutation like `2,0,1`.
    #[clap(long, value_name = "ORDER", default_value = "asc")]
    order: FeatureOrder,

    /// Verify that AXps and CXps are minimal hitting sets of each other.
    #[clap(long)]
    check: bool,

    /// Write the diagram in DOT format to this file.
    #[clap(long, value_name = "FILE")]
    dot: Option<String>,

    /// Log every engine call.
    #[clap(long)]
    verbose: bool,
}

/// Every point of the feature space, in lexicographic order.
fn all_instances(mdd: &Mdd) -> Vec<Vec<usize>> {
    let mut res = vec![vec![]];
    for f in 0..mdd.nf() {
        res = res
            .into_iter()
            .flat_map(|prefix| {
                (0..mdd.domain_size(f)).map(move |v| {
                    let mut inst = prefix.clone();
                    inst.push(v);
                    inst
                })
            })
            .collect();
    }
    res
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    let level = if args.verbose {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };
    simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    println!("args = {:?}", args);

    let mdd = Mdd::load(&args.path)?;
    println!("mdd = {:?}", mdd);

    if let Some(path) = &args.dot {
        std::fs::write(path, mdd.to_dot()?)?;
        println!("Written DOT to '{}'", path);
    }

    let instances = match args.instance {
        Some(inst) => vec![inst],
        None => all_instances(&mdd),
    };
    let names: Vec<&str> = mdd.features().iter().map(|f| f.name.as_str()).collect();
    let config = XpConfig { order: args.order };

    let mut occurrences = vec![0; mdd.nf()];
    let mut total_axps = 0;
    let mut total_cxps = 0;
    for inst in instances {
        let pred = mdd.predict(&inst)?;
        let xp = Explainer::with_config(&mdd, inst.clone(), pred, &config)?;
        let res = xp.enumerate()?;

        println!("instance {:?} -> class {}", inst, pred);
        for axp in &res.axps {
            let lits: Vec<String> = axp.iter().map(|&i| format!("{} = {}", names[i], inst[i])).collect();
            println!("  AXp: IF {} THEN class {}", lits.join(" AND "), pred);
        }
        for cxp in &res.cxps {
            let lits: Vec<String> = cxp.iter().map(|&i| format!("{} != {}", names[i], inst[i])).collect();
            println!("  CXp: class may change IF {}", lits.join(" AND "));
        }
        let irrelevant: Vec<&str> = res.irrelevant_features(mdd.nf()).iter().map(|&i| names[i]).collect();
        if !irrelevant.is_empty() {
            println!("  irrelevant: {}", irrelevant.join(", "));
        }

        if args.check {
            match res.check_duality() {
                Ok(()) => println!("  duality: ok"),
                Err(e) => println!("  duality: FAILED: {}", e),
            }
        }

        for (i, c) in res.feature_occurrences(mdd.nf()).into_iter().enumerate() {
            occurrences[i] += c;
        }
        total_axps += res.axps.len();
        total_cxps += res.cxps.len();
    }

    println!("Total {} AXps and {} CXps", total_axps, total_cxps);
    for (name, c) in names.iter().zip(occurrences) {
        println!("  {} occurs in {} AXp(s)", name, c);
    }

    let time_total = time_total.elapsed();
    println!("Done in {:.3} s", time_total.as_secs_f64());

    Ok(())
}
