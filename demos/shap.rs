use clap::Parser;

use mdd_xp::diagram::Diagram;
use mdd_xp::mdd::Mdd;
use mdd_xp::shap::{ShapExplainer, ValueFunction};

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Diagram in `.mdd` format.
    #[arg(value_name = "FILE", default_value = "demos/data/tennis.mdd")]
    path: String,

    /// Instance to attribute, e.g. `0,1,1`.
    #[clap(long, value_name = "VALUES", value_delimiter = ',', default_value = "0,1,0")]
    instance: Vec<usize>,

    /// Characteristic function: `expected` or `similarity`.
    #[clap(long, value_name = "NAME", default_value = "expected")]
    value_fn: ValueFunction,

    /// Log every engine call.
    #[clap(long)]
    verbose: bool,
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

    let inst = &args.instance;
    let vf = args.value_fn;
    println!("instance {:?} -> class {}", inst, mdd.predict(inst)?);

    let shap = ShapExplainer::new(&mdd);
    let all_fixed = vec![false; mdd.nf()];
    let all_universal = vec![true; mdd.nf()];
    let v_full = shap.value(inst, &all_fixed, vf)?;
    let v_empty = shap.value(inst, &all_universal, vf)?;
    println!("v(all features) = {}, v(no feature) = {}", v_full, v_empty);

    let scores = shap.shapley_scores(inst, vf)?;
    for (i, (f, score)) in mdd.features().iter().zip(&scores).enumerate() {
        println!("  {:>12} = {:>3}: {:+.6}", f.name, inst[i], score);
    }
    println!("Sum of scores: {:.6}", scores.iter().sum::<f64>());

    let time_total = time_total.elapsed();
    println!("Done in {:.3} s", time_total.as_secs_f64());

    Ok(())
}
