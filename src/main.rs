use survival_model::runner::run_with_args;

fn main() {
    let run = match run_with_args() {
        Ok(run) => run,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    match run.outcomes.mean_survival_time() {
        Some(mean) => println!("Mean survival time: {mean}"),
        None => println!("Mean survival time: undefined"),
    }
}
