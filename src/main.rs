use mdp_lp::{config::ConfigError, envs::cliff_walking::CliffWalking, ui::*, *};
use std::error::Error;
use std::rc::Rc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> std::result::Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mdp_lp=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match LpConfig::load("lp.toml") {
        Ok(config) => config,
        Err(ConfigError::Io(_)) => LpConfig::default(),
        Err(e) => return Err(e.into()),
    };
    info!(event = "config", gamma = config.gamma);

    let env = Rc::new(CliffWalking::new());
    let partition = StatePartition::new(env.n_s(), env.terminal_states(), env.unreachable_states())?;
    let lp = LinearProgramming::new(Rc::clone(&env) as Rc<dyn Mdp>, partition, config.clone())?;

    let model = lp.build_model()?;
    if let Some(path) = config.model_path() {
        model.save_lp(path)?;
    }
    let plan = lp.solve_model(model)?;

    println!("value function = ");
    print!(
        "{}",
        render_values(CliffWalking::COLS, env.n_s(), &plan.values_with_terminals())
    );
    println!("optimal policy = ");
    print!("{}", render_policy(CliffWalking::COLS, env.n_s(), plan.policy()));

    Ok(())
}
