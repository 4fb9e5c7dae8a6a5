use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use symbion_lab::{
    GeminiGenerator, LabConfig, OracleClient, Param, Session, SimulationState, find_module,
    init_tracing, render_catalog, resolve_module, save_snapshot, spawn_visualizer,
};

fn lock(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let config = LabConfig::load();

    let mut state = SimulationState::default();
    if let Some(id) = &config.module {
        let module = resolve_module(id).unwrap_or_else(|| find_module(id));
        state = state.with_module(module.id);
    }

    let session = Arc::new(Mutex::new(Session::new(state)));
    let oracle = Arc::new(config.oracle_client());

    if !config.no_window {
        spawn_visualizer(Arc::clone(&session));
    }

    println!("\n╭──────────────────────────────────────────╮");
    println!("│      SymbiΩn Multiverse Lab              │");
    println!("│                                          │");
    println!("│ r(θ) = ϕ · θ · (1 + 0.1 sin(S))          │");
    println!("│                                          │");
    println!("│ /state  /modules  /quit                  │");
    println!("│ /module <id>       - select module       │");
    println!("│ /set <param> <v>   - move a slider       │");
    println!("│ /oracle            - consult the oracle  │");
    println!("│ /reset             - discard reading     │");
    println!("│ /snapshot [path]   - save spiral PNG     │");
    println!("│                                          │");
    println!("│ params: sTotal phi qubits coupling       │");
    println!("│         decoherence thetaMax             │");
    println!("╰──────────────────────────────────────────╯\n");

    if !oracle.is_connected() {
        println!("(no API key configured: the oracle will stay disconnected)\n");
    }

    loop {
        print!("lab: ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let mut words = input.split_whitespace();
        let command = words.next().unwrap_or("");
        let args: Vec<&str> = words.collect();

        match command {
            "/quit" => break,
            "/state" => println!("\n{}", lock(&session).render_report()),
            "/modules" => {
                let active = lock(&session).active_module();
                println!("\n{}", render_catalog(active));
            }
            "/module" => match args.first() {
                Some(id) => match lock(&session).select_module(id) {
                    Some(module) => println!("module: {} ({})\n", module.name(), module.description),
                    None => println!("unknown module '{}' (see /modules)\n", id),
                },
                None => println!("usage: /module <id>\n"),
            },
            "/set" => match args.as_slice() {
                [name, value] => set_param(&session, name, value),
                _ => println!("usage: /set <param> <value>\n"),
            },
            "/oracle" => consult(&session, &oracle),
            "/reset" => {
                lock(&session).reset_analysis();
                println!("analysis reset\n");
            }
            "/snapshot" => {
                let path = args.first().copied().unwrap_or("spiral.png");
                match save_snapshot(&lock(&session), path) {
                    Ok(()) => println!("saved {}\n", path),
                    Err(e) => println!("snapshot error: {}\n", e),
                }
            }
            _ => match args.as_slice() {
                [value] if Param::from_name(command).is_ok() => set_param(&session, command, value),
                _ => println!("unknown command '{}'\n", command),
            },
        }
    }

    Ok(())
}

fn set_param(session: &Mutex<Session>, name: &str, value: &str) {
    let result = Param::from_name(name).and_then(|param| {
        let mut session = lock(session);
        session.apply(param, value)?;
        Ok((param, session.state().value_of(param), session.stats()))
    });

    match result {
        Ok((param, v, stats)) => {
            println!("{} = {:.*}", param.label(), param.decimals(), v);
            println!("{}\n", stats);
        }
        Err(e) => println!("error: {}\n", e),
    }
}

/// Run the oracle on a background task so the prompt stays usable.
fn consult(session: &Arc<Mutex<Session>>, oracle: &Arc<OracleClient<GeminiGenerator>>) {
    let Some((snapshot, module)) = lock(session).begin_consult() else {
        println!("CALCULATING_ENTROPY... (a reading is already in progress)\n");
        return;
    };

    println!("\n🔮 consulting the Grimoire Vibratoire for {}...\n", module.name());

    let session = Arc::clone(session);
    let oracle = Arc::clone(oracle);
    tokio::spawn(async move {
        let result = oracle.consult(&snapshot, module).await;
        println!(
            "\n── Harmonic State: {}\n   \"{}\"\n   Focus: {}\n",
            result.harmonic_state, result.interpretation, result.suggested_focus
        );
        lock(&session).finish_consult(result);
    });
}
