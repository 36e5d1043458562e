//! Headless demo: a starter party fights one wild encounter on autopilot.

use agentmon_battle::battle::engine::MENU_FIGHT;
use agentmon_battle::{
    AgentInst, AnimationCue, BattleConfig, BattleContext, BattleEngineError, BattleResult,
    BattleRng, BattleStateError, ContentCatalog, Encounter, EncounterKind, Input, ItemId, Phase,
    PresentationSink, Roster, RosterAccess, SoundCue, SpeciesId,
};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};

/// Inputs before the demo gives up on an encounter that will not end.
const MAX_STEPS: usize = 10_000;

#[derive(Parser, Debug)]
#[command(name = "agentmon-battle", about = "Play one wild AgentMon encounter on autopilot")]
struct Cli {
    /// Directory holding species.ron, moves.ron, items.ron and type_chart.ron
    #[arg(long, value_name = "DIR")]
    data: Option<PathBuf>,
    /// RON file with battle tunables
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// RNG seed for a reproducible encounter
    #[arg(long)]
    seed: Option<u64>,
    /// Print the roster as JSON once the encounter ends
    #[arg(long)]
    json: bool,
}

/// Prints narration as it arrives.
struct StdoutSink;

impl PresentationSink for StdoutSink {
    fn show_messages(&mut self, lines: &[String]) {
        for line in lines {
            println!("  {line}");
        }
    }

    fn play_animation(&mut self, cue: AnimationCue) {
        debug!(?cue, "animation");
    }

    fn play_sound(&mut self, cue: SoundCue) {
        debug!(?cue, "sound");
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> BattleResult<()> {
    let catalog = match &cli.data {
        Some(dir) => ContentCatalog::load_dir(dir)?,
        None => ContentCatalog::bundled()?,
    };
    let config = match &cli.config {
        Some(path) => BattleConfig::load(path)?,
        None => BattleConfig::default(),
    };
    let mut rng = match cli.seed {
        Some(seed) => BattleRng::new_seeded(seed),
        None => BattleRng::new_random(),
    };

    let mut roster = starter_roster(&catalog, &config)?;
    let opponent = AgentInst::new_wild(&catalog, &SpeciesId::new("tokenite"), 5)?;
    let mut sink = StdoutSink;

    let mut ctx =
        BattleContext::new(&catalog, &mut roster, &mut rng, &mut sink).with_config(config);
    let mut encounter = Encounter::start(opponent, EncounterKind::Wild, &mut ctx)?;
    let mut outcome = None;
    for _ in 0..MAX_STEPS {
        let input = autopilot(&encounter, &*ctx.roster)?;
        outcome = encounter.advance(input, &mut ctx)?;
        if outcome.is_some() {
            break;
        }
    }
    let outcome = outcome.ok_or_else(|| {
        BattleEngineError::from(BattleStateError::InconsistentState(format!(
            "encounter still running after {MAX_STEPS} inputs"
        )))
    })?;
    info!(?outcome, "demo encounter over");
    println!("Outcome: {outcome:?}");

    if cli.json {
        println!("{}", roster.to_json()?);
    }
    Ok(())
}

fn starter_roster(catalog: &ContentCatalog, config: &BattleConfig) -> BattleResult<Roster> {
    let mut roster = Roster::from_config(config);
    roster.add_agent(AgentInst::new(catalog, &SpeciesId::new("sparky"), 8)?);
    roster.add_agent(AgentInst::new(catalog, &SpeciesId::new("muse"), 8)?);
    roster.add_item(ItemId::new("token_pack"), 2);
    roster.add_item(ItemId::new("free_tier_key"), 3);
    Ok(roster)
}

/// Always fights with the first move that has PP, declines new moves and
/// sends out the first agent still standing.
fn autopilot(encounter: &Encounter, roster: &dyn RosterAccess) -> BattleResult<Input> {
    let cursors = encounter.cursors();
    let input = match encounter.phase() {
        Phase::Intro => Input::Idle,
        Phase::Catch => Input::Idle,
        Phase::Menu if cursors.menu == MENU_FIGHT => Input::Confirm,
        Phase::Menu if cursors.menu % 2 == 1 => Input::Left,
        Phase::Menu => Input::Up,
        Phase::MoveSelect => {
            let active = roster
                .party()
                .get(encounter.player_index())
                .ok_or(BattleStateError::InvalidPartyIndex(encounter.player_index()))?;
            match active.moves().get(cursors.moves) {
                Some(instance) if instance.is_usable() => Input::Confirm,
                _ => Input::Down,
            }
        }
        Phase::Switch => match roster.party().get(cursors.switch) {
            Some(agent) if !agent.is_fainted() => Input::Confirm,
            _ => Input::Down,
        },
        Phase::LearnMove | Phase::Bag => Input::Cancel,
        _ => Input::Confirm,
    };
    Ok(input)
}
