//! Subcommands.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::info;

use dialectic_config::DialecticConfig;
use dialectic_core::{AfRequest, Interaction, ValidationError};
use dialectic_engine::{Engine, EngineSettings, StepperSettings};
use dialectic_types::{
    ArgumentProposal, AttackProposal, CommitmentItem, CompositionMode, DesignId, DialogueMove,
    Phase, ScopingStrategy, StepRequest,
};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a move feed into designs
    Compile {
        /// JSON array of moves
        moves: PathBuf,
        /// legacy | per-target
        #[arg(long, value_parser = parse_named::<ScopingStrategy>)]
        scoping: Option<ScopingStrategy>,
    },
    /// Compile a move feed, then step two of its designs against each other
    Step {
        /// JSON array of moves
        moves: PathBuf,
        /// Positive design id
        #[arg(long, default_value_t = 1)]
        pos: u64,
        /// Negative design id
        #[arg(long, default_value_t = 2)]
        neg: u64,
        /// neutral | focus-P | focus-O
        #[arg(long, value_parser = parse_named::<Phase>)]
        phase: Option<Phase>,
        /// assoc | partial | spiritual | split
        #[arg(long, value_parser = parse_named::<CompositionMode>)]
        composition: Option<CompositionMode>,
        /// Fuel bound on the number of pairs
        #[arg(long)]
        max_pairs: Option<usize>,
        /// legacy | per-target
        #[arg(long, value_parser = parse_named::<ScopingStrategy>)]
        scoping: Option<ScopingStrategy>,
    },
    /// Label an argumentation framework
    Solve {
        /// `{"nodes": [...], "attacks": [[from, to], ...]}`
        af: PathBuf,
        #[arg(long, value_enum, default_value_t = Semantics::Grounded)]
        semantics: Semantics,
    },
    /// Check an argument against the construction rules
    ValidateArgument { argument: PathBuf },
    /// Check an attack against the construction rules
    ValidateAttack {
        attack: PathBuf,
        /// JSON object mapping argument ids to arguments the attack may target
        #[arg(long)]
        arguments: Option<PathBuf>,
    },
    /// Load commitment stores and chain each one
    Commitments {
        /// JSON object mapping participant ids to commitment items
        stores: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Semantics {
    Grounded,
    Preferred,
}

/// Parse a value by its external JSON name, e.g. `focus-P`.
pub(crate) fn parse_named<T: DeserializeOwned>(value: &str) -> Result<T, String> {
    serde_json::from_value(Value::String(value.to_string())).map_err(|err| err.to_string())
}

/// Engine settings with every configured value applied over the defaults.
#[must_use]
pub fn engine_settings(config: &DialecticConfig) -> EngineSettings {
    let defaults = EngineSettings::default();
    let stepper = config.stepper.as_ref();
    EngineSettings {
        scoping: config
            .compiler
            .as_ref()
            .and_then(|c| c.scoping)
            .unwrap_or(defaults.scoping),
        stepper: StepperSettings {
            max_pairs: stepper
                .and_then(|s| s.max_pairs)
                .unwrap_or(defaults.stepper.max_pairs),
            phase: stepper
                .and_then(|s| s.phase)
                .unwrap_or(defaults.stepper.phase),
            composition: stepper
                .and_then(|s| s.composition)
                .unwrap_or(defaults.stepper.composition),
            cancel_check_interval: stepper
                .and_then(|s| s.cancel_check_interval)
                .unwrap_or(defaults.stepper.cancel_check_interval),
        },
        max_preferred_nodes: config
            .solver
            .as_ref()
            .and_then(|s| s.max_preferred_nodes)
            .unwrap_or(defaults.max_preferred_nodes),
    }
}

pub fn run(command: Command, mut settings: EngineSettings) -> Result<ExitCode> {
    match command {
        Command::Compile { moves, scoping } => {
            let moves: Vec<DialogueMove> = read_json(&moves)?;
            settings.scoping = scoping.unwrap_or(settings.scoping);
            let report = Engine::new(settings).compile(&moves);
            print_json(&report)?;
        }
        Command::Step {
            moves,
            pos,
            neg,
            phase,
            composition,
            max_pairs,
            scoping,
        } => {
            let moves: Vec<DialogueMove> = read_json(&moves)?;
            settings.scoping = scoping.unwrap_or(settings.scoping);
            let mut engine = Engine::new(settings);
            let report = engine.compile(&moves);
            if !report.rejected.is_empty() {
                info!(rejected = report.rejected.len(), "Some moves were not compiled");
            }
            let request = StepRequest {
                phase,
                composition_mode: composition,
                max_pairs,
                ..StepRequest::new(DesignId::new(pos), DesignId::new(neg))
            };
            let response = engine.step(&request)?;
            print_json(&response)?;
        }
        Command::Solve { af, semantics } => {
            let request: AfRequest = read_json(&af)?;
            let engine = Engine::new(settings);
            let labels = match semantics {
                Semantics::Grounded => engine.solve_grounded(&request)?,
                Semantics::Preferred => engine.solve_preferred(&request)?,
            };
            print_json(&labels)?;
        }
        Command::ValidateArgument { argument } => {
            let argument: ArgumentProposal = read_json(&argument)?;
            return verdict(Engine::new(settings).validate_argument(&argument));
        }
        Command::ValidateAttack { attack, arguments } => {
            let attack: AttackProposal = read_json(&attack)?;
            let mut engine = Engine::new(settings);
            if let Some(path) = arguments {
                let arguments: BTreeMap<String, ArgumentProposal> = read_json(&path)?;
                for (id, argument) in arguments {
                    engine
                        .register_argument(id.clone(), argument)
                        .with_context(|| format!("argument {id} is malformed"))?;
                }
            }
            return verdict(engine.validate_attack(&attack));
        }
        Command::Commitments { stores } => {
            let stores: BTreeMap<String, Vec<CommitmentItem>> = read_json(&stores)?;
            let mut engine = Engine::new(settings);
            for (owner, items) in &stores {
                engine
                    .apply_to_cs(owner, items.iter().cloned())
                    .with_context(|| format!("commitments of {owner}"))?;
            }
            let results: BTreeMap<&str, Interaction> = stores
                .keys()
                .map(|owner| (owner.as_str(), engine.interact_ce(owner)))
                .collect();
            print_json(&results)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn verdict(result: Result<(), ValidationError>) -> Result<ExitCode> {
    match result {
        Ok(()) => {
            print_json(&json!({ "ok": true }))?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            print_json(&json!({ "ok": false, "rule": err.rule(), "error": err.to_string() }))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?
    };
    serde_json::from_str(&content).with_context(|| format!("invalid input in {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value)?;
    println!("{out}");
    Ok(())
}
