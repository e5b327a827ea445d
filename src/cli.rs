//! Command-line front end over the record store, evaluator and assistant.

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use thiserror::Error;

use crate::assistant::{AssistantError, CareAssistant, CareRequest};
use crate::config::{AppConfig, ConfigError, APP_VERSION};
use crate::dataset::{load_dataset, DatasetError};
use crate::db;
use crate::knowledge::initialize_knowledge_graph;
use crate::llm::{LlmError, LlmGenerate};
use crate::models::{Child, NewMedication, Pharmacy};
use crate::prompt::PromptAssembler;
use crate::store::{RecordStore, SqliteRecordStore, StoreError};

/// Characters of the prompt shown when no language model is configured.
const PROMPT_PREVIEW_CHARS: usize = 500;

/// PediCare - pediatric health assistant over a child's medical records
#[derive(Parser, Debug)]
#[command(name = "pedicare")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Record store path (overrides PEDICARE_DB_PATH)
    #[arg(long, global = true, env = "PEDICARE_DB_PATH")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the record store and seed interaction knowledge
    Init,

    /// Load the reference dataset from a directory
    LoadDataset {
        dir: PathBuf,
    },

    /// Run the Emma fever scenario end to end
    Demo,

    /// Create or update a child profile
    AddChild {
        child_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: u32,
        #[arg(long)]
        weight: f64,
        /// Recorded allergy (repeatable)
        #[arg(long = "allergy")]
        allergies: Vec<String>,
    },

    /// Start a medication for a child
    AddMedication {
        child_id: String,
        medication: String,
        #[arg(long)]
        dosage: String,
        #[arg(long)]
        frequency: String,
    },

    /// Record a symptom report (severity 1-10)
    LogSymptom {
        child_id: String,
        symptom: String,
        severity: u8,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Emergency status over the last 24 hours
    Emergency {
        child_id: String,
    },

    /// Allergy and interaction check for a medication
    Safety {
        child_id: String,
        medication: String,
    },

    /// Create or update a pharmacy
    AddPharmacy {
        name: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        hours: String,
    },

    /// List pharmacies, optionally filtered by location
    Pharmacies {
        #[arg(long)]
        location: Option<String>,
    },

    /// Ask a question about a child
    Ask {
        child_id: String,
        question: String,
        #[arg(long)]
        profile: Option<String>,
        #[arg(long)]
        context: Option<String>,
        /// Medication the question is about
        #[arg(long)]
        medication: Option<String>,
        /// Print the prompt instead of calling the language model
        #[arg(long)]
        prompt_only: bool,
    },
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Assistant(#[from] AssistantError),

    #[error("Language model error: {0}")]
    Llm(#[from] LlmError),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

pub fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = AppConfig::from_env()?;
    if let Some(path) = cli.db {
        config.database_path = path;
    }
    tracing::info!("PediCare v{APP_VERSION}, store at {}", config.database_path.display());

    let store = SqliteRecordStore::open(&config.database_path)?;

    match cli.command {
        Command::Init => {
            store.verify_connection()?;
            let seeded = initialize_knowledge_graph(&store)?;
            println!(
                "Record store ready at {} ({seeded} interaction facts)",
                config.database_path.display()
            );
        }
        Command::LoadDataset { dir } => {
            let summary = load_dataset(&store, &dir)?;
            print_json(&summary)?;
            let counts = store.with_connection(db::table_counts)?;
            for (table, count) in counts {
                println!("  {table}: {count}");
            }
        }
        Command::Demo => {
            initialize_knowledge_graph(&store)?;
            let llm = config.llm_client()?;
            let assistant = CareAssistant::new(store, PromptAssembler::new(config.load_template()?));
            run_demo(&assistant, llm.as_deref())?;
        }
        Command::AddChild {
            child_id,
            name,
            age,
            weight,
            allergies,
        } => {
            let child = Child::new(&child_id, &name, age, weight).with_allergies(allergies);
            print_json(&store.upsert_child(&child)?)?;
        }
        Command::AddMedication {
            child_id,
            medication,
            dosage,
            frequency,
        } => {
            let assignment = store.add_medication(&NewMedication {
                child_id,
                name: medication,
                dosage,
                frequency,
                start_date: None,
            })?;
            print_json(&assignment)?;
        }
        Command::LogSymptom {
            child_id,
            symptom,
            severity,
            notes,
        } => {
            let report =
                store.log_symptom(&child_id, &symptom, severity, notes.as_deref(), Utc::now())?;
            print_json(&report)?;
        }
        Command::Emergency { child_id } => {
            let assistant = CareAssistant::new(store, PromptAssembler::default());
            print_json(&assistant.evaluator().check_emergency_status(&child_id)?)?;
        }
        Command::Safety {
            child_id,
            medication,
        } => {
            let assistant = CareAssistant::new(store, PromptAssembler::default());
            print_json(&assistant.evaluator().check_medication_safety(&child_id, &medication)?)?;
        }
        Command::AddPharmacy {
            name,
            location,
            phone,
            hours,
        } => {
            let pharmacy = Pharmacy {
                name,
                location,
                phone,
                hours,
            };
            store.upsert_pharmacy(&pharmacy)?;
            print_json(&pharmacy)?;
        }
        Command::Pharmacies { location } => {
            print_json(&store.find_pharmacies(location.as_deref())?)?;
        }
        Command::Ask {
            child_id,
            question,
            profile,
            context,
            medication,
            prompt_only,
        } => {
            let request = CareRequest::new(&child_id, &question)
                .with_profile(profile.as_deref())
                .with_context(context.as_deref())
                .with_medication(medication.as_deref());
            let llm = if prompt_only { None } else { config.llm_client()? };
            let assistant = CareAssistant::new(store, PromptAssembler::new(config.load_template()?));
            match llm {
                Some(llm) => println!("{}", assistant.ask(llm.as_ref(), &request)?),
                None => println!("{}", assistant.build_prompt(&request)?),
            }
        }
    }
    Ok(())
}

const DEMO_CHILD: &str = "emma_demo";

/// The fever scenario: profile, medication, symptom, verdicts, prompt, answer.
fn run_demo<S: RecordStore>(
    assistant: &CareAssistant<S>,
    llm: Option<&dyn LlmGenerate>,
) -> Result<(), CliError> {
    let store = assistant.store();

    let child = store.upsert_child(
        &Child::new(DEMO_CHILD, "Emma", 5, 18.5).with_allergies(["penicillin", "peanuts"]),
    )?;
    println!(
        "Step 1: {} is {} years old, allergies: {}",
        child.name,
        child.age,
        child.allergies.join(", ")
    );

    let med = store.add_medication(&NewMedication {
        child_id: DEMO_CHILD.into(),
        name: "Ibuprofen".into(),
        dosage: "100mg".into(),
        frequency: "every 6 hours as needed".into(),
        start_date: None,
    })?;
    println!("Step 2: started {} {}", med.medication.name, med.dosage);

    store.log_symptom(DEMO_CHILD, "fever_c", 7, Some("Temperature 38.8C (101.8F)"), Utc::now())?;
    println!("Step 3: logged fever_c with severity 7/10");

    let emergency = assistant.evaluator().check_emergency_status(DEMO_CHILD)?;
    if emergency.is_emergency {
        println!("Step 4: EMERGENCY DETECTED");
        for s in &emergency.critical_symptoms {
            println!("   - {}: severity {}/10", s.name, s.severity);
        }
    } else {
        println!("Step 4: not an emergency (all severities below 8)");
    }

    let request = CareRequest::new(
        DEMO_CHILD,
        "Emma has had a fever of 101.8F for the past 3 hours. Can I give her more Ibuprofen?",
    )
    .with_profile(Some(
        "Emma is an active 5-year-old who loves playing soccer. She has seasonal allergies.",
    ))
    .with_context(Some(
        "Parent mentioned Emma was playing outside earlier today. Last dose of Ibuprofen was given 4 hours ago.",
    ))
    .with_medication(Some("Ibuprofen"));

    match llm {
        Some(llm) => {
            println!("Step 5: asking the language model\n");
            println!("{}", assistant.ask(llm, &request)?);
        }
        None => {
            let prompt = assistant.build_prompt(&request)?;
            println!("Step 5: no language model configured, prompt preview:\n");
            let preview: String = prompt.chars().take(PROMPT_PREVIEW_CHARS).collect();
            println!("{preview}...");
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
