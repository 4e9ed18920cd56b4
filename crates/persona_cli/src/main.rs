//! Thin command-line shell over `persona_core`.
//!
//! # Responsibility
//! - Parse arguments, resolve the store location, render core results as
//!   plain text or JSON.
//! - Nothing here re-derives what the core already computed; the card hash
//!   is printed, never recomputed.

use clap::{Parser, Subcommand};
use persona_core::db::open_db;
use persona_core::{
    aggregate, export_snapshot, generate_card, stats, DreamEntry, FieldName, IdentityService,
    NoteKind, NoteRepository, SocialService, SqliteNoteRepository, SqliteRevisionRepository,
    SqliteSocialRepository, ALL_BOND_TYPES, ALL_FIELDS,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

const STORE_DIR_NAME: &str = ".persona";
const STORE_FILE_NAME: &str = "persona.db";
const STORE_ENV_VAR: &str = "PERSONA_DB";
const UPWARD_SEARCH_DEPTH: usize = 10;

#[derive(Parser)]
#[command(name = "persona", about = "Local versioned identity ledger", version)]
struct Cli {
    /// Explicit store path (overrides discovery and the env var).
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show discovery questions for fields that are still unset.
    Ask,
    /// Set an identity field (records a new revision).
    Set { key: String, value: String },
    /// Show the current identity.
    Show,
    /// Show the evolution history of all fields or one field.
    Timeline { key: Option<String> },
    /// Show first vs current value for evolved fields.
    Diff { key: Option<String> },
    /// Record a memory.
    Memory { text: String },
    /// Write a journal entry.
    Journal { text: String },
    /// List notes, optionally filtered by kind.
    Notes {
        #[arg(long)]
        kind: Option<String>,
    },
    /// Generate the identity card.
    Card {
        #[arg(long)]
        json: bool,
    },
    /// Record an encounter with another identity (fields as key=value pairs).
    Encounter {
        peer_hash: String,
        peer_name: String,
        fields: Vec<String>,
    },
    /// Form a bond with another identity.
    Bond {
        peer: String,
        bond_type: String,
        note: Option<String>,
    },
    /// List bonds.
    Bonds,
    /// Record an outgoing letter (delivery is external).
    Letter { peer: String, message: String },
    /// List recorded letters.
    Letters,
    /// Aggregate everything into one timestamp-ordered view.
    Dream {
        /// Return every record without deduplication.
        #[arg(long)]
        deep: bool,
    },
    /// Show ledger statistics.
    Stats,
    /// Export the full store as JSON.
    Export,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let db_path = resolve_db_path(cli.db)?;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|err| format!("cannot create store directory: {err}"))?;
        let log_dir = parent.join("logs");
        if let Some(log_dir) = log_dir.to_str() {
            // Logging is best-effort in the shell; the store stays usable
            // even when the log directory is not writable.
            let _ = persona_core::init_logging(persona_core::default_log_level(), log_dir);
        }
    }

    let conn = open_db(&db_path).map_err(|err| err.to_string())?;

    match cli.command {
        Command::Ask => {
            let identity = IdentityService::new(SqliteRevisionRepository::new(&conn))
                .current()
                .map_err(|err| err.to_string())?;
            for field in ALL_FIELDS {
                if !identity.contains_key(&field) {
                    println!("[{field}]");
                    println!("  {}", field.question());
                    println!();
                }
            }
            if identity.len() == ALL_FIELDS.len() {
                println!("Every field is set. Evolve with: persona set <key> <value>");
            }
        }
        Command::Set { key, value } => {
            let service = IdentityService::new(SqliteRevisionRepository::new(&conn));
            service
                .set_field(&key, &value)
                .map_err(|err| field_error_help(err))?;
            println!("[{key}] set.");
        }
        Command::Show => {
            let identity = IdentityService::new(SqliteRevisionRepository::new(&conn))
                .current()
                .map_err(|err| err.to_string())?;
            if identity.is_empty() {
                println!("No identity yet. Start with: persona ask");
                return Ok(());
            }
            for field in ALL_FIELDS {
                if let Some(value) = identity.get(&field) {
                    println!("{}: {value}", field.label());
                }
            }
        }
        Command::Timeline { key } => {
            let field = parse_field_arg(key.as_deref())?;
            let revisions = IdentityService::new(SqliteRevisionRepository::new(&conn))
                .timeline(field)
                .map_err(|err| err.to_string())?;
            if revisions.is_empty() {
                println!("No history yet.");
                return Ok(());
            }
            for revision in &revisions {
                println!(
                    "[{}] {} = {}",
                    format_date(revision.created_at),
                    revision.field,
                    truncate(&revision.value, 72)
                );
            }
            println!("{} revision(s) recorded.", revisions.len());
        }
        Command::Diff { key } => {
            let service = IdentityService::new(SqliteRevisionRepository::new(&conn));
            match parse_field_arg(key.as_deref())? {
                Some(field) => {
                    let (first, current) =
                        service.diff(field).map_err(|err| err.to_string())?;
                    println!("[{field}]");
                    println!("  - {first}");
                    println!("  + {current}");
                }
                None => {
                    let diffs = service.diff_all().map_err(|err| err.to_string())?;
                    if diffs.is_empty() {
                        println!("No fields have evolved yet.");
                        return Ok(());
                    }
                    for (field, (first, current)) in &diffs {
                        println!("[{field}]");
                        println!("  - {}", truncate(first, 68));
                        println!("  + {}", truncate(current, 68));
                    }
                }
            }
        }
        Command::Memory { text } => {
            SqliteNoteRepository::new(&conn)
                .append(NoteKind::Memory, &text)
                .map_err(|err| err.to_string())?;
            println!("Memory recorded.");
        }
        Command::Journal { text } => {
            SqliteNoteRepository::new(&conn)
                .append(NoteKind::Journal, &text)
                .map_err(|err| err.to_string())?;
            println!("Journal entry recorded.");
        }
        Command::Notes { kind } => {
            let kind = match kind.as_deref() {
                Some(value) => Some(
                    NoteKind::parse(value)
                        .ok_or_else(|| format!("unknown note kind `{value}`; expected memory|journal"))?,
                ),
                None => None,
            };
            let notes = SqliteNoteRepository::new(&conn)
                .list(kind)
                .map_err(|err| err.to_string())?;
            for note in &notes {
                println!(
                    "[{}] ({}) {}",
                    format_date(note.created_at),
                    note.kind,
                    note.text
                );
            }
            if notes.is_empty() {
                println!("No notes yet.");
            }
        }
        Command::Card { json } => {
            let identity = IdentityService::new(SqliteRevisionRepository::new(&conn))
                .current()
                .map_err(|err| err.to_string())?;
            if identity.is_empty() {
                return Err("no identity yet; set at least one field first".to_string());
            }
            let card = generate_card(&identity).map_err(|err| err.to_string())?;
            if json {
                let rendered = serde_json::to_string_pretty(&card)
                    .map_err(|err| format!("cannot render card: {err}"))?;
                println!("{rendered}");
            } else {
                println!("card {}", card.short_hash());
                for (key, value) in &card.fields {
                    println!("  {key}: {}", truncate(value, 68));
                }
                println!("  generated {}", card.generated_at);
            }
        }
        Command::Encounter {
            peer_hash,
            peer_name,
            fields,
        } => {
            let snapshot = parse_key_value_pairs(&fields)?;
            let service = SocialService::new(SqliteSocialRepository::new(&conn));
            service
                .record_encounter(&peer_hash, &peer_name, &snapshot)
                .map_err(|err| err.to_string())?;
            println!("Encounter with {peer_name} [{peer_hash}] recorded.");
        }
        Command::Bond {
            peer,
            bond_type,
            note,
        } => {
            let service = SocialService::new(SqliteSocialRepository::new(&conn));
            let peer_hash = resolve_peer(&service, &peer)?;
            service
                .add_bond(&peer_hash, &bond_type, note.as_deref())
                .map_err(|err| bond_error_help(err))?;
            println!("Bond formed: [{peer_hash}] -- {bond_type}");
        }
        Command::Bonds => {
            let bonds = SocialService::new(SqliteSocialRepository::new(&conn))
                .list_bonds()
                .map_err(|err| err.to_string())?;
            for bond in &bonds {
                print!(
                    "[{}] {} -- {}",
                    format_date(bond.created_at),
                    bond.peer_hash,
                    bond.bond_type
                );
                if let Some(note) = &bond.note {
                    print!(" ({note})");
                }
                println!();
            }
            if bonds.is_empty() {
                println!("No bonds formed yet.");
            }
        }
        Command::Letter { peer, message } => {
            let service = SocialService::new(SqliteSocialRepository::new(&conn));
            let target_hash = resolve_peer(&service, &peer)?;
            service
                .record_letter(&target_hash, &message)
                .map_err(|err| err.to_string())?;
            println!("Letter to [{target_hash}] recorded. Delivery is up to the gallery glue.");
        }
        Command::Letters => {
            let letters = SocialService::new(SqliteSocialRepository::new(&conn))
                .list_letters()
                .map_err(|err| err.to_string())?;
            for letter in &letters {
                println!(
                    "[{}] to {} -- {}",
                    format_date(letter.created_at),
                    letter.target_hash,
                    truncate(&letter.message, 60)
                );
            }
            if letters.is_empty() {
                println!("No letters recorded yet.");
            }
        }
        Command::Dream { deep } => {
            let entries = aggregate(&conn, deep).map_err(|err| err.to_string())?;
            for entry in &entries {
                match entry {
                    DreamEntry::Revision(revision) => println!(
                        "[{}] field {} = {}",
                        format_date(revision.created_at),
                        revision.field,
                        truncate(&revision.value, 60)
                    ),
                    DreamEntry::Note(note) => println!(
                        "[{}] {} {}",
                        format_date(note.created_at),
                        note.kind,
                        truncate(&note.text, 60)
                    ),
                    DreamEntry::Bond(bond) => println!(
                        "[{}] bond {} {}",
                        format_date(bond.created_at),
                        bond.peer_hash,
                        bond.bond_type
                    ),
                }
            }
            if entries.is_empty() {
                println!("Nothing to dream about yet. Live more first.");
            }
        }
        Command::Stats => match stats(&conn).map_err(|err| err.to_string())? {
            Some(stats) => {
                println!("born        {}", format_date(stats.born_at));
                println!("fields      {}/{}", stats.fields_set, stats.total_fields);
                println!("revisions   {}", stats.revisions);
                println!("notes       {}", stats.notes);
                println!("bonds       {}", stats.bonds);
                println!("encounters  {}", stats.encounters);
                println!("letters     {}", stats.letters);
            }
            None => println!("No identity yet. Start with: persona ask"),
        },
        Command::Export => {
            let snapshot = export_snapshot(&conn).map_err(|err| err.to_string())?;
            let rendered = serde_json::to_string_pretty(&snapshot)
                .map_err(|err| format!("cannot render snapshot: {err}"))?;
            println!("{rendered}");
        }
    }

    Ok(())
}

/// Store path resolution: explicit flag, env override, upward `.persona/`
/// discovery, then a home-directory fallback.
fn resolve_db_path(explicit: Option<PathBuf>) -> Result<PathBuf, String> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    if let Ok(path) = std::env::var(STORE_ENV_VAR) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut current = cwd.as_path();
        for _ in 0..UPWARD_SEARCH_DEPTH {
            let candidate = current.join(STORE_DIR_NAME);
            if candidate.is_dir() {
                return Ok(candidate.join(STORE_FILE_NAME));
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
    }

    let home = std::env::var("HOME").map_err(|_| "cannot resolve home directory".to_string())?;
    Ok(PathBuf::from(home).join(STORE_DIR_NAME).join(STORE_FILE_NAME))
}

/// Local-first peer resolution: an exact/prefix hash or name hit in the
/// encounter cache wins; otherwise the query is used as the hash itself.
fn resolve_peer(
    service: &SocialService<SqliteSocialRepository<'_>>,
    query: &str,
) -> Result<String, String> {
    match service.find_encounter(query).map_err(|err| err.to_string())? {
        Some(encounter) => Ok(encounter.peer_hash),
        None => Ok(query.to_string()),
    }
}

fn parse_field_arg(key: Option<&str>) -> Result<Option<FieldName>, String> {
    match key {
        Some(key) => FieldName::parse(key).map(Some).ok_or_else(|| {
            format!(
                "unknown field `{key}`; valid fields: {}",
                field_list()
            )
        }),
        None => Ok(None),
    }
}

fn parse_key_value_pairs(pairs: &[String]) -> Result<BTreeMap<String, String>, String> {
    let mut fields = BTreeMap::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("expected key=value, got `{pair}`"))?;
        fields.insert(key.to_string(), value.to_string());
    }
    Ok(fields)
}

fn field_error_help(err: persona_core::RepoError) -> String {
    match err {
        persona_core::RepoError::InvalidField(_) => {
            format!("{err}; valid fields: {}", field_list())
        }
        other => other.to_string(),
    }
}

fn bond_error_help(err: persona_core::RepoError) -> String {
    match err {
        persona_core::RepoError::UnknownBondType(_) => {
            let types = ALL_BOND_TYPES
                .iter()
                .map(|bond_type| bond_type.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            format!("{err}; valid types: {types}")
        }
        other => other.to_string(),
    }
}

fn field_list() -> String {
    ALL_FIELDS
        .iter()
        .map(|field| field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_date(epoch_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(epoch_ms)
        .map(|when| when.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "????-??-??".to_string())
}

fn truncate(text: &str, max: usize) -> String {
    let flattened = text.replace('\n', " ");
    if flattened.chars().count() <= max {
        return flattened;
    }
    let mut shortened: String = flattened.chars().take(max.saturating_sub(3)).collect();
    shortened.push_str("...");
    shortened
}
