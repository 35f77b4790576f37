use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use charedit_core::character::{HairColor, Skill};
use charedit_core::coins::Coins;
use charedit_core::core_api::{
    CoreError, Engine, EngineConfig, Session, UnsavedChangesDecision,
};
use charedit_core::database::{Database, JsonDatabase};
use charedit_core::form::{EditorForm, ItemRef, pet_kind_choices};
use charedit_core::gender::Gender;
use charedit_core::index::find_dense;
use charedit_core::tables::{
    CLASS_NAMES, ITEM_MATERIAL_NAMES, ITEM_MODIFIER_NAMES, ITEM_TYPE_NAMES, RACE_NAMES,
};
use charedit_render::{
    FieldSelection, JsonStyle, render_field_lines, render_json_full, render_json_selected,
    render_roster, render_roster_json, render_sheet,
};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum GenderArg {
    Male,
    Female,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(value_name = "DATABASE")]
    path: PathBuf,
    /// List the characters in the database and exit.
    #[arg(long)]
    list: bool,
    #[arg(long, conflicts_with = "character")]
    index: Option<usize>,
    /// Select a character by name instead of index.
    #[arg(long)]
    character: Option<String>,
    #[arg(long)]
    name: bool,
    #[arg(long)]
    level: bool,
    #[arg(long)]
    xp: bool,
    #[arg(long)]
    gender: bool,
    #[arg(long)]
    race: bool,
    #[arg(long)]
    class: bool,
    #[arg(long)]
    specialization: bool,
    #[arg(long)]
    appearance: bool,
    #[arg(long)]
    skills: bool,
    #[arg(long)]
    coins: bool,
    #[arg(long)]
    pet: bool,
    #[arg(long)]
    equipment: bool,
    #[arg(long)]
    inventory: bool,
    #[arg(long)]
    json: bool,
    #[arg(long = "set-name")]
    set_name: Option<String>,
    #[arg(long = "set-level")]
    set_level: Option<i32>,
    #[arg(long = "set-xp")]
    set_xp: Option<i32>,
    #[arg(long = "set-gender")]
    set_gender: Option<GenderArg>,
    #[arg(long = "set-race", value_name = "RACE")]
    set_race: Option<String>,
    #[arg(long = "set-class", value_name = "CLASS")]
    set_class: Option<String>,
    #[arg(long = "set-specialization", value_name = "SPECIALIZATION")]
    set_specialization: Option<String>,
    #[arg(long = "set-face")]
    set_face: Option<i32>,
    #[arg(long = "set-hair")]
    set_hair: Option<i32>,
    #[arg(long = "set-hair-color", value_name = "RRGGBB", value_parser = parse_hair_color)]
    set_hair_color: Option<HairColor>,
    /// Set a skill, e.g. `--set-skill climbing=5`. Repeatable.
    #[arg(long = "set-skill", value_name = "SKILL=VALUE", value_parser = parse_skill_edit)]
    set_skill: Vec<(Skill, i32)>,
    #[arg(long = "set-gold")]
    set_gold: Option<i32>,
    #[arg(long = "set-silver")]
    set_silver: Option<i32>,
    #[arg(long = "set-copper")]
    set_copper: Option<i32>,
    #[arg(long = "set-platinum")]
    set_platinum: Option<i32>,
    #[arg(long = "set-pet-kind", value_name = "KIND")]
    set_pet_kind: Option<String>,
    #[arg(long = "set-pet-level")]
    set_pet_level: Option<i32>,
    #[arg(long = "set-pet-xp")]
    set_pet_xp: Option<i32>,
    #[arg(long = "set-pet-name")]
    set_pet_name: Option<String>,
    /// Item targeted by the --set-item-* flags: `equipment:SLOT` or
    /// `inventory:TAB:ENTRY`.
    #[arg(long, value_name = "REF", value_parser = parse_item_ref)]
    item: Option<ItemRef>,
    #[arg(long = "set-item-type", value_name = "TYPE", requires = "item")]
    set_item_type: Option<String>,
    #[arg(long = "set-item-subtype", value_name = "SUBTYPE", requires = "item")]
    set_item_subtype: Option<String>,
    #[arg(long = "set-item-material", value_name = "MATERIAL", requires = "item")]
    set_item_material: Option<String>,
    #[arg(long = "set-item-modifier", value_name = "MODIFIER", requires = "item")]
    set_item_modifier: Option<String>,
    #[arg(long = "set-item-level", requires = "item")]
    set_item_level: Option<i16>,
    #[arg(long)]
    output: Option<PathBuf>,
    #[arg(long = "force-overwrite", requires = "output")]
    force_overwrite: bool,
    /// Copy an existing output file to `<OUTPUT>.bak` before replacing it.
    #[arg(long, requires = "force_overwrite")]
    backup: bool,
    /// How often the dirty watcher samples for changes.
    #[arg(
        long = "poll-interval-ms",
        default_value_t = 5,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    poll_interval_ms: u64,
}

impl Cli {
    fn field_selection(&self) -> FieldSelection {
        FieldSelection {
            name: self.name,
            level: self.level,
            xp: self.xp,
            gender: self.gender,
            race: self.race,
            class: self.class,
            specialization: self.specialization,
            appearance: self.appearance,
            skills: self.skills,
            coins: self.coins,
            pet: self.pet,
            equipment: self.equipment,
            inventory: self.inventory,
        }
    }

    fn has_edits(&self) -> bool {
        self.set_name.is_some()
            || self.set_level.is_some()
            || self.set_xp.is_some()
            || self.set_gender.is_some()
            || self.set_race.is_some()
            || self.set_class.is_some()
            || self.set_specialization.is_some()
            || self.set_face.is_some()
            || self.set_hair.is_some()
            || self.set_hair_color.is_some()
            || !self.set_skill.is_empty()
            || self.has_coin_edits()
            || self.set_platinum.is_some()
            || self.set_pet_kind.is_some()
            || self.set_pet_level.is_some()
            || self.set_pet_xp.is_some()
            || self.set_pet_name.is_some()
            || self.has_item_edits()
    }

    fn has_coin_edits(&self) -> bool {
        self.set_gold.is_some() || self.set_silver.is_some() || self.set_copper.is_some()
    }

    fn has_item_edits(&self) -> bool {
        self.set_item_type.is_some()
            || self.set_item_subtype.is_some()
            || self.set_item_material.is_some()
            || self.set_item_modifier.is_some()
            || self.set_item_level.is_some()
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let fields = cli.field_selection();
    let has_edits = cli.has_edits();

    if has_edits && cli.output.is_none() {
        eprintln!("--set-* flags require --output <PATH>");
        process::exit(2);
    }
    if !has_edits && cli.output.is_some() {
        eprintln!("--output requires at least one --set-* flag");
        process::exit(2);
    }

    let database = JsonDatabase::open(&cli.path).unwrap_or_else(|e| {
        eprintln!("Error opening database {}: {e}", cli.path.display());
        process::exit(1);
    });

    if cli.list {
        let characters = database.characters();
        if cli.json {
            print_json(&render_roster_json(&characters));
        } else {
            print!("{}", render_roster(&characters));
        }
        return;
    }

    let index = match &cli.character {
        Some(name) => database.find(name).unwrap_or_else(|| {
            eprintln!("No character named '{name}' in {}", cli.path.display());
            process::exit(1);
        }),
        None => cli.index.unwrap_or(0),
    };

    if let Some(out_path) = &cli.output {
        prepare_output(out_path, cli.force_overwrite, cli.backup);
    }
    let database = match &cli.output {
        Some(out_path) => database.with_output(out_path),
        None => database,
    };
    let written_to = database.path().to_path_buf();

    let engine = Engine::with_config(EngineConfig {
        poll_interval: Duration::from_millis(cli.poll_interval_ms),
        ..EngineConfig::default()
    });
    let mut session = engine
        .open(Box::new(database), index)
        .unwrap_or_else(|e| {
            eprintln!("Error loading character {index}: {e}");
            process::exit(1);
        });

    if has_edits {
        apply_edits(&cli, session.form_mut()).unwrap_or_else(|e| {
            eprintln!("Error applying edit: {e}");
            process::exit(1);
        });
        session.save().unwrap_or_else(|e| {
            eprintln!("Error saving character: {e}");
            process::exit(1);
        });
    }

    if cli.json {
        let json = if fields.is_any_selected() {
            render_json_selected(&session, &fields, JsonStyle::CanonicalV1)
        } else {
            render_json_full(&session, JsonStyle::CanonicalV1)
        };
        print_json(&json);
    } else if fields.is_any_selected() {
        print!("{}", render_field_lines(&session, &fields));
    } else if has_edits {
        println!("Wrote edited database to {}", written_to.display());
    } else {
        print!("{}", render_sheet(&session));
    }

    close(session);
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json(json: &serde_json::Value) {
    let rendered = serde_json::to_string_pretty(json).unwrap_or_else(|e| {
        eprintln!("Error rendering JSON output: {e}");
        process::exit(1);
    });
    println!("{rendered}");
}

fn prepare_output(out_path: &Path, force_overwrite: bool, backup: bool) {
    if !out_path.exists() {
        return;
    }
    if !force_overwrite {
        eprintln!(
            "refusing to overwrite existing file {} (pass --force-overwrite)",
            out_path.display()
        );
        process::exit(1);
    }
    if backup {
        let backup_path = PathBuf::from(format!("{}.bak", out_path.display()));
        fs::copy(out_path, &backup_path).unwrap_or_else(|e| {
            eprintln!("Error writing backup {}: {e}", backup_path.display());
            process::exit(1);
        });
        info!(path = %backup_path.display(), "wrote backup");
    }
}

// Everything unsaved was either written above or never edited.
fn close(mut session: Session) {
    if let Err(e) = session.close(|| UnsavedChangesDecision::Discard) {
        eprintln!("Error closing session: {e}");
        process::exit(1);
    }
}

// Dependent fields go after the fields their bounds come from: class before
// specialization, race and gender before appearance, level before pet level,
// item type before subtype.
fn apply_edits(cli: &Cli, form: &mut EditorForm) -> Result<(), CoreError> {
    if let Some(name) = &cli.set_name {
        form.set_name(name);
    }
    if let Some(level) = cli.set_level {
        form.set_level(level);
    }
    if let Some(experience) = cli.set_xp {
        form.set_experience(experience);
    }
    if let Some(gender) = cli.set_gender {
        form.set_gender(to_core_gender(gender).table_index())?;
    }
    if let Some(race) = &cli.set_race {
        form.set_race(Some(lookup("race", race, &RACE_NAMES)?))?;
    }
    if let Some(class) = &cli.set_class {
        form.set_class(Some(lookup("class", class, &CLASS_NAMES)?))?;
    }
    if let Some(specialization) = &cli.set_specialization {
        let index = position("specialization", specialization, form.bounds().specializations)?;
        form.set_specialization(Some(index))?;
    }
    if let Some(face) = cli.set_face {
        form.set_face(face);
    }
    if let Some(hair) = cli.set_hair {
        form.set_hair(hair);
    }
    if let Some(color) = cli.set_hair_color {
        form.set_hair_color(color);
    }
    for &(skill, value) in &cli.set_skill {
        form.set_skill(skill, value);
    }
    if cli.has_coin_edits() {
        let current = form.coins();
        form.set_coins(Coins {
            gold: cli.set_gold.unwrap_or(current.gold),
            silver: cli.set_silver.unwrap_or(current.silver),
            copper: cli.set_copper.unwrap_or(current.copper),
        });
    }
    if let Some(platinum) = cli.set_platinum {
        form.set_platinum_coins(platinum);
    }
    if let Some(kind) = &cli.set_pet_kind {
        form.set_pet_kind(Some(position("pet kind", kind, &pet_kind_choices())?))?;
    }
    if let Some(level) = cli.set_pet_level {
        form.set_pet_level(level);
    }
    if let Some(experience) = cli.set_pet_xp {
        form.set_pet_experience(experience);
    }
    if let Some(name) = &cli.set_pet_name {
        form.set_pet_name(name);
    }
    if let Some(item) = cli.item {
        apply_item_edits(cli, form, item)?;
    }

    debug!(dirty = form.dirty_flag().is_dirty(), "applied command-line edits");
    Ok(())
}

fn apply_item_edits(cli: &Cli, form: &mut EditorForm, item: ItemRef) -> Result<(), CoreError> {
    if let Some(item_type) = &cli.set_item_type {
        form.set_item_type(item, Some(lookup("item type", item_type, &ITEM_TYPE_NAMES)?))?;
    }
    if let Some(subtype) = &cli.set_item_subtype {
        let choices = form
            .item(item)
            .map(|fields| fields.subtype_choices())
            .unwrap_or_default();
        form.set_item_subtype(item, Some(position("item subtype", subtype, &choices)?))?;
    }
    if let Some(material) = &cli.set_item_material {
        let material = lookup("item material", material, &ITEM_MATERIAL_NAMES)?;
        form.set_item_material(item, Some(material))?;
    }
    if let Some(modifier) = &cli.set_item_modifier {
        let modifier = position("item modifier", modifier, &ITEM_MODIFIER_NAMES)?;
        form.set_item_modifier(item, Some(modifier))?;
    }
    if let Some(level) = cli.set_item_level {
        form.set_item_level(item, level)?;
    }
    Ok(())
}

/// Dense index of `name` in a table that may contain holes.
fn lookup(what: &str, name: &str, labels: &[&str]) -> Result<usize, CoreError> {
    find_dense(name, labels).ok_or_else(|| unknown(what, name, labels))
}

/// Index of `name` in an already dense list.
fn position(what: &str, name: &str, choices: &[&str]) -> Result<usize, CoreError> {
    choices
        .iter()
        .position(|c| c.eq_ignore_ascii_case(name))
        .ok_or_else(|| unknown(what, name, choices))
}

fn unknown(what: &str, name: &str, labels: &[&str]) -> CoreError {
    let expected: Vec<&str> = labels.iter().copied().filter(|l| !l.is_empty()).collect();
    CoreError::invalid_value(format!(
        "unknown {what} '{name}', expected one of: {}",
        expected.join(", ")
    ))
}

fn parse_item_ref(value: &str) -> Result<ItemRef, String> {
    let parts: Vec<&str> = value.split(':').collect();
    let number = |s: &str| {
        s.parse::<usize>()
            .map_err(|_| format!("invalid item reference '{value}'"))
    };
    match parts.as_slice() {
        [kind, slot] if kind.eq_ignore_ascii_case("equipment") => {
            Ok(ItemRef::Equipment(number(*slot)?))
        }
        [kind, tab, entry] if kind.eq_ignore_ascii_case("inventory") => Ok(ItemRef::Inventory {
            tab: number(*tab)?,
            entry: number(*entry)?,
        }),
        _ => Err(format!(
            "invalid item reference '{value}', expected equipment:SLOT or inventory:TAB:ENTRY"
        )),
    }
}

fn parse_skill_edit(value: &str) -> Result<(Skill, i32), String> {
    let (key, amount) = value
        .split_once('=')
        .ok_or_else(|| format!("invalid skill edit '{value}', expected SKILL=VALUE"))?;
    let skill = Skill::from_key(key.trim()).ok_or_else(|| {
        let keys: Vec<&str> = Skill::ALL.iter().map(|s| s.key()).collect();
        format!("unknown skill '{key}', expected one of: {}", keys.join(", "))
    })?;
    let amount = amount
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("invalid skill value '{amount}': {e}"))?;
    Ok((skill, amount))
}

fn parse_hair_color(value: &str) -> Result<HairColor, String> {
    HairColor::from_hex(value)
        .ok_or_else(|| format!("invalid hair color '{value}', expected RRGGBB"))
}

fn to_core_gender(gender: GenderArg) -> Gender {
    match gender {
        GenderArg::Male => Gender::Male,
        GenderArg::Female => Gender::Female,
    }
}
