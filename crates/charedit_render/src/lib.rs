use std::fmt::Write as _;

use charedit_core::character::Skill;
use charedit_core::core_api::{CharacterSummary, Session};
use charedit_core::form::{EditorForm, ItemFields, pet_kind_choices};
use charedit_core::gender::Gender;
use charedit_core::pet_name;
use charedit_core::tables::{CLASS_NAMES, RACE_NAMES};
use serde_json::{Map as JsonMap, Value as JsonValue};

const SHEET_WIDTH: usize = 76;
const TWO_COL_WIDTH_LEFT: usize = 34;
const TWO_COL_WIDTH_RIGHT: usize = 40;
const INVENTORY_COL_WIDTH: usize = 25;
const UNKNOWN_LABEL: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    CanonicalV1,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FieldSelection {
    pub name: bool,
    pub level: bool,
    pub xp: bool,
    pub gender: bool,
    pub race: bool,
    pub class: bool,
    pub specialization: bool,
    pub appearance: bool,
    pub skills: bool,
    pub coins: bool,
    pub pet: bool,
    pub equipment: bool,
    pub inventory: bool,
}

impl FieldSelection {
    pub fn is_any_selected(&self) -> bool {
        self.name
            || self.level
            || self.xp
            || self.gender
            || self.race
            || self.class
            || self.specialization
            || self.appearance
            || self.skills
            || self.coins
            || self.pet
            || self.equipment
            || self.inventory
    }

    pub fn all() -> Self {
        Self {
            name: true,
            level: true,
            xp: true,
            gender: true,
            race: true,
            class: true,
            specialization: true,
            appearance: true,
            skills: true,
            coins: true,
            pet: true,
            equipment: true,
            inventory: true,
        }
    }
}

pub fn render_json_full(session: &Session, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => {
            let mut out = JsonMap::new();
            out.insert("title".to_string(), JsonValue::String(session.title()));
            out.insert("index".to_string(), JsonValue::from(session.index()));
            out.insert("id".to_string(), JsonValue::from(session.character().id));
            out.insert("dirty".to_string(), JsonValue::Bool(session.is_dirty()));
            out.extend(selected_json(&FieldSelection::all(), session.form()));
            JsonValue::Object(out)
        }
    }
}

pub fn render_json_selected(
    session: &Session,
    fields: &FieldSelection,
    style: JsonStyle,
) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(selected_json(fields, session.form())),
    }
}

pub fn render_roster_json(characters: &[CharacterSummary]) -> JsonValue {
    JsonValue::Array(
        characters
            .iter()
            .map(|c| {
                let mut m = JsonMap::new();
                m.insert("index".to_string(), JsonValue::from(c.index));
                m.insert("id".to_string(), JsonValue::from(c.id));
                m.insert("name".to_string(), JsonValue::String(c.name.clone()));
                m.insert("level".to_string(), JsonValue::from(c.level));
                m.insert("class".to_string(), JsonValue::String(c.class.to_string()));
                JsonValue::Object(m)
            })
            .collect(),
    )
}

pub fn render_roster(characters: &[CharacterSummary]) -> String {
    let mut out = String::new();
    if characters.is_empty() {
        writeln!(&mut out, "no characters").expect("writing to String cannot fail");
        return out;
    }
    for c in characters {
        writeln!(
            &mut out,
            "{:>3}  {:<24} Lv {:<4} {}",
            c.index,
            fit_column(&c.name, 24),
            c.level,
            c.class
        )
        .expect("writing to String cannot fail");
    }
    out
}

/// One `key=value` line per selected scalar field, in canonical order.
pub fn render_field_lines(session: &Session, fields: &FieldSelection) -> String {
    let mut out = String::new();
    for (key, value) in selected_json(fields, session.form()) {
        let written = match value {
            JsonValue::String(s) => writeln!(&mut out, "{key}={s}"),
            JsonValue::Null => writeln!(&mut out, "{key}="),
            other => writeln!(&mut out, "{key}={other}"),
        };
        written.expect("writing to String cannot fail");
    }
    out
}

fn selected_json(fields: &FieldSelection, form: &EditorForm) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();

    if fields.name {
        out.insert("name".to_string(), JsonValue::String(form.name().to_string()));
    }
    if fields.level {
        out.insert("level".to_string(), JsonValue::from(form.level()));
    }
    if fields.xp {
        out.insert("xp".to_string(), JsonValue::from(form.experience()));
    }
    if fields.gender {
        out.insert("gender".to_string(), label_json(gender_label(form)));
    }
    if fields.race {
        out.insert("race".to_string(), label_json(race_label(form)));
    }
    if fields.class {
        out.insert("class".to_string(), label_json(class_label(form)));
    }
    if fields.specialization {
        out.insert(
            "specialization".to_string(),
            label_json(specialization_label(form)),
        );
    }
    if fields.appearance {
        out.insert("face".to_string(), JsonValue::from(form.face()));
        out.insert("hair".to_string(), JsonValue::from(form.hair()));
        out.insert(
            "hair_color".to_string(),
            JsonValue::String(form.hair_color().to_hex()),
        );
    }
    if fields.skills {
        out.insert("skills".to_string(), skills_to_json(form));
    }
    if fields.coins {
        out.insert("coins".to_string(), coins_to_json(form));
    }
    if fields.pet {
        out.insert("pet".to_string(), pet_to_json(form));
    }
    if fields.equipment {
        out.insert("equipment".to_string(), equipment_to_json(form));
    }
    if fields.inventory {
        out.insert("inventory".to_string(), inventory_to_json(form));
    }

    out
}

fn label_json(label: Option<&str>) -> JsonValue {
    match label {
        Some(label) => JsonValue::String(label.to_string()),
        None => JsonValue::Null,
    }
}

fn gender_label(form: &EditorForm) -> Option<&'static str> {
    form.gender()
        .and_then(Gender::from_table_index)
        .map(|g| g.as_str())
}

fn race_label(form: &EditorForm) -> Option<&'static str> {
    form.race().and_then(|r| RACE_NAMES.get(r).copied())
}

fn class_label(form: &EditorForm) -> Option<&'static str> {
    form.class().and_then(|c| CLASS_NAMES.get(c).copied())
}

fn specialization_label(form: &EditorForm) -> Option<&'static str> {
    form.specialization()
        .and_then(|s| form.bounds().specializations.get(s).copied())
}

fn pet_kind_label(form: &EditorForm) -> Option<&'static str> {
    form.pet()
        .kind
        .and_then(|k| pet_kind_choices().get(k).copied())
}

fn skills_to_json(form: &EditorForm) -> JsonValue {
    let mut m = JsonMap::new();
    for skill in Skill::ALL {
        m.insert(
            skill.key().to_string(),
            JsonValue::from(form.skills().get(skill)),
        );
    }
    JsonValue::Object(m)
}

fn coins_to_json(form: &EditorForm) -> JsonValue {
    let coins = form.coins();
    let mut m = JsonMap::new();
    m.insert("gold".to_string(), JsonValue::from(coins.gold));
    m.insert("silver".to_string(), JsonValue::from(coins.silver));
    m.insert("copper".to_string(), JsonValue::from(coins.copper));
    m.insert("platinum".to_string(), JsonValue::from(form.platinum_coins()));
    JsonValue::Object(m)
}

fn pet_to_json(form: &EditorForm) -> JsonValue {
    let pet = form.pet();
    let mut m = JsonMap::new();
    m.insert("kind".to_string(), label_json(pet_kind_label(form)));
    m.insert("level".to_string(), JsonValue::from(pet.level));
    m.insert("xp".to_string(), JsonValue::from(pet.experience));
    m.insert(
        "name".to_string(),
        JsonValue::String(pet_name::display_name(&pet.name).to_string()),
    );
    JsonValue::Object(m)
}

fn item_to_json(fields: &ItemFields, m: &mut JsonMap<String, JsonValue>) {
    m.insert("type".to_string(), label_json(fields.type_label()));
    m.insert("subtype".to_string(), label_json(fields.subtype_label()));
    m.insert("material".to_string(), label_json(fields.material_label()));
    m.insert("modifier".to_string(), label_json(fields.modifier_label()));
    m.insert("level".to_string(), JsonValue::from(fields.level));
}

fn equipment_to_json(form: &EditorForm) -> JsonValue {
    JsonValue::Array(
        form.equipment()
            .iter()
            .map(|e| {
                let mut m = JsonMap::new();
                m.insert("slot".to_string(), JsonValue::String(e.slot_name.to_string()));
                item_to_json(&e.fields, &mut m);
                JsonValue::Object(m)
            })
            .collect(),
    )
}

fn inventory_to_json(form: &EditorForm) -> JsonValue {
    JsonValue::Array(
        form.inventories()
            .iter()
            .map(|tab| {
                let items = tab
                    .entries
                    .iter()
                    .enumerate()
                    .filter(|(_, entry)| !entry.placeholder)
                    .map(|(position, entry)| {
                        let mut m = JsonMap::new();
                        m.insert("entry".to_string(), JsonValue::from(position));
                        m.insert("slot".to_string(), JsonValue::from(entry.slot));
                        m.insert("name".to_string(), JsonValue::String(entry.label.clone()));
                        item_to_json(&entry.fields, &mut m);
                        JsonValue::Object(m)
                    })
                    .collect();
                let mut m = JsonMap::new();
                m.insert("tab".to_string(), JsonValue::String(tab.name.to_string()));
                m.insert("items".to_string(), JsonValue::Array(items));
                JsonValue::Object(m)
            })
            .collect(),
    )
}

pub fn render_sheet(session: &Session) -> String {
    let form = session.form();
    let mut out = String::new();

    writeln!(&mut out).expect("writing to String cannot fail");
    writeln!(&mut out, "{}", centered_no_trailing(&session.title(), SHEET_WIDTH))
        .expect("writing to String cannot fail");
    writeln!(&mut out, "{}", centered_no_trailing("CHARACTER RECORD", SHEET_WIDTH))
        .expect("writing to String cannot fail");
    writeln!(&mut out).expect("writing to String cannot fail");

    writeln!(
        &mut out,
        "  Name: {:<26}Level: {:<10}Exp: {}",
        fit_column(form.name(), 25),
        form.level(),
        format_number_with_commas(form.experience())
    )
    .expect("writing to String cannot fail");
    writeln!(
        &mut out,
        "  Race: {:<26}Gender: {:<9}Class: {}",
        race_label(form).unwrap_or(UNKNOWN_LABEL),
        gender_label(form).unwrap_or(UNKNOWN_LABEL),
        class_label(form).unwrap_or(UNKNOWN_LABEL)
    )
    .expect("writing to String cannot fail");
    writeln!(
        &mut out,
        "  Specialization: {:<16}Face: {:<11}Hair: {} ({})",
        specialization_label(form).unwrap_or("none"),
        form.face(),
        form.hair(),
        form.hair_color().to_hex()
    )
    .expect("writing to String cannot fail");
    writeln!(&mut out).expect("writing to String cannot fail");

    write_skills_wallet_grid(&mut out, form);
    writeln!(&mut out).expect("writing to String cannot fail");
    write_equipment_section(&mut out, form);
    writeln!(&mut out).expect("writing to String cannot fail");
    write_inventory_section(&mut out, form);

    out
}

fn write_skills_wallet_grid(out: &mut String, form: &EditorForm) {
    writeln!(out, " ::: Skills :::                    ::: Wallet & Pet :::")
        .expect("writing to String cannot fail");

    let skill_lines: Vec<String> = Skill::ALL
        .iter()
        .map(|&skill| format!("{}: {}", skill.display_name(), form.skills().get(skill)))
        .collect();

    let coins = form.coins();
    let pet = form.pet();
    let pet_name = pet_name::display_name(&pet.name);
    let right_lines = vec![
        format!("Gold: {}", coins.gold),
        format!("Silver: {}", coins.silver),
        format!("Copper: {}", coins.copper),
        format!("Platinum: {}", form.platinum_coins()),
        String::new(),
        format!("Pet: {}", pet_kind_label(form).unwrap_or(UNKNOWN_LABEL)),
        format!("Pet Name: {}", if pet_name.is_empty() { "none" } else { pet_name }),
        format!("Pet Level: {}", pet.level),
        format!("Pet Exp: {}", format_number_with_commas(pet.experience)),
    ];

    let row_count = skill_lines.len().max(right_lines.len());
    for row in 0..row_count {
        let left = skill_lines.get(row).map(String::as_str).unwrap_or("");
        let right = right_lines.get(row).map(String::as_str).unwrap_or("");
        let line = format!(
            " {:<a$}{:<b$}",
            fit_column(left, TWO_COL_WIDTH_LEFT),
            fit_column(right, TWO_COL_WIDTH_RIGHT),
            a = TWO_COL_WIDTH_LEFT,
            b = TWO_COL_WIDTH_RIGHT
        );
        writeln!(out, "{}", line.trim_end()).expect("writing to String cannot fail");
    }
}

fn item_summary(fields: &ItemFields) -> String {
    match fields.type_label() {
        None => UNKNOWN_LABEL.to_string(),
        Some("None") => "empty".to_string(),
        Some(item_type) => {
            let base = fields.subtype_label().unwrap_or(item_type);
            let mut label = match fields.material_label() {
                Some(material) if material != "None" => format!("{material} {base}"),
                _ => base.to_string(),
            };
            write!(&mut label, " (Lv {})", fields.level).expect("writing to String cannot fail");
            if let Some(modifier) = fields.modifier_label() {
                write!(&mut label, " [{modifier}]").expect("writing to String cannot fail");
            }
            label
        }
    }
}

fn write_equipment_section(out: &mut String, form: &EditorForm) {
    writeln!(out, " ::: Equipment :::").expect("writing to String cannot fail");
    for equipment in form.equipment() {
        writeln!(
            out,
            "  {:>16}: {}",
            equipment.slot_name,
            item_summary(&equipment.fields)
        )
        .expect("writing to String cannot fail");
    }
}

fn write_inventory_section(out: &mut String, form: &EditorForm) {
    writeln!(out, " ::: Inventory :::").expect("writing to String cannot fail");

    for tab in form.inventories() {
        writeln!(out).expect("writing to String cannot fail");
        writeln!(out, "  {}", tab.name).expect("writing to String cannot fail");

        let rows: Vec<&str> = tab
            .entries
            .iter()
            .filter(|entry| !entry.placeholder)
            .map(|entry| entry.label.as_str())
            .collect();
        if rows.is_empty() {
            writeln!(out, "    none").expect("writing to String cannot fail");
            continue;
        }

        for chunk in rows.chunks(3) {
            let col1 = chunk.first().copied().unwrap_or("");
            let col2 = chunk.get(1).copied().unwrap_or("");
            let col3 = chunk.get(2).copied().unwrap_or("");
            let line = format!(
                "    {:<w$}{:<w$}{:<w$}",
                fit_column(col1, INVENTORY_COL_WIDTH),
                fit_column(col2, INVENTORY_COL_WIDTH),
                fit_column(col3, INVENTORY_COL_WIDTH),
                w = INVENTORY_COL_WIDTH
            );
            writeln!(out, "{}", line.trim_end()).expect("writing to String cannot fail");
        }
    }
}

fn fit_column(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 3 {
        return value.chars().take(width).collect();
    }

    let mut out = String::with_capacity(width);
    for ch in value.chars().take(width - 3) {
        out.push(ch);
    }
    out.push_str("...");
    out
}

fn centered_no_trailing(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len >= width {
        return value.to_string();
    }

    let left_padding = (width - len) / 2;
    format!("{}{}", " ".repeat(left_padding), value)
}

fn format_number_with_commas(n: i32) -> String {
    let n = i64::from(n);
    if n < 0 {
        return format!("-{}", format_number_with_commas_abs(n.unsigned_abs()));
    }
    format_number_with_commas_abs(n.unsigned_abs())
}

fn format_number_with_commas_abs(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(c);
    }
    result
}
