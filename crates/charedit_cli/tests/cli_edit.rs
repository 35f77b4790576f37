use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use charedit_core::character::{Character, CharacterClass, Item};
use charedit_core::database::{Database, JsonDatabase};
use charedit_core::pet_name;
use charedit_core::tables::{ITEM_TYPE_NONE, ITEM_TYPE_PETS};
use serde_json::Value;

fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_charedit"))
        .args(args)
        .output()
        .expect("failed to run charedit CLI")
}

fn temp_path(prefix: &str, extension: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!(
        "{prefix}_{}_{}.{extension}",
        std::process::id(),
        nanos
    ))
}

fn roster() -> Vec<Character> {
    let mut aria = Character::new(1, "Aria");
    aria.level = 12;
    aria.gender = 1;
    aria.race = 1;
    aria.class = CharacterClass::Mage.raw();
    aria.specialization = 1;
    aria.face = 5;
    aria.hair = 2;
    aria.coins = 20_517;
    aria.equipment[6] = Item::new(3, 0, 1, 10);
    let pet = aria.pet_mut();
    *pet = Item::new(ITEM_TYPE_PETS, 5, 0, 4);
    pet_name::pack("Buster", &mut pet.attributes);
    aria.inventories[1].push(0, Item::default());
    aria.inventories[1].push(2, Item::new(3, 6, 2, 4));

    // Orc male allows face 2; the stored face is already above it.
    let mut brom = Character::new(2, "Brom");
    brom.race = 5;
    brom.gender = 0;
    brom.face = 6;

    vec![aria, brom]
}

fn create_db(prefix: &str, extension: &str) -> PathBuf {
    let path = temp_path(prefix, extension);
    JsonDatabase::create(&path, roster()).expect("create fixture database");
    path
}

fn saved(path: &PathBuf, index: usize) -> Character {
    JsonDatabase::open(path)
        .expect("output should open as a database")
        .load(index)
        .expect("output should contain the character")
}

#[test]
fn cli_sets_scalar_fields_and_writes_output() {
    let path = create_db("charedit_set_scalars", "json");
    let path_s = path.to_string_lossy().to_string();
    let out_path = temp_path("charedit_set_scalars_out", "json");
    let out_path_s = out_path.to_string_lossy().to_string();

    let output = run_cli(&[
        "--set-name",
        "Aria Vale",
        "--set-level",
        "20",
        "--set-xp",
        "9000",
        "--set-skill",
        "climbing=3",
        "--set-skill",
        "pet-riding=2",
        "--set-gold",
        "7",
        "--set-platinum",
        "4",
        "--set-hair-color",
        "#A0B0C0",
        "--output",
        &out_path_s,
        "--name",
        "--level",
        "--xp",
        &path_s,
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["name=Aria Vale", "level=20", "xp=9000"]);

    let aria = saved(&out_path, 0);
    assert_eq!(aria.name, "Aria Vale");
    assert_eq!(aria.level, 20);
    assert_eq!(aria.experience, 9000);
    assert_eq!(aria.skills.climbing, 3);
    assert_eq!(aria.skills.pet_riding, 2);
    assert_eq!(aria.coins, 70_517);
    assert_eq!(aria.platinum_coins, 4);
    assert_eq!(aria.hair_color.to_hex(), "#a0b0c0");
    assert_eq!(saved(&out_path, 1).name, "Brom");

    let untouched = saved(&path, 0);
    assert_eq!(untouched.level, 12);

    let _ = fs::remove_file(&path);
    let _ = fs::remove_file(&out_path);
}

#[test]
fn cli_class_change_keeps_specialization_index() {
    let path = create_db("charedit_set_class", "json");
    let path_s = path.to_string_lossy().to_string();
    let out_path = temp_path("charedit_set_class_out", "json");
    let out_path_s = out_path.to_string_lossy().to_string();

    let output = run_cli(&[
        "--set-class",
        "rogue",
        "--output",
        &out_path_s,
        "--class",
        "--specialization",
        &path_s,
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["class=Rogue", "specialization=Ninja"]);

    let aria = saved(&out_path, 0);
    assert_eq!(aria.class(), CharacterClass::Rogue);
    assert_eq!(aria.specialization, 1);

    let _ = fs::remove_file(&path);
    let _ = fs::remove_file(&out_path);
}

#[test]
fn cli_gender_change_clamps_face() {
    let path = create_db("charedit_set_gender", "json");
    let path_s = path.to_string_lossy().to_string();
    let out_path = temp_path("charedit_set_gender_out", "json");
    let out_path_s = out_path.to_string_lossy().to_string();

    // Human female allows face 6, human male only 4.
    let output = run_cli(&["--set-gender", "male", "--output", &out_path_s, &path_s]);
    assert!(output.status.success());

    let aria = saved(&out_path, 0);
    assert_eq!(aria.gender, 0);
    assert_eq!(aria.face, 4);
    assert_eq!(aria.hair, 2);

    let _ = fs::remove_file(&path);
    let _ = fs::remove_file(&out_path);
}

#[test]
fn cli_edits_pet_and_keeps_stale_name_tail() {
    let path = create_db("charedit_set_pet", "json");
    let path_s = path.to_string_lossy().to_string();
    let out_path = temp_path("charedit_set_pet_out", "json");
    let out_path_s = out_path.to_string_lossy().to_string();

    let output = run_cli(&[
        "--set-pet-kind",
        "Dragon",
        "--set-pet-level",
        "9",
        "--set-pet-xp",
        "250",
        "--set-pet-name",
        "Rex",
        "--output",
        &out_path_s,
        &path_s,
    ]);
    assert!(output.status.success());

    let pet = saved(&out_path, 0).pet().clone();
    assert_eq!(pet.kind, ITEM_TYPE_PETS);
    assert_eq!(pet.subtype, 18);
    assert_eq!(pet.level, 9);
    assert_eq!(pet.modifier, 250);
    let name = pet_name::unpack(&pet.attributes);
    assert_eq!(pet_name::display_name(&name), "Rexter");

    let _ = fs::remove_file(&path);
    let _ = fs::remove_file(&out_path);
}

#[test]
fn cli_pet_kind_none_clears_pet_type() {
    let path = create_db("charedit_pet_none", "json");
    let path_s = path.to_string_lossy().to_string();
    let out_path = temp_path("charedit_pet_none_out", "json");
    let out_path_s = out_path.to_string_lossy().to_string();

    let output = run_cli(&["--set-pet-kind", "none", "--output", &out_path_s, &path_s]);
    assert!(output.status.success());

    let pet = saved(&out_path, 0).pet().clone();
    assert_eq!(pet.kind, ITEM_TYPE_NONE);
    assert_eq!(pet.subtype, 5);

    let _ = fs::remove_file(&path);
    let _ = fs::remove_file(&out_path);
}

#[test]
fn cli_edits_equipment_item_by_name() {
    let path = create_db("charedit_set_item", "json.gz");
    let path_s = path.to_string_lossy().to_string();
    let out_path = temp_path("charedit_set_item_out", "json.gz");
    let out_path_s = out_path.to_string_lossy().to_string();

    let output = run_cli(&[
        "--item",
        "equipment:6",
        "--set-item-subtype",
        "greatsword",
        "--set-item-material",
        "obsidian",
        "--set-item-modifier",
        "lucky",
        "--set-item-level",
        "14",
        "--output",
        &out_path_s,
        &path_s,
    ]);
    assert!(output.status.success());

    let item = saved(&out_path, 0).equipment[6].clone();
    assert_eq!(item.kind, 3);
    assert_eq!(item.subtype, 15);
    assert_eq!(item.material, 5);
    assert_eq!(item.modifier, 6);
    assert_eq!(item.level, 14);
    assert_eq!(item.friendly_name(), "Obsidian Greatsword");

    let _ = fs::remove_file(&path);
    let _ = fs::remove_file(&out_path);
}

#[test]
fn cli_edits_inventory_entry_after_placeholder() {
    let path = create_db("charedit_set_inventory", "json");
    let path_s = path.to_string_lossy().to_string();
    let out_path = temp_path("charedit_set_inventory_out", "json");
    let out_path_s = out_path.to_string_lossy().to_string();

    let listing = run_cli(&["--json", "--inventory", &path_s]);
    assert!(listing.status.success());
    let json: Value =
        serde_json::from_slice(&listing.stdout).expect("stdout should be valid JSON");
    assert_eq!(json["inventory"][1]["items"][0]["entry"], 1);
    assert_eq!(json["inventory"][1]["items"][0]["name"], "Wood Bow");

    let output = run_cli(&[
        "--item",
        "inventory:1:1",
        "--set-item-material",
        "obsidian",
        "--set-item-level",
        "9",
        "--output",
        &out_path_s,
        &path_s,
    ]);
    assert!(output.status.success());

    let aria = saved(&out_path, 0);
    let entry = &aria.inventories[1].entries[1];
    assert_eq!(entry.slot, 2);
    assert_eq!(entry.item.material, 5);
    assert_eq!(entry.item.level, 9);
    assert_eq!(aria.inventories[1].entries[0].item, Item::default());

    let _ = fs::remove_file(&path);
    let _ = fs::remove_file(&out_path);
}

#[test]
fn cli_same_gender_keeps_stored_face() {
    let path = create_db("charedit_same_gender", "json");
    let path_s = path.to_string_lossy().to_string();
    let out_path = temp_path("charedit_same_gender_out", "json");
    let out_path_s = out_path.to_string_lossy().to_string();

    let output = run_cli(&[
        "--character",
        "Brom",
        "--set-gender",
        "male",
        "--set-level",
        "8",
        "--output",
        &out_path_s,
        &path_s,
    ]);
    assert!(output.status.success());

    let brom = saved(&out_path, 1);
    assert_eq!(brom.level, 8);
    assert_eq!(brom.face, 6);

    let _ = fs::remove_file(&path);
    let _ = fs::remove_file(&out_path);
}

#[test]
fn cli_rejects_unknown_names() {
    let path = create_db("charedit_unknown_name", "json");
    let path_s = path.to_string_lossy().to_string();
    let out_path = temp_path("charedit_unknown_name_out", "json");
    let out_path_s = out_path.to_string_lossy().to_string();

    let output = run_cli(&["--set-race", "Centaur", "--output", &out_path_s, &path_s]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown race 'Centaur'"));
    assert!(stderr.contains("Lizardman"));
    assert!(!out_path.exists());

    let _ = fs::remove_file(&path);
}

#[test]
fn cli_requires_output_for_edits() {
    let path = create_db("charedit_need_output", "json");
    let path_s = path.to_string_lossy().to_string();

    let output = run_cli(&["--set-level", "5", &path_s]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--set-* flags require --output"));

    let output = run_cli(&["--output", &path_s, &path_s]);
    assert_eq!(output.status.code(), Some(2));

    let _ = fs::remove_file(&path);
}

#[test]
fn cli_refuses_to_overwrite_output_without_force_flag() {
    let path = create_db("charedit_overwrite_block", "json");
    let path_s = path.to_string_lossy().to_string();
    let out_path = temp_path("charedit_overwrite_block_out", "json");
    let out_path_s = out_path.to_string_lossy().to_string();
    fs::write(&out_path, b"[]").expect("should create placeholder output");

    let output = run_cli(&["--set-level", "5", "--output", &out_path_s, &path_s]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("refusing to overwrite existing file"));
    assert_eq!(fs::read(&out_path).expect("output should still exist"), b"[]");

    let _ = fs::remove_file(&path);
    let _ = fs::remove_file(&out_path);
}

#[test]
fn cli_can_edit_in_place_with_backup() {
    let path = create_db("charedit_in_place", "json");
    let path_s = path.to_string_lossy().to_string();
    let original = fs::read(&path).expect("fixture should read");

    let output = run_cli(&[
        "--character",
        "Brom",
        "--set-level",
        "31",
        "--force-overwrite",
        "--backup",
        "--output",
        &path_s,
        &path_s,
    ]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Wrote edited database"));

    let backup_path = PathBuf::from(format!("{}.bak", path.to_string_lossy()));
    assert_eq!(fs::read(&backup_path).expect("backup should exist"), original);
    assert_eq!(saved(&path, 1).level, 31);

    let _ = fs::remove_file(&path);
    let _ = fs::remove_file(&backup_path);
}
