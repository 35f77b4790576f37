use std::fmt;

use serde::{Deserialize, Serialize};

use crate::gender::Gender;
use crate::tables::{
    CLASS_NAMES, EQUIPMENT_COUNT, FACE_MAXIMUMS, HAIRCUT_MAXIMUMS, INVENTORY_COUNT,
    ITEM_ATTRIBUTE_COUNT, ITEM_MATERIAL_NAMES, ITEM_MODIFIER_NAMES, ITEM_TYPE_NAMES, PET_SLOT,
    RACE_COUNT, SPECIALIZATION_NAMES, item_subtype_names,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharacterClass {
    Unset,
    Warrior,
    Ranger,
    Mage,
    Rogue,
    Unknown(u8),
}

impl CharacterClass {
    pub const UNSET_RAW: u8 = 0;

    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Unset,
            1 => Self::Warrior,
            2 => Self::Ranger,
            3 => Self::Mage,
            4 => Self::Rogue,
            other => Self::Unknown(other),
        }
    }

    pub fn raw(&self) -> u8 {
        match *self {
            Self::Unset => Self::UNSET_RAW,
            Self::Warrior => 1,
            Self::Ranger => 2,
            Self::Mage => 3,
            Self::Rogue => 4,
            Self::Unknown(other) => other,
        }
    }

    /// Position in the class list; classes are stored 1-based.
    pub fn table_index(&self) -> Option<usize> {
        match *self {
            Self::Warrior | Self::Ranger | Self::Mage | Self::Rogue => {
                Some(usize::from(self.raw()) - 1)
            }
            Self::Unset | Self::Unknown(_) => None,
        }
    }

    pub fn from_table_index(index: usize) -> Option<Self> {
        let raw = u8::try_from(index + 1).ok()?;
        match Self::from_raw(raw) {
            Self::Unset | Self::Unknown(_) => None,
            class => Some(class),
        }
    }

    pub fn specializations(&self) -> &'static [&'static str] {
        match self.table_index() {
            Some(index) => SPECIALIZATION_NAMES[index],
            None => &[],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self.table_index() {
            Some(index) => CLASS_NAMES[index],
            None if *self == Self::Unset => "Unset",
            None => "Unknown",
        }
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Unknown(v) => write!(f, "Unknown ({})", v),
            _ => f.write_str(self.as_str()),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HairColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HairColor {
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn from_hex(value: &str) -> Option<Self> {
        let digits = value.strip_prefix('#').unwrap_or(value);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
        Some(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Skill {
    PetMastery,
    PetRiding,
    Climbing,
    HangGliding,
    Swimming,
    Sailing,
    TierOne,
    TierTwo,
    TierThree,
}

impl Skill {
    pub const ALL: [Skill; 9] = [
        Skill::PetMastery,
        Skill::PetRiding,
        Skill::Climbing,
        Skill::HangGliding,
        Skill::Swimming,
        Skill::Sailing,
        Skill::TierOne,
        Skill::TierTwo,
        Skill::TierThree,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Skill::PetMastery => "pet_mastery",
            Skill::PetRiding => "pet_riding",
            Skill::Climbing => "climbing",
            Skill::HangGliding => "hang_gliding",
            Skill::Swimming => "swimming",
            Skill::Sailing => "sailing",
            Skill::TierOne => "tier_one",
            Skill::TierTwo => "tier_two",
            Skill::TierThree => "tier_three",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Skill::PetMastery => "Pet Mastery",
            Skill::PetRiding => "Pet Riding",
            Skill::Climbing => "Climbing",
            Skill::HangGliding => "Hang Gliding",
            Skill::Swimming => "Swimming",
            Skill::Sailing => "Sailing",
            Skill::TierOne => "Tier 1",
            Skill::TierTwo => "Tier 2",
            Skill::TierThree => "Tier 3",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|skill| skill.key().eq_ignore_ascii_case(&key))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skills {
    pub pet_mastery: i32,
    pub pet_riding: i32,
    pub climbing: i32,
    pub hang_gliding: i32,
    pub swimming: i32,
    pub sailing: i32,
    pub tier_one: i32,
    pub tier_two: i32,
    pub tier_three: i32,
}

impl Skills {
    pub fn get(&self, skill: Skill) -> i32 {
        match skill {
            Skill::PetMastery => self.pet_mastery,
            Skill::PetRiding => self.pet_riding,
            Skill::Climbing => self.climbing,
            Skill::HangGliding => self.hang_gliding,
            Skill::Swimming => self.swimming,
            Skill::Sailing => self.sailing,
            Skill::TierOne => self.tier_one,
            Skill::TierTwo => self.tier_two,
            Skill::TierThree => self.tier_three,
        }
    }

    pub fn get_mut(&mut self, skill: Skill) -> &mut i32 {
        match skill {
            Skill::PetMastery => &mut self.pet_mastery,
            Skill::PetRiding => &mut self.pet_riding,
            Skill::Climbing => &mut self.climbing,
            Skill::HangGliding => &mut self.hang_gliding,
            Skill::Swimming => &mut self.swimming,
            Skill::Sailing => &mut self.sailing,
            Skill::TierOne => &mut self.tier_one,
            Skill::TierTwo => &mut self.tier_two,
            Skill::TierThree => &mut self.tier_three,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub x: i8,
    pub y: i8,
    pub z: i8,
    pub material: u8,
    pub level: i16,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "type")]
    pub kind: u8,
    pub subtype: u8,
    pub modifier: i32,
    pub rarity: u8,
    pub material: u8,
    pub level: i16,
    pub attributes: [Attribute; ITEM_ATTRIBUTE_COUNT],
}

impl Item {
    pub fn new(kind: u8, subtype: u8, material: u8, level: i16) -> Self {
        Self {
            kind,
            subtype,
            material,
            level,
            ..Self::default()
        }
    }

    pub fn is_none(&self) -> bool {
        self.kind == crate::tables::ITEM_TYPE_NONE
    }

    pub fn type_name(&self) -> Option<&'static str> {
        label(&ITEM_TYPE_NAMES, self.kind)
    }

    // Subtype has no meaning without a type.
    pub fn subtype_name(&self) -> Option<&'static str> {
        if self.is_none() {
            return None;
        }
        label(item_subtype_names(self.kind), self.subtype)
    }

    pub fn material_name(&self) -> Option<&'static str> {
        label(&ITEM_MATERIAL_NAMES, self.material)
    }

    pub fn modifier_index(&self) -> usize {
        modifier_index(self.modifier)
    }

    pub fn friendly_name(&self) -> String {
        if self.is_none() {
            return String::new();
        }
        let base = self
            .subtype_name()
            .or(self.type_name())
            .unwrap_or("Unknown Item");
        match self.material_name() {
            Some(material) if self.material != 0 => format!("{material} {base}"),
            _ => base.to_string(),
        }
    }
}

fn label(labels: &[&'static str], raw: u8) -> Option<&'static str> {
    labels
        .get(usize::from(raw))
        .copied()
        .filter(|l| !l.is_empty())
}

/// Modifiers are bit fields in the record; out-of-table values wrap into the
/// name table instead of being rejected.
pub fn modifier_index(modifier: i32) -> usize {
    let len = ITEM_MODIFIER_NAMES.len() as i32;
    modifier.rem_euclid(len) as usize
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub slot: i32,
    pub item: Item,
}

impl InventoryEntry {
    /// Empty slots are kept in the list so positions stay stable.
    pub fn is_placeholder(&self) -> bool {
        self.slot <= 0 || self.item.is_none()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub entries: Vec<InventoryEntry>,
}

impl Inventory {
    pub fn push(&mut self, slot: i32, item: Item) {
        self.entries.push(InventoryEntry { slot, item });
    }

    pub fn occupied(&self) -> impl Iterator<Item = &InventoryEntry> {
        self.entries.iter().filter(|e| !e.is_placeholder())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: u32,
    pub name: String,
    pub level: i32,
    pub experience: i32,
    pub gender: u8,
    pub race: i32,
    pub class: u8,
    pub specialization: u8,
    pub face: i32,
    pub hair: i32,
    pub hair_color: HairColor,
    pub skills: Skills,
    pub coins: i32,
    pub platinum_coins: i32,
    pub equipment: [Item; EQUIPMENT_COUNT],
    pub inventories: [Inventory; INVENTORY_COUNT],
}

impl Character {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            level: 1,
            experience: 0,
            gender: Gender::MALE_RAW,
            race: 0,
            class: CharacterClass::Warrior.raw(),
            specialization: 0,
            face: 0,
            hair: 0,
            hair_color: HairColor::default(),
            skills: Skills::default(),
            coins: 0,
            platinum_coins: 0,
            equipment: Default::default(),
            inventories: Default::default(),
        }
    }

    pub fn gender(&self) -> Gender {
        Gender::from_raw(self.gender)
    }

    pub fn class(&self) -> CharacterClass {
        CharacterClass::from_raw(self.class)
    }

    pub fn specialization_name(&self) -> Option<&'static str> {
        self.class()
            .specializations()
            .get(usize::from(self.specialization))
            .copied()
    }

    pub fn race_name(&self) -> Option<&'static str> {
        usize::try_from(self.race)
            .ok()
            .and_then(|r| crate::tables::RACE_NAMES.get(r).copied())
    }

    pub fn pet(&self) -> &Item {
        &self.equipment[PET_SLOT]
    }

    pub fn pet_mut(&mut self) -> &mut Item {
        &mut self.equipment[PET_SLOT]
    }

    pub fn appearance_bounds(&self) -> Option<AppearanceBounds> {
        appearance_bounds(self.race, self.gender())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppearanceBounds {
    pub face_max: i32,
    pub hair_max: i32,
}

impl AppearanceBounds {
    pub fn clamp_face(&self, face: i32) -> i32 {
        face.clamp(0, self.face_max)
    }

    pub fn clamp_hair(&self, hair: i32) -> i32 {
        hair.clamp(0, self.hair_max)
    }
}

pub fn appearance_bounds(race: i32, gender: Gender) -> Option<AppearanceBounds> {
    let race = usize::try_from(race).ok().filter(|&r| r < RACE_COUNT)?;
    let gender = gender.table_index()?;
    Some(AppearanceBounds {
        face_max: FACE_MAXIMUMS[race][gender],
        hair_max: HAIRCUT_MAXIMUMS[race][gender],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::ITEM_TYPE_PETS;

    #[test]
    fn class_raw_values_are_one_based() {
        assert_eq!(CharacterClass::from_raw(0), CharacterClass::Unset);
        assert_eq!(CharacterClass::from_raw(3), CharacterClass::Mage);
        assert_eq!(CharacterClass::Mage.table_index(), Some(2));
        assert_eq!(CharacterClass::from_table_index(3), Some(CharacterClass::Rogue));
        assert_eq!(CharacterClass::from_table_index(4), None);
        assert_eq!(CharacterClass::from_raw(9).raw(), 9);
        assert!(CharacterClass::Unset.specializations().is_empty());
        assert_eq!(CharacterClass::Rogue.specializations(), ["Assassin", "Ninja"]);
    }

    #[test]
    fn appearance_bounds_follow_race_and_gender() {
        let bounds = appearance_bounds(0, Gender::Male).expect("elf male bounds");
        assert_eq!(bounds.face_max, 6);
        assert_eq!(bounds.hair_max, 15);
        let bounds = appearance_bounds(2, Gender::Female).expect("goblin female bounds");
        assert_eq!(bounds.face_max, 5);
        assert_eq!(bounds.hair_max, 5);
        assert_eq!(bounds.clamp_hair(9), 5);
        assert_eq!(appearance_bounds(8, Gender::Male), None);
        assert_eq!(appearance_bounds(-1, Gender::Male), None);
        assert_eq!(appearance_bounds(0, Gender::Unknown(7)), None);
    }

    #[test]
    fn friendly_names_combine_material_and_subtype() {
        assert_eq!(Item::new(3, 0, 1, 5).friendly_name(), "Iron Sword");
        assert_eq!(Item::new(3, 14, 0, 5).friendly_name(), "Weapon");
        assert_eq!(Item::new(ITEM_TYPE_PETS, 2, 0, 1).friendly_name(), "Collie");
        assert_eq!(Item::new(0, 3, 1, 1).friendly_name(), "");
        assert_eq!(Item::new(0, 3, 1, 1).subtype_name(), None);
    }

    #[test]
    fn modifiers_wrap_into_table() {
        assert_eq!(modifier_index(3), 3);
        assert_eq!(modifier_index(11), 3);
        assert_eq!(modifier_index(-1), ITEM_MODIFIER_NAMES.len() - 1);
    }

    #[test]
    fn placeholder_entries() {
        let mut inventory = Inventory::default();
        inventory.push(0, Item::new(3, 0, 1, 1));
        inventory.push(2, Item::default());
        inventory.push(3, Item::new(1, 1, 0, 1));
        assert_eq!(inventory.occupied().count(), 1);
    }

    #[test]
    fn hair_color_hex() {
        let color = HairColor { r: 0x12, g: 0xab, b: 0xff };
        assert_eq!(color.to_hex(), "#12abff");
        assert_eq!(HairColor::from_hex("#12ABFF"), Some(color));
        assert_eq!(HairColor::from_hex("12abff"), Some(color));
        assert_eq!(HairColor::from_hex("#12ab"), None);
    }

    #[test]
    fn skill_keys_parse() {
        assert_eq!(Skill::from_key("hang-gliding"), Some(Skill::HangGliding));
        assert_eq!(Skill::from_key("TIER_ONE"), Some(Skill::TierOne));
        assert_eq!(Skill::from_key("flying"), None);
    }
}
