//! Editable presentation state for one character.
//!
//! Every list-backed field holds a dense index (`None` means no selection).
//! Setters mark the shared dirty flag when they change a value and refresh the
//! bound metadata that depends on the field.

use serde::Serialize;

use crate::character::{
    AppearanceBounds, CharacterClass, HairColor, Skill, Skills, appearance_bounds,
};
use crate::coins::Coins;
use crate::core_api::CoreError;
use crate::dirty::DirtyFlag;
use crate::gender::Gender;
use crate::index::{dense_labels, dense_len, denormalize_byte};
use crate::tables::{
    CLASS_COUNT, GENDER_COUNT, ITEM_ATTRIBUTE_COUNT, ITEM_MATERIAL_NAMES, ITEM_MODIFIER_NAMES,
    ITEM_TYPE_NAMES, ITEM_TYPE_NONE, PET_SUBTYPES, RACE_COUNT, item_subtype_names,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemRef {
    Equipment(usize),
    Inventory { tab: usize, entry: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFields {
    pub item_type: Option<usize>,
    pub subtype: Option<usize>,
    pub material: Option<usize>,
    pub modifier: Option<usize>,
    pub level: i16,
}

impl ItemFields {
    pub fn raw_type(&self) -> Option<u8> {
        self.item_type
            .and_then(|dense| denormalize_byte(dense, &ITEM_TYPE_NAMES))
    }

    /// Subtypes offered for the selected type; none for `None` or no selection.
    pub fn subtype_choices(&self) -> Vec<&'static str> {
        match self.raw_type() {
            Some(ITEM_TYPE_NONE) | None => Vec::new(),
            Some(raw) => dense_labels(item_subtype_names(raw)),
        }
    }

    pub fn type_label(&self) -> Option<&'static str> {
        self.item_type
            .and_then(|d| dense_labels(&ITEM_TYPE_NAMES).get(d).copied())
    }

    pub fn subtype_label(&self) -> Option<&'static str> {
        self.subtype
            .and_then(|d| self.subtype_choices().get(d).copied())
    }

    pub fn material_label(&self) -> Option<&'static str> {
        self.material
            .and_then(|d| dense_labels(&ITEM_MATERIAL_NAMES).get(d).copied())
    }

    pub fn modifier_label(&self) -> Option<&'static str> {
        self.modifier
            .and_then(|d| ITEM_MODIFIER_NAMES.get(d).copied())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EquipmentFields {
    pub slot: usize,
    pub slot_name: &'static str,
    pub fields: ItemFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryEntryFields {
    pub slot: i32,
    pub label: String,
    pub placeholder: bool,
    pub fields: ItemFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryTab {
    pub name: &'static str,
    pub entries: Vec<InventoryEntryFields>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PetFields {
    /// Index into [`pet_kind_choices`]; 0 is "None".
    pub kind: Option<usize>,
    pub level: i32,
    pub experience: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormBounds {
    pub appearance: Option<AppearanceBounds>,
    pub specializations: &'static [&'static str],
    pub pet_level_max: i32,
}

pub fn pet_kind_choices() -> Vec<&'static str> {
    let mut choices = vec!["None"];
    choices.extend(dense_labels(PET_SUBTYPES));
    choices
}

#[derive(Debug, Clone, Serialize)]
pub struct EditorForm {
    pub(crate) name: String,
    pub(crate) level: i32,
    pub(crate) experience: i32,
    pub(crate) gender: Option<usize>,
    pub(crate) race: Option<usize>,
    pub(crate) class: Option<usize>,
    pub(crate) specialization: Option<usize>,
    pub(crate) face: i32,
    pub(crate) hair: i32,
    pub(crate) hair_color: HairColor,
    pub(crate) skills: Skills,
    pub(crate) coins: Coins,
    pub(crate) platinum_coins: i32,
    pub(crate) pet: PetFields,
    pub(crate) equipment: Vec<EquipmentFields>,
    pub(crate) inventories: Vec<InventoryTab>,
    pub(crate) bounds: FormBounds,
    #[serde(skip)]
    pub(crate) dirty: DirtyFlag,
}

fn update<T: PartialEq>(dirty: &DirtyFlag, field: &mut T, value: T) -> bool {
    if *field == value {
        return false;
    }
    *field = value;
    dirty.mark();
    true
}

fn check_dense(what: &str, value: Option<usize>, len: usize) -> Result<(), CoreError> {
    match value {
        Some(index) if index >= len => Err(CoreError::invalid_value(format!(
            "{what} index {index} out of range, expected 0-{}",
            len.saturating_sub(1)
        ))),
        _ => Ok(()),
    }
}

impl EditorForm {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn experience(&self) -> i32 {
        self.experience
    }

    pub fn gender(&self) -> Option<usize> {
        self.gender
    }

    pub fn race(&self) -> Option<usize> {
        self.race
    }

    pub fn class(&self) -> Option<usize> {
        self.class
    }

    pub fn specialization(&self) -> Option<usize> {
        self.specialization
    }

    pub fn face(&self) -> i32 {
        self.face
    }

    pub fn hair(&self) -> i32 {
        self.hair
    }

    pub fn hair_color(&self) -> HairColor {
        self.hair_color
    }

    pub fn skills(&self) -> &Skills {
        &self.skills
    }

    pub fn coins(&self) -> Coins {
        self.coins
    }

    pub fn platinum_coins(&self) -> i32 {
        self.platinum_coins
    }

    pub fn pet(&self) -> &PetFields {
        &self.pet
    }

    pub fn equipment(&self) -> &[EquipmentFields] {
        &self.equipment
    }

    pub fn inventories(&self) -> &[InventoryTab] {
        &self.inventories
    }

    pub fn bounds(&self) -> &FormBounds {
        &self.bounds
    }

    pub fn dirty_flag(&self) -> &DirtyFlag {
        &self.dirty
    }

    pub fn item(&self, item: ItemRef) -> Option<&ItemFields> {
        match item {
            ItemRef::Equipment(slot) => self
                .equipment
                .iter()
                .find(|e| e.slot == slot)
                .map(|e| &e.fields),
            ItemRef::Inventory { tab, entry } => self
                .inventories
                .get(tab)
                .and_then(|t| t.entries.get(entry))
                .map(|e| &e.fields),
        }
    }

    pub fn set_name(&mut self, name: &str) {
        update(&self.dirty, &mut self.name, name.to_string());
    }

    // The pet level bound follows, but a pet already above it keeps its level.
    pub fn set_level(&mut self, level: i32) {
        update(&self.dirty, &mut self.level, level);
        self.bounds.pet_level_max = level;
    }

    pub fn set_experience(&mut self, experience: i32) {
        update(&self.dirty, &mut self.experience, experience);
    }

    pub fn set_gender(&mut self, gender: Option<usize>) -> Result<(), CoreError> {
        check_dense("gender", gender, GENDER_COUNT)?;
        if update(&self.dirty, &mut self.gender, gender) {
            self.refresh_appearance();
        }
        Ok(())
    }

    pub fn set_race(&mut self, race: Option<usize>) -> Result<(), CoreError> {
        check_dense("race", race, RACE_COUNT)?;
        if update(&self.dirty, &mut self.race, race) {
            self.refresh_appearance();
        }
        Ok(())
    }

    pub fn set_class(&mut self, class: Option<usize>) -> Result<(), CoreError> {
        check_dense("class", class, CLASS_COUNT)?;
        if update(&self.dirty, &mut self.class, class) {
            self.refresh_specializations();
        }
        Ok(())
    }

    pub fn set_specialization(&mut self, specialization: Option<usize>) -> Result<(), CoreError> {
        check_dense(
            "specialization",
            specialization,
            self.bounds.specializations.len(),
        )?;
        update(&self.dirty, &mut self.specialization, specialization);
        Ok(())
    }

    pub fn set_face(&mut self, face: i32) {
        let face = match self.bounds.appearance {
            Some(bounds) => bounds.clamp_face(face),
            None => face.max(0),
        };
        update(&self.dirty, &mut self.face, face);
    }

    pub fn set_hair(&mut self, hair: i32) {
        let hair = match self.bounds.appearance {
            Some(bounds) => bounds.clamp_hair(hair),
            None => hair.max(0),
        };
        update(&self.dirty, &mut self.hair, hair);
    }

    pub fn set_hair_color(&mut self, color: HairColor) {
        update(&self.dirty, &mut self.hair_color, color);
    }

    pub fn set_skill(&mut self, skill: Skill, value: i32) {
        update(&self.dirty, self.skills.get_mut(skill), value);
    }

    pub fn set_coins(&mut self, coins: Coins) {
        update(&self.dirty, &mut self.coins, coins);
    }

    pub fn set_platinum_coins(&mut self, platinum: i32) {
        update(&self.dirty, &mut self.platinum_coins, platinum);
    }

    pub fn set_pet_kind(&mut self, kind: Option<usize>) -> Result<(), CoreError> {
        check_dense("pet kind", kind, dense_len(PET_SUBTYPES) + 1)?;
        update(&self.dirty, &mut self.pet.kind, kind);
        Ok(())
    }

    pub fn set_pet_level(&mut self, level: i32) {
        let level = level.clamp(0, self.bounds.pet_level_max.max(0));
        update(&self.dirty, &mut self.pet.level, level);
    }

    pub fn set_pet_experience(&mut self, experience: i32) {
        update(&self.dirty, &mut self.pet.experience, experience);
    }

    pub fn set_pet_name(&mut self, name: &str) {
        let name: String = name.chars().take(ITEM_ATTRIBUTE_COUNT).collect();
        update(&self.dirty, &mut self.pet.name, name);
    }

    /// Changing the type re-lists subtypes and selects the first one.
    pub fn set_item_type(
        &mut self,
        item: ItemRef,
        item_type: Option<usize>,
    ) -> Result<(), CoreError> {
        check_dense("item type", item_type, dense_len(&ITEM_TYPE_NAMES))?;
        let dirty = self.dirty.clone();
        let fields = self.item_fields_mut(item)?;
        if update(&dirty, &mut fields.item_type, item_type) {
            let first = (!fields.subtype_choices().is_empty()).then_some(0);
            fields.subtype = first;
        }
        Ok(())
    }

    pub fn set_item_subtype(
        &mut self,
        item: ItemRef,
        subtype: Option<usize>,
    ) -> Result<(), CoreError> {
        let dirty = self.dirty.clone();
        let fields = self.item_fields_mut(item)?;
        check_dense("item subtype", subtype, fields.subtype_choices().len())?;
        update(&dirty, &mut fields.subtype, subtype);
        Ok(())
    }

    pub fn set_item_material(
        &mut self,
        item: ItemRef,
        material: Option<usize>,
    ) -> Result<(), CoreError> {
        check_dense("item material", material, dense_len(&ITEM_MATERIAL_NAMES))?;
        let dirty = self.dirty.clone();
        let fields = self.item_fields_mut(item)?;
        update(&dirty, &mut fields.material, material);
        Ok(())
    }

    pub fn set_item_modifier(
        &mut self,
        item: ItemRef,
        modifier: Option<usize>,
    ) -> Result<(), CoreError> {
        check_dense("item modifier", modifier, ITEM_MODIFIER_NAMES.len())?;
        let dirty = self.dirty.clone();
        let fields = self.item_fields_mut(item)?;
        update(&dirty, &mut fields.modifier, modifier);
        Ok(())
    }

    pub fn set_item_level(&mut self, item: ItemRef, level: i16) -> Result<(), CoreError> {
        let dirty = self.dirty.clone();
        let fields = self.item_fields_mut(item)?;
        update(&dirty, &mut fields.level, level.max(0));
        Ok(())
    }

    fn item_fields_mut(&mut self, item: ItemRef) -> Result<&mut ItemFields, CoreError> {
        let found = match item {
            ItemRef::Equipment(slot) => self
                .equipment
                .iter_mut()
                .find(|e| e.slot == slot)
                .map(|e| &mut e.fields),
            ItemRef::Inventory { tab, entry } => self
                .inventories
                .get_mut(tab)
                .and_then(|t| t.entries.get_mut(entry))
                .map(|e| &mut e.fields),
        };
        found.ok_or_else(|| CoreError::invalid_value(format!("no editable item at {item:?}")))
    }

    // Cosmetic values above the new maxima are clamped.
    fn refresh_appearance(&mut self) {
        self.bounds.appearance = appearance_for(self.race, self.gender);
        if let Some(bounds) = self.bounds.appearance {
            let face = bounds.clamp_face(self.face);
            let hair = bounds.clamp_hair(self.hair);
            update(&self.dirty, &mut self.face, face);
            update(&self.dirty, &mut self.hair, hair);
        }
    }

    fn refresh_specializations(&mut self) {
        let specializations = specializations_for(self.class);
        self.bounds.specializations = specializations;

        let kept = match self.specialization {
            Some(index) if index < specializations.len() => Some(index),
            _ if specializations.is_empty() => None,
            _ => Some(0),
        };
        update(&self.dirty, &mut self.specialization, kept);
    }
}

fn appearance_for(race: Option<usize>, gender: Option<usize>) -> Option<AppearanceBounds> {
    let race = i32::try_from(race?).ok()?;
    appearance_bounds(race, Gender::from_table_index(gender?)?)
}

fn specializations_for(class: Option<usize>) -> &'static [&'static str] {
    class
        .and_then(CharacterClass::from_table_index)
        .map(|c| c.specializations())
        .unwrap_or(&[])
}

pub(crate) fn form_bounds(
    race: Option<usize>,
    gender: Option<usize>,
    class: Option<usize>,
    level: i32,
) -> FormBounds {
    FormBounds {
        appearance: appearance_for(race, gender),
        specializations: specializations_for(class),
        pet_level_max: level,
    }
}
