use tracing::debug;

use crate::character::{Character, CharacterClass, Item, modifier_index};
use crate::coins::Coins;
use crate::dirty::DirtyFlag;
use crate::form::{
    EditorForm, EquipmentFields, InventoryEntryFields, InventoryTab, ItemFields, PetFields,
    form_bounds,
};
use crate::gender::Gender;
use crate::index::{denormalize_byte, normalize_byte};
use crate::pet_name;
use crate::tables::{
    EQUIPMENT_COUNT, EQUIPMENT_SLOT_NAMES, INVENTORY_NAMES, ITEM_MATERIAL_NAMES,
    ITEM_TYPE_NAMES, ITEM_TYPE_NONE, ITEM_TYPE_PETS, PET_SUBTYPES, RACE_COUNT,
    is_visible_equipment_slot, item_subtype_names,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct SyncEngine;

impl SyncEngine {
    pub fn new() -> Self {
        Self
    }

    /// Builds the presentation state for `character` and marks it clean.
    /// Stored values without a list entry come out as no selection.
    pub fn to_presentation(&self, character: &Character, dirty: &DirtyFlag) -> EditorForm {
        let gender = character.gender().table_index();
        let race = usize::try_from(character.race)
            .ok()
            .filter(|&r| r < RACE_COUNT);
        let class = character.class().table_index();
        let bounds = form_bounds(race, gender, class, character.level);
        let specialization = Some(usize::from(character.specialization))
            .filter(|&s| s < bounds.specializations.len());

        let equipment = (0..EQUIPMENT_COUNT)
            .filter(|&slot| is_visible_equipment_slot(slot))
            .map(|slot| EquipmentFields {
                slot,
                slot_name: EQUIPMENT_SLOT_NAMES[slot],
                fields: item_fields(&character.equipment[slot]),
            })
            .collect();

        let inventories = character
            .inventories
            .iter()
            .zip(INVENTORY_NAMES)
            .map(|(inventory, name)| InventoryTab {
                name,
                entries: inventory
                    .entries
                    .iter()
                    .map(|entry| InventoryEntryFields {
                        slot: entry.slot,
                        label: if entry.is_placeholder() {
                            String::new()
                        } else {
                            entry.item.friendly_name()
                        },
                        placeholder: entry.is_placeholder(),
                        fields: item_fields(&entry.item),
                    })
                    .collect(),
            })
            .collect();

        let form = EditorForm {
            name: character.name.clone(),
            level: character.level,
            experience: character.experience,
            gender,
            race,
            class,
            specialization,
            face: character.face,
            hair: character.hair,
            hair_color: character.hair_color,
            skills: character.skills,
            coins: Coins::split(character.coins),
            platinum_coins: character.platinum_coins,
            pet: pet_fields(character.pet()),
            equipment,
            inventories,
            bounds,
            dirty: dirty.clone(),
        };

        dirty.clear();
        debug!(id = character.id, name = %character.name, "synced record to presentation");
        form
    }

    /// Writes the presentation state into `character` without touching the
    /// dirty flag. Fields with no selection keep their stored raw value.
    pub fn apply(&self, form: &EditorForm, character: &mut Character) {
        character.name = form.name.clone();
        character.level = form.level;
        character.experience = form.experience;
        if let Some(gender) = form.gender.and_then(Gender::from_table_index) {
            character.gender = gender.raw();
        }
        if let Some(race) = form.race {
            character.race = race as i32;
        }
        if let Some(class) = form.class.and_then(CharacterClass::from_table_index) {
            character.class = class.raw();
        }
        if let Some(specialization) = form.specialization.and_then(|s| u8::try_from(s).ok()) {
            character.specialization = specialization;
        }
        character.face = form.face;
        character.hair = form.hair;
        character.hair_color = form.hair_color;
        character.skills = form.skills;
        character.coins = form.coins.total();
        character.platinum_coins = form.platinum_coins;

        for equipment in &form.equipment {
            if let Some(item) = character.equipment.get_mut(equipment.slot) {
                apply_item_fields(&equipment.fields, item);
            }
        }

        for (tab, inventory) in form.inventories.iter().zip(character.inventories.iter_mut()) {
            for (fields, entry) in tab.entries.iter().zip(inventory.entries.iter_mut()) {
                apply_item_fields(&fields.fields, &mut entry.item);
            }
        }

        apply_pet_fields(&form.pet, character.pet_mut());
    }

    /// `apply` followed by marking the presentation state clean.
    pub fn to_model(&self, form: &EditorForm, character: &mut Character) {
        self.apply(form, character);
        form.dirty.clear();
        debug!(id = character.id, name = %character.name, "synced presentation to record");
    }
}

fn item_fields(item: &Item) -> ItemFields {
    let subtype = if item.is_none() {
        None
    } else {
        normalize_byte(item.subtype, item_subtype_names(item.kind))
    };

    ItemFields {
        item_type: normalize_byte(item.kind, &ITEM_TYPE_NAMES),
        subtype,
        material: normalize_byte(item.material, &ITEM_MATERIAL_NAMES),
        modifier: Some(item.modifier_index()),
        level: item.level,
    }
}

fn apply_item_fields(fields: &ItemFields, item: &mut Item) {
    if let Some(kind) = fields.raw_type() {
        item.kind = kind;
    }
    if item.kind != ITEM_TYPE_NONE {
        let subtype = fields
            .subtype
            .and_then(|dense| denormalize_byte(dense, item_subtype_names(item.kind)));
        if let Some(subtype) = subtype {
            item.subtype = subtype;
        }
    }
    let material = fields
        .material
        .and_then(|dense| denormalize_byte(dense, &ITEM_MATERIAL_NAMES));
    if let Some(material) = material {
        item.material = material;
    }
    // Only the low bits the name table covers are replaced.
    if let Some(modifier) = fields.modifier {
        let current = modifier_index(item.modifier);
        if modifier != current {
            item.modifier = item.modifier - current as i32 + modifier as i32;
        }
    }
    item.level = fields.level;
}

fn pet_fields(pet: &Item) -> PetFields {
    let kind = if pet.kind == ITEM_TYPE_PETS {
        normalize_byte(pet.subtype, PET_SUBTYPES).map(|dense| dense + 1)
    } else if pet.kind == ITEM_TYPE_NONE {
        Some(0)
    } else {
        None
    };

    PetFields {
        kind,
        level: i32::from(pet.level),
        experience: pet.modifier,
        name: pet_name::unpack(&pet.attributes),
    }
}

fn apply_pet_fields(fields: &PetFields, pet: &mut Item) {
    match fields.kind {
        Some(0) => pet.kind = ITEM_TYPE_NONE,
        Some(dense) => {
            if let Some(subtype) = denormalize_byte(dense - 1, PET_SUBTYPES) {
                pet.kind = ITEM_TYPE_PETS;
                pet.subtype = subtype;
            }
        }
        None => {}
    }
    pet.level = fields.level.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;
    pet.modifier = fields.experience;
    pet_name::pack(&fields.name, &mut pet.attributes);
}
