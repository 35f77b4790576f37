// Record layout constants
pub const EQUIPMENT_COUNT: usize = 13;
pub const INVENTORY_COUNT: usize = 4;
pub const ITEM_ATTRIBUTE_COUNT: usize = 32;

// Equipment slot 0 is never used; slot 12 is the pet slot and is shown through
// the dedicated pet fields instead of the generic item editor.
pub const EQUIPMENT_UNUSED_SLOT: usize = 0;
pub const PET_SLOT: usize = EQUIPMENT_COUNT - 1;

pub const ITEM_TYPE_NONE: u8 = 0;
pub const ITEM_TYPE_PETS: u8 = 19;
pub const ITEM_TYPE_COUNT: usize = 26;

pub const RACE_COUNT: usize = 8;
pub const GENDER_COUNT: usize = 2;
pub const CLASS_COUNT: usize = 4;

// --- Display name tables ---
//
// Empty labels are holes in the raw domain: values the record format reserves
// but never assigns. They are skipped when a dense list is built.

pub const ITEM_TYPE_NAMES: [&str; ITEM_TYPE_COUNT] = [
    "None",
    "Food",
    "Formula",
    "Weapon",
    "Chest",
    "Gloves",
    "Boots",
    "Shoulder Armor",
    "Amulet",
    "Ring",
    "Block",
    "Resource",
    "Coin",
    "Platinum Coin",
    "Leftovers",
    "Beak",
    "Painting",
    "Vase",
    "Candle",
    "Pets",
    "Pet Food",
    "Quest Item",
    "",
    "Special",
    "Lamp",
    "Mana Cube",
];

const FOOD_SUBTYPES: &[&str] = &[
    "Cookie",
    "Life Potion",
    "Cactus Potion",
    "Mana Potion",
    "Ginseng Soup",
    "Snow Berry Mash",
    "Mushroom Spit",
    "Bomb",
    "Pineapple Slice",
    "Pumpkin Muffin",
];

const WEAPON_SUBTYPES: &[&str] = &[
    "Sword",
    "Axe",
    "Mace",
    "Dagger",
    "Fist",
    "Longsword",
    "Bow",
    "Crossbow",
    "Boomerang",
    "Arrow",
    "Staff",
    "Wand",
    "Bracelet",
    "Shield",
    "",
    "Greatsword",
    "Greataxe",
    "Greatmace",
    "",
    "",
    "Torch",
];

const RESOURCE_SUBTYPES: &[&str] = &[
    "Nugget",
    "Log",
    "Feather",
    "Horn",
    "Claw",
    "Fiber",
    "Cobweb",
    "Hair",
    "Crystal",
    "Yarn",
    "Cube",
    "Capsule",
    "Flask",
    "Orb",
    "Spirit",
    "Mushroom",
    "Pumpkin",
    "Pineapple",
    "Radish",
    "Ice Crystal",
    "Sand",
    "Heart",
    "Soul",
    "",
    "Clay",
];

pub const PET_SUBTYPES: &[&str] = &[
    "",
    "",
    "Collie",
    "Shepherd Dog",
    "",
    "Crow",
    "Rabbit",
    "Pig",
    "",
    "Goat",
    "Horse",
    "",
    "Lamb",
    "Bunny",
    "Camel",
    "Turtle",
    "Seahorse",
    "",
    "Dragon",
    "Raccoon",
    "Squirrel",
    "Panther",
    "Crocodile",
    "Frog",
    "Bat",
];

const PET_FOOD_SUBTYPES: &[&str] = &["Biscuit", "Candy", "Bubble Gum", "", "Pumpkin Mash"];

const QUEST_ITEM_SUBTYPES: &[&str] = &[
    "Amulet",
    "Jewel Case",
    "Key",
    "Medicine",
    "Antidote",
    "Band-Aid",
    "",
    "Bone",
    "Brush",
];

// Indexed by raw item type.
pub const ITEM_SUBTYPE_NAMES: [&[&str]; ITEM_TYPE_COUNT] = [
    &[],
    FOOD_SUBTYPES,
    &["Formula"],
    WEAPON_SUBTYPES,
    &["Chest Armor"],
    &["Gloves"],
    &["Boots"],
    &["Shoulder Armor"],
    &["Amulet"],
    &["Ring"],
    &["Block"],
    RESOURCE_SUBTYPES,
    &["Coin"],
    &["Platinum Coin"],
    &["Leftovers"],
    &["Beak"],
    &["Painting"],
    &["Vase"],
    &["Candle"],
    PET_SUBTYPES,
    PET_FOOD_SUBTYPES,
    QUEST_ITEM_SUBTYPES,
    &[],
    &["Hang Glider", "Boat"],
    &["Lamp"],
    &["Mana Cube"],
];

pub const ITEM_MATERIAL_NAMES: [&str; 28] = [
    "None",
    "Iron",
    "Wood",
    "",
    "",
    "Obsidian",
    "",
    "Bone",
    "",
    "",
    "Copper",
    "Gold",
    "Silver",
    "Emerald",
    "Sapphire",
    "Ruby",
    "Diamond",
    "Sandstone",
    "Saurian",
    "Parrot",
    "Mammoth",
    "Plant",
    "Ice",
    "Licht",
    "Glass",
    "Silk",
    "Linen",
    "Cotton",
];

pub const ITEM_MODIFIER_NAMES: [&str; 8] = [
    "Plain", "Sturdy", "Sharp", "Swift", "Glowing", "Hardened", "Lucky", "Ancient",
];

pub const RACE_NAMES: [&str; RACE_COUNT] = [
    "Elf",
    "Human",
    "Goblin",
    "Lizardman",
    "Dwarf",
    "Orc",
    "Frogman",
    "Undead",
];

pub const CLASS_NAMES: [&str; CLASS_COUNT] = ["Warrior", "Ranger", "Mage", "Rogue"];

// Indexed by class - 1.
pub const SPECIALIZATION_NAMES: [&[&str]; CLASS_COUNT] = [
    &["Berserker", "Guardian"],
    &["Sniper", "Scout"],
    &["Fire Mage", "Water Mage"],
    &["Assassin", "Ninja"],
];

// [race][gender], gender 0 = male, 1 = female.
pub const FACE_MAXIMUMS: [[i32; GENDER_COUNT]; RACE_COUNT] = [
    [6, 6],
    [4, 6],
    [5, 5],
    [5, 4],
    [5, 6],
    [2, 5],
    [6, 6],
    [5, 4],
];

pub const HAIRCUT_MAXIMUMS: [[i32; GENDER_COUNT]; RACE_COUNT] = [
    [15, 7],
    [10, 10],
    [3, 5],
    [10, 4],
    [6, 6],
    [6, 6],
    [6, 6],
    [5, 4],
];

pub const EQUIPMENT_SLOT_NAMES: [&str; EQUIPMENT_COUNT] = [
    "",
    "Neck",
    "Chest",
    "Feet",
    "Hands",
    "Shoulder Armor",
    "Left Weapon",
    "Right Weapon",
    "Left Ring",
    "Right Ring",
    "Light",
    "Special",
    "Pet",
];

pub const INVENTORY_NAMES: [&str; INVENTORY_COUNT] = ["Equipment", "Items", "Ingredients", "Pets"];

pub fn item_subtype_names(item_type: u8) -> &'static [&'static str] {
    ITEM_SUBTYPE_NAMES
        .get(usize::from(item_type))
        .copied()
        .unwrap_or(&[])
}

pub fn is_visible_equipment_slot(slot: usize) -> bool {
    slot != EQUIPMENT_UNUSED_SLOT && slot < PET_SLOT
}
