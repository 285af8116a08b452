//! Built-in reference tables used when a config file omits a section.

use super::schema::{
    BinEvidenceRule, ClassificationRule, EnergyAction, LevelDefinition, MaterialCategory,
    MaterialProfile, ResinCode, ResinCodeToken,
};

#[allow(clippy::too_many_arguments)]
fn material(
    id: &str,
    code: &str,
    display_name: &str,
    category: MaterialCategory,
    is_recyclable: bool,
    co2_saved_kg: f64,
    point_value: i64,
    disposal_instructions: &str,
    fun_fact: &str,
) -> MaterialProfile {
    MaterialProfile {
        id: id.to_string(),
        code: code.to_string(),
        display_name: display_name.to_string(),
        category,
        is_recyclable,
        co2_saved_kg,
        point_value,
        disposal_instructions: disposal_instructions.to_string(),
        fun_fact: fun_fact.to_string(),
    }
}

pub fn default_materials() -> Vec<MaterialProfile> {
    use MaterialCategory::*;

    vec![
        material(
            "pet",
            "1",
            "PET (Polyethylene Terephthalate)",
            Plastic,
            true,
            0.04,
            5,
            "Widely recyclable in curbside programs. Rinse and place in recycling bin. Remove caps if required by your local program.",
            "Recycling 10 PET bottles saves enough energy to power a laptop for over 25 hours!",
        ),
        material(
            "hdpe",
            "2",
            "HDPE (High-Density Polyethylene)",
            Plastic,
            true,
            0.05,
            5,
            "Commonly accepted. Includes milk jugs, detergent bottles. Rinse and recycle.",
            "HDPE can be recycled into playground equipment, plastic lumber, and new bottles.",
        ),
        material(
            "pvc",
            "3",
            "PVC (Polyvinyl Chloride)",
            Plastic,
            false,
            0.0,
            1,
            "Rarely accepted curbside. Check local specialty recyclers. Often found in pipes and packaging.",
            "PVC is one of the hardest plastics to recycle but knowing this helps you make better choices!",
        ),
        material(
            "ldpe",
            "4",
            "LDPE (Low-Density Polyethylene)",
            Plastic,
            false,
            0.02,
            3,
            "Not typically curbside recyclable. Many grocery stores accept plastic bags and film. Bundle and drop off.",
            "Plastic bags take 10-1,000 years to decompose in a landfill.",
        ),
        material(
            "pp",
            "5",
            "PP (Polypropylene)",
            Plastic,
            true,
            0.03,
            4,
            "Increasingly accepted. Includes yogurt cups, bottle caps, straws. Rinse before recycling.",
            "PP can be recycled into brooms, bike racks, and auto parts.",
        ),
        material(
            "ps",
            "6",
            "PS (Polystyrene)",
            Plastic,
            false,
            0.0,
            1,
            "Rarely recyclable. Styrofoam is difficult to process. Check for local drop-off options.",
            "Styrofoam can take over 500 years to decompose. Avoiding it is the best option!",
        ),
        material(
            "mixed_plastic",
            "7",
            "Other (Mixed Plastics)",
            Plastic,
            false,
            0.0,
            1,
            "Not typically recyclable. Includes multi-layer plastics. Reduce usage when possible.",
            "Code 7 includes bioplastics too. Check if your item is compostable!",
        ),
        material(
            "aluminum",
            "AL",
            "Aluminum Can",
            Metal,
            true,
            0.15,
            8,
            "Highly recyclable! Rinse and toss in recycling bin. No need to crush.",
            "Recycling one aluminum can saves enough energy to run a TV for 3 hours!",
        ),
        material(
            "glass",
            "GL",
            "Glass Bottle/Jar",
            Glass,
            true,
            0.3,
            10,
            "Rinse and recycle. Remove lids. Glass can be recycled infinitely without quality loss!",
            "Glass is 100% recyclable and can be recycled endlessly without losing quality or purity.",
        ),
        material(
            "paper",
            "PA",
            "Paper/Cardboard",
            Paper,
            true,
            0.06,
            4,
            "Flatten cardboard. Keep paper dry and clean. Remove tape and staples if possible.",
            "Recycling one ton of paper saves 17 trees and 7,000 gallons of water.",
        ),
        material(
            "cardboard",
            "CB",
            "Cardboard Box",
            Paper,
            true,
            0.08,
            5,
            "Flatten and remove any packing materials inside. Keep dry.",
            "About 80% of products sold in the US are packaged in cardboard.",
        ),
        material(
            "bottle",
            "BT",
            "Plastic Bottle",
            Plastic,
            true,
            0.04,
            5,
            "Empty, rinse, and replace the cap. Recycle in your curbside bin.",
            "Americans throw away 35 billion plastic bottles every year. You're helping change that!",
        ),
        material(
            "can",
            "CN",
            "Metal Can",
            Metal,
            true,
            0.12,
            7,
            "Rinse empty cans. Both aluminum and steel/tin cans are recyclable.",
            "Steel is the most recycled material in the world, more than paper, glass, and plastic combined!",
        ),
    ]
}

fn rule(keyword: &str, material_id: &str, weight: u32) -> ClassificationRule {
    ClassificationRule {
        keyword: keyword.to_string(),
        material_id: material_id.to_string(),
        weight,
    }
}

/// Label rules in evaluation order. Specific phrases carry weight 3,
/// material words 2, generic words 1.
pub fn default_rules() -> Vec<ClassificationRule> {
    vec![
        rule("plastic bottle", "bottle", 3),
        rule("water bottle", "bottle", 3),
        rule("pet bottle", "bottle", 3),
        rule("beverage can", "aluminum", 3),
        rule("aluminum can", "aluminum", 3),
        rule("aluminium can", "aluminum", 3),
        rule("tin can", "can", 3),
        rule("glass bottle", "glass", 3),
        rule("glass jar", "glass", 3),
        rule("cardboard box", "cardboard", 3),
        rule("bottle", "bottle", 2),
        rule("aluminum", "aluminum", 2),
        rule("aluminium", "aluminum", 2),
        rule("glass", "glass", 2),
        rule("cardboard", "cardboard", 2),
        rule("newspaper", "paper", 2),
        rule("magazine", "paper", 2),
        rule("paper", "paper", 2),
        rule("can", "can", 2),
        rule("jar", "glass", 2),
        rule("carton", "cardboard", 2),
        rule("plastic", "bottle", 1),
        rule("polystyrene", "bottle", 1),
        rule("styrofoam", "bottle", 1),
        rule("box", "cardboard", 1),
    ]
}

fn token(token: &str, material_id: &str) -> ResinCodeToken {
    ResinCodeToken {
        token: token.to_string(),
        material_id: material_id.to_string(),
    }
}

pub fn default_resin_tokens() -> Vec<ResinCodeToken> {
    vec![
        token("pete", "pet"),
        token("pet", "pet"),
        token("hdpe", "hdpe"),
        token("pvc", "pvc"),
        token("v", "pvc"),
        token("ldpe", "ldpe"),
        token("pp", "pp"),
        token("ps", "ps"),
    ]
}

pub fn default_resin_codes() -> Vec<ResinCode> {
    ["pet", "hdpe", "pvc", "ldpe", "pp", "ps", "mixed_plastic"]
        .iter()
        .zip(1u8..=7)
        .map(|(id, digit)| ResinCode {
            digit,
            material_id: id.to_string(),
        })
        .collect()
}

fn evidence(keyword: &str, weight: f32) -> BinEvidenceRule {
    BinEvidenceRule {
        keyword: keyword.to_string(),
        weight,
    }
}

pub fn default_bin_evidence() -> Vec<BinEvidenceRule> {
    vec![
        evidence("recycling bin", 5.0),
        evidence("recycling", 4.0),
        evidence("recycle", 4.0),
        evidence("recyclable", 3.0),
        evidence("blue bin", 3.0),
        evidence("bottle bank", 3.0),
        evidence("bin", 1.0),
        evidence("waste container", 1.0),
        evidence("container", 0.5),
    ]
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn default_trash_keywords() -> Vec<String> {
    strings(&[
        "trash", "garbage", "rubbish", "litter", "waste", "dumpster", "landfill",
    ])
}

pub fn default_recycling_keywords() -> Vec<String> {
    strings(&["recycl", "blue bin", "bottle bank"])
}

pub fn default_ocr_keywords() -> Vec<String> {
    strings(&[
        "recycl",
        "\u{267B}",
        "commingled",
        "mixed paper",
        "bottles & cans",
        "bottles and cans",
    ])
}

pub fn default_logo_keywords() -> Vec<String> {
    strings(&["recycl", "\u{267B}", "green dot", "mobius"])
}

fn level(level: u32, title: &str, min_points: i64) -> LevelDefinition {
    LevelDefinition {
        level,
        title: title.to_string(),
        min_points,
    }
}

pub fn default_levels() -> Vec<LevelDefinition> {
    vec![
        level(1, "Novice EcoMage", 0),
        level(2, "Climate Conjurer", 50),
        level(3, "Green Guardian", 150),
        level(4, "Nature Warlock", 300),
        level(5, "Earth Enchanter", 500),
        level(6, "Storm Sage", 800),
        level(7, "Forest Oracle", 1200),
        level(8, "Phoenix Protector", 1800),
        level(9, "Dragon Defender", 2500),
        level(10, "Archmage of Climate", 5000),
    ]
}

fn energy_action(id: &str, name: &str, co2_saved_kg: f64, points: i64) -> EnergyAction {
    EnergyAction {
        id: id.to_string(),
        name: name.to_string(),
        co2_saved_kg,
        points,
    }
}

pub fn default_energy_actions() -> Vec<EnergyAction> {
    vec![
        energy_action("lights_off", "Turned Off Lights (1 hour)", 0.04, 1),
        energy_action("thermostat_adjust", "Adjusted Thermostat (-2\u{b0}F)", 0.5, 3),
        energy_action("cold_wash", "Cold Water Laundry", 0.6, 3),
        energy_action("line_dry", "Air-Dried Clothes", 2.0, 5),
        energy_action("unplug", "Unplugged Electronics", 0.1, 1),
        energy_action("short_shower", "Shorter Shower (-5 min)", 0.5, 2),
        energy_action("no_car", "Walked / Biked Instead", 2.3, 8),
        energy_action("meatless_meal", "Meatless Meal", 1.5, 5),
    ]
}
